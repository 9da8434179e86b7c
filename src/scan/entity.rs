// src/scan/entity.rs

use std::collections::HashMap;
use std::path::PathBuf;

use crate::info_hash::InfoHash;

/// Everything known about one torrent identity in the directory.
///
/// Exactly one of `magnet_uri` / `torrent_file_path` is populated by the
/// scanner: the merge rule never keeps an entity discovered through both
/// forms at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub info_hash: InfoHash,
    /// Original magnet reference text, when discovered in a `.magnet` file.
    pub magnet_uri: Option<String>,
    /// Path of the descriptor file, when discovered as a `.torrent` file.
    pub torrent_file_path: Option<PathBuf>,
}

/// Complete identity-to-entity mapping derived from one directory scan.
///
/// Snapshots are built fresh by [`scan_dir`](crate::scan::scan_dir) and
/// replaced wholesale; they are never patched in place.
pub type Snapshot = HashMap<InfoHash, Entity>;
