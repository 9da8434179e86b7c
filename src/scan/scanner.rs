// src/scan/scanner.rs

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::magnet::MagnetLink;
use crate::metainfo;
use crate::scan::entity::{Entity, Snapshot};

/// How a directory entry participates in a scan, decided once per name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    /// Bencoded `.torrent` descriptor.
    Torrent,
    /// Plain-text `.magnet` list of magnet references.
    MagnetList,
}

fn file_kind(path: &Path) -> Option<FileKind> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("torrent") => Some(FileKind::Torrent),
        Some("magnet") => Some(FileKind::MagnetList),
        _ => None,
    }
}

/// Scan `dir` (non-recursively) and build a [`Snapshot`] of every torrent
/// identity visible in it.
///
/// A scan never fails: unreadable files and unparseable entries are logged
/// and contribute nothing, and a directory that cannot be listed at all
/// yields an empty snapshot.
pub fn scan_dir(dir: impl AsRef<Path>) -> Snapshot {
    let dir = dir.as_ref();
    let mut state = Snapshot::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "listing watch directory failed");
            return state;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "reading directory entry failed");
                continue;
            }
        };
        match file_kind(&path) {
            Some(FileKind::Torrent) => scan_torrent_file(&mut state, &path),
            Some(FileKind::MagnetList) => scan_magnet_file(&mut state, &path),
            None => {}
        }
    }

    state
}

/// Fold one candidate entity into the snapshot.
///
/// An entry already recorded from a descriptor file is never displaced for
/// the rest of the scan. Among magnet entries for the same identity the
/// candidate replaces the holder only when its URI is at least as long, so
/// a reference carrying more metadata wins over a bare one.
fn fold_entity(state: &mut Snapshot, candidate: Entity) {
    if let Some(existing) = state.get(&candidate.info_hash) {
        let Some(existing_uri) = existing.magnet_uri.as_deref() else {
            return;
        };
        let candidate_len = candidate.magnet_uri.as_deref().map_or(0, str::len);
        if candidate_len < existing_uri.len() {
            return;
        }
    }
    state.insert(candidate.info_hash, candidate);
}

fn scan_torrent_file(state: &mut Snapshot, path: &Path) {
    let info_hash = match metainfo::file_info_hash(path) {
        Ok(info_hash) => info_hash,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping unparseable torrent file");
            return;
        }
    };
    fold_entity(
        state,
        Entity {
            info_hash,
            magnet_uri: None,
            torrent_file_path: Some(path.to_path_buf()),
        },
    );
}

fn scan_magnet_file(state: &mut Snapshot, path: &Path) {
    let uris = match magnet_file_uris(path) {
        Ok(uris) => uris,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "reading magnet file failed");
            return;
        }
    };
    for uri in uris {
        match MagnetLink::parse(&uri) {
            Ok(link) => fold_entity(
                state,
                Entity {
                    info_hash: link.info_hash,
                    magnet_uri: Some(uri),
                    torrent_file_path: None,
                },
            ),
            Err(err) => {
                warn!(uri = %uri, path = %path.display(), error = %err, "skipping bad magnet reference");
            }
        }
    }
}

/// Candidate magnet references in a `.magnet` file: whitespace-delimited
/// tokens, with `#`-prefixed tokens treated as commented out.
fn magnet_file_uris(path: &Path) -> std::io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .split_whitespace()
        .filter(|token| !token.starts_with('#'))
        .map(str::to_owned)
        .collect())
}
