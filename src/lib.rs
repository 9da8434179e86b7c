// src/lib.rs

//! Filesystem-notification based tracking of torrent files and magnet links
//! in a directory.
//!
//! Point [`DirWatch`] at a directory and it emits an [`Event`] whenever a
//! torrent identity appears in or disappears from it, derived from
//! `.torrent` descriptor files and `.magnet` link-list files. A torrent
//! client can drive its add/drop logic from the event stream without
//! rescanning the directory itself.
//!
//! The building blocks are usable on their own: [`scan_dir`] takes one
//! snapshot of a directory, [`diff`] turns two snapshots into an ordered
//! event sequence, and the [`metainfo`] / [`magnet`] modules derive an
//! [`InfoHash`] from the two file forms.

pub mod errors;
pub mod info_hash;
pub mod magnet;
pub mod metainfo;
pub mod scan;
pub mod watch;

pub use info_hash::InfoHash;
pub use magnet::{MagnetError, MagnetLink};
pub use scan::{diff, scan_dir, Entity, Event, Snapshot};
pub use watch::DirWatch;
