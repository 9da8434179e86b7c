// src/scan/diff.rs

use std::path::PathBuf;

use crate::info_hash::InfoHash;
use crate::scan::entity::{Entity, Snapshot};

/// A change to the set of torrent identities visible in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The identity became visible, via the given magnet reference and/or
    /// descriptor file.
    Added {
        info_hash: InfoHash,
        magnet_uri: Option<String>,
        torrent_file_path: Option<PathBuf>,
    },
    /// The identity is no longer visible.
    Removed { info_hash: InfoHash },
}

impl Event {
    /// Identity this event is about.
    pub fn info_hash(&self) -> InfoHash {
        match self {
            Event::Added { info_hash, .. } | Event::Removed { info_hash } => *info_hash,
        }
    }

    fn added(entity: &Entity) -> Self {
        Event::Added {
            info_hash: entity.info_hash,
            magnet_uri: entity.magnet_uri.clone(),
            torrent_file_path: entity.torrent_file_path.clone(),
        }
    }
}

/// Ordered change events taking `old` to `new`.
///
/// Identities that vanished entirely are all reported first. Then every
/// identity in `new` is reported as an addition, with a changed entity
/// reported as a removal immediately followed by its addition. Order within
/// each pass follows map iteration and carries no meaning.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<Event> {
    let mut events = Vec::new();

    for info_hash in old.keys() {
        if !new.contains_key(info_hash) {
            events.push(Event::Removed {
                info_hash: *info_hash,
            });
        }
    }

    for (info_hash, entity) in new {
        match old.get(info_hash) {
            Some(previous) if previous == entity => {}
            Some(_) => {
                // Changed in place: a replace is a remove then an add.
                events.push(Event::Removed {
                    info_hash: *info_hash,
                });
                events.push(Event::added(entity));
            }
            None => events.push(Event::added(entity)),
        }
    }

    events
}
