// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use anyhow::Context;
use notify::event::ModifyKind;
use notify::{
    Config, Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::scan::{diff, scan_dir, Event, Snapshot};

/// Watch session over one directory of torrent descriptors and magnet lists.
///
/// Constructing a session subscribes to filesystem notifications and kicks
/// off a baseline scan, so every identity already present in the directory
/// is reported as [`Event::Added`] before any filesystem change is
/// processed. Events are read with [`recv`](DirWatch::recv); the stream
/// ends after [`close`](DirWatch::close) or drop, once already-published
/// events have been consumed.
pub struct DirWatch {
    dir: PathBuf,
    /// Live notification subscription; `None` once closed. Dropping the
    /// watcher is what ends the background tasks: the bridge channels close
    /// and both loops drain out.
    watcher: Option<RecommendedWatcher>,
    events: mpsc::Receiver<Event>,
}

impl std::fmt::Debug for DirWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirWatch")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl DirWatch {
    /// Start watching `dir`.
    ///
    /// Must be called from within a tokio runtime. Failing to register the
    /// filesystem watch is the one fatal error and is returned here; nothing
    /// after construction can bring the session down.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        // Bridges from notify's callback thread into the async tasks. The
        // notification bridge doubles as the holding queue for anything
        // arriving while the baseline scan is still running.
        let (notify_tx, notify_rx) = mpsc::unbounded_channel::<NotifyEvent>();
        let (error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<NotifyEvent>| {
                // Send failures mean the session is shutting down and the
                // loops are gone; nothing left to tell.
                match res {
                    Ok(event) => {
                        let _ = notify_tx.send(event);
                    }
                    Err(err) => {
                        let _ = error_tx.send(err);
                    }
                }
            },
            Config::default(),
        )
        .context("creating filesystem watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("watching directory {:?}", dir))?;

        // Capacity 1: publishing a change is a blocking handoff to the
        // consumer, so the held snapshot can never run ahead of what has
        // actually been delivered.
        let (events_tx, events_rx) = mpsc::channel::<Event>(1);

        let state = WatchState {
            dir: dir.clone(),
            snapshot: Snapshot::new(),
            events_tx,
        };
        tokio::spawn(state.start(notify_rx, error_rx));

        Ok(DirWatch {
            dir,
            watcher: Some(watcher),
            events: events_rx,
        })
    }

    /// Directory this session watches.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Next change event. `None` once the session has closed and all
    /// preceding events have been consumed.
    pub async fn recv(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Stop watching.
    ///
    /// Deregisters the notification subscription and drops it; the event
    /// stream then ends once already-published events are drained. Closing
    /// twice is a no-op. An error from deregistering surfaces here and
    /// nowhere else; teardown proceeds regardless.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut watcher) = self.watcher.take() else {
            return Ok(());
        };
        let unwatched = watcher.unwatch(&self.dir);
        drop(watcher);
        unwatched.with_context(|| format!("unwatching directory {:?}", self.dir))
    }
}

/// Mutable watch-loop state, owned by exactly one task at a time: first the
/// bootstrap task for the baseline scan, then the notification loop. The
/// snapshot needs no lock because nothing else can reach it.
struct WatchState {
    dir: PathBuf,
    snapshot: Snapshot,
    events_tx: mpsc::Sender<Event>,
}

impl WatchState {
    /// Baseline scan, then hand off to the notification and error loops.
    ///
    /// The ordering is load-bearing: nothing is read from `notify_rx` until
    /// the baseline scan has completed and published its events, so a
    /// notification racing construction simply queues behind it.
    async fn start(
        mut self,
        notify_rx: mpsc::UnboundedReceiver<NotifyEvent>,
        error_rx: mpsc::UnboundedReceiver<notify::Error>,
    ) {
        self.refresh().await;
        tokio::spawn(drain_errors(error_rx));
        tokio::spawn(self.run(notify_rx));
    }

    /// Notification loop: rescan on anything that can change the identity
    /// set, until the subscription closes.
    async fn run(mut self, mut notify_rx: mpsc::UnboundedReceiver<NotifyEvent>) {
        while let Some(event) = notify_rx.recv().await {
            debug!(?event, "filesystem notification");
            if !triggers_rescan(&event.kind) {
                // In-place edits of an existing file are not detected; their
                // identities only surface on the next rescan a create,
                // remove or rename happens to trigger.
                continue;
            }
            if !self.refresh().await {
                return;
            }
        }
        // Subscription closed: dropping `events_tx` ends the event stream.
    }

    /// One scan-and-reconcile cycle. Returns `false` when the consumer has
    /// gone away and no further event can be delivered.
    async fn refresh(&mut self) -> bool {
        let new = scan_dir(&self.dir);
        for event in diff(&self.snapshot, &new) {
            if self.events_tx.send(event).await.is_err() {
                debug!(dir = %self.dir.display(), "event consumer dropped, stopping watch loop");
                return false;
            }
        }
        self.snapshot = new;
        true
    }
}

/// Log watcher errors until the subscription closes. Errors never stop the
/// watch loop; the worst case is a stale snapshot until the next trigger.
async fn drain_errors(mut error_rx: mpsc::UnboundedReceiver<notify::Error>) {
    while let Some(err) = error_rx.recv().await {
        warn!(error = %err, "error in torrent directory watcher");
    }
}

/// Whether a notification kind warrants a full rescan.
///
/// Data writes and pure access events cannot change which identities are
/// present, so they are skipped; everything else (create, remove, rename,
/// metadata) triggers a rescan.
fn triggers_rescan(kind: &EventKind) -> bool {
    !matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Access(_)
    )
}
