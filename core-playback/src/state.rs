//! Shared playback state.
//!
//! A single-writer, multi-reader store over `tokio::sync::watch`. The
//! coordinator is the only writer (publishing is crate-private); any number
//! of UI surfaces subscribe and always observe whole snapshots, never torn
//! partial updates.

use crate::session::PlayerSnapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// Process-wide observable view of the playback session.
///
/// Cheap to clone; all clones share the same underlying channel.
#[derive(Clone)]
pub struct SharedPlaybackState {
    tx: Arc<watch::Sender<PlayerSnapshot>>,
}

impl SharedPlaybackState {
    /// Create a store initialized to the empty state.
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(PlayerSnapshot::empty());
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to snapshot updates.
    ///
    /// The receiver immediately holds the current snapshot and is notified
    /// on every publish.
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.tx.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.tx.borrow().clone()
    }

    /// Replace the snapshot wholesale.
    pub(crate) fn publish(&self, snapshot: PlayerSnapshot) {
        self.tx.send_replace(snapshot);
    }

    /// Modify the current snapshot in place, notifying subscribers.
    pub(crate) fn update(&self, f: impl FnOnce(&mut PlayerSnapshot)) {
        self.tx.send_modify(f);
    }
}

impl std::fmt::Debug for SharedPlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPlaybackState")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
