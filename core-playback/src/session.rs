//! Playback session data model.
//!
//! [`PlayerSnapshot`] is the value every UI surface observes: the whole
//! session state published atomically on each change, so a mini-player and
//! a full-screen player can never disagree.

use core_content::{ChapterId, Reciter};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identity of the currently loaded track.
///
/// Only meaningful while a resource is loaded; cleared atomically with
/// unloading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    /// Chapter being recited.
    pub chapter: ChapterId,
    /// Verse number within the chapter (1-based).
    pub verse_number: u16,
    /// Reciter whose recording is playing.
    pub reciter: Reciter,
    /// Chapter display name.
    pub chapter_name: String,
}

/// Elapsed/total time of the loaded resource.
///
/// Reset to zero whenever the loaded resource changes or playback is
/// cleared. `duration` stays zero until the engine reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackProgress {
    pub position: Duration,
    pub duration: Duration,
}

impl PlaybackProgress {
    /// Build a progress value, clamping position to the known duration.
    pub fn new(position: Duration, duration: Duration) -> Self {
        let position = if duration > Duration::ZERO {
            position.min(duration)
        } else {
            position
        };
        Self { position, duration }
    }

    /// Completion fraction in `0.0..=1.0`, or zero while duration is
    /// unknown. Drives progress bars.
    pub fn fraction(&self) -> f64 {
        if self.duration.is_zero() {
            0.0
        } else {
            self.position.as_secs_f64() / self.duration.as_secs_f64()
        }
    }
}

/// Lifecycle phase of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Nothing loaded.
    Empty,
    /// A resource was requested but has not reported status yet.
    /// UIs show a loading indicator.
    Loading,
    Playing,
    Paused,
}

/// One atomically-published view of the playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// The loaded track, or `None` when the session is empty.
    pub track: Option<TrackRef>,
    /// Progress through the loaded resource.
    pub progress: PlaybackProgress,
    /// Whether audio is currently audible.
    pub is_playing: bool,
    /// Whether the persistent mini-player should be shown.
    pub mini_player_visible: bool,
    /// Session lifecycle phase.
    pub phase: PlaybackPhase,
}

impl PlayerSnapshot {
    /// The cleared state: nothing loaded, nothing visible.
    pub fn empty() -> Self {
        Self {
            track: None,
            progress: PlaybackProgress::default(),
            is_playing: false,
            mini_player_visible: false,
            phase: PlaybackPhase::Empty,
        }
    }

    /// Returns `true` if a resource is loaded (in any phase but `Empty`).
    pub fn is_active(&self) -> bool {
        self.track.is_some()
    }
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
