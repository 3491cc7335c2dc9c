//! # Playback Module
//!
//! Sequential recitation playback for the recitation core.
//!
//! ## Overview
//!
//! This module handles:
//! - Verse-by-verse, chapter-by-chapter sequential playback
//! - Transport controls (play/pause, skip, stop-and-clear)
//! - The shared playback state observed by every UI surface
//! - Generation-tagged status handling so superseded loads can never
//!   corrupt the active session

pub mod config;
pub mod coordinator;
pub mod error;
pub mod session;
pub mod state;

pub use config::PlaybackConfig;
pub use coordinator::PlaybackCoordinator;
pub use error::{PlaybackError, Result};
pub use session::{PlaybackPhase, PlaybackProgress, PlayerSnapshot, TrackRef};
pub use state::SharedPlaybackState;
