//! # Playback Error Types

use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The audio engine failed to load a resource. The session is left
    /// cleared; no stale track is ever shown.
    #[error("Failed to load audio from {url}: {reason}")]
    LoadFailed { url: String, reason: String },

    /// A resource load exceeded the configured bound.
    #[error("Timed out loading audio from {url}")]
    LoadTimeout { url: String },

    /// Requested verse does not exist in the chapter.
    #[error("Verse {verse} out of range for chapter {chapter}")]
    VerseOutOfRange { chapter: u16, verse: u16 },

    /// Content lookup failed.
    #[error("Content error: {0}")]
    Content(#[from] core_content::ContentError),

    /// The audio engine rejected a transport call.
    #[error("Audio engine error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be
    /// retried by the user.
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::LoadFailed { .. }
            | PlaybackError::LoadTimeout { .. }
            | PlaybackError::Bridge(_) => true,
            PlaybackError::Content(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Returns `true` if this error came from loading a resource.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::LoadFailed { .. } | PlaybackError::LoadTimeout { .. }
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
