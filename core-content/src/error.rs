//! Content lookup error types.

use thiserror::Error;

/// Errors that can occur while resolving content.
#[derive(Error, Debug)]
pub enum ContentError {
    /// Transport-level failure from the HTTP bridge.
    #[error("HTTP error: {0}")]
    Http(#[from] bridge_traits::BridgeError),

    /// The API answered with a non-success status.
    #[error("API error {status} from {url}")]
    Api { status: u16, url: String },

    /// The API payload could not be decoded.
    #[error("Failed to decode API response: {0}")]
    Decode(String),

    /// Chapter number outside 1..=114.
    #[error("Invalid chapter number: {0} (must be between 1 and 114)")]
    InvalidChapter(u16),

    /// Verse range is empty or starts before verse 1.
    #[error("Invalid verse range: {start}..{end}")]
    InvalidVerseRange { start: u16, end: u16 },

    /// A chapter's verse list was not contiguous starting at 1.
    #[error("Invalid verse sequence: expected verse {expected}, found {found}")]
    InvalidVerseSequence { expected: u16, found: u16 },

    /// Reciter edition not present in the registry.
    #[error("Unknown reciter edition: {0}")]
    UnknownReciter(String),

    /// Story id not found in the catalog for the given chapter.
    #[error("Story '{story}' not found in chapter {surah}")]
    StoryNotFound { surah: u16, story: String },
}

impl ContentError {
    /// Returns `true` if the failure is transient and worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ContentError::Http(_) | ContentError::Api { status: 500..=599, .. }
        )
    }
}

/// Result type for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;
