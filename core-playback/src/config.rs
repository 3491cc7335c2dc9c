//! Playback configuration.

use bridge_traits::player::AudioFormatHint;
use std::time::Duration;

/// Tunables for the playback coordinator.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Bound on how long a resource load may stay in flight before it is
    /// treated as failed. `None` disables the bound.
    pub load_timeout: Option<Duration>,

    /// Container hint attached to every load request. Some platform
    /// extractors cannot identify recitation streams whose URLs carry no
    /// file extension.
    pub format_hint: Option<AudioFormatHint>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            load_timeout: Some(Duration::from_secs(30)),
            format_hint: Some(AudioFormatHint::Mp3),
        }
    }
}

impl PlaybackConfig {
    /// Bound resource loads to the given duration.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Let resource loads stay in flight indefinitely.
    pub fn without_load_timeout(mut self) -> Self {
        self.load_timeout = None;
        self
    }

    /// Set the container hint attached to load requests.
    pub fn with_format_hint(mut self, hint: AudioFormatHint) -> Self {
        self.format_hint = Some(hint);
        self
    }
}
