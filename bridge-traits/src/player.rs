//! Audio player bridge trait and supporting types.
//!
//! These abstractions let the playback core drive the platform's audio
//! engine without knowing anything about it. The engine is a single
//! **exclusive channel**: at most one resource is loaded at a time, and
//! loading a new one unloads the prior one. Host applications provide a
//! concrete implementation per platform (AVAudioPlayer, ExoPlayer, a
//! desktop engine, or the simulated adapter shipped in `bridge-desktop`).
//!
//! ## Status events
//!
//! Implementations publish [`PlayerStatus`] updates on a broadcast channel
//! obtained through [`AudioPlayer::subscribe`]. For a given [`SoundId`]:
//!
//! - positions are non-decreasing,
//! - at most one update has `just_finished == true`, and it is the last
//!   update delivered for that sound,
//! - no updates are delivered after `unload`.
//!
//! Consumers must compare `PlayerStatus::sound` against the id they hold;
//! updates for a superseded resource may still be in flight when a new one
//! is loaded.

use crate::error::Result;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Unique identifier for a loaded audio resource.
///
/// A fresh id is minted by every successful [`AudioPlayer::load`], which is
/// what lets consumers discard status updates from superseded loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(Uuid);

impl SoundId {
    /// Generate a new sound identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SoundId {
    fn default() -> Self {
        Self::new()
    }
}

/// Container format hint passed to the platform engine.
///
/// Some platform extractors need help identifying remote streams whose URLs
/// carry no file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioFormatHint {
    Mp3,
    Aac,
    Ogg,
    Wav,
    /// Vendor- or platform-specific container.
    Other(String),
}

/// Request describing the resource an [`AudioPlayer`] should load.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Full URL of the audio resource.
    pub url: String,
    /// HTTP headers to include when fetching the resource.
    pub headers: HashMap<String, String>,
    /// Whether playback should start as soon as the resource is ready.
    pub autoplay: bool,
    /// Optional container format hint for the platform extractor.
    pub format_hint: Option<AudioFormatHint>,
}

impl LoadRequest {
    /// Construct a request that starts playing as soon as it is loaded.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            autoplay: true,
            format_hint: None,
        }
    }

    /// Attach an HTTP header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set whether playback starts automatically once loaded.
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Attach a container format hint.
    pub fn with_format_hint(mut self, hint: AudioFormatHint) -> Self {
        self.format_hint = Some(hint);
        self
    }
}

/// Periodic status update for the active resource.
#[derive(Debug, Clone)]
pub struct PlayerStatus {
    /// The resource this update belongs to.
    pub sound: SoundId,
    /// Elapsed playback position.
    pub position: Duration,
    /// Total length, once the engine has determined it.
    pub duration: Option<Duration>,
    /// Whether audio is currently audible (not paused, not stopped).
    pub is_playing: bool,
    /// Set on the final update when the resource finished naturally.
    /// Never set on manual stop or unload.
    pub just_finished: bool,
    /// Set when the engine hit a mid-playback failure.
    pub error: Option<String>,
}

impl PlayerStatus {
    /// A minimal "now playing from the start" update.
    pub fn started(sound: SoundId) -> Self {
        Self {
            sound,
            position: Duration::ZERO,
            duration: None,
            is_playing: true,
            just_finished: false,
            error: None,
        }
    }

    /// Returns `true` if this is a terminal update for its sound.
    pub fn is_terminal(&self) -> bool {
        self.just_finished || self.error.is_some()
    }
}

/// Trait for the platform audio engine.
///
/// The engine is an exclusive channel: `load` implicitly unloads whatever
/// was loaded before it. Transport methods take the [`SoundId`] they target
/// so that implementations can reject calls against stale handles.
///
/// Only the playback coordinator should call these methods; UI surfaces
/// observe state through the shared playback store and invoke coordinator
/// actions instead of talking to the engine directly.
#[async_trait::async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Load a resource, unloading any prior one first.
    ///
    /// Resolves once the engine has accepted the resource; with
    /// `autoplay` set, playback begins without a further `play` call.
    /// Returns the id that subsequent status updates will carry.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be fetched or the format is not
    /// supported. A failed load leaves the channel empty.
    async fn load(&self, request: LoadRequest) -> Result<SoundId>;

    /// Begin or resume playback of the loaded resource.
    async fn play(&self, sound: SoundId) -> Result<()>;

    /// Pause playback, retaining the resource and its position.
    async fn pause(&self, sound: SoundId) -> Result<()>;

    /// Stop playback and rewind to the start, retaining the resource.
    async fn stop(&self, sound: SoundId) -> Result<()>;

    /// Release the resource. No further status updates are delivered for it.
    async fn unload(&self, sound: SoundId) -> Result<()>;

    /// Subscribe to status updates for whatever resource is active.
    fn subscribe(&self) -> broadcast::Receiver<PlayerStatus>;
}
