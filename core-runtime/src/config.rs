//! # Core Configuration Module
//!
//! Provides configuration management for the recitation core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] instance holding all dependencies and settings for the
//! core library. It enforces fail-fast validation so every required bridge
//! is present before initialization.
//!
//! ## Required Dependencies
//!
//! - `AudioPlayer` - the platform audio engine
//! - `HttpClient` - content API access
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults
//! (reqwest client, simulated audio engine) are injected automatically if
//! not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(MyHttpClient))
//!     .player(Arc::new(MyAudioPlayer))
//!     .load_timeout(std::time::Duration::from_secs(20))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AudioPlayer, Clock, HttpClient, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Base URL of the chapters/tafsir API.
pub const DEFAULT_METADATA_API_BASE: &str = "https://api.quran.com/api/v4";

/// Base URL of the verse text and recitation audio API.
pub const DEFAULT_AUDIO_API_BASE: &str = "https://api.alquran.cloud/v1";

/// Tafsir resource consulted by default (Ibn Kathir).
pub const DEFAULT_TAFSIR_RESOURCE: u32 = 14;

const DEFAULT_CACHE_CAPACITY: usize = 32;
const DEFAULT_EVENT_BUFFER: usize = 100;
const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Core configuration for the recitation core.
///
/// Holds all dependencies and settings required to initialize the core
/// library. Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Platform audio engine (required)
    pub player: Arc<dyn AudioPlayer>,

    /// HTTP client for content API requests (required, desktop default)
    pub http_client: Arc<dyn HttpClient>,

    /// Time source (defaults to the system clock)
    pub clock: Arc<dyn Clock>,

    /// Base URL for chapter metadata and tafsir
    pub metadata_api_base: String,

    /// Base URL for verse text and recitation audio
    pub audio_api_base: String,

    /// Tafsir resource identifier
    pub tafsir_resource: u32,

    /// Per-client LRU cache capacity (chapters)
    pub cache_capacity: usize,

    /// Event bus buffer size
    pub event_buffer: usize,

    /// Bound on how long a resource load may stay in flight.
    /// `None` disables the bound.
    pub load_timeout: Option<Duration>,
}

impl CoreConfig {
    /// Create a configuration builder.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    player: Option<Arc<dyn AudioPlayer>>,
    http_client: Option<Arc<dyn HttpClient>>,
    clock: Option<Arc<dyn Clock>>,
    metadata_api_base: Option<String>,
    audio_api_base: Option<String>,
    tafsir_resource: Option<u32>,
    cache_capacity: Option<usize>,
    event_buffer: Option<usize>,
    load_timeout: Option<Option<Duration>>,
}

impl CoreConfigBuilder {
    /// Inject the platform audio engine.
    pub fn player(mut self, player: Arc<dyn AudioPlayer>) -> Self {
        self.player = Some(player);
        self
    }

    /// Inject the HTTP client.
    pub fn http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Inject a time source (useful for deterministic tests).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Override the metadata API base URL.
    pub fn metadata_api_base(mut self, base: impl Into<String>) -> Self {
        self.metadata_api_base = Some(base.into());
        self
    }

    /// Override the audio API base URL.
    pub fn audio_api_base(mut self, base: impl Into<String>) -> Self {
        self.audio_api_base = Some(base.into());
        self
    }

    /// Select a tafsir resource.
    pub fn tafsir_resource(mut self, resource: u32) -> Self {
        self.tafsir_resource = Some(resource);
        self
    }

    /// Set the per-client LRU cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Set the event bus buffer size.
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Bound resource loads to the given duration.
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(Some(timeout));
        self
    }

    /// Let resource loads stay in flight indefinitely.
    pub fn no_load_timeout(mut self) -> Self {
        self.load_timeout = Some(None);
        self
    }

    /// Validate the configuration and build a [`CoreConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] with an actionable message when a
    /// required bridge has not been provided (and no shim covers it), and
    /// [`Error::Config`] for invalid settings.
    pub fn build(self) -> Result<CoreConfig> {
        let player = self.player;
        #[cfg(feature = "desktop-shims")]
        let player = player.or_else(|| {
            Some(Arc::new(bridge_desktop::SimulatedAudioPlayer::new()) as Arc<dyn AudioPlayer>)
        });
        let player = player.ok_or_else(|| Error::CapabilityMissing {
            capability: "AudioPlayer".to_string(),
            message: "No audio engine provided. \
                      Desktop: enable the desktop-shims feature. \
                      Mobile: inject the platform-native adapter."
                .to_string(),
        })?;

        let http_client = self.http_client;
        #[cfg(feature = "desktop-shims")]
        let http_client = http_client.or_else(|| {
            Some(Arc::new(bridge_desktop::ReqwestHttpClient::new()) as Arc<dyn HttpClient>)
        });
        let http_client = http_client.ok_or_else(|| Error::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP client provided. \
                      Desktop: enable the desktop-shims feature. \
                      Mobile: inject the platform-native adapter."
                .to_string(),
        })?;

        let cache_capacity = self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY);
        if cache_capacity == 0 {
            return Err(Error::Config(
                "cache_capacity must be greater than zero".to_string(),
            ));
        }

        let event_buffer = self.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER);
        if event_buffer == 0 {
            return Err(Error::Config(
                "event_buffer must be greater than zero".to_string(),
            ));
        }

        Ok(CoreConfig {
            player,
            http_client,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            metadata_api_base: self
                .metadata_api_base
                .unwrap_or_else(|| DEFAULT_METADATA_API_BASE.to_string()),
            audio_api_base: self
                .audio_api_base
                .unwrap_or_else(|| DEFAULT_AUDIO_API_BASE.to_string()),
            tafsir_resource: self.tafsir_resource.unwrap_or(DEFAULT_TAFSIR_RESOURCE),
            cache_capacity,
            event_buffer,
            load_timeout: self.load_timeout.unwrap_or(Some(DEFAULT_LOAD_TIMEOUT)),
        })
    }
}
