//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP client,
//! audio engine, clock) into the recitation core. Desktop apps typically
//! enable the `desktop-shims` feature, which lets [`CoreConfig`] fall back
//! to the reqwest client and the simulated audio engine from
//! `bridge-desktop`; mobile hosts inject platform-native adapters instead.
//!
//! ```ignore
//! use core_runtime::CoreConfig;
//! use core_service::CoreService;
//!
//! let config = CoreConfig::builder().build()?; // desktop shims fill the gaps
//! let core = CoreService::new(config)?;
//!
//! let reciter = core_content::reciters::default_reciter().clone();
//! core.coordinator()
//!     .play_chapter(core_content::ChapterId::new(18)?, reciter)
//!     .await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use core_content::{ContentSource, QuranApiClient, StoryCatalog, TafsirClient};
use core_playback::{PlaybackConfig, PlaybackCoordinator, SharedPlaybackState};
use core_runtime::events::EventBus;
use core_runtime::CoreConfig;
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications.
///
/// Owns the content clients, the playback coordinator, and the event bus;
/// UI surfaces reach everything through this handle.
#[derive(Clone)]
pub struct CoreService {
    events: EventBus,
    content: Arc<QuranApiClient>,
    tafsir: Arc<TafsirClient>,
    stories: Arc<StoryCatalog>,
    coordinator: PlaybackCoordinator,
}

impl CoreService {
    /// Wire the core from a validated configuration.
    ///
    /// Must be called inside a tokio runtime: the playback coordinator
    /// spawns its status driver task on construction.
    pub fn new(config: CoreConfig) -> Result<Self> {
        let events = EventBus::new(config.event_buffer);

        let content = Arc::new(
            QuranApiClient::new(
                Arc::clone(&config.http_client),
                config.metadata_api_base.clone(),
                config.audio_api_base.clone(),
                config.cache_capacity,
            )
            .with_event_bus(events.clone()),
        );

        let tafsir = Arc::new(
            TafsirClient::new(
                Arc::clone(&config.http_client),
                config.metadata_api_base.clone(),
                config.tafsir_resource,
                config.cache_capacity,
            )
            .with_event_bus(events.clone()),
        );

        let stories = Arc::new(
            StoryCatalog::bundled()
                .map_err(|e| CoreError::InitializationFailed(e.to_string()))?,
        );

        let playback_config = PlaybackConfig {
            load_timeout: config.load_timeout,
            ..PlaybackConfig::default()
        };
        let coordinator = PlaybackCoordinator::new(
            Arc::clone(&config.player),
            Arc::clone(&content) as Arc<dyn ContentSource>,
            events.clone(),
            playback_config,
        );

        info!("recitation core initialized");
        Ok(Self {
            events,
            content,
            tafsir,
            stories,
            coordinator,
        })
    }

    /// The playback coordinator (transport controls).
    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }

    /// The shared playback state observed by UI surfaces.
    pub fn playback_state(&self) -> SharedPlaybackState {
        self.coordinator.state()
    }

    /// The content lookup client.
    pub fn content(&self) -> Arc<QuranApiClient> {
        Arc::clone(&self.content)
    }

    /// The tafsir narrative client.
    pub fn tafsir(&self) -> Arc<TafsirClient> {
        Arc::clone(&self.tafsir)
    }

    /// The bundled story catalog.
    pub fn stories(&self) -> Arc<StoryCatalog> {
        Arc::clone(&self.stories)
    }

    /// The event bus carrying playback and content events.
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }
}
