//! Simulated audio engine.
//!
//! A deterministic [`AudioPlayer`] implementation for development and
//! integration tests. Instead of decoding audio it advances a position
//! counter on a timer, honoring the exclusive-channel contract: loading a
//! new resource replaces the prior one, and a sound's final status update
//! carries `just_finished`.
//!
//! Real hosts ship a native engine; nothing in the core distinguishes the
//! two beyond the trait.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::player::{AudioPlayer, LoadRequest, PlayerStatus, SoundId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
struct ActiveSound {
    id: SoundId,
    position: Duration,
    duration: Duration,
    playing: bool,
}

#[derive(Debug, Default)]
struct EngineState {
    active: Option<ActiveSound>,
}

/// Deterministic stand-in for a platform audio engine.
///
/// Every loaded resource "plays" for a fixed duration, advancing its
/// position once per tick and emitting a status update each time. Tests can
/// shorten both to keep runs fast.
pub struct SimulatedAudioPlayer {
    state: Arc<Mutex<EngineState>>,
    events: broadcast::Sender<PlayerStatus>,
    sound_duration: Duration,
    tick: Duration,
}

impl SimulatedAudioPlayer {
    /// Create an engine where every resource lasts five seconds.
    pub fn new() -> Self {
        Self::with_timing(Duration::from_secs(5), Duration::from_millis(250))
    }

    /// Create an engine with explicit per-resource duration and tick interval.
    pub fn with_timing(sound_duration: Duration, tick: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(EngineState::default())),
            events,
            sound_duration,
            tick,
        }
    }

    fn status_of(active: &ActiveSound) -> PlayerStatus {
        PlayerStatus {
            sound: active.id,
            position: active.position,
            duration: Some(active.duration),
            is_playing: active.playing,
            just_finished: false,
            error: None,
        }
    }

    fn emit(&self, status: PlayerStatus) {
        // Nobody listening is fine; the engine does not care.
        self.events.send(status).ok();
    }

    fn spawn_ticker(&self, id: SoundId) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let tick = self.tick;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tick).await;

                let status = {
                    let mut guard = state.lock();
                    let Some(active) = guard.active.as_mut() else {
                        return;
                    };
                    // A newer load replaced us; this ticker is done.
                    if active.id != id {
                        return;
                    }
                    if !active.playing {
                        continue;
                    }

                    active.position = (active.position + tick).min(active.duration);
                    let finished = active.position >= active.duration;
                    let mut status = Self::status_of(active);
                    if finished {
                        status.is_playing = false;
                        status.just_finished = true;
                        guard.active = None;
                    }
                    status
                };

                let finished = status.just_finished;
                events.send(status).ok();
                if finished {
                    return;
                }
            }
        });
    }
}

impl Default for SimulatedAudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioPlayer for SimulatedAudioPlayer {
    async fn load(&self, request: LoadRequest) -> Result<SoundId> {
        if request.url.trim().is_empty() {
            return Err(BridgeError::OperationFailed(
                "cannot load an empty URL".to_string(),
            ));
        }

        let id = SoundId::new();
        {
            let mut guard = self.state.lock();
            // Exclusive channel: the prior resource is gone the moment a new
            // load is accepted.
            guard.active = Some(ActiveSound {
                id,
                position: Duration::ZERO,
                duration: self.sound_duration,
                playing: request.autoplay,
            });
        }
        debug!(url = %request.url, "simulated engine loaded resource");

        self.emit(PlayerStatus {
            sound: id,
            position: Duration::ZERO,
            duration: Some(self.sound_duration),
            is_playing: request.autoplay,
            just_finished: false,
            error: None,
        });
        self.spawn_ticker(id);
        Ok(id)
    }

    async fn play(&self, sound: SoundId) -> Result<()> {
        let status = {
            let mut guard = self.state.lock();
            let active = guard
                .active
                .as_mut()
                .filter(|a| a.id == sound)
                .ok_or_else(|| BridgeError::NotAvailable("stale sound handle".to_string()))?;
            active.playing = true;
            Self::status_of(active)
        };
        self.emit(status);
        Ok(())
    }

    async fn pause(&self, sound: SoundId) -> Result<()> {
        let status = {
            let mut guard = self.state.lock();
            let active = guard
                .active
                .as_mut()
                .filter(|a| a.id == sound)
                .ok_or_else(|| BridgeError::NotAvailable("stale sound handle".to_string()))?;
            active.playing = false;
            Self::status_of(active)
        };
        self.emit(status);
        Ok(())
    }

    async fn stop(&self, sound: SoundId) -> Result<()> {
        let status = {
            let mut guard = self.state.lock();
            let active = guard
                .active
                .as_mut()
                .filter(|a| a.id == sound)
                .ok_or_else(|| BridgeError::NotAvailable("stale sound handle".to_string()))?;
            active.playing = false;
            active.position = Duration::ZERO;
            Self::status_of(active)
        };
        self.emit(status);
        Ok(())
    }

    async fn unload(&self, sound: SoundId) -> Result<()> {
        let mut guard = self.state.lock();
        if guard.active.as_ref().is_some_and(|a| a.id == sound) {
            guard.active = None;
        }
        // Unloading a superseded handle is a no-op.
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerStatus> {
        self.events.subscribe()
    }
}
