//! Playback coordinator.
//!
//! Drives verse-by-verse, chapter-by-chapter sequential playback over the
//! platform audio engine and owns the session exclusively: every mutation
//! of track, progress, or play flag funnels through the operations here,
//! and UI surfaces only ever observe the published snapshots.
//!
//! ## Sequencing rules
//!
//! - Natural completion of a verse advances to the next verse; at the last
//!   verse of a chapter it advances to verse 1 of the next chapter, and at
//!   the last verse of the final chapter the session ends.
//! - An explicit skip forward follows the same forward rule, except at the
//!   very end of the text, where it is a reported no-op.
//! - Skip backward stays within the chapter and is a no-op at verse 1.
//! - Verses without an audio URL are skipped forward automatically, never
//!   loaded and never surfaced as errors.
//!
//! ## Generation tagging
//!
//! Every load mints a fresh [`SoundId`]; status updates carrying any other
//! id are discarded. Two `play_*` calls in rapid succession therefore leave
//! exactly one active track (the latest), and the superseded load's
//! completion can never mutate the new session.

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::session::{PlaybackPhase, PlaybackProgress, PlayerSnapshot, TrackRef};
use crate::state::SharedPlaybackState;
use bridge_traits::player::{AudioPlayer, LoadRequest, PlayerStatus, SoundId};
use core_content::{Chapter, ChapterId, ContentSource, Reciter, VerseAudio};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// The coordinator's exclusive session state.
struct Session {
    chapter: Chapter,
    reciter: Reciter,
    verses: Vec<VerseAudio>,
    /// 0-based index into `verses`.
    index: usize,
    /// Generation tag of the loaded resource.
    sound: SoundId,
    playing: bool,
}

impl Session {
    fn verse_number(&self) -> u16 {
        self.verses[self.index].number
    }

    fn track(&self) -> TrackRef {
        TrackRef {
            chapter: self.chapter.id,
            verse_number: self.verse_number(),
            reciter: self.reciter.clone(),
            chapter_name: self.chapter.name_simple.clone(),
        }
    }
}

struct Inner {
    player: Arc<dyn AudioPlayer>,
    content: Arc<dyn ContentSource>,
    state: SharedPlaybackState,
    events: EventBus,
    config: PlaybackConfig,
    session: Mutex<Option<Session>>,
}

/// Sequential playback coordinator.
///
/// Cheap to clone; all clones drive the same session. Must be created
/// inside a tokio runtime: construction spawns the driver task that
/// consumes the engine's status updates.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    inner: Arc<Inner>,
}

impl PlaybackCoordinator {
    /// Create a coordinator over the given engine and content source.
    pub fn new(
        player: Arc<dyn AudioPlayer>,
        content: Arc<dyn ContentSource>,
        events: EventBus,
        config: PlaybackConfig,
    ) -> Self {
        let inner = Arc::new(Inner {
            player,
            content,
            state: SharedPlaybackState::new(),
            events,
            config,
            session: Mutex::new(None),
        });
        Self::spawn_driver(&inner);
        Self { inner }
    }

    /// The driver task is the only consumer of engine status updates; it
    /// exits once every coordinator handle has been dropped.
    fn spawn_driver(inner: &Arc<Inner>) {
        let mut receiver = inner.player.subscribe();
        let weak = Arc::downgrade(inner);
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(status) => {
                        let Some(inner) = weak.upgrade() else { break };
                        inner.handle_status(status).await;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "player status updates lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// The shared state handle UI surfaces subscribe to.
    pub fn state(&self) -> SharedPlaybackState {
        self.inner.state.clone()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.inner.state.snapshot()
    }

    /// Start a chapter from its first playable verse.
    pub async fn play_chapter(&self, chapter: ChapterId, reciter: Reciter) -> Result<()> {
        self.play_verse(chapter, 1, reciter).await
    }

    /// Start playback at a specific verse of a chapter.
    ///
    /// Replaces any current session. If the requested verse has no audio,
    /// playback starts at the next verse that does.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::LoadFailed`] / [`PlaybackError::LoadTimeout`] when
    /// the engine cannot load the resource; the session is left cleared.
    /// [`PlaybackError::VerseOutOfRange`] when the verse does not exist.
    pub async fn play_verse(
        &self,
        chapter: ChapterId,
        verse: u16,
        reciter: Reciter,
    ) -> Result<()> {
        let mut guard = self.inner.session.lock().await;
        self.inner.start_at(&mut guard, chapter, verse, reciter).await
    }

    /// Pause if playing, resume if paused. No-op when nothing is loaded.
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let mut guard = self.inner.session.lock().await;
        self.inner.toggle(&mut guard).await
    }

    /// Skip forward to the next playable verse, crossing into the next
    /// chapter at a chapter's end. At the very end of the text this is a
    /// reported no-op.
    pub async fn skip_next(&self) -> Result<()> {
        let mut guard = self.inner.session.lock().await;
        self.inner.advance_forward(&mut guard, true).await
    }

    /// Skip back one verse within the current chapter. No-op at verse 1;
    /// backward skips never cross chapter boundaries.
    pub async fn skip_previous(&self) -> Result<()> {
        let mut guard = self.inner.session.lock().await;
        self.inner.skip_previous(&mut guard).await
    }

    /// Stop and unload the engine, clear the session, hide the mini-player.
    /// Idempotent.
    pub async fn stop_and_clear(&self) -> Result<()> {
        let mut guard = self.inner.session.lock().await;
        self.inner.stop(&mut guard).await
    }
}

impl Inner {
    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        self.events.emit(CoreEvent::Playback(event)).ok();
    }

    /// Clear the session, publish the empty state, report the failure.
    /// Prior session state is never left half-initialized.
    fn fail(
        &self,
        slot: &mut Option<Session>,
        failure: PlaybackError,
        chapter: Option<u16>,
        verse: Option<u16>,
    ) -> PlaybackError {
        *slot = None;
        self.state.publish(PlayerSnapshot::empty());
        error!(error = %failure, "playback sequence failed");
        self.emit(PlaybackEvent::Error {
            chapter,
            verse,
            message: failure.to_string(),
            recoverable: failure.is_transient(),
        });
        failure
    }

    async fn start_at(
        &self,
        slot: &mut Option<Session>,
        chapter_id: ChapterId,
        verse: u16,
        reciter: Reciter,
    ) -> Result<()> {
        // Exclusive channel: drop whatever was loaded before the new
        // sequence begins.
        if let Some(old) = slot.take() {
            self.player.unload(old.sound).await.ok();
            self.state.publish(PlayerSnapshot::empty());
        }

        let chapter = match self.content.chapter(chapter_id).await {
            Ok(chapter) => chapter,
            Err(e) => return Err(self.fail(slot, e.into(), Some(chapter_id.get()), Some(verse))),
        };
        let verses = match self.content.verse_audio(chapter_id, &reciter).await {
            Ok(verses) => verses,
            Err(e) => return Err(self.fail(slot, e.into(), Some(chapter_id.get()), Some(verse))),
        };

        if verse == 0 || verse as usize > verses.len() {
            let failure = PlaybackError::VerseOutOfRange {
                chapter: chapter_id.get(),
                verse,
            };
            return Err(self.fail(slot, failure, Some(chapter_id.get()), Some(verse)));
        }

        self.play_from(slot, chapter, reciter, verses, verse as usize - 1)
            .await
    }

    /// Load the first playable verse at or after `index`, crossing chapter
    /// boundaries forward as needed. Reaching the end of the text clears
    /// the session and reports [`PlaybackEvent::EndOfContent`].
    async fn play_from(
        &self,
        slot: &mut Option<Session>,
        mut chapter: Chapter,
        reciter: Reciter,
        mut verses: Vec<VerseAudio>,
        mut index: usize,
    ) -> Result<()> {
        loop {
            while index < verses.len() && !verses[index].has_audio() {
                debug!(
                    chapter = chapter.id.get(),
                    verse = verses[index].number,
                    "skipping verse without audio"
                );
                index += 1;
            }
            if index < verses.len() {
                return self.load_verse(slot, chapter, reciter, verses, index).await;
            }

            let Some(next_id) = chapter.id.next() else {
                *slot = None;
                self.state.publish(PlayerSnapshot::empty());
                info!("end of content reached");
                self.emit(PlaybackEvent::EndOfContent);
                return Ok(());
            };

            let from = chapter.id.get();
            chapter = match self.content.chapter(next_id).await {
                Ok(chapter) => chapter,
                Err(e) => return Err(self.fail(slot, e.into(), Some(next_id.get()), None)),
            };
            verses = match self.content.verse_audio(next_id, &reciter).await {
                Ok(verses) => verses,
                Err(e) => return Err(self.fail(slot, e.into(), Some(next_id.get()), None)),
            };
            index = 0;
            self.emit(PlaybackEvent::ChapterAdvanced {
                from,
                to: next_id.get(),
            });
        }
    }

    async fn load_verse(
        &self,
        slot: &mut Option<Session>,
        chapter: Chapter,
        reciter: Reciter,
        verses: Vec<VerseAudio>,
        index: usize,
    ) -> Result<()> {
        let verse_number = verses[index].number;
        // Caller guarantees has_audio()
        let url = verses[index].audio_url.clone().unwrap_or_default();

        let mut request = LoadRequest::new(url.as_str());
        if let Some(hint) = &self.config.format_hint {
            request = request.with_format_hint(hint.clone());
        }

        debug!(
            chapter = chapter.id.get(),
            verse = verse_number,
            url = %url,
            "loading verse audio"
        );

        let load = self.player.load(request);
        let loaded = match self.config.load_timeout {
            Some(bound) => match tokio::time::timeout(bound, load).await {
                Ok(result) => result,
                Err(_) => {
                    let failure = PlaybackError::LoadTimeout { url };
                    return Err(self.fail(
                        slot,
                        failure,
                        Some(chapter.id.get()),
                        Some(verse_number),
                    ));
                }
            },
            None => load.await,
        };
        let sound = match loaded {
            Ok(sound) => sound,
            Err(e) => {
                let failure = PlaybackError::LoadFailed {
                    url,
                    reason: e.to_string(),
                };
                return Err(self.fail(
                    slot,
                    failure,
                    Some(chapter.id.get()),
                    Some(verse_number),
                ));
            }
        };

        self.emit(PlaybackEvent::Started {
            chapter: chapter.id.get(),
            verse: verse_number,
            reciter: reciter.edition.clone(),
        });

        let session = Session {
            chapter,
            reciter,
            verses,
            index,
            sound,
            playing: true,
        };
        let snapshot = PlayerSnapshot {
            track: Some(session.track()),
            progress: PlaybackProgress::default(),
            is_playing: true,
            mini_player_visible: true,
            phase: PlaybackPhase::Loading,
        };
        *slot = Some(session);
        self.state.publish(snapshot);
        Ok(())
    }

    /// Advance to the next playable verse. `explicit` marks a user skip,
    /// which at the very end of the text is a no-op instead of a teardown.
    async fn advance_forward(&self, slot: &mut Option<Session>, explicit: bool) -> Result<()> {
        let Some(session) = slot.as_ref() else {
            // Nothing loaded: skip is a no-op
            return Ok(());
        };

        if explicit && session.chapter.id.is_last() {
            let mut next = session.index + 1;
            while next < session.verses.len() && !session.verses[next].has_audio() {
                next += 1;
            }
            if next >= session.verses.len() {
                // Terminal no-op: stay on the final verse, just report it.
                self.emit(PlaybackEvent::EndOfContent);
                return Ok(());
            }
        }

        let Some(session) = slot.take() else {
            return Ok(());
        };
        let Session {
            chapter,
            reciter,
            verses,
            index,
            sound,
            ..
        } = session;
        // On explicit skip the current resource is still playing; release
        // it before the next load.
        self.player.unload(sound).await.ok();
        self.play_from(slot, chapter, reciter, verses, index + 1).await
    }

    async fn skip_previous(&self, slot: &mut Option<Session>) -> Result<()> {
        let Some(session) = slot.as_ref() else {
            return Ok(());
        };
        // Backward skips never cross a chapter boundary
        if session.index == 0 {
            return Ok(());
        }
        let target = session.index - 1;

        let Some(session) = slot.take() else {
            return Ok(());
        };
        let Session {
            chapter,
            reciter,
            verses,
            sound,
            ..
        } = session;
        self.player.unload(sound).await.ok();
        self.play_from(slot, chapter, reciter, verses, target).await
    }

    async fn toggle(&self, slot: &mut Option<Session>) -> Result<()> {
        let Some(session) = slot.as_mut() else {
            // Nothing loaded: must not throw, must not create a track
            return Ok(());
        };

        let chapter = session.chapter.id.get();
        let verse = session.verse_number();
        if session.playing {
            self.player.pause(session.sound).await?;
            session.playing = false;
            self.state.update(|snapshot| {
                snapshot.is_playing = false;
                if snapshot.phase == PlaybackPhase::Playing {
                    snapshot.phase = PlaybackPhase::Paused;
                }
            });
            let position_ms = self.state.snapshot().progress.position.as_millis() as u64;
            self.emit(PlaybackEvent::Paused {
                chapter,
                verse,
                position_ms,
            });
        } else {
            self.player.play(session.sound).await?;
            session.playing = true;
            self.state.update(|snapshot| {
                snapshot.is_playing = true;
                if snapshot.phase == PlaybackPhase::Paused {
                    snapshot.phase = PlaybackPhase::Playing;
                }
            });
            let position_ms = self.state.snapshot().progress.position.as_millis() as u64;
            self.emit(PlaybackEvent::Resumed {
                chapter,
                verse,
                position_ms,
            });
        }
        Ok(())
    }

    async fn stop(&self, slot: &mut Option<Session>) -> Result<()> {
        if let Some(session) = slot.take() {
            // Best-effort: the session is cleared regardless
            self.player.stop(session.sound).await.ok();
            self.player.unload(session.sound).await.ok();
            info!("playback stopped and cleared");
            self.emit(PlaybackEvent::Stopped);
        }
        self.state.publish(PlayerSnapshot::empty());
        Ok(())
    }

    /// Apply one engine status update to the session.
    async fn handle_status(&self, status: PlayerStatus) {
        let mut guard = self.session.lock().await;
        let slot = &mut *guard;
        let Some(session) = slot.as_mut() else {
            return;
        };
        if session.sound != status.sound {
            // Superseded resource; its updates must not touch this session
            debug!("discarding status update for superseded resource");
            return;
        }

        let chapter = session.chapter.id.get();
        let verse = session.verse_number();

        if let Some(message) = status.error {
            // Mid-playback failures are logged and treated as completion so
            // the sequence continues rather than stalls.
            warn!(chapter, verse, %message, "mid-playback error, continuing sequence");
            self.emit(PlaybackEvent::Error {
                chapter: Some(chapter),
                verse: Some(verse),
                message,
                recoverable: true,
            });
            if let Err(e) = self.advance_forward(slot, false).await {
                error!(error = %e, "failed to advance after playback error");
            }
            return;
        }

        if status.just_finished {
            self.emit(PlaybackEvent::VerseCompleted { chapter, verse });
            if let Err(e) = self.advance_forward(slot, false).await {
                error!(error = %e, "failed to advance after verse completion");
            }
            return;
        }

        session.playing = status.is_playing;
        let snapshot = PlayerSnapshot {
            track: Some(session.track()),
            progress: PlaybackProgress::new(
                status.position,
                status.duration.unwrap_or(Duration::ZERO),
            ),
            is_playing: status.is_playing,
            mini_player_visible: true,
            phase: if status.is_playing {
                PlaybackPhase::Playing
            } else {
                PlaybackPhase::Paused
            },
        };
        self.state.publish(snapshot);
    }
}
