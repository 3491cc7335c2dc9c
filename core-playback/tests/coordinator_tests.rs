//! Sequencing tests for the playback coordinator.
//!
//! A scripted fake engine and fake content source drive the coordinator
//! through every sequencing rule: natural completion advance, chapter
//! boundary crossing, auto-skip of verses without audio, terminal behavior
//! at the end of the text, stale-status discarding, and transport edge
//! cases.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::player::{AudioPlayer, LoadRequest, PlayerStatus, SoundId};
use core_content::error::{ContentError, Result as ContentResult};
use core_content::{reciters, Chapter, ChapterId, ContentSource, Reciter, VerseAudio};
use core_playback::{PlaybackConfig, PlaybackCoordinator, PlaybackPhase};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Fake audio engine
// ============================================================================

struct FakePlayer {
    events: broadcast::Sender<PlayerStatus>,
    loads: Mutex<Vec<String>>,
    unloads: Mutex<Vec<SoundId>>,
    plays: AtomicUsize,
    pauses: AtomicUsize,
    current: Mutex<Option<SoundId>>,
    fail_next: AtomicBool,
}

impl FakePlayer {
    fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            events,
            loads: Mutex::new(Vec::new()),
            unloads: Mutex::new(Vec::new()),
            plays: AtomicUsize::new(0),
            pauses: AtomicUsize::new(0),
            current: Mutex::new(None),
            fail_next: AtomicBool::new(false),
        }
    }

    fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }

    fn load_count(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    fn unload_count(&self) -> usize {
        self.unloads.lock().unwrap().len()
    }

    fn current(&self) -> SoundId {
        self.current.lock().unwrap().expect("no sound loaded")
    }

    fn fail_next_load(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn send(&self, status: PlayerStatus) {
        self.events.send(status).ok();
    }

    fn finish(&self, sound: SoundId) {
        self.send(PlayerStatus {
            sound,
            position: Duration::from_secs(4),
            duration: Some(Duration::from_secs(4)),
            is_playing: false,
            just_finished: true,
            error: None,
        });
    }

    fn finish_current(&self) {
        self.finish(self.current());
    }

    fn tick(&self, position: Duration, duration: Duration, is_playing: bool) {
        self.send(PlayerStatus {
            sound: self.current(),
            position,
            duration: Some(duration),
            is_playing,
            just_finished: false,
            error: None,
        });
    }

    fn error_current(&self, message: &str) {
        self.send(PlayerStatus {
            sound: self.current(),
            position: Duration::from_secs(1),
            duration: Some(Duration::from_secs(4)),
            is_playing: false,
            just_finished: false,
            error: Some(message.to_string()),
        });
    }
}

#[async_trait]
impl AudioPlayer for FakePlayer {
    async fn load(&self, request: LoadRequest) -> BridgeResult<SoundId> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            *self.current.lock().unwrap() = None;
            return Err(BridgeError::OperationFailed("fake load failure".to_string()));
        }
        self.loads.lock().unwrap().push(request.url.clone());
        let id = SoundId::new();
        *self.current.lock().unwrap() = Some(id);
        Ok(id)
    }

    async fn play(&self, _sound: SoundId) -> BridgeResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self, _sound: SoundId) -> BridgeResult<()> {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self, _sound: SoundId) -> BridgeResult<()> {
        Ok(())
    }

    async fn unload(&self, sound: SoundId) -> BridgeResult<()> {
        self.unloads.lock().unwrap().push(sound);
        let mut current = self.current.lock().unwrap();
        if *current == Some(sound) {
            *current = None;
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerStatus> {
        self.events.subscribe()
    }
}

// ============================================================================
// Fake content source
// ============================================================================

struct FakeContent {
    chapters: HashMap<u16, (Chapter, Vec<VerseAudio>)>,
}

impl FakeContent {
    fn new() -> Self {
        Self {
            chapters: HashMap::new(),
        }
    }

    /// Script a chapter whose verses carry the given audio URLs
    /// (`None` = missing audio).
    fn with_chapter(mut self, number: u16, urls: &[Option<&str>]) -> Self {
        let chapter = Chapter {
            id: ChapterId::new(number).unwrap(),
            name_simple: format!("Chapter {}", number),
            name_arabic: format!("سورة {}", number),
            revelation_place: "makkah".to_string(),
            verses_count: urls.len() as u16,
        };
        let verses = urls
            .iter()
            .enumerate()
            .map(|(i, url)| VerseAudio {
                number: i as u16 + 1,
                text: format!("verse {}", i + 1),
                audio_url: url.map(str::to_string),
            })
            .collect();
        self.chapters.insert(number, (chapter, verses));
        self
    }
}

#[async_trait]
impl ContentSource for FakeContent {
    async fn chapter(&self, chapter: ChapterId) -> ContentResult<Chapter> {
        self.chapters
            .get(&chapter.get())
            .map(|(chapter, _)| chapter.clone())
            .ok_or(ContentError::InvalidChapter(chapter.get()))
    }

    async fn verse_audio(
        &self,
        chapter: ChapterId,
        _reciter: &Reciter,
    ) -> ContentResult<Vec<VerseAudio>> {
        self.chapters
            .get(&chapter.get())
            .map(|(_, verses)| verses.clone())
            .ok_or(ContentError::InvalidChapter(chapter.get()))
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    coordinator: PlaybackCoordinator,
    player: Arc<FakePlayer>,
    events: broadcast::Receiver<CoreEvent>,
}

fn harness(content: FakeContent) -> Harness {
    let player = Arc::new(FakePlayer::new());
    let bus = EventBus::new(100);
    let events = bus.subscribe();
    let coordinator = PlaybackCoordinator::new(
        player.clone(),
        Arc::new(content),
        bus,
        PlaybackConfig::default().with_load_timeout(Duration::from_secs(1)),
    );
    Harness {
        coordinator,
        player,
        events,
    }
}

fn reciter() -> Reciter {
    reciters::default_reciter().clone()
}

fn chapter(number: u16) -> ChapterId {
    ChapterId::new(number).unwrap()
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn drain(events: &mut broadcast::Receiver<CoreEvent>) -> Vec<PlaybackEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Playback(event) = event {
            out.push(event);
        }
    }
    out
}

fn active_verse(coordinator: &PlaybackCoordinator) -> (u16, u16) {
    let snapshot = coordinator.snapshot();
    let track = snapshot.track.expect("no track loaded");
    (track.chapter.get(), track.verse_number)
}

// ============================================================================
// Sequencing
// ============================================================================

#[tokio::test]
async fn natural_completion_advances_to_next_verse() {
    let h = harness(FakeContent::new().with_chapter(
        2,
        &[Some("https://cdn.test/2/1.mp3"), Some("https://cdn.test/2/2.mp3")],
    ));

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    assert_eq!(h.player.loads(), vec!["https://cdn.test/2/1.mp3"]);
    assert_eq!(active_verse(&h.coordinator), (2, 1));

    h.player.finish_current();
    let player = h.player.clone();
    wait_until(move || player.load_count() == 2).await;

    assert_eq!(h.player.loads()[1], "https://cdn.test/2/2.mp3");
    assert_eq!(active_verse(&h.coordinator), (2, 2));
}

#[tokio::test]
async fn verses_without_audio_are_skipped_forward() {
    // Chapter 2, URLs [u1, "", u3]: verse 2 auto-skips, u3 loads next
    let h = harness(FakeContent::new().with_chapter(
        2,
        &[
            Some("https://cdn.test/2/1.mp3"),
            None,
            Some("https://cdn.test/2/3.mp3"),
        ],
    ));

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    h.player.finish_current();

    let player = h.player.clone();
    wait_until(move || player.load_count() == 2).await;

    assert_eq!(
        h.player.loads(),
        vec!["https://cdn.test/2/1.mp3", "https://cdn.test/2/3.mp3"]
    );
    assert!(h.player.loads().iter().all(|url| !url.is_empty()));
    assert_eq!(active_verse(&h.coordinator), (2, 3));
}

#[tokio::test]
async fn starting_on_a_verse_without_audio_skips_forward() {
    let h = harness(FakeContent::new().with_chapter(
        7,
        &[None, Some("https://cdn.test/7/2.mp3")],
    ));

    h.coordinator.play_chapter(chapter(7), reciter()).await.unwrap();

    assert_eq!(h.player.loads(), vec!["https://cdn.test/7/2.mp3"]);
    assert_eq!(active_verse(&h.coordinator), (7, 2));
}

#[tokio::test]
async fn completion_at_last_verse_crosses_into_next_chapter() {
    let h = harness(
        FakeContent::new()
            .with_chapter(5, &[Some("https://cdn.test/5/1.mp3")])
            .with_chapter(6, &[Some("https://cdn.test/6/1.mp3")]),
    );

    h.coordinator.play_chapter(chapter(5), reciter()).await.unwrap();
    h.player.finish_current();

    let player = h.player.clone();
    wait_until(move || player.load_count() == 2).await;
    assert_eq!(active_verse(&h.coordinator), (6, 1));

    let mut h = h;
    let events = drain(&mut h.events);
    assert!(events.contains(&PlaybackEvent::VerseCompleted { chapter: 5, verse: 1 }));
    assert!(events.contains(&PlaybackEvent::ChapterAdvanced { from: 5, to: 6 }));
}

#[tokio::test]
async fn completion_at_end_of_text_is_terminal() {
    let h = harness(FakeContent::new().with_chapter(114, &[Some("https://cdn.test/114/1.mp3")]));

    h.coordinator.play_chapter(chapter(114), reciter()).await.unwrap();
    h.player.finish_current();

    let coordinator = h.coordinator.clone();
    wait_until(move || !coordinator.snapshot().is_active()).await;

    // Terminal: session cleared, no further load issued
    assert_eq!(h.player.load_count(), 1);
    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.track, None);
    assert!(!snapshot.is_playing);
    assert!(!snapshot.mini_player_visible);
    assert_eq!(snapshot.phase, PlaybackPhase::Empty);

    let mut h = h;
    assert!(drain(&mut h.events).contains(&PlaybackEvent::EndOfContent));
}

#[tokio::test]
async fn rapid_second_load_wins_and_stale_completion_is_discarded() {
    let h = harness(
        FakeContent::new()
            .with_chapter(2, &[Some("https://cdn.test/2/1.mp3"), Some("https://cdn.test/2/2.mp3")])
            .with_chapter(3, &[Some("https://cdn.test/3/1.mp3"), Some("https://cdn.test/3/2.mp3")]),
    );

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    let stale = h.player.current();

    h.coordinator.play_chapter(chapter(3), reciter()).await.unwrap();
    assert_eq!(h.player.load_count(), 2);
    assert_eq!(active_verse(&h.coordinator), (3, 1));

    // The superseded resource completes late; nothing may change
    h.player.finish(stale);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.player.load_count(), 2);
    assert_eq!(active_verse(&h.coordinator), (3, 1));

    // The live resource still advances normally
    h.player.finish_current();
    let player = h.player.clone();
    wait_until(move || player.load_count() == 3).await;
    assert_eq!(active_verse(&h.coordinator), (3, 2));
}

// ============================================================================
// Transport controls
// ============================================================================

#[tokio::test]
async fn toggle_with_nothing_loaded_is_a_noop() {
    let h = harness(FakeContent::new());

    h.coordinator.toggle_play_pause().await.unwrap();

    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.track, None);
    assert_eq!(snapshot.phase, PlaybackPhase::Empty);
    assert_eq!(h.player.plays.load(Ordering::SeqCst), 0);
    assert_eq!(h.player.pauses.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn toggle_pauses_and_resumes() {
    let h = harness(FakeContent::new().with_chapter(2, &[Some("https://cdn.test/2/1.mp3")]));

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    h.player
        .tick(Duration::from_secs(1), Duration::from_secs(4), true);

    let coordinator = h.coordinator.clone();
    wait_until(move || coordinator.snapshot().phase == PlaybackPhase::Playing).await;

    h.coordinator.toggle_play_pause().await.unwrap();
    assert_eq!(h.player.pauses.load(Ordering::SeqCst), 1);
    let snapshot = h.coordinator.snapshot();
    assert!(!snapshot.is_playing);
    assert_eq!(snapshot.phase, PlaybackPhase::Paused);
    // Pausing retains the loaded resource and its position
    assert!(snapshot.is_active());
    assert_eq!(snapshot.progress.position, Duration::from_secs(1));

    h.coordinator.toggle_play_pause().await.unwrap();
    assert_eq!(h.player.plays.load(Ordering::SeqCst), 1);
    let snapshot = h.coordinator.snapshot();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.phase, PlaybackPhase::Playing);
}

#[tokio::test]
async fn skip_next_advances_within_chapter() {
    let h = harness(FakeContent::new().with_chapter(
        2,
        &[Some("https://cdn.test/2/1.mp3"), Some("https://cdn.test/2/2.mp3")],
    ));

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    h.coordinator.skip_next().await.unwrap();

    assert_eq!(active_verse(&h.coordinator), (2, 2));
    // The skipped resource was released
    assert_eq!(h.player.unload_count(), 1);
}

#[tokio::test]
async fn skip_next_at_last_verse_crosses_into_next_chapter() {
    let h = harness(
        FakeContent::new()
            .with_chapter(5, &[Some("https://cdn.test/5/1.mp3")])
            .with_chapter(6, &[Some("https://cdn.test/6/1.mp3")]),
    );

    h.coordinator.play_chapter(chapter(5), reciter()).await.unwrap();
    h.coordinator.skip_next().await.unwrap();

    assert_eq!(active_verse(&h.coordinator), (6, 1));
}

#[tokio::test]
async fn skip_next_at_end_of_text_is_a_reported_noop() {
    let h = harness(FakeContent::new().with_chapter(114, &[Some("https://cdn.test/114/1.mp3")]));

    h.coordinator.play_chapter(chapter(114), reciter()).await.unwrap();
    h.coordinator.skip_next().await.unwrap();

    // Session retained, nothing new loaded, end reported
    assert_eq!(h.player.load_count(), 1);
    assert_eq!(active_verse(&h.coordinator), (114, 1));
    let mut h = h;
    assert!(drain(&mut h.events).contains(&PlaybackEvent::EndOfContent));
}

#[tokio::test]
async fn skip_previous_moves_back_one_verse() {
    let h = harness(FakeContent::new().with_chapter(
        2,
        &[Some("https://cdn.test/2/1.mp3"), Some("https://cdn.test/2/2.mp3")],
    ));

    h.coordinator.play_verse(chapter(2), 2, reciter()).await.unwrap();
    assert_eq!(active_verse(&h.coordinator), (2, 2));

    h.coordinator.skip_previous().await.unwrap();
    assert_eq!(active_verse(&h.coordinator), (2, 1));
    assert_eq!(
        h.player.loads(),
        vec!["https://cdn.test/2/2.mp3", "https://cdn.test/2/1.mp3"]
    );
}

#[tokio::test]
async fn skip_previous_at_first_verse_is_a_noop() {
    let h = harness(FakeContent::new().with_chapter(
        2,
        &[Some("https://cdn.test/2/1.mp3"), Some("https://cdn.test/2/2.mp3")],
    ));

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    h.coordinator.skip_previous().await.unwrap();

    // Backward skips do not cross chapter boundaries
    assert_eq!(h.player.load_count(), 1);
    assert_eq!(active_verse(&h.coordinator), (2, 1));
}

#[tokio::test]
async fn skip_with_nothing_loaded_is_a_noop() {
    let h = harness(FakeContent::new());

    h.coordinator.skip_next().await.unwrap();
    h.coordinator.skip_previous().await.unwrap();

    assert_eq!(h.player.load_count(), 0);
    assert_eq!(h.coordinator.snapshot().track, None);
}

#[tokio::test]
async fn stop_and_clear_resets_everything() {
    let h = harness(FakeContent::new().with_chapter(2, &[Some("https://cdn.test/2/1.mp3")]));

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    h.player
        .tick(Duration::from_secs(2), Duration::from_secs(4), true);

    let coordinator = h.coordinator.clone();
    wait_until(move || coordinator.snapshot().progress.position == Duration::from_secs(2)).await;

    h.coordinator.stop_and_clear().await.unwrap();

    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.track, None);
    assert_eq!(snapshot.progress.position, Duration::ZERO);
    assert_eq!(snapshot.progress.duration, Duration::ZERO);
    assert!(!snapshot.is_playing);
    assert!(!snapshot.mini_player_visible);
    assert!(h.player.unload_count() >= 1);

    // Idempotent
    h.coordinator.stop_and_clear().await.unwrap();
    assert_eq!(h.coordinator.snapshot(), core_playback::PlayerSnapshot::empty());
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn load_failure_clears_session_and_surfaces_error() {
    let h = harness(FakeContent::new().with_chapter(2, &[Some("https://cdn.test/2/1.mp3")]));
    h.player.fail_next_load();

    let err = h
        .coordinator
        .play_chapter(chapter(2), reciter())
        .await
        .unwrap_err();
    assert!(matches!(err, core_playback::PlaybackError::LoadFailed { .. }));
    assert!(err.is_load_error());
    assert!(err.is_transient());

    // No partial or stale track is ever shown
    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.track, None);
    assert_eq!(snapshot.phase, PlaybackPhase::Empty);

    let mut h = h;
    assert!(drain(&mut h.events)
        .iter()
        .any(|event| matches!(event, PlaybackEvent::Error { .. })));
}

#[tokio::test]
async fn mid_playback_error_is_treated_as_completion() {
    let h = harness(FakeContent::new().with_chapter(
        2,
        &[Some("https://cdn.test/2/1.mp3"), Some("https://cdn.test/2/2.mp3")],
    ));

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    h.player.error_current("decoder stall");

    // The sequence continues rather than stalling
    let player = h.player.clone();
    wait_until(move || player.load_count() == 2).await;
    assert_eq!(active_verse(&h.coordinator), (2, 2));

    let mut h = h;
    assert!(drain(&mut h.events)
        .iter()
        .any(|event| matches!(event, PlaybackEvent::Error { recoverable: true, .. })));
}

#[tokio::test]
async fn play_verse_out_of_range_fails() {
    let h = harness(FakeContent::new().with_chapter(2, &[Some("https://cdn.test/2/1.mp3")]));

    let result = h.coordinator.play_verse(chapter(2), 99, reciter()).await;
    assert!(matches!(
        result,
        Err(core_playback::PlaybackError::VerseOutOfRange { chapter: 2, verse: 99 })
    ));
    assert_eq!(h.coordinator.snapshot().track, None);
}

#[tokio::test]
async fn content_failure_clears_session() {
    // Chapter 9 is not scripted; lookup fails
    let h = harness(FakeContent::new());

    let result = h.coordinator.play_chapter(chapter(9), reciter()).await;
    assert!(matches!(
        result,
        Err(core_playback::PlaybackError::Content(_))
    ));
    assert_eq!(h.coordinator.snapshot().track, None);
}

// ============================================================================
// Progress projection
// ============================================================================

#[tokio::test]
async fn progress_updates_flow_to_the_shared_state() {
    let h = harness(FakeContent::new().with_chapter(2, &[Some("https://cdn.test/2/1.mp3")]));

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();
    assert_eq!(h.coordinator.snapshot().phase, PlaybackPhase::Loading);

    h.player
        .tick(Duration::from_millis(1500), Duration::from_secs(3), true);

    let coordinator = h.coordinator.clone();
    wait_until(move || coordinator.snapshot().phase == PlaybackPhase::Playing).await;

    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.progress.position, Duration::from_millis(1500));
    assert_eq!(snapshot.progress.duration, Duration::from_secs(3));
    assert!((snapshot.progress.fraction() - 0.5).abs() < 1e-9);
    assert!(snapshot.mini_player_visible);
}

#[tokio::test]
async fn subscribers_observe_the_session_consistently() {
    let h = harness(FakeContent::new().with_chapter(2, &[Some("https://cdn.test/2/1.mp3")]));

    let state = h.coordinator.state();
    let rx1 = state.subscribe();
    let rx2 = state.subscribe();

    h.coordinator.play_chapter(chapter(2), reciter()).await.unwrap();

    let one = rx1.borrow().clone();
    let two = rx2.borrow().clone();
    assert_eq!(one, two);
    assert_eq!(one.track.unwrap().chapter_name, "Chapter 2");
}
