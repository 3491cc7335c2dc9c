//! Quran content API client.
//!
//! Resolves chapter metadata, per-verse recitation audio, and verse text
//! with translations. Chapter metadata comes from the quran.com v4 API;
//! verse text and audio come from the alquran.cloud v1 API, the latter
//! parameterized by reciter edition.
//!
//! Every fetched chapter is cached (LRU keyed by chapter, and by edition
//! for audio), so a sequential playback session touches the network once
//! per chapter.

use crate::error::{ContentError, Result};
use crate::reciters::Reciter;
use crate::types::{
    validate_verse_sequence, Chapter, ChapterId, Verse, VerseAudio, VerseRange,
};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::events::{ContentEvent, CoreEvent, EventBus};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

/// Text edition pair requested for reader surfaces: original + translation.
const TEXT_EDITIONS: &str = "quran-uthmani,en.asad";

// ============================================================================
// API Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChaptersResponse {
    chapters: Vec<ChapterDto>,
}

#[derive(Debug, Deserialize)]
struct ChapterDto {
    id: u16,
    revelation_place: String,
    name_simple: String,
    name_arabic: String,
    verses_count: u16,
}

impl ChapterDto {
    fn into_chapter(self) -> Result<Chapter> {
        Ok(Chapter {
            id: ChapterId::new(self.id)?,
            name_simple: self.name_simple,
            name_arabic: self.name_arabic,
            revelation_place: self.revelation_place,
            verses_count: self.verses_count,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SurahResponse {
    code: u16,
    data: SurahDto,
}

#[derive(Debug, Deserialize)]
struct SurahEditionsResponse {
    code: u16,
    data: Vec<SurahDto>,
}

#[derive(Debug, Deserialize)]
struct SurahDto {
    ayahs: Vec<AyahDto>,
}

#[derive(Debug, Deserialize)]
struct AyahDto {
    #[serde(rename = "numberInSurah")]
    number_in_surah: u16,
    #[serde(default)]
    text: String,
    #[serde(default)]
    audio: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the two Quran content APIs, with per-chapter caching.
pub struct QuranApiClient {
    http: Arc<dyn HttpClient>,
    metadata_base: String,
    audio_base: String,
    event_bus: Option<EventBus>,
    chapters: Mutex<Option<Arc<Vec<Chapter>>>>,
    audio_cache: Mutex<LruCache<(u16, String), Arc<Vec<VerseAudio>>>>,
    verses_cache: Mutex<LruCache<u16, Arc<Vec<Verse>>>>,
}

impl QuranApiClient {
    /// Create a client against the given API bases.
    ///
    /// `cache_capacity` bounds how many chapters are retained per cache; a
    /// zero capacity is clamped to one.
    pub fn new(
        http: Arc<dyn HttpClient>,
        metadata_base: impl Into<String>,
        audio_base: impl Into<String>,
        cache_capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            http,
            metadata_base: metadata_base.into(),
            audio_base: audio_base.into(),
            event_bus: None,
            chapters: Mutex::new(None),
            audio_cache: Mutex::new(LruCache::new(capacity)),
            verses_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Emit content events on the given bus.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn emit(&self, event: ContentEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Content(event)).ok();
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "fetching content");
        let response = self.http.execute(HttpRequest::get(url)).await?;
        if !response.is_success() {
            return Err(ContentError::Api {
                status: response.status,
                url: url.to_string(),
            });
        }
        serde_json::from_slice(&response.body).map_err(|e| ContentError::Decode(e.to_string()))
    }

    /// The full ordered chapter list.
    pub async fn chapters(&self) -> Result<Arc<Vec<Chapter>>> {
        if let Some(cached) = self.chapters.lock().clone() {
            return Ok(cached);
        }

        let url = format!("{}/chapters?language=en", self.metadata_base);
        let response: ChaptersResponse = self.fetch_json(&url).await?;
        let chapters = response
            .chapters
            .into_iter()
            .map(ChapterDto::into_chapter)
            .collect::<Result<Vec<_>>>()?;

        info!(count = chapters.len(), "loaded chapter list");
        self.emit(ContentEvent::ChaptersLoaded {
            count: chapters.len(),
        });

        let chapters = Arc::new(chapters);
        *self.chapters.lock() = Some(Arc::clone(&chapters));
        Ok(chapters)
    }

    /// Metadata for a single chapter.
    pub async fn chapter(&self, chapter: ChapterId) -> Result<Chapter> {
        let chapters = self.chapters().await?;
        chapters
            .iter()
            .find(|c| c.id == chapter)
            .cloned()
            .ok_or_else(|| {
                ContentError::Decode(format!("chapter {} missing from chapter list", chapter))
            })
    }

    /// The ordered verse-audio list for one chapter and reciter.
    ///
    /// The returned list is validated to be contiguous starting at verse 1.
    /// Blank audio URLs are normalized to `None`.
    pub async fn verse_audio(
        &self,
        chapter: ChapterId,
        reciter: &Reciter,
    ) -> Result<Arc<Vec<VerseAudio>>> {
        let key = (chapter.get(), reciter.edition.clone());
        if let Some(cached) = self.audio_cache.lock().get(&key) {
            return Ok(Arc::clone(cached));
        }

        let url = format!(
            "{}/surah/{}/{}",
            self.audio_base,
            chapter,
            urlencoding::encode(&reciter.edition)
        );
        let response: SurahResponse = self.fetch_json(&url).await?;
        if response.code != 200 {
            return Err(ContentError::Api {
                status: response.code,
                url,
            });
        }

        let entries: Vec<VerseAudio> = response
            .data
            .ayahs
            .into_iter()
            .map(|ayah| VerseAudio {
                number: ayah.number_in_surah,
                text: ayah.text,
                audio_url: ayah
                    .audio
                    .filter(|audio| !audio.trim().is_empty()),
            })
            .collect();
        validate_verse_sequence(&entries)?;

        info!(
            chapter = chapter.get(),
            reciter = %reciter.edition,
            verses = entries.len(),
            "loaded verse audio list"
        );
        self.emit(ContentEvent::VerseAudioLoaded {
            chapter: chapter.get(),
            reciter: reciter.edition.clone(),
            verses: entries.len(),
        });

        let entries = Arc::new(entries);
        self.audio_cache.lock().put(key, Arc::clone(&entries));
        Ok(entries)
    }

    /// Verse text and translation for the verses of a story.
    pub async fn story_verses(
        &self,
        chapter: ChapterId,
        range: VerseRange,
    ) -> Result<Vec<Verse>> {
        let verses = self.chapter_verses(chapter).await?;
        Ok(verses
            .iter()
            .filter(|verse| range.contains(verse.number))
            .cloned()
            .collect())
    }

    async fn chapter_verses(&self, chapter: ChapterId) -> Result<Arc<Vec<Verse>>> {
        if let Some(cached) = self.verses_cache.lock().get(&chapter.get()) {
            return Ok(Arc::clone(cached));
        }

        let url = format!(
            "{}/surah/{}/editions/{}",
            self.audio_base, chapter, TEXT_EDITIONS
        );
        let response: SurahEditionsResponse = self.fetch_json(&url).await?;
        if response.code != 200 {
            return Err(ContentError::Api {
                status: response.code,
                url,
            });
        }

        let mut editions = response.data.into_iter();
        let (Some(original), Some(translation)) = (editions.next(), editions.next()) else {
            return Err(ContentError::Decode(
                "editions response missing original or translation".to_string(),
            ));
        };

        let verses: Vec<Verse> = original
            .ayahs
            .into_iter()
            .enumerate()
            .map(|(index, ayah)| Verse {
                number: ayah.number_in_surah,
                text: ayah.text,
                translation: translation
                    .ayahs
                    .get(index)
                    .map(|t| t.text.clone())
                    .unwrap_or_default(),
            })
            .collect();

        debug!(chapter = chapter.get(), verses = verses.len(), "loaded chapter text");

        let verses = Arc::new(verses);
        self.verses_cache.lock().put(chapter.get(), Arc::clone(&verses));
        Ok(verses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reciters;
    use async_trait::async_trait;
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// Canned-response HTTP client recording requested URLs.
    struct CannedHttp {
        responses: StdMutex<HashMap<String, (u16, &'static str)>>,
        requests: StdMutex<Vec<String>>,
    }

    impl CannedHttp {
        fn new() -> Self {
            Self {
                responses: StdMutex::new(HashMap::new()),
                requests: StdMutex::new(Vec::new()),
            }
        }

        fn stub(self, url: &str, status: u16, body: &'static str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), (status, body));
            self
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpClient for CannedHttp {
        async fn execute(
            &self,
            request: HttpRequest,
        ) -> bridge_traits::error::Result<HttpResponse> {
            self.requests.lock().unwrap().push(request.url.clone());
            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .get(&request.url)
                .copied()
                .unwrap_or((404, "{}"));
            Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from_static(body.as_bytes()),
            })
        }
    }

    const CHAPTERS_JSON: &str = r#"{
        "chapters": [
            {"id": 1, "revelation_place": "makkah", "name_simple": "Al-Fatihah",
             "name_arabic": "الفاتحة", "verses_count": 7},
            {"id": 18, "revelation_place": "makkah", "name_simple": "Al-Kahf",
             "name_arabic": "الكهف", "verses_count": 110}
        ]
    }"#;

    const SURAH_AUDIO_JSON: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "ayahs": [
                {"numberInSurah": 1, "text": "one", "audio": "https://cdn.example/1.mp3"},
                {"numberInSurah": 2, "text": "two", "audio": ""},
                {"numberInSurah": 3, "text": "three", "audio": "https://cdn.example/3.mp3"}
            ]
        }
    }"#;

    const EDITIONS_JSON: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": [
            {"ayahs": [
                {"numberInSurah": 1, "text": "أ"},
                {"numberInSurah": 2, "text": "ب"}
            ]},
            {"ayahs": [
                {"numberInSurah": 1, "text": "first"},
                {"numberInSurah": 2, "text": "second"}
            ]}
        ]
    }"#;

    fn client(http: Arc<CannedHttp>) -> QuranApiClient {
        QuranApiClient::new(
            http,
            "https://meta.test/api/v4",
            "https://audio.test/v1",
            8,
        )
    }

    #[tokio::test]
    async fn chapters_are_fetched_and_cached() {
        let http = Arc::new(CannedHttp::new().stub(
            "https://meta.test/api/v4/chapters?language=en",
            200,
            CHAPTERS_JSON,
        ));
        let client = client(Arc::clone(&http));

        let chapters = client.chapters().await.unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].name_simple, "Al-Kahf");
        assert_eq!(chapters[1].verses_count, 110);

        // Second call is served from cache, no extra request
        client.chapters().await.unwrap();
        assert_eq!(http.request_count(), 1);
    }

    #[tokio::test]
    async fn verse_audio_normalizes_blank_urls_and_caches() {
        let http = Arc::new(CannedHttp::new().stub(
            "https://audio.test/v1/surah/18/ar.alafasy",
            200,
            SURAH_AUDIO_JSON,
        ));
        let client = client(Arc::clone(&http));
        let chapter = ChapterId::new(18).unwrap();

        let entries = client
            .verse_audio(chapter, reciters::default_reciter())
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert!(entries[0].has_audio());
        assert!(!entries[1].has_audio());
        assert_eq!(entries[1].audio_url, None);
        assert!(entries[2].has_audio());

        // Same chapter and reciter again: served from cache
        client
            .verse_audio(chapter, reciters::default_reciter())
            .await
            .unwrap();
        assert_eq!(http.request_count(), 1);
    }

    #[tokio::test]
    async fn api_error_status_is_surfaced() {
        let http = Arc::new(CannedHttp::new().stub(
            "https://audio.test/v1/surah/18/ar.alafasy",
            503,
            "{}",
        ));
        let client = client(http);
        let chapter = ChapterId::new(18).unwrap();

        let err = client
            .verse_audio(chapter, reciters::default_reciter())
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Api { status: 503, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn story_verses_pair_text_with_translation() {
        let http = Arc::new(CannedHttp::new().stub(
            "https://audio.test/v1/surah/18/editions/quran-uthmani,en.asad",
            200,
            EDITIONS_JSON,
        ));
        let client = client(http);
        let chapter = ChapterId::new(18).unwrap();

        let verses = client
            .story_verses(chapter, VerseRange::new(2, 2).unwrap())
            .await
            .unwrap();

        assert_eq!(verses.len(), 1);
        assert_eq!(verses[0].number, 2);
        assert_eq!(verses[0].translation, "second");
    }
}
