//! Tafsir narrative client.
//!
//! Fetches per-verse commentary and merges a verse range into one readable
//! narrative. The API returns one commentary block per verse, but a single
//! block frequently spans several verses (common in Ibn Kathir), so
//! consecutive identical blocks are collapsed.

use crate::error::{ContentError, Result};
use crate::types::{ChapterId, VerseRange};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::events::{ContentEvent, CoreEvent, EventBus};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct TafsirResponse {
    tafsir: Option<TafsirDto>,
}

#[derive(Debug, Deserialize)]
struct TafsirDto {
    #[serde(default)]
    text: String,
}

type NarrativeKey = (u16, u16, u16, u32);

/// Client for the tafsir API with merged-narrative caching.
pub struct TafsirClient {
    http: Arc<dyn HttpClient>,
    base: String,
    resource: u32,
    event_bus: Option<EventBus>,
    cache: Mutex<LruCache<NarrativeKey, Arc<Vec<String>>>>,
}

impl TafsirClient {
    /// Create a client against the given API base, consulting the given
    /// tafsir resource (e.g. 14 for Ibn Kathir).
    pub fn new(
        http: Arc<dyn HttpClient>,
        base: impl Into<String>,
        resource: u32,
        cache_capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            http,
            base: base.into(),
            resource,
            event_bus: None,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Emit content events on the given bus.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// The merged narrative for a verse range: one string per distinct
    /// commentary block, in verse order.
    pub async fn narrative(
        &self,
        chapter: ChapterId,
        range: VerseRange,
    ) -> Result<Arc<Vec<String>>> {
        let key = (chapter.get(), range.start, range.end, self.resource);
        if let Some(cached) = self.cache.lock().get(&key) {
            return Ok(Arc::clone(cached));
        }

        let mut blocks: Vec<String> = Vec::new();
        for verse in range.iter() {
            let url = format!(
                "{}/tafsirs/{}/by_ayah/{}:{}",
                self.base, self.resource, chapter, verse
            );
            debug!(url, "fetching tafsir");

            let response = self.http.execute(HttpRequest::get(&url)).await?;
            if !response.is_success() {
                return Err(ContentError::Api {
                    status: response.status,
                    url,
                });
            }
            let parsed: TafsirResponse = serde_json::from_slice(&response.body)
                .map_err(|e| ContentError::Decode(e.to_string()))?;

            let Some(tafsir) = parsed.tafsir else {
                continue;
            };
            let text = tafsir.text.trim();
            if text.is_empty() {
                continue;
            }
            // One commentary block often covers several verses; keep it once.
            if blocks.last().map(String::as_str) != Some(text) {
                blocks.push(text.to_string());
            }
        }

        info!(
            chapter = chapter.get(),
            range = %range,
            blocks = blocks.len(),
            "merged tafsir narrative"
        );
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Content(ContentEvent::TafsirLoaded {
                chapter: chapter.get(),
                start_verse: range.start,
                end_verse: range.end,
                blocks: blocks.len(),
            }))
            .ok();
        }

        let blocks = Arc::new(blocks);
        self.cache.lock().put(key, Arc::clone(&blocks));
        Ok(blocks)
    }
}
