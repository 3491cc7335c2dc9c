//! Bundled story catalog.
//!
//! The curated narrative dataset ships with the binary; no network is
//! involved. Lookup, search, and chronological ordering all operate on the
//! parsed catalog. Search normalizes Arabic text (tashkeel stripped, letter
//! variants unified) so queries match regardless of vocalization.

use crate::error::{ContentError, Result};
use crate::types::{ChapterId, Story, SurahStories};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const STORY_MAP_JSON: &str = include_str!("data/story_map.json");

/// Chronology index assigned to stories without one; sorts them last.
const UNORDERED_CHRONOLOGY: u32 = 999;

/// The curated story dataset, keyed by chapter.
#[derive(Debug)]
pub struct StoryCatalog {
    map: BTreeMap<ChapterId, SurahStories>,
}

impl StoryCatalog {
    /// Parse the bundled dataset.
    pub fn bundled() -> Result<Self> {
        Self::from_json(STORY_MAP_JSON)
    }

    /// Parse a dataset in the bundled format (`"surah_<n>"` keys).
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, SurahStories> =
            serde_json::from_str(json).map_err(|e| ContentError::Decode(e.to_string()))?;

        let mut map = BTreeMap::new();
        for (key, stories) in raw {
            let number = key
                .strip_prefix("surah_")
                .and_then(|n| n.parse::<u16>().ok())
                .ok_or_else(|| {
                    ContentError::Decode(format!("invalid story map key '{}'", key))
                })?;
            map.insert(ChapterId::new(number)?, stories);
        }

        debug!(chapters = map.len(), "parsed story catalog");
        Ok(Self { map })
    }

    /// Chapters that have stories, in textual order.
    pub fn surah_list(&self) -> Vec<(ChapterId, &SurahStories)> {
        self.map.iter().map(|(id, stories)| (*id, stories)).collect()
    }

    /// The stories of one chapter, if any.
    pub fn surah_stories(&self, chapter: ChapterId) -> Option<&SurahStories> {
        self.map.get(&chapter)
    }

    /// A single story by chapter and id.
    pub fn story(&self, chapter: ChapterId, story_id: &str) -> Result<&Story> {
        self.surah_stories(chapter)
            .and_then(|surah| surah.stories.iter().find(|story| story.id == story_id))
            .ok_or_else(|| ContentError::StoryNotFound {
                surah: chapter.get(),
                story: story_id.to_string(),
            })
    }

    /// Every story in the catalog with its chapter.
    pub fn all_stories(&self) -> Vec<(ChapterId, &Story)> {
        self.map
            .iter()
            .flat_map(|(id, surah)| surah.stories.iter().map(move |story| (*id, story)))
            .collect()
    }

    /// Stories matching the query in title, summary, tag, or prophet name,
    /// in either language.
    pub fn search(&self, query: &str) -> Vec<(ChapterId, &Story)> {
        let q = normalize(query);
        if q.is_empty() {
            return Vec::new();
        }

        self.all_stories()
            .into_iter()
            .filter(|(_, story)| {
                normalize(&story.title).contains(&q)
                    || normalize(&story.title_ar).contains(&q)
                    || normalize(&story.summary).contains(&q)
                    || normalize(&story.summary_ar).contains(&q)
                    || story.tags.iter().any(|t| normalize(t).contains(&q))
                    || story.tags_ar.iter().any(|t| normalize(t).contains(&q))
                    || story.prophets.iter().any(|p| normalize(p).contains(&q))
                    || story.prophets_ar.iter().any(|p| normalize(p).contains(&q))
            })
            .collect()
    }

    /// Every story, ordered by chronology index (unordered stories last).
    pub fn chronological(&self) -> Vec<(ChapterId, &Story)> {
        let mut stories = self.all_stories();
        stories.sort_by_key(|(_, story)| {
            story.chronology_index.unwrap_or(UNORDERED_CHRONOLOGY)
        });
        stories
    }

    /// All distinct Arabic prophet names appearing in the catalog.
    pub fn prophets_ar(&self) -> Vec<String> {
        let mut prophets: Vec<String> = self
            .all_stories()
            .into_iter()
            .flat_map(|(_, story)| story.prophets_ar.iter().cloned())
            .collect();
        prophets.sort();
        prophets.dedup();
        prophets
    }

    /// All distinct Arabic tags appearing in the catalog.
    pub fn tags_ar(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .all_stories()
            .into_iter()
            .flat_map(|(_, story)| story.tags_ar.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }
}

/// Fold text for search: lowercase, strip combining marks and Arabic
/// tashkeel, unify alef / teh-marbuta / alef-maqsura variants.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .filter(|c| !('\u{064b}'..='\u{0652}').contains(c))
        .map(|c| match c {
            'آ' | 'أ' | 'إ' => 'ا',
            'ة' => 'ه',
            'ى' => 'ي',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
