//! Core content data types.
//!
//! The invariants here are load-bearing for the playback coordinator:
//! chapter numbers stay within 1..=114, and a chapter's verse-audio list is
//! contiguous starting at verse 1 (validated on ingestion, see
//! [`validate_verse_sequence`]).

use crate::error::{ContentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of chapters in the text.
pub const CHAPTER_COUNT: u16 = 114;

/// A validated chapter (surah) number, 1..=114.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ChapterId(u16);

impl ChapterId {
    /// The first chapter, Al-Fatihah.
    pub const FIRST: ChapterId = ChapterId(1);
    /// The final chapter, An-Nas.
    pub const LAST: ChapterId = ChapterId(CHAPTER_COUNT);

    /// Construct a chapter id, validating the range.
    pub fn new(number: u16) -> Result<Self> {
        if (1..=CHAPTER_COUNT).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ContentError::InvalidChapter(number))
        }
    }

    /// The raw chapter number.
    pub fn get(self) -> u16 {
        self.0
    }

    /// The following chapter, or `None` past the end of the text.
    pub fn next(self) -> Option<ChapterId> {
        if self.0 < CHAPTER_COUNT {
            Some(ChapterId(self.0 + 1))
        } else {
            None
        }
    }

    /// The preceding chapter, or `None` before the start of the text.
    pub fn previous(self) -> Option<ChapterId> {
        if self.0 > 1 {
            Some(ChapterId(self.0 - 1))
        } else {
            None
        }
    }

    /// Returns `true` for the final chapter.
    pub fn is_last(self) -> bool {
        self.0 == CHAPTER_COUNT
    }
}

impl TryFrom<u16> for ChapterId {
    type Error = ContentError;

    fn try_from(value: u16) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ChapterId> for u16 {
    fn from(value: ChapterId) -> Self {
        value.0
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chapter metadata as served by the chapters API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter number.
    pub id: ChapterId,
    /// Transliterated name (e.g. "Al-Kahf").
    pub name_simple: String,
    /// Arabic name.
    pub name_arabic: String,
    /// "makkah" or "madinah".
    pub revelation_place: String,
    /// Number of verses in this chapter.
    pub verses_count: u16,
}

/// One playable unit: a verse with its recitation audio URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseAudio {
    /// Verse number within the chapter (1-based).
    pub number: u16,
    /// Verse text for display.
    pub text: String,
    /// Recitation audio URL. Sparse data: may be absent for some verses.
    pub audio_url: Option<String>,
}

impl VerseAudio {
    /// Returns `true` if this verse has a playable audio URL.
    pub fn has_audio(&self) -> bool {
        self.audio_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }
}

/// A verse with its translation, for reader surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Verse number within the chapter (1-based).
    pub number: u16,
    /// Original text.
    pub text: String,
    /// English translation.
    pub translation: String,
}

/// An inclusive 1-based verse range within a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRange {
    pub start: u16,
    pub end: u16,
}

impl VerseRange {
    /// Construct a range, validating `1 <= start <= end`.
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start == 0 || end < start {
            return Err(ContentError::InvalidVerseRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns `true` if the verse number falls inside the range.
    pub fn contains(&self, verse: u16) -> bool {
        (self.start..=self.end).contains(&verse)
    }

    /// Number of verses covered.
    pub fn len(&self) -> u16 {
        self.end - self.start + 1
    }

    /// Always `false`: construction rejects empty ranges.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the verse numbers in order.
    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

impl fmt::Display for VerseRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A curated narrative mapped to a verse range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub title_ar: String,
    pub start_ayah: u16,
    pub end_ayah: u16,
    pub summary: String,
    pub summary_ar: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tags_ar: Vec<String>,
    #[serde(default)]
    pub prophets: Vec<String>,
    #[serde(default)]
    pub prophets_ar: Vec<String>,
    #[serde(default)]
    pub chronology_index: Option<u32>,
}

impl Story {
    /// The verse range this story covers.
    pub fn verse_range(&self) -> Result<VerseRange> {
        VerseRange::new(self.start_ayah, self.end_ayah)
    }
}

/// The stories of one chapter, as bundled in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurahStories {
    pub name: String,
    pub name_ar: String,
    pub stories: Vec<Story>,
}

/// Validate that verse numbers are `1..=N` with no gaps or duplicates.
///
/// Every chapter list that enters the playback pipeline must satisfy this;
/// index arithmetic in the coordinator relies on it.
pub fn validate_verse_sequence(entries: &[VerseAudio]) -> Result<()> {
    for (index, entry) in entries.iter().enumerate() {
        let expected = index as u16 + 1;
        if entry.number != expected {
            return Err(ContentError::InvalidVerseSequence {
                expected,
                found: entry.number,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: u16) -> VerseAudio {
        VerseAudio {
            number,
            text: format!("verse {}", number),
            audio_url: Some(format!("https://cdn.example/{}.mp3", number)),
        }
    }

    #[test]
    fn chapter_id_bounds() {
        assert!(ChapterId::new(0).is_err());
        assert!(ChapterId::new(115).is_err());
        assert_eq!(ChapterId::new(1).unwrap(), ChapterId::FIRST);
        assert_eq!(ChapterId::new(114).unwrap(), ChapterId::LAST);
    }

    #[test]
    fn chapter_id_navigation() {
        let kahf = ChapterId::new(18).unwrap();
        assert_eq!(kahf.next().unwrap().get(), 19);
        assert_eq!(kahf.previous().unwrap().get(), 17);

        assert_eq!(ChapterId::LAST.next(), None);
        assert_eq!(ChapterId::FIRST.previous(), None);
        assert!(ChapterId::LAST.is_last());
    }

    #[test]
    fn chapter_id_serde_round_trip() {
        let id: ChapterId = serde_json::from_str("18").unwrap();
        assert_eq!(id.get(), 18);
        assert_eq!(serde_json::to_string(&id).unwrap(), "18");

        let invalid: std::result::Result<ChapterId, _> = serde_json::from_str("200");
        assert!(invalid.is_err());
    }

    #[test]
    fn verse_audio_presence() {
        assert!(entry(1).has_audio());

        let missing = VerseAudio {
            number: 2,
            text: String::new(),
            audio_url: None,
        };
        assert!(!missing.has_audio());

        let blank = VerseAudio {
            number: 3,
            text: String::new(),
            audio_url: Some("   ".to_string()),
        };
        assert!(!blank.has_audio());
    }

    #[test]
    fn verse_range_validation() {
        assert!(VerseRange::new(0, 5).is_err());
        assert!(VerseRange::new(7, 3).is_err());

        let range = VerseRange::new(9, 35).unwrap();
        assert_eq!(range.len(), 27);
        assert!(range.contains(9));
        assert!(range.contains(35));
        assert!(!range.contains(36));
    }

    #[test]
    fn sequence_validation_accepts_contiguous() {
        let entries: Vec<VerseAudio> = (1..=7).map(entry).collect();
        assert!(validate_verse_sequence(&entries).is_ok());
        assert!(validate_verse_sequence(&[]).is_ok());
    }

    #[test]
    fn sequence_validation_rejects_gap() {
        let entries = vec![entry(1), entry(3)];
        let err = validate_verse_sequence(&entries).unwrap_err();
        assert!(matches!(
            err,
            ContentError::InvalidVerseSequence {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn sequence_validation_rejects_duplicate() {
        let entries = vec![entry(1), entry(1)];
        assert!(validate_verse_sequence(&entries).is_err());
    }

    #[test]
    fn sequence_validation_rejects_offset_start() {
        let entries = vec![entry(2), entry(3)];
        assert!(validate_verse_sequence(&entries).is_err());
    }
}
