//! The lookup seam between content and playback.
//!
//! The playback coordinator only ever needs two questions answered: what is
//! this chapter, and what are its playable verses for a given reciter. The
//! [`ContentSource`] trait captures exactly that, so the coordinator can be
//! driven by the real API client in production and by a scripted fake in
//! tests.

use crate::error::Result;
use crate::quran::QuranApiClient;
use crate::reciters::Reciter;
use crate::types::{Chapter, ChapterId, VerseAudio};
use async_trait::async_trait;

/// Read-only chapter and verse-audio lookup.
///
/// Implementations must uphold the verse-sequence invariant: the list
/// returned by [`verse_audio`](ContentSource::verse_audio) is ordered,
/// contiguous, and starts at verse 1.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Metadata for one chapter.
    async fn chapter(&self, chapter: ChapterId) -> Result<Chapter>;

    /// The ordered verse-audio list for one chapter and reciter.
    async fn verse_audio(&self, chapter: ChapterId, reciter: &Reciter)
        -> Result<Vec<VerseAudio>>;
}

#[async_trait]
impl ContentSource for crate::quran::QuranApiClient {
    async fn chapter(&self, chapter: ChapterId) -> Result<Chapter> {
        QuranApiClient::chapter(self, chapter).await
    }

    async fn verse_audio(
        &self,
        chapter: ChapterId,
        reciter: &Reciter,
    ) -> Result<Vec<VerseAudio>> {
        let entries = QuranApiClient::verse_audio(self, chapter, reciter).await?;
        Ok(entries.as_ref().clone())
    }
}
