//! # Content Lookup Module
//!
//! Resolves everything the recitation core needs to know about the text:
//! chapter metadata, per-verse recitation audio URLs, verse text with
//! translations, tafsir narratives, the curated story catalog, and the
//! reciter registry.
//!
//! ## Overview
//!
//! Two remote APIs back the lookups (reached only through the
//! [`HttpClient`](bridge_traits::http::HttpClient) bridge):
//!
//! - chapter metadata and tafsir from the quran.com v4 API
//! - verse text, translations, and recitation audio from the alquran.cloud
//!   v1 API, parameterized by reciter edition
//!
//! The story catalog is bundled data; no network is involved.
//!
//! All fetched chapters are cached in memory (LRU), so sequential playback
//! across a chapter re-fetches nothing.

pub mod error;
pub mod quran;
pub mod reciters;
pub mod source;
pub mod stories;
pub mod tafsir;
pub mod types;

pub use error::{ContentError, Result};
pub use quran::QuranApiClient;
pub use reciters::Reciter;
pub use source::ContentSource;
pub use stories::StoryCatalog;
pub use tafsir::TafsirClient;
pub use types::{Chapter, ChapterId, Story, SurahStories, Verse, VerseAudio, VerseRange};
