//! Desktop bridge adapters.
//!
//! Reference implementations of the bridge traits for desktop hosts and
//! development environments:
//!
//! - [`ReqwestHttpClient`] - HTTP client backed by `reqwest` with retry and
//!   exponential backoff
//! - [`SimulatedAudioPlayer`] - deterministic stand-in for a native audio
//!   engine, used by demos and integration tests
//!
//! Mobile hosts replace these with platform-native adapters; the core only
//! ever sees the traits from `bridge-traits`.

pub mod http;
pub mod player;

pub use http::ReqwestHttpClient;
pub use player::SimulatedAudioPlayer;
