//! `cardrecon-scryfall` — remote enrichment adapter.
//!
//! Implements the engine's [`cardrecon_engine::Enricher`] seam against the
//! Scryfall card API: adaptive rate limiting, a process-lifetime lookup
//! cache, and synthesis of external-only candidates for cards absent from
//! the local reference catalog.

pub mod client;
pub mod rate_limit;

pub use client::{derive_set_code, RemoteCard, ScryfallClient};
pub use rate_limit::RateLimiter;
