//! `cardrecon-engine` — entity-resolution engine for card inventories.
//!
//! Pure engine crate: receives pre-loaded inventory lines and a keyed
//! candidate pool, returns resolved entries and terminal buckets.
//! No CLI, IO, or network dependencies; remote enrichment plugs in
//! through the [`Enricher`] seam.

pub mod config;
pub mod confirm;
pub mod engine;
pub mod entry;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod state;

pub use config::MatchConfig;
pub use engine::{resolve_all, resolve_line, Enricher, NoEnrichment};
pub use error::EngineError;
pub use model::{
    CandidatePool, Identity, IdentityKey, InventoryLine, PendingItem, RefCandidate,
    ResolveSummary, StagedEntry,
};
pub use state::ReconState;
