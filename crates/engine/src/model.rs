use std::collections::BTreeMap;

use serde::Serialize;

/// Catalog id carried by output rows that resolved against nothing.
pub const NOT_FOUND_ID: &str = "Not Found";

/// Sentinel catalog id marking a candidate synthesized from a remote lookup.
pub const EXTERNAL_ONLY_ID: &str = "Scryfall Verified";

/// Product line stamped on every output row.
pub const PRODUCT_LINE: &str = "Magic: The Gathering";

/// Rarity stamped on token output rows.
pub const TOKEN_RARITY: &str = "Token";

/// Display condition used when an inventory condition code is unknown.
pub const DEFAULT_CONDITION: &str = "Near Mint";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Canonical comparison key for one printing, built only by
/// [`crate::normalize::normalize_key`].
///
/// Two keys are identity-equal on the first four fields; `suffix` is the
/// parenthetical annotation stripped from the raw name, carried so confirmed
/// product names can restore it for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityKey {
    pub name: String,
    pub set: String,
    pub number: Option<String>,
    pub condition: String,
    pub suffix: String,
}

impl IdentityKey {
    /// The four-field form used for pool lookups and caching.
    pub fn identity(&self) -> Identity {
        Identity {
            name: self.name.clone(),
            set: self.set.clone(),
            number: self.number.clone(),
            condition: self.condition.clone(),
        }
    }
}

/// Four-field identity: the comparable part of an [`IdentityKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    pub name: String,
    pub set: String,
    pub number: Option<String>,
    pub condition: String,
}

// ---------------------------------------------------------------------------
// Reference catalog
// ---------------------------------------------------------------------------

/// One reference-catalog record, keyed in the pool by its [`Identity`].
///
/// Price fields are raw catalog strings (possibly empty); parsing happens
/// only at price-selection time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefCandidate {
    pub tcgplayer_id: String,
    pub product_line: String,
    pub set_name: String,
    pub product_name: String,
    pub number: String,
    pub rarity: String,
    pub condition: String,
    pub market_price: String,
    pub list_price: String,
    pub retail_price: String,
}

impl RefCandidate {
    pub fn is_external_only(&self) -> bool {
        self.tcgplayer_id == EXTERNAL_ONLY_ID
    }
}

/// The reference dataset keyed by identity. Enrichment may insert ephemeral
/// synthetic candidates during a resolution pass; they are never written
/// back to the source catalog.
pub type CandidatePool = BTreeMap<Identity, RefCandidate>;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One inbound inventory row, as mapped by the inventory reader.
#[derive(Debug, Clone, Default)]
pub struct InventoryLine {
    pub name: String,
    pub set: String,
    pub condition_code: String,
    pub foil: bool,
    pub quantity: i64,
    pub purchase_price: String,
    pub collector_number: String,
    pub scryfall_id: String,
}

// ---------------------------------------------------------------------------
// Pending adjudication
// ---------------------------------------------------------------------------

/// A line deferred to manual adjudication: the key, the ranked slate it was
/// scored against, and the source line needed to build an output entry once
/// a decision comes back.
#[derive(Debug, Clone)]
pub struct PendingItem {
    pub key: IdentityKey,
    pub matches: Vec<(Identity, i64)>,
    pub line: InventoryLine,
    pub condition: String,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One resolved output row in the staged-inventory schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedEntry {
    pub tcgplayer_id: String,
    pub product_line: String,
    pub set_name: String,
    pub product_name: String,
    pub number: String,
    pub rarity: String,
    pub condition: String,
    pub quantity: i64,
    pub price: String,
}

/// Terminal bucket counts for user-visible reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveSummary {
    pub lines: usize,
    pub resolved: usize,
    pub external_only: usize,
    pub unresolved: usize,
    pub pending: usize,
}
