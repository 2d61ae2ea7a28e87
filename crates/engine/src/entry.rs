use std::collections::HashMap;

use crate::config::MatchConfig;
use crate::model::{InventoryLine, RefCandidate, StagedEntry, NOT_FOUND_ID, PRODUCT_LINE};

/// Builds staged entries from an inventory line, an optional reference
/// candidate, and independently optional named overrides. Override wins
/// over candidate field, candidate field over the empty/sentinel default.
#[derive(Debug)]
pub struct EntryBuilder<'a> {
    line: &'a InventoryLine,
    condition: &'a str,
    candidate: Option<&'a RefCandidate>,
    product_name: Option<String>,
    set_name: Option<String>,
    number: Option<String>,
    rarity: Option<String>,
    tcgplayer_id: Option<String>,
}

impl<'a> EntryBuilder<'a> {
    pub fn new(line: &'a InventoryLine, condition: &'a str) -> Self {
        Self {
            line,
            condition,
            candidate: None,
            product_name: None,
            set_name: None,
            number: None,
            rarity: None,
            tcgplayer_id: None,
        }
    }

    pub fn candidate(mut self, candidate: &'a RefCandidate) -> Self {
        self.candidate = Some(candidate);
        self
    }

    pub fn product_name(mut self, value: impl Into<String>) -> Self {
        self.product_name = Some(value.into());
        self
    }

    pub fn set_name(mut self, value: impl Into<String>) -> Self {
        self.set_name = Some(value.into());
        self
    }

    pub fn number(mut self, value: impl Into<String>) -> Self {
        self.number = Some(value.into());
        self
    }

    pub fn rarity(mut self, value: impl Into<String>) -> Self {
        self.rarity = Some(value.into());
        self
    }

    pub fn tcgplayer_id(mut self, value: impl Into<String>) -> Self {
        self.tcgplayer_id = Some(value.into());
        self
    }

    pub fn build(self, config: &MatchConfig) -> StagedEntry {
        let candidate = self.candidate;
        let from_candidate = |field: fn(&RefCandidate) -> &str| {
            candidate.map(|c| field(c).to_string()).unwrap_or_default()
        };

        StagedEntry {
            tcgplayer_id: self
                .tcgplayer_id
                .or_else(|| candidate.map(|c| c.tcgplayer_id.clone()))
                .unwrap_or_else(|| NOT_FOUND_ID.to_string()),
            product_line: PRODUCT_LINE.to_string(),
            set_name: self
                .set_name
                .unwrap_or_else(|| from_candidate(|c| c.set_name.as_str())),
            product_name: self
                .product_name
                .unwrap_or_else(|| from_candidate(|c| c.product_name.as_str())),
            number: self
                .number
                .unwrap_or_else(|| from_candidate(|c| c.number.as_str())),
            rarity: self
                .rarity
                .unwrap_or_else(|| from_candidate(|c| c.rarity.as_str())),
            condition: self.condition.to_string(),
            quantity: self.line.quantity,
            price: market_price(self.line, candidate, config),
        }
    }
}

/// Marketplace price policy: the first positive catalog price in
/// marketplace/list/retail order wins, then the line's own purchase price,
/// then the configured floor.
pub fn market_price(
    line: &InventoryLine,
    candidate: Option<&RefCandidate>,
    config: &MatchConfig,
) -> String {
    if let Some(c) = candidate {
        for raw in [&c.market_price, &c.list_price, &c.retail_price] {
            let raw = raw.trim();
            if raw.parse::<f64>().is_ok_and(|v| v > 0.0) {
                return raw.to_string();
            }
        }
    }

    let purchase = line.purchase_price.trim();
    if purchase.parse::<f64>().is_ok_and(|v| v > 0.0) {
        return purchase.to_string();
    }

    format!("{:.2}", config.floor_price)
}

/// Combine entries sharing the same (catalog id, condition) pair by summing
/// their quantity deltas, preserving first-seen order.
pub fn merge_entries(entries: Vec<StagedEntry>) -> Vec<StagedEntry> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut merged: HashMap<(String, String), StagedEntry> = HashMap::new();

    for entry in entries {
        let key = (entry.tcgplayer_id.clone(), entry.condition.clone());
        match merged.get_mut(&key) {
            Some(existing) => existing.quantity += entry.quantity,
            None => {
                order.push(key.clone());
                merged.insert(key, entry);
            }
        }
    }

    order.into_iter().filter_map(|k| merged.remove(&k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> InventoryLine {
        InventoryLine {
            name: "Serra Angel".into(),
            set: "DOM".into(),
            quantity: 2,
            purchase_price: "0.75".into(),
            ..InventoryLine::default()
        }
    }

    fn candidate() -> RefCandidate {
        RefCandidate {
            tcgplayer_id: "67890".into(),
            set_name: "Dominaria".into(),
            product_name: "Serra Angel".into(),
            number: "33".into(),
            rarity: "Uncommon".into(),
            condition: "Near Mint".into(),
            market_price: "1.25".into(),
            ..RefCandidate::default()
        }
    }

    #[test]
    fn candidate_fields_flow_through() {
        let line = line();
        let cand = candidate();
        let entry = EntryBuilder::new(&line, "Near Mint")
            .candidate(&cand)
            .build(&MatchConfig::default());

        assert_eq!(entry.tcgplayer_id, "67890");
        assert_eq!(entry.product_line, PRODUCT_LINE);
        assert_eq!(entry.set_name, "Dominaria");
        assert_eq!(entry.product_name, "Serra Angel");
        assert_eq!(entry.number, "33");
        assert_eq!(entry.rarity, "Uncommon");
        assert_eq!(entry.condition, "Near Mint");
        assert_eq!(entry.quantity, 2);
        assert_eq!(entry.price, "1.25");
    }

    #[test]
    fn overrides_win_independently() {
        let line = line();
        let cand = candidate();
        let entry = EntryBuilder::new(&line, "Near Mint")
            .candidate(&cand)
            .product_name("Serra Angel (Borderless)")
            .rarity("Token")
            .build(&MatchConfig::default());

        assert_eq!(entry.product_name, "Serra Angel (Borderless)");
        assert_eq!(entry.rarity, "Token");
        // Unoverridden fields still come from the candidate.
        assert_eq!(entry.set_name, "Dominaria");
        assert_eq!(entry.number, "33");
    }

    #[test]
    fn fallback_entry_uses_sentinel_id() {
        let line = line();
        let entry = EntryBuilder::new(&line, "Near Mint")
            .product_name("Serra Angel")
            .set_name("DOM")
            .build(&MatchConfig::default());

        assert_eq!(entry.tcgplayer_id, NOT_FOUND_ID);
        assert_eq!(entry.price, "0.75", "purchase price backs an unmatched line");
    }

    #[test]
    fn price_priority_order() {
        let config = MatchConfig::default();
        let line = line();

        let mut cand = candidate();
        cand.market_price = "".into();
        cand.list_price = "2.50".into();
        assert_eq!(market_price(&line, Some(&cand), &config), "2.50");

        cand.list_price = "0".into();
        cand.retail_price = "3.10".into();
        assert_eq!(market_price(&line, Some(&cand), &config), "3.10");

        cand.retail_price = "garbage".into();
        assert_eq!(market_price(&line, Some(&cand), &config), "0.75");
    }

    #[test]
    fn floor_price_backstop() {
        let config = MatchConfig::default();
        let mut line = line();
        line.purchase_price = "".into();
        assert_eq!(market_price(&line, None, &config), "0.10");
    }

    #[test]
    fn merge_sums_quantities_by_id_and_condition() {
        let line = line();
        let cand = candidate();
        let make = |condition: &str| {
            EntryBuilder::new(&line, condition)
                .candidate(&cand)
                .build(&MatchConfig::default())
        };

        let merged = merge_entries(vec![
            make("Near Mint"),
            make("Lightly Played"),
            make("Near Mint"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].condition, "Near Mint");
        assert_eq!(merged[0].quantity, 4);
        assert_eq!(merged[1].condition, "Lightly Played");
        assert_eq!(merged[1].quantity, 2);
    }
}
