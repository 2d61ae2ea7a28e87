use std::collections::HashMap;

use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Condition grades
// ---------------------------------------------------------------------------

/// A card condition: display spelling plus its place in the wear ordering.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionGrade {
    pub display: String,
    pub rank: u8,
}

// ---------------------------------------------------------------------------
// Match configuration
// ---------------------------------------------------------------------------

/// Thresholds and reference tables for the resolution pass. The defaults are
/// the hand-tuned production values; a TOML file may override any subset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Auto-confirm outright at or above this score.
    pub high_confidence_score: i64,
    /// Auto-confirm at or above this score only with a clear margin.
    pub medium_confidence_score: i64,
    /// External-only candidates need this higher bar.
    pub scryfall_score: i64,
    /// Unconditional threshold for token queries.
    pub token_score: i64,
    /// Required lead over the runner-up for medium-confidence confirms.
    pub score_margin: i64,

    /// Fallback marketplace price when nothing positive is available.
    pub floor_price: f64,

    /// Penalty per print-style term present on exactly one side.
    pub special_print_penalties: HashMap<String, i64>,
    /// Condition code -> grade table.
    pub conditions: HashMap<String, ConditionGrade>,
    /// Reference presentation set names -> catalog colloquial names.
    pub set_aliases: HashMap<String, String>,
    /// Promo annotations excluded from the catalog when `filter_promo` is on.
    pub promo_patterns: Vec<String>,

    pub filter_prerelease: bool,
    pub filter_promo: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        let special_print_penalties = [
            ("foil", 40),
            ("showcase", 30),
            ("etched", 30),
            ("borderless", 30),
            ("extended", 30),
            ("gilded", 30),
        ]
        .into_iter()
        .map(|(term, penalty)| (term.to_string(), penalty))
        .collect();

        let conditions = [
            ("near mint", "Near Mint", 0),
            ("lightly played", "Lightly Played", 1),
            ("moderately played", "Moderately Played", 2),
            ("heavily played", "Heavily Played", 3),
            ("damaged", "Damaged", 4),
        ]
        .into_iter()
        .map(|(code, display, rank)| {
            (
                code.to_string(),
                ConditionGrade {
                    display: display.to_string(),
                    rank,
                },
            )
        })
        .collect();

        let set_aliases = [
            (
                "Universes Beyond: The Lord of the Rings: Tales of Middle-earth",
                "LTR",
            ),
            (
                "Commander: The Lord of the Rings: Tales of Middle-earth",
                "LTC",
            ),
            ("the list", "The List"),
            ("edge of eternities", "eoe"),
            ("EOE", "eoe"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        let promo_patterns = [
            r"\(Bundle\)",
            r"\(Buyabox\)",
            r"\(Buy-a-[Bb]ox\)",
            r"\(Promo\)",
            r"\(Release\)",
            r"\(Launch\)",
            r"\(Store Championship\)",
            r"\(Game Day\)",
            r"\(FNM\)",
            r"\(Judge\)",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            high_confidence_score: 270,
            medium_confidence_score: 260,
            scryfall_score: 350,
            token_score: 250,
            score_margin: 30,
            floor_price: 0.10,
            special_print_penalties,
            conditions,
            set_aliases,
            promo_patterns,
            filter_prerelease: false,
            filter_promo: false,
        }
    }
}

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.medium_confidence_score > self.high_confidence_score {
            return Err(EngineError::ConfigValidation(format!(
                "medium_confidence_score ({}) must not exceed high_confidence_score ({})",
                self.medium_confidence_score, self.high_confidence_score
            )));
        }
        if self.scryfall_score < self.high_confidence_score {
            return Err(EngineError::ConfigValidation(format!(
                "scryfall_score ({}) must be at least high_confidence_score ({})",
                self.scryfall_score, self.high_confidence_score
            )));
        }
        if self.score_margin < 0 {
            return Err(EngineError::ConfigValidation(
                "score_margin must not be negative".into(),
            ));
        }
        if self.floor_price < 0.0 {
            return Err(EngineError::ConfigValidation(
                "floor_price must not be negative".into(),
            ));
        }
        if self.conditions.is_empty() {
            return Err(EngineError::ConfigValidation(
                "at least one condition grade is required".into(),
            ));
        }
        Ok(())
    }

    /// Display spelling for an inventory condition code, if known.
    pub fn condition_display(&self, code: &str) -> Option<&str> {
        self.conditions.get(code).map(|g| g.display.as_str())
    }

    /// Rank of a condition name in the wear ordering, if known.
    pub fn condition_rank(&self, condition: &str) -> Option<u8> {
        self.conditions.get(condition).map(|g| g.rank)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
