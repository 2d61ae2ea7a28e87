use crate::config::MatchConfig;
use crate::model::{CandidatePool, Identity};

/// Outcome of applying the confirmation policy to a ranked slate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Auto-confirm this candidate.
    Confirm(Identity),
    /// Ambiguous confidence; hand the slate to manual adjudication.
    Defer,
}

/// What the confirmation rules see about a ranked slate.
#[derive(Debug, Clone, Copy)]
pub struct Slate {
    pub best_score: i64,
    pub second_score: i64,
    pub external_only: bool,
}

/// The auto-confirmation policy, one row per rule, evaluated top-down.
/// The first rule whose predicate holds confirms the top candidate.
const POLICY: &[(&str, fn(&Slate, &MatchConfig) -> bool)] = &[
    ("external-only above remote threshold", |s, c| {
        s.external_only && s.best_score >= c.scryfall_score
    }),
    ("high confidence", |s, c| {
        s.best_score >= c.high_confidence_score
    }),
    ("medium confidence with clear margin", |s, c| {
        s.best_score >= c.medium_confidence_score
            && s.best_score - s.second_score >= c.score_margin
    }),
];

/// Apply the threshold policy to a ranked slate.
pub fn decide(
    matches: &[(Identity, i64)],
    pool: &CandidatePool,
    config: &MatchConfig,
) -> Decision {
    let Some(((best, best_score), rest)) = matches.split_first() else {
        return Decision::Defer;
    };

    let slate = Slate {
        best_score: *best_score,
        second_score: rest.first().map(|(_, s)| *s).unwrap_or(0),
        external_only: pool.get(best).is_some_and(|c| c.is_external_only()),
    };

    if POLICY.iter().any(|(_, applies)| applies(&slate, config)) {
        Decision::Confirm(best.clone())
    } else {
        Decision::Defer
    }
}

/// Token queries skip the three-way policy: a single lower threshold decides.
pub fn decide_token(matches: &[(Identity, i64)], config: &MatchConfig) -> Decision {
    match matches.first() {
        Some((best, score)) if *score >= config.token_score => Decision::Confirm(best.clone()),
        _ => Decision::Defer,
    }
}

/// Whether a display product name encodes two card faces.
pub fn is_double_sided(product_name: &str) -> bool {
    let pn = product_name.to_lowercase();
    pn.contains("//") || (pn.contains("double") && pn.contains("sided"))
}
