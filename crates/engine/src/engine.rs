use crate::config::MatchConfig;
use crate::confirm::{decide, decide_token, is_double_sided, Decision};
use crate::entry::EntryBuilder;
use crate::matcher::find_best_match;
use crate::model::{
    CandidatePool, Identity, IdentityKey, InventoryLine, PendingItem, RefCandidate,
    ResolveSummary, StagedEntry, DEFAULT_CONDITION, TOKEN_RARITY,
};
use crate::normalize::normalize_key;
use crate::state::ReconState;

// ---------------------------------------------------------------------------
// Enrichment seam
// ---------------------------------------------------------------------------

/// Remote-lookup seam. Consulted when local scoring returns nothing or its
/// best score sits below the medium-confidence threshold; an implementation
/// may inject a synthetic candidate into the pool and the front of the slate.
pub trait Enricher {
    fn enrich(
        &mut self,
        key: &IdentityKey,
        line: &InventoryLine,
        matches: Vec<(Identity, i64)>,
        pool: &mut CandidatePool,
    ) -> Vec<(Identity, i64)>;
}

/// Null implementation for offline runs and tests.
pub struct NoEnrichment;

impl Enricher for NoEnrichment {
    fn enrich(
        &mut self,
        _key: &IdentityKey,
        _line: &InventoryLine,
        matches: Vec<(Identity, i64)>,
        _pool: &mut CandidatePool,
    ) -> Vec<(Identity, i64)> {
        matches
    }
}

// ---------------------------------------------------------------------------
// Line classification helpers
// ---------------------------------------------------------------------------

/// An all-caps set code with a `T` prefix marks a token printing.
fn is_token_set_code(set: &str) -> bool {
    set.len() >= 2
        && set.starts_with('T')
        && set[1..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn is_token(name: &str, set: &str) -> bool {
    name.to_lowercase().contains("token")
        || set.to_lowercase().contains("token")
        || is_token_set_code(set)
}

/// Extract the comparable part of a raw collector number: the last
/// hyphen-separated segment, with any leading letters stripped.
fn extract_number(raw: &str) -> String {
    let last = raw.trim().rsplit('-').next().unwrap_or("");
    last.trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '-')
        .to_string()
}

/// Map the raw condition code through the grade table and append the foil
/// qualifier. Unknown codes fall back to the default grade.
fn display_condition(line: &InventoryLine, config: &MatchConfig) -> String {
    let mut code = line.condition_code.trim().to_lowercase().replace('_', " ");
    if code.is_empty() {
        code = "near mint".to_string();
    }
    let mut condition = config
        .condition_display(&code)
        .unwrap_or(DEFAULT_CONDITION)
        .to_string();
    if line.foil {
        condition.push_str(" Foil");
    }
    condition
}

// ---------------------------------------------------------------------------
// Resolution pass
// ---------------------------------------------------------------------------

/// Resolve every line in input order. Returns the resolved entries; deferred,
/// unresolved, and external-only lines accumulate in `state`.
pub fn resolve_all(
    lines: &[InventoryLine],
    pool: &mut CandidatePool,
    state: &mut ReconState,
    enricher: &mut dyn Enricher,
    config: &MatchConfig,
) -> Vec<StagedEntry> {
    let mut resolved = Vec::new();
    for line in lines {
        if let Some(entry) = resolve_line(line, pool, state, enricher, config) {
            resolved.push(entry);
        }
    }
    resolved
}

/// Resolve a single inventory line: normalize, consult the confirmed cache,
/// score, optionally enrich, and apply the confirmation policy.
///
/// Returns the resolved entry, or `None` when the line was excluded,
/// deferred, routed to a terminal bucket, or structurally empty.
pub fn resolve_line(
    line: &InventoryLine,
    pool: &mut CandidatePool,
    state: &mut ReconState,
    enricher: &mut dyn Enricher,
    config: &MatchConfig,
) -> Option<StagedEntry> {
    let name = line.name.trim();
    let set = line.set.trim();
    if name.is_empty() || set.is_empty() {
        return None;
    }

    let condition = display_condition(line, config);
    if is_token(name, set) {
        resolve_token_line(line, &condition, pool, state, config)
    } else {
        resolve_standard_line(line, &condition, pool, state, enricher, config)
    }
}

fn resolve_standard_line(
    line: &InventoryLine,
    condition: &str,
    pool: &mut CandidatePool,
    state: &mut ReconState,
    enricher: &mut dyn Enricher,
    config: &MatchConfig,
) -> Option<StagedEntry> {
    let number = extract_number(&line.collector_number);
    let key = normalize_key(&line.name, &line.set, condition, &number, config)?;
    let identity = key.identity();

    // Duplicate rows sharing an identity short-circuit to the prior answer.
    if let Some(chosen) = state.confirmed(&identity).cloned() {
        let candidate = pool.get(&chosen)?.clone();
        return finish_confirmed(line, condition, &key, &candidate, state, config);
    }

    let mut matches = find_best_match(&identity, pool, config);
    if matches.is_empty() || matches[0].1 < config.medium_confidence_score {
        matches = enricher.enrich(&key, line, matches, pool);
    }

    if !matches.is_empty() {
        match decide(&matches, pool, config) {
            Decision::Confirm(chosen) => {
                let candidate = pool.get(&chosen)?.clone();
                state.confirm(identity, chosen);
                return finish_confirmed(line, condition, &key, &candidate, state, config);
            }
            Decision::Defer => {
                state.defer(PendingItem {
                    key,
                    matches,
                    line: line.clone(),
                    condition: condition.to_string(),
                });
                return None;
            }
        }
    }

    // Nothing matched at all; give up unless an earlier duplicate is
    // already awaiting adjudication.
    if !state.is_pending(&identity) {
        let fallback = EntryBuilder::new(line, condition)
            .product_name(line.name.trim())
            .set_name(line.set.trim())
            .build(config);
        state.unresolved.push(fallback);
    }
    None
}

/// Build the output entry for a confirmed candidate and route it: external-
/// only evidence lands in its own bucket, everything else is returned.
fn finish_confirmed(
    line: &InventoryLine,
    condition: &str,
    key: &IdentityKey,
    candidate: &RefCandidate,
    state: &mut ReconState,
    config: &MatchConfig,
) -> Option<StagedEntry> {
    let entry = EntryBuilder::new(line, condition)
        .candidate(candidate)
        .product_name(format!("{}{}", candidate.product_name, key.suffix))
        .build(config);

    if candidate.is_external_only() {
        state.external_only.push(entry);
        None
    } else {
        Some(entry)
    }
}

// ---------------------------------------------------------------------------
// Token lines
// ---------------------------------------------------------------------------

/// Token display name: both faces kept, the double-sided marker scrubbed
/// from the second face.
fn token_display_name(name: &str) -> String {
    match name.split_once("//") {
        Some((side1, side2)) => {
            format!("{} // {}", side1.trim(), strip_double_sided_marker(side2))
        }
        None => name.to_string(),
    }
}

fn strip_double_sided_marker(side: &str) -> String {
    let lower = side.to_ascii_lowercase();
    for marker in [
        "double-sided token",
        "double sided token",
        "doublesided token",
    ] {
        if let Some(pos) = lower.find(marker) {
            let mut out = String::new();
            out.push_str(&side[..pos]);
            out.push_str(&side[pos + marker.len()..]);
            return out.trim().to_string();
        }
    }
    side.trim().to_string()
}

fn resolve_token_line(
    line: &InventoryLine,
    condition: &str,
    pool: &mut CandidatePool,
    state: &mut ReconState,
    config: &MatchConfig,
) -> Option<StagedEntry> {
    let name = line.name.trim();
    let set = line.set.trim();
    let number = extract_number(&line.collector_number);

    let token_set = if is_token_set_code(set) {
        format!("{} tokens", &set[1..])
    } else {
        set.to_string()
    };
    let display_name = token_display_name(name);

    let Some(key) = normalize_key(&display_name, &token_set, condition, &number, config) else {
        eprintln!("skipping invalid or prerelease token: {name} ({set})");
        return None;
    };
    let identity = key.identity();

    // Slice of the pool restricted to token printings of this set.
    let token_set_lower = token_set.to_lowercase();
    let token_set_base = token_set_lower.replace(" tokens", "");
    let token_pool: CandidatePool = pool
        .iter()
        .filter(|(_, c)| {
            let set_name = c.set_name.to_lowercase();
            let product_name = c.product_name.to_lowercase();
            (set_name.contains("token") || product_name.contains("token"))
                && (set_name.contains(&token_set_lower) || set_name.contains(&token_set_base))
        })
        .map(|(k, c)| (k.clone(), c.clone()))
        .collect();

    if let Some(chosen) = state.confirmed(&identity).cloned() {
        let candidate = pool.get(&chosen)?.clone();
        return Some(token_entry(line, condition, &candidate, &token_set, config));
    }

    let matches = find_best_match(&identity, &token_pool, config);

    let decision = decide_token(&matches, config);
    let Decision::Confirm(chosen) = decision else {
        if !state.is_pending(&identity) {
            let fallback = EntryBuilder::new(line, condition)
                .product_name(&display_name)
                .set_name(&token_set)
                .number(number)
                .rarity(TOKEN_RARITY)
                .build(config);
            state.unresolved.push(fallback);
        }
        return None;
    };

    // A single-faced winner must not silently shadow an available two-faced
    // printing; defer with the double-faced slate instead.
    if name.contains("//") {
        let double_faced: Vec<(Identity, i64)> = matches
            .iter()
            .filter(|(m, _)| {
                token_pool
                    .get(m)
                    .is_some_and(|c| is_double_sided(&c.product_name))
            })
            .cloned()
            .collect();
        if let Some((top, _)) = double_faced.first() {
            if *top != chosen {
                state.defer(PendingItem {
                    key,
                    matches: double_faced,
                    line: line.clone(),
                    condition: condition.to_string(),
                });
                return None;
            }
        }
    }

    let candidate = token_pool.get(&chosen)?.clone();
    state.confirm(identity, chosen);
    Some(token_entry(line, condition, &candidate, &token_set, config))
}

fn token_entry(
    line: &InventoryLine,
    condition: &str,
    candidate: &RefCandidate,
    token_set: &str,
    config: &MatchConfig,
) -> StagedEntry {
    EntryBuilder::new(line, condition)
        .candidate(candidate)
        .set_name(token_set)
        .rarity(TOKEN_RARITY)
        .build(config)
}

// ---------------------------------------------------------------------------
// Adjudication
// ---------------------------------------------------------------------------

/// Apply one adjudication decision to a pending item. `Some(identity)`
/// confirms that candidate and yields its entry; `None` (skip) routes the
/// line to the unresolved bucket.
pub fn apply_adjudication(
    item: PendingItem,
    choice: Option<Identity>,
    pool: &CandidatePool,
    state: &mut ReconState,
    config: &MatchConfig,
) -> Option<StagedEntry> {
    let chosen = choice.and_then(|c| pool.get(&c).cloned().map(|cand| (c, cand)));

    match chosen {
        Some((chosen, candidate)) => {
            state.confirm(item.key.identity(), chosen);
            finish_confirmed(&item.line, &item.condition, &item.key, &candidate, state, config)
        }
        None => {
            let fallback = EntryBuilder::new(&item.line, &item.condition)
                .product_name(item.line.name.trim())
                .set_name(item.line.set.trim())
                .build(config);
            state.unresolved.push(fallback);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Terminal bucket counts for user-visible reporting.
pub fn compute_summary(lines: usize, resolved: usize, state: &ReconState) -> ResolveSummary {
    ResolveSummary {
        lines,
        resolved,
        external_only: state.external_only.len(),
        unresolved: state.unresolved.len(),
        pending: state.pending_len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_set_codes() {
        assert!(is_token_set_code("TDSK"));
        assert!(is_token_set_code("T2X2"));
        assert!(!is_token_set_code("DSK"));
        assert!(!is_token_set_code("T"));
        assert!(!is_token_set_code("Throne of Eldraine"));
    }

    #[test]
    fn token_detection() {
        assert!(is_token("Goblin Token", "DSK"));
        assert!(is_token("Goblin", "Duskmourn Tokens"));
        assert!(is_token("Goblin", "TDSK"));
        assert!(!is_token("Goblin Guide", "ZEN"));
    }

    #[test]
    fn number_extraction() {
        assert_eq!(extract_number("123"), "123");
        assert_eq!(extract_number("CMM-736"), "736");
        assert_eq!(extract_number("A-123"), "123");
        assert_eq!(extract_number("p42"), "42");
        assert_eq!(extract_number(""), "");
    }

    #[test]
    fn condition_display_mapping() {
        let config = MatchConfig::default();
        let mut line = InventoryLine {
            condition_code: "lightly_played".into(),
            ..InventoryLine::default()
        };
        assert_eq!(display_condition(&line, &config), "Lightly Played");

        line.foil = true;
        assert_eq!(display_condition(&line, &config), "Lightly Played Foil");

        line.condition_code = "mystery grade".into();
        assert_eq!(display_condition(&line, &config), "Near Mint Foil");

        line.condition_code = String::new();
        line.foil = false;
        assert_eq!(display_condition(&line, &config), "Near Mint");
    }

    #[test]
    fn double_sided_marker_scrubbed() {
        assert_eq!(
            token_display_name("Zombie // Zombie Double-Sided Token"),
            "Zombie // Zombie"
        );
        assert_eq!(
            token_display_name("Treasure // Food double sided token"),
            "Treasure // Food"
        );
        assert_eq!(token_display_name("Goblin Token"), "Goblin Token");
    }
}
