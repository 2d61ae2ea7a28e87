use crate::config::MatchConfig;
use crate::model::{CandidatePool, Identity};

/// A condition string with the foil qualifier removed, for rank lookups.
fn strip_foil(condition: &str) -> String {
    condition.replace("foil", "").trim().to_string()
}

/// Score every candidate in the pool against a query identity.
///
/// Returns `(candidate, score)` pairs in descending score order (stable on
/// ties). Candidates that cannot possibly be the same card are skipped
/// outright rather than penalized: first-letter mismatches, single-word
/// names that differ, multi-word names with no shared token, and
/// pre-release prints.
///
/// When any candidate matches the query's collector number exactly, the
/// result is restricted to those exact-number candidates — an exact number
/// is decisive and locally overrides fuzzy ranking.
pub fn find_best_match(
    query: &Identity,
    pool: &CandidatePool,
    config: &MatchConfig,
) -> Vec<(Identity, i64)> {
    let mut matches: Vec<(Identity, i64)> = Vec::new();
    let mut exact_number: Vec<(Identity, i64)> = Vec::new();

    let query_words: Vec<&str> = query.name.split_whitespace().collect();
    let query_cond = strip_foil(&query.condition);

    for (candidate, record) in pool {
        if let (Some(q), Some(c)) = (query.name.chars().next(), candidate.name.chars().next()) {
            if q != c {
                continue;
            }
        }

        let candidate_words: Vec<&str> = candidate.name.split_whitespace().collect();
        if query_words.len() == 1 && candidate_words.len() == 1 {
            if query_words[0] != candidate_words[0] {
                continue;
            }
        } else if query_words.len() > 1 && candidate_words.len() > 1 {
            if !query_words.iter().any(|w| candidate_words.contains(w)) {
                continue;
            }
        }

        // Pre-release prints never participate in matching.
        if record.product_name.to_lowercase().contains("prerelease")
            || record.set_name.to_lowercase().contains("prerelease cards")
        {
            continue;
        }

        let mut score =
            (strsim::normalized_levenshtein(&query.name, &candidate.name) * 100.0).round() as i64;

        if query.name.contains(&candidate.name) || candidate.name.contains(&query.name) {
            score += 20;
        }
        if query.set == candidate.set {
            score += 50;
        }

        let mut is_exact_number = false;
        match (&query.number, &candidate.number) {
            // A missing number on either side is compatible-by-absence.
            (None, _) | (_, None) => score += 50,
            (Some(q), Some(c)) if q == c => {
                score += 100;
                is_exact_number = true;
            }
            _ => score -= 15,
        }

        let candidate_cond = strip_foil(&candidate.condition);
        match (
            config.condition_rank(&query_cond),
            config.condition_rank(&candidate_cond),
        ) {
            (Some(a), Some(b)) => {
                score += match (i64::from(a) - i64::from(b)).abs() {
                    0 => 50,
                    1 => -10,
                    _ => -30,
                };
            }
            _ => {
                if query.condition != candidate.condition {
                    score -= 20;
                }
            }
        }

        for (term, penalty) in &config.special_print_penalties {
            if query.condition.contains(term) != candidate.condition.contains(term) {
                score -= penalty;
            }
        }

        if is_exact_number {
            exact_number.push((candidate.clone(), score));
        }
        matches.push((candidate.clone(), score));
    }

    let mut result = if !exact_number.is_empty() {
        exact_number
    } else {
        if !matches.is_empty() {
            if let Some(number) = &query.number {
                eprintln!(
                    "warning: no exact collector number match for {} #{number}; showing closest variants",
                    query.name,
                );
            }
        }
        matches
    };

    result.sort_by(|a, b| b.1.cmp(&a.1));
    result
}
