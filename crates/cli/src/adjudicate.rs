//! Console adjudication of the pending queue.
//!
//! The engine hands over each deferred item's ranked slate; the operator
//! picks a candidate or skips. Any input failure skips the remainder —
//! adjudication trouble must not fail the run.

use std::io::{BufRead, Write};

use cardrecon_engine::engine::apply_adjudication;
use cardrecon_engine::{CandidatePool, Identity, MatchConfig, PendingItem, ReconState, StagedEntry};

enum Prompt {
    Choose(Identity),
    Skip,
    QuitRest,
}

/// Walk the pending queue in order, prompting per item. Returns the entries
/// produced by confirmed picks; skipped items land in the unresolved bucket.
pub fn adjudicate_pending(
    items: Vec<PendingItem>,
    pool: &CandidatePool,
    state: &mut ReconState,
    config: &MatchConfig,
    assume_skip: bool,
) -> Vec<StagedEntry> {
    if items.is_empty() {
        return Vec::new();
    }
    eprintln!("\n{} item(s) need manual confirmation", items.len());

    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    let mut confirmed = Vec::new();
    let mut skipped = 0usize;
    let mut skip_rest = assume_skip;

    for item in items {
        let choice = if skip_rest {
            None
        } else {
            match prompt_for_item(&item, pool, &mut input) {
                Ok(Prompt::Choose(identity)) => Some(identity),
                Ok(Prompt::Skip) => None,
                Ok(Prompt::QuitRest) | Err(_) => {
                    eprintln!("skipping remaining confirmations");
                    skip_rest = true;
                    None
                }
            }
        };

        let was_confirmed = choice.is_some();
        match apply_adjudication(item, choice, pool, state, config) {
            Some(entry) => {
                eprintln!("confirmed: {}", entry.product_name);
                confirmed.push(entry);
            }
            None if was_confirmed => {
                // External-only pick: routed to its own bucket by the engine.
            }
            None => skipped += 1,
        }
    }

    eprintln!(
        "manual confirmations done: {} confirmed, {} skipped",
        confirmed.len(),
        skipped,
    );
    confirmed
}

fn prompt_for_item(
    item: &PendingItem,
    pool: &CandidatePool,
    input: &mut impl BufRead,
) -> std::io::Result<Prompt> {
    let shown = item.matches.len().min(5);

    eprintln!(
        "\n{} [{}] #{} — {}",
        item.line.name.trim(),
        item.key.set,
        item.key.number.as_deref().unwrap_or("-"),
        item.condition,
    );
    for (i, (candidate, score)) in item.matches.iter().take(shown).enumerate() {
        match pool.get(candidate) {
            Some(c) => eprintln!(
                "  {}. {} — {} #{} (score {score})",
                i + 1,
                c.product_name,
                c.set_name,
                c.number,
            ),
            None => eprintln!("  {}. {} (score {score})", i + 1, candidate.name),
        }
    }
    eprint!("confirm [1-{shown}], [s]kip, [q]uit rest: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        // EOF counts as adjudication going away.
        return Ok(Prompt::QuitRest);
    }

    let answer = line.trim().to_lowercase();
    if answer == "q" {
        return Ok(Prompt::QuitRest);
    }
    if let Ok(n) = answer.parse::<usize>() {
        if (1..=shown).contains(&n) {
            return Ok(Prompt::Choose(item.matches[n - 1].0.clone()));
        }
    }
    Ok(Prompt::Skip)
}
