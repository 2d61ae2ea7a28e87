//! Scryfall HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Lookup failures of
//! any kind — network, HTTP status, parse — degrade to "no match found";
//! enrichment never aborts a resolution pass.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use cardrecon_engine::model::{EXTERNAL_ONLY_ID, PRODUCT_LINE};
use cardrecon_engine::{
    CandidatePool, Enricher, Identity, IdentityKey, InventoryLine, RefCandidate,
};

use crate::rate_limit::RateLimiter;

const DEFAULT_BASE_URL: &str = "https://api.scryfall.com";
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Score assigned to a synthesized candidate: high enough to clear the
/// external-only confirmation bar.
const SYNTHETIC_SCORE: i64 = 350;

/// A remote hit is only injected when no local candidate already scores
/// at least this much.
const LOCAL_SCORE_CUTOFF: i64 = 300;

/// The card attributes the adapter consumes from a Scryfall response.
#[derive(Debug, Clone)]
pub struct RemoteCard {
    pub name: String,
    pub set_name: String,
    pub collector_number: String,
    pub rarity: String,
    pub promo: bool,
    pub promo_types: Vec<String>,
}

/// Blocking Scryfall client with an adaptive rate limiter and a
/// process-lifetime lookup cache (misses are cached too).
pub struct ScryfallClient {
    http: reqwest::blocking::Client,
    base_url: String,
    limiter: RateLimiter,
    cache: HashMap<String, Option<RemoteCard>>,
    set_aliases: HashMap<String, String>,
}

impl ScryfallClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different API root (tests use a local mock).
    pub fn with_base_url(base_url: &str) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("cardrecon/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(DEFAULT_RATE_LIMIT),
            cache: HashMap::new(),
            set_aliases: HashMap::new(),
        }
    }

    /// Alias table consulted when deriving a set code from a set name.
    pub fn with_set_aliases(mut self, aliases: HashMap<String, String>) -> Self {
        self.set_aliases = aliases;
        self
    }

    /// Exact lookup by Scryfall id.
    pub fn lookup_by_id(&mut self, scryfall_id: &str) -> Option<RemoteCard> {
        let cache_key = format!("id|{scryfall_id}");
        if let Some(cached) = self.cache.get(&cache_key) {
            return cached.clone();
        }

        let url = format!("{}/cards/{scryfall_id}", self.base_url);
        let card = self.get_json(&url, &[]).map(|v| parse_card(&v));
        self.cache.insert(cache_key, card.clone());
        card
    }

    /// Lookup by name and set code, by exact collector number when one is
    /// available, falling back to a name search within the set.
    pub fn lookup(
        &mut self,
        card_name: &str,
        set_code: &str,
        collector_number: Option<&str>,
    ) -> Option<RemoteCard> {
        let cache_key = format!(
            "{card_name}|{set_code}|{}",
            collector_number.unwrap_or_default()
        );
        if let Some(cached) = self.cache.get(&cache_key) {
            return cached.clone();
        }

        let card = self.lookup_uncached(card_name, set_code, collector_number);
        self.cache.insert(cache_key, card.clone());
        card
    }

    fn lookup_uncached(
        &mut self,
        card_name: &str,
        set_code: &str,
        collector_number: Option<&str>,
    ) -> Option<RemoteCard> {
        if let Some(number) = collector_number {
            let url = format!("{}/cards/{set_code}/{number}", self.base_url);
            if let Some(v) = self.get_json(&url, &[]) {
                return Some(parse_card(&v));
            }
        }

        let url = format!("{}/cards/search", self.base_url);
        let query = format!("\"{card_name}\" set:{set_code}");
        let v = self.get_json(&url, &[("q", query.as_str()), ("format", "json")])?;

        let total = v["total_cards"].as_u64().unwrap_or(0);
        if total == 0 {
            return None;
        }
        let data = v["data"].as_array()?;
        let exact = data.iter().find(|card| {
            card["name"]
                .as_str()
                .is_some_and(|n| n.eq_ignore_ascii_case(card_name))
        });
        exact.or_else(|| data.first()).map(parse_card)
    }

    /// Rate-limited GET returning parsed JSON, or `None` on any failure.
    fn get_json(&mut self, url: &str, query: &[(&str, &str)]) -> Option<serde_json::Value> {
        let delay = self.limiter.pre_request_delay(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.limiter.note_request(Instant::now());

        let response = match self.http.get(url).query(query).send() {
            Ok(response) => response,
            Err(e) => {
                eprintln!("warning: scryfall request failed: {e}");
                return None;
            }
        };

        let status = response.status().as_u16();
        if status == 429 {
            self.limiter.note_429(Instant::now());
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let wait = self.limiter.retry_wait(retry_after.as_deref());
            eprintln!("warning: scryfall rate limited, waiting {}s", wait.as_secs());
            thread::sleep(wait);
            return None;
        }
        self.limiter.note_success();

        if status != 200 {
            return None;
        }
        match response.json::<serde_json::Value>() {
            Ok(v) => Some(v),
            Err(e) => {
                eprintln!("warning: scryfall returned unparseable JSON: {e}");
                None
            }
        }
    }
}

impl Default for ScryfallClient {
    fn default() -> Self {
        Self::new()
    }
}

// ── Enrichment ──────────────────────────────────────────────────────

impl Enricher for ScryfallClient {
    /// Resolve a remote lookup for a weak or empty local slate. A qualifying
    /// hit is synthesized into the pool under the query identity and takes
    /// rank 0 with a fixed high score.
    fn enrich(
        &mut self,
        key: &IdentityKey,
        line: &InventoryLine,
        mut matches: Vec<(Identity, i64)>,
        pool: &mut CandidatePool,
    ) -> Vec<(Identity, i64)> {
        let mut card = None;
        let scryfall_id = line.scryfall_id.trim();
        if !scryfall_id.is_empty() {
            card = self.lookup_by_id(scryfall_id);
        }
        if card.is_none() {
            let set_code = derive_set_code(&key.set, &self.set_aliases);
            card = self.lookup(&key.name, &set_code, key.number.as_deref());
        }

        let Some(card) = card else {
            eprintln!("scryfall: no match for {}", key.name);
            return matches;
        };

        let best = matches.first().map(|(_, score)| *score).unwrap_or(0);
        if !matches.is_empty() && best >= LOCAL_SCORE_CUTOFF {
            return matches;
        }

        let promo_info = promo_annotation(&card);
        let identity = key.identity();
        pool.insert(identity.clone(), synthetic_candidate(&card, key));
        matches.insert(0, (identity, SYNTHETIC_SCORE));
        eprintln!("scryfall: found external-only variant{promo_info}");
        matches
    }
}

/// Derive the set code for a remote query: the alias table when it knows the
/// set, otherwise the first letters of up to three words. The initials
/// heuristic is known to misfire for multi-word sets with common initials;
/// that behavior is inherited.
pub fn derive_set_code(set_name: &str, aliases: &HashMap<String, String>) -> String {
    let mut set_code = aliases
        .get(set_name)
        .cloned()
        .unwrap_or_else(|| set_name.to_string());

    if set_name.len() > 3 {
        let words: Vec<&str> = set_name.split_whitespace().collect();
        if words.len() >= 2 {
            set_code = words
                .iter()
                .take(3)
                .filter_map(|w| w.chars().next())
                .collect::<String>()
                .to_lowercase();
        }
    }
    set_code
}

fn parse_card(v: &serde_json::Value) -> RemoteCard {
    RemoteCard {
        name: v["name"].as_str().unwrap_or_default().to_string(),
        set_name: v["set_name"].as_str().unwrap_or_default().to_string(),
        collector_number: v["collector_number"].as_str().unwrap_or_default().to_string(),
        rarity: v["rarity"].as_str().unwrap_or_default().to_string(),
        promo: v["promo"].as_bool().unwrap_or(false),
        promo_types: v["promo_types"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|t| t.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Candidate synthesized from a remote record, tagged with the
/// external-origin sentinel id.
fn synthetic_candidate(card: &RemoteCard, key: &IdentityKey) -> RefCandidate {
    let promo_suffix = if card.promo && !card.promo_types.is_empty() {
        format!(" ({})", title_case(&card.promo_types.join(", ")))
    } else {
        String::new()
    };

    RefCandidate {
        tcgplayer_id: EXTERNAL_ONLY_ID.to_string(),
        product_line: PRODUCT_LINE.to_string(),
        set_name: card.set_name.clone(),
        product_name: format!("{}{promo_suffix}", card.name),
        number: card.collector_number.clone(),
        rarity: title_case(&card.rarity),
        condition: key.condition.clone(),
        ..RefCandidate::default()
    }
}

fn promo_annotation(card: &RemoteCard) -> String {
    if !card.promo {
        return String::new();
    }
    if card.promo_types.is_empty() {
        " (Promo)".to_string()
    } else {
        format!(" (Promo: {})", card.promo_types.join(", "))
    }
}

/// Uppercase the first letter of each whitespace-separated word.
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
