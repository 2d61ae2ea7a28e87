use cardrecon_engine::model::DEFAULT_CONDITION;
use cardrecon_engine::normalize::normalize_key;
use cardrecon_engine::{CandidatePool, MatchConfig, RefCandidate};

/// A loaded reference catalog: the keyed pool plus load accounting.
#[derive(Debug)]
pub struct CatalogLoad {
    pub pool: CandidatePool,
    pub loaded: usize,
    pub excluded: usize,
}

/// Load the reference catalog from CSV text into a keyed candidate pool.
///
/// Rows with an empty set name are dropped. The prerelease and promo
/// exclusion filters run on the display product name before keys are
/// built; keys themselves also reject prerelease-only sets.
pub fn load_catalog(csv_data: &str, config: &MatchConfig) -> Result<CatalogLoad, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let idx = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let required = |name: &str| idx(name).ok_or_else(|| format!("catalog: missing column '{name}'"));

    let id_idx = required("TCGplayer Id")?;
    let line_idx = required("Product Line")?;
    let set_idx = required("Set Name")?;
    let name_idx = required("Product Name")?;
    let number_idx = required("Number")?;
    let rarity_idx = required("Rarity")?;
    let condition_idx = required("Condition")?;
    let market_idx = idx("TCG Marketplace Price");
    let list_idx = idx("List Price");
    let retail_idx = idx("Retail Price");

    let promo_re = if config.filter_promo && !config.promo_patterns.is_empty() {
        let pattern = format!("(?i){}", config.promo_patterns.join("|"));
        Some(regex::Regex::new(&pattern).map_err(|e| format!("bad promo pattern: {e}"))?)
    } else {
        None
    };

    let mut pool = CandidatePool::new();
    let mut excluded = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        let optional = |i: Option<usize>| i.and_then(|i| record.get(i)).unwrap_or("").trim().to_string();

        let set_name = field(set_idx);
        if set_name.is_empty() {
            continue;
        }

        let product_name = field(name_idx);
        if config.filter_prerelease && product_name.to_lowercase().contains("prerelease") {
            excluded += 1;
            continue;
        }
        if let Some(re) = &promo_re {
            if re.is_match(&product_name) {
                excluded += 1;
                continue;
            }
        }

        let mut condition = field(condition_idx);
        if condition.is_empty() {
            condition = DEFAULT_CONDITION.to_string();
        }
        let number = field(number_idx);

        let Some(key) = normalize_key(&product_name, &set_name, &condition, &number, config)
        else {
            continue;
        };

        pool.insert(
            key.identity(),
            RefCandidate {
                tcgplayer_id: field(id_idx),
                product_line: field(line_idx),
                set_name,
                product_name,
                number,
                rarity: field(rarity_idx),
                condition,
                market_price: optional(market_idx),
                list_price: optional(list_idx),
                retail_price: optional(retail_idx),
            },
        );
    }

    let loaded = pool.len();
    Ok(CatalogLoad {
        pool,
        loaded,
        excluded,
    })
}
