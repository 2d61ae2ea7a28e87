//! `cardrecon reprice` — standalone marketplace price recalculation for an
//! exported inventory CSV. Unrelated to the resolution pass; operates on
//! whatever rows the export contains.

use std::path::PathBuf;

use cardrecon_io::read_file_as_utf8;

use crate::exit_codes::{EXIT_MISSING_INPUT, EXIT_RUNTIME};
use crate::CliError;

const REPRICE_FLOOR: f64 = 0.25;
const DEFAULT_OUTPUT: &str = "Updated_TCGplayer_Inventory.csv";

fn err(code: u8, msg: impl Into<String>) -> CliError {
    CliError {
        code,
        message: msg.into(),
        hint: None,
    }
}

/// Marketplace price with dynamic multipliers:
/// 150% of base below $15, 130% at or above $15, clamped to the floor.
fn recalculated_price(base: f64) -> f64 {
    let multiplier = if base >= 15.0 { 1.3 } else { 1.5 };
    (base * multiplier).max(REPRICE_FLOOR)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

pub fn cmd_reprice(input: PathBuf, output: Option<PathBuf>) -> Result<(), CliError> {
    let text = read_file_as_utf8(&input).map_err(|e| err(EXIT_MISSING_INPUT, e))?;
    let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Vec<String> = reader
        .headers()
        .map_err(|e| err(EXIT_RUNTIME, e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |headers: &[String], name: &str| {
        headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    };
    let required = |headers: &[String], name: &str| {
        idx(headers, name).ok_or_else(|| err(EXIT_RUNTIME, format!("missing column '{name}'")))
    };

    let market_idx = required(&headers, "TCG Market Price")?;
    let total_idx = required(&headers, "Total Quantity")?;
    let low_idx = idx(&headers, "TCG Low Price");
    let add_idx = idx(&headers, "Add to Quantity");

    // The export creates this column when it is absent.
    let marketplace_idx = match idx(&headers, "TCG Marketplace Price") {
        Some(i) => i,
        None => {
            headers.push("TCG Marketplace Price".to_string());
            headers.len() - 1
        }
    };

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| err(EXIT_RUNTIME, e.to_string()))?;
        let mut row: Vec<String> = record.iter().map(|f| f.to_string()).collect();
        row.resize(headers.len(), String::new());

        let base = record
            .get(market_idx)
            .and_then(parse_number)
            .or_else(|| low_idx.and_then(|i| record.get(i)).and_then(parse_number))
            .unwrap_or(0.0);
        row[marketplace_idx] = format!("{:.2}", recalculated_price(base));

        // Quantities merge additively and never drop below the current total.
        let current = record
            .get(total_idx)
            .and_then(parse_number)
            .unwrap_or(0.0) as i64;
        let add = add_idx
            .and_then(|i| record.get(i))
            .and_then(parse_number)
            .unwrap_or(0.0) as i64;
        row[total_idx] = (current + add).max(current).to_string();

        rows.push(row);
    }

    let mut writer = csv::Writer::from_path(&output)
        .map_err(|e| err(EXIT_RUNTIME, format!("cannot write {}: {e}", output.display())))?;
    writer
        .write_record(&headers)
        .map_err(|e| err(EXIT_RUNTIME, e.to_string()))?;
    for row in &rows {
        writer
            .write_record(row)
            .map_err(|e| err(EXIT_RUNTIME, e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| err(EXIT_RUNTIME, e.to_string()))?;

    eprintln!("updated inventory saved to {}", output.display());
    Ok(())
}
