use cardrecon_engine::InventoryLine;

/// Load inventory rows from CSV text in the collection-export schema.
///
/// Only the name and set columns are load-bearing; anything else missing
/// degrades to an empty field or a default rather than failing the row.
pub fn load_inventory(csv_data: &str) -> Result<Vec<InventoryLine>, String> {
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

    let name_idx = idx("Name");
    let set_idx = idx("Set code");
    let condition_idx = idx("Condition");
    let foil_idx = idx("Foil");
    let quantity_idx = idx("Quantity");
    let price_idx = idx("Purchase price");
    let number_idx = idx("Collector number");
    let scryfall_idx = idx("Scryfall ID");

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let field = |i: Option<usize>| {
            i.and_then(|i| record.get(i)).unwrap_or("").trim().to_string()
        };

        lines.push(InventoryLine {
            name: field(name_idx),
            set: field(set_idx),
            condition_code: field(condition_idx),
            foil: field(foil_idx).to_lowercase() == "foil",
            quantity: field(quantity_idx).parse().unwrap_or(1),
            purchase_price: field(price_idx),
            collector_number: field(number_idx),
            scryfall_id: field(scryfall_idx),
        });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_basic_export() {
        let csv = "\
Name,Set code,Set name,Collector number,Foil,Rarity,Quantity,ManaBox ID,Scryfall ID,Purchase price,Condition
Lightning Bolt,LEA,Limited Edition Alpha,1,normal,common,2,101,aaaa-bbbb,150.00,near_mint
Serra Angel,DOM,Dominaria,33,foil,uncommon,1,102,cccc-dddd,0.50,lightly_played
";
        let lines = load_inventory(csv).unwrap();
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0].name, "Lightning Bolt");
        assert_eq!(lines[0].set, "LEA");
        assert_eq!(lines[0].collector_number, "1");
        assert!(!lines[0].foil);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].purchase_price, "150.00");
        assert_eq!(lines[0].condition_code, "near_mint");
        assert_eq!(lines[0].scryfall_id, "aaaa-bbbb");

        assert!(lines[1].foil);
        assert_eq!(lines[1].quantity, 1);
    }

    #[test]
    fn missing_columns_degrade_to_defaults() {
        let csv = "\
Name,Set code
Lightning Bolt,LEA
";
        let lines = load_inventory(csv).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Lightning Bolt");
        assert_eq!(lines[0].condition_code, "");
        assert_eq!(lines[0].quantity, 1);
        assert!(!lines[0].foil);
    }

    #[test]
    fn malformed_quantity_defaults_to_one() {
        let csv = "\
Name,Set code,Quantity
Lightning Bolt,LEA,lots
";
        let lines = load_inventory(csv).unwrap();
        assert_eq!(lines[0].quantity, 1);
    }
}
