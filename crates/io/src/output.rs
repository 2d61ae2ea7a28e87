use std::path::{Path, PathBuf};

use cardrecon_engine::StagedEntry;

/// Column order of every output file; the marketplace upload format
/// depends on it.
pub const OUTPUT_FIELDS: [&str; 9] = [
    "TCGplayer Id",
    "Product Line",
    "Set Name",
    "Product Name",
    "Number",
    "Rarity",
    "Condition",
    "Add to Quantity",
    "TCG Marketplace Price",
];

pub const STAGED_FILE: &str = "tcgplayer_staged_inventory.csv";
pub const EXTERNAL_ONLY_FILE: &str = "cards_missing_from_tcgplayer.csv";
pub const UNRESOLVED_FILE: &str = "tcgplayer_given_up.csv";

/// Create a fresh timestamped output folder under `base`.
pub fn create_output_folder(base: &Path) -> Result<PathBuf, String> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let dir = base.join(format!("converted_output_{stamp}"));
    std::fs::create_dir_all(&dir).map_err(|e| format!("cannot create {}: {e}", dir.display()))?;
    Ok(dir)
}

/// Write the terminal buckets: staged inventory always, the external-only
/// and unresolved files only when they have rows. Returns the files written.
pub fn write_outputs(
    dir: &Path,
    staged: &[StagedEntry],
    external_only: &[StagedEntry],
    unresolved: &[StagedEntry],
) -> Result<Vec<PathBuf>, String> {
    let mut written = Vec::new();

    let staged_path = dir.join(STAGED_FILE);
    write_entries(&staged_path, staged)?;
    written.push(staged_path);

    if !external_only.is_empty() {
        let path = dir.join(EXTERNAL_ONLY_FILE);
        write_entries(&path, external_only)?;
        written.push(path);
    }

    if !unresolved.is_empty() {
        let path = dir.join(UNRESOLVED_FILE);
        write_entries(&path, unresolved)?;
        written.push(path);
    }

    Ok(written)
}

fn write_entries(path: &Path, entries: &[StagedEntry]) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    writer
        .write_record(OUTPUT_FIELDS)
        .map_err(|e| e.to_string())?;
    for entry in entries {
        let quantity = entry.quantity.to_string();
        writer
            .write_record([
                entry.tcgplayer_id.as_str(),
                entry.product_line.as_str(),
                entry.set_name.as_str(),
                entry.product_name.as_str(),
                entry.number.as_str(),
                entry.rarity.as_str(),
                entry.condition.as_str(),
                quantity.as_str(),
                entry.price.as_str(),
            ])
            .map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, quantity: i64) -> StagedEntry {
        StagedEntry {
            tcgplayer_id: id.into(),
            product_line: "Magic: The Gathering".into(),
            set_name: "Dominaria".into(),
            product_name: name.into(),
            number: "33".into(),
            rarity: "Uncommon".into(),
            condition: "Near Mint".into(),
            quantity,
            price: "1.25".into(),
        }
    }

    #[test]
    fn staged_file_always_written() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_outputs(dir.path(), &[entry("1", "Serra Angel", 2)], &[], &[]).unwrap();
        assert_eq!(written.len(), 1);

        let text = std::fs::read_to_string(&written[0]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "TCGplayer Id,Product Line,Set Name,Product Name,Number,Rarity,Condition,Add to Quantity,TCG Marketplace Price"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,Magic: The Gathering,Dominaria,Serra Angel,33,Uncommon,Near Mint,2,1.25"
        );
    }

    #[test]
    fn side_files_only_when_nonempty() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_outputs(
            dir.path(),
            &[entry("1", "Serra Angel", 1)],
            &[entry("Scryfall Verified", "Remote Card", 1)],
            &[entry("Not Found", "Mystery Card", 1)],
        )
        .unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join(EXTERNAL_ONLY_FILE).exists());
        assert!(dir.path().join(UNRESOLVED_FILE).exists());

        let dir2 = tempfile::tempdir().unwrap();
        let written = write_outputs(dir2.path(), &[], &[], &[]).unwrap();
        assert_eq!(written.len(), 1);
        assert!(!dir2.path().join(EXTERNAL_ONLY_FILE).exists());
        assert!(!dir2.path().join(UNRESOLVED_FILE).exists());
    }

    #[test]
    fn output_folder_is_timestamped() {
        let base = tempfile::tempdir().unwrap();
        let dir = create_output_folder(base.path()).unwrap();
        assert!(dir.is_dir());
        assert!(dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("converted_output_"));
    }

    #[test]
    fn quoting_when_fields_contain_commas() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_outputs(
            dir.path(),
            &[entry("1", "Serra Angel (Promo: bundle, launch)", 1)],
            &[],
            &[],
        )
        .unwrap();
        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert!(text.contains("\"Serra Angel (Promo: bundle, launch)\""));
    }
}
