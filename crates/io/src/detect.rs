use std::io::Read;
use std::path::{Path, PathBuf};

/// Output names from earlier runs; never candidates for input detection.
const SKIP_MARKERS: &[&str] = &[
    "tcgplayer_staged",
    "scryfall_verified",
    "tcgplayer_given_up",
    "cards_missing_from_tcgplayer",
];

#[derive(Debug, Default)]
pub struct DetectedFiles {
    pub inventory: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

/// Identify the inventory export and the reference catalog among a
/// directory's CSV files by sniffing their header rows. First match wins
/// for each role; files that fail to read are skipped.
pub fn detect_csv_files(dir: &Path) -> DetectedFiles {
    let mut detected = DetectedFiles::default();

    let Ok(entries) = std::fs::read_dir(dir) else {
        return detected;
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    for path in paths {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_lowercase();
        if SKIP_MARKERS.iter().any(|m| file_name.contains(m)) {
            continue;
        }

        let Some(header) = read_header_line(&path) else {
            continue;
        };

        if detected.inventory.is_none() && looks_like_inventory(&header) {
            detected.inventory = Some(path);
            continue;
        }
        if detected.catalog.is_none() && looks_like_catalog(&header) {
            detected.catalog = Some(path);
        }
    }

    detected
}

fn looks_like_inventory(header: &str) -> bool {
    let has_manabox_id = header.contains("manabox id");
    (has_manabox_id && header.contains("scryfall id"))
        || (!has_manabox_id
            && header.contains("set code")
            && header.contains("collector number")
            && header.contains("scryfall id"))
}

fn looks_like_catalog(header: &str) -> bool {
    header.contains("tcgplayer id") && header.contains("product line")
}

/// Lowercased first line of the file; a few KB is plenty for a CSV header.
fn read_header_line(path: &Path) -> Option<String> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut buf = [0u8; 4096];
    let n = file.read(&mut buf).ok()?;
    let text = String::from_utf8_lossy(&buf[..n]);
    text.lines().next().map(|l| l.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn detects_both_roles() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "collection.csv",
            "Name,Set code,Collector number,ManaBox ID,Scryfall ID\n",
        );
        write(
            dir.path(),
            "reference.csv",
            "TCGplayer Id,Product Line,Set Name,Product Name\n",
        );
        write(dir.path(), "notes.txt", "not a csv\n");

        let detected = detect_csv_files(dir.path());
        assert!(detected
            .inventory
            .unwrap()
            .to_string_lossy()
            .ends_with("collection.csv"));
        assert!(detected
            .catalog
            .unwrap()
            .to_string_lossy()
            .ends_with("reference.csv"));
    }

    #[test]
    fn inventory_like_file_without_manabox_id() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "export.csv",
            "Name,Set code,Collector number,Scryfall ID,Quantity\n",
        );
        let detected = detect_csv_files(dir.path());
        assert!(detected.inventory.is_some());
        assert!(detected.catalog.is_none());
    }

    #[test]
    fn output_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "tcgplayer_staged_inventory.csv",
            "TCGplayer Id,Product Line,Set Name\n",
        );
        write(
            dir.path(),
            "cards_missing_from_tcgplayer.csv",
            "TCGplayer Id,Product Line,Set Name\n",
        );
        let detected = detect_csv_files(dir.path());
        assert!(detected.inventory.is_none());
        assert!(detected.catalog.is_none());
    }

    #[test]
    fn unidentifiable_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "random.csv", "a,b,c\n1,2,3\n");
        let detected = detect_csv_files(dir.path());
        assert!(detected.inventory.is_none());
        assert!(detected.catalog.is_none());
    }
}
