// Integration tests for `cardrecon run` / `validate` / `reprice`.
// Run with: cargo test -p cardrecon-cli --test run_tests

use std::path::Path;
use std::process::Command;

fn cardrecon() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cardrecon"))
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const INVENTORY: &str = "\
Name,Set code,Collector number,Foil,Quantity,Scryfall ID,Purchase price,Condition
Lightning Bolt,Alpha,1,normal,2,,150.00,near_mint
Lightning Bolt,Alpha,1,normal,1,,150.00,near_mint
Mystery Card,Nowhere,99,normal,1,,0.25,near_mint
";

const CATALOG: &str = "\
TCGplayer Id,Product Line,Set Name,Product Name,Number,Rarity,Condition,TCG Marketplace Price
10047,Magic: The Gathering,Alpha,Lightning Bolt,1,Common,Near Mint,180.00
";

#[test]
fn offline_run_writes_merged_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = write(dir.path(), "collection.csv", INVENTORY);
    let catalog = write(dir.path(), "reference.csv", CATALOG);

    let output = cardrecon()
        .args([
            "run",
            inventory.to_str().unwrap(),
            catalog.to_str().unwrap(),
            "--offline",
            "--assume-skip",
            "--out-dir",
            dir.path().to_str().unwrap(),
        ])
        .output()
        .expect("failed to run cardrecon");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );

    let out_dir = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| {
            p.is_dir()
                && p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("converted_output_")
        })
        .expect("output folder created");

    let staged =
        std::fs::read_to_string(out_dir.join("tcgplayer_staged_inventory.csv")).unwrap();
    // Two duplicate bolt lines merge into one row with quantity 3.
    assert!(staged.contains("10047,Magic: The Gathering,Alpha,Lightning Bolt,1,Common,Near Mint,3,180.00"));

    let given_up =
        std::fs::read_to_string(out_dir.join("tcgplayer_given_up.csv")).unwrap();
    assert!(given_up.contains("Not Found"));
    assert!(given_up.contains("Mystery Card"));
}

#[test]
fn missing_inputs_exit_2() {
    let dir = tempfile::tempdir().unwrap();
    let output = cardrecon()
        .current_dir(dir.path())
        .args(["run", "--offline", "--assume-skip"])
        .output()
        .expect("failed to run cardrecon");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot find"), "stderr: {stderr}");
}

#[test]
fn unreadable_catalog_exits_11() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = write(dir.path(), "collection.csv", INVENTORY);

    let output = cardrecon()
        .args([
            "run",
            inventory.to_str().unwrap(),
            dir.path().join("no-such-catalog.csv").to_str().unwrap(),
            "--offline",
            "--assume-skip",
        ])
        .output()
        .expect("failed to run cardrecon");

    assert_eq!(output.status.code(), Some(11));
}

#[test]
fn validate_accepts_defaults_and_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "match.toml", "high_confidence_score = 280\n");

    let output = cardrecon()
        .args(["validate", config.to_str().unwrap()])
        .output()
        .expect("failed to run cardrecon");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("valid"));
}

#[test]
fn validate_rejects_inverted_thresholds_with_10() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "match.toml", "medium_confidence_score = 999\n");

    let output = cardrecon()
        .args(["validate", config.to_str().unwrap()])
        .output()
        .expect("failed to run cardrecon");
    assert_eq!(output.status.code(), Some(10));
}

#[test]
fn reprice_missing_input_exits_11() {
    let output = cardrecon()
        .args(["reprice", "/no/such/inventory.csv"])
        .output()
        .expect("failed to run cardrecon");
    assert_eq!(output.status.code(), Some(11));
}

#[test]
fn json_summary_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = write(dir.path(), "collection.csv", INVENTORY);
    let catalog = write(dir.path(), "reference.csv", CATALOG);

    let output = cardrecon()
        .args([
            "run",
            inventory.to_str().unwrap(),
            catalog.to_str().unwrap(),
            "--offline",
            "--assume-skip",
            "--json",
            "--out-dir",
            dir.path().to_str().unwrap(),
        ])
        .output()
        .expect("failed to run cardrecon");
    assert_eq!(output.status.code(), Some(0));

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON summary");
    assert_eq!(summary["lines"], 3);
    assert_eq!(summary["resolved"], 1);
    assert_eq!(summary["unresolved"], 1);
}
