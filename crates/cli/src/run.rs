//! `cardrecon run` — the end-to-end resolution pass.

use std::path::{Path, PathBuf};

use cardrecon_engine::engine::compute_summary;
use cardrecon_engine::entry::merge_entries;
use cardrecon_engine::{resolve_all, Enricher, MatchConfig, NoEnrichment, ReconState};
use cardrecon_io::{
    create_output_folder, detect_csv_files, load_catalog, load_inventory, read_file_as_utf8,
    write_outputs,
};
use cardrecon_scryfall::ScryfallClient;

use crate::adjudicate::adjudicate_pending;
use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_MISSING_INPUT, EXIT_RUNTIME, EXIT_USAGE};
use crate::CliError;

pub struct RunArgs {
    pub inventory: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub assume_skip: bool,
    pub offline: bool,
    pub out_dir: Option<PathBuf>,
    pub json: bool,
}

fn err(code: u8, msg: impl Into<String>) -> CliError {
    CliError {
        code,
        message: msg.into(),
        hint: None,
    }
}

fn load_config(path: Option<&Path>) -> Result<MatchConfig, CliError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| err(EXIT_MISSING_INPUT, format!("cannot read {}: {e}", path.display())))?;
            MatchConfig::from_toml(&text).map_err(|e| err(EXIT_INVALID_CONFIG, e.to_string()))
        }
        None => Ok(MatchConfig::default()),
    }
}

/// Fill in missing input paths by header-sniffing the working directory.
fn resolve_inputs(
    inventory: Option<PathBuf>,
    catalog: Option<PathBuf>,
) -> Result<(PathBuf, PathBuf), CliError> {
    if let (Some(inventory), Some(catalog)) = (&inventory, &catalog) {
        return Ok((inventory.clone(), catalog.clone()));
    }

    let detected = detect_csv_files(Path::new("."));
    let inventory = inventory.or(detected.inventory).ok_or_else(|| CliError {
        code: EXIT_USAGE,
        message: "cannot find an inventory export CSV".into(),
        hint: Some("pass the file explicitly: cardrecon run <inventory.csv> <catalog.csv>".into()),
    })?;
    let catalog = catalog.or(detected.catalog).ok_or_else(|| CliError {
        code: EXIT_USAGE,
        message: "cannot find a reference catalog CSV".into(),
        hint: Some("pass the file explicitly: cardrecon run <inventory.csv> <catalog.csv>".into()),
    })?;
    Ok((inventory, catalog))
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let (inventory_path, catalog_path) = resolve_inputs(args.inventory, args.catalog)?;

    eprintln!("inventory: {}", inventory_path.display());
    eprintln!("catalog:   {}", catalog_path.display());

    // A missing or unreadable catalog is the one fatal setup failure.
    let catalog_text = read_file_as_utf8(&catalog_path).map_err(|e| err(EXIT_MISSING_INPUT, e))?;
    let load = load_catalog(&catalog_text, &config).map_err(|e| err(EXIT_RUNTIME, e))?;
    if load.excluded > 0 {
        eprintln!("loaded {} cards (excluded {})", load.loaded, load.excluded);
    } else {
        eprintln!("loaded {} cards", load.loaded);
    }

    let inventory_text =
        read_file_as_utf8(&inventory_path).map_err(|e| err(EXIT_MISSING_INPUT, e))?;
    let lines = load_inventory(&inventory_text).map_err(|e| err(EXIT_RUNTIME, e))?;

    let mut pool = load.pool;
    let mut state = ReconState::new();

    let mut no_enrichment = NoEnrichment;
    let mut scryfall;
    let enricher: &mut dyn Enricher = if args.offline {
        &mut no_enrichment
    } else {
        scryfall = ScryfallClient::new().with_set_aliases(config.set_aliases.clone());
        &mut scryfall
    };

    let mut resolved = resolve_all(&lines, &mut pool, &mut state, enricher, &config);

    let pending = state.take_pending();
    let adjudicated =
        adjudicate_pending(pending, &pool, &mut state, &config, args.assume_skip);
    resolved.extend(adjudicated);

    let merged = merge_entries(resolved);

    let out_base = args.out_dir.unwrap_or_else(|| PathBuf::from("."));
    let out_dir = create_output_folder(&out_base).map_err(|e| err(EXIT_RUNTIME, e))?;
    let written = write_outputs(&out_dir, &merged, &state.external_only, &state.unresolved)
        .map_err(|e| err(EXIT_RUNTIME, e))?;

    let summary = compute_summary(lines.len(), merged.len(), &state);
    eprintln!(
        "{} lines: {} resolved, {} external-only, {} unresolved",
        summary.lines, summary.resolved, summary.external_only, summary.unresolved,
    );
    for path in &written {
        eprintln!("  wrote {}", path.display());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| err(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&config_path).map_err(|e| {
        err(
            EXIT_MISSING_INPUT,
            format!("cannot read {}: {e}", config_path.display()),
        )
    })?;

    match MatchConfig::from_toml(&text) {
        Ok(config) => {
            eprintln!(
                "valid: thresholds {}/{}/{} (margin {}), {} condition grades, {} set aliases",
                config.high_confidence_score,
                config.medium_confidence_score,
                config.token_score,
                config.score_margin,
                config.conditions.len(),
                config.set_aliases.len(),
            );
            Ok(())
        }
        Err(e) => Err(err(EXIT_INVALID_CONFIG, e.to_string())),
    }
}
