// cardrecon CLI - reconcile a card inventory export against a marketplace catalog

mod adjudicate;
mod exit_codes;
mod reprice;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

/// An error carrying its shell exit code and an optional remediation hint.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Parser)]
#[command(name = "cardrecon")]
#[command(about = "Reconcile a card inventory export against a marketplace catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an inventory export against a reference catalog
    #[command(after_help = "\
Examples:
  cardrecon run                          # auto-detect both CSVs in the current folder
  cardrecon run collection.csv reference.csv
  cardrecon run --offline --assume-skip  # no remote lookups, no prompts
  cardrecon run --config match.toml --json")]
    Run {
        /// Inventory export CSV (auto-detected when omitted)
        inventory: Option<PathBuf>,

        /// Reference catalog CSV (auto-detected when omitted)
        catalog: Option<PathBuf>,

        /// Matching config TOML (tuned defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip every manual confirmation instead of prompting
        #[arg(long)]
        assume_skip: bool,

        /// Resolve without remote enrichment lookups
        #[arg(long)]
        offline: bool,

        /// Directory to create the output folder in (default: current)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a matching config file without running
    #[command(after_help = "\
Examples:
  cardrecon validate match.toml")]
    Validate {
        /// Path to the matching config TOML
        config: PathBuf,
    },

    /// Recalculate marketplace prices on an exported inventory CSV
    #[command(after_help = "\
Examples:
  cardrecon reprice TCGplayer_Inventory.csv
  cardrecon reprice TCGplayer_Inventory.csv -o repriced.csv")]
    Reprice {
        /// Exported inventory CSV with market price columns
        input: PathBuf,

        /// Output CSV path (default: Updated_TCGplayer_Inventory.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            inventory,
            catalog,
            config,
            assume_skip,
            offline,
            out_dir,
            json,
        } => run::cmd_run(run::RunArgs {
            inventory,
            catalog,
            config,
            assume_skip,
            offline,
            out_dir,
            json,
        }),
        Commands::Validate { config } => run::cmd_validate(config),
        Commands::Reprice { input, output } => reprice::cmd_reprice(input, output),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}
