// listwash CLI - duplicate checks and removal across lead lists

mod check;
mod columns;
mod dedupe;
mod exit_codes;
mod remove;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use listwash_config::{Settings, SettingsError};
use listwash_io::{ReportFileError, StoreError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_PERMISSION, EXIT_REPORT_PARSE, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "listwash")]
#[command(about = "Find and remove duplicate business leads across spreadsheet datasets")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    /// Settings file (default: <config dir>/listwash/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable store call pacing (retries still apply)
    #[arg(long, global = true)]
    no_pacing: bool,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report candidate rows that already exist in a reference dataset (read-only)
    #[command(after_help = "\
Datasets are directories of CSV files (one file per tab) or .xlsx workbooks.
Each candidate tab is compared against the same-named reference tab first,
then against every other reference tab. Nothing is modified.

Examples:
  listwash check --sheet-a-id leads/ --sheet-b-id master.xlsx --output dupes.csv
  listwash check --sheet-a-id leads/ --sheet-b-id master/ --tabs Calgary,Edmonton --output dupes.csv
  listwash check --sheet-a-id leads/ --sheet-b-id master/ --output dupes.csv --json")]
    Check {
        /// Candidate dataset ("Sheet A")
        #[arg(long, value_name = "ID")]
        sheet_a_id: String,

        /// Reference dataset ("Sheet B"), never modified
        #[arg(long, value_name = "ID")]
        sheet_b_id: String,

        /// Only check these candidate tabs (comma-separated)
        #[arg(long, value_name = "CSV")]
        tabs: Option<String>,

        /// Where to write the duplicate report
        #[arg(long, short = 'o', value_name = "PATH")]
        output: PathBuf,

        /// Print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Delete reported duplicate rows from the candidate dataset
    #[command(after_help = "\
Rows are identified per tab by (business name, email, phone). Tabs with
nothing to remove are not rewritten. Running twice with the same report
removes nothing the second time.

Examples:
  listwash remove --sheet-a-id leads/ --duplicates-report dupes.csv
  listwash remove --sheet-a-id leads/ --duplicates-report dupes.csv --dry-run
  listwash remove --sheet-a-id leads/ --sheet-b-id master.xlsx --tabs Calgary")]
    Remove {
        /// Candidate dataset to modify
        #[arg(long, value_name = "ID")]
        sheet_a_id: String,

        /// Report written by `listwash check --output`
        #[arg(long, value_name = "PATH", required_unless_present = "sheet_b_id", conflicts_with = "sheet_b_id")]
        duplicates_report: Option<PathBuf>,

        /// Run the check in-process against this reference dataset instead of reading a report
        #[arg(long, value_name = "ID")]
        sheet_b_id: Option<String>,

        /// Only touch these candidate tabs (comma-separated)
        #[arg(long, value_name = "CSV")]
        tabs: Option<String>,

        /// Count what would be removed without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Copy a dataset minus every row matching an exclusion dataset
    #[command(after_help = "\
Matching is exact on website domain, business name or phone. The source and
exclusion datasets are left untouched; survivors go to a new dataset.

Examples:
  listwash dedupe --source-id scraped/ --exclusion-id customers.xlsx
  listwash dedupe --source-id scraped.xlsx --exclusion-id customers/ --output-id clean.xlsx")]
    Dedupe {
        /// Dataset to filter
        #[arg(long, value_name = "ID")]
        source_id: String,

        /// Dataset whose rows are excluded (all tabs)
        #[arg(long, value_name = "ID")]
        exclusion_id: String,

        /// Output dataset (default: <source>-deduped)
        #[arg(long, value_name = "ID")]
        output_id: Option<String>,

        /// Print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show which column each field resolves to, per tab
    #[command(after_help = "\
Examples:
  listwash columns --dataset-id leads/
  listwash columns --dataset-id master.xlsx --tab Calgary --json")]
    Columns {
        #[arg(long, value_name = "ID")]
        dataset_id: String,

        /// Only this tab
        #[arg(long)]
        tab: Option<String>,

        /// Print as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Settings file helpers
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings file path
    Path,
    /// Print the effective settings as TOML
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Config(ConfigCommands::Path) = cli.command {
        match &cli.config {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", Settings::config_path_display()),
        }
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref()).map_err(CliError::config)?;

    match cli.command {
        Commands::Check {
            sheet_a_id,
            sheet_b_id,
            tabs,
            output,
            json,
        } => check::cmd_check(&settings, cli.no_pacing, &sheet_a_id, &sheet_b_id, tabs.as_deref(), &output, json),
        Commands::Remove {
            sheet_a_id,
            duplicates_report,
            sheet_b_id,
            tabs,
            dry_run,
            json,
        } => {
            let source = match (duplicates_report, sheet_b_id) {
                (Some(path), _) => remove::RemovalSource::Report(path),
                (None, Some(id)) => remove::RemovalSource::Reference(id),
                (None, None) => {
                    return Err(CliError::usage("one of --duplicates-report or --sheet-b-id is required"))
                }
            };
            remove::cmd_remove(&settings, cli.no_pacing, &sheet_a_id, source, tabs.as_deref(), dry_run, json)
        }
        Commands::Dedupe {
            source_id,
            exclusion_id,
            output_id,
            json,
        } => dedupe::cmd_dedupe(&settings, cli.no_pacing, &source_id, &exclusion_id, output_id.as_deref(), json),
        Commands::Columns { dataset_id, tab, json } => {
            columns::cmd_columns(&settings, cli.no_pacing, &dataset_id, tab.as_deref(), json)
        }
        Commands::Config(ConfigCommands::Show) => cmd_config_show(&settings),
        Commands::Config(ConfigCommands::Path) => Ok(()),
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("LISTWASH_COMMIT"), ")",
        "\ntarget:  ", env!("LISTWASH_TARGET"),
        "\nreport:  13-column duplicate report v1",
    )
}

/// Logs go to stderr so stdout stays clean for `--json`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn cmd_config_show(settings: &Settings) -> Result<(), CliError> {
    let text = settings.to_toml().map_err(CliError::config)?;
    print!("{}", text);
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Create error from a store failure with the matching exit code.
    pub fn store(err: StoreError) -> Self {
        let (code, hint) = match &err {
            StoreError::PermissionDenied(_) => (
                EXIT_PERMISSION,
                Some("check file permissions or store credentials".to_string()),
            ),
            StoreError::NotFound(_) => (
                EXIT_STORE,
                Some("a dataset is a directory of .csv files or an .xlsx workbook".to_string()),
            ),
            StoreError::Transient(_) => (
                EXIT_STORE,
                Some("retries exhausted; raise [retry] max_retries or try again later".to_string()),
            ),
            StoreError::AlreadyExists(_) => (
                EXIT_STORE,
                Some("choose another --output-id or remove the existing dataset".to_string()),
            ),
            _ => (EXIT_STORE, None),
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn report(err: ReportFileError) -> Self {
        match err {
            ReportFileError::Write { .. } => Self { code: EXIT_STORE, message: err.to_string(), hint: None },
            ReportFileError::MissingColumns { .. } => Self {
                code: EXIT_REPORT_PARSE,
                message: err.to_string(),
                hint: Some("pass a report written by `listwash check --output`".to_string()),
            },
            _ => Self { code: EXIT_REPORT_PARSE, message: err.to_string(), hint: None },
        }
    }

    pub fn config(err: SettingsError) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: err.to_string(),
            hint: Some("run `listwash config show` without --config to see valid keys".to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::store(err)
    }
}

impl From<ReportFileError> for CliError {
    fn from(err: ReportFileError) -> Self {
        Self::report(err)
    }
}
