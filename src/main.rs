use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tally_cli::cli::{
    handle_budget_command, handle_export_command, handle_report_command, parse_date,
    BudgetCommands, ExportCommands, ReportCommands,
};
use tally_cli::config::{paths::TallyPaths, settings::LEDGER_FILE_ENV, Settings};
use tally_cli::ledger::InMemoryLedger;
use tally_cli::services::BudgetService;
use tally_cli::storage::Storage;

#[derive(Parser)]
#[command(
    name = "tally",
    author = "Kaylee Beyene",
    version,
    about = "Budget execution tracking over a plain-text ledger",
    long_about = "Tally measures spending recorded in a plain-text ledger against \
                  budgets. Budgets can be split into monthly or yearly cycles with \
                  optional carry-over, and projected onto any reporting window."
)]
struct Cli {
    /// Plain-text ledger to read spending from
    #[arg(long, global = true, env = LEDGER_FILE_ENV)]
    ledger: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    today: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Execution and cycle reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export budgets and cycles
    #[command(subcommand)]
    Export(ExportCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn load_ledger(settings: &Settings, explicit: Option<&Path>) -> Result<InMemoryLedger> {
    match settings.resolve_ledger_file(explicit) {
        Some(path) => InMemoryLedger::from_file(&path)
            .with_context(|| format!("Failed to load ledger {}", path.display())),
        None => {
            debug!("no ledger configured; all spend is zero");
            Ok(InMemoryLedger::default())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let today: NaiveDate = match cli.today.as_deref() {
        Some(date) => parse_date(date)?,
        None => Local::now().date_naive(),
    };

    let paths = TallyPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let storage = Storage::open(paths.clone())?;

    match cli.command {
        Some(Commands::Budget(cmd)) => {
            let ledger = load_ledger(&settings, cli.ledger.as_deref())?;
            let service = BudgetService::new(&storage, &ledger, &settings);
            handle_budget_command(&service, &settings, cmd, today)?;
        }
        Some(Commands::Report(cmd)) => {
            let ledger = load_ledger(&settings, cli.ledger.as_deref())?;
            let service = BudgetService::new(&storage, &ledger, &settings);
            handle_report_command(&service, cmd, today)?;
        }
        Some(Commands::Export(cmd)) => {
            let ledger = load_ledger(&settings, cli.ledger.as_deref())?;
            let service = BudgetService::new(&storage, &ledger, &settings);
            handle_export_command(&storage, &service, cmd, today)?;
        }
        Some(Commands::Audit { count }) => {
            let entries = storage.audit().read_recent(count)?;
            if entries.is_empty() {
                println!("No audit entries.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Init) => {
            println!("Initializing Tally at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            storage.save_all()?;
            println!("Initialization complete!");
            println!();
            println!("Point Tally at your ledger with --ledger, {}", LEDGER_FILE_ENV);
            println!("or the ledger_file setting in {}", paths.settings_file().display());
        }
        Some(Commands::Config) => {
            println!("Tally Configuration");
            println!("===================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Warning threshold: {}%", settings.warning_threshold);
            println!("  Default currency:  {}", settings.default_currency);
            println!("  Date format:       {}", settings.date_format);
            match settings.resolve_ledger_file(cli.ledger.as_deref()) {
                Some(path) => println!("  Ledger file:       {}", path.display()),
                None => println!("  Ledger file:       (none)"),
            }
        }
        None => {
            println!("Tally - budget execution over a plain-text ledger");
            println!();
            println!("Run 'tally --help' for usage information.");
        }
    }

    Ok(())
}
