//! CLI commands for data export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Subcommand;

use crate::error::{TallyError, TallyResult};
use crate::export::{export_cycles_csv, export_full_json, export_full_yaml};
use crate::services::BudgetService;
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export budgets and cycles to JSON
    Json {
        /// Output file path
        output: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export budgets and cycles to YAML
    Yaml {
        /// Output file path
        output: PathBuf,
    },

    /// Export executed cycles of every cyclic budget to CSV
    CyclesCsv {
        /// Output file path
        output: PathBuf,
    },
}

fn create_output(path: &Path) -> TallyResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        TallyError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    service: &BudgetService<'_>,
    cmd: ExportCommands,
    today: NaiveDate,
) -> TallyResult<()> {
    match cmd {
        ExportCommands::Json { output, pretty } => {
            let mut writer = create_output(&output)?;
            export_full_json(storage, &mut writer, pretty)?;
            writer
                .flush()
                .map_err(|e| TallyError::Export(e.to_string()))?;
            println!("Budgets exported to: {}", output.display());
        }
        ExportCommands::Yaml { output } => {
            let mut writer = create_output(&output)?;
            export_full_yaml(storage, &mut writer)?;
            writer
                .flush()
                .map_err(|e| TallyError::Export(e.to_string()))?;
            println!("Budgets exported to: {}", output.display());
        }
        ExportCommands::CyclesCsv { output } => {
            let writer = create_output(&output)?;
            let rows = export_cycles_csv(service, today, writer)?;
            println!("Exported {} cycles to: {}", rows, output.display());
        }
    }

    Ok(())
}
