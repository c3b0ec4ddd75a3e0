//! CLI commands for reports
//!
//! Execution tables, cycle breakdowns, window projections and the monthly
//! overview.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::Subcommand;

use crate::display::{format_cycles, format_execution, format_execution_list, format_projection};
use crate::error::{TallyError, TallyResult};
use crate::models::DateRange;
use crate::reports::MonthlyOverviewReport;
use crate::services::BudgetService;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Show budget execution; all active budgets when none is given
    Execution {
        /// Budget name or ID
        budget: Option<String>,
    },

    /// Show the executed cycles of a cyclic budget
    Cycles {
        /// Budget name or ID
        budget: String,
    },

    /// Project a budget onto a reporting window
    Window {
        /// Budget name or ID
        budget: String,

        /// Window as YYYY-MM or YYYY-MM-DD..YYYY-MM-DD
        window: String,
    },

    /// Overview of every active budget for one calendar month
    #[command(alias = "monthly")]
    Month {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a report command
pub fn handle_report_command(
    service: &BudgetService<'_>,
    cmd: ReportCommands,
    today: NaiveDate,
) -> TallyResult<()> {
    match cmd {
        ReportCommands::Execution { budget: Some(budget) } => {
            let budget = service.resolve_budget(&budget)?;
            print!("{}", format_execution(&service.execution(budget.id, today)?));
        }
        ReportCommands::Execution { budget: None } => {
            print!("{}", format_execution_list(&service.executions(today)?));
            println!();
        }
        ReportCommands::Cycles { budget } => {
            let budget = service.resolve_budget(&budget)?;
            let cycles = service.executed_cycles(budget.id, today)?;
            print!(
                "{}",
                format_cycles(&budget, &cycles, service.warning_threshold(), today)
            );
        }
        ReportCommands::Window { budget, window } => {
            let budget = service.resolve_budget(&budget)?;
            let window = DateRange::parse(&window)
                .map_err(|e| TallyError::Validation(format!("Invalid window: {}", e)))?;
            print!(
                "{}",
                format_projection(&service.project_window(budget.id, window, today)?)
            );
        }
        ReportCommands::Month { month, output } => {
            handle_month_report(service, month, output, today)?;
        }
    }

    Ok(())
}

fn handle_month_report(
    service: &BudgetService<'_>,
    month: Option<String>,
    output: Option<PathBuf>,
    today: NaiveDate,
) -> TallyResult<()> {
    let window = match month {
        Some(month) => DateRange::parse(&month).map_err(|e| {
            TallyError::Validation(format!("Invalid month: {}. Use YYYY-MM ({})", month, e))
        })?,
        None => DateRange::month_of(today),
    };

    let report =
        MonthlyOverviewReport::generate(service, window.start.year(), window.start.month(), today)?;

    if let Some(path) = output {
        let file = File::create(&path).map_err(|e| {
            TallyError::Export(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        report.export_csv(BufWriter::new(file))?;
        println!("Monthly report exported to: {}", path.display());
    } else {
        println!("{}", report.format_terminal());
    }

    Ok(())
}
