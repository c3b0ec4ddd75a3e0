//! CSV Export functionality
//!
//! Exports executed cycles of every cyclic budget, one row per cycle.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::{TallyError, TallyResult};
use crate::services::BudgetService;

const CYCLE_HEADER: [&str; 12] = [
    "Budget ID",
    "Budget",
    "Period",
    "Start",
    "End",
    "Base",
    "Carried Over",
    "Total",
    "Spent",
    "Remaining",
    "Rate",
    "Status",
];

fn export_error(e: csv::Error) -> TallyError {
    TallyError::Export(e.to_string())
}

/// Export executed cycles of all active cyclic budgets to CSV
///
/// Cycles are executed against the ledger as of `today` before being written.
pub fn export_cycles_csv<W: Write>(
    service: &BudgetService<'_>,
    today: NaiveDate,
    writer: W,
) -> TallyResult<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CYCLE_HEADER).map_err(export_error)?;

    let threshold = service.warning_threshold();
    let mut rows = 0;

    for budget in service.list_budgets(false)? {
        if !budget.is_cyclic() {
            continue;
        }

        for cycle in service.executed_cycles(budget.id, today)? {
            csv.write_record([
                budget.id.to_string(),
                budget.name.clone(),
                cycle.period_number.to_string(),
                cycle.period_start.to_string(),
                cycle.period_end.to_string(),
                cycle.base_amount.to_string(),
                cycle.carried_over.to_string(),
                cycle.total_amount.to_string(),
                cycle.spent.to_string(),
                cycle.remaining().to_string(),
                format!("{:.2}", cycle.usage_rate()),
                cycle.status(threshold).label().to_string(),
            ])
            .map_err(export_error)?;
            rows += 1;
        }
    }

    csv.flush()
        .map_err(|e| TallyError::Export(e.to_string()))?;
    Ok(rows)
}
