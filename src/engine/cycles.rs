//! Cycle generation
//!
//! Splits a cyclic budget's `[start, end]` span into calendar months or
//! years. The first and last cycles may be partial; together the cycles tile
//! the span exactly.

use chrono::NaiveDate;
use tracing::warn;

use crate::models::period::{
    first_day_of_next_month, first_day_of_next_year, last_day_of_month, last_day_of_year,
};
use crate::models::{Budget, BudgetCycle, CycleType, DateRange};

/// Fresh cycles for `budget`: no carry-over, no spend
///
/// Empty for non-cyclic budgets and for budgets without an end date.
pub fn generate_cycles(budget: &Budget) -> Vec<BudgetCycle> {
    let Some(end_date) = budget.end_date else {
        return Vec::new();
    };

    type Step = fn(NaiveDate) -> NaiveDate;
    let (period_end_of, next_start_after): (Step, Step) = match budget.cycle_type {
        CycleType::None => return Vec::new(),
        CycleType::Monthly => (last_day_of_month, first_day_of_next_month),
        CycleType::Yearly => (last_day_of_year, first_day_of_next_year),
    };

    let mut cycles = Vec::new();
    let mut cursor = budget.start_date;
    let mut period_number = 1;

    while cursor <= end_date {
        let period_end = period_end_of(cursor).min(end_date);
        let Some(period) = DateRange::new(cursor, period_end) else {
            break;
        };

        match BudgetCycle::new(budget.id, period_number, period, budget.amount) {
            Ok(cycle) => cycles.push(cycle),
            Err(e) => {
                warn!(budget = %budget.name, error = %e, "stopped cycle generation");
                break;
            }
        }

        let next = next_start_after(period_end);
        if next <= period_end {
            break;
        }
        cursor = next;
        period_number += 1;
    }

    cycles
}
