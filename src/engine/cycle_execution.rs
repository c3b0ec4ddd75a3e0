//! Cycle execution with carry-over
//!
//! Cycles are executed in period order as an explicit fold: each cycle's
//! carry-in is derived from its already-executed predecessor only.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::TallyResult;
use crate::models::{
    execution_rate, Budget, BudgetCycle, BudgetExecution, ExecutionStatus, ItemExecution, Money,
};

use super::aggregator::SpendAggregator;

/// Balance carried into the cycle after `previous`
///
/// Only an elapsed predecessor of a carry-over budget passes on its
/// remaining balance, which is negative after an overspend.
pub fn carry_in(budget: &Budget, previous: Option<&BudgetCycle>, today: NaiveDate) -> Money {
    match previous {
        Some(previous) if budget.carry_over && previous.has_elapsed(today) => {
            previous.remaining()
        }
        _ => Money::zero(),
    }
}

/// Execute one cycle given its executed predecessor
pub fn execute_cycle(
    budget: &Budget,
    cycle: &BudgetCycle,
    previous: Option<&BudgetCycle>,
    aggregator: &SpendAggregator<'_>,
    today: NaiveDate,
) -> TallyResult<BudgetCycle> {
    let mut executed = cycle.clone();
    executed.set_carried_over(carry_in(budget, previous, today));

    let spent = aggregator.spent_for_items(&budget.items, cycle.period_start, cycle.period_end)?;
    executed.set_spent(spent)?;

    Ok(executed)
}

/// Recompute carry-over, totals and spend for a whole cycle set
///
/// Input order does not matter; the result is ordered by period number.
pub fn calculate_all(
    budget: &Budget,
    mut cycles: Vec<BudgetCycle>,
    aggregator: &SpendAggregator<'_>,
    today: NaiveDate,
) -> TallyResult<Vec<BudgetCycle>> {
    cycles.sort_by_key(|c| c.period_number);

    let executed = cycles.iter().try_fold(
        Vec::with_capacity(cycles.len()),
        |mut done: Vec<BudgetCycle>, cycle| {
            let next = execute_cycle(budget, cycle, done.last(), aggregator, today)?;
            done.push(next);
            TallyResult::Ok(done)
        },
    )?;

    debug!(budget = %budget.name, cycles = executed.len(), "executed cycles");
    Ok(executed)
}

/// The cycle a budget is "in" on `today`
///
/// The cycle containing `today`; before the first cycle the first one,
/// after the last cycle the last one.
pub fn current_cycle(cycles: &[BudgetCycle], today: NaiveDate) -> Option<&BudgetCycle> {
    cycles
        .iter()
        .find(|c| c.period().contains(today))
        .or_else(|| cycles.iter().rev().find(|c| c.period_start <= today))
        .or_else(|| cycles.first())
}

/// Aggregate an executed cycle set into one budget execution
///
/// The total is the sum of base amounts: carry-over only moves money between
/// cycles and is not counted twice.
pub fn summarize(
    budget: &Budget,
    cycles: &[BudgetCycle],
    items: Vec<ItemExecution>,
    warning_threshold: u8,
) -> BudgetExecution {
    let total_amount: Money = cycles.iter().map(|c| c.base_amount).sum();
    let total_spent: Money = cycles.iter().map(|c| c.spent).sum();

    BudgetExecution {
        budget_id: budget.id,
        budget_name: budget.name.clone(),
        window: budget.span(),
        total_amount,
        total_spent,
        rate: execution_rate(total_spent, total_amount),
        status: ExecutionStatus::classify(total_spent, total_amount, warning_threshold),
        warning_threshold,
        items,
    }
}
