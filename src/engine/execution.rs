//! Flat execution of non-cyclic budgets

use chrono::NaiveDate;
use tracing::debug;

use crate::error::TallyResult;
use crate::models::{
    execution_rate, Budget, BudgetExecution, BudgetItem, DateRange, ExecutionStatus,
    ItemExecution, Money,
};

use super::aggregator::SpendAggregator;

/// Item executions over `window`, item spends recomputed from the ledger
///
/// With no window every item reports zero spend.
pub fn item_executions(
    items: &[BudgetItem],
    aggregator: &SpendAggregator<'_>,
    window: Option<DateRange>,
    warning_threshold: u8,
) -> TallyResult<Vec<ItemExecution>> {
    let spends = match window {
        Some(window) => aggregator.spent_per_item(items, window.start, window.end)?,
        None => vec![Money::zero(); items.len()],
    };

    Ok(items
        .iter()
        .zip(spends)
        .map(|(item, spent)| ItemExecution {
            item_id: item.id,
            pattern: item.pattern.clone(),
            currency: item.currency.clone(),
            amount: item.amount,
            spent,
            rate: execution_rate(spent, item.amount),
            status: ExecutionStatus::classify(spent, item.amount, warning_threshold),
        })
        .collect())
}

/// Execution of `budget` over `[start_date, end_date or today]`
///
/// The budget's declared amount is the total; item amounts are never summed
/// into it. Every item's `spent` is updated in place so the caller can
/// persist the refreshed values.
pub fn calculate_execution(
    budget: &mut Budget,
    aggregator: &SpendAggregator<'_>,
    today: NaiveDate,
    warning_threshold: u8,
) -> TallyResult<BudgetExecution> {
    let window = budget.execution_window(today);
    let items = item_executions(&budget.items, aggregator, window, warning_threshold)?;

    for (item, execution) in budget.items.iter_mut().zip(&items) {
        item.set_spent(execution.spent)?;
    }

    let total_spent: Money = items.iter().map(|i| i.spent).sum();
    let execution = BudgetExecution {
        budget_id: budget.id,
        budget_name: budget.name.clone(),
        window,
        total_amount: budget.amount,
        total_spent,
        rate: execution_rate(total_spent, budget.amount),
        status: ExecutionStatus::classify(total_spent, budget.amount, warning_threshold),
        warning_threshold,
        items,
    };

    debug!(
        budget = %budget.name,
        spent = %execution.total_spent,
        status = %execution.status,
        "calculated flat execution"
    );

    Ok(execution)
}
