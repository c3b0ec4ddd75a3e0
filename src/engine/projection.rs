//! Reporting window projection
//!
//! Reprojects a budget onto an arbitrary window. Each period (a cycle, or the
//! budget's own span when it has no cycles) contributes its total prorated by
//! the share of its days that fall inside the window. Spend is never
//! prorated: it is recomputed exactly over each overlap.

use tracing::debug;

use crate::error::TallyResult;
use crate::models::{
    execution_rate, Budget, BudgetCycle, DateRange, ExecutionStatus, Money, PeriodContribution,
    WindowProjection,
};

use super::aggregator::SpendAggregator;

/// The periods a budget is made of, with each period's total
///
/// Cyclic budgets use their (executed) cycles. Other budgets form a single
/// period; an open-ended one ends with the window.
fn periods(budget: &Budget, cycles: &[BudgetCycle], window: DateRange) -> Vec<(DateRange, Money)> {
    if budget.is_cyclic() {
        return cycles
            .iter()
            .map(|c| (c.period(), c.total_amount))
            .collect();
    }

    let end = budget.end_date.unwrap_or(window.end);
    DateRange::new(budget.start_date, end)
        .map(|span| vec![(span, budget.amount)])
        .unwrap_or_default()
}

/// Share of `period_total` that falls inside `overlap`
pub fn prorated_amount(period_total: Money, period: DateRange, overlap: DateRange) -> Money {
    period_total.prorate(overlap.days(), period.days())
}

/// Project `budget` onto `window`
pub fn project_window(
    budget: &Budget,
    cycles: &[BudgetCycle],
    window: DateRange,
    aggregator: &SpendAggregator<'_>,
    warning_threshold: u8,
) -> TallyResult<WindowProjection> {
    let mut contributions = Vec::new();

    for (period, period_total) in periods(budget, cycles, window) {
        let Some(overlap) = period.overlap(&window) else {
            continue;
        };

        let spent = aggregator.spent_for_items(&budget.items, overlap.start, overlap.end)?;
        contributions.push(PeriodContribution {
            period,
            overlap,
            period_total,
            contributed: prorated_amount(period_total, period, overlap),
            spent,
        });
    }

    let budget_amount: Money = contributions.iter().map(|c| c.contributed).sum();
    let spent: Money = contributions.iter().map(|c| c.spent).sum();

    debug!(
        budget = %budget.name,
        %window,
        periods = contributions.len(),
        amount = %budget_amount,
        "projected budget onto window"
    );

    Ok(WindowProjection {
        budget_id: budget.id,
        budget_name: budget.name.clone(),
        window,
        budget_amount,
        spent,
        rate: execution_rate(spent, budget_amount),
        status: ExecutionStatus::classify(spent, budget_amount, warning_threshold),
        contributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cycles::generate_cycles;
    use crate::ledger::InMemoryLedger;
    use crate::models::{CycleType, NewBudget, NewBudgetItem, PeriodType};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn units(n: i64) -> Money {
        Money::from_units(n)
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn budget(cycle_type: CycleType, start: NaiveDate, end: Option<NaiveDate>) -> Budget {
        Budget::new(NewBudget {
            owner: "alice".into(),
            name: "Food".into(),
            amount: units(1000),
            period_type: if end.is_some() {
                PeriodType::Custom
            } else {
                PeriodType::Monthly
            },
            cycle_type,
            carry_over: false,
            start_date: start,
            end_date: end,
            items: vec![NewBudgetItem::new("Expenses:Food*", units(1000), "CNY")],
        })
        .unwrap()
    }

    const LEDGER: &str = r#"
2025-01-31 * "Market"
  Expenses:Food:Groceries   100.00 CNY
  Assets:Bank

2025-02-01 * "Market"
  Expenses:Food:Groceries   150.00 CNY
  Assets:Bank

2025-02-28 * "Market"
  Expenses:Food:Groceries    50.00 CNY
  Assets:Bank

2025-03-01 * "Market"
  Expenses:Food:Groceries    70.00 CNY
  Assets:Bank
"#;

    #[test]
    fn test_flat_budget_prorated_by_days() {
        let ledger = InMemoryLedger::parse(LEDGER).unwrap();
        let aggregator = SpendAggregator::new(&ledger);
        let food = budget(CycleType::None, date(2025, 1, 1), Some(date(2025, 3, 15)));
        let february = DateRange::month(2025, 2).unwrap();

        let projection = project_window(&food, &[], february, &aggregator, 80).unwrap();

        // 1000 * 28 / 74
        assert_eq!(projection.budget_amount, Money::from_cents(37_838));
        assert!(projection.budget_amount.is_positive());
        assert!(projection.budget_amount < units(1000));
        assert_eq!(projection.spent, units(200));
        assert_eq!(projection.contributions.len(), 1);
        assert_eq!(projection.contributions[0].overlap, february);
    }

    #[test]
    fn test_cyclic_window_spanning_cycles() {
        let ledger = InMemoryLedger::parse(LEDGER).unwrap();
        let aggregator = SpendAggregator::new(&ledger);
        let food = budget(CycleType::Monthly, date(2025, 1, 1), Some(date(2025, 3, 31)));
        let cycles = generate_cycles(&food);

        // Jan 31 .. Mar 1: one day of January, all of February, one day of March
        let window = range(date(2025, 1, 31), date(2025, 3, 1));
        let projection = project_window(&food, &cycles, window, &aggregator, 80).unwrap();

        let contributed: Vec<_> = projection
            .contributions
            .iter()
            .map(|c| c.contributed)
            .collect();
        assert_eq!(
            contributed,
            vec![Money::from_cents(3_226), units(1000), Money::from_cents(3_226)]
        );
        assert_eq!(projection.budget_amount, Money::from_cents(106_452));
        assert_eq!(projection.spent, units(370));
    }

    #[test]
    fn test_full_cycle_contributes_whole_total() {
        let ledger = InMemoryLedger::parse(LEDGER).unwrap();
        let aggregator = SpendAggregator::new(&ledger);
        let food = budget(CycleType::Monthly, date(2025, 1, 1), Some(date(2025, 3, 31)));
        let mut cycles = generate_cycles(&food);
        cycles[1].set_carried_over(units(-200));

        let february = DateRange::month(2025, 2).unwrap();
        let projection = project_window(&food, &cycles, february, &aggregator, 80).unwrap();

        assert_eq!(projection.budget_amount, units(800));
        assert_eq!(projection.spent, units(200));
        assert_eq!(projection.rate, 25.0);
    }

    #[test]
    fn test_window_outside_budget() {
        let ledger = InMemoryLedger::parse(LEDGER).unwrap();
        let aggregator = SpendAggregator::new(&ledger);
        let food = budget(CycleType::None, date(2025, 1, 1), Some(date(2025, 1, 31)));

        let window = DateRange::month(2025, 3).unwrap();
        let projection = project_window(&food, &[], window, &aggregator, 80).unwrap();

        assert!(projection.contributions.is_empty());
        assert_eq!(projection.budget_amount, Money::zero());
        assert_eq!(projection.rate, 0.0);
    }

    #[test]
    fn test_open_ended_budget_ends_with_window() {
        let ledger = InMemoryLedger::parse(LEDGER).unwrap();
        let aggregator = SpendAggregator::new(&ledger);
        let food = budget(CycleType::None, date(2025, 2, 15), None);

        let window = DateRange::month(2025, 2).unwrap();
        let projection = project_window(&food, &[], window, &aggregator, 80).unwrap();

        assert_eq!(
            projection.contributions[0].period,
            range(date(2025, 2, 15), date(2025, 2, 28))
        );
        assert_eq!(projection.budget_amount, units(1000));
        assert_eq!(projection.spent, units(50));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let ledger = InMemoryLedger::parse(LEDGER).unwrap();
        let aggregator = SpendAggregator::new(&ledger);
        let food = budget(CycleType::Monthly, date(2025, 1, 1), Some(date(2025, 3, 31)));
        let cycles = generate_cycles(&food);
        let window = range(date(2025, 1, 20), date(2025, 2, 10));

        let first = project_window(&food, &cycles, window, &aggregator, 80).unwrap();
        let second = project_window(&food, &cycles, window, &aggregator, 80).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_prorated_amount() {
        let period = range(date(2025, 1, 1), date(2025, 1, 3));
        let one_day = range(date(2025, 1, 2), date(2025, 1, 2));
        // 100.00 / 3 = 33.333... rounds down, 200.00 / 3 = 66.666... rounds up
        assert_eq!(prorated_amount(units(100), period, one_day), Money::from_cents(3_333));
        assert_eq!(prorated_amount(units(200), period, one_day), Money::from_cents(6_667));
        assert_eq!(prorated_amount(units(-100), period, one_day), Money::from_cents(-3_333));
    }
}
