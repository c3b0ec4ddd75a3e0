//! Budget display formatting
//!
//! Plain-text tables for budgets, their executions, cycles and window
//! projections.

use chrono::NaiveDate;

use crate::models::{Budget, BudgetCycle, BudgetExecution, WindowProjection};

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

fn span_label(budget: &Budget) -> String {
    match budget.end_date {
        Some(end) => format!("{}..{}", budget.start_date, end),
        None => format!("{}..", budget.start_date),
    }
}

/// Format a list of budgets as a table
pub fn format_budget_list(budgets: &[Budget]) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n\nUse 'tally budget create' to add one.".to_string();
    }

    let name_width = budgets
        .iter()
        .map(|b| b.name.chars().count())
        .max()
        .unwrap_or(6)
        .clamp(6, 30);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<width$}  {:>12}  {:<8}  {:<8}  {:<23}  {}\n",
        "ID",
        "Budget",
        "Amount",
        "Period",
        "Cycle",
        "Span",
        "Items",
        width = name_width
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<width$}  {:->12}  {:-<8}  {:-<8}  {:-<23}  {:-<5}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        width = name_width
    ));

    for budget in budgets {
        let inactive = if budget.active { "" } else { " (inactive)" };
        output.push_str(&format!(
            "{:<12}  {:<width$}  {:>12}  {:<8}  {:<8}  {:<23}  {}{}\n",
            budget.id.short(),
            truncate(&budget.name, name_width),
            budget.amount,
            budget.period_type,
            budget.cycle_type,
            span_label(budget),
            budget.items.len(),
            inactive,
            width = name_width
        ));
    }

    output
}

/// Format a single budget with its items
pub fn format_budget_details(budget: &Budget) -> String {
    let mut output = String::new();

    output.push_str(&format!("Budget: {}\n", budget.name));
    output.push_str(&format!("  ID:         {}\n", budget.id));
    output.push_str(&format!("  Owner:      {}\n", budget.owner));
    output.push_str(&format!("  Amount:     {}\n", budget.amount));
    output.push_str(&format!("  Period:     {}\n", budget.period_type));
    output.push_str(&format!(
        "  Cycles:     {}{}\n",
        budget.cycle_type,
        if budget.carry_over { " (carry over)" } else { "" }
    ));
    output.push_str(&format!("  Span:       {}\n", span_label(budget)));
    output.push_str(&format!(
        "  Status:     {}\n",
        if budget.active { "active" } else { "inactive" }
    ));

    output.push_str("\nItems:\n");
    if budget.items.is_empty() {
        output.push_str("  (no items)\n");
    }
    for item in &budget.items {
        output.push_str(&format!(
            "  {:<12}  {:<32} {:>12} {}\n",
            item.id.short(),
            truncate(&item.pattern, 32),
            item.amount,
            item.currency
        ));
    }

    output
}

/// Format one budget execution with its items
pub fn format_execution(execution: &BudgetExecution) -> String {
    let mut output = String::new();

    output.push_str(&format!("Execution: {}\n", execution.budget_name));
    match execution.window {
        Some(window) => output.push_str(&format!("Window: {}\n", window)),
        None => output.push_str("Window: (not started)\n"),
    }
    output.push_str(&"=".repeat(72));
    output.push('\n');

    output.push_str(&format!(
        "{:<32} {:>12} {:>12} {:>8}  {}\n",
        "Item", "Amount", "Spent", "Rate", "Status"
    ));
    output.push_str(&"-".repeat(72));
    output.push('\n');

    for item in &execution.items {
        output.push_str(&format!(
            "{:<32} {:>12} {:>12} {:>7.1}%  {} {}\n",
            truncate(&format!("{} ({})", item.pattern, item.currency), 32),
            item.amount,
            item.spent,
            item.rate,
            item.status.marker(),
            item.status
        ));
    }

    output.push_str(&"-".repeat(72));
    output.push('\n');
    output.push_str(&format!(
        "{:<32} {:>12} {:>12} {:>7.1}%  {} {}\n",
        "TOTAL",
        execution.total_amount,
        execution.total_spent,
        execution.rate,
        execution.status.marker(),
        execution.status
    ));
    output.push_str(&format!("Remaining: {}\n", execution.remaining()));

    output
}

/// Format executions of several budgets as one table
pub fn format_execution_list(executions: &[BudgetExecution]) -> String {
    if executions.is_empty() {
        return "No active budgets.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<30} {:>12} {:>12} {:>12} {:>8}  {}\n",
        "Budget", "Amount", "Spent", "Remaining", "Rate", "Status"
    ));
    output.push_str(&"-".repeat(86));
    output.push('\n');

    for execution in executions {
        output.push_str(&format!(
            "{:<30} {:>12} {:>12} {:>12} {:>7.1}%  {} {}\n",
            truncate(&execution.budget_name, 30),
            execution.total_amount,
            execution.total_spent,
            execution.remaining(),
            execution.rate,
            execution.status.marker(),
            execution.status
        ));
    }

    output
}

/// Format a budget's executed cycles
///
/// The cycle containing `today` is marked with `>`.
pub fn format_cycles(
    budget: &Budget,
    cycles: &[BudgetCycle],
    warning_threshold: u8,
    today: NaiveDate,
) -> String {
    if cycles.is_empty() {
        return format!("Budget '{}' has no cycles.", budget.name);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Cycles: {} ({}{})\n",
        budget.name,
        budget.cycle_type,
        if budget.carry_over { ", carry over" } else { "" }
    ));
    output.push_str(&"=".repeat(96));
    output.push('\n');
    output.push_str(&format!(
        "  {:>3}  {:<23} {:>11} {:>11} {:>11} {:>11} {:>11} {:>7}\n",
        "#", "Period", "Base", "Carried", "Total", "Spent", "Remaining", "Rate"
    ));
    output.push_str(&"-".repeat(96));
    output.push('\n');

    for cycle in cycles {
        let current = if cycle.period().contains(today) { ">" } else { " " };
        let status = cycle.status(warning_threshold);
        output.push_str(&format!(
            "{} {:>3}  {:<23} {:>11} {:>11} {:>11} {:>11} {:>11} {:>6.1}% {}\n",
            current,
            cycle.period_number,
            cycle.period().to_string(),
            cycle.base_amount,
            cycle.carried_over,
            cycle.total_amount,
            cycle.spent,
            cycle.remaining(),
            cycle.usage_rate(),
            status.marker()
        ));
    }

    output.push_str("\n> = current cycle   ! = warning   ⚠ = over budget\n");
    output
}

/// Format one window projection with its per-period breakdown
pub fn format_projection(projection: &WindowProjection) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Projection: {} over {}\n",
        projection.budget_name, projection.window
    ));
    output.push_str(&"=".repeat(80));
    output.push('\n');

    if projection.contributions.is_empty() {
        output.push_str("  (budget does not overlap this window)\n");
        return output;
    }

    output.push_str(&format!(
        "{:<23} {:<23} {:>10} {:>10} {:>10}\n",
        "Period", "Overlap", "Total", "Share", "Spent"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for c in &projection.contributions {
        output.push_str(&format!(
            "{:<23} {:<23} {:>10} {:>10} {:>10}\n",
            c.period.to_string(),
            c.overlap.to_string(),
            c.period_total,
            c.contributed,
            c.spent
        ));
    }

    output.push_str(&"-".repeat(80));
    output.push('\n');
    output.push_str(&format!(
        "Budget {}   Spent {}   Remaining {}   {:.1}% {}\n",
        projection.budget_amount,
        projection.spent,
        projection.remaining(),
        projection.rate,
        projection.status
    ));

    output
}
