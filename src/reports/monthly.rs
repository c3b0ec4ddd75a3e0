//! Monthly Overview Report
//!
//! Every active budget projected onto one calendar month: the prorated share
//! of its amount against the exact spend in that month.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::{TallyError, TallyResult};
use crate::models::{execution_rate, DateRange, ExecutionStatus, Money, WindowProjection};
use crate::services::BudgetService;

/// Monthly Overview Report
#[derive(Debug, Clone)]
pub struct MonthlyOverviewReport {
    pub window: DateRange,
    pub rows: Vec<WindowProjection>,
    pub total_budget: Money,
    pub total_spent: Money,
    pub rate: f64,
    pub status: ExecutionStatus,
}

impl MonthlyOverviewReport {
    /// Generate the report for `year`/`month`
    ///
    /// Budgets that do not reach into the month are left out.
    pub fn generate(
        service: &BudgetService<'_>,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> TallyResult<Self> {
        let window = DateRange::month(year, month)
            .ok_or_else(|| TallyError::Validation(format!("Invalid month: {}-{}", year, month)))?;

        let budgets = service.list_budgets(false)?;
        let rows: Vec<WindowProjection> = service
            .project_budgets(&budgets, window, today)?
            .into_iter()
            .filter(|p| !p.contributions.is_empty())
            .collect();

        let total_budget: Money = rows.iter().map(|r| r.budget_amount).sum();
        let total_spent: Money = rows.iter().map(|r| r.spent).sum();

        Ok(Self {
            window,
            rows,
            total_budget,
            total_spent,
            rate: execution_rate(total_spent, total_budget),
            status: ExecutionStatus::classify(
                total_spent,
                total_budget,
                service.warning_threshold(),
            ),
        })
    }

    pub fn over_budget_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.status == ExecutionStatus::Over)
            .count()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Monthly Overview - {}\n",
            self.window.start.format("%B %Y")
        ));
        output.push_str(&"=".repeat(78));
        output.push('\n');

        output.push_str(&format!(
            "{:<28} {:>12} {:>12} {:>12} {:>8}  \n",
            "Budget", "Budget", "Spent", "Remaining", "Rate"
        ));
        output.push_str(&"-".repeat(78));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("  (no active budgets in this month)\n");
        }

        for row in &self.rows {
            output.push_str(&format!(
                "{:<28} {:>12} {:>12} {:>12} {:>7.1}% {}\n",
                truncate(&row.budget_name, 28),
                row.budget_amount,
                row.spent,
                row.remaining(),
                row.rate,
                row.status.marker()
            ));
        }

        output.push_str(&"-".repeat(78));
        output.push('\n');
        output.push_str(&format!(
            "{:<28} {:>12} {:>12} {:>12} {:>7.1}% {}\n",
            "TOTAL",
            self.total_budget,
            self.total_spent,
            self.total_budget - self.total_spent,
            self.rate,
            self.status.marker()
        ));

        output.push_str("\n! = warning   ⚠ = over budget\n");
        output
    }

    /// Export the report rows as CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> TallyResult<()> {
        let mut csv = csv::Writer::from_writer(writer);

        csv.write_record(["Month", "Budget", "Budget Amount", "Spent", "Remaining", "Rate", "Status"])
            .map_err(|e| TallyError::Export(e.to_string()))?;

        let month = self.window.start.format("%Y-%m").to_string();
        for row in &self.rows {
            csv.write_record([
                month.clone(),
                row.budget_name.clone(),
                row.budget_amount.to_string(),
                row.spent.to_string(),
                row.remaining().to_string(),
                format!("{:.2}", row.rate),
                row.status.label().to_string(),
            ])
            .map_err(|e| TallyError::Export(e.to_string()))?;
        }

        csv.flush().map_err(|e| TallyError::Export(e.to_string()))?;
        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{paths::TallyPaths, Settings};
    use crate::ledger::InMemoryLedger;
    use crate::models::{CycleType, NewBudget, NewBudgetItem, PeriodType};
    use crate::storage::Storage;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_budget(name: &str, pattern: &str, cycle_type: CycleType, end: NaiveDate) -> NewBudget {
        NewBudget {
            owner: "alice".into(),
            name: name.into(),
            amount: Money::from_units(1000),
            period_type: PeriodType::Custom,
            cycle_type,
            carry_over: false,
            start_date: date(2025, 1, 1),
            end_date: Some(end),
            items: vec![NewBudgetItem::new(pattern, Money::from_units(1000), "CNY")],
        }
    }

    const LEDGER: &str = r#"
2025-02-03 * "Market"
  Expenses:Food:Groceries   300.00 CNY
  Assets:Bank

2025-02-04 * "Train"
  Expenses:Transport       1200.00 CNY
  Assets:Bank
"#;

    #[test]
    fn test_generate_february() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::open(TallyPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let ledger = InMemoryLedger::parse(LEDGER).unwrap();
        let settings = Settings::default();
        let service = BudgetService::new(&storage, &ledger, &settings);

        service
            .create_budget(new_budget(
                "Food",
                "Expenses:Food*",
                CycleType::Monthly,
                date(2025, 12, 31),
            ))
            .unwrap();
        service
            .create_budget(new_budget(
                "Transport",
                "Expenses:Transport",
                CycleType::Monthly,
                date(2025, 6, 30),
            ))
            .unwrap();
        service
            .create_budget(new_budget(
                "January only",
                "Expenses:*",
                CycleType::None,
                date(2025, 1, 31),
            ))
            .unwrap();

        let report = MonthlyOverviewReport::generate(&service, 2025, 2, date(2025, 2, 20)).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.total_budget, Money::from_units(2000));
        assert_eq!(report.total_spent, Money::from_units(1500));
        assert_eq!(report.rate, 75.0);
        assert_eq!(report.over_budget_count(), 1);

        let text = report.format_terminal();
        assert!(text.contains("February 2025"));
        assert!(text.contains("Transport"));
        assert!(!text.contains("January only"));

        let mut buffer = Vec::new();
        report.export_csv(&mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        assert!(csv.starts_with("Month,Budget,"));
        assert!(csv.contains("2025-02,Transport,1000.00,1200.00,-200.00,120.00,OVER"));
    }

    #[test]
    fn test_invalid_month() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::open(TallyPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let ledger = InMemoryLedger::default();
        let settings = Settings::default();
        let service = BudgetService::new(&storage, &ledger, &settings);

        assert!(MonthlyOverviewReport::generate(&service, 2025, 13, date(2025, 1, 1)).is_err());
    }
}
