//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod export;
pub mod report;

pub use budget::{handle_budget_command, BudgetCommands};
pub use export::{handle_export_command, ExportCommands};
pub use report::{handle_report_command, ReportCommands};

use chrono::NaiveDate;

use crate::error::{TallyError, TallyResult};
use crate::models::{Money, NewBudgetItem};

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(s: &str) -> TallyResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        TallyError::Validation(format!("Invalid date: {}. Use YYYY-MM-DD", s))
    })
}

/// Parse an amount argument such as `100` or `100.50`
pub fn parse_money(s: &str) -> TallyResult<Money> {
    Money::parse(s).map_err(|e| TallyError::Validation(e.to_string()))
}

/// Parse an item argument of the form `PATTERN=AMOUNT[@CURRENCY]`
///
/// The split happens at the last `=`, so patterns may contain `=`.
pub fn parse_item_spec(spec: &str, default_currency: &str) -> TallyResult<NewBudgetItem> {
    let (pattern, rest) = spec.rsplit_once('=').ok_or_else(|| {
        TallyError::Validation(format!(
            "Invalid item: {}. Use PATTERN=AMOUNT[@CURRENCY]",
            spec
        ))
    })?;

    let (amount, currency) = match rest.split_once('@') {
        Some((amount, currency)) => (amount, currency),
        None => (rest, default_currency),
    };

    Ok(NewBudgetItem::new(pattern, parse_money(amount)?, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("28/02/2025").is_err());
    }

    #[test]
    fn test_parse_item_spec() {
        let item = parse_item_spec("Expenses:Food:*=500.50", "CNY").unwrap();
        assert_eq!(item.pattern, "Expenses:Food:*");
        assert_eq!(item.amount, Money::from_cents(50_050));
        assert_eq!(item.currency, "CNY");

        let item = parse_item_spec("Expenses:Travel*=1200@USD", "CNY").unwrap();
        assert_eq!(item.currency, "USD");
        assert_eq!(item.amount, Money::from_units(1200));

        assert!(parse_item_spec("Expenses:Food", "CNY").is_err());
        assert!(parse_item_spec("Expenses:Food=abc", "CNY").is_err());
    }
}
