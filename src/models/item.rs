//! Budget line items
//!
//! An item ties a sub-allocation of a budget to an account pattern and a
//! currency. Its spent amount is derived from the ledger and recomputed on
//! every execution; it is never authoritative.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, BudgetItemId};
use super::money::Money;

/// Input for creating a budget item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBudgetItem {
    pub pattern: String,
    pub amount: Money,
    pub currency: String,
}

impl NewBudgetItem {
    pub fn new(pattern: impl Into<String>, amount: Money, currency: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            amount,
            currency: currency.into(),
        }
    }
}

/// A line item of a budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: BudgetItemId,

    pub budget_id: BudgetId,

    /// Account pattern; `*` matches any run of characters
    pub pattern: String,

    pub amount: Money,

    pub currency: String,

    /// Last computed spend for this item
    #[serde(default)]
    pub spent: Money,
}

impl BudgetItem {
    /// Create a validated item owned by `budget_id`
    pub fn new(budget_id: BudgetId, input: NewBudgetItem) -> Result<Self, ItemValidationError> {
        let item = Self {
            id: BudgetItemId::new(),
            budget_id,
            pattern: input.pattern.trim().to_string(),
            amount: input.amount,
            currency: input.currency.trim().to_uppercase(),
            spent: Money::zero(),
        };
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.pattern.is_empty() {
            return Err(ItemValidationError::EmptyPattern);
        }
        if !self.amount.is_positive() {
            return Err(ItemValidationError::NonPositiveAmount);
        }
        if self.currency.is_empty() {
            return Err(ItemValidationError::EmptyCurrency);
        }
        if self.spent.is_negative() {
            return Err(ItemValidationError::NegativeSpent);
        }
        Ok(())
    }

    /// Record a freshly computed spend
    pub fn set_spent(&mut self, spent: Money) -> Result<(), ItemValidationError> {
        if spent.is_negative() {
            return Err(ItemValidationError::NegativeSpent);
        }
        self.spent = spent;
        Ok(())
    }

    pub fn remaining(&self) -> Money {
        self.amount - self.spent
    }
}

impl fmt::Display for BudgetItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.pattern,
            self.amount.format_with_currency(&self.currency)
        )
    }
}

/// Validation errors for budget items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyPattern,
    NonPositiveAmount,
    EmptyCurrency,
    NegativeSpent,
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPattern => write!(f, "Item account pattern cannot be empty"),
            Self::NonPositiveAmount => write!(f, "Item amount must be greater than zero"),
            Self::EmptyCurrency => write!(f, "Item currency cannot be empty"),
            Self::NegativeSpent => write!(f, "Item spent amount cannot be negative"),
        }
    }
}

impl std::error::Error for ItemValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_normalizes_input() {
        let item = BudgetItem::new(
            BudgetId::new(),
            NewBudgetItem::new("  Expenses:Food* ", Money::from_units(10), "cny"),
        )
        .unwrap();
        assert_eq!(item.pattern, "Expenses:Food*");
        assert_eq!(item.currency, "CNY");
        assert!(item.spent.is_zero());
    }

    #[test]
    fn test_validation() {
        let budget_id = BudgetId::new();
        assert_eq!(
            BudgetItem::new(budget_id, NewBudgetItem::new("", Money::from_units(1), "CNY")),
            Err(ItemValidationError::EmptyPattern)
        );
        assert_eq!(
            BudgetItem::new(
                budget_id,
                NewBudgetItem::new("Expenses:*", Money::from_cents(-1), "CNY")
            ),
            Err(ItemValidationError::NonPositiveAmount)
        );
        assert_eq!(
            BudgetItem::new(budget_id, NewBudgetItem::new("Expenses:*", Money::from_units(1), " ")),
            Err(ItemValidationError::EmptyCurrency)
        );
    }

    #[test]
    fn test_set_spent() {
        let mut item = BudgetItem::new(
            BudgetId::new(),
            NewBudgetItem::new("Expenses:*", Money::from_units(100), "CNY"),
        )
        .unwrap();

        item.set_spent(Money::from_units(30)).unwrap();
        assert_eq!(item.remaining(), Money::from_units(70));
        assert_eq!(
            item.set_spent(Money::from_cents(-1)),
            Err(ItemValidationError::NegativeSpent)
        );
        assert_eq!(item.spent, Money::from_units(30));
    }
}
