//! Budget model
//!
//! A budget declares an amount for a span of dates and owns the line items
//! that decide which ledger postings count against it. Cyclic budgets are
//! further split into cycles (see [`super::cycle`]).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{BudgetId, BudgetItemId};
use super::item::{BudgetItem, ItemValidationError, NewBudgetItem};
use super::money::Money;
use super::period::DateRange;

/// How the budget's own span is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    #[default]
    Monthly,
    Yearly,
    /// Arbitrary span; requires an end date
    Custom,
}

/// How a budget's span is split into recurring cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleType {
    #[default]
    None,
    Monthly,
    Yearly,
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            "custom" => Ok(Self::Custom),
            other => Err(format!("Unknown period type: {}", other)),
        }
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for CycleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            other => Err(format!("Unknown cycle type: {}", other)),
        }
    }
}

/// Input for creating a budget
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub owner: String,
    pub name: String,
    pub amount: Money,
    pub period_type: PeriodType,
    pub cycle_type: CycleType,
    pub carry_over: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub items: Vec<NewBudgetItem>,
}

/// A declared budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    /// Owning user
    pub owner: String,

    pub name: String,

    /// Declared amount; authoritative over the sum of item amounts
    pub amount: Money,

    pub period_type: PeriodType,

    pub cycle_type: CycleType,

    /// Whether an elapsed cycle's remaining balance moves into the next cycle
    #[serde(default)]
    pub carry_over: bool,

    pub start_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub items: Vec<BudgetItem>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Budget {
    /// Create a validated budget together with its initial items
    pub fn new(input: NewBudget) -> Result<Self, BudgetValidationError> {
        let now = Utc::now();
        let id = BudgetId::new();

        let items = input
            .items
            .into_iter()
            .map(|item| BudgetItem::new(id, item))
            .collect::<Result<Vec<_>, _>>()
            .map_err(BudgetValidationError::Item)?;

        let budget = Self {
            id,
            owner: input.owner,
            name: input.name.trim().to_string(),
            amount: input.amount,
            period_type: input.period_type,
            cycle_type: input.cycle_type,
            carry_over: input.carry_over,
            start_date: input.start_date,
            end_date: input.end_date,
            active: true,
            items,
            created_at: now,
            updated_at: now,
        };

        budget.validate()?;
        Ok(budget)
    }

    /// Validate the budget's invariants
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }

        if self.amount.is_negative() {
            return Err(BudgetValidationError::NegativeAmount);
        }

        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(BudgetValidationError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }

        if self.end_date.is_none() {
            if self.period_type == PeriodType::Custom {
                return Err(BudgetValidationError::CustomPeriodNeedsEnd);
            }
            if self.cycle_type != CycleType::None {
                return Err(BudgetValidationError::CycleNeedsEnd);
            }
        }

        for item in &self.items {
            item.validate().map_err(BudgetValidationError::Item)?;
        }

        Ok(())
    }

    /// Apply a change only if the result is still valid
    ///
    /// On failure the budget is left untouched.
    pub fn try_update<F>(&mut self, change: F) -> Result<(), BudgetValidationError>
    where
        F: FnOnce(&mut Budget),
    {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.validate()?;
        candidate.updated_at = Utc::now();
        *self = candidate;
        Ok(())
    }

    pub fn is_cyclic(&self) -> bool {
        self.cycle_type != CycleType::None
    }

    /// The budget's declared span, if it has an end date
    pub fn span(&self) -> Option<DateRange> {
        self.end_date
            .and_then(|end| DateRange::new(self.start_date, end))
    }

    /// The span used for flat execution: `[start, end or today]`
    ///
    /// `None` when the budget has not started yet.
    pub fn execution_window(&self, today: NaiveDate) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date.unwrap_or(today))
    }

    /// Whether `other` differs in any field that shapes the cycle set
    pub fn cycle_config_differs(&self, other: &Budget) -> bool {
        self.cycle_type != other.cycle_type
            || self.start_date != other.start_date
            || self.end_date != other.end_date
            || self.amount != other.amount
    }

    /// Add an item to this budget
    pub fn add_item(&mut self, input: NewBudgetItem) -> Result<BudgetItemId, BudgetValidationError> {
        let item = BudgetItem::new(self.id, input).map_err(BudgetValidationError::Item)?;
        let id = item.id;
        self.items.push(item);
        self.updated_at = Utc::now();
        Ok(id)
    }

    /// Replace every item at once
    pub fn replace_items(&mut self, inputs: Vec<NewBudgetItem>) -> Result<(), BudgetValidationError> {
        let items = inputs
            .into_iter()
            .map(|input| BudgetItem::new(self.id, input))
            .collect::<Result<Vec<_>, _>>()
            .map_err(BudgetValidationError::Item)?;
        self.items = items;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove an item by id, returning it if it existed
    pub fn remove_item(&mut self, item_id: BudgetItemId) -> Option<BudgetItem> {
        let position = self.items.iter().position(|i| i.id == item_id)?;
        self.updated_at = Utc::now();
        Some(self.items.remove(position))
    }

    pub fn item(&self, item_id: BudgetItemId) -> Option<&BudgetItem> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.amount)
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyName,
    NegativeAmount,
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    CustomPeriodNeedsEnd,
    CycleNeedsEnd,
    Item(ItemValidationError),
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Budget name cannot be empty"),
            Self::NegativeAmount => write!(f, "Budget amount cannot be negative"),
            Self::EndBeforeStart { start, end } => {
                write!(f, "Budget end date {} is before start date {}", end, start)
            }
            Self::CustomPeriodNeedsEnd => write!(f, "A custom period requires an end date"),
            Self::CycleNeedsEnd => write!(f, "A cyclic budget requires an end date"),
            Self::Item(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
