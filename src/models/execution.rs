//! Execution results
//!
//! Execution values are computed on demand from a budget and the ledger and
//! are never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, BudgetItemId};
use super::money::Money;
use super::period::DateRange;

/// Default percentage at which a budget is flagged as a warning
pub const DEFAULT_WARNING_THRESHOLD: u8 = 80;

/// Spend status of a budget, item or cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Normal,
    Warning,
    Over,
}

impl ExecutionStatus {
    /// Classify `spent` against `total`
    ///
    /// Equivalent to comparing the execution rate with 100 and with
    /// `warning_threshold`, both boundaries inclusive, but evaluated in exact
    /// integer arithmetic. A non-positive total has a rate of zero.
    pub fn classify(spent: Money, total: Money, warning_threshold: u8) -> Self {
        if !total.is_positive() {
            return if warning_threshold == 0 {
                Self::Warning
            } else {
                Self::Normal
            };
        }

        let spent_scaled = spent.cents() as i128 * 100;
        let total_cents = total.cents() as i128;

        if spent_scaled >= total_cents * 100 {
            Self::Over
        } else if spent_scaled >= total_cents * warning_threshold as i128 {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Over => "OVER",
        }
    }

    /// Single-character marker for terminal tables
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Normal => " ",
            Self::Warning => "!",
            Self::Over => "⚠",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Percentage of `total` that has been spent
///
/// Zero when `total` is zero or negative; never NaN or infinite.
pub fn execution_rate(spent: Money, total: Money) -> f64 {
    if !total.is_positive() {
        return 0.0;
    }
    spent.cents() as f64 * 100.0 / total.cents() as f64
}

/// Execution of a single budget item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemExecution {
    pub item_id: BudgetItemId,
    pub pattern: String,
    pub currency: String,
    pub amount: Money,
    pub spent: Money,
    pub rate: f64,
    pub status: ExecutionStatus,
}

/// Execution of a whole budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetExecution {
    pub budget_id: BudgetId,
    pub budget_name: String,

    /// The dates the spend was measured over
    pub window: Option<DateRange>,

    pub total_amount: Money,
    pub total_spent: Money,
    pub rate: f64,
    pub status: ExecutionStatus,
    pub warning_threshold: u8,

    #[serde(default)]
    pub items: Vec<ItemExecution>,
}

impl BudgetExecution {
    pub fn remaining(&self) -> Money {
        self.total_amount - self.total_spent
    }
}

/// One period's share of a reporting window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodContribution {
    /// The cycle (or the budget's own span) this share comes from
    pub period: DateRange,

    /// Part of `period` inside the window
    pub overlap: DateRange,

    pub period_total: Money,

    /// `period_total` prorated by overlap days over period days
    pub contributed: Money,

    /// Exact spend within `overlap`
    pub spent: Money,
}

/// A budget's amounts reprojected onto an arbitrary reporting window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowProjection {
    pub budget_id: BudgetId,
    pub budget_name: String,
    pub window: DateRange,
    pub budget_amount: Money,
    pub spent: Money,
    pub rate: f64,
    pub status: ExecutionStatus,

    #[serde(default)]
    pub contributions: Vec<PeriodContribution>,
}

impl WindowProjection {
    pub fn remaining(&self) -> Money {
        self.budget_amount - self.spent
    }
}
