//! Budget cycles
//!
//! A cycle is one bounded sub-period of a recurring budget with its own base,
//! carried-over, total and spent amounts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::execution::{execution_rate, ExecutionStatus};
use super::ids::{BudgetId, CycleId};
use super::money::Money;
use super::period::DateRange;

/// One sub-period of a cyclic budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCycle {
    pub id: CycleId,

    pub budget_id: BudgetId,

    /// 1-based position within the budget's cycle set
    pub period_number: u32,

    pub period_start: NaiveDate,

    pub period_end: NaiveDate,

    /// The budget's declared amount at generation time
    pub base_amount: Money,

    /// Balance carried in from the previous cycle; negative after overspend
    pub carried_over: Money,

    /// Always `base_amount + carried_over`
    pub total_amount: Money,

    pub spent: Money,
}

impl BudgetCycle {
    /// Create a fresh cycle with no carry-over and no spend
    pub fn new(
        budget_id: BudgetId,
        period_number: u32,
        period: DateRange,
        base_amount: Money,
    ) -> Result<Self, CycleValidationError> {
        let cycle = Self {
            id: CycleId::new(),
            budget_id,
            period_number,
            period_start: period.start,
            period_end: period.end,
            base_amount,
            carried_over: Money::zero(),
            total_amount: base_amount,
            spent: Money::zero(),
        };
        cycle.validate()?;
        Ok(cycle)
    }

    pub fn validate(&self) -> Result<(), CycleValidationError> {
        if self.period_number == 0 {
            return Err(CycleValidationError::ZeroPeriodNumber);
        }
        if self.period_end < self.period_start {
            return Err(CycleValidationError::EndBeforeStart);
        }
        if self.base_amount.is_negative() {
            return Err(CycleValidationError::NegativeBaseAmount);
        }
        if self.spent.is_negative() {
            return Err(CycleValidationError::NegativeSpent);
        }
        if self.total_amount != self.base_amount + self.carried_over {
            return Err(CycleValidationError::TotalMismatch);
        }
        Ok(())
    }

    pub fn period(&self) -> DateRange {
        DateRange {
            start: self.period_start,
            end: self.period_end,
        }
    }

    /// Set the carried-over balance and recompute the total
    pub fn set_carried_over(&mut self, carried_over: Money) {
        self.carried_over = carried_over;
        self.total_amount = self.base_amount + carried_over;
    }

    pub fn set_spent(&mut self, spent: Money) -> Result<(), CycleValidationError> {
        if spent.is_negative() {
            return Err(CycleValidationError::NegativeSpent);
        }
        self.spent = spent;
        Ok(())
    }

    pub fn remaining(&self) -> Money {
        self.total_amount - self.spent
    }

    pub fn usage_rate(&self) -> f64 {
        execution_rate(self.spent, self.total_amount)
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining().is_negative()
    }

    pub fn is_warning(&self, warning_threshold: u8) -> bool {
        self.status(warning_threshold) == ExecutionStatus::Warning
    }

    /// Status of this cycle; any overspend is reported as over
    pub fn status(&self, warning_threshold: u8) -> ExecutionStatus {
        if self.is_over_budget() {
            return ExecutionStatus::Over;
        }
        ExecutionStatus::classify(self.spent, self.total_amount, warning_threshold)
    }

    /// Whether the cycle ended strictly before `today`
    pub fn has_elapsed(&self, today: NaiveDate) -> bool {
        self.period_end < today
    }
}

impl fmt::Display for BudgetCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {}: {} / {}",
            self.period_number,
            self.period(),
            self.spent,
            self.total_amount
        )
    }
}

/// Validation errors for cycles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleValidationError {
    ZeroPeriodNumber,
    EndBeforeStart,
    NegativeBaseAmount,
    NegativeSpent,
    TotalMismatch,
}

impl fmt::Display for CycleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPeriodNumber => write!(f, "Cycle period numbers start at 1"),
            Self::EndBeforeStart => write!(f, "Cycle end date is before its start date"),
            Self::NegativeBaseAmount => write!(f, "Cycle base amount cannot be negative"),
            Self::NegativeSpent => write!(f, "Cycle spent amount cannot be negative"),
            Self::TotalMismatch => write!(f, "Cycle total must equal base plus carry-over"),
        }
    }
}

impl std::error::Error for CycleValidationError {}
