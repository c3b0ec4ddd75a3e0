//! Core data models for Tally
//!
//! Budgets, their items and cycles, ledger records, and the ephemeral
//! execution values computed from them.

pub mod budget;
pub mod cycle;
pub mod execution;
pub mod ids;
pub mod item;
pub mod money;
pub mod period;
pub mod record;

pub use budget::{Budget, BudgetValidationError, CycleType, NewBudget, PeriodType};
pub use cycle::{BudgetCycle, CycleValidationError};
pub use execution::{
    execution_rate, BudgetExecution, ExecutionStatus, ItemExecution, PeriodContribution,
    WindowProjection, DEFAULT_WARNING_THRESHOLD,
};
pub use ids::{BudgetId, BudgetItemId, CycleId};
pub use item::{BudgetItem, ItemValidationError, NewBudgetItem};
pub use money::{Money, MoneyParseError};
pub use period::DateRange;
pub use record::{Posting, Record};
