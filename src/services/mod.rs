//! Service layer for Tally
//!
//! The service layer provides business logic on top of the storage layer and
//! the execution engine, handling validation, persistence and audit logging.

pub mod budget;

pub use budget::{BudgetService, BudgetUpdate};
