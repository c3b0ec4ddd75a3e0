//! Display formatting for terminal output
//!
//! Provides utilities for formatting budgets, executions, cycles and
//! projections as plain-text tables with status markers.

pub mod budget;

pub use budget::{
    format_budget_details, format_budget_list, format_cycles, format_execution,
    format_execution_list, format_projection,
};
