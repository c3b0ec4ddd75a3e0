//! Budget execution engine
//!
//! Pure computations over a budget, its cycles and a ledger source:
//!
//! - `matcher`: account patterns with `*` wildcards
//! - `aggregator`: spend summed from matching postings
//! - `execution`: flat execution of non-cyclic budgets
//! - `cycles`: splitting a budget span into monthly/yearly cycles
//! - `cycle_execution`: carry-over and spend per cycle, in order
//! - `projection`: prorating budgets onto a reporting window
//!
//! Nothing here touches storage. Every function that depends on the current
//! date takes it as a parameter.

pub mod aggregator;
pub mod cycle_execution;
pub mod cycles;
pub mod execution;
pub mod matcher;
pub mod projection;

pub use aggregator::{posting_spend, SpendAggregator};
pub use cycle_execution::{calculate_all, carry_in, current_cycle, execute_cycle, summarize};
pub use cycles::generate_cycles;
pub use execution::{calculate_execution, item_executions};
pub use matcher::{matches, AccountPattern};
pub use projection::{project_window, prorated_amount};
