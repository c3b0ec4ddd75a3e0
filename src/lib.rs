//! Tally - budget execution and cyclic budget tracking
//!
//! This library measures spending recorded in a plain-text ledger against
//! budgets. A budget's line items select ledger postings by account pattern;
//! cyclic budgets are split into monthly or yearly cycles that can carry
//! their remaining balance forward, and any budget can be projected onto an
//! arbitrary reporting window.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Budgets, items, cycles, ledger records and execution results
//! - `ledger`: Ledger sources and the plain-text ledger parser
//! - `engine`: Pattern matching, spend aggregation, cycle generation and
//!   execution, window projection
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `audit`: Audit logging system
//! - `reports`, `display`, `export`, `cli`: Output and command handling
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_cli::config::{paths::TallyPaths, Settings};
//! use tally_cli::ledger::InMemoryLedger;
//! use tally_cli::services::BudgetService;
//! use tally_cli::storage::Storage;
//!
//! let paths = TallyPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! let ledger = InMemoryLedger::from_file("main.beancount")?;
//! let service = BudgetService::new(&storage, &ledger, &settings);
//! let executions = service.executions(chrono::Local::now().date_naive())?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{TallyError, TallyResult};
