//! Audit logging for Tally
//!
//! Every create, update and delete of a budget, a budget item or a budget's
//! cycle set is appended to a line-delimited JSON log with before/after
//! snapshots.
//!
//! ```rust,ignore
//! use tally_cli::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::create(
//!     EntityType::Budget,
//!     budget.id.to_string(),
//!     Some(budget.name.clone()),
//!     &budget,
//! ))?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
