//! Storage layer for Tally
//!
//! JSON file storage with atomic writes. Budgets (with their items) and cycle
//! sets live in separate files under the data directory; every mutation is
//! recorded in the audit log.

pub mod budgets;
pub mod cycles;
pub mod file_io;

pub use budgets::BudgetRepository;
pub use cycles::{CycleRepository, CycleSet};
pub use file_io::{read_json, write_json_atomic};

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::TallyPaths;
use crate::error::TallyError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TallyPaths,
    pub budgets: BudgetRepository,
    pub cycles: CycleRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create storage rooted at `paths`, creating directories as needed
    pub fn new(paths: TallyPaths) -> Result<Self, TallyError> {
        paths.ensure_directories()?;

        Ok(Self {
            budgets: BudgetRepository::new(paths.budgets_file()),
            cycles: CycleRepository::new(paths.cycles_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Create and load storage in one step
    pub fn open(paths: TallyPaths) -> Result<Self, TallyError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }

    pub fn load_all(&self) -> Result<(), TallyError> {
        self.budgets.load()?;
        self.cycles.load()?;
        Ok(())
    }

    pub fn save_all(&self) -> Result<(), TallyError> {
        self.budgets.save()?;
        self.cycles.save()?;
        Ok(())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), TallyError> {
        self.audit.log(&AuditEntry::create(
            entity_type,
            entity_id,
            entity_name,
            entity,
        ))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), TallyError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), TallyError> {
        self.audit.log(&AuditEntry::delete(
            entity_type,
            entity_id,
            entity_name,
            entity,
        ))
    }

    /// Log a pre-built entry
    pub fn log_entry(&self, entry: &AuditEntry) -> Result<(), TallyError> {
        self.audit.log(entry)
    }
}
