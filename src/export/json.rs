//! JSON Export functionality
//!
//! Exports every budget and every stored cycle set with schema versioning.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TallyError, TallyResult};
use crate::models::{Budget, BudgetCycle};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub budgets: Vec<Budget>,

    pub cycles: Vec<BudgetCycle>,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub budget_count: usize,
    pub item_count: usize,
    pub cycle_count: usize,

    /// Earliest budget start date
    pub earliest_start: Option<String>,

    /// Latest budget end date among bounded budgets
    pub latest_end: Option<String>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> TallyResult<Self> {
        let budgets = storage.budgets.get_all()?;
        let cycles = storage.cycles.get_all()?;

        let metadata = ExportMetadata {
            budget_count: budgets.len(),
            item_count: budgets.iter().map(|b| b.items.len()).sum(),
            cycle_count: cycles.len(),
            earliest_start: budgets.iter().map(|b| b.start_date).min().map(|d| d.to_string()),
            latest_end: budgets.iter().filter_map(|b| b.end_date).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            budgets,
            cycles,
            metadata,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        for budget in &self.budgets {
            budget
                .validate()
                .map_err(|e| format!("Budget {}: {}", budget.id, e))?;
        }

        let budget_ids: HashSet<_> = self.budgets.iter().map(|b| b.id).collect();
        for cycle in &self.cycles {
            if !budget_ids.contains(&cycle.budget_id) {
                return Err(format!(
                    "Cycle {} references unknown budget {}",
                    cycle.id, cycle.budget_id
                ));
            }
            cycle
                .validate()
                .map_err(|e| format!("Cycle {}: {}", cycle.id, e))?;
        }

        Ok(())
    }
}

/// Export the full database to JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W, pretty: bool) -> TallyResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| TallyError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a JSON export
pub fn import_from_json(json_str: &str) -> TallyResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| TallyError::Import(e.to_string()))?;

    export.validate().map_err(TallyError::Import)?;

    Ok(export)
}
