//! Budget repository for JSON storage
//!
//! Budgets are stored together with their items in `budgets.json`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::TallyError;
use crate::models::{Budget, BudgetId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct BudgetData {
    #[serde(default)]
    budgets: Vec<Budget>,
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    budgets: RwLock<HashMap<BudgetId, Budget>>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            budgets: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        budgets.clear();
        for budget in file_data.budgets {
            budgets.insert(budget.id, budget);
        }

        Ok(())
    }

    /// Save budgets to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = budgets.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &BudgetData { budgets: list })
    }

    pub fn get(&self, id: BudgetId) -> Result<Option<Budget>, TallyError> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(budgets.get(&id).cloned())
    }

    /// All budgets sorted by name
    pub fn get_all(&self) -> Result<Vec<Budget>, TallyError> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = budgets.values().cloned().collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(list)
    }

    pub fn get_active(&self) -> Result<Vec<Budget>, TallyError> {
        Ok(self.get_all()?.into_iter().filter(|b| b.active).collect())
    }

    /// All budgets with this name (case-insensitive), oldest first
    ///
    /// Names are only unique per owner, so several owners may share one.
    pub fn find_by_name(&self, name: &str) -> Result<Vec<Budget>, TallyError> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let name_lower = name.trim().to_lowercase();
        let mut found: Vec<Budget> = budgets
            .values()
            .filter(|b| b.name.to_lowercase() == name_lower)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    /// Find one owner's budget by name (case-insensitive)
    pub fn find_by_owner_and_name(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<Budget>, TallyError> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let name_lower = name.trim().to_lowercase();
        Ok(budgets
            .values()
            .find(|b| b.owner == owner && b.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Insert or update a budget
    pub fn upsert(&self, budget: Budget) -> Result<(), TallyError> {
        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        budgets.insert(budget.id, budget);
        Ok(())
    }

    /// Delete a budget, returning it if it existed
    pub fn delete(&self, id: BudgetId) -> Result<Option<Budget>, TallyError> {
        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(budgets.remove(&id))
    }

    pub fn count(&self) -> Result<usize, TallyError> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(budgets.len())
    }
}
