//! Cycle repository for JSON storage
//!
//! Each budget's cycle set is held behind an `Arc` and only ever replaced as a
//! whole: a new set is built completely, then swapped in under one write lock.
//! Readers clone the `Arc` and never observe a partially written set.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::TallyError;
use crate::models::{BudgetCycle, BudgetId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CycleData {
    #[serde(default)]
    cycles: Vec<BudgetCycle>,
}

/// A budget's cycle set, ordered by period number
pub type CycleSet = Arc<Vec<BudgetCycle>>;

/// Repository for cycle persistence
pub struct CycleRepository {
    path: PathBuf,
    sets: RwLock<HashMap<BudgetId, CycleSet>>,
}

impl CycleRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            sets: RwLock::new(HashMap::new()),
        }
    }

    /// Load cycles from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let file_data: CycleData = read_json(&self.path)?;

        let mut grouped: HashMap<BudgetId, Vec<BudgetCycle>> = HashMap::new();
        for cycle in file_data.cycles {
            grouped.entry(cycle.budget_id).or_default().push(cycle);
        }

        let mut sets = self
            .sets
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *sets = grouped
            .into_iter()
            .map(|(budget_id, mut cycles)| {
                cycles.sort_by_key(|c| c.period_number);
                (budget_id, Arc::new(cycles))
            })
            .collect();

        Ok(())
    }

    /// Save cycles to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let snapshot: Vec<CycleSet> = {
            let sets = self
                .sets
                .read()
                .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
            sets.values().cloned().collect()
        };

        let mut cycles: Vec<BudgetCycle> = snapshot
            .iter()
            .flat_map(|set| set.iter().cloned())
            .collect();
        cycles.sort_by(|a, b| {
            a.budget_id
                .cmp(&b.budget_id)
                .then(a.period_number.cmp(&b.period_number))
        });

        write_json_atomic(&self.path, &CycleData { cycles })
    }

    /// Replace a budget's whole cycle set in one step
    ///
    /// Returns the previous set, if any. Cycles are ordered by period number
    /// before the swap.
    pub fn replace_cycles(
        &self,
        budget_id: BudgetId,
        mut cycles: Vec<BudgetCycle>,
    ) -> Result<Option<CycleSet>, TallyError> {
        if let Some(foreign) = cycles.iter().find(|c| c.budget_id != budget_id) {
            return Err(TallyError::Storage(format!(
                "Cycle {} belongs to budget {}, not {}",
                foreign.id, foreign.budget_id, budget_id
            )));
        }
        cycles.sort_by_key(|c| c.period_number);
        let replacement = Arc::new(cycles);

        let mut sets = self
            .sets
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(sets.insert(budget_id, replacement))
    }

    /// A budget's cycle set; empty when none has been generated
    pub fn cycles_for_budget(&self, budget_id: BudgetId) -> Result<CycleSet, TallyError> {
        let sets = self
            .sets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(sets.get(&budget_id).cloned().unwrap_or_default())
    }

    /// Cycle sets for several budgets under a single lock acquisition
    ///
    /// Budgets without cycles are left out of the map.
    pub fn cycles_for_budgets(
        &self,
        budget_ids: &[BudgetId],
    ) -> Result<HashMap<BudgetId, CycleSet>, TallyError> {
        let sets = self
            .sets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(budget_ids
            .iter()
            .filter_map(|id| sets.get(id).map(|set| (*id, Arc::clone(set))))
            .collect())
    }

    /// Whether a budget has a stored cycle set (possibly empty)
    pub fn has_cycles(&self, budget_id: BudgetId) -> Result<bool, TallyError> {
        let sets = self
            .sets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(sets.get(&budget_id).is_some_and(|set| !set.is_empty()))
    }

    /// Remove a budget's cycle set, returning how many cycles it held
    pub fn delete_for_budget(&self, budget_id: BudgetId) -> Result<usize, TallyError> {
        let mut sets = self
            .sets
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(sets.remove(&budget_id).map_or(0, |set| set.len()))
    }

    /// Every stored cycle, grouped by budget and ordered by period number
    pub fn get_all(&self) -> Result<Vec<BudgetCycle>, TallyError> {
        let sets = self
            .sets
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut cycles: Vec<BudgetCycle> =
            sets.values().flat_map(|set| set.iter().cloned()).collect();
        cycles.sort_by(|a, b| {
            a.budget_id
                .cmp(&b.budget_id)
                .then(a.period_number.cmp(&b.period_number))
        });
        Ok(cycles)
    }
}
