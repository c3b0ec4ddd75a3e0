//! Budget service
//!
//! Business logic for budgets, their items and cycle sets: validation,
//! persistence, audit logging, and running the execution engine against the
//! ledger.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::audit::{AuditEntry, EntityType};
use crate::config::Settings;
use crate::engine::{
    calculate_all, calculate_execution, current_cycle, generate_cycles, item_executions,
    project_window, summarize, SpendAggregator,
};
use crate::error::{TallyError, TallyResult};
use crate::ledger::LedgerSource;
use crate::models::{
    Budget, BudgetCycle, BudgetExecution, BudgetId, BudgetItem, BudgetItemId, CycleType,
    DateRange, ItemExecution, Money, NewBudget, NewBudgetItem, PeriodType, WindowProjection,
};
use crate::storage::{CycleSet, Storage};

/// Changes to apply to a budget; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub period_type: Option<PeriodType>,
    pub cycle_type: Option<CycleType>,
    pub carry_over: Option<bool>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date
    pub end_date: Option<Option<NaiveDate>>,
    pub active: Option<bool>,
    /// Replaces every item when present
    pub items: Option<Vec<NewBudgetItem>>,
}

impl BudgetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.period_type.is_none()
            && self.cycle_type.is_none()
            && self.carry_over.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.active.is_none()
            && self.items.is_none()
    }

    fn apply(self, budget: &mut Budget) {
        if let Some(name) = self.name {
            budget.name = name.trim().to_string();
        }
        if let Some(amount) = self.amount {
            budget.amount = amount;
        }
        if let Some(period_type) = self.period_type {
            budget.period_type = period_type;
        }
        if let Some(cycle_type) = self.cycle_type {
            budget.cycle_type = cycle_type;
        }
        if let Some(carry_over) = self.carry_over {
            budget.carry_over = carry_over;
        }
        if let Some(start_date) = self.start_date {
            budget.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            budget.end_date = end_date;
        }
        if let Some(active) = self.active {
            budget.active = active;
        }
    }
}

/// Service for budget management and execution
pub struct BudgetService<'a> {
    storage: &'a Storage,
    ledger: &'a dyn LedgerSource,
    warning_threshold: u8,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage, ledger: &'a dyn LedgerSource, settings: &Settings) -> Self {
        Self {
            storage,
            ledger,
            warning_threshold: settings.warning_threshold,
        }
    }

    pub fn warning_threshold(&self) -> u8 {
        self.warning_threshold
    }

    fn aggregator(&self) -> SpendAggregator<'a> {
        SpendAggregator::new(self.ledger)
    }

    // === Budget CRUD ===

    /// Create a budget with its items; cyclic budgets get their cycles
    /// generated right away
    pub fn create_budget(&self, input: NewBudget) -> TallyResult<Budget> {
        self.ensure_unique_name(&input.owner, &input.name, None)?;

        let budget = Budget::new(input)?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_create(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.name.clone()),
            &budget,
        )?;

        if budget.is_cyclic() {
            self.store_fresh_cycles(&budget)?;
        }

        info!(budget = %budget.name, id = %budget.id.short(), "created budget");
        Ok(budget)
    }

    /// Get a budget by ID
    pub fn get_budget(&self, id: BudgetId) -> TallyResult<Option<Budget>> {
        self.storage.budgets.get(id)
    }

    fn require_budget(&self, id: BudgetId) -> TallyResult<Budget> {
        self.storage
            .budgets
            .get(id)?
            .ok_or_else(|| TallyError::budget_not_found(id.to_string()))
    }

    /// Find a budget by name, full ID or short ID
    pub fn find_budget(&self, identifier: &str) -> TallyResult<Option<Budget>> {
        let mut named = self.storage.budgets.find_by_name(identifier)?;
        match named.len() {
            0 => {}
            1 => return Ok(named.pop()),
            n => {
                return Err(TallyError::Validation(format!(
                    "'{}' names {} budgets of different owners; use an ID",
                    identifier.trim(),
                    n
                )))
            }
        }

        if let Ok(id) = identifier.trim().parse::<BudgetId>() {
            return self.storage.budgets.get(id);
        }

        let mut candidates: Vec<Budget> = self
            .storage
            .budgets
            .get_all()?
            .into_iter()
            .filter(|b| b.id.matches_ref(identifier))
            .collect();

        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.pop()),
            n => Err(TallyError::Validation(format!(
                "'{}' matches {} budgets; use a longer ID",
                identifier, n
            ))),
        }
    }

    /// Find a budget or fail with a "not found" error
    pub fn resolve_budget(&self, identifier: &str) -> TallyResult<Budget> {
        self.find_budget(identifier)?
            .ok_or_else(|| TallyError::budget_not_found(identifier))
    }

    /// All budgets sorted by name
    pub fn list_budgets(&self, include_inactive: bool) -> TallyResult<Vec<Budget>> {
        if include_inactive {
            self.storage.budgets.get_all()
        } else {
            self.storage.budgets.get_active()
        }
    }

    /// Apply `update`; the stored budget is unchanged if the result is
    /// invalid
    ///
    /// The cycle set is regenerated when the cycle type, dates or amount
    /// changed, and dropped when the budget stops being cyclic.
    pub fn update_budget(&self, id: BudgetId, update: BudgetUpdate) -> TallyResult<Budget> {
        let before = self.require_budget(id)?;

        if let Some(name) = &update.name {
            self.ensure_unique_name(&before.owner, name, Some(id))?;
        }

        let mut budget = before.clone();
        let items = update.items.clone();
        budget.try_update(|b| update.apply(b))?;
        if let Some(items) = items {
            budget.replace_items(items)?;
        }

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_update(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.name.clone()),
            &before,
            &budget,
        )?;

        if !budget.is_cyclic() {
            self.drop_cycles(&budget)?;
        } else if before.cycle_config_differs(&budget) || !before.is_cyclic() {
            self.store_fresh_cycles(&budget)?;
        }

        info!(budget = %budget.name, id = %budget.id.short(), "updated budget");
        Ok(budget)
    }

    /// Delete a budget together with its items and cycles
    pub fn delete_budget(&self, id: BudgetId) -> TallyResult<Budget> {
        let budget = self
            .storage
            .budgets
            .delete(id)?
            .ok_or_else(|| TallyError::budget_not_found(id.to_string()))?;
        self.storage.budgets.save()?;

        self.storage.log_delete(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.name.clone()),
            &budget,
        )?;

        self.drop_cycles(&budget)?;

        info!(budget = %budget.name, id = %budget.id.short(), "deleted budget");
        Ok(budget)
    }

    // === Items ===

    pub fn add_item(&self, budget_id: BudgetId, input: NewBudgetItem) -> TallyResult<BudgetItem> {
        let mut budget = self.require_budget(budget_id)?;

        let item_id = budget.add_item(input)?;
        let item = budget
            .item(item_id)
            .cloned()
            .ok_or_else(|| TallyError::item_not_found(item_id.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_create(
            EntityType::BudgetItem,
            item.id.to_string(),
            Some(format!("{} / {}", budget.name, item.pattern)),
            &item,
        )?;

        Ok(item)
    }

    pub fn remove_item(&self, budget_id: BudgetId, item_id: BudgetItemId) -> TallyResult<BudgetItem> {
        let mut budget = self.require_budget(budget_id)?;

        let item = budget
            .remove_item(item_id)
            .ok_or_else(|| TallyError::item_not_found(item_id.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_delete(
            EntityType::BudgetItem,
            item.id.to_string(),
            Some(format!("{} / {}", budget.name, item.pattern)),
            &item,
        )?;

        Ok(item)
    }

    /// Find an item of `budget` by full or short ID, or by exact pattern
    pub fn find_item<'b>(&self, budget: &'b Budget, reference: &str) -> TallyResult<&'b BudgetItem> {
        let matches: Vec<&BudgetItem> = budget
            .items
            .iter()
            .filter(|i| i.id.matches_ref(reference) || i.pattern == reference.trim())
            .collect();

        match matches.as_slice() {
            [item] => Ok(*item),
            [] => Err(TallyError::item_not_found(reference)),
            _ => Err(TallyError::Validation(format!(
                "'{}' matches {} items of {}",
                reference,
                matches.len(),
                budget.name
            ))),
        }
    }

    // === Cycles ===

    /// A budget's cycle set, generated on first access
    ///
    /// Non-cyclic budgets have an empty set.
    pub fn cycles(&self, id: BudgetId) -> TallyResult<CycleSet> {
        let budget = self.require_budget(id)?;
        self.cycles_of(&budget)
    }

    fn cycles_of(&self, budget: &Budget) -> TallyResult<CycleSet> {
        if !budget.is_cyclic() {
            return Ok(CycleSet::default());
        }
        if !self.storage.cycles.has_cycles(budget.id)? {
            debug!(budget = %budget.name, "no cycles stored, generating");
            self.store_fresh_cycles(budget)?;
        }
        self.storage.cycles.cycles_for_budget(budget.id)
    }

    /// Throw away the stored cycle set and generate a fresh one
    pub fn regenerate_cycles(&self, id: BudgetId) -> TallyResult<CycleSet> {
        let budget = self.require_budget(id)?;
        if !budget.is_cyclic() {
            return Err(TallyError::Validation(format!(
                "Budget '{}' does not have cycles",
                budget.name
            )));
        }
        self.store_fresh_cycles(&budget)?;
        self.storage.cycles.cycles_for_budget(id)
    }

    /// Execute a budget's cycles as of `today` and persist the result
    pub fn executed_cycles(&self, id: BudgetId, today: NaiveDate) -> TallyResult<Vec<BudgetCycle>> {
        let budget = self.require_budget(id)?;
        self.execute_and_store_cycles(&budget, today)
    }

    fn execute_and_store_cycles(
        &self,
        budget: &Budget,
        today: NaiveDate,
    ) -> TallyResult<Vec<BudgetCycle>> {
        let cycles = self.cycles_of(budget)?;
        if cycles.is_empty() {
            return Ok(Vec::new());
        }

        let executed = calculate_all(budget, cycles.to_vec(), &self.aggregator(), today)?;
        if executed.as_slice() != cycles.as_slice() {
            self.storage.cycles.replace_cycles(budget.id, executed.clone())?;
            self.storage.cycles.save()?;
        }
        Ok(executed)
    }

    fn store_fresh_cycles(&self, budget: &Budget) -> TallyResult<()> {
        let cycles = generate_cycles(budget);
        let count = cycles.len();

        let previous = self.storage.cycles.replace_cycles(budget.id, cycles)?;
        self.storage.cycles.save()?;

        let previous_count = previous.map_or(0, |set| set.len());
        let entry = if previous_count == 0 {
            AuditEntry::create(
                EntityType::BudgetCycles,
                budget.id.to_string(),
                Some(budget.name.clone()),
                &count,
            )
        } else {
            AuditEntry::update(
                EntityType::BudgetCycles,
                budget.id.to_string(),
                Some(budget.name.clone()),
                &previous_count,
                &count,
            )
        };
        self.storage.log_entry(
            &entry.with_summary(format!("{} -> {} {} cycles", previous_count, count, budget.cycle_type)),
        )?;

        info!(budget = %budget.name, cycles = count, "generated cycles");
        Ok(())
    }

    fn drop_cycles(&self, budget: &Budget) -> TallyResult<()> {
        let removed = self.storage.cycles.delete_for_budget(budget.id)?;
        if removed == 0 {
            return Ok(());
        }
        self.storage.cycles.save()?;
        self.storage.log_entry(
            &AuditEntry::delete(
                EntityType::BudgetCycles,
                budget.id.to_string(),
                Some(budget.name.clone()),
                &removed,
            )
            .with_summary(format!("{} cycles removed", removed)),
        )?;
        Ok(())
    }

    // === Execution ===

    /// Execution of a budget as of `today`
    ///
    /// Non-cyclic budgets are measured over `[start, end or today]`. Cyclic
    /// budgets aggregate their executed cycles; item figures then refer to the
    /// current cycle. Refreshed item spends are persisted.
    pub fn execution(&self, id: BudgetId, today: NaiveDate) -> TallyResult<BudgetExecution> {
        let budget = self.require_budget(id)?;
        self.execution_of(budget, today)
    }

    /// Executions of every active budget
    pub fn executions(&self, today: NaiveDate) -> TallyResult<Vec<BudgetExecution>> {
        self.list_budgets(false)?
            .into_iter()
            .map(|budget| self.execution_of(budget, today))
            .collect()
    }

    fn execution_of(&self, mut budget: Budget, today: NaiveDate) -> TallyResult<BudgetExecution> {
        let before = budget.items.clone();

        let execution = if budget.is_cyclic() {
            let cycles = self.execute_and_store_cycles(&budget, today)?;
            let window = current_cycle(&cycles, today).map(BudgetCycle::period);
            let items = item_executions(
                &budget.items,
                &self.aggregator(),
                window,
                self.warning_threshold,
            )?;
            store_item_spends(&mut budget, &items)?;
            summarize(&budget, &cycles, items, self.warning_threshold)
        } else {
            calculate_execution(&mut budget, &self.aggregator(), today, self.warning_threshold)?
        };

        if budget.items != before {
            self.storage.budgets.upsert(budget)?;
            self.storage.budgets.save()?;
        }

        Ok(execution)
    }

    /// Project a budget onto `window`
    pub fn project_window(
        &self,
        id: BudgetId,
        window: DateRange,
        today: NaiveDate,
    ) -> TallyResult<WindowProjection> {
        let budget = self.require_budget(id)?;
        let cycles = self.execute_and_store_cycles(&budget, today)?;
        project_window(
            &budget,
            &cycles,
            window,
            &self.aggregator(),
            self.warning_threshold,
        )
    }

    /// Project several budgets onto one window, loading cycle sets in one
    /// batch
    ///
    /// Cycles are executed in memory only; nothing is written.
    pub fn project_budgets(
        &self,
        budgets: &[Budget],
        window: DateRange,
        today: NaiveDate,
    ) -> TallyResult<Vec<WindowProjection>> {
        let ids: Vec<BudgetId> = budgets.iter().filter(|b| b.is_cyclic()).map(|b| b.id).collect();
        let mut stored = self.storage.cycles.cycles_for_budgets(&ids)?;
        let aggregator = self.aggregator();

        budgets
            .iter()
            .map(|budget| {
                let cycles = if !budget.is_cyclic() {
                    Vec::new()
                } else {
                    let set = match stored.remove(&budget.id) {
                        Some(set) if !set.is_empty() => set,
                        _ => self.cycles_of(budget)?,
                    };
                    calculate_all(budget, set.to_vec(), &aggregator, today)?
                };
                project_window(budget, &cycles, window, &aggregator, self.warning_threshold)
            })
            .collect()
    }

    fn ensure_unique_name(
        &self,
        owner: &str,
        name: &str,
        except: Option<BudgetId>,
    ) -> TallyResult<()> {
        match self.storage.budgets.find_by_owner_and_name(owner, name)? {
            Some(existing) if Some(existing.id) != except => {
                Err(TallyError::duplicate_budget(name.trim()))
            }
            _ => Ok(()),
        }
    }
}

fn store_item_spends(budget: &mut Budget, items: &[ItemExecution]) -> TallyResult<()> {
    for (item, execution) in budget.items.iter_mut().zip(items) {
        item.set_spent(execution.spent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::TallyPaths;
    use crate::ledger::InMemoryLedger;
    use crate::models::ExecutionStatus;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn units(n: i64) -> Money {
        Money::from_units(n)
    }

    const LEDGER: &str = r#"
2025-01-10 * "Market"
  Expenses:Food:Groceries   200.00 CNY
  Assets:Bank

2025-01-12 * "Bus"
  Expenses:Transport         50.00 CNY
  Assets:Bank

2025-02-10 * "Market"
  Expenses:Food:Groceries   300.00 CNY
  Assets:Bank

2025-03-10 * "Market"
  Expenses:Food:Groceries   400.00 CNY
  Assets:Bank
"#;

    fn setup() -> (TempDir, Storage, InMemoryLedger, Settings) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        let ledger = InMemoryLedger::parse(LEDGER).unwrap();
        (temp_dir, storage, ledger, Settings::default())
    }

    fn quarterly(name: &str, cycle_type: CycleType, carry_over: bool) -> NewBudget {
        NewBudget {
            owner: "alice".into(),
            name: name.into(),
            amount: units(1000),
            period_type: PeriodType::Custom,
            cycle_type,
            carry_over,
            start_date: date(2025, 1, 1),
            end_date: Some(date(2025, 3, 31)),
            items: vec![NewBudgetItem::new("Expenses:Food*", units(1000), "CNY")],
        }
    }

    #[test]
    fn test_create_cyclic_budget_generates_cycles() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);

        let budget = service
            .create_budget(quarterly("Food", CycleType::Monthly, false))
            .unwrap();

        assert_eq!(storage.cycles.cycles_for_budget(budget.id).unwrap().len(), 3);
        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_type, EntityType::Budget);
        assert_eq!(entries[1].entity_type, EntityType::BudgetCycles);
    }

    #[test]
    fn test_invalid_budget_not_persisted() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);

        let mut input = quarterly("Food", CycleType::None, false);
        input.end_date = Some(date(2024, 12, 31));

        let err = service.create_budget(input).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(storage.budgets.count().unwrap(), 0);
        assert!(storage.audit().read_all().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected_per_owner() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);

        service
            .create_budget(quarterly("Food", CycleType::None, false))
            .unwrap();
        let err = service
            .create_budget(quarterly("food", CycleType::None, false))
            .unwrap_err();
        assert!(matches!(err, TallyError::Duplicate { .. }));
    }

    #[test]
    fn test_duplicate_name_checked_against_own_budgets() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);

        for owner in ["bob", "carol"] {
            let mut food = quarterly("Food", CycleType::None, false);
            food.owner = owner.into();
            service.create_budget(food).unwrap();
        }

        service
            .create_budget(quarterly("Food", CycleType::None, false))
            .unwrap();
        let err = service
            .create_budget(quarterly("FOOD", CycleType::None, false))
            .unwrap_err();
        assert!(matches!(err, TallyError::Duplicate { .. }));
        assert_eq!(storage.budgets.count().unwrap(), 3);

        let err = service.find_budget("food").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_aggregated_cyclic_execution() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::Monthly, false))
            .unwrap();

        let execution = service.execution(budget.id, date(2025, 4, 1)).unwrap();
        assert_eq!(execution.total_amount, units(3000));
        assert_eq!(execution.total_spent, units(900));
        assert_eq!(execution.rate, 30.0);
        assert_eq!(execution.status, ExecutionStatus::Normal);
        // items refer to the last cycle once the budget has ended
        assert_eq!(execution.items[0].spent, units(400));

        let stored = storage.cycles.cycles_for_budget(budget.id).unwrap();
        let spent: Vec<_> = stored.iter().map(|c| c.spent).collect();
        assert_eq!(spent, vec![units(200), units(300), units(400)]);
    }

    #[test]
    fn test_flat_execution_persists_item_spend() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::None, false))
            .unwrap();

        let execution = service.execution(budget.id, date(2025, 2, 15)).unwrap();
        assert_eq!(execution.total_spent, units(900));
        assert_eq!(execution.status, ExecutionStatus::Warning);

        let stored = storage.budgets.get(budget.id).unwrap().unwrap();
        assert_eq!(stored.items[0].spent, units(900));
    }

    #[test]
    fn test_lazy_cycle_generation() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::Monthly, false))
            .unwrap();

        storage.cycles.delete_for_budget(budget.id).unwrap();
        let first = service.cycles(budget.id).unwrap();
        let second = service.cycles(budget.id).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_regenerates_cycles_on_config_change() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::Monthly, false))
            .unwrap();
        let original = service.cycles(budget.id).unwrap();

        // renaming keeps the set
        service
            .update_budget(
                budget.id,
                BudgetUpdate {
                    name: Some("Groceries".into()),
                    ..BudgetUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(service.cycles(budget.id).unwrap(), original);

        // a new end date regenerates it
        service
            .update_budget(
                budget.id,
                BudgetUpdate {
                    end_date: Some(Some(date(2025, 6, 30))),
                    ..BudgetUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(service.cycles(budget.id).unwrap().len(), 6);

        // turning cycles off drops them
        service
            .update_budget(
                budget.id,
                BudgetUpdate {
                    cycle_type: Some(CycleType::None),
                    ..BudgetUpdate::default()
                },
            )
            .unwrap();
        assert!(storage.cycles.cycles_for_budget(budget.id).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_update_leaves_budget_untouched() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::Monthly, false))
            .unwrap();

        let result = service.update_budget(
            budget.id,
            BudgetUpdate {
                end_date: Some(None),
                ..BudgetUpdate::default()
            },
        );
        assert!(result.unwrap_err().is_validation());
        assert_eq!(storage.budgets.get(budget.id).unwrap().unwrap(), budget);
    }

    #[test]
    fn test_items_replaced_wholesale() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::None, false))
            .unwrap();

        let updated = service
            .update_budget(
                budget.id,
                BudgetUpdate {
                    items: Some(vec![
                        NewBudgetItem::new("Expenses:Food:Groceries", units(800), "CNY"),
                        NewBudgetItem::new("Expenses:Transport", units(200), "CNY"),
                    ]),
                    ..BudgetUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.items.len(), 2);
        assert!(updated.items.iter().all(|i| i.id != budget.items[0].id));
    }

    #[test]
    fn test_add_and_remove_item() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::None, false))
            .unwrap();

        let item = service
            .add_item(
                budget.id,
                NewBudgetItem::new("Expenses:Transport", units(100), "cny"),
            )
            .unwrap();
        assert_eq!(item.currency, "CNY");

        let stored = service.get_budget(budget.id).unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(service.find_item(&stored, &item.id.short()).unwrap().id, item.id);

        service.remove_item(budget.id, item.id).unwrap();
        assert!(service
            .remove_item(budget.id, item.id)
            .unwrap_err()
            .is_not_found());

        let bad = service.add_item(
            budget.id,
            NewBudgetItem::new("Expenses:Transport", Money::zero(), "CNY"),
        );
        assert!(bad.unwrap_err().is_validation());
    }

    #[test]
    fn test_delete_budget_removes_cycles() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::Monthly, false))
            .unwrap();

        service.delete_budget(budget.id).unwrap();

        assert!(service.get_budget(budget.id).unwrap().is_none());
        assert!(storage.cycles.cycles_for_budget(budget.id).unwrap().is_empty());
        let last = storage.audit().read_recent(1).unwrap();
        assert_eq!(last[0].operation, Operation::Delete);
        assert_eq!(last[0].entity_type, EntityType::BudgetCycles);
    }

    #[test]
    fn test_find_budget_by_name_and_id() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);
        let budget = service
            .create_budget(quarterly("Food", CycleType::None, false))
            .unwrap();

        assert_eq!(service.find_budget("FOOD").unwrap().unwrap().id, budget.id);
        assert_eq!(
            service.find_budget(&budget.id.to_string()).unwrap().unwrap().id,
            budget.id
        );
        assert_eq!(
            service.find_budget(&budget.id.short()).unwrap().unwrap().id,
            budget.id
        );
        assert!(service.resolve_budget("Rent").unwrap_err().is_not_found());
    }

    #[test]
    fn test_project_window() {
        let (_temp, storage, ledger, settings) = setup();
        let service = BudgetService::new(&storage, &ledger, &settings);

        let mut input = quarterly("Food", CycleType::None, false);
        input.end_date = Some(date(2025, 3, 15));
        let budget = service.create_budget(input).unwrap();

        let february = DateRange::month(2025, 2).unwrap();
        let projection = service
            .project_window(budget.id, february, date(2025, 4, 1))
            .unwrap();
        assert_eq!(projection.budget_amount, Money::from_cents(37_838));
        assert_eq!(projection.spent, units(300));

        let batch = service
            .project_budgets(&[budget], february, date(2025, 4, 1))
            .unwrap();
        assert_eq!(batch, vec![projection]);
    }
}
