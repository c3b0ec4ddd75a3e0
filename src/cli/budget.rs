//! Budget CLI commands
//!
//! Implements CLI commands for creating, inspecting and changing budgets and
//! their items.

use chrono::NaiveDate;
use clap::Subcommand;

use super::{parse_date, parse_item_spec, parse_money};
use crate::config::settings::Settings;
use crate::display::{format_budget_details, format_budget_list, format_execution};
use crate::error::{TallyError, TallyResult};
use crate::models::{CycleType, NewBudget, NewBudgetItem, PeriodType};
use crate::services::{BudgetService, BudgetUpdate};

/// Budget subcommands
#[derive(Subcommand, Debug)]
pub enum BudgetCommands {
    /// Create a new budget
    Create {
        /// Budget name
        name: String,

        /// Budget amount (per cycle for cyclic budgets)
        #[arg(short, long)]
        amount: String,

        /// Owner of the budget
        #[arg(long, env = "TALLY_OWNER", default_value = "default")]
        owner: String,

        /// Period type: monthly, yearly or custom
        #[arg(short, long, default_value = "monthly")]
        period: String,

        /// Cycle type: none, monthly or yearly
        #[arg(short, long, default_value = "none")]
        cycle: String,

        /// Carry the remaining balance of each cycle into the next
        #[arg(long)]
        carry_over: bool,

        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        end: Option<String>,

        /// Line item as PATTERN=AMOUNT[@CURRENCY]; repeatable
        #[arg(short, long = "item")]
        items: Vec<String>,
    },

    /// List budgets
    List {
        /// Include inactive budgets
        #[arg(short, long)]
        all: bool,
    },

    /// Show budget details and execution
    Show {
        /// Budget name or ID
        budget: String,
    },

    /// Update a budget
    Update {
        /// Budget name or ID
        budget: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New amount
        #[arg(short, long)]
        amount: Option<String>,

        /// New period type
        #[arg(short, long)]
        period: Option<String>,

        /// New cycle type
        #[arg(short, long)]
        cycle: Option<String>,

        /// Turn carry-over on or off
        #[arg(long)]
        carry_over: Option<bool>,

        /// New start date (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<String>,

        /// New end date (YYYY-MM-DD)
        #[arg(short, long, conflicts_with = "no_end")]
        end: Option<String>,

        /// Remove the end date
        #[arg(long)]
        no_end: bool,

        /// Mark the budget active or inactive
        #[arg(long)]
        active: Option<bool>,

        /// Replace all items; repeatable, PATTERN=AMOUNT[@CURRENCY]
        #[arg(short, long = "item")]
        items: Vec<String>,
    },

    /// Delete a budget with its items and cycles
    Delete {
        /// Budget name or ID
        budget: String,
    },

    /// Add a line item to a budget
    AddItem {
        /// Budget name or ID
        budget: String,

        /// Account pattern; `*` matches any run of characters
        pattern: String,

        /// Item amount
        amount: String,

        /// Item currency (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// Remove a line item from a budget
    RemoveItem {
        /// Budget name or ID
        budget: String,

        /// Item pattern or ID
        item: String,
    },

    /// Discard and regenerate the cycles of a cyclic budget
    Regenerate {
        /// Budget name or ID
        budget: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    service: &BudgetService<'_>,
    settings: &Settings,
    cmd: BudgetCommands,
    today: NaiveDate,
) -> TallyResult<()> {
    match cmd {
        BudgetCommands::Create {
            name,
            amount,
            owner,
            period,
            cycle,
            carry_over,
            start,
            end,
            items,
        } => {
            let items = items
                .iter()
                .map(|spec| parse_item_spec(spec, &settings.default_currency))
                .collect::<TallyResult<Vec<_>>>()?;

            let budget = service.create_budget(NewBudget {
                owner,
                name,
                amount: parse_money(&amount)?,
                period_type: period.parse::<PeriodType>().map_err(TallyError::Validation)?,
                cycle_type: cycle.parse::<CycleType>().map_err(TallyError::Validation)?,
                carry_over,
                start_date: start.as_deref().map(parse_date).transpose()?.unwrap_or(today),
                end_date: end.as_deref().map(parse_date).transpose()?,
                items,
            })?;

            println!("Created budget: {} ({})", budget.name, budget.id.short());
            if budget.is_cyclic() {
                println!("  Cycles: {}", service.cycles(budget.id)?.len());
            }
        }

        BudgetCommands::List { all } => {
            let budgets = service.list_budgets(all)?;
            print!("{}", format_budget_list(&budgets));
        }

        BudgetCommands::Show { budget } => {
            let budget = service.resolve_budget(&budget)?;
            print!("{}", format_budget_details(&budget));
            println!();
            print!("{}", format_execution(&service.execution(budget.id, today)?));
        }

        BudgetCommands::Update {
            budget,
            name,
            amount,
            period,
            cycle,
            carry_over,
            start,
            end,
            no_end,
            active,
            items,
        } => {
            let budget = service.resolve_budget(&budget)?;

            let end_date = if no_end {
                Some(None)
            } else {
                end.as_deref().map(parse_date).transpose()?.map(Some)
            };

            let items = if items.is_empty() {
                None
            } else {
                Some(
                    items
                        .iter()
                        .map(|spec| parse_item_spec(spec, &settings.default_currency))
                        .collect::<TallyResult<Vec<_>>>()?,
                )
            };

            let update = BudgetUpdate {
                name,
                amount: amount.as_deref().map(parse_money).transpose()?,
                period_type: period
                    .map(|p| p.parse::<PeriodType>())
                    .transpose()
                    .map_err(TallyError::Validation)?,
                cycle_type: cycle
                    .map(|c| c.parse::<CycleType>())
                    .transpose()
                    .map_err(TallyError::Validation)?,
                carry_over,
                start_date: start.as_deref().map(parse_date).transpose()?,
                end_date,
                active,
                items,
            };

            if update.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }

            let updated = service.update_budget(budget.id, update)?;
            println!("Updated budget: {}", updated.name);
        }

        BudgetCommands::Delete { budget } => {
            let budget = service.resolve_budget(&budget)?;
            let deleted = service.delete_budget(budget.id)?;
            println!("Deleted budget: {}", deleted.name);
        }

        BudgetCommands::AddItem {
            budget,
            pattern,
            amount,
            currency,
        } => {
            let budget = service.resolve_budget(&budget)?;
            let currency = currency.unwrap_or_else(|| settings.default_currency.clone());
            let item = service.add_item(
                budget.id,
                NewBudgetItem::new(pattern, parse_money(&amount)?, currency),
            )?;
            println!(
                "Added item {} to {}: {} {} {}",
                item.id.short(),
                budget.name,
                item.pattern,
                item.amount,
                item.currency
            );
        }

        BudgetCommands::RemoveItem { budget, item } => {
            let budget = service.resolve_budget(&budget)?;
            let item_id = service.find_item(&budget, &item)?.id;
            let removed = service.remove_item(budget.id, item_id)?;
            println!("Removed item {} from {}", removed.pattern, budget.name);
        }

        BudgetCommands::Regenerate { budget } => {
            let budget = service.resolve_budget(&budget)?;
            let cycles = service.regenerate_cycles(budget.id)?;
            println!("Regenerated {} cycles for {}", cycles.len(), budget.name);
        }
    }

    Ok(())
}
