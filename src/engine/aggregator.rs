//! Spend aggregation over ledger records
//!
//! Sign convention: postings to accounts under `Expenses:` count positive
//! amounts (refunds are ignored); postings to any other account count
//! outflows, i.e. the absolute value of negative amounts.

use chrono::NaiveDate;
use tracing::trace;

use crate::error::TallyResult;
use crate::ledger::LedgerSource;
use crate::models::{BudgetItem, Money, Posting, Record};

use super::matcher::AccountPattern;

const EXPENSE_PREFIX: &str = "Expenses:";

/// The amount a single posting contributes to spending
pub fn posting_spend(posting: &Posting) -> Money {
    if posting.account.starts_with(EXPENSE_PREFIX) {
        if posting.amount.is_positive() {
            posting.amount
        } else {
            Money::zero()
        }
    } else if posting.amount.is_negative() {
        posting.amount.abs()
    } else {
        Money::zero()
    }
}

/// An item compiled for matching
struct ItemMatcher<'i> {
    item: &'i BudgetItem,
    pattern: AccountPattern,
}

impl<'i> ItemMatcher<'i> {
    fn new(item: &'i BudgetItem) -> TallyResult<Self> {
        Ok(Self {
            item,
            pattern: AccountPattern::new(&item.pattern)?,
        })
    }

    fn spent_in(&self, records: &[Record]) -> Money {
        records
            .iter()
            .flat_map(|r| r.postings.iter())
            .filter(|p| p.currency == self.item.currency)
            .filter(|p| self.pattern.matches(&p.account))
            .map(posting_spend)
            .sum()
    }
}

/// Sums matching postings from a ledger source
pub struct SpendAggregator<'a> {
    ledger: &'a dyn LedgerSource,
}

impl<'a> SpendAggregator<'a> {
    pub fn new(ledger: &'a dyn LedgerSource) -> Self {
        Self { ledger }
    }

    /// Records in `[start, end]`; nothing is fetched for an empty range
    fn records(&self, start: NaiveDate, end: NaiveDate) -> TallyResult<Vec<Record>> {
        if end < start {
            return Ok(Vec::new());
        }
        let records = self.ledger.find_by_date_range(start, end)?;
        trace!(%start, %end, records = records.len(), "fetched ledger records");
        Ok(records)
    }

    /// Spend attributed to one item within `[start, end]`
    pub fn spent_for_item(
        &self,
        item: &BudgetItem,
        start: NaiveDate,
        end: NaiveDate,
    ) -> TallyResult<Money> {
        let matcher = ItemMatcher::new(item)?;
        Ok(matcher.spent_in(&self.records(start, end)?))
    }

    /// Spend per item within `[start, end]`, in item order, from one fetch
    pub fn spent_per_item(
        &self,
        items: &[BudgetItem],
        start: NaiveDate,
        end: NaiveDate,
    ) -> TallyResult<Vec<Money>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let matchers = items
            .iter()
            .map(ItemMatcher::new)
            .collect::<TallyResult<Vec<_>>>()?;
        let records = self.records(start, end)?;
        Ok(matchers.iter().map(|m| m.spent_in(&records)).collect())
    }

    /// Total spend of all items within `[start, end]`
    pub fn spent_for_items(
        &self,
        items: &[BudgetItem],
        start: NaiveDate,
        end: NaiveDate,
    ) -> TallyResult<Money> {
        Ok(self.spent_per_item(items, start, end)?.into_iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use crate::models::{BudgetId, NewBudgetItem};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(pattern: &str, currency: &str) -> BudgetItem {
        BudgetItem::new(
            BudgetId::new(),
            NewBudgetItem::new(pattern, Money::from_units(1000), currency),
        )
        .unwrap()
    }

    const LEDGER: &str = r#"
2025-01-05 * "Market"
  Expenses:Food:Groceries   200.00 CNY
  Assets:Bank:Checking

2025-01-10 * "Market" "refund"
  Expenses:Food:Groceries   -30.00 CNY
  Assets:Bank:Checking

2025-01-15 * "Cafe"
  Expenses:Food:Dining        5.00 USD
  Assets:Cash:Wallet

2025-01-31 * "Card payment"
  Liabilities:CreditCard    -80.00 CNY
  Expenses:Food:Dining       80.00 CNY

2025-02-01 * "Market"
  Expenses:Food:Groceries   100.00 CNY
  Assets:Bank:Checking
"#;

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::parse(LEDGER).unwrap()
    }

    #[test]
    fn test_posting_spend_sign_convention() {
        let spend = |account: &str, units: i64| {
            posting_spend(&Posting::new(account, Money::from_units(units), "CNY"))
        };
        assert_eq!(spend("Expenses:Food", 20), Money::from_units(20));
        assert_eq!(spend("Expenses:Food", -20), Money::zero());
        assert_eq!(spend("Liabilities:Card", -20), Money::from_units(20));
        assert_eq!(spend("Assets:Cash", 20), Money::zero());
        // no colon after the root: not an expense account
        assert_eq!(spend("Expenses", 20), Money::zero());
    }

    #[test]
    fn test_expense_item_ignores_refunds_and_other_currencies() {
        let ledger = ledger();
        let aggregator = SpendAggregator::new(&ledger);

        let food = item("Expenses:Food*", "CNY");
        let spent = aggregator
            .spent_for_item(&food, date(2025, 1, 1), date(2025, 1, 31))
            .unwrap();
        assert_eq!(spent, Money::from_units(280));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let ledger = ledger();
        let aggregator = SpendAggregator::new(&ledger);
        let groceries = item("Expenses:Food:Groceries", "CNY");

        let spent = |start, end| aggregator.spent_for_item(&groceries, start, end).unwrap();
        assert_eq!(spent(date(2025, 1, 5), date(2025, 1, 5)), Money::from_units(200));
        assert_eq!(spent(date(2025, 1, 6), date(2025, 1, 31)), Money::zero());
        assert_eq!(spent(date(2025, 1, 31), date(2025, 2, 1)), Money::from_units(100));
        assert_eq!(spent(date(2025, 2, 1), date(2025, 1, 1)), Money::zero());
    }

    #[test]
    fn test_outflow_accounts_count_negative_amounts() {
        let ledger = ledger();
        let aggregator = SpendAggregator::new(&ledger);

        let card = item("Liabilities:*", "CNY");
        assert_eq!(
            aggregator
                .spent_for_item(&card, date(2025, 1, 1), date(2025, 12, 31))
                .unwrap(),
            Money::from_units(80)
        );

        let wallet = item("Assets:Cash*", "USD");
        assert_eq!(
            aggregator
                .spent_for_item(&wallet, date(2025, 1, 1), date(2025, 12, 31))
                .unwrap(),
            Money::from_units(5)
        );
    }

    #[test]
    fn test_items_summed_from_single_fetch() {
        let ledger = ledger();
        let aggregator = SpendAggregator::new(&ledger);
        let items = vec![
            item("Expenses:Food:Groceries", "CNY"),
            item("Expenses:Food:Dining", "CNY"),
            item("Expenses:Food:Dining", "USD"),
        ];

        let per_item = aggregator
            .spent_per_item(&items, date(2025, 1, 1), date(2025, 1, 31))
            .unwrap();
        assert_eq!(
            per_item,
            vec![Money::from_units(200), Money::from_units(80), Money::from_units(5)]
        );

        // currencies are not converted, only added
        assert_eq!(
            aggregator
                .spent_for_items(&items, date(2025, 1, 1), date(2025, 1, 31))
                .unwrap(),
            Money::from_units(285)
        );
        assert_eq!(
            aggregator
                .spent_for_items(&[], date(2025, 1, 1), date(2025, 1, 31))
                .unwrap(),
            Money::zero()
        );
    }
}
