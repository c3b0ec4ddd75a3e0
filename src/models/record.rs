//! Ledger records and postings
//!
//! A record is an immutable dated transaction made of postings that balance
//! per currency.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::money::Money;

/// A single account/amount/currency line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,
    pub amount: Money,
    pub currency: String,
}

impl Posting {
    /// The currency is trimmed and uppercased, the same way item currencies are
    pub fn new(account: impl Into<String>, amount: Money, currency: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            amount,
            currency: currency.into().trim().to_uppercase(),
        }
    }
}

/// A dated ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,

    pub postings: Vec<Posting>,
}

impl Record {
    pub fn new(date: NaiveDate, postings: Vec<Posting>) -> Self {
        Self {
            date,
            payee: None,
            narration: None,
            postings,
        }
    }

    /// Per-currency sums of all postings; empty when balanced
    pub fn imbalance(&self) -> BTreeMap<&str, Money> {
        let mut sums: BTreeMap<&str, Money> = BTreeMap::new();
        for posting in &self.postings {
            *sums.entry(posting.currency.as_str()).or_default() += posting.amount;
        }
        sums.retain(|_, sum| !sum.is_zero());
        sums
    }

    pub fn is_balanced(&self) -> bool {
        self.imbalance().is_empty()
    }
}
