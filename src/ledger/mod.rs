//! Ledger record sources
//!
//! The budget engine reads spending through the [`LedgerSource`] trait. The
//! bundled implementation keeps records in memory, loaded from a plain-text
//! ledger file (see [`parser`]).

pub mod parser;

use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{TallyError, TallyResult};
use crate::models::Record;

pub use parser::parse_ledger;

/// Anything that can return the ledger records within a date range
pub trait LedgerSource {
    /// All records dated within `[start, end]`, both ends inclusive
    ///
    /// Ordering of the returned records is not significant.
    fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> TallyResult<Vec<Record>>;
}

impl<T: LedgerSource + ?Sized> LedgerSource for &T {
    fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> TallyResult<Vec<Record>> {
        (**self).find_by_date_range(start, end)
    }
}

/// Records held in memory, sorted by date
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    records: Vec<Record>,
}

impl InMemoryLedger {
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    /// Parse a ledger from text
    pub fn parse(text: &str) -> TallyResult<Self> {
        Ok(Self::new(parse_ledger(text)?))
    }

    /// Load and parse a ledger file
    pub fn from_file(path: impl AsRef<Path>) -> TallyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TallyError::Io(format!("Failed to read ledger {}: {}", path.display(), e))
        })?;
        let ledger = Self::parse(&text)?;
        debug!(path = %path.display(), records = ledger.len(), "loaded ledger");
        Ok(ledger)
    }

    pub fn push(&mut self, record: Record) {
        let position = self.records.partition_point(|r| r.date <= record.date);
        self.records.insert(position, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl LedgerSource for InMemoryLedger {
    fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> TallyResult<Vec<Record>> {
        if end < start {
            return Ok(Vec::new());
        }
        let from = self.records.partition_point(|r| r.date < start);
        let to = self.records.partition_point(|r| r.date <= end);
        Ok(self.records[from..to].to_vec())
    }
}
