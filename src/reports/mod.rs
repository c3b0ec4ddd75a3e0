//! Reports for Tally

pub mod monthly;

pub use monthly::MonthlyOverviewReport;
