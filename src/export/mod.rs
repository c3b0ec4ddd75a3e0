//! Export module for Tally
//!
//! - JSON: machine-readable export of budgets and cycles
//! - YAML: human-readable export of the same data
//! - CSV: executed cycles, one row per cycle

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_cycles_csv;
pub use json::{export_full_json, import_from_json, ExportMetadata, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};
