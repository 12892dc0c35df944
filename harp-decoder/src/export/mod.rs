//! Output adapters over decoded records
//!
//! These are thin views of a record list: a column-oriented table and a CSV
//! writer. A missing timestamp renders as NaN (`nan` in text) in both.

pub mod csv;
pub mod table;

pub use self::csv::{export_csv, write_csv, CSV_HEADER};
pub use self::table::Table;
