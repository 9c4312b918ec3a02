//! Reader for Advantage Database Server table files.
//!
//! [`storage::Table`] opens a `.ADT` file (and its `.ADM` memo file) and
//! decodes records by index; [`export`] and [`sql`] turn those records
//! into CSV, JSON and SQL statements.

pub mod console;
pub mod errors;
pub mod export;
pub mod sql;
pub mod storage;

pub use errors::{Error, Result};
pub use storage::{Column, ColumnType, Record, Table, TableOptions, Value};
