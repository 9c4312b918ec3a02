//! Decoder for Advantage table files (`.ADT`) and their memo files (`.ADM`).

pub mod column;
pub mod cursor;
pub mod encoding;
pub mod header;
pub mod julian;
pub mod memo;
pub mod row;
pub mod table;

pub use column::{Column, ColumnType, DescriptorLayout, FieldSpec};
pub use encoding::Decoded;
pub use header::TableHeader;
pub use memo::MemoPointer;
pub use row::{Record, Value};
pub use table::{Scan, Table, TableOptions};
