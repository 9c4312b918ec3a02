//! CSV and JSON exporters over a range of records.

use crate::errors::Result;
use crate::storage::Table;
use std::io::{Read, Seek, Write};
use std::ops::Range;
use tracing::debug;

/// Which records to export and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// First record index (0-based).
    pub start: usize,
    /// Number of records; `None` exports through the last record.
    pub count: Option<usize>,
    /// Pretty-print JSON.
    pub indent: bool,
}

impl ExportOptions {
    /// Index range to read, clamped to the table's record count.
    pub fn range(&self, record_count: u32) -> Range<usize> {
        let total = record_count as usize;
        let end = match self.count {
            Some(n) => self.start.saturating_add(n).min(total),
            None => total,
        };
        self.start.min(end)..end
    }
}

fn csv_field(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\r' | '\n')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_csv_row<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> Result<()> {
    let line: Vec<String> = fields.iter().map(|f| csv_field(f.as_ref())).collect();
    writeln!(out, "{}", line.join(","))?;
    Ok(())
}

/// Writes a header row of column names, then one row per record.
pub fn write_csv<R, M, W>(
    table: &mut Table<R, M>,
    out: &mut W,
    options: &ExportOptions,
) -> Result<usize>
where
    R: Read + Seek,
    M: Read + Seek,
    W: Write,
{
    let names: Vec<String> = table.columns().iter().map(|c| c.name.clone()).collect();
    write_csv_row(out, &names)?;

    let range = options.range(table.record_count());
    debug!(start = range.start, end = range.end, "Exporting CSV...");
    let mut written = 0;
    for item in table.scan(range) {
        let (_, record) = item?;
        let fields: Vec<String> = names
            .iter()
            .map(|n| record.get_column(n).unwrap_or_default())
            .collect();
        write_csv_row(out, &fields)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Writes one JSON object per record, each on its own line.
pub fn write_json<R, M, W>(
    table: &mut Table<R, M>,
    out: &mut W,
    options: &ExportOptions,
) -> Result<usize>
where
    R: Read + Seek,
    M: Read + Seek,
    W: Write,
{
    let range = options.range(table.record_count());
    debug!(start = range.start, end = range.end, "Exporting JSON...");
    let mut written = 0;
    for item in table.scan(range) {
        let (_, record) = item?;
        if options.indent {
            serde_json::to_writer_pretty(&mut *out, &record)?;
        } else {
            serde_json::to_writer(&mut *out, &record)?;
        }
        writeln!(out)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}
