//! SQL strings for migrating a table into a relational database.

use crate::storage::Column;
use time::Duration;

/// `CREATE TABLE` statement with one entry per column.
pub fn create_table(name: &str, columns: &[Column]) -> String {
    let body: Vec<String> = columns
        .iter()
        .map(|c| format!("\t\"{}\" {}", c.name, c.type_.sql_type()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n)",
        name,
        body.join(",\n")
    )
}

/// Parameterized `INSERT` with one placeholder per column.
pub fn insert_statement(name: &str, column_count: usize) -> String {
    let placeholders = vec!["?"; column_count];
    format!(
        "INSERT INTO \"{}\" VALUES({})",
        name,
        placeholders.join(",")
    )
}

/// Time column literal, `H:MM:SS`, with a millisecond suffix only when
/// non-zero. Time values render this way in every export.
pub fn duration_literal(d: &Duration) -> String {
    let sign = if d.is_negative() { "-" } else { "" };
    let d = d.abs();
    let mut out = format!(
        "{}{}:{:02}:{:02}",
        sign,
        d.whole_hours(),
        d.whole_minutes() % 60,
        d.whole_seconds() % 60
    );
    let ms = d.subsec_milliseconds();
    if ms != 0 {
        out.push_str(&format!(".{:03}", ms));
    }
    out
}

/// Table name derived from a file name: its stem.
pub fn table_name(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
