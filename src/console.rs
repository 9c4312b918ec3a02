//! Terminal output helpers for the inspection commands.
use crossterm::{style, ExecutableCommand};
use std::io::{self, Write};

pub fn echo(s: String) {
    if let Err(e) = io::stdout().execute(style::Print(s)) {
        tracing::debug!("Failed to write to stdout. {}", e);
    }
    let _ = io::stdout().flush();
}

pub fn error(s: String) {
    let mut stderr = io::stderr();
    let _ = stderr.execute(style::SetForegroundColor(style::Color::Red));
    let _ = stderr.execute(style::Print(s));
    let _ = stderr.execute(style::ResetColor);
    let _ = stderr.flush();
}

pub fn echo_lines(s: String) {
    for l in s.lines() {
        if io::stdout().execute(style::Print(format!("{}\n", l))).is_err() {
            continue;
        }
    }
    let _ = io::stdout().flush();
}

/// Renders headers and rows as a boxed text table.
pub fn echo_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut result = String::new();

    let num_columns = headers.len();
    let mut column_widths = vec![0; num_columns];
    for (i, header) in headers.iter().enumerate() {
        column_widths[i] = header.chars().count();
    }
    for row in rows {
        for (i, col) in row.iter().enumerate().take(num_columns) {
            column_widths[i] = column_widths[i].max(col.chars().count());
        }
    }

    let border = |result: &mut String| {
        result.push('+');
        for width in &column_widths {
            result.push_str(&"-".repeat(*width));
            result.push('+');
        }
        result.push('\n');
    };

    border(&mut result);
    if !headers.is_empty() {
        result.push('|');
        for (i, header) in headers.iter().enumerate() {
            result.push_str(&format!("{:<width$}|", header, width = column_widths[i]));
        }
        result.push('\n');
        border(&mut result);
    }

    for row in rows {
        result.push('|');
        for (i, col) in row.iter().enumerate().take(num_columns) {
            result.push_str(&format!("{:<width$}|", col, width = column_widths[i]));
        }
        result.push('\n');
    }
    border(&mut result);

    result
}

#[macro_export]
macro_rules! echo {
    ($($arg:tt)*) => {
        $crate::console::echo(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::console::error(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! echo_lines {
    ($($arg:tt)*) => {
        $crate::console::echo_lines(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_table() {
        let headers = vec!["Name".to_string(), "Type".to_string()];
        let rows = vec![
            vec!["ID".to_string(), "AUTOINC".to_string()],
            vec!["CUSTOMER".to_string(), "CHARACTER".to_string()],
        ];
        let table = echo_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+--------+---------+");
        assert_eq!(lines[1], "|Name    |Type     |");
        assert_eq!(lines[3], "|ID      |AUTOINC  |");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_echo_table_without_headers() {
        let table = echo_table(&[], &[]);
        assert_eq!(table, "+\n+\n");
    }
}
