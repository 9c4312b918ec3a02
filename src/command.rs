use adt::errors::Error;
use adt::export::{self, ExportOptions};
use adt::storage::{Table, TableOptions};
use adt::{console, echo, echo_lines, sql};
use clap::{Args, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct Source {
    /// Path to the ADT file.
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct Range {
    /// Starting record index.
    #[arg(short = 'i', long, default_value_t = 0)]
    pub index: usize,
    /// Number of records; all remaining when omitted.
    #[arg(short = 'n', long)]
    pub num: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the header, the schema and one record.
    Dump {
        #[command(flatten)]
        source: Source,
        /// Record to print.
        #[arg(short = 'i', long, default_value_t = 0)]
        index: usize,
    },
    /// Export records as CSV.
    Csv {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        range: Range,
    },
    /// Export records as JSON, one object per line.
    Json {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        range: Range,
        /// Pretty-print each object.
        #[arg(long)]
        indent: bool,
    },
    /// Print CREATE TABLE and INSERT statements for the table.
    Ddl {
        #[command(flatten)]
        source: Source,
        /// Name of the resulting database table; defaults to the file stem.
        #[arg(short, long)]
        table: Option<String>,
    },
}

/// Execute a command.
pub fn execute(command: Command) -> Result<(), Error> {
    let options = TableOptions::default();
    match command {
        Command::Dump { source, index } => {
            let mut table = Table::from_path(&source.file, &options)?;
            dump(&mut table, index)
        }
        Command::Csv { source, range } => {
            let mut table = Table::from_path(&source.file, &options)?;
            let options = ExportOptions {
                start: range.index,
                count: range.num,
                indent: false,
            };
            let n = export::write_csv(&mut table, &mut io::stdout().lock(), &options)?;
            info!(records = n, "Exported CSV.");
            Ok(())
        }
        Command::Json {
            source,
            range,
            indent,
        } => {
            let mut table = Table::from_path(&source.file, &options)?;
            let options = ExportOptions {
                start: range.index,
                count: range.num,
                indent,
            };
            let n = export::write_json(&mut table, &mut io::stdout().lock(), &options)?;
            info!(records = n, "Exported JSON.");
            Ok(())
        }
        Command::Ddl { source, table: name } => {
            let table = Table::from_path(&source.file, &options)?;
            let name = name.unwrap_or_else(|| sql::table_name(&source.file));
            echo_lines!("{};", sql::create_table(&name, table.columns()));
            echo_lines!("{};", sql::insert_statement(&name, table.column_count()));
            Ok(())
        }
    }
}

fn dump(table: &mut Table<std::fs::File>, index: usize) -> Result<(), Error> {
    let header = table.header();
    echo!(
        "records: {}\ndata offset: {}\nrecord length: {}\n",
        header.record_count,
        header.data_offset,
        header.record_length
    );
    match table.primary_key_column()? {
        Some(pk) => echo!("primary key: {}\n", pk.name),
        None => echo!("primary key: -\n"),
    }

    let headers: Vec<String> = ["Name", "Type", "Offset", "Length", "Decimals"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = table
        .columns()
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.type_.to_string(),
                c.offset.to_string(),
                c.length.to_string(),
                c.decimal_digits.to_string(),
            ]
        })
        .collect();
    echo_lines!("{}", console::echo_table(&headers, &rows));

    if index < table.record_count() as usize {
        let record = table.get(index)?;
        echo_lines!("record {}: {:#?}", index, record.inner);
    }
    Ok(())
}
