use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Error type for table decoding, including specific error codes.
///
/// Each variant names the stage it occurred at (header, descriptor index,
/// record index, column name) so export tools can report per record/column.
#[derive(Debug)]
pub enum Error {
    /// I/O-related error (e.g., opening the table file).
    /// Error code: 1000
    Io(std::io::Error),
    /// A table or memo file could not be opened.
    /// Error code: 1000
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The header does not start with the magic signature.
    /// Error code: 2000
    MagicMismatch,
    /// Fewer than a full header's bytes were available.
    /// Error code: 2000
    TruncatedHeader { read: usize },
    /// Reading the header failed.
    /// Error code: 2000
    HeaderRead { source: std::io::Error },
    /// Reading a column descriptor failed.
    /// Error code: 2000
    DescriptorRead {
        index: usize,
        source: std::io::Error,
    },
    /// A column descriptor ended early.
    /// Error code: 2000
    TruncatedDescriptor { index: usize },
    /// The descriptor region is not a whole number of descriptors.
    /// Error code: 2000
    InvalidLayout { data_offset: u16 },
    /// More than one auto-increment column.
    /// Error code: 3000
    MultiplePrimaryKeys { first: String, second: String },
    /// Short or failed read of a record.
    /// Error code: 4000
    RecordRead {
        record: usize,
        source: std::io::Error,
    },
    /// A memo field references the companion file, but none was opened.
    /// Error code: 4000
    MemoStreamMissing { record: usize, column: String },
    /// Seeking or reading the memo file failed.
    /// Error code: 4000
    MemoRead {
        record: usize,
        column: String,
        source: std::io::Error,
    },
    /// The companion file ended before the memo payload did.
    /// Error code: 4000
    MemoReadTruncated {
        record: usize,
        column: String,
        block_offset: u32,
        length: u16,
    },
    /// Column type code with no decode rule.
    /// Error code: 5000
    UnsupportedColumnType {
        record: usize,
        column: String,
        code: u8,
    },
    /// Column bytes lie outside the record, or are too narrow for the type.
    /// Error code: 5000
    FieldOutOfRange { record: usize, column: String },
    /// Export serialization error.
    /// Error code: 6000
    Export(String),
    /// Miscellaneous uncategorized error.
    /// Error code: 9000
    Other(String),
}

impl Error {
    /// Returns the error code associated with this error variant.
    ///
    /// # Examples
    /// ```
    /// use adt::errors::Error;
    /// let err = Error::MagicMismatch;
    /// assert_eq!(err.code(), 2000);
    /// ```
    pub fn code(&self) -> u32 {
        match self {
            Error::Io(_) | Error::Open { .. } => 1000,
            Error::MagicMismatch
            | Error::HeaderRead { .. }
            | Error::DescriptorRead { .. }
            | Error::TruncatedHeader { .. }
            | Error::TruncatedDescriptor { .. }
            | Error::InvalidLayout { .. } => 2000,
            Error::MultiplePrimaryKeys { .. } => 3000,
            Error::RecordRead { .. }
            | Error::MemoStreamMissing { .. }
            | Error::MemoRead { .. }
            | Error::MemoReadTruncated { .. } => 4000,
            Error::UnsupportedColumnType { .. } | Error::FieldOutOfRange { .. } => 5000,
            Error::Export(_) => 6000,
            Error::Other(_) => 9000,
        }
    }

    /// Returns a human-readable error category for this error variant.
    pub fn category(&self) -> &'static str {
        match self.code() {
            1000 => "I/O",
            2000 => "Format",
            3000 => "Schema",
            4000 => "Read",
            5000 => "Type",
            6000 => "Export",
            _ => "Other",
        }
    }

    /// Record index the error belongs to, if it happened while reading one.
    pub fn record(&self) -> Option<usize> {
        match self {
            Error::RecordRead { record, .. }
            | Error::MemoStreamMissing { record, .. }
            | Error::MemoRead { record, .. }
            | Error::MemoReadTruncated { record, .. }
            | Error::UnsupportedColumnType { record, .. }
            | Error::FieldOutOfRange { record, .. } => Some(*record),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} Error: ", self.code(), self.category())?;
        match self {
            Error::Io(e) => write!(f, "{}", e),
            Error::Open { path, source } => write!(f, "{}: {}", path.display(), source),
            Error::HeaderRead { source } => write!(f, "header: {}", source),
            Error::DescriptorRead { index, source } => {
                write!(f, "descriptor {}: {}", index, source)
            }
            Error::MagicMismatch => write!(f, "header: magic signature missing"),
            Error::TruncatedHeader { read } => {
                write!(f, "header: truncated after {} bytes", read)
            }
            Error::TruncatedDescriptor { index } => {
                write!(f, "descriptor {}: truncated", index)
            }
            Error::InvalidLayout { data_offset } => write!(
                f,
                "header: data offset {} does not frame whole column descriptors",
                data_offset
            ),
            Error::MultiplePrimaryKeys { first, second } => write!(
                f,
                "multiple primary keys: '{}' and '{}'",
                first, second
            ),
            Error::RecordRead { record, source } => {
                write!(f, "record {}: {}", record, source)
            }
            Error::MemoStreamMissing { record, column } => write!(
                f,
                "record {}, column '{}': memo file not available",
                record, column
            ),
            Error::MemoRead {
                record,
                column,
                source,
            } => write!(
                f,
                "record {}, column '{}': memo read failed: {}",
                record, column, source
            ),
            Error::MemoReadTruncated {
                record,
                column,
                block_offset,
                length,
            } => write!(
                f,
                "record {}, column '{}': memo block {} shorter than {} bytes",
                record, column, block_offset, length
            ),
            Error::UnsupportedColumnType {
                record,
                column,
                code,
            } => write!(
                f,
                "record {}, column '{}': type code {} not implemented",
                record, column, code
            ),
            Error::FieldOutOfRange { record, column } => write!(
                f,
                "record {}, column '{}': field lies outside the record",
                record, column
            ),
            Error::Export(msg) => write!(f, "{}", msg),
            Error::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Open { source, .. }
            | Error::HeaderRead { source }
            | Error::DescriptorRead { source, .. }
            | Error::RecordRead { source, .. }
            | Error::MemoRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Export(format!("JSON encoding error: {}", err))
    }
}

/// Convenience macro to create an `Error` with a formatted message.
///
/// # Examples
/// ```
/// use adt::err;
/// let err = err!(Export, "broken pipe");
/// assert_eq!(err.code(), 6000);
/// assert_eq!(err.to_string(), "[6000] Export Error: broken pipe");
///
/// let err = err!(Other, "bad range '{}'", "3..1");
/// assert_eq!(err.code(), 9000);
/// ```
#[macro_export]
macro_rules! err {
    ($variant:ident, $msg:expr) => {
        $crate::errors::Error::$variant($msg.to_string())
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        $crate::errors::Error::$variant(format!($fmt, $($arg)*))
    };
}
