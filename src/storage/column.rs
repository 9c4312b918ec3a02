use super::cursor::{ByteCursor, Endian};
use crate::errors::{Error, Result};
use std::fmt;
use std::io::Read;
use tracing::trace;

pub const COLUMN_DESCRIPTOR_LENGTH: usize = 200;
pub const COLUMN_NAME_LENGTH: usize = 128;

/// On-disk column type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool,          // 1: 'T' / anything else
    Date,          // 3: julian day counter
    Character,     // 4: fixed-width text
    Memo,          // 5: pointer into the memo file
    Blob,          // 6: raw bytes
    Double,        // 10: f64
    Int,           // 11: i32
    ShortInt,      // 12: i16
    Timestamp,     // 14: julian day + ms of day
    Time,          // 15: seconds since midnight
    AutoIncrement, // 16: u32 primary key
    Currency,      // 17: f64
    CiCharacter,   // 20: case-insensitive text
    Unknown(u8),
}

impl ColumnType {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ColumnType::Bool,
            3 => ColumnType::Date,
            4 => ColumnType::Character,
            5 => ColumnType::Memo,
            6 => ColumnType::Blob,
            10 => ColumnType::Double,
            11 => ColumnType::Int,
            12 => ColumnType::ShortInt,
            14 => ColumnType::Timestamp,
            15 => ColumnType::Time,
            16 => ColumnType::AutoIncrement,
            17 => ColumnType::Currency,
            20 => ColumnType::CiCharacter,
            other => ColumnType::Unknown(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ColumnType::Bool => 1,
            ColumnType::Date => 3,
            ColumnType::Character => 4,
            ColumnType::Memo => 5,
            ColumnType::Blob => 6,
            ColumnType::Double => 10,
            ColumnType::Int => 11,
            ColumnType::ShortInt => 12,
            ColumnType::Timestamp => 14,
            ColumnType::Time => 15,
            ColumnType::AutoIncrement => 16,
            ColumnType::Currency => 17,
            ColumnType::CiCharacter => 20,
            ColumnType::Unknown(code) => *code,
        }
    }

    /// Column type used by the SQL exporters.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Character | ColumnType::CiCharacter | ColumnType::Memo => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Int => "INTEGER",
            ColumnType::ShortInt => "SMALLINT",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Time => "TIME",
            ColumnType::AutoIncrement => "BIGINT",
            ColumnType::Currency => "DECIMAL(19,4)",
            ColumnType::Unknown(_) => "BLOB",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Bool => write!(f, "LOGICAL"),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::Character => write!(f, "CHARACTER"),
            ColumnType::Memo => write!(f, "MEMO"),
            ColumnType::Blob => write!(f, "BLOB"),
            ColumnType::Double => write!(f, "DOUBLE"),
            ColumnType::Int => write!(f, "INTEGER"),
            ColumnType::ShortInt => write!(f, "SHORTINT"),
            ColumnType::Timestamp => write!(f, "TIMESTAMP"),
            ColumnType::Time => write!(f, "TIME"),
            ColumnType::AutoIncrement => write!(f, "AUTOINC"),
            ColumnType::Currency => write!(f, "CURDOUBLE"),
            ColumnType::CiCharacter => write!(f, "CICHARACTER"),
            ColumnType::Unknown(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

/// Where one descriptor field lives inside the 200-byte block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub offset: usize,
    pub endian: Endian,
}

/// Byte layout of a column descriptor. The files are produced elsewhere,
/// so these positions are a wire contract; another format revision is
/// another constant here, never an edit at the call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorLayout {
    pub type_code: FieldSpec,
    pub offset: FieldSpec,
    pub length: FieldSpec,
    pub decimal_digits: FieldSpec,
}

impl DescriptorLayout {
    /// Type code is a single byte; offset is little-endian while length
    /// and decimals are stored big-endian.
    pub const STANDARD: DescriptorLayout = DescriptorLayout {
        type_code: FieldSpec {
            offset: 129,
            endian: Endian::Little,
        },
        offset: FieldSpec {
            offset: 131,
            endian: Endian::Little,
        },
        length: FieldSpec {
            offset: 134,
            endian: Endian::Big,
        },
        decimal_digits: FieldSpec {
            offset: 138,
            endian: Endian::Big,
        },
    };
}

impl Default for DescriptorLayout {
    fn default() -> Self {
        DescriptorLayout::STANDARD
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub type_: ColumnType,
    pub offset: u16,
    pub length: u16,
    pub decimal_digits: u16,
}

impl Column {
    /// Parses one descriptor block already in memory.
    pub fn from_descriptor(
        block: &[u8],
        layout: &DescriptorLayout,
        index: usize,
    ) -> Result<Column> {
        let truncated = || Error::TruncatedDescriptor { index };
        if block.len() < COLUMN_DESCRIPTOR_LENGTH {
            return Err(truncated());
        }
        let cursor = ByteCursor::new(block);

        let name_bytes = cursor.slice(0, COLUMN_NAME_LENGTH).ok_or_else(truncated)?;
        let name = String::from_utf8_lossy(name_bytes)
            .trim_end_matches('\0')
            .to_string();

        let code = cursor
            .u8_at(layout.type_code.offset)
            .ok_or_else(truncated)?;
        let offset = cursor
            .u16_at(layout.offset.offset, layout.offset.endian)
            .ok_or_else(truncated)?;
        let length = cursor
            .u16_at(layout.length.offset, layout.length.endian)
            .ok_or_else(truncated)?;
        let decimal_digits = cursor
            .u16_at(layout.decimal_digits.offset, layout.decimal_digits.endian)
            .ok_or_else(truncated)?;

        Ok(Column {
            name,
            type_: ColumnType::from_code(code),
            offset,
            length,
            decimal_digits,
        })
    }

    /// Reads exactly one descriptor from the stream and parses it.
    pub fn read_from<R: Read>(
        reader: &mut R,
        layout: &DescriptorLayout,
        index: usize,
    ) -> Result<Column> {
        let mut block = [0u8; COLUMN_DESCRIPTOR_LENGTH];
        reader.read_exact(&mut block).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::TruncatedDescriptor { index },
            _ => Error::DescriptorRead { index, source: e },
        })?;
        let column = Column::from_descriptor(&block, layout, index)?;
        trace!(
            index,
            name = column.name.as_str(),
            type_ = %column.type_,
            offset = column.offset,
            length = column.length,
            "Parsed column descriptor."
        );
        Ok(column)
    }

    pub fn is_primary_key(&self) -> bool {
        self.type_ == ColumnType::AutoIncrement
    }
}
