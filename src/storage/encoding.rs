use super::column::{Column, ColumnType};
use super::cursor::{ByteCursor, Endian};
use super::julian;
use super::memo::{MemoPointer, MEMO_POINTER_LENGTH};
use super::row::Value;
use crate::errors::{Error, Result};
use time::Duration;

/// Bit pattern the format stores in a null double/currency field.
pub const NULL_DOUBLE_BITS: u64 = 0x8000_0000_0000_0020;

/// Output of decoding one column. Memo columns need a second pass
/// against the memo file before they become a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Resolved(Value),
    NeedsMemoLookup(MemoPointer),
}

impl ColumnType {
    /// Minimum number of bytes a column of this type must span.
    pub fn min_size(&self) -> usize {
        match self {
            ColumnType::Bool => 1,
            ColumnType::ShortInt => 2,
            ColumnType::Int | ColumnType::AutoIncrement | ColumnType::Date | ColumnType::Time => 4,
            ColumnType::Double | ColumnType::Currency | ColumnType::Timestamp => 8,
            ColumnType::Memo => MEMO_POINTER_LENGTH,
            ColumnType::Character
            | ColumnType::CiCharacter
            | ColumnType::Blob
            | ColumnType::Unknown(_) => 0,
        }
    }

    /// Decodes the field bytes of one column. `buffer` holds exactly the
    /// `[offset, offset + length)` range of the record.
    pub fn from_fixed_bytes(&self, buffer: &[u8]) -> Option<Decoded> {
        let cursor = ByteCursor::new(buffer);
        let value = match self {
            ColumnType::Bool => Value::Bool(cursor.u8_at(0)? == b'T'),
            ColumnType::Character | ColumnType::CiCharacter => Value::Text(
                String::from_utf8_lossy(buffer)
                    .trim_end_matches(|c: char| c == ' ' || c == '\0')
                    .to_string(),
            ),
            ColumnType::ShortInt => match cursor.i16_at(0, Endian::Little)? {
                i16::MIN => Value::Null,
                v => Value::SmallInt(v),
            },
            ColumnType::Int => match cursor.i32_at(0, Endian::Little)? {
                i32::MIN => Value::Null,
                v => Value::Int(v),
            },
            ColumnType::AutoIncrement => Value::UInt(cursor.u32_at(0, Endian::Little)?),
            ColumnType::Double | ColumnType::Currency => {
                let v = cursor.f64_at(0, Endian::Little)?;
                if v.to_bits() == NULL_DOUBLE_BITS {
                    Value::Null
                } else {
                    Value::Double(v)
                }
            }
            ColumnType::Date => match cursor.u32_at(0, Endian::Little)? {
                0 => Value::Null,
                day => Value::Date(julian::day_to_date(day)),
            },
            ColumnType::Time => {
                let seconds = cursor.u32_at(0, Endian::Little)?;
                Value::Duration(Duration::seconds(i64::from(seconds)))
            }
            ColumnType::Timestamp => {
                let day = cursor.u32_at(0, Endian::Little)?;
                let ms = cursor.u32_at(4, Endian::Little)?;
                if day == 0 {
                    Value::Null
                } else {
                    Value::DateTime(julian::day_ms_to_datetime(day, ms))
                }
            }
            ColumnType::Blob => Value::Bytes(buffer.to_vec()),
            ColumnType::Memo => {
                return Some(Decoded::NeedsMemoLookup(MemoPointer {
                    block_offset: cursor.u32_at(0, Endian::Little)?,
                    length: cursor.u16_at(4, Endian::Little)?,
                }))
            }
            ColumnType::Unknown(_) => return None,
        };
        Some(Decoded::Resolved(value))
    }
}

/// Decodes one column out of a full record buffer. Never reads outside
/// the column's own byte range.
pub fn decode_column(record: &[u8], column: &Column, index: usize) -> Result<Decoded> {
    if let ColumnType::Unknown(code) = column.type_ {
        return Err(Error::UnsupportedColumnType {
            record: index,
            column: column.name.clone(),
            code,
        });
    }
    let out_of_range = || Error::FieldOutOfRange {
        record: index,
        column: column.name.clone(),
    };
    if (column.length as usize) < column.type_.min_size() {
        return Err(out_of_range());
    }
    let field = ByteCursor::new(record)
        .slice(column.offset as usize, column.length as usize)
        .ok_or_else(out_of_range)?;
    column.type_.from_fixed_bytes(field).ok_or_else(out_of_range)
}
