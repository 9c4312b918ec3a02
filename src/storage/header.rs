use super::column::COLUMN_DESCRIPTOR_LENGTH;
use super::cursor::{ByteCursor, Endian};
use crate::errors::{Error, Result};
use std::io::Read;
use tracing::debug;

pub const HEADER_LENGTH: usize = 400;
pub const MAGIC_HEADER: &str = "Advantage Table";

const RECORD_COUNT_OFFSET: usize = 24;
const DATA_OFFSET_OFFSET: usize = 32;
const RECORD_LENGTH_OFFSET: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    /// Number of records in the table.
    pub record_count: u32,
    /// Byte offset of the first record; descriptors fill the gap after the header.
    pub data_offset: u16,
    /// Fixed size of every record.
    pub record_length: u32,
}

impl TableHeader {
    pub fn decode(bytes: &[u8]) -> Result<TableHeader> {
        if bytes.len() < HEADER_LENGTH {
            return Err(Error::TruncatedHeader { read: bytes.len() });
        }
        if !bytes.starts_with(MAGIC_HEADER.as_bytes()) {
            return Err(Error::MagicMismatch);
        }

        let cursor = ByteCursor::new(bytes);
        let truncated = || Error::TruncatedHeader { read: bytes.len() };
        let header = TableHeader {
            record_count: cursor
                .u32_at(RECORD_COUNT_OFFSET, Endian::Little)
                .ok_or_else(truncated)?,
            data_offset: cursor
                .u16_at(DATA_OFFSET_OFFSET, Endian::Little)
                .ok_or_else(truncated)?,
            record_length: cursor
                .u32_at(RECORD_LENGTH_OFFSET, Endian::Little)
                .ok_or_else(truncated)?,
        };
        header.column_count()?;
        Ok(header)
    }

    /// Reads the header from the start of the stream, leaving the stream
    /// positioned at the first column descriptor.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<TableHeader> {
        let mut buf = Vec::with_capacity(HEADER_LENGTH);
        reader
            .by_ref()
            .take(HEADER_LENGTH as u64)
            .read_to_end(&mut buf)
            .map_err(|source| Error::HeaderRead { source })?;
        let header = TableHeader::decode(&buf)?;
        debug!(
            record_count = header.record_count,
            data_offset = header.data_offset,
            record_length = header.record_length,
            "Decoded table header."
        );
        Ok(header)
    }

    /// Number of column descriptors between the header and the first record.
    pub fn column_count(&self) -> Result<usize> {
        let data_offset = self.data_offset as usize;
        let invalid = Error::InvalidLayout {
            data_offset: self.data_offset,
        };
        let region = data_offset.checked_sub(HEADER_LENGTH).ok_or(invalid)?;
        if region % COLUMN_DESCRIPTOR_LENGTH != 0 {
            return Err(Error::InvalidLayout {
                data_offset: self.data_offset,
            });
        }
        Ok(region / COLUMN_DESCRIPTOR_LENGTH)
    }
}
