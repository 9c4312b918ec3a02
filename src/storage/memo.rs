use crate::errors::{Error, Result};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use tracing::{trace, warn};

/// Memo files are addressed in 8-byte blocks.
pub const MEMO_BLOCK_SIZE: u64 = 8;

/// Width of a memo pointer inside a record: u32 block + u16 length.
pub const MEMO_POINTER_LENGTH: usize = 6;

/// Pointer from a record into the memo file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoPointer {
    pub block_offset: u32,
    pub length: u16,
}

impl MemoPointer {
    pub fn byte_offset(&self) -> u64 {
        u64::from(self.block_offset) * MEMO_BLOCK_SIZE
    }

    /// Block 0 never holds a payload that needs the memo file.
    pub fn is_unset(&self) -> bool {
        self.block_offset == 0
    }
}

/// Resolves a memo pointer to text. `record` and `column` only label errors.
pub fn resolve<M: Read + Seek>(
    memo: Option<&mut M>,
    pointer: MemoPointer,
    record: usize,
    column: &str,
) -> Result<String> {
    let memo = match memo {
        Some(m) => m,
        None if pointer.is_unset() => return Ok(String::new()),
        None => {
            return Err(Error::MemoStreamMissing {
                record,
                column: column.to_string(),
            })
        }
    };

    let truncated = || Error::MemoReadTruncated {
        record,
        column: column.to_string(),
        block_offset: pointer.block_offset,
        length: pointer.length,
    };

    let failed = |source| Error::MemoRead {
        record,
        column: column.to_string(),
        source,
    };

    memo.seek(SeekFrom::Start(pointer.byte_offset())).map_err(failed)?;
    let mut data = vec![0u8; pointer.length as usize];
    if let Err(e) = memo.read_exact(&mut data) {
        warn!(record, column, "Didn't read enough for memo field. {}", e);
        return match e.kind() {
            ErrorKind::UnexpectedEof => Err(truncated()),
            _ => Err(failed(e)),
        };
    }
    trace!(
        record,
        column,
        block_offset = pointer.block_offset,
        length = pointer.length,
        "Resolved memo field."
    );
    Ok(String::from_utf8_lossy(&data).into_owned())
}
