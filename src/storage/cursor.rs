use bincode::{config, decode_from_slice, Decode};

/// Byte order of a fixed-width field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Read-only view over a byte slice that decodes fixed-width integers
/// at explicit offsets. Every read is bounds-checked and yields `None`
/// instead of reading past the slice.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteCursor { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn slice(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.bytes.get(offset..end)
    }

    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    pub fn u16_at(&self, offset: usize, endian: Endian) -> Option<u16> {
        self.read(offset, 2, endian)
    }

    pub fn i16_at(&self, offset: usize, endian: Endian) -> Option<i16> {
        self.read(offset, 2, endian)
    }

    pub fn u32_at(&self, offset: usize, endian: Endian) -> Option<u32> {
        self.read(offset, 4, endian)
    }

    pub fn i32_at(&self, offset: usize, endian: Endian) -> Option<i32> {
        self.read(offset, 4, endian)
    }

    pub fn f64_at(&self, offset: usize, endian: Endian) -> Option<f64> {
        self.read(offset, 8, endian)
    }

    // Legacy config is fixed-int, so `width` bytes are consumed exactly.
    fn read<T: Decode<()>>(&self, offset: usize, width: usize, endian: Endian) -> Option<T> {
        let src = self.slice(offset, width)?;
        let decoded = match endian {
            Endian::Little => decode_from_slice::<T, _>(src, config::legacy()),
            Endian::Big => decode_from_slice::<T, _>(src, config::legacy().with_big_endian()),
        };
        decoded.ok().map(|(value, _)| value)
    }
}
