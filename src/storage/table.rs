use super::column::{Column, DescriptorLayout};
use super::encoding::{self, Decoded};
use super::header::TableHeader;
use super::memo;
use super::row::{Record, Value};
use crate::errors::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Knobs for opening a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Descriptor byte layout of the file's format revision.
    pub layout: DescriptorLayout,
}

/// An open table file and its optional memo file.
///
/// Reads seek the underlying streams, so a `Table` serves one reader at a
/// time; open another handle for concurrent access. Both streams are
/// closed when the table is dropped.
pub struct Table<R, M = R> {
    header: TableHeader,
    columns: Vec<Column>,
    data: R,
    memo: Option<M>,
}

impl Table<File> {
    /// Opens `path` and, when present, the memo file next to it.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &TableOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = open_file(path)?;
        let memo = match memo_path(path) {
            Some(p) => {
                debug!(path = %p.display(), "Opening memo file...");
                Some(open_file(&p)?)
            }
            None => None,
        };
        let table = Table::open(data, memo, options)?;
        info!(
            path = %path.display(),
            records = table.record_count(),
            columns = table.column_count(),
            "Opened table."
        );
        Ok(table)
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// The memo file shares the table's stem with an `.ADM` extension.
pub fn memo_path(path: &Path) -> Option<PathBuf> {
    ["ADM", "adm"]
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|p| p.is_file())
}

impl<R: Read + Seek, M: Read + Seek> Table<R, M> {
    /// Parses the header and every column descriptor.
    pub fn open(mut data: R, memo: Option<M>, options: &TableOptions) -> Result<Self> {
        data.seek(SeekFrom::Start(0))
            .map_err(|source| Error::HeaderRead { source })?;
        let header = TableHeader::read_from(&mut data)?;
        let column_count = header.column_count()?;

        let mut columns = Vec::with_capacity(column_count);
        for index in 0..column_count {
            columns.push(Column::read_from(&mut data, &options.layout, index)?);
        }
        debug!(
            columns = columns.len(),
            memo = memo.is_some(),
            "Parsed table schema."
        );

        Ok(Table {
            header,
            columns,
            data,
            memo,
        })
    }

    /// Reads and decodes the record at `index` (0-based). The index is not
    /// checked against the record count; reads past the end fail.
    pub fn get(&mut self, index: usize) -> Result<Record> {
        let offset = (index as u64)
            .checked_mul(u64::from(self.header.record_length))
            .and_then(|o| o.checked_add(u64::from(self.header.data_offset)))
            .ok_or_else(|| Error::RecordRead {
                record: index,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "record offset overflows",
                ),
            })?;

        // `record_length` comes from the file; the buffer holds only bytes read.
        let length = u64::from(self.header.record_length);
        let mut buf = Vec::new();
        let read = self
            .data
            .seek(SeekFrom::Start(offset))
            .and_then(|_| (&mut self.data).take(length).read_to_end(&mut buf))
            .and_then(|n| {
                if n as u64 == length {
                    Ok(())
                } else {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("read {} of {} bytes", n, length),
                    ))
                }
            });
        if let Err(e) = read {
            warn!(record = index, offset, "Didn't read enough for record. {}", e);
            return Err(Error::RecordRead {
                record: index,
                source: e,
            });
        }
        trace!(record = index, offset, "Read record.");

        let mut record = Record::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = match encoding::decode_column(&buf, column, index)? {
                Decoded::Resolved(value) => value,
                Decoded::NeedsMemoLookup(pointer) => Value::Text(memo::resolve(
                    self.memo.as_mut(),
                    pointer,
                    index,
                    &column.name,
                )?),
            };
            record.insert(column.name.clone(), value);
        }
        Ok(record)
    }

    /// Sequentially reads the records in `range`.
    pub fn scan(&mut self, range: Range<usize>) -> Scan<'_, R, M> {
        Scan { table: self, range }
    }
}

impl<R, M> Table<R, M> {
    /// The auto-increment column, if any. The format allows at most one.
    pub fn primary_key_column(&self) -> Result<Option<&Column>> {
        let mut result: Option<&Column> = None;
        for column in self.columns.iter().filter(|c| c.is_primary_key()) {
            if let Some(first) = result {
                return Err(Error::MultiplePrimaryKeys {
                    first: first.name.clone(),
                    second: column.name.clone(),
                });
            }
            result = Some(column);
        }
        Ok(result)
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn record_count(&self) -> u32 {
        self.header.record_count
    }

    pub fn record_length(&self) -> u32 {
        self.header.record_length
    }

    pub fn data_offset(&self) -> u16 {
        self.header.data_offset
    }

    pub fn has_memo(&self) -> bool {
        self.memo.is_some()
    }
}

/// Iterator returned by [`Table::scan`].
pub struct Scan<'a, R, M> {
    table: &'a mut Table<R, M>,
    range: Range<usize>,
}

impl<R: Read + Seek, M: Read + Seek> Iterator for Scan<'_, R, M> {
    type Item = Result<(usize, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        Some(self.table.get(index).map(|r| (index, r)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::column::tests::descriptor;
    use crate::storage::column::ColumnType;
    use crate::storage::header::tests::header_bytes;
    use crate::storage::header::HEADER_LENGTH;
    use std::io::Cursor;
    use tempfile::tempdir;

    /// Builds a table file from (name, type code, length) columns and raw
    /// record bytes laid out back to back.
    pub(crate) fn table_bytes(columns: &[(&str, u8, u16)], records: &[Vec<u8>]) -> Vec<u8> {
        let record_length: u16 = columns.iter().map(|c| c.2).sum();
        let data_offset = (HEADER_LENGTH + columns.len() * 200) as u16;
        let mut bytes = header_bytes(records.len() as u32, data_offset, record_length as u32);
        let mut offset = 0;
        for (name, code, length) in columns {
            bytes.extend_from_slice(&descriptor(name, *code, offset, *length));
            offset += length;
        }
        for record in records {
            assert_eq!(record.len(), record_length as usize);
            bytes.extend_from_slice(record);
        }
        bytes
    }

    fn record(name: &[u8; 5], n: i32) -> Vec<u8> {
        let mut r = name.to_vec();
        r.extend_from_slice(&n.to_le_bytes());
        r
    }

    fn two_column_table() -> Table<Cursor<Vec<u8>>> {
        let bytes = table_bytes(
            &[("NAME", 4, 5), ("QTY", 11, 4)],
            &[record(b"AB \0\0", 42), record(b"XYZ  ", i32::MIN)],
        );
        Table::open(Cursor::new(bytes), None, &TableOptions::default()).unwrap()
    }

    #[test]
    fn test_open_and_get() {
        let mut table = two_column_table();
        assert_eq!(table.record_count(), 2);
        assert_eq!(table.record_length(), 9);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.columns()[1].type_, ColumnType::Int);

        let first = table.get(0).unwrap();
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["NAME", "QTY"]);
        assert_eq!(first.get("NAME"), Some(&Value::Text("AB".into())));
        assert_eq!(first.get("QTY"), Some(&Value::Int(42)));

        let second = table.get(1).unwrap();
        assert_eq!(second.keys().collect::<Vec<_>>(), vec!["NAME", "QTY"]);
        assert_eq!(second.get("NAME"), Some(&Value::Text("XYZ".into())));
        assert_eq!(second.get("QTY"), Some(&Value::Null));
    }

    #[test]
    fn test_get_past_end_fails() {
        let mut table = two_column_table();
        let err = table.get(2).unwrap_err();
        assert!(matches!(err, Error::RecordRead { record: 2, .. }));
        // The table stays usable after a failed read.
        assert!(table.get(0).is_ok());
    }

    #[test]
    fn test_empty_table_has_no_valid_index() {
        let bytes = table_bytes(&[("NAME", 4, 5)], &[]);
        let mut table: Table<_> =
            Table::open(Cursor::new(bytes), None, &TableOptions::default()).unwrap();
        assert_eq!(table.record_count(), 0);
        assert!(table.get(0).is_err());
    }

    #[test]
    fn test_short_final_record() {
        let mut bytes = table_bytes(&[("NAME", 4, 5), ("QTY", 11, 4)], &[record(b"AB   ", 1)]);
        bytes.truncate(bytes.len() - 2);
        let mut table: Table<_> =
            Table::open(Cursor::new(bytes), None, &TableOptions::default()).unwrap();
        assert!(matches!(
            table.get(0),
            Err(Error::RecordRead { record: 0, .. })
        ));
    }

    #[test]
    fn test_oversized_record_length_is_short_read() {
        let mut bytes = header_bytes(1, 600, u32::MAX);
        bytes.extend_from_slice(&descriptor("NAME", 4, 0, 5));
        bytes.extend_from_slice(b"hello");
        let mut table: Table<_> =
            Table::open(Cursor::new(bytes), None, &TableOptions::default()).unwrap();
        let err = table.get(0).unwrap_err();
        match err {
            Error::RecordRead { record, source } => {
                assert_eq!(record, 0);
                assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    /// Stream that seeks fine but fails every read.
    struct FailingStream;

    impl Read for FailingStream {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk fault"))
        }
    }

    impl Seek for FailingStream {
        fn seek(&mut self, _: SeekFrom) -> std::io::Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn test_open_read_failure_names_header() {
        let result: Result<Table<FailingStream>> =
            Table::open(FailingStream, None, &TableOptions::default());
        let err = result.err().unwrap();
        assert!(matches!(err, Error::HeaderRead { .. }));
        assert!(err.to_string().contains("header"));
    }

    #[test]
    fn test_descriptor_read_failure_names_index() {
        let layout = DescriptorLayout::STANDARD;
        let err = Column::read_from(&mut FailingStream, &layout, 3).unwrap_err();
        assert!(matches!(err, Error::DescriptorRead { index: 3, .. }));
        assert_eq!(err.to_string(), "[2000] Format Error: descriptor 3: disk fault");
    }

    #[test]
    fn test_truncated_descriptor_fails_open() {
        let mut bytes = table_bytes(&[("A", 4, 1), ("B", 4, 1)], &[]);
        bytes.truncate(HEADER_LENGTH + 250);
        let result: Result<Table<_>> =
            Table::open(Cursor::new(bytes), None, &TableOptions::default());
        assert!(matches!(
            result,
            Err(Error::TruncatedDescriptor { index: 1 })
        ));
    }

    #[test]
    fn test_duplicate_column_names_overwrite() {
        let bytes = table_bytes(
            &[("V", 11, 4), ("W", 11, 4), ("V", 11, 4)],
            &[[1i32, 2, 3].iter().flat_map(|v| v.to_le_bytes()).collect()],
        );
        let mut table: Table<_> =
            Table::open(Cursor::new(bytes), None, &TableOptions::default()).unwrap();
        let r = table.get(0).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("V"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_primary_key_column() {
        let table = two_column_table();
        assert!(table.primary_key_column().unwrap().is_none());

        let bytes = table_bytes(&[("NAME", 4, 5), ("ID", 16, 4)], &[]);
        let table: Table<_> =
            Table::open(Cursor::new(bytes), None, &TableOptions::default()).unwrap();
        assert_eq!(table.primary_key_column().unwrap().unwrap().name, "ID");

        let bytes = table_bytes(&[("ID", 16, 4), ("ID2", 16, 4)], &[]);
        let table: Table<_> =
            Table::open(Cursor::new(bytes), None, &TableOptions::default()).unwrap();
        let err = table.primary_key_column().unwrap_err();
        assert_eq!(err.code(), 3000);
        // Reads still work after the schema error.
        assert_eq!(table.column_count(), 2);
    }

    fn memo_table(block: u32, length: u16) -> Vec<u8> {
        let mut r = 1u32.to_le_bytes().to_vec();
        r.extend_from_slice(&block.to_le_bytes());
        r.extend_from_slice(&length.to_le_bytes());
        r.extend_from_slice(&[0, 0, 0, 0]);
        table_bytes(&[("ID", 16, 4), ("NOTES", 5, 10)], &[r])
    }

    #[test]
    fn test_memo_resolution() {
        let mut memo = vec![0u8; 24];
        memo.extend_from_slice(b"long text");
        let mut table = Table::open(
            Cursor::new(memo_table(3, 9)),
            Some(Cursor::new(memo)),
            &TableOptions::default(),
        )
        .unwrap();
        let r = table.get(0).unwrap();
        assert_eq!(r.get("NOTES"), Some(&Value::Text("long text".into())));
        assert_eq!(r.get("ID"), Some(&Value::UInt(1)));
    }

    #[test]
    fn test_memo_failures_fail_whole_record() {
        let mut table: Table<_> = Table::open(
            Cursor::new(memo_table(3, 9)),
            None,
            &TableOptions::default(),
        )
        .unwrap();
        assert!(matches!(
            table.get(0),
            Err(Error::MemoStreamMissing { record: 0, .. })
        ));

        let mut table = Table::open(
            Cursor::new(memo_table(1_000, 9)),
            Some(Cursor::new(vec![0u8; 32])),
            &TableOptions::default(),
        )
        .unwrap();
        let err = table.get(0).unwrap_err();
        assert!(matches!(err, Error::MemoReadTruncated { ref column, .. } if column == "NOTES"));
    }

    #[test]
    fn test_scan_range() {
        let mut table = two_column_table();
        let rows: Vec<_> = table.scan(0..2).collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].0, 1);
        assert_eq!(rows[1].1.get_column("NAME"), Some("XYZ".into()));
    }

    #[test]
    fn test_from_path_opens_memo_sibling() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("NOTES.ADT");
        std::fs::write(&path, memo_table(1, 4)).unwrap();
        let mut memo = vec![0u8; 8];
        memo.extend_from_slice(b"memo");
        std::fs::write(dir.path().join("NOTES.ADM"), memo).unwrap();

        let mut table = Table::from_path(&path, &TableOptions::default()).unwrap();
        assert!(table.has_memo());
        let r = table.get(0).unwrap();
        assert_eq!(r.get("NOTES"), Some(&Value::Text("memo".into())));
    }

    #[test]
    fn test_from_path_without_memo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("PLAIN.ADT");
        std::fs::write(&path, table_bytes(&[("NAME", 4, 5)], &[b"hello".to_vec()])).unwrap();
        let mut table = Table::from_path(&path, &TableOptions::default()).unwrap();
        assert!(!table.has_memo());
        assert_eq!(
            table.get(0).unwrap().get("NAME"),
            Some(&Value::Text("hello".into()))
        );
    }

    #[test]
    fn test_from_path_missing_file_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MISSING.ADT");
        let err = Table::from_path(&path, &TableOptions::default()).err().unwrap();
        assert!(matches!(err, Error::Open { .. }));
        assert_eq!(err.code(), 1000);
        assert!(err.to_string().contains("MISSING.ADT"));
    }

    #[test]
    fn test_from_path_rejects_bad_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("BAD.ADT");
        std::fs::write(&path, vec![0u8; 800]).unwrap();
        assert!(matches!(
            Table::from_path(&path, &TableOptions::default()),
            Err(Error::MagicMismatch)
        ));
    }
}
