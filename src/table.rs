use crate::io::{source_from_path, SourceMeta};
use crate::layout::{BUCKETS_PER_GROUP, OUTPUT_HEADER};
use crate::{RotateError, RotateResult};
use bytes::Bytes;
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder, ByteRecord, Terminator};
use std::path::Path;
use tokio::io::AsyncRead;

/// Data rows of a results file, in file order. Row `i` is the `i`-th record after the header.
#[derive(Debug, Clone)]
pub struct InputTable {
    header: ByteRecord,
    rows: Vec<ByteRecord>,
}

impl InputTable {
    pub fn new(header: ByteRecord, rows: Vec<ByteRecord>) -> Self {
        Self { header, rows }
    }

    /// The skipped first record, kept only for diagnostics.
    pub fn header(&self) -> &ByteRecord {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw bytes of `column` in data row `row`. A row past the end reports as a
    /// missing field; `pivot` checks the row count before reading any field.
    pub fn field(&self, row: usize, column: usize) -> RotateResult<Bytes> {
        self.rows
            .get(row)
            .and_then(|record| record.get(column))
            .map(Bytes::copy_from_slice)
            .ok_or(RotateError::MissingField { row, column })
    }
}

/// One output line: a case followed by its per-bucket values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatedRow {
    pub case: &'static str,
    pub requests: [Bytes; BUCKETS_PER_GROUP],
    pub transfer: [Bytes; BUCKETS_PER_GROUP],
}

impl RotatedRow {
    /// Fields in output column order.
    pub fn fields(&self) -> impl Iterator<Item = &[u8]> + '_ {
        std::iter::once(self.case.as_bytes())
            .chain(self.requests.iter().map(|b| &b[..]))
            .chain(self.transfer.iter().map(|b| &b[..]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatedTable {
    pub rows: Vec<RotatedRow>,
}

/// Read a UTF-8 results file, decompressing `.gz`/`.zst` by extension.
pub async fn load(path: &Path) -> RotateResult<InputTable> {
    load_with(path, &SourceMeta::for_path(path)).await
}

pub async fn load_with(path: &Path, meta: &SourceMeta) -> RotateResult<InputTable> {
    let reader = source_from_path(path, meta).await?;
    load_from_reader(reader).await
}

/// Parse a results table; the first record is taken as the header and skipped.
pub async fn load_from_reader<R>(reader: R) -> RotateResult<InputTable>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut rdr = AsyncReaderBuilder::new()
        .has_headers(false)
        // rows are only required to be wide enough for the columns we read
        .flexible(true)
        .create_reader(reader);

    let mut records = Vec::new();
    let mut record = ByteRecord::new();
    let mut next_line: Option<u64> = None;
    while rdr.read_byte_record(&mut record).await? {
        // the reader drops blank lines; keep each as an empty row so later indices stay put
        let line = record.position().map(|p| p.line());
        if let (Some(expected), Some(line)) = (next_line, line) {
            for _ in expected..line {
                records.push(ByteRecord::new());
            }
        }
        next_line = line.map(|l| l + 1 + embedded_newlines(&record));
        records.push(record.clone());
    }

    if records.len() < 2 {
        return Err(RotateError::TooFewRows {
            found: records.len().saturating_sub(1),
            required: 1,
        });
    }

    let header = records.remove(0);
    tracing::debug!(rows = records.len(), columns = header.len(), "loaded results table");
    Ok(InputTable::new(header, records))
}

/// Line breaks inside quoted fields, so a multi-line record is not mistaken for blank lines.
fn embedded_newlines(record: &ByteRecord) -> u64 {
    record
        .iter()
        .map(|field| field.iter().filter(|&&b| b == b'\n').count() as u64)
        .sum()
}

/// Serialize the rotated table, header first, with minimal quoting and CRLF line ends.
pub async fn to_csv_bytes(table: &RotatedTable) -> RotateResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut wtr = AsyncWriterBuilder::new()
        .terminator(Terminator::CRLF)
        .create_writer(&mut buf);

    wtr.write_record(OUTPUT_HEADER).await?;
    for row in &table.rows {
        wtr.write_record(row.fields()).await?;
    }
    wtr.flush().await?;
    drop(wtr);

    Ok(buf)
}

/// Write the rotated table to `path`, replacing any existing file.
pub async fn save(table: &RotatedTable, path: &Path) -> RotateResult<()> {
    let bytes = to_csv_bytes(table).await?;
    tokio::fs::write(path, &bytes).await?;
    tracing::info!(path = %path.display(), rows = table.rows.len(), "wrote rotated results");
    Ok(())
}
