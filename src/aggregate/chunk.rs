use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::sync::Arc;
use tracing::debug;
use crate::aggregate::config::SiftConfig;
use crate::aggregate::constants::REQUIRED_FIELDS;
use crate::aggregate::error::{Result, SiftError};
use crate::aggregate::record::RawRecord;

/// Required columns that `headers` does not declare, in canonical order.
pub fn missing_fields(headers: &StringRecord) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| !headers.iter().any(|name| name == **field))
        .map(|field| field.to_string())
        .collect()
}

pub fn check_schema(headers: &StringRecord) -> Result<()> {
    let missing = missing_fields(headers);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SiftError::Schema { missing })
    }
}

/// Reads delimited input in batches of at most `batch_size` rows.
///
/// The header is read and checked on construction, so a reader that exists
/// has already passed the schema check.
pub struct ChunkReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Arc<StringRecord>,
    batch_size: usize,
    rows_read: u64,
    exhausted: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(source: R, config: &SiftConfig, batch_size: usize) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(config.delimiter_byte())
            .has_headers(true)
            .flexible(true)
            .buffer_capacity(config.io_buffer_size_bytes())
            .from_reader(source);

        let headers = reader.headers()?.clone();
        check_schema(&headers)?;
        debug!("Input columns: {:?}", headers.iter().collect::<Vec<_>>());

        Ok(Self {
            reader,
            headers: Arc::new(headers),
            batch_size: batch_size.max(1),
            rows_read: 0,
            exhausted: false,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Next batch of rows, or `None` once the input is exhausted.
    pub fn next_batch(&mut self) -> Result<Option<Vec<RawRecord>>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut batch = Vec::with_capacity(self.batch_size.min(4096));
        while batch.len() < self.batch_size {
            let mut values = StringRecord::new();
            if !self.reader.read_record(&mut values)? {
                self.exhausted = true;
                break;
            }

            self.rows_read += 1;
            // Header is line 1
            let line = values
                .position()
                .map(|pos| pos.line())
                .unwrap_or(self.rows_read + 1);
            batch.push(RawRecord::new(line, Arc::clone(&self.headers), values));
        }

        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Vec<RawRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
