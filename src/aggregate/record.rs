use chrono::NaiveDateTime;
use csv::StringRecord;
use std::fmt::{self, Write};
use std::sync::Arc;
use crate::aggregate::constants::TIMESTAMP_FORMAT;

/// One input row as read, keyed by the header names of its source.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub line: u64,
    headers: Arc<StringRecord>,
    values: StringRecord,
}

impl RawRecord {
    pub fn new(line: u64, headers: Arc<StringRecord>, values: StringRecord) -> Self {
        Self { line, headers, values }
    }

    /// Builds a record from `(field, value)` pairs.
    pub fn from_pairs(line: u64, pairs: &[(&str, &str)]) -> Self {
        let headers: StringRecord = pairs.iter().map(|(name, _)| *name).collect();
        let values: StringRecord = pairs.iter().map(|(_, value)| *value).collect();
        Self::new(line, Arc::new(headers), values)
    }

    /// Value of the named column, `None` if the column is absent or the row
    /// is shorter than the header.
    pub fn get(&self, field: &str) -> Option<&str> {
        let index = self.headers.iter().position(|name| name == field)?;
        self.values.get(index)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().zip(self.values.iter())
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}: {:?}", name, value)?;
        }
        f.write_char('}')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    pub user_id: String,
    pub timestamp: NaiveDateTime,
    pub activity: String,
    pub count: u64,
    pub ip_address: String,
}

impl ValidatedRecord {
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn fingerprint(&self) -> RecordFingerprint {
        RecordFingerprint::from_record(self)
    }
}

/// Canonical rendering of a record's five identifying fields.
///
/// Each component is length-prefixed so that values containing the
/// separator cannot make two different records render identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordFingerprint(String);

impl RecordFingerprint {
    pub fn from_record(record: &ValidatedRecord) -> Self {
        let timestamp = record.timestamp_string();
        let count = record.count.to_string();
        let parts = [
            record.user_id.as_str(),
            timestamp.as_str(),
            record.activity.as_str(),
            count.as_str(),
            record.ip_address.as_str(),
        ];

        let capacity: usize = parts.iter().map(|p| p.len() + 8).sum();
        let mut key = String::with_capacity(capacity);
        for part in parts {
            // Writing to a String cannot fail
            let _ = write!(key, "{}:{}|", part.len(), part);
        }
        Self(key)
    }
}

impl fmt::Display for RecordFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
