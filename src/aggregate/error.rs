use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fatal errors that abort a run. No output document is written when one of
/// these is returned.
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Missing expected columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SiftError>;

/// Why a single record was dropped. These never abort a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),

    #[error("count '{0}' is not a non-negative integer")]
    MalformedCount(String),

    #[error("invalid IPv4 address '{0}'")]
    MalformedIp(String),

    #[error("timestamp '{0}' does not match YYYY-MM-DD HH:MM:SS")]
    MalformedTimestamp(String),

    #[error("duplicate record")]
    DuplicateRecord,
}

impl RejectReason {
    pub fn kind(&self) -> RejectKind {
        match self {
            RejectReason::MissingField(_) => RejectKind::MissingField,
            RejectReason::MalformedCount(_) => RejectKind::MalformedCount,
            RejectReason::MalformedIp(_) => RejectKind::MalformedIp,
            RejectReason::MalformedTimestamp(_) => RejectKind::MalformedTimestamp,
            RejectReason::DuplicateRecord => RejectKind::DuplicateRecord,
        }
    }
}

/// Detail-free rejection category, used as the key of the stats breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RejectKind {
    MissingField,
    MalformedCount,
    MalformedIp,
    MalformedTimestamp,
    DuplicateRecord,
}

impl RejectKind {
    pub const ALL: [RejectKind; 5] = [
        RejectKind::MissingField,
        RejectKind::MalformedCount,
        RejectKind::MalformedIp,
        RejectKind::MalformedTimestamp,
        RejectKind::DuplicateRecord,
    ];
}

impl fmt::Display for RejectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RejectKind::MissingField => "MissingField",
            RejectKind::MalformedCount => "MalformedCount",
            RejectKind::MalformedIp => "MalformedIp",
            RejectKind::MalformedTimestamp => "MalformedTimestamp",
            RejectKind::DuplicateRecord => "DuplicateRecord",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_missing_columns() {
        let err = SiftError::Schema {
            missing: vec!["Count".to_string(), "IP Address".to_string()],
        };
        assert_eq!(err.to_string(), "Missing expected columns: Count, IP Address");
    }

    #[test]
    fn test_reason_kind_mapping() {
        assert_eq!(RejectReason::MissingField("Count").kind(), RejectKind::MissingField);
        assert_eq!(RejectReason::MalformedCount("abc".into()).kind(), RejectKind::MalformedCount);
        assert_eq!(RejectReason::MalformedIp("999.1.1.1".into()).kind(), RejectKind::MalformedIp);
        assert_eq!(RejectReason::DuplicateRecord.kind(), RejectKind::DuplicateRecord);
        assert_eq!(RejectReason::DuplicateRecord.to_string(), "duplicate record");
    }
}
