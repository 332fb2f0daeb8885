use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::aggregate::config::IpValidation;
use crate::aggregate::constants::*;
use crate::aggregate::error::RejectReason;
use crate::aggregate::record::{RawRecord, ValidatedRecord};

pub static STRICT_IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])(\.(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])){3}$").unwrap()
});

pub static PERMISSIVE_IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+$").unwrap()
});

// chrono alone accepts unpadded fields, so the shape is checked first
static TIMESTAMP_SHAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$").unwrap()
});

pub fn is_valid_ipv4(ip: &str, mode: IpValidation) -> bool {
    match mode {
        IpValidation::Strict => STRICT_IPV4_REGEX.is_match(ip),
        IpValidation::Permissive => PERMISSIVE_IPV4_REGEX.is_match(ip),
    }
}

pub fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    if !TIMESTAMP_SHAPE_REGEX.is_match(timestamp) {
        return None;
    }
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok()
}

pub fn parse_count(count: &str) -> Option<u64> {
    count.trim().parse::<u64>().ok()
}

/// Turns raw rows into typed records. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator {
    ip_validation: IpValidation,
}

impl RecordValidator {
    pub fn new(ip_validation: IpValidation) -> Self {
        Self { ip_validation }
    }

    pub fn ip_validation(&self) -> IpValidation {
        self.ip_validation
    }

    /// Checks presence, count, IP and timestamp in that order and stops at
    /// the first failure.
    pub fn validate(&self, raw: &RawRecord) -> Result<ValidatedRecord, RejectReason> {
        let user_id = required(raw, FIELD_USER_ID)?;
        let timestamp = required(raw, FIELD_TIMESTAMP)?;
        let activity = required(raw, FIELD_ACTIVITY)?;
        let count = required(raw, FIELD_COUNT)?;
        let ip_address = required(raw, FIELD_IP_ADDRESS)?;

        let count = parse_count(count)
            .ok_or_else(|| RejectReason::MalformedCount(count.to_string()))?;

        if !is_valid_ipv4(ip_address, self.ip_validation) {
            return Err(RejectReason::MalformedIp(ip_address.to_string()));
        }

        let parsed_timestamp = parse_timestamp(timestamp)
            .ok_or_else(|| RejectReason::MalformedTimestamp(timestamp.to_string()))?;

        Ok(ValidatedRecord {
            user_id: user_id.to_string(),
            timestamp: parsed_timestamp,
            activity: activity.to_string(),
            count,
            ip_address: ip_address.to_string(),
        })
    }
}

fn required<'a>(raw: &'a RawRecord, field: &'static str) -> Result<&'a str, RejectReason> {
    match raw.get(field) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RejectReason::MissingField(field)),
    }
}
