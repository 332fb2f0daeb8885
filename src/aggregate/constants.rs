pub const FIELD_USER_ID: &str = "User ID";
pub const FIELD_TIMESTAMP: &str = "TimeStamp";
pub const FIELD_ACTIVITY: &str = "Activity";
pub const FIELD_COUNT: &str = "Count";
pub const FIELD_IP_ADDRESS: &str = "IP Address";

/// Required header columns, in the order records are checked.
pub const REQUIRED_FIELDS: [&str; 5] = [
    FIELD_USER_ID,
    FIELD_TIMESTAMP,
    FIELD_ACTIVITY,
    FIELD_COUNT,
    FIELD_IP_ADDRESS,
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_BATCH_SIZE: usize = 5000;
pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_MEMORY_USAGE_PERCENT: f64 = 25.0;
pub const DEFAULT_IO_BUFFER_SIZE_KB: usize = 64;
pub const DEFAULT_OUTPUT_FILE: &str = "aggregated_activities.json";

pub const MIN_MEMORY_USAGE_PERCENT: f64 = 1.0;
pub const MAX_MEMORY_USAGE_PERCENT: f64 = 90.0;
pub const MIN_AUTO_BATCH_SIZE: usize = 1000;
pub const MAX_BATCH_SIZE: usize = 10_000_000;
pub const MIN_IO_BUFFER_SIZE_KB: usize = 4;
pub const MAX_IO_BUFFER_SIZE_KB: usize = 16 * 1024;

/// Rough in-memory footprint of one raw row plus its share of the aggregate.
pub const ESTIMATED_RECORD_SIZE_BYTES: usize = 256;

pub const JSON_INDENT: &[u8] = b"    ";
