pub const BYTES_PER_KB: usize = 1024;
pub const PERCENT_100: f64 = 100.0;
