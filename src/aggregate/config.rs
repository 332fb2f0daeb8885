use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use crate::aggregate::constants::*;
use crate::aggregate::error::{Result, SiftError};
use crate::constants::{BYTES_PER_KB, PERCENT_100};

/// How strictly the `IP Address` column is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpValidation {
    /// Four octets in 0-255 with no leading zeros.
    #[default]
    Strict,
    /// Four dot-separated digit runs of any length.
    Permissive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Records per batch. Zero sizes batches from available memory.
    pub batch_size: usize,
    pub ip_validation: IpValidation,
    pub delimiter: char,
    pub memory_usage_percent: f64,
    pub io_buffer_size_kb: usize,
    pub verbose: bool,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            ip_validation: IpValidation::Strict,
            delimiter: DEFAULT_DELIMITER,
            memory_usage_percent: DEFAULT_MEMORY_USAGE_PERCENT,
            io_buffer_size_kb: DEFAULT_IO_BUFFER_SIZE_KB,
            verbose: false,
        }
    }
}

impl SiftConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(SiftError::Config(format!(
                "Batch size must not exceed {}",
                MAX_BATCH_SIZE
            )));
        }

        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(SiftError::Config(format!(
                "Delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            )));
        }

        if self.memory_usage_percent < MIN_MEMORY_USAGE_PERCENT
            || self.memory_usage_percent > MAX_MEMORY_USAGE_PERCENT {
            return Err(SiftError::Config(format!(
                "Memory usage percent must be between {} and {}",
                MIN_MEMORY_USAGE_PERCENT, MAX_MEMORY_USAGE_PERCENT
            )));
        }

        if self.io_buffer_size_kb < MIN_IO_BUFFER_SIZE_KB
            || self.io_buffer_size_kb > MAX_IO_BUFFER_SIZE_KB {
            return Err(SiftError::Config(format!(
                "IO buffer size must be between {} and {} KB",
                MIN_IO_BUFFER_SIZE_KB, MAX_IO_BUFFER_SIZE_KB
            )));
        }

        Ok(())
    }

    /// The batch size a run will actually use.
    pub fn effective_batch_size(&self) -> usize {
        if self.batch_size > 0 {
            return self.batch_size;
        }

        let batch_size = (self.memory_limit_bytes() / ESTIMATED_RECORD_SIZE_BYTES)
            .clamp(MIN_AUTO_BATCH_SIZE, MAX_BATCH_SIZE);
        debug!("Auto-sized batches to {} records", batch_size);
        batch_size
    }

    pub fn memory_limit_bytes(&self) -> usize {
        use sysinfo::System;
        let mut system = System::new();
        system.refresh_memory();

        let available_memory = system.available_memory() as f64;
        (available_memory * self.memory_usage_percent / PERCENT_100) as usize
    }

    pub fn io_buffer_size_bytes(&self) -> usize {
        self.io_buffer_size_kb * BYTES_PER_KB
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }
}
