// Validation, deduplication and per-user aggregation pipeline
pub mod aggregate;

// Shared unit constants
pub mod constants;

// Logging setup and formatting helpers
pub mod utils;

// Re-export main types for convenience
pub use aggregate::{
    aggregate_file, BatchProcessor, GlobalAccumulator, ProcessingStats, SiftConfig, SiftError,
    UserAccumulator,
};
