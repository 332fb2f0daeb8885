pub mod accumulator;
pub mod chunk;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod error;
pub mod processor;
pub mod record;
pub mod serializer;
pub mod validation;

#[cfg(test)]
mod tests;

pub use accumulator::{GlobalAccumulator, UserAccumulator};
pub use config::{IpValidation, SiftConfig};
pub use dedup::Deduplicator;
pub use error::{RejectKind, RejectReason, Result, SiftError};
pub use processor::{process, BatchProcessor, ProcessingOutcome, ProcessingStats};
pub use record::{RawRecord, RecordFingerprint, ValidatedRecord};
pub use validation::RecordValidator;

use std::path::Path;
use tracing::info;

/// Aggregates `input_file` into `output_file`.
///
/// The output document is written only after the whole input has been
/// processed; a fatal error leaves no output behind.
pub fn aggregate_file(
    input_file: &Path,
    output_file: &Path,
    config: SiftConfig,
) -> Result<ProcessingStats> {
    let processor = BatchProcessor::new(config)?;
    let outcome = processor.process_file(input_file)?;

    serializer::write_json_file(output_file, &outcome.accumulator)?;
    info!(
        "Wrote {} users to {}",
        outcome.accumulator.len(),
        output_file.display()
    );

    Ok(outcome.stats)
}
