use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::aggregate::accumulator::GlobalAccumulator;
use crate::aggregate::chunk::ChunkReader;
use crate::aggregate::config::SiftConfig;
use crate::aggregate::constants::MAX_BATCH_SIZE;
use crate::aggregate::dedup::Deduplicator;
use crate::aggregate::error::{RejectKind, RejectReason, Result};
use crate::aggregate::record::RawRecord;
use crate::aggregate::validation::RecordValidator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingStats {
    pub total_rows: u64,
    pub accepted_records: u64,
    pub rejected: BTreeMap<RejectKind, u64>,
    pub batches_processed: usize,
    pub batch_size: usize,
    pub unique_users: usize,
    pub processing_time_ms: u64,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self {
            total_rows: 0,
            accepted_records: 0,
            rejected: RejectKind::ALL.iter().map(|kind| (*kind, 0)).collect(),
            batches_processed: 0,
            batch_size: 0,
            unique_users: 0,
            processing_time_ms: 0,
        }
    }
}

impl ProcessingStats {
    pub fn record_rejection(&mut self, kind: RejectKind) {
        *self.rejected.entry(kind).or_insert(0) += 1;
    }

    pub fn rejected_for(&self, kind: RejectKind) -> u64 {
        self.rejected.get(&kind).copied().unwrap_or(0)
    }

    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }

    pub fn rejection_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.rejected_total() as f64 / self.total_rows as f64
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub accumulator: GlobalAccumulator,
    pub stats: ProcessingStats,
}

/// Drives the read → validate → deduplicate → aggregate → merge loop.
///
/// Each call to [`BatchProcessor::process`] is an independent run with its
/// own seen set, so one processor can be reused for several inputs.
pub struct BatchProcessor {
    config: SiftConfig,
    validator: RecordValidator,
}

impl BatchProcessor {
    pub fn new(config: SiftConfig) -> Result<Self> {
        config.validate()?;
        let validator = RecordValidator::new(config.ip_validation);
        Ok(Self { config, validator })
    }

    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    pub fn process_file(&self, path: &Path) -> Result<ProcessingOutcome> {
        info!("Reading {}", path.display());
        let file = File::open(path)?;
        self.process(file)
    }

    pub fn process<R: Read>(&self, source: R) -> Result<ProcessingOutcome> {
        let start_time = Instant::now();
        let batch_size = self.config.effective_batch_size();
        let mut reader = ChunkReader::new(source, &self.config, batch_size)?;

        info!(
            "Processing in batches of {} records ({:?} IP validation)",
            reader.batch_size(),
            self.validator.ip_validation()
        );

        let mut dedup = Deduplicator::new();
        let mut global = GlobalAccumulator::new();
        let mut stats = ProcessingStats {
            batch_size: reader.batch_size(),
            ..ProcessingStats::default()
        };

        while let Some(batch) = reader.next_batch()? {
            let rows = batch.len();
            let batch_acc = self.process_batch(batch, &mut dedup, &mut stats);
            stats.batches_processed += 1;

            debug!(
                "Batch {}: {} rows, {} users, {} seen fingerprints",
                stats.batches_processed,
                rows,
                batch_acc.len(),
                dedup.len()
            );

            global.merge(batch_acc);
        }

        stats.unique_users = global.len();
        stats.processing_time_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Processed {} rows: {} accepted, {} rejected, {} users",
            stats.total_rows,
            stats.accepted_records,
            stats.rejected_total(),
            stats.unique_users
        );

        Ok(ProcessingOutcome {
            accumulator: global,
            stats,
        })
    }

    /// Builds the batch-local accumulator. Rejected rows are logged and
    /// counted here and go no further.
    fn process_batch(
        &self,
        batch: Vec<RawRecord>,
        dedup: &mut Deduplicator,
        stats: &mut ProcessingStats,
    ) -> GlobalAccumulator {
        let mut batch_acc = GlobalAccumulator::new();

        for raw in batch {
            stats.total_rows += 1;

            let record = match self.validator.validate(&raw) {
                Ok(record) => record,
                Err(reason) => {
                    reject(&raw, reason, stats);
                    continue;
                }
            };

            if !dedup.check_and_record(record.fingerprint()) {
                reject(&raw, RejectReason::DuplicateRecord, stats);
                continue;
            }

            stats.accepted_records += 1;
            batch_acc.fold(record);
        }

        batch_acc
    }
}

fn reject(raw: &RawRecord, reason: RejectReason, stats: &mut ProcessingStats) {
    warn!("Error processing row {} (line {}): {}", raw, raw.line, reason);
    stats.record_rejection(reason.kind());
}

/// Runs one pass over `source` with default settings and the given batch
/// size, clamped to `1..=MAX_BATCH_SIZE`.
pub fn process<R: Read>(source: R, batch_size: usize) -> Result<ProcessingOutcome> {
    let config = SiftConfig {
        batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        ..SiftConfig::default()
    };
    BatchProcessor::new(config)?.process(source)
}
