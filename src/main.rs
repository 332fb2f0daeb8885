use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use activity_sift::aggregate::constants::DEFAULT_OUTPUT_FILE;
use activity_sift::aggregate::serializer::write_json_file;
use activity_sift::aggregate::{IpValidation, RejectKind};
use activity_sift::utils::{format_bytes, format_duration, setup_logging};
use activity_sift::{aggregate_file, SiftConfig};

#[derive(Parser)]
#[command(name = "activity-sift")]
#[command(about = "Activity Sift - validates, deduplicates and aggregates user activity CSV logs into per-user JSON")]
#[command(version)]
struct Args {
    #[arg(short, long, help = "Input CSV file with User ID, TimeStamp, Activity, Count and IP Address columns")]
    input: PathBuf,

    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE, help = "Output JSON file")]
    output: PathBuf,

    #[arg(short, long, help = "Configuration file (created with defaults if missing)")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Records per batch (0 sizes batches from available memory)")]
    batch_size: Option<usize>,

    #[arg(long, help = "Accept any digit run as an IP octet instead of 0-255")]
    permissive_ip: bool,

    #[arg(short, long, help = "Field delimiter")]
    delimiter: Option<char>,

    #[arg(short, long, help = "Write run statistics as JSON to this file")]
    report: Option<PathBuf>,

    #[arg(short, long, help = "Verbose output")]
    verbose: bool,

    #[arg(short, long, help = "Only log errors")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) if path.exists() => SiftConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        Some(path) => {
            println!("📄 Config file not found, creating default: {}", path.display());
            let default_config = SiftConfig::default();
            default_config.to_file(path)?;
            default_config
        }
        None => SiftConfig::default(),
    };

    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if args.permissive_ip {
        config.ip_validation = IpValidation::Permissive;
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if args.verbose {
        config.verbose = true;
    }

    let verbosity = if args.quiet {
        "silent"
    } else if config.verbose {
        "verbose"
    } else {
        "normal"
    };
    setup_logging(verbosity)?;

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    println!("🧙 Activity Sift");
    println!("🔍 Input: {}", args.input.display());
    println!("📝 Output: {}", args.output.display());

    let input_size = std::fs::metadata(&args.input)?.len();
    println!("📊 Input size: {}", format_bytes(input_size));

    if config.batch_size == 0 {
        println!("🧠 Memory budget: {}", format_bytes(config.memory_limit_bytes() as u64));
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let start_time = Instant::now();
    let stats = aggregate_file(&args.input, &args.output, config)
        .with_context(|| format!("Failed to aggregate {}", args.input.display()))?;
    let total_time = start_time.elapsed();

    if let Some(report) = &args.report {
        write_json_file(report, &stats)?;
        info!("Run report written to {}", report.display());
    }

    println!("\n🎉 Aggregation completed successfully! 🎉");
    println!("=======================================");
    println!("📊 Total rows: {}", stats.total_rows);
    println!("✨ Accepted records: {}", stats.accepted_records);
    println!("🗑️ Rejected records: {} ({:.2}%)",
        stats.rejected_total(),
        100.0 * stats.rejection_rate()
    );
    for kind in RejectKind::ALL {
        let count = stats.rejected_for(kind);
        if count > 0 {
            println!("   • {}: {}", kind, count);
        }
    }
    println!("👤 Users: {}", stats.unique_users);
    println!("📦 Batches: {} x {} records", stats.batches_processed, stats.batch_size);
    println!("⏱️ Total time: {}", format_duration(total_time.as_secs_f64()));

    Ok(())
}
