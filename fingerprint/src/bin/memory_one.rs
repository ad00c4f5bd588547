//! Memory-one deviation sweep
//!
//! Compares every memory-one vector on a grid with its epsilon neighbours and
//! streams the comparison rows to `<output>/<name>/memory_one_compare.csv`.
//!
//! Usage:
//!   cargo run --release --bin memory_one -- fingerprint/experiments/memory_one_sweep.toml

use clap::Parser;
use fingerprint::output::RunMetadata;
use fingerprint::{DeviationSweep, ExperimentConfig, memory_one_vectors};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(version, about = "Compare memory-one strategies with their epsilon neighbours")]
struct Args {
    /// Experiment configuration (TOML)
    config: PathBuf,

    /// Only sweep the first N vectors
    #[arg(long)]
    limit: Option<usize>,

    /// Remove an existing comparison file instead of appending to it
    #[arg(long, default_value_t = false)]
    fresh: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = ExperimentConfig::from_path(&args.config)?;
    println!("=== Memory-One Deviation Sweep ===\n");
    println!("Experiment: {}", config.experiment.name);
    if !config.experiment.description.is_empty() {
        println!("Description: {}", config.experiment.description);
    }

    let mut vectors = memory_one_vectors(config.deviation.q_num);
    if let Some(limit) = args.limit {
        vectors.truncate(limit);
    }
    println!(
        "Configuration: {} vectors x {} epsilons, step {}, {} turns x {} repetitions\n",
        vectors.len(),
        config.deviation.epsilons.len(),
        config.tournament.step,
        config.tournament.turns,
        config.tournament.repetitions
    );

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir)?;
    let csv_path = output_dir.join("memory_one_compare.csv");
    if csv_path.exists() {
        if args.fresh {
            fs::remove_file(&csv_path)?;
        } else {
            log::warn!("appending to existing {}", csv_path.display());
        }
    }

    let engine = config.engine();
    let mut sweep = DeviationSweep::new(
        vectors,
        config.deviation.epsilons.clone(),
        config.ashlock(),
        &engine,
    )
    .batch_size(config.deviation.batch_size);
    if let Some(n) = config.deviation.num_threads {
        sweep = sweep.num_threads(n);
    }

    let start = Instant::now();
    let report = sweep.run_to_csv(&csv_path)?;
    let elapsed = start.elapsed();

    println!("\nCompleted: {} vector/epsilon blocks", report.completed);
    println!("Rows written: {}", report.rows_written);
    if !report.failed.is_empty() {
        println!("Failed: {} units", report.failed.len());
    }
    println!("Elapsed: {:.1}s", elapsed.as_secs_f64());
    println!("Output: {}", csv_path.display());

    if config.output.write_metadata {
        let mut metadata = RunMetadata::new(&config);
        metadata.rows_written = report.rows_written;
        metadata.failed_units = report.failed;
        metadata.elapsed_secs = elapsed.as_secs_f64();
        metadata.write_json(output_dir.join("memory_one_metadata.json"))?;
    }

    Ok(())
}
