//! Labelled self-comparison table for training a strategy classifier
//!
//! Every configured strategy enters one Ashlock tournament several times. The
//! reduced table is compared with itself and each pair is labelled with whether
//! both rows came from the same strategy. Strategies passed with `--holdout` are
//! left out of that table and compared against it in `holdout_table.csv`.
//!
//! Usage:
//!   cargo run --release --bin training_table -- fingerprint/experiments/training_table.toml

use clap::Parser;
use fingerprint::output::RunMetadata;
use fingerprint::{AshlockTournament, ExperimentConfig, combine, training_table};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(version, about = "Build the labelled strategy comparison table")]
struct Args {
    /// Experiment configuration (TOML)
    config: PathBuf,

    /// Overrides `training.copies`
    #[arg(long)]
    copies: Option<usize>,

    /// Strategy keys to keep out of the training table, e.g. `grudger,random:0.3`
    #[arg(long, value_delimiter = ',')]
    holdout: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = ExperimentConfig::from_path(&args.config)?;
    let copies = args.copies.unwrap_or(config.training.copies);
    let strategies = &config.training.strategies;

    println!("=== Training Table ===\n");
    println!("Experiment: {}", config.experiment.name);
    println!(
        "Configuration: {} strategies x {} copies, step {}\n",
        strategies.len(),
        copies,
        config.tournament.step
    );

    let targets: Vec<_> = strategies
        .iter()
        .flat_map(|s| std::iter::repeat_n(s.clone(), copies))
        .collect();

    let start = Instant::now();
    let tournament = AshlockTournament::build(targets, &config.ashlock())?;
    let reduced = tournament.run(&config.engine())?;
    let holdout: Vec<&str> = args.holdout.iter().map(String::as_str).collect();
    let (held_out, kept) = reduced.split(&holdout);
    let training = training_table(&kept);

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir)?;
    let reduced_path = output_dir.join("reduced_summary.csv");
    let training_path = output_dir.join("training_table.csv");
    reduced.write_csv(&reduced_path)?;
    training.write_csv(&training_path)?;
    if !held_out.is_empty() {
        let holdout_path = output_dir.join("holdout_table.csv");
        let comparison = combine(&held_out, &kept, None);
        comparison.write_csv(&holdout_path)?;
        println!(
            "Holdout rows: {} -> {}",
            comparison.len(),
            holdout_path.display()
        );
    }
    let elapsed = start.elapsed();

    let equivalent = training
        .rows()
        .iter()
        .filter(|r| r.equivalent == Some(true))
        .count();
    println!("Reduced rows: {} -> {}", reduced.len(), reduced_path.display());
    println!(
        "Training rows: {} ({} equivalent) -> {}",
        training.len(),
        equivalent,
        training_path.display()
    );
    println!("Elapsed: {:.1}s", elapsed.as_secs_f64());

    if config.output.write_metadata {
        let mut metadata = RunMetadata::new(&config);
        metadata.rows_written = training.len();
        metadata.elapsed_secs = elapsed.as_secs_f64();
        metadata.write_json(output_dir.join("training_metadata.json"))?;
    }

    Ok(())
}
