//! Fingerprint one strategy against a grid of Joss-Ann probes
//!
//! Usage:
//!   cargo run --release --bin fingerprint -- --strategy win_stay_lose_shift --step 0.05 \
//!       --output results/wsls_fingerprint.csv

use clap::Parser;
use fingerprint::{Fingerprint, IpdEngine, Point};
use ipd::StrategySpec;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Ashlock fingerprint of an iterated Prisoner's Dilemma strategy")]
struct Args {
    /// Strategy key, e.g. `tit_for_tat` or `memory_one:1,0,1,0`
    #[arg(long, default_value = "tit_for_tat")]
    strategy: StrategySpec,

    /// Base strategy of the probes
    #[arg(long, default_value = "tit_for_tat")]
    probe: StrategySpec,

    #[arg(long, default_value_t = 0.1)]
    step: f64,

    #[arg(long, default_value_t = 200)]
    turns: usize,

    #[arg(long, default_value_t = 10)]
    repetitions: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// CSV file for the x,y,score table
    #[arg(long)]
    output: Option<PathBuf>,

    /// CSV file for the target's reduced summary row
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let engine = IpdEngine {
        turns: args.turns,
        repetitions: args.repetitions,
        seed: args.seed,
    };

    println!("Fingerprint of {} (probe: {})", args.strategy.name(), args.probe.name());
    println!("==================================================\n");

    let fp = Fingerprint::compute(&args.strategy, &args.probe, args.step, &engine)?;

    for row in fp.as_grid().iter().rev() {
        let line: Vec<String> = row.iter().map(|v| format!("{:4.2}", v)).collect();
        println!("  {}", line.join(" "));
    }
    println!();

    if let Some(score) = fp.value_at(Point::new(0.0, 0.0)) {
        println!("Against plain {}: {:.3}", args.probe.name(), score);
    }
    let best = fp
        .points()
        .iter()
        .zip(fp.values())
        .max_by(|a, b| a.1.total_cmp(b.1));
    if let Some((point, score)) = best {
        println!("Highest score {:.3} at ({:.2}, {:.2})", score, point.x, point.y);
    }
    println!();

    for row in fp.summary().rows() {
        println!("{}", row.name);
        for (metric, value) in row.metrics.iter() {
            println!("   {:<20} {:.3}", metric.column(), value);
        }
    }
    println!();

    if let Some(path) = &args.output {
        fp.write_csv(path)?;
        println!("Fingerprint written to {}", path.display());
    }
    if let Some(path) = &args.summary {
        fp.summary().write_csv(path)?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}
