use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sampool_config::SampoolConfig;
use sampool_telemetry::{PoolLogger, PoolMetrics};

use crate::stress;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// YAML configuration file; without it `config/sampool.yaml` and
    /// `SAMPOOL_*` variables are used.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hammer a shared pool from several threads and verify record conservation
    Stress(StressArgs),
    /// Print the resolved configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct StressArgs {
    /// Pool capacity
    #[arg(long)]
    pub capacity: Option<usize>,
    /// Records pooled before the run starts
    #[arg(long)]
    pub prefill: Option<usize>,
    /// Worker threads
    #[arg(long)]
    pub threads: Option<usize>,
    /// Operations per worker
    #[arg(long)]
    pub iterations: Option<u64>,
    /// Base RNG seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl StressArgs {
    fn apply(&self, config: &mut SampoolConfig) {
        if let Some(capacity) = self.capacity {
            config.pool.capacity = capacity;
        }
        if let Some(prefill) = self.prefill {
            config.pool.prefill = prefill;
        }
        if let Some(threads) = self.threads {
            config.stress.threads = threads;
        }
        if let Some(iterations) = self.iterations {
            config.stress.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.stress.seed = seed;
        }
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => SampoolConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SampoolConfig::load().context("loading configuration")?,
    };

    match cli.command {
        Commands::Stress(args) => {
            args.apply(&mut config);
            config.check().context("command line overrides")?;
            PoolLogger::init(&config.telemetry.log_level)?;
            run_stress(&config)
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

fn run_stress(config: &SampoolConfig) -> anyhow::Result<()> {
    let (report, pool) = stress::run(&config.pool, &config.stress)?;

    PoolLogger::log_snapshot("stress", &report.stats, report.pooled_at_end, report.capacity);
    print!("{}", serde_yaml::to_string(&report)?);

    if config.telemetry.metrics {
        let metrics = PoolMetrics::new()?;
        metrics.record(&report.stats, report.pooled_at_end, pool.capacity());
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}
