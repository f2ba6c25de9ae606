use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nfamatch::batch::{write_results_file, BatchExecutor, BenchmarkWriter, SweepProgress};
use nfamatch::config::RunConfig;
use nfamatch::engine::{Engine, DEFAULT_SCHEMA};
use nfamatch::table::stats::show_stats;
use nfamatch::table::LevelTable;
use nfamatch::workload::Workload;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "nfamatch")]
#[command(about = "Best-match rule classification over precompiled level tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Run configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Time randomly sampled batches over a sweep of batch sizes
    Bench {
        /// Level table file
        #[arg(short = 'n', long)]
        table: PathBuf,

        /// Query workload file
        #[arg(short, long)]
        workload: PathBuf,

        /// Benchmark output file (CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Also match the whole workload and write one result pointer per line
        #[arg(short, long)]
        results: Option<PathBuf>,

        /// Exclusive upper bound of the batch-size sweep
        #[arg(short, long)]
        max_batch_size: Option<u32>,

        /// Timed runs per batch size
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Worker threads
        #[arg(short = 'c', long)]
        cores: Option<usize>,

        /// Seed for query sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Reject the table unless its stored hash matches (decimal or 0x-hex)
        #[arg(long, value_parser = parse_hash)]
        expected_hash: Option<u64>,
    },
    /// Match every workload query once and write the result pointers
    Match {
        /// Level table file
        #[arg(short = 'n', long)]
        table: PathBuf,

        /// Query workload file
        #[arg(short, long)]
        workload: PathBuf,

        /// Result file, one pointer per line in workload order
        #[arg(short, long)]
        results: PathBuf,

        /// Worker threads
        #[arg(short = 'c', long)]
        cores: Option<usize>,

        /// Reject the table unless its stored hash matches (decimal or 0x-hex)
        #[arg(long, value_parser = parse_hash)]
        expected_hash: Option<u64>,
    },
    /// Show level table statistics
    Stats {
        /// Level table file
        table: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let mut config = RunConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Bench {
            table,
            workload,
            output,
            results,
            max_batch_size,
            iterations,
            cores,
            seed,
            expected_hash,
        } => {
            config.max_batch_size = max_batch_size.unwrap_or(config.max_batch_size);
            config.iterations = iterations.unwrap_or(config.iterations);
            config.threads = cores.unwrap_or(config.threads);
            config.seed = seed.or(config.seed);
            config.expected_hash = expected_hash.or(config.expected_hash);
            config.validate()?;

            run_bench(&config, &table, &workload, &output, results.as_deref())?;
        }
        Commands::Match {
            table,
            workload,
            results,
            cores,
            expected_hash,
        } => {
            config.threads = cores.unwrap_or(config.threads);
            config.expected_hash = expected_hash.or(config.expected_hash);
            config.validate()?;

            run_match(&config, &table, &workload, &results)?;
        }
        Commands::Stats { table } => {
            show_stats(&table, &DEFAULT_SCHEMA)?;
        }
    }

    Ok(())
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_hash(s: &str) -> std::result::Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid hash '{}': {}", s, e))
}

/// Load and cross-check the table and workload
fn load_inputs(config: &RunConfig, table: &Path, workload: &Path) -> Result<(LevelTable, Workload)> {
    let table = LevelTable::open(table)
        .with_context(|| format!("Failed to load level table {}", table.display()))?;
    if let Some(expected) = config.expected_hash {
        table.verify_hash(expected)?;
    }

    let workload = Workload::open(workload)
        .with_context(|| format!("Failed to load workload {}", workload.display()))?;
    workload.validate_against(&table)?;

    Ok((table, workload))
}

fn run_bench(
    config: &RunConfig,
    table_path: &Path,
    workload_path: &Path,
    output: &Path,
    results: Option<&Path>,
) -> Result<()> {
    let (table, workload) = load_inputs(config, table_path, workload_path)?;
    let engine = Engine::new(&table, &DEFAULT_SCHEMA)?;
    let executor = BatchExecutor::new(engine, config.threads)?;

    info!(
        max_batch_size = config.max_batch_size,
        iterations = config.iterations,
        threads = executor.threads(),
        "starting sweep"
    );

    let mut bench = BenchmarkWriter::create(output)
        .with_context(|| format!("Failed to create benchmark output {}", output.display()))?;
    let total = config.batch_sizes().count() as u64 * config.iterations as u64;
    let progress = SweepProgress::new(total, true);

    executor.sweep(&workload, config, |timing| {
        bench.record(&timing)?;
        progress.batch_done(timing.batch_size);
        Ok(())
    })?;
    progress.finish();
    bench.finish()?;

    if let Some(path) = results {
        let matched = executor.match_all(&workload)?;
        write_results_file(path, &matched)
            .with_context(|| format!("Failed to write results {}", path.display()))?;
    }

    Ok(())
}

fn run_match(config: &RunConfig, table_path: &Path, workload_path: &Path, results: &Path) -> Result<()> {
    let (table, workload) = load_inputs(config, table_path, workload_path)?;
    let engine = Engine::new(&table, &DEFAULT_SCHEMA)?;
    let executor = BatchExecutor::new(engine, config.threads)?;

    let matched = executor.match_all(&workload)?;
    write_results_file(results, &matched)
        .with_context(|| format!("Failed to write results {}", results.display()))?;

    info!(path = %results.display(), results = matched.len(), "results written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hash() {
        assert_eq!(parse_hash("42"), Ok(42));
        assert_eq!(parse_hash("0xff"), Ok(255));
        assert_eq!(parse_hash("0XFF"), Ok(255));
        assert!(parse_hash("0xzz").is_err());
        assert!(parse_hash("").is_err());
    }

    #[test]
    fn test_cli_parses_bench_flags() {
        let cli = Cli::try_parse_from([
            "nfamatch", "bench", "-n", "t.bin", "-w", "w.bin", "-o", "b.csv", "-m", "64", "-i",
            "5", "-c", "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Bench {
                max_batch_size,
                iterations,
                cores,
                ..
            } => {
                assert_eq!(max_batch_size, Some(64));
                assert_eq!(iterations, Some(5));
                assert_eq!(cores, Some(4));
            }
            _ => panic!("expected bench"),
        }
    }
}
