//! DBSCAN CLI - clusters points from a file and prints the result as JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod run;

use config::{ConfigFile, MetricKind, RunConfig, StrategyKind};
use input::InputFormat;

/// Density-based clustering of numeric points.
///
/// Reads one point per line (CSV or whitespace separated) or a JSON array of
/// arrays, and writes `{"clusters": .., "noise": .., "labels": ..}`.
#[derive(Parser)]
#[command(name = "dbscan")]
#[command(about = "Density-based clustering (DBSCAN) of numeric points")]
#[command(version)]
struct Cli {
    /// Input file with points ("-" for stdin)
    input: PathBuf,

    /// Input format (default: by file extension)
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// Config file (YAML or JSON); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Neighborhood radius; neighbors satisfy distance < eps
    #[arg(long)]
    eps: Option<f64>,

    /// Neighbors (excluding the point itself) required for a core point
    #[arg(long)]
    min_pts: Option<usize>,

    /// Coordinates per point (default: length of the first point)
    #[arg(long)]
    dim: Option<usize>,

    /// Distance function for the exhaustive strategy
    #[arg(long, value_enum)]
    metric: Option<MetricKind>,

    /// Neighbor query strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Cancel the run after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFile {
        ConfigFile {
            eps: self.eps,
            min_pts: self.min_pts,
            dim: self.dim,
            metric: self.metric,
            strategy: self.strategy,
            timeout_ms: self.timeout_ms,
        }
    }

    fn run_config(&self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Ok(file.overridden_by(&self.flags()).with_defaults())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cfg = cli.run_config()?;
    let points = input::load(&cli.input, cli.format)?;
    let report = run::Report::from(run::cluster(&points, &cfg)?);

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
