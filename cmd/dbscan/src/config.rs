//! Run configuration: config file values overridden by command line flags.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Distance function used by the exhaustive strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
    Cosine,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Euclidean => "euclidean",
            MetricKind::Manhattan => "manhattan",
            MetricKind::Chebyshev => "chebyshev",
            MetricKind::Cosine => "cosine",
        };
        f.write_str(name)
    }
}

/// How region queries are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Pairwise scan with the configured metric.
    Exhaustive,
    /// Euclidean range search over a k-d tree.
    #[default]
    Kdtree,
}

/// Configuration file format (YAML or JSON). Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub eps: Option<f64>,
    pub min_pts: Option<usize>,
    pub dim: Option<usize>,
    pub metric: Option<MetricKind>,
    pub strategy: Option<StrategyKind>,
    pub timeout_ms: Option<u64>,
}

impl ConfigFile {
    /// Loads a config file, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let cfg = match ext {
            "json" => serde_json::from_slice(&data)?,
            "yaml" | "yml" => serde_yaml::from_slice(&data)?,
            _ => anyhow::bail!("unsupported config format: {}", path.display()),
        };
        Ok(cfg)
    }

    /// Returns a copy where every field set in `flags` replaces this file's value.
    pub fn overridden_by(&self, flags: &ConfigFile) -> ConfigFile {
        ConfigFile {
            eps: flags.eps.or(self.eps),
            min_pts: flags.min_pts.or(self.min_pts),
            dim: flags.dim.or(self.dim),
            metric: flags.metric.or(self.metric),
            strategy: flags.strategy.or(self.strategy),
            timeout_ms: flags.timeout_ms.or(self.timeout_ms),
        }
    }
}

/// Fully resolved run parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub eps: f64,
    pub min_pts: usize,
    /// Coordinates per point. `None` means "length of the first row".
    pub dim: Option<usize>,
    pub metric: MetricKind,
    pub strategy: StrategyKind,
    /// Cancel the run after this many milliseconds. `None` never cancels.
    pub timeout_ms: Option<u64>,
}

impl RunConfig {
    pub const DEFAULT_EPS: f64 = 0.5;
    pub const DEFAULT_MIN_PTS: usize = 4;
}

impl ConfigFile {
    /// Resolves unset values to their defaults. A zero timeout means none.
    pub fn with_defaults(self) -> RunConfig {
        RunConfig {
            eps: self.eps.unwrap_or(RunConfig::DEFAULT_EPS),
            min_pts: self.min_pts.unwrap_or(RunConfig::DEFAULT_MIN_PTS),
            dim: self.dim,
            metric: self.metric.unwrap_or_default(),
            strategy: self.strategy.unwrap_or_default(),
            timeout_ms: self.timeout_ms.filter(|&ms| ms > 0),
        }
    }
}
