//! Strategy dispatch, timeout cancellation and result reporting.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{bail, Result};
use dbscan::{
    Chebyshev, Clustering, Cosine, Dbscan, DbscanError, Euclidean, EventTrigger, Exhaustive,
    Indexed, KdTree, Manhattan, NeighborStrategy, Outcome, Signals,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{MetricKind, RunConfig, StrategyKind};

/// JSON report written after a successful run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub clusters: Vec<Vec<usize>>,
    pub noise: Vec<usize>,
    /// Cluster id per point, `null` for noise.
    pub labels: Vec<Option<usize>>,
}

impl From<Clustering> for Report {
    fn from(c: Clustering) -> Self {
        let labels = c.labels();
        Self {
            clusters: c.clusters,
            noise: c.noise,
            labels,
        }
    }
}

/// Fires a stop trigger after a delay unless dropped first.
struct Timeout {
    done: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Timeout {
    fn start(after: Duration, stop: EventTrigger) -> Self {
        let (done, rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(after) {
                warn!("timeout after {:?}, cancelling", after);
                stop.trigger();
            }
        });
        Self {
            done: Some(done),
            handle: Some(handle),
        }
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        // Disconnects the channel so the timer thread exits early.
        self.done.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Clusters `points` according to `cfg`.
pub fn cluster(points: &[Vec<f64>], cfg: &RunConfig) -> Result<Clustering> {
    let dim = cfg
        .dim
        .unwrap_or_else(|| points.first().map(Vec::len).unwrap_or(0));
    if let Some(short) = points.iter().find(|p| p.len() < dim) {
        bail!("dim {} exceeds point length {}", dim, short.len());
    }

    // Metrics read every coordinate, so rows are cut to `dim` up front.
    let truncated: Vec<Vec<f64>>;
    let points = if points.iter().any(|p| p.len() > dim) {
        truncated = points.iter().map(|p| p[..dim].to_vec()).collect();
        &truncated[..]
    } else {
        points
    };

    let stop = EventTrigger::new();
    let signals = Signals::with_stop(stop.clone());
    let _timeout = cfg
        .timeout_ms
        .map(|ms| Timeout::start(Duration::from_millis(ms), stop));

    info!(
        "clustering {} points: strategy={:?} metric={} eps={} min_pts={}",
        points.len(),
        cfg.strategy,
        cfg.metric,
        cfg.eps,
        cfg.min_pts
    );

    let mut engine = Dbscan::new();
    let outcome = match (cfg.strategy, cfg.metric) {
        (StrategyKind::Kdtree, MetricKind::Euclidean) => {
            run_with(&mut engine, points, dim, cfg, &Indexed::<KdTree>::new(), &signals)
        }
        (StrategyKind::Kdtree, metric) => {
            bail!("kdtree strategy only supports the euclidean metric, got {}", metric)
        }
        (StrategyKind::Exhaustive, MetricKind::Euclidean) => {
            run_with(&mut engine, points, dim, cfg, &Exhaustive::new(Euclidean), &signals)
        }
        (StrategyKind::Exhaustive, MetricKind::Manhattan) => {
            run_with(&mut engine, points, dim, cfg, &Exhaustive::new(Manhattan), &signals)
        }
        (StrategyKind::Exhaustive, MetricKind::Chebyshev) => {
            run_with(&mut engine, points, dim, cfg, &Exhaustive::new(Chebyshev), &signals)
        }
        (StrategyKind::Exhaustive, MetricKind::Cosine) => {
            run_with(&mut engine, points, dim, cfg, &Exhaustive::new(Cosine), &signals)
        }
    };

    match outcome {
        Ok(Outcome::Success) => {
            info!(
                "found {} clusters, {} noise points",
                engine.clusters().len(),
                engine.noise().len()
            );
            Ok(engine.into_clustering())
        }
        Ok(Outcome::Failure(reason)) => bail!("invalid input: {}", reason),
        Err(DbscanError::Cancelled) => bail!("cancelled"),
        Err(e) => Err(e.into()),
    }
}

fn run_with<S>(
    engine: &mut Dbscan,
    points: &[Vec<f64>],
    dim: usize,
    cfg: &RunConfig,
    strategy: &S,
    signals: &Signals,
) -> Result<Outcome, DbscanError>
where
    S: NeighborStrategy<Vec<f64>>,
{
    engine.run(points, dim, cfg.eps, cfg.min_pts, strategy, Some(signals))
}
