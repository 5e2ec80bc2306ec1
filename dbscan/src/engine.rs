use std::collections::{HashSet, VecDeque};

use dbscan_signals::{check_stop, Signals};
use tracing::{debug, trace};

use crate::error::{DbscanError, Precondition};
use crate::neighbors::{NeighborStrategy, RegionQuery};

/// Result of a [`Dbscan::run`] that was not aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// Clusters and noise are populated.
    Success,
    /// The inputs were rejected; no clustering was performed and the results
    /// are empty.
    Failure(Precondition),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Clusters and noise produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clustering {
    /// Point ids per cluster, in admission order. Cluster id = position.
    pub clusters: Vec<Vec<usize>>,

    /// Unassigned point ids in ascending order.
    pub noise: Vec<usize>,
}

impl Clustering {
    /// Returns the cluster id of every point, `None` for noise.
    pub fn labels(&self) -> Vec<Option<usize>> {
        let mut labels = vec![None; self.len()];
        for (cid, members) in self.clusters.iter().enumerate() {
            for &pid in members {
                labels[pid] = Some(cid);
            }
        }
        labels
    }

    /// Returns the number of clustered points (all clusters plus noise).
    pub fn len(&self) -> usize {
        self.clusters.iter().map(Vec::len).sum::<usize>() + self.noise.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self) {
        self.clusters.clear();
        self.noise.clear();
    }
}

/// Reusable DBSCAN engine.
///
/// Every [`run`](Self::run) clears the previous results first, so an engine
/// can be reused across datasets.
///
/// Points are only admitted to a cluster when they are seeds or are found to
/// be core points themselves during expansion. A point already visited by
/// the seed loop (and found non-core) is not revisited when a later cluster
/// reaches it; it ends up as noise.
#[derive(Debug, Default)]
pub struct Dbscan {
    result: Clustering,
    // Scratch state, sized per run.
    visited: Vec<bool>,
    assigned: Vec<bool>,
    border: HashSet<usize>,
}

impl Dbscan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clusters `data` by density.
    ///
    /// - `dim`: coordinates per point used by index-backed strategies.
    /// - `eps`: neighborhood radius; neighbors satisfy `distance < eps`.
    /// - `min_pts`: neighbors (excluding the point itself) needed for a core point.
    /// - `strategy`: how region queries are answered.
    /// - `signals`: polled at every loop boundary; `None` never cancels.
    ///
    /// Returns `Ok(Outcome::Failure(_))` for an empty dataset, `dim == 0` or
    /// `min_pts == 0`. A fired stop trigger aborts with
    /// [`DbscanError::Cancelled`]; results are then meaningless.
    ///
    /// `data` is only borrowed for the duration of the call.
    pub fn run<T, S>(
        &mut self,
        data: &[T],
        dim: usize,
        eps: f64,
        min_pts: usize,
        strategy: &S,
        signals: Option<&Signals>,
    ) -> Result<Outcome, DbscanError>
    where
        S: NeighborStrategy<T>,
    {
        self.result.clear();

        if let Err(reason) = validate(data.len(), dim, min_pts) {
            debug!("dbscan: rejected input: {}", reason);
            return Ok(Outcome::Failure(reason));
        }

        let never = Signals::new();
        let signals = signals.unwrap_or(&never);

        debug!(
            "dbscan: clustering {} points (dim={}, eps={}, min_pts={})",
            data.len(),
            dim,
            eps,
            min_pts
        );

        match self.cluster(data, dim, eps, min_pts, strategy, signals) {
            Ok(()) => {
                debug!(
                    "dbscan: found {} clusters, {} noise points",
                    self.result.clusters.len(),
                    self.result.noise.len()
                );
                Ok(Outcome::Success)
            }
            Err(e) => {
                debug!("dbscan: run aborted: {}", e);
                Err(e)
            }
        }
    }

    fn cluster<T, S>(
        &mut self,
        data: &[T],
        dim: usize,
        eps: f64,
        min_pts: usize,
        strategy: &S,
        signals: &Signals,
    ) -> Result<(), DbscanError>
    where
        S: NeighborStrategy<T>,
    {
        let n = data.len();
        self.visited.clear();
        self.visited.resize(n, false);
        self.assigned.clear();
        self.assigned.resize(n, false);
        self.border.clear();

        // Dropped (and any index released) on every exit path.
        let query = strategy.prepare(data, dim, eps, signals)?;

        for pid in 0..n {
            check_stop(signals)?;
            self.border.clear();
            if self.visited[pid] {
                continue;
            }
            self.visited[pid] = true;

            // Not core: may still be reached later, or end up as noise.
            let neighbors = query.region_query(pid, signals)?;
            if neighbors.len() < min_pts {
                continue;
            }

            let cid = self.result.clusters.len();
            self.result.clusters.push(Vec::new());
            trace!(
                "dbscan: point {} seeds cluster {} ({} neighbors)",
                pid,
                cid,
                neighbors.len()
            );
            self.border.insert(pid);
            self.add_to_cluster(pid, cid);
            self.expand_cluster(&query, cid, neighbors, min_pts, signals)?;
        }

        for pid in 0..n {
            check_stop(signals)?;
            if !self.assigned[pid] {
                self.result.noise.push(pid);
            }
        }

        Ok(())
    }

    fn expand_cluster<Q: RegionQuery>(
        &mut self,
        query: &Q,
        cid: usize,
        neighbors: Vec<usize>,
        min_pts: usize,
        signals: &Signals,
    ) -> Result<(), DbscanError> {
        self.border.extend(neighbors.iter().copied());
        let mut queue: VecDeque<usize> = neighbors.into();

        while let Some(pid) = queue.pop_front() {
            check_stop(signals)?;
            if self.visited[pid] {
                continue;
            }
            self.visited[pid] = true;

            let pid_neighbors = query.region_query(pid, signals)?;
            if pid_neighbors.len() < min_pts {
                continue;
            }

            self.add_to_cluster(pid, cid);
            for nid in pid_neighbors {
                if self.border.insert(nid) {
                    queue.push_back(nid);
                }
            }
        }

        Ok(())
    }

    fn add_to_cluster(&mut self, pid: usize, cid: usize) {
        self.result.clusters[cid].push(pid);
        self.assigned[pid] = true;
    }

    /// Clusters from the last successful run, in discovery order.
    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.result.clusters
    }

    /// Noise point ids from the last successful run, ascending.
    pub fn noise(&self) -> &[usize] {
        &self.result.noise
    }

    /// Cluster id per point from the last successful run, `None` for noise.
    pub fn labels(&self) -> Vec<Option<usize>> {
        self.result.labels()
    }

    pub fn clustering(&self) -> &Clustering {
        &self.result
    }

    /// Consumes the engine, returning the last run's results.
    pub fn into_clustering(self) -> Clustering {
        self.result
    }
}

fn validate(len: usize, dim: usize, min_pts: usize) -> Result<(), Precondition> {
    if len == 0 {
        return Err(Precondition::EmptyDataset);
    }
    if dim == 0 {
        return Err(Precondition::ZeroDimension);
    }
    if min_pts == 0 {
        return Err(Precondition::ZeroMinPts);
    }
    Ok(())
}

/// Runs a fresh engine and returns owned results.
///
/// Rejected inputs are reported as [`DbscanError::Invalid`].
pub fn dbscan<T, S>(
    data: &[T],
    dim: usize,
    eps: f64,
    min_pts: usize,
    strategy: &S,
    signals: Option<&Signals>,
) -> Result<Clustering, DbscanError>
where
    S: NeighborStrategy<T>,
{
    let mut engine = Dbscan::new();
    match engine.run(data, dim, eps, min_pts, strategy, signals)? {
        Outcome::Success => Ok(engine.into_clustering()),
        Outcome::Failure(reason) => Err(reason.into()),
    }
}
