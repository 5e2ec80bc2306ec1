//! Neighbor query strategies.
//!
//! A [`NeighborStrategy`] is chosen by type, once per run: `prepare` builds
//! whatever the strategy needs over the dataset and returns a
//! [`RegionQuery`] that answers "which other points lie within `eps` of
//! point `pid`" for the rest of the run.
//!
//! - [`Exhaustive`] scans every point with a caller supplied [`Metric`].
//! - [`Indexed`] builds a [`SpatialIndex`] (a k-d tree by default) once and
//!   answers each query with a Euclidean range search. The index is released
//!   when the query value is dropped, including on cancellation.

use std::marker::PhantomData;

use dbscan_kdtree::KdTree;
use dbscan_signals::{check_stop, Signals};
use tracing::trace;

use crate::error::DbscanError;
use crate::metric::Metric;
use crate::point::{extend_coords, Point};

/// Answers region queries for one clustering run.
pub trait RegionQuery {
    /// Returns every point id `q != pid` with `distance(pid, q) < eps`.
    ///
    /// Polls `signals` while iterating so a dense neighborhood stays abortable.
    fn region_query(&self, pid: usize, signals: &Signals) -> Result<Vec<usize>, DbscanError>;
}

/// A way of answering region queries over a dataset of `T`.
pub trait NeighborStrategy<T> {
    type Query<'a>: RegionQuery
    where
        Self: 'a,
        T: 'a;

    /// Prepares the strategy for one run over `data`.
    fn prepare<'a>(
        &'a self,
        data: &'a [T],
        dim: usize,
        eps: f64,
        signals: &Signals,
    ) -> Result<Self::Query<'a>, DbscanError>;
}

// ---------------------------------------------------------------------------
// Exhaustive
// ---------------------------------------------------------------------------

/// Pairwise scan using a caller supplied distance function. O(n) per query.
#[derive(Debug, Clone, Default)]
pub struct Exhaustive<M> {
    metric: M,
}

impl<M> Exhaustive<M> {
    pub fn new(metric: M) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }
}

pub struct ExhaustiveQuery<'a, T, M> {
    data: &'a [T],
    eps: f64,
    metric: &'a M,
}

impl<T, M: Metric<T>> RegionQuery for ExhaustiveQuery<'_, T, M> {
    fn region_query(&self, pid: usize, signals: &Signals) -> Result<Vec<usize>, DbscanError> {
        let p = &self.data[pid];
        let mut neighbors = Vec::new();
        for (q, point) in self.data.iter().enumerate() {
            check_stop(signals)?;
            if q != pid && self.metric.distance(p, point) < self.eps {
                neighbors.push(q);
            }
        }
        Ok(neighbors)
    }
}

impl<T, M: Metric<T>> NeighborStrategy<T> for Exhaustive<M> {
    type Query<'a>
        = ExhaustiveQuery<'a, T, M>
    where
        Self: 'a,
        T: 'a;

    fn prepare<'a>(
        &'a self,
        data: &'a [T],
        _dim: usize,
        eps: f64,
        _signals: &Signals,
    ) -> Result<Self::Query<'a>, DbscanError> {
        Ok(ExhaustiveQuery {
            data,
            eps,
            metric: &self.metric,
        })
    }
}

// ---------------------------------------------------------------------------
// Spatial index
// ---------------------------------------------------------------------------

/// Opaque spatial index over row-major `f64` coordinates.
///
/// Build once, query read-only, drop to destroy.
pub trait SpatialIndex: Sized {
    fn build(dim: usize, coords: Vec<f64>) -> Result<Self, DbscanError>;

    /// Returns the rows within Euclidean distance `< radius` of `query`, in
    /// the index's own traversal order.
    fn range_query(&self, query: &[f64], radius: f64) -> Result<Vec<usize>, DbscanError>;
}

impl SpatialIndex for KdTree {
    fn build(dim: usize, coords: Vec<f64>) -> Result<Self, DbscanError> {
        KdTree::build(dim, coords).map_err(|e| DbscanError::Index(e.to_string()))
    }

    fn range_query(&self, query: &[f64], radius: f64) -> Result<Vec<usize>, DbscanError> {
        self.within_radius(query, radius)
            .map_err(|e| DbscanError::Index(e.to_string()))
    }
}

/// Range queries against a spatial index built once per run.
///
/// Coordinates are read through [`Point`] and coerced to `f64`; the distance
/// is always Euclidean.
pub struct Indexed<I = KdTree> {
    _index: PhantomData<fn() -> I>,
}

impl<I> Indexed<I> {
    pub fn new() -> Self {
        Self {
            _index: PhantomData,
        }
    }
}

impl<I> Default for Indexed<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Clone for Indexed<I> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<I> std::fmt::Debug for Indexed<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Indexed")
    }
}

pub struct IndexedQuery<'a, T, I> {
    data: &'a [T],
    dim: usize,
    eps: f64,
    index: I,
}

impl<T: Point, I: SpatialIndex> RegionQuery for IndexedQuery<'_, T, I> {
    fn region_query(&self, pid: usize, signals: &Signals) -> Result<Vec<usize>, DbscanError> {
        let mut query = Vec::with_capacity(self.dim);
        extend_coords(&mut query, &self.data[pid], self.dim);

        let hits = self.index.range_query(&query, self.eps)?;
        let mut neighbors = Vec::with_capacity(hits.len());
        for q in hits {
            check_stop(signals)?;
            if q != pid {
                neighbors.push(q);
            }
        }
        Ok(neighbors)
    }
}

impl<T, I> Drop for IndexedQuery<'_, T, I> {
    fn drop(&mut self) {
        trace!("dbscan: releasing spatial index over {} points", self.data.len());
    }
}

impl<T: Point, I: SpatialIndex> NeighborStrategy<T> for Indexed<I> {
    type Query<'a>
        = IndexedQuery<'a, T, I>
    where
        Self: 'a,
        T: 'a;

    /// Builds the index over the first `dim` coordinates of every point.
    ///
    /// # Panics
    /// Panics if a point has fewer than `dim` coordinates.
    fn prepare<'a>(
        &'a self,
        data: &'a [T],
        dim: usize,
        eps: f64,
        signals: &Signals,
    ) -> Result<Self::Query<'a>, DbscanError> {
        let mut coords = Vec::with_capacity(data.len() * dim);
        for p in data {
            check_stop(signals)?;
            extend_coords(&mut coords, p, dim);
        }
        let index = I::build(dim, coords)?;
        trace!("dbscan: spatial index built over {} points", data.len());
        Ok(IndexedQuery {
            data,
            dim,
            eps,
            index,
        })
    }
}

/// Strategy selected by build configuration: the k-d tree, or the exhaustive
/// Euclidean scan with the `brute-force` feature.
#[cfg(not(feature = "brute-force"))]
pub type DefaultStrategy = Indexed<KdTree>;

/// Strategy selected by build configuration: the k-d tree, or the exhaustive
/// Euclidean scan with the `brute-force` feature.
#[cfg(feature = "brute-force")]
pub type DefaultStrategy = Exhaustive<crate::metric::Euclidean>;
