//! Density-based clustering (DBSCAN).
//!
//! Points are grouped into an unknown number of clusters plus a noise set.
//! Neighborhoods are answered by a [`NeighborStrategy`] chosen by type: an
//! [`Exhaustive`] pairwise scan with any [`Metric`], or an [`Indexed`] range
//! search over a k-d tree. A run polls a [`Signals`] bundle at every loop
//! boundary and aborts with [`DbscanError::Cancelled`] once the stop trigger
//! fires, from any thread.
//!
//! # Usage
//!
//! ```
//! use dbscan::{Dbscan, Euclidean, Exhaustive, Outcome};
//!
//! let points = vec![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0]];
//! let mut engine = Dbscan::new();
//! let outcome = engine
//!     .run(&points, 2, 2.0, 1, &Exhaustive::new(Euclidean), None)
//!     .unwrap();
//!
//! assert_eq!(outcome, Outcome::Success);
//! assert_eq!(engine.clusters(), &[vec![0, 1]]);
//! assert_eq!(engine.noise(), &[2]);
//! ```
//!
//! # Cancellation
//!
//! ```
//! use dbscan::{dbscan, DefaultStrategy, EventTrigger, Signals};
//!
//! let stop = EventTrigger::new();
//! let signals = Signals::with_stop(stop.clone());
//! stop.trigger();
//!
//! let points = vec![[0.0f32], [0.5], [1.0]];
//! let err = dbscan(&points, 1, 1.0, 1, &DefaultStrategy::default(), Some(&signals)).unwrap_err();
//! assert!(err.is_cancelled());
//! ```
//!
//! # Design
//!
//! Density expansion only admits points that are seeds or that turn out to
//! be core points when first visited. A non-core point visited earlier by the
//! seed loop is never revisited, so it stays noise even when a later cluster
//! reaches it. This first-discoverer behavior is intentional and stable.

mod engine;
mod error;
pub mod metric;
pub mod neighbors;
mod point;

pub use dbscan_kdtree::KdTree;
pub use dbscan_signals::{check_stop, EventTrigger, MemoryOrder, SignalError, Signals};
pub use engine::{dbscan, Clustering, Dbscan, Outcome};
pub use error::{DbscanError, Precondition};
pub use metric::{Chebyshev, Cosine, Euclidean, Manhattan, Metric, SquaredEuclidean};
pub use neighbors::{
    DefaultStrategy, Exhaustive, Indexed, NeighborStrategy, RegionQuery, SpatialIndex,
};
pub use point::{Coord, Point};
