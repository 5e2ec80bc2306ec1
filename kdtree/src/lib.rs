//! Balanced k-d tree for exact fixed-radius queries.
//!
//! Points are stored row-major as `f64` coordinates; a point's id is its row.
//! The tree is built once in bulk (median split on the widest axis, small
//! leaf buckets) and then queried read-only.
//!
//! ```
//! use dbscan_kdtree::KdTree;
//!
//! let tree = KdTree::build(2, vec![0.0, 0.0, 0.0, 1.0, 10.0, 10.0]).unwrap();
//! let mut hits = tree.within_radius(&[0.0, 0.0], 2.0).unwrap();
//! hits.sort();
//! assert_eq!(hits, vec![0, 1]);
//! ```

mod error;
mod kdtree;

pub use error::KdTreeError;
pub use kdtree::{KdTree, DEFAULT_LEAF_SIZE};
