use crate::error::KdTreeError;

/// Maximum number of points kept in a leaf bucket unless overridden.
pub const DEFAULT_LEAF_SIZE: usize = 16;

const NO_CHILD: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Node {
    left: usize, // NO_CHILD if leaf
    right: usize,
    // Leaf data: indices[start..end]
    start: usize,
    end: usize,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.left == NO_CHILD
    }
}

/// Bulk-built k-d tree over `f64` points.
///
/// The tree owns a copy of the coordinates it was built from. Dropping it
/// releases every node.
#[derive(Debug, Clone)]
pub struct KdTree {
    dim: usize,
    coords: Vec<f64>,
    indices: Vec<usize>,
    nodes: Vec<Node>,
    // Per node bounding box: [min; dim] followed by [max; dim].
    bounds: Vec<f64>,
    root: Option<usize>,
    leaf_size: usize,
}

impl KdTree {
    /// Builds a tree from row-major coordinates with the default leaf size.
    pub fn build(dim: usize, coords: Vec<f64>) -> Result<Self, KdTreeError> {
        Self::with_leaf_size(dim, coords, DEFAULT_LEAF_SIZE)
    }

    /// Builds a tree from row-major coordinates. A `leaf_size` of 0 is treated as 1.
    pub fn with_leaf_size(
        dim: usize,
        coords: Vec<f64>,
        leaf_size: usize,
    ) -> Result<Self, KdTreeError> {
        if dim == 0 {
            return Err(KdTreeError::ZeroDimension);
        }
        if coords.len() % dim != 0 {
            return Err(KdTreeError::RaggedCoordinates {
                len: coords.len(),
                dim,
            });
        }

        let count = coords.len() / dim;
        let mut tree = KdTree {
            dim,
            coords,
            indices: (0..count).collect(),
            nodes: Vec::new(),
            bounds: Vec::new(),
            root: None,
            leaf_size: leaf_size.max(1),
        };
        if count == 0 {
            return Ok(tree);
        }

        // A balanced tree has roughly 2 * N / leaf_size nodes.
        let reserve = 2 * count / tree.leaf_size + 1;
        tree.nodes.reserve(reserve);
        tree.bounds.reserve(reserve * 2 * dim);

        tree.root = Some(tree.build_recursive(0, count));
        Ok(tree)
    }

    fn build_recursive(&mut self, start: usize, end: usize) -> usize {
        let dim = self.dim;
        let count = end - start;

        let mut min = vec![f64::INFINITY; dim];
        let mut max = vec![f64::NEG_INFINITY; dim];
        for &idx in &self.indices[start..end] {
            let p = &self.coords[idx * dim..(idx + 1) * dim];
            for axis in 0..dim {
                if p[axis] < min[axis] {
                    min[axis] = p[axis];
                }
                if p[axis] > max[axis] {
                    max[axis] = p[axis];
                }
            }
        }

        if count <= self.leaf_size {
            return self.push_node(
                Node {
                    left: NO_CHILD,
                    right: NO_CHILD,
                    start,
                    end,
                },
                &min,
                &max,
            );
        }

        // Split on the widest axis at the median.
        let axis = (0..dim)
            .max_by(|&a, &b| {
                (max[a] - min[a])
                    .partial_cmp(&(max[b] - min[b]))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0);

        let half = count / 2;
        let coords = &self.coords;
        self.indices[start..end].select_nth_unstable_by(half, |&a, &b| {
            coords[a * dim + axis]
                .partial_cmp(&coords[b * dim + axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = start + half;
        let left = self.build_recursive(start, mid);
        let right = self.build_recursive(mid, end);

        self.push_node(
            Node {
                left,
                right,
                start,
                end,
            },
            &min,
            &max,
        )
    }

    fn push_node(&mut self, node: Node, min: &[f64], max: &[f64]) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.bounds.extend_from_slice(min);
        self.bounds.extend_from_slice(max);
        id
    }

    /// Returns the ids of all points whose Euclidean distance to `query` is
    /// strictly less than `radius`, in traversal order.
    ///
    /// A radius that is zero or negative matches nothing.
    pub fn within_radius(&self, query: &[f64], radius: f64) -> Result<Vec<usize>, KdTreeError> {
        if query.len() != self.dim {
            return Err(KdTreeError::DimensionMismatch {
                got: query.len(),
                want: self.dim,
            });
        }
        if radius.is_nan() {
            return Err(KdTreeError::NanRadius);
        }

        let mut found = Vec::new();
        let Some(root) = self.root else {
            return Ok(found);
        };
        if radius <= 0.0 {
            return Ok(found);
        }

        // Compared as `sqrt(d2) < radius`, matching a plain Euclidean metric.
        // Box distance is a lower bound on every contained point's distance.
        let mut stack = vec![root];
        while let Some(node_id) = stack.pop() {
            if self.box_dist_sq(node_id, query).sqrt() >= radius {
                continue;
            }

            let node = self.nodes[node_id];
            if node.is_leaf() {
                for &idx in &self.indices[node.start..node.end] {
                    if dist_sq(self.point(idx), query).sqrt() < radius {
                        found.push(idx);
                    }
                }
                continue;
            }

            // Visit the nearer child first.
            let (near, far) =
                if self.box_dist_sq(node.left, query) <= self.box_dist_sq(node.right, query) {
                    (node.left, node.right)
                } else {
                    (node.right, node.left)
                };
            stack.push(far);
            stack.push(near);
        }

        Ok(found)
    }

    fn box_dist_sq(&self, node_id: usize, query: &[f64]) -> f64 {
        let base = node_id * 2 * self.dim;
        let min = &self.bounds[base..base + self.dim];
        let max = &self.bounds[base + self.dim..base + 2 * self.dim];

        let mut d2 = 0.0;
        for axis in 0..self.dim {
            let v = query[axis];
            if v < min[axis] {
                d2 += (min[axis] - v) * (min[axis] - v);
            } else if v > max[axis] {
                d2 += (v - max[axis]) * (v - max[axis]);
            }
        }
        d2
    }

    /// Returns the coordinates of point `id`.
    ///
    /// # Panics
    /// Panics if `id >= self.len()`.
    pub fn point(&self, id: usize) -> &[f64] {
        &self.coords[id * self.dim..(id + 1) * self.dim]
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the number of indexed points.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

fn dist_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
