//! Distance functions for the exhaustive neighbor scan.
//!
//! Any `Fn(&T, &T) -> f64` is a [`Metric`]; the unit structs here cover the
//! common cases for [`Point`] types. Accumulation is done in `f64`.

use crate::point::Point;

/// A distance function between two points.
pub trait Metric<T: ?Sized> {
    fn distance(&self, a: &T, b: &T) -> f64;
}

impl<T: ?Sized, F> Metric<T> for F
where
    F: Fn(&T, &T) -> f64,
{
    fn distance(&self, a: &T, b: &T) -> f64 {
        self(a, b)
    }
}

/// Straight-line (L2) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

/// Squared L2 distance. Cheaper than [`Euclidean`]; compare against `eps²`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredEuclidean;

/// Sum of absolute coordinate differences (L1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

/// Largest absolute coordinate difference (L∞).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chebyshev;

/// Cosine distance: `1 - cosine_similarity`. A zero vector has similarity 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cosine;

fn diffs<'a, T: Point + ?Sized>(a: &'a T, b: &'a T) -> impl Iterator<Item = f64> + 'a {
    let n = a.dim().min(b.dim());
    (0..n).map(move |i| a.coord(i) - b.coord(i))
}

impl<T: Point + ?Sized> Metric<T> for SquaredEuclidean {
    fn distance(&self, a: &T, b: &T) -> f64 {
        diffs(a, b).map(|d| d * d).sum()
    }
}

impl<T: Point + ?Sized> Metric<T> for Euclidean {
    fn distance(&self, a: &T, b: &T) -> f64 {
        SquaredEuclidean.distance(a, b).sqrt()
    }
}

impl<T: Point + ?Sized> Metric<T> for Manhattan {
    fn distance(&self, a: &T, b: &T) -> f64 {
        diffs(a, b).map(f64::abs).sum()
    }
}

impl<T: Point + ?Sized> Metric<T> for Chebyshev {
    fn distance(&self, a: &T, b: &T) -> f64 {
        diffs(a, b).map(f64::abs).fold(0.0, f64::max)
    }
}

impl<T: Point + ?Sized> Metric<T> for Cosine {
    fn distance(&self, a: &T, b: &T) -> f64 {
        1.0 - cosine_sim(a, b)
    }
}

/// Cosine similarity between two points.
pub fn cosine_sim<T: Point + ?Sized>(a: &T, b: &T) -> f64 {
    let mut dot = 0.0;
    let mut na = 0.0;
    let mut nb = 0.0;
    for i in 0..a.dim().min(b.dim()) {
        let ai = a.coord(i);
        let bi = b.coord(i);
        dot += ai * bi;
        na += ai * ai;
        nb += bi * bi;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    dot / denom
}
