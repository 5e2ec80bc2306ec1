//! End-to-end clustering behavior across both neighbor strategies.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use dbscan::{
    dbscan, Clustering, Dbscan, DbscanError, Euclidean, EventTrigger, Exhaustive, Indexed,
    KdTree, Metric, Outcome, Precondition, Signals, SpatialIndex,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Gaussian-ish blobs around fixed centers plus uniform background noise.
fn blobs(seed: u64, per_blob: usize, background: usize) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = [[0.0, 0.0], [10.0, 10.0], [-8.0, 12.0]];
    let mut points = Vec::new();
    for c in &centers {
        for _ in 0..per_blob {
            let dx: f64 = (0..3).map(|_| rng.gen_range(-0.5..0.5)).sum();
            let dy: f64 = (0..3).map(|_| rng.gen_range(-0.5..0.5)).sum();
            points.push([c[0] + dx, c[1] + dy]);
        }
    }
    for _ in 0..background {
        points.push([rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0)]);
    }
    points
}

fn as_sets(c: &Clustering) -> Vec<BTreeSet<usize>> {
    c.clusters.iter().map(|m| m.iter().copied().collect()).collect()
}

fn neighbor_count(points: &[[f64; 2]], pid: usize, eps: f64) -> usize {
    points
        .iter()
        .enumerate()
        .filter(|&(q, p)| {
            let dx = p[0] - points[pid][0];
            let dy = p[1] - points[pid][1];
            q != pid && (dx * dx + dy * dy).sqrt() < eps
        })
        .count()
}

fn assert_partition(c: &Clustering, n: usize) {
    let mut seen = vec![false; n];
    for pid in c.clusters.iter().flatten().chain(c.noise.iter()) {
        assert!(!seen[*pid], "point {pid} appears twice");
        seen[*pid] = true;
    }
    assert!(seen.iter().all(|&s| s), "some point is missing");
}

#[test]
fn two_close_points_and_an_outlier() {
    let points = vec![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0]];

    let c = dbscan(&points, 2, 2.0, 1, &Exhaustive::new(Euclidean), None).unwrap();
    assert_eq!(as_sets(&c), vec![BTreeSet::from([0, 1])]);
    assert_eq!(c.noise, vec![2]);

    // min_pts counts neighbors other than the point itself: with 2 required,
    // neither point qualifies as core.
    let c = dbscan(&points, 2, 2.0, 2, &Exhaustive::new(Euclidean), None).unwrap();
    assert!(c.clusters.is_empty());
    assert_eq!(c.noise, vec![0, 1, 2]);
}

#[test]
fn points_on_a_line() {
    let points = vec![[0.0], [1.0], [2.0], [3.0], [100.0]];
    for c in [
        dbscan(&points, 1, 1.5, 1, &Exhaustive::new(Euclidean), None).unwrap(),
        dbscan(&points, 1, 1.5, 1, &Indexed::<KdTree>::new(), None).unwrap(),
    ] {
        assert_eq!(as_sets(&c), vec![BTreeSet::from([0, 1, 2, 3])]);
        assert_eq!(c.noise, vec![4]);
    }
}

#[test]
fn single_point_becomes_noise() {
    let points = vec![[1.0f32, 2.0, 3.0]];
    let c = dbscan(&points, 3, 0.5, 1, &Indexed::<KdTree>::new(), None).unwrap();
    assert!(c.clusters.is_empty());
    assert_eq!(c.noise, vec![0]);
}

#[test]
fn preconditions_leave_results_empty() {
    let points = vec![[0.0, 0.0], [0.0, 1.0]];
    let empty: Vec<[f64; 2]> = Vec::new();
    let strategy = Exhaustive::new(Euclidean);
    let mut engine = Dbscan::new();

    let cases = [
        (engine.run(&empty, 2, 1.0, 1, &strategy, None), Precondition::EmptyDataset),
        (engine.run(&points, 0, 1.0, 1, &strategy, None), Precondition::ZeroDimension),
        (engine.run(&points, 2, 1.0, 0, &strategy, None), Precondition::ZeroMinPts),
    ];
    for (result, want) in cases {
        assert_eq!(result.unwrap(), Outcome::Failure(want));
    }
    assert!(engine.clusters().is_empty());
    assert!(engine.noise().is_empty());
}

#[test]
fn partition_and_core_density_hold() {
    let eps = 0.6;
    let min_pts = 4;
    for seed in 0..5 {
        let points = blobs(seed, 60, 40);
        let c = dbscan(&points, 2, eps, min_pts, &Indexed::<KdTree>::new(), None).unwrap();

        assert_partition(&c, points.len());
        assert!(!c.clusters.is_empty(), "seed {seed} found no clusters");
        for pid in c.clusters.iter().flatten() {
            assert!(
                neighbor_count(&points, *pid, eps) >= min_pts,
                "assigned point {pid} is not core"
            );
        }
        assert!(c.noise.windows(2).all(|w| w[0] < w[1]), "noise not ascending");
    }
}

#[test]
fn strategies_agree() {
    let points = blobs(42, 80, 60);
    let exhaustive = dbscan(&points, 2, 0.7, 3, &Exhaustive::new(Euclidean), None).unwrap();
    let indexed = dbscan(&points, 2, 0.7, 3, &Indexed::<KdTree>::new(), None).unwrap();

    assert_eq!(as_sets(&exhaustive), as_sets(&indexed));
    assert_eq!(exhaustive.noise, indexed.noise);
    assert_eq!(exhaustive.labels(), indexed.labels());
}

#[test]
fn strategies_agree_at_the_radius_boundary() {
    use std::f64::consts::SQRT_2;

    let diagonal = vec![[0.0, 0.0], [1.0, 1.0]];
    for strategy_result in [
        dbscan(&diagonal, 2, SQRT_2, 1, &Exhaustive::new(Euclidean), None).unwrap(),
        dbscan(&diagonal, 2, SQRT_2, 1, &Indexed::<KdTree>::new(), None).unwrap(),
    ] {
        assert!(strategy_result.clusters.is_empty());
        assert_eq!(strategy_result.noise, vec![0, 1]);
    }

    // eps equal to, or one ulp around, an actual pairwise distance.
    let mut rng = StdRng::seed_from_u64(11);
    let points: Vec<[f64; 2]> = (0..40)
        .map(|_| [rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)])
        .collect();
    for _ in 0..30 {
        let a = rng.gen_range(0..points.len());
        let b = rng.gen_range(0..points.len());
        let d = Euclidean.distance(&points[a], &points[b]);
        if d == 0.0 {
            continue;
        }
        for eps in [
            d,
            f64::from_bits(d.to_bits() - 1),
            f64::from_bits(d.to_bits() + 1),
        ] {
            let exhaustive =
                dbscan(&points, 2, eps, 1, &Exhaustive::new(Euclidean), None).unwrap();
            let indexed = dbscan(&points, 2, eps, 1, &Indexed::<KdTree>::new(), None).unwrap();
            assert_eq!(exhaustive.labels(), indexed.labels(), "eps={eps}");
        }
    }
}

#[test]
fn integer_coordinates() {
    let signed: Vec<[i64; 2]> = vec![[0, 0], [0, 1], [10, 10]];
    for c in [
        dbscan(&signed, 2, 2.0, 1, &Indexed::<KdTree>::new(), None).unwrap(),
        dbscan(&signed, 2, 2.0, 1, &Exhaustive::new(Euclidean), None).unwrap(),
    ] {
        assert_eq!(as_sets(&c), vec![BTreeSet::from([0, 1])]);
        assert_eq!(c.noise, vec![2]);
    }

    let unsigned: Vec<Vec<u64>> = vec![vec![0, 0], vec![1, 0], vec![2, 0], vec![50, 50]];
    for c in [
        dbscan(&unsigned, 2, 1.5, 1, &Indexed::<KdTree>::new(), None).unwrap(),
        dbscan(&unsigned, 2, 1.5, 1, &Exhaustive::new(Euclidean), None).unwrap(),
    ] {
        assert_eq!(as_sets(&c), vec![BTreeSet::from([0, 1, 2])]);
        assert_eq!(c.noise, vec![3]);
    }
}

#[test]
fn exhaustive_runs_are_reproducible() {
    let points = blobs(7, 50, 30);
    let strategy = Exhaustive::new(Euclidean);
    let first = dbscan(&points, 2, 0.6, 3, &strategy, None).unwrap();
    for _ in 0..3 {
        assert_eq!(dbscan(&points, 2, 0.6, 3, &strategy, None).unwrap(), first);
    }
}

#[test]
fn engine_reuse_does_not_leak_state() {
    let mut engine = Dbscan::new();
    let strategy = Exhaustive::new(Euclidean);

    let big = blobs(3, 40, 10);
    assert!(engine.run(&big, 2, 0.6, 3, &strategy, None).unwrap().is_success());
    assert!(!engine.clusters().is_empty());

    let small = vec![[0.0, 0.0], [5.0, 5.0]];
    assert!(engine.run(&small, 2, 1.0, 1, &strategy, None).unwrap().is_success());
    assert!(engine.clusters().is_empty());
    assert_eq!(engine.noise(), &[0, 1]);
}

#[test]
fn custom_distance_function() {
    // Only the first coordinate matters.
    let points = vec![[0.0, 0.0], [0.5, 90.0], [7.0, 0.0]];
    let first_axis = |a: &[f64; 2], b: &[f64; 2]| (a[0] - b[0]).abs();
    let c = dbscan(&points, 2, 1.0, 1, &Exhaustive::new(first_axis), None).unwrap();
    assert_eq!(as_sets(&c), vec![BTreeSet::from([0, 1])]);
    assert_eq!(c.noise, vec![2]);
}

#[test]
fn cancelled_before_run_aborts_both_strategies() {
    let points = blobs(1, 20, 0);
    let stop = EventTrigger::new();
    stop.trigger();
    let signals = Signals::with_stop(stop);

    let err = dbscan(&points, 2, 0.6, 2, &Exhaustive::new(Euclidean), Some(&signals)).unwrap_err();
    assert!(err.is_cancelled());
    let err = dbscan(&points, 2, 0.6, 2, &Indexed::<KdTree>::new(), Some(&signals)).unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn cancelled_mid_run() {
    let points = blobs(5, 30, 0);
    let stop = EventTrigger::new();
    let signals = Signals::with_stop(stop.clone());
    let calls = AtomicUsize::new(0);

    // Fires the stop trigger from inside the run after a few distance calls.
    let metric = |a: &[f64; 2], b: &[f64; 2]| {
        if calls.fetch_add(1, Ordering::SeqCst) == 500 {
            stop.trigger();
        }
        euclid(a, b)
    };

    let mut engine = Dbscan::new();
    let err = engine
        .run(&points, 2, 0.6, 2, &Exhaustive::new(metric), Some(&signals))
        .unwrap_err();
    assert!(err.is_cancelled());
    // Aborted at the next poll, long before the O(n²) scan completes.
    assert!(calls.load(Ordering::SeqCst) <= 502);
}

fn euclid(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

#[test]
fn cancelled_from_another_thread() {
    let points = blobs(9, 30, 0);
    let stop = EventTrigger::new();
    let signals = Signals::with_stop(stop.clone());
    let observer = stop.clone();

    let canceller = thread::spawn(move || stop.trigger());

    // Blocks inside the first distance call until the other thread fires.
    let metric = |a: &[f64; 2], b: &[f64; 2]| {
        while !observer.is_triggered() {
            thread::yield_now();
        }
        euclid(a, b)
    };

    let err = dbscan(&points, 2, 0.6, 2, &Exhaustive::new(metric), Some(&signals)).unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err, DbscanError::Cancelled));
}

#[test]
fn malformed_signals_are_not_cancellation() {
    let points = vec![[0.0], [1.0]];
    let signals = Signals::from_callback(Arc::new(|| {}));
    let err = dbscan(&points, 1, 1.5, 1, &Exhaustive::new(Euclidean), Some(&signals)).unwrap_err();
    assert!(!err.is_cancelled());
    assert!(matches!(err, DbscanError::MalformedSignals(_)));
}

static LIVE_INDEXES: AtomicUsize = AtomicUsize::new(0);
static BUILT_INDEXES: AtomicUsize = AtomicUsize::new(0);

/// Linear-scan index that tracks how many instances are alive.
struct CountingIndex {
    dim: usize,
    coords: Vec<f64>,
}

impl SpatialIndex for CountingIndex {
    fn build(dim: usize, coords: Vec<f64>) -> Result<Self, DbscanError> {
        LIVE_INDEXES.fetch_add(1, Ordering::SeqCst);
        BUILT_INDEXES.fetch_add(1, Ordering::SeqCst);
        Ok(CountingIndex { dim, coords })
    }

    fn range_query(&self, query: &[f64], radius: f64) -> Result<Vec<usize>, DbscanError> {
        Ok(self
            .coords
            .chunks(self.dim)
            .enumerate()
            .filter(|(_, p)| {
                let d2: f64 = p.iter().zip(query).map(|(x, y)| (x - y) * (x - y)).sum();
                d2.sqrt() < radius
            })
            .map(|(i, _)| i)
            .collect())
    }
}

impl Drop for CountingIndex {
    fn drop(&mut self) {
        LIVE_INDEXES.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn custom_index_is_released_on_every_path() {
    let points = blobs(11, 20, 5);
    let strategy = Indexed::<CountingIndex>::new();

    let c = dbscan(&points, 2, 0.6, 2, &strategy, None).unwrap();
    assert_partition(&c, points.len());
    assert_eq!(BUILT_INDEXES.load(Ordering::SeqCst), 1);
    assert_eq!(LIVE_INDEXES.load(Ordering::SeqCst), 0);

    let reference = dbscan(&points, 2, 0.6, 2, &Indexed::<KdTree>::new(), None).unwrap();
    assert_eq!(as_sets(&c), as_sets(&reference));

    // The last point fires while the index is built, so the first seed-loop
    // poll aborts with the index alive.
    let stop = EventTrigger::new();
    let signals = Signals::with_stop(stop.clone());
    let mut engine = Dbscan::new();
    let data: Vec<Triggering> = points
        .iter()
        .enumerate()
        .map(|(i, &p)| Triggering {
            p,
            stop: stop.clone(),
            fire: i + 1 == points.len(),
        })
        .collect();
    let err = engine
        .run(&data, 2, 0.6, 2, &strategy, Some(&signals))
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(BUILT_INDEXES.load(Ordering::SeqCst), 2);
    assert_eq!(LIVE_INDEXES.load(Ordering::SeqCst), 0);
}

/// Point that can fire the stop trigger when its coordinates are read.
struct Triggering {
    p: [f64; 2],
    stop: EventTrigger,
    fire: bool,
}

impl dbscan::Point for Triggering {
    fn dim(&self) -> usize {
        2
    }

    fn coord(&self, axis: usize) -> f64 {
        if self.fire && axis == 1 {
            self.stop.trigger();
        }
        self.p[axis]
    }
}
