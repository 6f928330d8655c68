use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicU64, Ordering},
};

use comms::specs::Schedule;
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder, prelude::*};

use crate::{Evaluator, PointSet};

/// A match counter that can be shared between threads.
#[derive(Debug, Default)]
pub struct MatchTally {
    count: AtomicU64,
}

impl MatchTally {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&self, n: u64) {
        if n > 0 {
            self.count.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Returns the accumulated count, every writer must be done by then.
    pub fn into_inner(self) -> u64 {
        self.count.into_inner()
    }
}

/// Counts the points of a local share that match a model using a dedicated pool of threads.
pub struct Scanner {
    pool: ThreadPool,
    threads: NonZeroUsize,
    schedule: Schedule,
}

impl Scanner {
    /// Creates a new `Scanner`.
    ///
    /// # Arguments
    /// * `threads` - The exact amount of threads to scan with.
    /// * `schedule` - How to divide the points between the threads.
    ///
    /// # Errors
    /// If the operating system refuses to spawn the threads.
    pub fn new(threads: NonZeroUsize, schedule: Schedule) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .thread_name(|i| format!("scan-{i}"))
            .build()?;

        Ok(Self {
            pool,
            threads,
            schedule,
        })
    }

    pub fn threads(&self) -> NonZeroUsize {
        self.threads
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Counts the points in `points` that satisfy `model`.
    ///
    /// The result is always equal to `count_sequential` on the same data.
    pub fn count<E: Evaluator>(&self, model: &E, points: &PointSet) -> u64 {
        let (xs, ys) = (points.xs(), points.ys());
        debug!(
            points = xs.len(),
            threads = self.threads.get();
            "scanning local share"
        );

        match self.schedule {
            Schedule::Static => self.count_static(model, xs, ys),
            Schedule::Dynamic => self.count_dynamic(model, xs, ys),
        }
    }

    /// One contiguous chunk per thread, partial counts summed at the end.
    fn count_static<E: Evaluator>(&self, model: &E, xs: &[f64], ys: &[f64]) -> u64 {
        let chunk = xs.len().div_ceil(self.threads.get()).max(1);

        self.pool.install(|| {
            xs.par_chunks(chunk)
                .zip(ys.par_chunks(chunk))
                .map(|(xs, ys)| count_sequential(model, xs, ys))
                .sum()
        })
    }

    /// Work-stealing over points, each stolen job merges its partial count into a shared tally.
    fn count_dynamic<E: Evaluator>(&self, model: &E, xs: &[f64], ys: &[f64]) -> u64 {
        let tally = MatchTally::new();

        self.pool.install(|| {
            xs.par_iter()
                .zip(ys.par_iter())
                .fold(
                    || 0u64,
                    |acc, (&x, &y)| acc + u64::from(model.matches(x, y)),
                )
                .for_each(|partial| tally.add(partial));
        });

        tally.into_inner()
    }
}

/// Counts the points that satisfy `model` on the calling thread.
pub fn count_sequential<E: Evaluator>(model: &E, xs: &[f64], ys: &[f64]) -> u64 {
    xs.iter()
        .zip(ys)
        .filter(|&(&x, &y)| model.matches(x, y))
        .count() as u64
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::model::{Cubic, Transcendental};

    const MODEL: Cubic = Cubic {
        a: 1.0,
        b: -2.0,
        c: 3.0,
        d: -4.0,
    };

    fn half_matching(n: usize, seed: u64) -> PointSet {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut xs = Vec::with_capacity(n);
        let mut ys = Vec::with_capacity(n);

        for _ in 0..n {
            let x = rng.random_range(-1000.0..1000.0);
            let mut y = MODEL.evaluate(x);
            if rng.random_bool(0.5) {
                y += rng.random_range(-50.0..50.0);
            }
            xs.push(x);
            ys.push(y);
        }

        PointSet::new(xs, ys)
    }

    fn scanner(threads: usize, schedule: Schedule) -> Scanner {
        Scanner::new(NonZeroUsize::new(threads).unwrap(), schedule).unwrap()
    }

    #[test]
    fn parallel_count_equals_sequential_count() {
        let points = half_matching(10_007, 1);
        let expected = count_sequential(&MODEL, points.xs(), points.ys());
        assert!(expected > 0);

        for threads in [1, 2, 3, 4, 8, 12] {
            for schedule in [Schedule::Static, Schedule::Dynamic] {
                let got = scanner(threads, schedule).count(&MODEL, &points);
                assert_eq!(got, expected, "threads={threads} schedule={schedule:?}");
            }
        }
    }

    #[test]
    fn counts_are_reproducible() {
        let points = half_matching(5_000, 9);
        let scanner = scanner(4, Schedule::Dynamic);

        let first = scanner.count(&MODEL, &points);
        for _ in 0..5 {
            assert_eq!(scanner.count(&MODEL, &points), first);
        }
    }

    #[test]
    fn fewer_points_than_threads() {
        let points = PointSet::new(vec![1.0, 2.0], vec![-2.0, 2.0]);

        for schedule in [Schedule::Static, Schedule::Dynamic] {
            assert_eq!(scanner(8, schedule).count(&MODEL, &points), 2);
        }
    }

    #[test]
    fn empty_share_counts_zero() {
        let points = PointSet::default();

        for schedule in [Schedule::Static, Schedule::Dynamic] {
            assert_eq!(scanner(4, schedule).count(&MODEL, &points), 0);
        }
    }

    #[test]
    fn transcendental_scan_matches_sequential() {
        let model = Transcendental {
            a: 0.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: -1.0,
            f: 3.0,
        };

        let xs: Vec<f64> = (0..257).map(|i| i as f64 / 8.0 - 16.0).collect();
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| model.evaluate(x) + if i % 3 == 0 { 1.0 } else { 0.0 })
            .collect();
        let points = PointSet::new(xs, ys);

        let expected = count_sequential(&model, points.xs(), points.ys());
        assert_eq!(expected, 257 - 86);

        for threads in [1, 4] {
            let got = scanner(threads, Schedule::Dynamic).count(&model, &points);
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn tally_merges_partials_from_many_threads() {
        let tally = MatchTally::new();

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        tally.add(1);
                    }
                });
            }
        });

        assert_eq!(tally.into_inner(), 8000);
    }
}
