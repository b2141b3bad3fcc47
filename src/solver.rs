//! Saccade boundary search for fixed fixation points.

use std::{num::NonZero, ops::Range};

use ndarray::ArrayView2;
use tracing::trace;

use crate::{Error, Sum, triangle::Triangle};

/// A 2D gaze location, `[x, y]`.
pub type Point = [f64; 2];

/// Saccade start and end time.
///
/// Times lie between samples: time `t` is right before sample `t`, so the saccade consists of
/// samples `t_start..t_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Boundaries {
    /// Time of the first saccade sample.
    pub t_start: usize,
    /// Time after the last saccade sample.
    pub t_end: usize,
}

impl Boundaries {
    /// Construct from a start and end time.
    #[must_use]
    pub const fn new(t_start: usize, t_end: usize) -> Self {
        Self { t_start, t_end }
    }

    /// Clamp both times to `0..=samples` and swap them when they are in the wrong order.
    #[must_use]
    pub fn ordered_within(self, samples: usize) -> Self {
        let t_start = self.t_start.min(samples);
        let t_end = self.t_end.min(samples);

        if t_end < t_start {
            Self::new(t_end, t_start)
        } else {
            Self::new(t_start, t_end)
        }
    }

    /// Sample range of the source fixation.
    #[must_use]
    pub const fn source(&self) -> Range<usize> {
        0..self.t_start
    }

    /// Sample range of the saccade.
    #[must_use]
    pub const fn saccade(&self) -> Range<usize> {
        self.t_start..self.t_end
    }

    /// Sample range of the target fixation.
    #[must_use]
    pub const fn target(&self, samples: usize) -> Range<usize> {
        self.t_end..samples
    }
}

/// Summed squared errors of the three phases.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SquaredErrors {
    /// Error of the source fixation samples.
    pub source: f64,
    /// Error of the saccade samples.
    pub saccade: f64,
    /// Error of the target fixation samples.
    pub target: f64,
}

impl SquaredErrors {
    /// Summed error of all phases.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.source + self.saccade + self.target
    }

    /// Mean squared error over all samples.
    #[must_use]
    pub fn mean(&self, samples: usize) -> f64 {
        self.total() / samples as f64
    }
}

/// Result of [`SegmentSolver::solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// Optimal saccade start and end.
    pub boundaries: Boundaries,
    /// Errors of the phases at the boundaries.
    pub errors: SquaredErrors,
    /// Mean squared error at the boundaries.
    pub mse: f64,
    /// Amount of alternating rounds used.
    pub rounds: usize,
}

/// Finds the saccade boundaries minimizing the squared error for fixed fixation points.
///
/// All objective values are memoized, the memory lives as long as the solver so it must be
/// rebuilt whenever the fixation points change.
pub struct SegmentSolver<'a, S> {
    /// Gap free gaze points, `N x 2`.
    points: ArrayView2<'a, f64>,
    /// Source fixation point.
    source: Point,
    /// Target fixation point.
    target: Point,
    /// `prefix[t]` stores the source error of samples `0..t`.
    prefix: Vec<f64>,
    /// Running sum of `prefix`.
    prefix_sum: S,
    /// `suffix[k]` stores the target error of samples `N - k..N`.
    suffix: Vec<f64>,
    /// Running sum of `suffix`.
    suffix_sum: S,
    /// Saccade error of samples `row..=col`, `NaN` when not computed yet.
    saccade: Triangle<f64>,
}

impl<'a, S: Sum<f64>> SegmentSolver<'a, S> {
    /// Prepare the memories for a sequence and fixation points.
    ///
    /// # Errors
    ///
    /// - When the sequence is empty.
    /// - When the samples are not two dimensional.
    pub fn new(points: ArrayView2<'a, f64>, source: Point, target: Point) -> Result<Self, Error> {
        if points.ncols() != 2 {
            return Err(Error::InvalidShape {
                columns: points.ncols(),
            });
        }

        let samples = points.nrows();
        if samples == 0 {
            return Err(Error::EmptyInput);
        }

        let mut prefix = Vec::with_capacity(samples + 1);
        prefix.push(0.0);
        let mut suffix = Vec::with_capacity(samples + 1);
        suffix.push(0.0);

        Ok(Self {
            points,
            source,
            target,
            prefix,
            prefix_sum: S::zero(),
            suffix,
            suffix_sum: S::zero(),
            saccade: Triangle::new(samples, f64::NAN),
        })
    }

    /// Amount of samples.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.points.nrows()
    }

    /// Search the optimal boundaries starting from a guess.
    ///
    /// Alternates between the optimal start for the current end and the optimal end for that
    /// start, until neither changes or `max_rounds` is reached.
    pub fn solve(&mut self, guess: Boundaries, max_rounds: NonZero<usize>) -> Solution {
        let samples = self.samples();
        let mut boundaries = guess.ordered_within(samples);
        // Set by the first round
        let mut errors = SquaredErrors::default();
        let mut rounds = 0;

        while rounds < max_rounds.get() {
            rounds += 1;

            let (t_start, source, _) = self.optimal_t_start(boundaries.t_end);
            let (t_end, saccade, target) = self.optimal_t_end(t_start);
            errors = SquaredErrors {
                source,
                saccade,
                target,
            };

            let next = Boundaries::new(t_start, t_end);
            trace!(
                rounds,
                t_start,
                t_end,
                sse = errors.total(),
                "segment solver round"
            );

            if next == boundaries {
                break;
            }
            boundaries = next;
        }

        Solution {
            boundaries,
            errors,
            mse: errors.mean(samples),
            rounds,
        }
    }

    /// Phase errors for given boundaries.
    ///
    /// # Panics
    ///
    /// - When the boundaries are not ordered or exceed the amount of samples.
    pub fn evaluate(&mut self, boundaries: Boundaries) -> SquaredErrors {
        SquaredErrors {
            source: self.source_objective(boundaries.t_start),
            saccade: self.saccade_objective(boundaries.t_start, boundaries.t_end),
            target: self.target_objective(boundaries.t_end),
        }
    }

    /// Summed squared error of samples `0..t_start` to the source point.
    ///
    /// # Panics
    ///
    /// - When `t_start` exceeds the amount of samples.
    pub fn source_objective(&mut self, t_start: usize) -> f64 {
        assert!(
            t_start <= self.samples(),
            "source time {t_start} is beyond {} samples",
            self.samples()
        );

        // Grow the prefix sums forward
        while self.prefix.len() <= t_start {
            let index = self.prefix.len() - 1;
            let error = self.square_error(index, self.source);
            self.prefix_sum = self.prefix_sum.clone().add(error);
            self.prefix.push(self.prefix_sum.clone().sum());
        }

        self.prefix[t_start]
    }

    /// Summed squared error of samples `t_end..N` to the target point.
    ///
    /// # Panics
    ///
    /// - When `t_end` exceeds the amount of samples.
    pub fn target_objective(&mut self, t_end: usize) -> f64 {
        let samples = self.samples();
        assert!(
            t_end <= samples,
            "target time {t_end} is beyond {samples} samples"
        );

        // Grow the suffix sums backward
        let len = samples - t_end;
        while self.suffix.len() <= len {
            let index = samples - self.suffix.len();
            let error = self.square_error(index, self.target);
            self.suffix_sum = self.suffix_sum.clone().add(error);
            self.suffix.push(self.suffix_sum.clone().sum());
        }

        self.suffix[len]
    }

    /// Summed squared error of samples `t_start..t_end` to the line from source to target.
    ///
    /// Sample `i` is compared to the point at progress `(i + 0.5 - t_start) / (t_end - t_start)`,
    /// so neither the first nor the last saccade sample is pinned onto a fixation point.
    ///
    /// # Panics
    ///
    /// - When `t_start > t_end` or `t_end` exceeds the amount of samples.
    pub fn saccade_objective(&mut self, t_start: usize, t_end: usize) -> f64 {
        if t_start == t_end {
            return 0.0;
        }

        let cached = self.saccade[(t_start, t_end - 1)];
        if !cached.is_nan() {
            return cached;
        }

        let duration = (t_end - t_start) as f64;
        let error = (t_start..t_end)
            .fold(S::zero(), |sum, index| {
                let alpha = (index - t_start) as f64 + 0.5;
                let alpha = alpha / duration;
                let expected = [
                    self.source[0] * (1.0 - alpha) + self.target[0] * alpha,
                    self.source[1] * (1.0 - alpha) + self.target[1] * alpha,
                ];

                sum.add(self.square_error(index, expected))
            })
            .sum();
        self.saccade[(t_start, t_end - 1)] = error;

        error
    }

    /// Given the end, find the start minimizing source and saccade error.
    ///
    /// Returns the start and both errors, the first minimum wins.
    fn optimal_t_start(&mut self, t_end: usize) -> (usize, f64, f64) {
        let mut best = (0, f64::INFINITY, f64::INFINITY);
        let mut best_sum = f64::INFINITY;
        for time in 0..=t_end {
            let source = self.source_objective(time);
            let saccade = self.saccade_objective(time, t_end);
            if source + saccade < best_sum {
                best_sum = source + saccade;
                best = (time, source, saccade);
            }
        }

        best
    }

    /// Given the start, find the end minimizing saccade and target error.
    ///
    /// Returns the end and both errors, the first minimum wins.
    fn optimal_t_end(&mut self, t_start: usize) -> (usize, f64, f64) {
        let mut best = (t_start, f64::INFINITY, f64::INFINITY);
        let mut best_sum = f64::INFINITY;
        for time in t_start..=self.samples() {
            let saccade = self.saccade_objective(t_start, time);
            let target = self.target_objective(time);
            if saccade + target < best_sum {
                best_sum = saccade + target;
                best = (time, saccade, target);
            }
        }

        best
    }

    /// Squared distance between a sample and a point.
    #[inline]
    fn square_error(&self, index: usize, point: Point) -> f64 {
        let dx = self.points[[index, 0]] - point[0];
        let dy = self.points[[index, 1]] - point[1];

        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};

    use super::*;
    use crate::{Kahan, Naive};

    /// Points on a horizontal line.
    fn line() -> Array2<f64> {
        array![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]
    }

    /// Prefix, suffix and interval errors on a known sequence.
    #[test]
    fn objectives() {
        let points = line();
        let mut solver =
            SegmentSolver::<Naive<f64>>::new(points.view(), [0.0, 0.0], [3.0, 0.0]).unwrap();

        assert_eq!(solver.source_objective(0), 0.0);
        assert_eq!(solver.source_objective(2), 1.0);
        assert_eq!(solver.source_objective(4), 14.0);
        assert_eq!(solver.target_objective(4), 0.0);
        assert_eq!(solver.target_objective(2), 1.0);
        assert_eq!(solver.target_objective(0), 14.0);
        // Expected points at 0.375, 1.125, 1.875 and 2.625
        assert_eq!(solver.saccade_objective(0, 4), 0.3125);
        // Memoized value is returned the second time
        assert_eq!(solver.saccade_objective(0, 4), 0.3125);
    }

    /// Interval errors are only computed once.
    #[test]
    fn memoized_saccade_errors() {
        let points = line();
        let mut solver =
            SegmentSolver::<Naive<f64>>::new(points.view(), [0.0, 0.0], [3.0, 0.0]).unwrap();
        assert!(solver.saccade.try_get(0, 3).is_some_and(|error| error.is_nan()));

        assert_eq!(solver.saccade_objective(0, 4), 0.3125);
        assert_eq!(solver.saccade[(0, 3)], 0.3125);
        // Other intervals stay untouched
        assert!(solver.saccade[(1, 3)].is_nan());

        // A zero error is a valid memoized value
        solver.saccade[(1, 1)] = 0.0;
        assert_eq!(solver.saccade_objective(1, 2), 0.0);
    }

    /// An empty saccade has no error.
    #[test]
    fn empty_saccade() {
        let points = line();
        let mut solver =
            SegmentSolver::<Kahan<f64>>::new(points.view(), [5.0, 5.0], [-5.0, 1.0]).unwrap();

        for time in 0..=points.nrows() {
            assert_eq!(solver.saccade_objective(time, time), 0.0);
        }
    }

    /// Guesses are clamped and ordered.
    #[test]
    fn ordered_within() {
        assert_eq!(
            Boundaries::new(60, 70).ordered_within(10),
            Boundaries::new(10, 10)
        );
        assert_eq!(
            Boundaries::new(8, 3).ordered_within(10),
            Boundaries::new(3, 8)
        );
        assert_eq!(
            Boundaries::new(12, 4).ordered_within(10),
            Boundaries::new(4, 10)
        );
    }

    /// Alternating search stops at the first fixed point, even when a better pair exists.
    #[test]
    fn solve_step() {
        let points = array![
            [1.0, 1.0],
            [1.0, 1.0],
            [1.0, 1.0],
            [5.0, 1.0],
            [5.0, 1.0],
            [5.0, 1.0],
        ];
        let mut solver =
            SegmentSolver::<Kahan<f64>>::new(points.view(), [1.0, 1.0], [5.0, 1.0]).unwrap();

        let solution = solver.solve(Boundaries::new(1, 5), NonZero::new(20).unwrap());

        // Samples 2 and 3 are compared to 2.0 and 4.0 on the saccade line
        assert_eq!(solution.boundaries, Boundaries::new(2, 4));
        assert_eq!(
            solution.errors,
            SquaredErrors {
                source: 0.0,
                saccade: 2.0,
                target: 0.0
            }
        );
        assert_eq!(solution.mse, 2.0 / 6.0);
        // A zero error step exists but isn't reachable from this guess
        assert_eq!(solver.evaluate(Boundaries::new(3, 3)).total(), 0.0);
    }

    /// A single round reports the errors of the boundaries it found, not of the guess.
    #[test]
    fn single_round() {
        let points = array![
            [1.0, 1.0],
            [1.0, 1.0],
            [1.0, 1.0],
            [5.0, 1.0],
            [5.0, 1.0],
            [5.0, 1.0],
        ];
        let mut solver =
            SegmentSolver::<Kahan<f64>>::new(points.view(), [1.0, 1.0], [5.0, 1.0]).unwrap();

        let solution = solver.solve(Boundaries::new(1, 5), NonZero::new(1).unwrap());

        assert_eq!(solution.rounds, 1);
        assert_eq!(solution.boundaries, Boundaries::new(2, 4));
        assert_eq!(solution.errors, solver.evaluate(Boundaries::new(2, 4)));
        assert_ne!(solution.errors, solver.evaluate(Boundaries::new(1, 5)));
    }

    /// The reported error is the mean of the phase errors at the returned boundaries.
    #[test]
    fn solve_reports_consistent_error() {
        let points = array![
            [0.0, 0.0],
            [0.2, -0.1],
            [0.1, 0.1],
            [2.0, 1.0],
            [4.0, 2.1],
            [6.1, 2.9],
            [8.0, 4.0],
            [8.1, 3.9],
            [7.9, 4.1],
        ];
        let mut solver =
            SegmentSolver::<Kahan<f64>>::new(points.view(), [0.0, 0.0], [8.0, 4.0]).unwrap();

        let solution = solver.solve(Boundaries::new(60, 70), NonZero::new(20).unwrap());
        let boundaries = solution.boundaries;
        assert!(boundaries.t_start <= boundaries.t_end);
        assert!(boundaries.t_end <= points.nrows());

        let errors = solver.evaluate(boundaries);
        assert_eq!(errors, solution.errors);
        assert_eq!(solution.mse, errors.total() / 9.0);
    }

    /// Input validation.
    #[test]
    fn invalid_input() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert_eq!(
            SegmentSolver::<Kahan<f64>>::new(empty.view(), [0.0; 2], [0.0; 2]).err(),
            Some(Error::EmptyInput)
        );

        let three = Array2::<f64>::zeros((4, 3));
        assert_eq!(
            SegmentSolver::<Kahan<f64>>::new(three.view(), [0.0; 2], [0.0; 2]).err(),
            Some(Error::InvalidShape { columns: 3 })
        );
    }

    /// Asking for a time beyond the sequence is a bug.
    #[test]
    #[should_panic(expected = "beyond")]
    fn source_beyond_sequence() {
        let points = line();
        let mut solver =
            SegmentSolver::<Kahan<f64>>::new(points.view(), [0.0; 2], [0.0; 2]).unwrap();

        let _ = solver.source_objective(5);
    }
}
