//! Expectation-maximization loop over fixation points and saccade boundaries.

use std::marker::PhantomData;

use ndarray::{ArrayView2, Axis, s};
use tracing::{debug, instrument, warn};

use crate::{
    Boundaries, Error, Point, SaccadeModel, SegmentSolver, SquaredErrors, Sum,
    history::{ConvergenceHistory, Visit},
};

/// Why the EM loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// A boundary pair came back, the visited pair with the lowest error got adopted.
    Cycle,
    /// The iteration cap got reached without any pair coming back, the last iterate got adopted
    /// even when an earlier pair had a lower error.
    IterationCap,
}

/// Outcome of the EM loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Adopted saccade boundaries.
    pub boundaries: Boundaries,
    /// Phase errors at the adopted boundaries.
    pub errors: SquaredErrors,
    /// Mean squared error at the adopted boundaries.
    pub mse: f64,
    /// Amount of distinct boundary pairs visited.
    pub iterations: usize,
    /// Why the loop stopped.
    pub termination: Termination,
}

/// Implementation of the EM loop with state.
pub struct EstimateImpl<S> {
    /// Model configuration.
    model: SaccadeModel,
    /// Visited boundary pairs.
    history: ConvergenceHistory,
    /// Accumulator used by the solver.
    sum: PhantomData<S>,
}

impl<S: Sum<f64>> EstimateImpl<S> {
    /// Setup the structures.
    pub(crate) fn new(model: SaccadeModel) -> Self {
        Self {
            model,
            history: ConvergenceHistory::new(),
            sum: PhantomData,
        }
    }

    /// Run the loop on a gap free sequence.
    #[instrument(level = "debug", skip_all, fields(samples = points.nrows()))]
    pub(crate) fn estimate(&mut self, points: ArrayView2<f64>) -> Result<Estimate, Error> {
        let samples = points.nrows();
        if samples == 0 {
            return Err(Error::EmptyInput);
        }
        if points.ncols() != 2 {
            return Err(Error::InvalidShape {
                columns: points.ncols(),
            });
        }

        // Start with the outermost samples as fixations
        let mut source = [points[[0, 0]], points[[0, 1]]];
        let mut target = [points[[samples - 1, 0]], points[[samples - 1, 1]]];
        let mut guess = Boundaries::new(
            self.model.onset_prior.min(samples),
            self.model.offset_prior.min(samples),
        );

        self.history = ConvergenceHistory::new();
        let mut iteration = 0;
        loop {
            iteration += 1;

            // Expectation: divide the samples over the phases
            let solution = SegmentSolver::<S>::new(points, source, target)?
                .solve(guess, self.model.max_solver_rounds);
            let Boundaries { t_start, t_end } = solution.boundaries;
            if branches::unlikely(t_end < t_start) {
                return Err(Error::InvariantViolation { t_start, t_end });
            }

            // Maximization: fixations become the means of the windows next to the saccade
            source = self.source_window_mean(points, t_start).unwrap_or(source);
            target = self.target_window_mean(points, t_end).unwrap_or(target);
            guess = solution.boundaries;

            // Coming back to a visited pair means the loop will cycle from here
            if self.history.visited(guess)
                && let Some((boundaries, visit)) = self.history.minimum()
            {
                debug!(
                    iteration,
                    t_start = boundaries.t_start,
                    t_end = boundaries.t_end,
                    mse = visit.mse,
                    "boundaries revisited, adopting minimum"
                );

                return Ok(Estimate {
                    boundaries,
                    errors: visit.errors,
                    mse: visit.mse,
                    iterations: self.history.len(),
                    termination: Termination::Cycle,
                });
            }

            self.history.record(
                guess,
                Visit {
                    mse: solution.mse,
                    errors: solution.errors,
                },
            );
            debug!(iteration, t_start, t_end, mse = solution.mse, "EM iteration");

            if iteration >= self.model.max_iterations.get() {
                warn!(
                    iteration,
                    t_start, t_end, "EM iteration cap reached, adopting last iterate"
                );

                return Ok(Estimate {
                    boundaries: solution.boundaries,
                    errors: solution.errors,
                    mse: solution.mse,
                    iterations: self.history.len(),
                    termination: Termination::IterationCap,
                });
            }
        }
    }

    /// Mean of the window of samples right before the saccade start.
    fn source_window_mean(&self, points: ArrayView2<f64>, t_start: usize) -> Option<Point> {
        let end = self.clamp_to_inner(t_start, points.nrows());
        let start = end.saturating_sub(self.model.centroid_window.get());

        mean_point(points.slice(s![start..end, ..]))
    }

    /// Mean of the window of samples right after the saccade end.
    fn target_window_mean(&self, points: ArrayView2<f64>, t_end: usize) -> Option<Point> {
        let samples = points.nrows();
        let start = self.clamp_to_inner(t_end, samples);
        let end = start
            .saturating_add(self.model.centroid_window.get())
            .min(samples);

        mean_point(points.slice(s![start..end, ..]))
    }

    /// Clamp a time to `1..=samples - 1`, so both sides keep at least one sample.
    #[inline]
    const fn clamp_to_inner(&self, time: usize, samples: usize) -> usize {
        // Not `clamp` because it panics for a single sample
        let time = if time < 1 { 1 } else { time };
        let upper = samples.saturating_sub(1);

        if time > upper { upper } else { time }
    }
}

/// Mean of the samples, `None` when there are none.
fn mean_point(points: ArrayView2<f64>) -> Option<Point> {
    points
        .mean_axis(Axis(0))
        .map(|mean| [mean[0], mean[1]])
}
