//! Fixation, saccade, fixation model estimation for gaze point sequences.
//!
//! A sequence of 2D gaze points is split into a source fixation, a saccade moving in a straight
//! line from the source to the target, and a target fixation. The fixation points and the
//! saccade boundaries are estimated in an expectation-maximization manner:
//!
//! 1. The first and last samples are the initial fixation points.
//! 2. Expectation: with fixed fixation points, find the saccade start and end times minimizing
//!    the summed squared error, see [`SegmentSolver`].
//! 3. Maximization: the means of the samples right before and after the saccade become the new
//!    fixation points.
//! 4. Repeat until a pair of saccade boundaries comes back.
//!
//! ```
//! use saccade_model::{Kahan, SaccadeModel};
//!
//! let points = ndarray::array![
//!     [100.0, 100.0],
//!     [101.0, 99.0],
//!     [120.0, 110.0],
//!     [160.0, 130.0],
//!     [200.0, 150.0],
//!     [240.0, 170.0],
//!     [280.0, 190.0],
//!     [300.0, 200.0],
//!     [320.0, 210.0],
//!     [321.0, 209.0],
//! ];
//!
//! let fit = SaccadeModel::new().fit::<Kahan<f64>>(&points)?;
//! assert_eq!(fit.source_points().nrows(), 2);
//! assert_eq!(fit.saccade_points().nrows(), 6);
//! assert_eq!(fit.target_points().nrows(), 2);
//! # Ok::<(), saccade_model::Error>(())
//! ```

mod error;
mod estimator;
mod fit;
mod history;
#[cfg(feature = "python")]
mod python;
pub mod repair;
mod solver;
mod sum;
mod triangle;

use std::num::NonZero;

pub use error::Error;
pub use estimator::{Estimate, Termination};
pub use fit::SaccadeFit;
pub use history::{ConvergenceHistory, Visit};
use ndarray::{ArrayView2, AsArray, Ix2};
pub use solver::{Boundaries, Point, SegmentSolver, Solution, SquaredErrors};
pub use sum::{Kahan, Naive, Sum};
use tracing::instrument;
pub use triangle::Triangle;

use crate::estimator::EstimateImpl;

/// Saccade model estimation.
///
/// Times are expressed in samples, so the priors depend on the sampling rate of the tracker.
///
/// # Defaults
///
/// - `onset_prior`: `60`, average saccadic reaction time
/// - `offset_prior`: `70`, average saccade end
/// - `centroid_window`: `30`
/// - `max_iterations`: `50`
/// - `max_solver_rounds`: `20`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaccadeModel {
    /// Initial guess of the saccade start time.
    onset_prior: usize,
    /// Initial guess of the saccade end time.
    offset_prior: usize,
    /// Maximum amount of samples averaged into a fixation point.
    centroid_window: NonZero<usize>,
    /// Maximum amount of EM iterations.
    max_iterations: NonZero<usize>,
    /// Maximum amount of alternating rounds of the boundary search.
    max_solver_rounds: NonZero<usize>,
}

impl SaccadeModel {
    /// Construct a new model with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            onset_prior: 60,
            offset_prior: 70,
            centroid_window: NonZero::new(30).expect("Invalid number"),
            max_iterations: NonZero::new(50).expect("Invalid number"),
            max_solver_rounds: NonZero::new(20).expect("Invalid number"),
        }
    }

    /// Set the initial guess of the saccade start time, in samples.
    #[must_use]
    pub const fn with_onset_prior(mut self, onset_prior: usize) -> Self {
        self.onset_prior = onset_prior;

        self
    }

    /// Set the initial guess of the saccade end time, in samples.
    #[must_use]
    pub const fn with_offset_prior(mut self, offset_prior: usize) -> Self {
        self.offset_prior = offset_prior;

        self
    }

    /// Set the maximum amount of samples next to the saccade averaged into a fixation point.
    #[must_use]
    pub const fn with_centroid_window(mut self, centroid_window: NonZero<usize>) -> Self {
        self.centroid_window = centroid_window;

        self
    }

    /// Set the maximum amount of EM iterations.
    ///
    /// When reached without visiting a pair of boundaries twice, the last iterate is returned.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: NonZero<usize>) -> Self {
        self.max_iterations = max_iterations;

        self
    }

    /// Set the maximum amount of alternating rounds of the boundary search.
    #[must_use]
    pub const fn with_max_solver_rounds(mut self, max_solver_rounds: NonZero<usize>) -> Self {
        self.max_solver_rounds = max_solver_rounds;

        self
    }

    /// Fit the model on a sequence of `[x, y]` gaze points.
    ///
    /// `NaN` coordinates are gaps, they are filled with the previous valid value first.
    ///
    /// # Errors
    ///
    /// - When the input is empty or not two dimensional.
    /// - When a coordinate doesn't contain any valid value.
    /// - When the boundary search breaks its ordering invariant.
    #[instrument(level = "debug", skip_all)]
    pub fn fit<'a, S>(&self, points: impl AsArray<'a, f64, Ix2>) -> Result<SaccadeFit, Error>
    where
        S: Sum<f64>,
    {
        let points: ArrayView2<'a, f64> = points.into();
        if points.ncols() != 2 {
            return Err(Error::InvalidShape {
                columns: points.ncols(),
            });
        }

        let points = repair::forward_fill(points)?;
        let estimate = EstimateImpl::<S>::new(*self).estimate(points.view())?;

        Ok(SaccadeFit::new(points, estimate))
    }

    /// Fit the model on many independent sequences, spread across threads.
    ///
    /// Results are in the same order as the sequences.
    #[cfg(feature = "rayon")]
    pub fn par_fit<S>(&self, sequences: &[ArrayView2<'_, f64>]) -> Vec<Result<SaccadeFit, Error>>
    where
        S: Sum<f64>,
    {
        use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

        sequences
            .par_iter()
            .map(|sequence| self.fit::<S>(sequence))
            .collect()
    }
}

impl Default for SaccadeModel {
    fn default() -> Self {
        Self::new()
    }
}
