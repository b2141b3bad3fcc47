//! Fitted saccade model.

use ndarray::{Array2, ArrayView2, s};

use crate::{Boundaries, Estimate, SquaredErrors, Termination};

/// Result of [`crate::SaccadeModel::fit`].
///
/// Owns the gap filled sequence, the phases are views into it.
#[derive(Debug, Clone, PartialEq)]
pub struct SaccadeFit {
    /// Gap filled gaze points.
    points: Array2<f64>,
    /// Outcome of the EM loop.
    estimate: Estimate,
}

impl SaccadeFit {
    /// Combine the sequence with the estimate.
    pub(crate) const fn new(points: Array2<f64>, estimate: Estimate) -> Self {
        Self { points, estimate }
    }

    /// Samples of the source fixation.
    #[must_use]
    pub fn source_points(&self) -> ArrayView2<'_, f64> {
        self.points.slice(s![self.estimate.boundaries.source(), ..])
    }

    /// Samples of the saccade.
    #[must_use]
    pub fn saccade_points(&self) -> ArrayView2<'_, f64> {
        self.points.slice(s![self.estimate.boundaries.saccade(), ..])
    }

    /// Samples of the target fixation.
    #[must_use]
    pub fn target_points(&self) -> ArrayView2<'_, f64> {
        let target = self.estimate.boundaries.target(self.points.nrows());

        self.points.slice(s![target, ..])
    }

    /// Mean squared error of the model.
    #[must_use]
    pub const fn mean_squared_error(&self) -> f64 {
        self.estimate.mse
    }

    /// Saccade start and end time.
    #[must_use]
    pub const fn boundaries(&self) -> Boundaries {
        self.estimate.boundaries
    }

    /// Summed squared errors of the phases.
    #[must_use]
    pub const fn squared_errors(&self) -> SquaredErrors {
        self.estimate.errors
    }

    /// Why the estimation stopped.
    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.estimate.termination
    }

    /// Whether the estimation settled on a cycle instead of running into the iteration cap.
    #[must_use]
    pub const fn converged(&self) -> bool {
        matches!(self.estimate.termination, Termination::Cycle)
    }

    /// Amount of distinct saccade boundaries visited.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.estimate.iterations
    }

    /// Gap filled gaze points.
    #[must_use]
    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    /// Take the gap filled gaze points.
    #[must_use]
    pub fn into_points(self) -> Array2<f64> {
        self.points
    }
}
