//! Error types.

/// Errors that can occur during calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Sequence doesn't contain any sample.
    #[error("gaze point sequence is empty")]
    EmptyInput,
    /// A coordinate is missing in every sample so gaps can't be filled.
    #[error("coordinate {axis} has no valid value to fill gaps with")]
    NoValidCoordinate {
        /// Column of the coordinate, `0` for x and `1` for y.
        axis: usize,
    },
    /// Samples are not two dimensional.
    #[error("expected gaze points with 2 columns, got {columns}")]
    InvalidShape {
        /// Amount of columns in the input.
        columns: usize,
    },
    /// Solver produced a saccade ending before it started.
    #[error("saccade ends at {t_end} before it starts at {t_start}")]
    InvariantViolation {
        /// Returned saccade start time.
        t_start: usize,
        /// Returned saccade end time.
        t_end: usize,
    },
}

impl Error {
    /// Whether the error is caused by the input instead of the calculation.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::NoValidCoordinate { .. } | Self::InvalidShape { .. }
        )
    }
}

#[cfg(feature = "python")]
impl From<Error> for pyo3::PyErr {
    fn from(error: Error) -> Self {
        if error.is_input_error() {
            pyo3::exceptions::PyValueError::new_err(error.to_string())
        } else {
            pyo3::exceptions::PyRuntimeError::new_err(error.to_string())
        }
    }
}
