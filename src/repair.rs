//! Gap filling of gaze point sequences.
//!
//! Trackers lose the gaze when the subject blinks, such samples have `NaN` coordinates.

use ndarray::{Array2, ArrayView2, AsArray, Ix2};

use crate::Error;

/// Fill every `NaN` coordinate with the previous valid value of the same coordinate.
///
/// Gaps at the start get the first valid value of their coordinate. The input isn't modified.
///
/// # Errors
///
/// - When the sequence is empty.
/// - When a coordinate is `NaN` in every sample.
pub fn forward_fill<'a>(points: impl AsArray<'a, f64, Ix2>) -> Result<Array2<f64>, Error> {
    let points: ArrayView2<'a, f64> = points.into();
    if points.nrows() == 0 {
        return Err(Error::EmptyInput);
    }

    let mut filled = points.to_owned();
    for (axis, mut column) in filled.columns_mut().into_iter().enumerate() {
        let mut previous = column
            .iter()
            .copied()
            .find(|value| !value.is_nan())
            .ok_or(Error::NoValidCoordinate { axis })?;

        column.iter_mut().for_each(|value| {
            if value.is_nan() {
                *value = previous;
            } else {
                previous = *value;
            }
        });
    }

    Ok(filled)
}
