//! Python bindings.

use ndarray::Array2;
use numpy::IntoPyArray as _;
use pyo3::{prelude::*, types::PyDict};

use crate::{Kahan, SaccadeModel};

/// Fit the saccade model on a list of `[x, y]` gaze points, `None` coordinates are gaps.
///
/// Returns a dict with the `source_points`, `saccade_points` and `target_points` arrays, the
/// `mean_squared_error` and whether the estimation `converged`.
#[pyfunction]
#[pyo3(signature = (pointlist))]
fn fit(py: Python<'_>, pointlist: Vec<[Option<f64>; 2]>) -> PyResult<Bound<'_, PyDict>> {
    let points = points_from_pointlist(&pointlist);

    let fit = SaccadeModel::new().fit::<Kahan<f64>>(&points)?;

    let result = PyDict::new(py);
    result.set_item("source_points", fit.source_points().to_owned().into_pyarray(py))?;
    result.set_item(
        "saccade_points",
        fit.saccade_points().to_owned().into_pyarray(py),
    )?;
    result.set_item("target_points", fit.target_points().to_owned().into_pyarray(py))?;
    result.set_item("mean_squared_error", fit.mean_squared_error())?;
    result.set_item("converged", fit.converged())?;

    Ok(result)
}

/// Convert Python points to an `N x 2` array, `None` becomes `NaN`.
fn points_from_pointlist(pointlist: &[[Option<f64>; 2]]) -> Array2<f64> {
    Array2::from_shape_fn((pointlist.len(), 2), |(row, col)| {
        pointlist[row][col].unwrap_or(f64::NAN)
    })
}

/// Python module.
#[pymodule]
fn saccade_model(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(fit, module)?)?;
    module.add("version", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
