//! Example of fitting the saccade model on `x,y` CSV files.
//!
//! Set `RUST_LOG=saccade_model=debug` to see the EM iterations.

use std::{error::Error, fs::File};

use csv::ReaderBuilder;
use ndarray::Array2;
use ndarray_csv::Array2Reader as _;
use saccade_model::{Kahan, SaccadeModel};
use tracing_subscriber::EnvFilter;

pub fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Try to read each argument as a file
    for arg in std::env::args().skip(1) {
        eprintln!("Reading file '{arg}'");

        // Read CSV file, empty cells are not allowed so gaps must be written as `NaN`
        let mut file = File::open(arg)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .from_reader(&mut file);

        // Convert to array
        let points: Array2<f64> = reader.deserialize_array2_dynamic()?;

        // Run the algorithm
        match SaccadeModel::new().fit::<Kahan<f64>>(&points) {
            Ok(fit) => {
                let boundaries = fit.boundaries();
                println!(
                    "source: {}, saccade: {} ({}..{}), target: {}, mse: {}, converged: {}",
                    fit.source_points().nrows(),
                    fit.saccade_points().nrows(),
                    boundaries.t_start,
                    boundaries.t_end,
                    fit.target_points().nrows(),
                    fit.mean_squared_error(),
                    fit.converged()
                );
            }
            // Print the error
            Err(err) => eprintln!("Error fitting saccade model: {err}"),
        }
    }

    Ok(())
}
