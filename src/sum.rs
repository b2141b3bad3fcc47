//! Summation accumulators.

pub use accurate::sum::{Kahan, NaiveSum as Naive};

/// Accumulator used for all squared error sums.
///
/// Implemented for [`Kahan`] compensated summation and [`Naive`] summation, the former keeps
/// long prefix sums stable.
pub trait Sum<F>: Clone {
    /// Empty accumulator.
    fn zero() -> Self;

    /// Add a single value.
    #[must_use]
    fn add(self, value: F) -> Self;

    /// Resulting sum.
    fn sum(self) -> F;
}

impl Sum<f64> for Kahan<f64> {
    #[inline]
    fn zero() -> Self {
        <Self as accurate::traits::SumAccumulator<f64>>::zero()
    }

    #[inline]
    fn add(self, value: f64) -> Self {
        self + value
    }

    #[inline]
    fn sum(self) -> f64 {
        <Self as accurate::traits::SumAccumulator<f64>>::sum(self)
    }
}

impl Sum<f64> for Naive<f64> {
    #[inline]
    fn zero() -> Self {
        <Self as accurate::traits::SumAccumulator<f64>>::zero()
    }

    #[inline]
    fn add(self, value: f64) -> Self {
        self + value
    }

    #[inline]
    fn sum(self) -> f64 {
        <Self as accurate::traits::SumAccumulator<f64>>::sum(self)
    }
}
