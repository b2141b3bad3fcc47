//! Visited boundary pairs of the EM loop.

use ahash::AHashMap;

use crate::{Boundaries, SquaredErrors};

/// State of a single visited boundary pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visit {
    /// Mean squared error when the pair was first visited.
    pub mse: f64,
    /// Phase errors when the pair was first visited.
    pub errors: SquaredErrors,
}

/// Remembers every visited boundary pair to detect cycles, and the one with the lowest error.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceHistory {
    /// All visited pairs.
    visits: AHashMap<Boundaries, Visit>,
    /// Pair with the lowest error so far.
    minimum: Option<(Boundaries, Visit)>,
}

impl ConvergenceHistory {
    /// Construct an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pair has been recorded before.
    #[must_use]
    pub fn visited(&self, boundaries: Boundaries) -> bool {
        self.visits.contains_key(&boundaries)
    }

    /// Record a visit, ignored when the pair is already known.
    pub fn record(&mut self, boundaries: Boundaries, visit: Visit) {
        if self.visited(boundaries) {
            return;
        }
        self.visits.insert(boundaries, visit);

        // Strictly smaller, so the earliest of equal minima stays
        if self
            .minimum
            .is_none_or(|(_, minimum)| visit.mse < minimum.mse)
        {
            self.minimum = Some((boundaries, visit));
        }
    }

    /// Visited pair with the lowest error, `None` when nothing is recorded yet.
    #[must_use]
    pub const fn minimum(&self) -> Option<(Boundaries, Visit)> {
        self.minimum
    }

    /// Amount of distinct visited pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Whether nothing is recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}
