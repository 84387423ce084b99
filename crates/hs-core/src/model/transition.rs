//! State-transition probability matrix.

use hs_common::{Error, Result};
use hs_math::ProbabilityVectorValidator;

use super::probability::{ProbabilityVector, VectorStatus};

/// One row per source state; each row is validated on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrixBuilder {
    rows: Vec<ProbabilityVector>,
}

impl TransitionMatrixBuilder {
    /// An N×N matrix of untouched slots.
    pub fn new(states: usize) -> Self {
        TransitionMatrixBuilder {
            rows: (0..states).map(|_| ProbabilityVector::new(states)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Set the probability of moving from state `from` to state `to`
    /// (both 1-based). Only the owning row is re-validated.
    pub fn set(
        &mut self,
        from: usize,
        to: usize,
        value: Option<f64>,
        validator: &ProbabilityVectorValidator,
    ) -> Result<VectorStatus> {
        let n = self.rows.len();
        let slot = to
            .checked_sub(1)
            .filter(|slot| *slot < n)
            .ok_or_else(|| Error::not_found(format!("transition {} -> {}", from, to)))?;
        let row = from
            .checked_sub(1)
            .and_then(|r| self.rows.get_mut(r))
            .ok_or_else(|| Error::not_found(format!("transition row {}", from)))?;
        row.set(slot, value, validator).cloned()
    }

    /// Row of source state `from` (1-based).
    pub fn row(&self, from: usize) -> Option<&ProbabilityVector> {
        from.checked_sub(1).and_then(|r| self.rows.get(r))
    }

    pub fn rows(&self) -> &[ProbabilityVector] {
        &self.rows
    }

    /// Accepted joined value of each row, in row order.
    pub fn accepted_rows(&self) -> Vec<Option<&str>> {
        self.rows.iter().map(|row| row.accepted()).collect()
    }
}
