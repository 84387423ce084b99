//! Initial-state probability vector.

use hs_common::{Error, Result};
use hs_math::ProbabilityVectorValidator;

use super::probability::{ProbabilityVector, VectorStatus};

/// One probability slot per state. Rebuilt from scratch whenever the
/// state count changes.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialVectorBuilder {
    vector: ProbabilityVector,
}

impl InitialVectorBuilder {
    pub fn new(states: usize) -> Self {
        InitialVectorBuilder {
            vector: ProbabilityVector::new(states),
        }
    }

    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Set the probability of starting in `state` (1-based).
    pub fn set(
        &mut self,
        state: usize,
        value: Option<f64>,
        validator: &ProbabilityVectorValidator,
    ) -> Result<VectorStatus> {
        let slot = state
            .checked_sub(1)
            .filter(|slot| *slot < self.vector.len())
            .ok_or_else(|| Error::not_found(format!("initial probability of state {}", state)))?;
        self.vector.set(slot, value, validator).cloned()
    }

    pub fn vector(&self) -> &ProbabilityVector {
        &self.vector
    }

    pub fn status(&self) -> &VectorStatus {
        self.vector.status()
    }

    pub fn accepted(&self) -> Option<&str> {
        self.vector.accepted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_one_based() {
        let validator = ProbabilityVectorValidator::default();
        let mut ipv = InitialVectorBuilder::new(2);
        assert!(ipv.set(0, Some(1.0), &validator).is_err());
        assert!(ipv.set(3, Some(1.0), &validator).is_err());
        ipv.set(1, Some(0.6), &validator).unwrap();
        let status = ipv.set(2, Some(0.4), &validator).unwrap();
        assert_eq!(status.accepted(), Some("0.6,0.4"));
        assert_eq!(ipv.accepted(), Some("0.6,0.4"));
    }
}
