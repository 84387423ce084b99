//! Editable probability vectors.
//!
//! A [`ProbabilityVector`] holds the raw slot values a user entered together
//! with the outcome of the last validation. The initial vector, each
//! transition row and each set of mixture weights is one of these.

use hs_common::{Error, Result};
use hs_math::{ProbabilityVectorValidator, Verdict};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation state of one vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VectorStatus {
    /// Some slots have never been entered.
    Pending,
    /// Sum check passed; holds the comma-joined accepted value.
    Accepted { value: String },
    /// Sum check failed with this sum.
    Rejected { sum: f64 },
}

impl VectorStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VectorStatus::Accepted { .. })
    }

    pub fn accepted(&self) -> Option<&str> {
        match self {
            VectorStatus::Accepted { value } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for VectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorStatus::Pending => write!(f, "pending"),
            VectorStatus::Accepted { value } => write!(f, "accepted ({})", value),
            VectorStatus::Rejected { sum } => write!(f, "rejected (sum {})", sum),
        }
    }
}

/// Slots of one probability vector plus its validation status.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector {
    slots: Vec<Option<f64>>,
    touched: Vec<bool>,
    status: VectorStatus,
}

impl ProbabilityVector {
    /// A vector of `len` untouched slots.
    pub fn new(len: usize) -> Self {
        ProbabilityVector {
            slots: vec![None; len],
            touched: vec![false; len],
            status: VectorStatus::Pending,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Option<f64>] {
        &self.slots
    }

    pub fn status(&self) -> &VectorStatus {
        &self.status
    }

    pub fn accepted(&self) -> Option<&str> {
        self.status.accepted()
    }

    /// Store `value` at 0-based `slot` and re-validate the whole vector.
    ///
    /// `None` records an entry that was given but is empty or not a number;
    /// it counts as 0 in the sum.
    pub fn set(
        &mut self,
        slot: usize,
        value: Option<f64>,
        validator: &ProbabilityVectorValidator,
    ) -> Result<&VectorStatus> {
        let len = self.slots.len();
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or_else(|| Error::not_found(format!("slot {} of {}", slot + 1, len)))?;
        *entry = value;
        self.touched[slot] = true;
        self.revalidate(validator);
        Ok(&self.status)
    }

    /// Append an untouched slot; the vector goes back to pending.
    pub fn push(&mut self) {
        self.slots.push(None);
        self.touched.push(false);
        self.status = VectorStatus::Pending;
    }

    /// Drop a 0-based slot and re-validate what remains.
    pub fn remove(&mut self, slot: usize, validator: &ProbabilityVectorValidator) -> Result<()> {
        if slot >= self.slots.len() {
            return Err(Error::not_found(format!("slot {}", slot + 1)));
        }
        self.slots.remove(slot);
        self.touched.remove(slot);
        self.revalidate(validator);
        Ok(())
    }

    fn revalidate(&mut self, validator: &ProbabilityVectorValidator) {
        if self.slots.is_empty() || self.touched.iter().any(|t| !t) {
            self.status = VectorStatus::Pending;
            return;
        }
        self.status = match validator.validate(&self.slots) {
            Verdict::Valid(value) => VectorStatus::Accepted { value },
            Verdict::Invalid { sum } => VectorStatus::Rejected { sum },
        };
    }
}
