//! Sum-to-one validation for probability vectors.
//!
//! The same validator checks the initial vector, every transition row and
//! every mixture weight set.

use serde::{Deserialize, Serialize};

use super::entry::{join_entries, sum_entries};

/// Default tolerance for the sum-to-one comparison.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// How a vector's sum is compared against 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SumCheck {
    /// `sum == 1.0` bit for bit.
    Exact,
    /// `|sum - 1| < epsilon`.
    Tolerance { epsilon: f64 },
}

impl Default for SumCheck {
    fn default() -> Self {
        SumCheck::Tolerance {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl SumCheck {
    /// Whether `sum` counts as 1 under this policy.
    pub fn accepts(&self, sum: f64) -> bool {
        match *self {
            SumCheck::Exact => sum == 1.0,
            SumCheck::Tolerance { epsilon } => (sum - 1.0).abs() < epsilon,
        }
    }

    /// Short label for diagnostics.
    pub fn label(&self) -> String {
        match self {
            SumCheck::Exact => "exact".to_string(),
            SumCheck::Tolerance { epsilon } => format!("tolerance({})", epsilon),
        }
    }
}

/// Outcome of validating one vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The vector sums to 1; carries its comma-joined representation.
    Valid(String),
    /// The vector does not sum to 1.
    Invalid { sum: f64 },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid(_))
    }

    /// The accepted joined value, if any.
    pub fn joined(&self) -> Option<&str> {
        match self {
            Verdict::Valid(joined) => Some(joined),
            Verdict::Invalid { .. } => None,
        }
    }
}

/// Checks that an ordered list of entries sums to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProbabilityVectorValidator {
    check: SumCheck,
}

impl ProbabilityVectorValidator {
    pub fn new(check: SumCheck) -> Self {
        Self { check }
    }

    pub fn check(&self) -> SumCheck {
        self.check
    }

    /// Validate entries as typed; absent entries count as zero.
    pub fn validate(&self, entries: &[Option<f64>]) -> Verdict {
        let sum = sum_entries(entries);
        if self.check.accepts(sum) {
            Verdict::Valid(join_entries(entries))
        } else {
            Verdict::Invalid { sum }
        }
    }

    /// Validate a fully populated vector.
    pub fn validate_values(&self, values: &[f64]) -> Verdict {
        let entries: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        self.validate(&entries)
    }
}
