//! Property-based tests for hs-math validation.
//!
//! Uses proptest to verify the sum-to-one check across many random vectors.

use hs_math::{
    join_entries, parse_entry, sum_entries, ProbabilityVectorValidator, SumCheck, Verdict,
};
use proptest::prelude::*;

/// Strategy: a vector of 1..=6 strictly positive raw weights.
fn raw_weights() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01..10.0f64, 1..=6)
}

fn normalize(raw: &[f64]) -> Vec<f64> {
    let total: f64 = raw.iter().sum();
    raw.iter().map(|w| w / total).collect()
}

// ============================================================================
// Tolerant check
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any normalized vector passes the tolerant check.
    #[test]
    fn normalized_vectors_are_valid(raw in raw_weights()) {
        let values = normalize(&raw);
        let validator = ProbabilityVectorValidator::default();
        prop_assert!(validator.validate_values(&values).is_valid(), "{:?}", values);
    }

    /// Scaling a normalized vector away from 1 makes it invalid.
    #[test]
    fn scaled_vectors_are_invalid(raw in raw_weights(), factor in 1.01..3.0f64) {
        let values: Vec<f64> = normalize(&raw).iter().map(|v| v * factor).collect();
        let validator = ProbabilityVectorValidator::default();
        let verdict = validator.validate_values(&values);
        match verdict {
            Verdict::Invalid { sum } => prop_assert!((sum - factor).abs() < 1e-9),
            Verdict::Valid(joined) => prop_assert!(false, "unexpectedly valid: {}", joined),
        }
    }

    /// The joined representation parses back to the exact input values.
    #[test]
    fn joined_values_parse_back(raw in raw_weights()) {
        let values = normalize(&raw);
        let validator = ProbabilityVectorValidator::default();
        let verdict = validator.validate_values(&values);
        let joined = verdict.joined().expect("normalized vector should be valid");
        let parsed: Vec<f64> = joined
            .split(',')
            .map(|s| parse_entry(s).expect("joined entry should parse"))
            .collect();
        prop_assert_eq!(parsed, values);
    }

    /// Inserting empty entries never changes the sum.
    #[test]
    fn empty_entries_contribute_nothing(raw in raw_weights(), at in 0usize..6) {
        let mut entries: Vec<Option<f64>> = raw.iter().copied().map(Some).collect();
        let before = sum_entries(&entries);
        let at = at.min(entries.len());
        entries.insert(at, None);
        prop_assert_eq!(sum_entries(&entries), before);
        prop_assert_eq!(join_entries(&entries).split(',').count(), raw.len() + 1);
    }
}

// ============================================================================
// Exact check
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The exact check agrees with a direct comparison of the folded sum.
    #[test]
    fn exact_check_matches_folded_sum(raw in raw_weights()) {
        let values = normalize(&raw);
        let entries: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        let exact = ProbabilityVectorValidator::new(SumCheck::Exact);
        prop_assert_eq!(exact.validate(&entries).is_valid(), sum_entries(&entries) == 1.0);
    }

    /// Anything the exact check accepts, the tolerant check accepts too.
    #[test]
    fn exact_implies_tolerant(raw in raw_weights()) {
        let values = normalize(&raw);
        let exact = ProbabilityVectorValidator::new(SumCheck::Exact);
        let tolerant = ProbabilityVectorValidator::default();
        if exact.validate_values(&values).is_valid() {
            prop_assert!(tolerant.validate_values(&values).is_valid());
        }
    }
}
