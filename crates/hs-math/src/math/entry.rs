//! Numeric entries as typed into a probability editor.
//!
//! An entry is `None` until the user types something that parses as a finite
//! number. Absent entries count as zero in sums and render as `0` when a
//! vector is joined for the wire format.

/// Parse one raw text input leniently.
///
/// Surrounding whitespace is ignored. Empty, non-numeric and non-finite
/// inputs all yield `None`.
pub fn parse_entry(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Value an entry contributes to a sum.
#[inline]
pub fn entry_value(entry: Option<f64>) -> f64 {
    entry.unwrap_or(0.0)
}

/// Sum of a sequence of entries, absent ones counting as zero.
///
/// Accumulates from the last entry towards the first. This is the order the
/// legacy editor used, which matters when the sum is compared exactly.
pub fn sum_entries(entries: &[Option<f64>]) -> f64 {
    entries
        .iter()
        .rev()
        .fold(0.0, |acc, entry| entry_value(*entry) + acc)
}

/// Render one entry for the wire format.
///
/// Uses the shortest representation that parses back to the same `f64`.
pub fn format_entry(entry: Option<f64>) -> String {
    format!("{}", entry_value(entry))
}

/// Comma-join a sequence of entries.
pub fn join_entries(entries: &[Option<f64>]) -> String {
    entries
        .iter()
        .map(|e| format_entry(*e))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_lenient() {
        assert_eq!(parse_entry("0.25"), Some(0.25));
        assert_eq!(parse_entry("  1 "), Some(1.0));
        assert_eq!(parse_entry(""), None);
        assert_eq!(parse_entry("   "), None);
        assert_eq!(parse_entry("abc"), None);
        assert_eq!(parse_entry("NaN"), None);
        assert_eq!(parse_entry("inf"), None);
    }

    #[test]
    fn test_sum_treats_missing_as_zero() {
        assert_eq!(sum_entries(&[Some(0.5), None, Some(0.5)]), 1.0);
        assert_eq!(sum_entries(&[]), 0.0);
        assert_eq!(sum_entries(&[None, None]), 0.0);
    }

    #[test]
    fn test_sum_accumulates_from_the_back() {
        // 0.1 + (0.2 + 0.7) is one ulp short of 1.0 in binary floating point.
        assert_eq!(sum_entries(&[Some(0.1), Some(0.2), Some(0.7)]), 0.1 + (0.2 + 0.7));
        assert_ne!(sum_entries(&[Some(0.1), Some(0.2), Some(0.7)]), 1.0);
    }

    #[test]
    fn test_join_entries() {
        assert_eq!(join_entries(&[Some(0.6), Some(0.4)]), "0.6,0.4");
        assert_eq!(join_entries(&[Some(1.0), None]), "1,0");
        assert_eq!(join_entries(&[]), "");
    }
}
