//! Measurement results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Histogram of measured bitstrings.
///
/// Bitstrings are written most significant classical bit first, so `"01"`
/// means `c[0] = 1`, `c[1] = 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<String, u64>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Observations of `bitstring`, 0 if it never occurred.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The most frequent outcome; ties go to the smallest bitstring.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, v)| (k.as_str(), *v))
    }

    /// Outcomes sorted by descending count.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Relative frequency of each outcome.
    pub fn probabilities(&self) -> BTreeMap<String, f64> {
        let total = self.total_shots();
        if total == 0 {
            return BTreeMap::new();
        }
        self.counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total as f64))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bitstring, count) in iter {
            counts.insert(bitstring, count);
        }
        counts
    }
}

/// Formats like a Python dict: `{'00': 510, '11': 514}`.
impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (bitstring, count)) in self.counts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{bitstring}': {count}")?;
        }
        write!(f, "}}")
    }
}

/// Result of a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measured outcomes.
    pub counts: Counts,
    /// Shots actually executed.
    pub shots: u32,
    /// Wall-clock execution time reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Provider-specific metadata.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl ExecutionResult {
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell_counts() -> Counts {
        [("00", 510), ("11", 514)].into_iter().collect()
    }

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert("01", 2);
        counts.insert("01", 3);
        assert_eq!(counts.get("01"), 5);
        assert_eq!(counts.get("10"), 0);
        assert_eq!(counts.total_shots(), 5);
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_most_frequent_and_sorted() {
        let counts = bell_counts();
        assert_eq!(counts.most_frequent(), Some(("11", 514)));
        assert_eq!(counts.sorted(), vec![("11", 514), ("00", 510)]);
        assert!(Counts::new().most_frequent().is_none());
    }

    #[test]
    fn test_probabilities() {
        let probs: Counts = [("0", 1), ("1", 3)].into_iter().collect();
        let p = probs.probabilities();
        assert!((p["1"] - 0.75).abs() < 1e-12);
        assert!(Counts::new().probabilities().is_empty());
    }

    #[test]
    fn test_display_like_dict() {
        assert_eq!(bell_counts().to_string(), "{'00': 510, '11': 514}");
        assert_eq!(Counts::new().to_string(), "{}");
    }

    #[test]
    fn test_execution_result_serialization() {
        let result = ExecutionResult::new(bell_counts(), 1024).with_execution_time(1500);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["counts"]["00"], 510);
        assert_eq!(json["execution_time_ms"], 1500);
        assert!(json.get("metadata").is_none());
    }
}
