//! Backend selection.
//!
//! A [`BackendFilter`] narrows the provider's device list the way
//! `least_busy(operational=True, simulator=False, min_num_qubits=127)`
//! does: every set criterion must hold, and among the survivors the
//! device with the shortest queue wins.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HalError, HalResult};

/// What the selection needs to know about a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSummary {
    pub name: String,
    pub num_qubits: u32,
    pub simulator: bool,
    pub operational: bool,
    /// Jobs waiting in the device queue.
    pub pending_jobs: u32,
}

/// Criteria a device must satisfy. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendFilter {
    pub operational: Option<bool>,
    pub simulator: Option<bool>,
    pub min_num_qubits: Option<u32>,
    pub name: Option<String>,
}

impl BackendFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn operational(mut self, operational: bool) -> Self {
        self.operational = Some(operational);
        self
    }

    #[must_use]
    pub fn simulator(mut self, simulator: bool) -> Self {
        self.simulator = Some(simulator);
        self
    }

    #[must_use]
    pub fn min_num_qubits(mut self, n: u32) -> Self {
        self.min_num_qubits = Some(n);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn matches(&self, backend: &BackendSummary) -> bool {
        self.operational.is_none_or(|op| backend.operational == op)
            && self.simulator.is_none_or(|sim| backend.simulator == sim)
            && self.min_num_qubits.is_none_or(|n| backend.num_qubits >= n)
            && self.name.as_ref().is_none_or(|name| &backend.name == name)
    }

    /// Matching devices, shortest queue first. Ties keep provider order.
    pub fn apply<I>(&self, candidates: I) -> Vec<BackendSummary>
    where
        I: IntoIterator<Item = BackendSummary>,
    {
        let mut matching: Vec<_> = candidates.into_iter().filter(|b| self.matches(b)).collect();
        matching.sort_by_key(|b| b.pending_jobs);
        matching
    }

    /// The matching device with the fewest pending jobs.
    pub fn least_busy<I>(&self, candidates: I) -> HalResult<BackendSummary>
    where
        I: IntoIterator<Item = BackendSummary>,
    {
        let chosen = self
            .apply(candidates)
            .into_iter()
            .next()
            .ok_or_else(|| HalError::NoMatchingBackend(self.to_string()))?;
        debug!(
            "least busy backend: {} ({} pending jobs)",
            chosen.name, chosen.pending_jobs
        );
        Ok(chosen)
    }
}

impl fmt::Display for BackendFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![];
        if let Some(op) = self.operational {
            parts.push(format!("operational={op}"));
        }
        if let Some(sim) = self.simulator {
            parts.push(format!("simulator={sim}"));
        }
        if let Some(n) = self.min_num_qubits {
            parts.push(format!("min_num_qubits={n}"));
        }
        if let Some(name) = &self.name {
            parts.push(format!("name={name}"));
        }
        if parts.is_empty() {
            write!(f, "(any)")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, qubits: u32, sim: bool, op: bool, pending: u32) -> BackendSummary {
        BackendSummary {
            name: name.into(),
            num_qubits: qubits,
            simulator: sim,
            operational: op,
            pending_jobs: pending,
        }
    }

    fn fleet() -> Vec<BackendSummary> {
        vec![
            summary("ibm_brisbane", 127, false, true, 40),
            summary("ibm_sherbrooke", 127, false, true, 12),
            summary("ibm_kyiv", 127, false, false, 0),
            summary("ibm_fez", 156, false, true, 12),
            summary("simulator_stabilizer", 5000, true, true, 0),
            summary("ibm_small", 27, false, true, 0),
        ]
    }

    fn default_filter() -> BackendFilter {
        BackendFilter::new()
            .operational(true)
            .simulator(false)
            .min_num_qubits(127)
    }

    #[test]
    fn test_least_busy_picks_shortest_queue() {
        let chosen = default_filter().least_busy(fleet()).unwrap();
        // ibm_kyiv is idle but offline; sherbrooke wins the tie by order.
        assert_eq!(chosen.name, "ibm_sherbrooke");
    }

    #[test]
    fn test_apply_orders_by_queue() {
        let names: Vec<_> = default_filter()
            .apply(fleet())
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, ["ibm_sherbrooke", "ibm_fez", "ibm_brisbane"]);
    }

    #[test]
    fn test_no_match_is_an_error() {
        let err = default_filter()
            .min_num_qubits(10_000)
            .least_busy(fleet())
            .unwrap_err();
        assert!(matches!(err, HalError::NoMatchingBackend(ref f) if f.contains("10000")));
    }

    #[test]
    fn test_name_filter() {
        let chosen = BackendFilter::new().name("ibm_fez").least_busy(fleet()).unwrap();
        assert_eq!(chosen.num_qubits, 156);
        assert_eq!(BackendFilter::new().to_string(), "(any)");
    }
}
