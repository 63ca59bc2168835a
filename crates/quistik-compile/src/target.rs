//! Compilation target description.

use crate::property::{BasisGates, CouplingMap, ErrorMap, PropertySet};

/// Everything the compiler needs to know about a device.
///
/// Hardware adapters build one of these from the provider's configuration
/// and calibration data.
#[derive(Debug, Clone)]
pub struct Target {
    /// Device name.
    pub name: String,
    /// Number of physical qubits.
    pub num_qubits: u32,
    /// Directed pairs the device can run two-qubit gates on.
    pub coupling_map: CouplingMap,
    /// Native gates.
    pub basis_gates: BasisGates,
    /// Calibrated error rates, if published.
    pub error_map: Option<ErrorMap>,
}

impl Target {
    pub fn new(name: impl Into<String>, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        Self {
            name: name.into(),
            num_qubits: coupling_map.num_qubits(),
            coupling_map,
            basis_gates,
            error_map: None,
        }
    }

    #[must_use]
    pub fn with_error_map(mut self, error_map: ErrorMap) -> Self {
        self.error_map = Some(error_map);
        self
    }

    /// Initial pass properties for this target.
    pub fn properties(&self) -> PropertySet {
        let props = PropertySet::new()
            .with_target(self.coupling_map.clone(), self.basis_gates.clone());
        match &self.error_map {
            Some(errors) => props.with_error_map(errors.clone()),
            None => props,
        }
    }
}
