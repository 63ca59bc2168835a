//! Backend capability introspection.
//!
//! [`Capabilities`] describes what a device can run: qubit count, gate set,
//! connectivity and shot limits. The compiler builds its target from these;
//! [`Backend::validate`](crate::Backend::validate) checks circuits against
//! them.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a quantum backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set (OpenQASM 3 naming convention).
    pub gate_set: GateSet,
    /// Qubit connectivity.
    pub topology: Topology,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Processor family, e.g. `Eagle` or `Heron`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_family: Option<String>,
}

impl Capabilities {
    /// Capabilities of an IBM device from its reported configuration.
    pub fn ibm(
        name: impl Into<String>,
        num_qubits: u32,
        basis_gates: &[String],
        coupling_map: Vec<(u32, u32)>,
    ) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::from_basis(basis_gates),
            topology: Topology::heavy_hex(coupling_map),
            max_shots: 100_000,
            is_simulator: false,
            processor_family: None,
        }
    }

    /// Noise-free simulator with all-to-all connectivity.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            topology: Topology::full(num_qubits),
            max_shots: 100_000,
            is_simulator: true,
            processor_family: None,
        }
    }

    #[must_use]
    pub fn with_max_shots(mut self, max_shots: u32) -> Self {
        self.max_shots = max_shots;
        self
    }

    #[must_use]
    pub fn with_simulator(mut self, is_simulator: bool) -> Self {
        self.is_simulator = is_simulator;
        self
    }

    #[must_use]
    pub fn with_processor_family(mut self, family: impl Into<String>) -> Self {
        self.processor_family = Some(family.into());
        self
    }
}

/// Instructions every backend accepts without listing them as gates.
const DIRECTIVES: [&str; 5] = ["measure", "reset", "barrier", "delay", "init_qubits"];

/// Known two-qubit gate names.
const TWO_QUBIT: [&str; 7] = ["cx", "cy", "cz", "ecr", "swap", "rzz", "iswap"];

/// Gate set supported by a backend.
///
/// Gate names follow the OpenQASM 3 naming convention (lowercase). The
/// `native` list is what the device executes without decomposition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Native gates.
    pub native: Vec<String>,
}

impl GateSet {
    /// Split a flat basis list (as reported by the provider) by arity.
    /// Directives such as `measure` are dropped.
    pub fn from_basis(basis: &[String]) -> Self {
        let mut set = GateSet::default();
        for gate in basis {
            let name = gate.to_lowercase();
            if DIRECTIVES.contains(&name.as_str()) {
                continue;
            }
            if TWO_QUBIT.contains(&name.as_str()) {
                set.two_qubit.push(name.clone());
            } else {
                set.single_qubit.push(name.clone());
            }
            set.native.push(name);
        }
        set
    }

    /// IBM Eagle: `ecr`, `rz`, `sx`, `x`.
    pub fn ibm_eagle() -> Self {
        Self::from_basis(&["ecr", "id", "rz", "sx", "x"].map(String::from))
    }

    /// IBM Heron: `cz`, `rz`, `sx`, `x`.
    pub fn ibm_heron() -> Self {
        Self::from_basis(&["cz", "id", "rz", "sx", "x"].map(String::from))
    }

    /// Every gate the IR knows.
    pub fn universal() -> Self {
        Self::from_basis(
            &[
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry",
                "rz", "p", "u", "cx", "cy", "cz", "ecr", "swap",
            ]
            .map(String::from),
        )
    }

    /// Whether the gate (or directive) can be submitted.
    pub fn contains(&self, gate: &str) -> bool {
        DIRECTIVES.contains(&gate)
            || self.single_qubit.iter().any(|g| g == gate)
            || self.two_qubit.iter().any(|g| g == gate)
    }

    /// Native gate names, the basis the compiler targets.
    pub fn names(&self) -> Vec<String> {
        self.native.clone()
    }
}

/// Qubit connectivity.
///
/// Edges are directed `(control, target)` pairs as calibrated on the
/// device; [`Topology::is_connected`] ignores direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    /// Kind of topology.
    pub kind: TopologyKind,
    /// Coupling edges.
    pub edges: Vec<(u32, u32)>,
}

impl Topology {
    /// Create a linear topology, calibrated in both directions.
    pub fn linear(n: u32) -> Self {
        let edges = (0..n.saturating_sub(1))
            .flat_map(|i| [(i, i + 1), (i + 1, i)])
            .collect();
        Self {
            kind: TopologyKind::Linear,
            edges,
        }
    }

    /// Create a fully connected topology.
    pub fn full(n: u32) -> Self {
        let mut edges = vec![];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    edges.push((i, j));
                }
            }
        }
        Self {
            kind: TopologyKind::FullyConnected,
            edges,
        }
    }

    /// IBM heavy-hex lattice from the device's coupling map.
    pub fn heavy_hex(edges: Vec<(u32, u32)>) -> Self {
        Self {
            kind: TopologyKind::HeavyHex,
            edges,
        }
    }

    /// Create a custom topology from edges.
    pub fn custom(edges: Vec<(u32, u32)>) -> Self {
        Self {
            kind: TopologyKind::Custom,
            edges,
        }
    }

    /// Check if two qubits are connected in either direction.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.edges
            .iter()
            .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
    }
}

/// Kind of qubit topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyKind {
    /// Fully connected (all-to-all).
    FullyConnected,
    /// Linear chain.
    Linear,
    /// Heavy-hex lattice (IBM Eagle/Heron processors).
    HeavyHex,
    /// Custom topology.
    Custom,
}
