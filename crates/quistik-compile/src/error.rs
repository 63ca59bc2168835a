//! Error types for the compilation crate.

use quistik_ir::IrError;
use thiserror::Error;

/// Errors raised by compilation passes.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Error bubbled up from the IR.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// A pass needs a coupling map and none was configured.
    #[error("No coupling map configured for the target")]
    MissingCouplingMap,

    /// A pass needs a layout and none was computed.
    #[error("No layout computed; run a layout pass first")]
    MissingLayout,

    /// A pass needs basis gates and none were configured.
    #[error("No basis gates configured for the target")]
    MissingBasisGates,

    /// The circuit has more qubits than the device.
    #[error("Circuit requires {required} qubits but target has only {available}")]
    CircuitTooLarge {
        /// Qubits used by the circuit.
        required: usize,
        /// Qubits on the device.
        available: u32,
    },

    /// Two physical qubits are not connected at all.
    #[error("No path between physical qubits {from} and {to}")]
    RoutingFailed {
        /// Source physical qubit.
        from: u32,
        /// Destination physical qubit.
        to: u32,
    },

    /// A gate cannot be expressed in the target basis.
    #[error("Gate '{gate}' cannot be translated into basis [{basis}]")]
    UntranslatableGate {
        /// The gate name.
        gate: String,
        /// The target basis, comma separated.
        basis: String,
    },

    /// Post-compilation check: gate outside the basis.
    #[error("Gate '{gate}' on {qubits:?} is not in the target basis")]
    GateNotInBasis {
        /// The gate name.
        gate: String,
        /// Its operands.
        qubits: Vec<u32>,
    },

    /// Post-compilation check: two-qubit gate on an unsupported pair.
    #[error("Gate '{gate}' acts on ({control}, {target}), which the coupling map does not support")]
    UncoupledGate {
        /// The gate name.
        gate: String,
        /// First operand.
        control: u32,
        /// Second operand.
        target: u32,
    },

    /// Optimization level outside 0..=3.
    #[error("Invalid optimization level {0}; expected 0, 1, 2 or 3")]
    InvalidOptimizationLevel(u8),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
