//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors raised while building or rewriting a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not declared in the circuit.
    #[error("Qubit {qubit} not found in circuit{}", gate_context(.gate_name))]
    QubitNotFound {
        /// The missing qubit.
        qubit: QubitId,
        /// Name of the operation that referenced it.
        gate_name: Option<String>,
    },

    /// Classical bit not declared in the circuit.
    #[error("Classical bit {clbit} not found in circuit{}", gate_context(.gate_name))]
    ClbitNotFound {
        /// The missing bit.
        clbit: ClbitId,
        /// Name of the operation that referenced it.
        gate_name: Option<String>,
    },

    /// The same qubit appears twice in one operation.
    #[error("Duplicate qubit {qubit} in operation{}", gate_context(.gate_name))]
    DuplicateQubit {
        /// The repeated qubit.
        qubit: QubitId,
        /// Name of the operation.
        gate_name: Option<String>,
    },

    /// Operand count does not match the gate arity.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Arity of the gate.
        expected: usize,
        /// Operands supplied.
        got: usize,
    },

    /// Measurement with unequal qubit and bit lists.
    #[error("Measurement maps {qubits} qubits onto {clbits} classical bits")]
    MeasureMismatch {
        /// Number of qubits.
        qubits: usize,
        /// Number of classical bits.
        clbits: usize,
    },

    /// Node index does not refer to an operation.
    #[error("Invalid node index")]
    InvalidNode,

    /// Structural problem in the DAG.
    #[error("Invalid DAG structure: {0}")]
    InvalidDag(String),
}

#[allow(clippy::ref_option)]
fn gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
