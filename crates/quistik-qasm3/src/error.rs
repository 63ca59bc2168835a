//! Error types for the QASM3 emitter.

use thiserror::Error;

/// Errors that can occur while emitting `OpenQASM` 3.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Qasm3Error {
    /// A gate angle is NaN or infinite.
    #[error("Gate '{gate}' has a non-finite parameter")]
    NonFiniteParameter { gate: String },

    /// A measurement without a matching classical bit for every qubit.
    #[error("Measurement on {qubits} qubits writes {clbits} classical bits")]
    MeasureMismatch { qubits: usize, clbits: usize },

    /// Writing to the output buffer failed.
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result type for emitter operations.
pub type Qasm3Result<T> = Result<T, Qasm3Error>;
