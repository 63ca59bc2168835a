//! `OpenQASM` 3 emitter for quistik.
//!
//! Serializes a [`Circuit`](quistik_ir::Circuit) to the `OpenQASM` 3 text
//! accepted by IBM Quantum's runtime primitives.
//!
//! ```rust
//! use quistik_ir::Circuit;
//! use quistik_qasm3::emit;
//!
//! let qasm = emit(&Circuit::bell()?)?;
//! assert!(qasm.contains("OPENQASM 3.0;"));
//! assert!(qasm.contains("cx q[0], q[1];"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod emitter;
mod error;

pub use emitter::emit;
pub use error::{Qasm3Error, Qasm3Result};
