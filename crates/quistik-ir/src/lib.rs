//! Circuit intermediate representation for quistik.
//!
//! Circuits are stored as a DAG of instructions over qubit and classical
//! wires. The [`Circuit`] type wraps the DAG with a builder API; compiler
//! passes work on the [`CircuitDag`] directly.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use quistik_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit
//!     .h(QubitId(0))?
//!     .cx(QubitId(0), QubitId(1))?
//!     .measure_many(&[QubitId(0), QubitId(1)], &[ClbitId(0), ClbitId(1)])?;
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! # Ok::<(), quistik_ir::IrError>(())
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Identity and Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `SX`, `SXdg` | 1 | sqrt(X) and its inverse |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CY`, `CZ` | 2 | Controlled Paulis |
//! | `ECR` | 2 | Echoed cross-resonance |
//! | `Swap` | 2 | SWAP gate |

pub mod circuit;
pub mod dag;
mod drawing;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, CircuitLevel, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{StandardGate, format_angle};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
