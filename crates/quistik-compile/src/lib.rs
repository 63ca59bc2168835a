//! Quistik compilation framework.
//!
//! Turns a logical [`Circuit`](quistik_ir::Circuit) into an ISA circuit for
//! a concrete device: every gate in the device basis, every two-qubit gate
//! on a coupled pair in a calibrated direction.
//!
//! # Pipeline
//!
//! ```text
//! Logical circuit
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (coupling map, basis gates, errors, layout)
//! └─────────────┘
//!       │
//!       ├── TrivialLayout / SubgraphLayout
//!       ├── SwapRouting
//!       ├── BasisTranslation
//!       ├── Optimize1qGates / CancelInversePairs / RemoveDiagonalBeforeMeasure
//!       └── BasisVerification
//!       │
//!       ▼
//! Physical circuit
//! ```
//!
//! # Example
//!
//! ```rust
//! use quistik_compile::{BasisGates, CouplingMap, Target, transpile};
//! use quistik_ir::Circuit;
//!
//! let target = Target::new("line", CouplingMap::from_pairs(3, [(0, 1), (1, 2)]), BasisGates::ibm_eagle());
//! let compiled = transpile(&Circuit::bell()?, &target, 3)?;
//! assert_eq!(compiled.dag().count_ops().get("ecr"), Some(&1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Optimization levels
//!
//! | Level | Added passes |
//! |-------|--------------|
//! | 0 | layout, routing, translation, verification |
//! | 1 | `Optimize1qGates` |
//! | 2 | cancellation and 1q merging repeated to a fixed point |
//! | 3 | error-aware `SubgraphLayout`, diagonal removal before measurement |
//!
//! Custom passes implement [`Pass`] and are added with
//! [`PassManager::add_pass`].

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;
pub mod target;
pub mod transpile;
pub mod unitary;

pub use error::{CompileError, CompileResult};
pub use manager::{FixedPoint, PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use property::{BasisGates, CouplingMap, ErrorMap, Layout, PropertySet};
pub use target::Target;
pub use transpile::{MAX_OPTIMIZATION_LEVEL, transpile};
