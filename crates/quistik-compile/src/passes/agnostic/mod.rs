//! Target-agnostic compilation passes.
//!
//! These passes only look at the DAG structure. `Optimize1qGates` reads
//! the basis to choose its output gates but never needs a coupling map.

pub mod optimization;

pub use optimization::{
    CancelInversePairs, OneQubitBasis, Optimize1qGates, RemoveDiagonalBeforeMeasure,
};
