//! Built-in compilation passes.
//!
//! - [`agnostic`]: passes that only look at DAG structure
//! - [`target`]: passes that need hardware properties

pub mod agnostic;
pub mod target;

pub use agnostic::{
    CancelInversePairs, OneQubitBasis, Optimize1qGates, RemoveDiagonalBeforeMeasure,
};
pub use target::{
    BasisTranslation, BasisVerification, SubgraphLayout, SwapRouting, TrivialLayout,
};
