//! Circuit optimization passes.

mod cancel;
mod diagonal;
mod optimize_1q;

pub use cancel::CancelInversePairs;
pub use diagonal::RemoveDiagonalBeforeMeasure;
pub use optimize_1q::{OneQubitBasis, Optimize1qGates};
