//! Target-specific compilation passes.
//!
//! These read the coupling map and basis gates from the [`PropertySet`]
//! and produce a physical circuit the backend can execute.
//!
//! [`PropertySet`]: crate::PropertySet

pub mod layout;
pub mod routing;
pub mod translation;
pub mod verification;

pub use layout::{SubgraphLayout, TrivialLayout};
pub use routing::SwapRouting;
pub use translation::BasisTranslation;
pub use verification::BasisVerification;
