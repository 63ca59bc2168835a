//! Quistik hardware abstraction layer.
//!
//! A common [`Backend`] trait for submitting circuits and collecting
//! results, plus the pieces around it:
//!
//! - [`Capabilities`] describing qubits, gates and connectivity
//! - [`BackendFilter`] for picking the least busy matching device
//! - [`ApiToken`] for credentials that never leak into logs
//! - [`ExecutionResult`] and [`Counts`] for measurement histograms
//!
//! # Example
//!
//! ```ignore
//! use quistik_hal::{Backend, WaitOptions};
//!
//! let job_id = backend.submit(&compiled, 1024).await?;
//! let result = backend.wait(&job_id, &WaitOptions::default()).await?;
//! if let Some((bitstring, count)) = result.counts.most_frequent() {
//!     println!("Most frequent: {bitstring} ({count} times)");
//! }
//! ```

pub mod auth;
pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;
pub mod selection;

pub use auth::ApiToken;
pub use backend::{Backend, BackendAvailability, ValidationResult, WaitOptions};
pub use capability::{Capabilities, GateSet, Topology, TopologyKind};
pub use error::{HalError, HalResult};
pub use job::{JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
pub use selection::{BackendFilter, BackendSummary};
