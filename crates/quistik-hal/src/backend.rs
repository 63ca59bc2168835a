//! Backend trait.
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | yes | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use quistik_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// How [`Backend::wait`] polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up after this long. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Delay between status queries.
    pub poll_interval: Duration,
}

impl WaitOptions {
    /// Default delay between status queries.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A quantum backend.
///
/// `capabilities()` is synchronous: implementations fetch and cache
/// everything they need at construction. `result()` is only valid once
/// `status()` reports `Completed`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Device name.
    fn name(&self) -> &str;

    /// Cached hardware description.
    fn capabilities(&self) -> &Capabilities;

    /// Whether the backend currently accepts jobs, with queue depth.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check a circuit against qubit count and gate set.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit. The job starts `Queued`.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a queued or running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Poll until the job reaches a terminal state, then fetch its result.
    async fn wait(&self, job_id: &JobId, options: &WaitOptions) -> HalResult<ExecutionResult> {
        let started = Instant::now();
        loop {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                status @ (JobStatus::Queued | JobStatus::Running) => {
                    debug!("job {job_id} is {status}");
                }
            }
            if options
                .timeout
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                return Err(HalError::Timeout(job_id.to_string()));
            }
            tokio::time::sleep(options.poll_interval).await;
        }
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// An online backend with the given queue.
    pub fn available(queue_depth: Option<u32>) -> Self {
        Self {
            is_available: true,
            queue_depth,
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit can be submitted as-is.
    Valid,
    /// Circuit cannot run on this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
    /// Circuit could run after transpilation.
    RequiresTranspilation {
        /// What transpilation is needed.
        details: String,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid (can be submitted as-is).
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}
