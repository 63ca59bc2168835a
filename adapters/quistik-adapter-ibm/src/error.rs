//! Error types for the IBM Quantum adapter.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Result type for account profile operations.
pub type AccountResult<T> = Result<T, AccountError>;

/// Errors reading or writing the local account profile.
#[derive(Debug, Error)]
pub enum AccountError {
    /// An account with this name is already saved and overwrite was not requested.
    #[error("Named account ({0}) already exists. Set overwrite=true to overwrite.")]
    AlreadyExists(String),

    /// No saved account with this name.
    #[error("Account '{name}' not found in {}", path.display())]
    NotFound {
        /// Account name looked up.
        name: String,
        /// Profile file searched.
        path: PathBuf,
    },

    /// Unsupported channel.
    #[error("Invalid channel '{0}'; expected 'ibm_quantum_platform' or 'ibm_cloud'")]
    InvalidChannel(String),

    /// No home directory to place the default profile in.
    #[error("Cannot locate the home directory; set QUISTIK_ACCOUNT_FILE")]
    NoHomeDirectory,

    /// Reading or writing the profile failed.
    #[error("Account file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The profile is not valid JSON.
    #[error("Malformed account file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when using IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// No token in the account or environment.
    #[error("IBM Quantum API token not found. Set QISKIT_IBM_TOKEN or save an account first.")]
    MissingToken,

    /// Token cannot be sent as a header.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// The account can see no Qiskit Runtime instance.
    #[error("No Qiskit Runtime instance found for this account; pass --instance with a service CRN")]
    NoInstance,

    /// Account profile problem.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    ApiError {
        /// HTTP status code.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job was cancelled: {0}")]
    JobCancelled(String),

    /// Results requested before the job finished.
    #[error("Job {0} has not completed yet")]
    JobNotCompleted(String),

    /// The results payload could not be decoded.
    #[error("Malformed job result: {0}")]
    MalformedResult(String),

    /// Circuit conversion error.
    #[error("Circuit conversion error: {0}")]
    CircuitError(String),

    /// Sampler V2 only accepts circuits already in the backend's ISA.
    #[error("Circuit is not an ISA circuit for {backend}: {reason}. Transpile it first.")]
    NotIsa {
        /// Backend the circuit was checked against.
        backend: String,
        /// First violation found.
        reason: String,
    },

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Timeout waiting for job.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Circuit too large for backend.
    #[error("Circuit requires {required} qubits but backend only has {available}")]
    TooManyQubits {
        /// Qubits needed.
        required: usize,
        /// Qubits available.
        available: usize,
    },

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Failure reported by the backend abstraction while polling.
    #[error(transparent)]
    Hal(#[from] quistik_hal::HalError),
}

impl From<IbmError> for quistik_hal::HalError {
    fn from(e: IbmError) -> Self {
        use quistik_hal::HalError;
        match e {
            IbmError::MissingToken
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_)
            | IbmError::NoInstance => HalError::AuthenticationFailed(e.to_string()),
            IbmError::Account(_) => HalError::Configuration(e.to_string()),
            IbmError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmError::JobFailed(msg) => HalError::JobFailed(msg),
            IbmError::JobCancelled(_) => HalError::JobCancelled,
            IbmError::BackendUnavailable(msg) => HalError::BackendUnavailable(msg),
            IbmError::Timeout(id) => HalError::Timeout(id),
            IbmError::TooManyQubits { .. } => HalError::CircuitTooLarge(e.to_string()),
            IbmError::NotIsa { .. } | IbmError::CircuitError(_) => {
                HalError::InvalidCircuit(e.to_string())
            }
            IbmError::Hal(inner) => inner,
            _ => HalError::Backend(e.to_string()),
        }
    }
}
