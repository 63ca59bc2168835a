//! quistik adapter for IBM Quantum Platform
//!
//! This crate connects quistik to IBM Quantum devices through the Qiskit
//! Runtime REST API (`https://quantum.cloud.ibm.com/api`) and exposes the
//! Sampler V2 primitive.
//!
//! # Authentication
//!
//! IBM Quantum Platform accounts authenticate with an IBM Cloud API key.
//! Save it once, reading it from the environment:
//!
//! ```bash
//! export QISKIT_IBM_TOKEN="<your API key>"
//! quistik save-account --overwrite
//! ```
//!
//! The account lands in `~/.qiskit/qiskit-ibm.json` (the same file
//! `qiskit-ibm-runtime` uses). On connect the key is exchanged for an IAM
//! bearer token. If the account names no instance CRN, the first Qiskit
//! Runtime instance visible to the key is used.
//!
//! # Example
//!
//! ```ignore
//! use quistik_adapter_ibm::{AccountStore, RuntimeService, SamplerV2};
//! use quistik_hal::{BackendFilter, WaitOptions};
//! use quistik_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = RuntimeService::from_saved_account(&AccountStore::from_env()?, None).await?;
//!     let filter = BackendFilter::new()
//!         .operational(true)
//!         .simulator(false)
//!         .min_num_qubits(127);
//!     let backend = service.least_busy(&filter).await?;
//!
//!     let isa = quistik_compile::transpile(&Circuit::bell()?, backend.target(), 3)?;
//!     let job = SamplerV2::new(&backend).run([&isa], Some(1024)).await?;
//!     println!("Job ID: {}", job.job_id());
//!
//!     let result = job.result(&WaitOptions::default()).await?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```
//!
//! # Gate Set
//!
//! Sampler V2 only accepts ISA circuits: native gates (`ecr` on Eagle,
//! `cz` on Heron, plus `rz`, `sx`, `x`) on coupled qubit pairs. Circuits
//! go over the wire as OpenQASM 3 with physical qubits (`$n`).

mod account;
mod api;
mod backend;
mod error;
mod sampler;
mod service;

pub use account::{ACCOUNT_FILE_ENV, Account, AccountStore, Channel, DEFAULT_URL};
pub use api::{
    BackendConfiguration, BackendProperties, BackendStatus, DEFAULT_ENDPOINT, GateProperties,
    IbmClient, JobResultResponse, JobState, JobStatusResponse, JobUsage, Nduv, ProcessorType,
    PubResultPayload, RegisterPayload, SubmitResponse,
};
pub use backend::IbmBackend;
pub use error::{AccountError, AccountResult, IbmError, IbmResult};
pub use sampler::{
    BitArray, DEFAULT_SHOTS, DataBin, PrimitiveResult, RuntimeJob, SamplerPub, SamplerPubResult,
    SamplerV2,
};
pub use service::RuntimeService;

// Re-export common types for convenience.
pub use quistik_hal::{Backend, BackendFilter, WaitOptions};
