//! IBM Quantum backend implementation.

use std::sync::Arc;

use async_trait::async_trait;
use quistik_compile::passes::BasisVerification;
use quistik_compile::{BasisGates, CompileError, CouplingMap, ErrorMap, Pass, Target};
use quistik_hal::{
    Backend, BackendAvailability, Capabilities, ExecutionResult, HalError, HalResult, JobId,
    JobStatus, ValidationResult,
};
use quistik_ir::Circuit;
use quistik_qasm3::emit;
use tracing::{debug, warn};

use crate::api::{BackendConfiguration, IbmClient};
use crate::error::{IbmError, IbmResult};
use crate::sampler::PrimitiveResult;

/// Shot limit assumed when the configuration omits one.
const DEFAULT_MAX_SHOTS: u32 = 100_000;

/// One IBM Quantum device.
///
/// Configuration and calibration are fetched once in [`IbmBackend::connect`];
/// live state (queue, job status) is queried on demand.
#[derive(Debug, Clone)]
pub struct IbmBackend {
    client: Arc<IbmClient>,
    name: String,
    capabilities: Capabilities,
    target: Target,
}

impl IbmBackend {
    /// Fetch a device's configuration and latest calibration.
    pub async fn connect(client: Arc<IbmClient>, name: &str) -> IbmResult<Self> {
        let config = client.backend_configuration(name).await?;
        let errors = match client.backend_properties(name).await {
            Ok(props) => Some(props.error_map()),
            Err(e) => {
                debug!("no calibration data for {name}: {e}");
                None
            }
        };
        Ok(Self::from_configuration(client, config, errors))
    }

    /// Build a backend from an already fetched configuration.
    pub fn from_configuration(
        client: Arc<IbmClient>,
        config: BackendConfiguration,
        errors: Option<ErrorMap>,
    ) -> Self {
        let n = config.n_qubits;
        let pairs: Vec<(u32, u32)> = match &config.coupling_map {
            Some(map) => map.iter().map(|[a, b]| (*a, *b)).collect(),
            None => (0..n)
                .flat_map(|a| (0..n).filter(move |&b| b != a).map(move |b| (a, b)))
                .collect(),
        };

        let mut capabilities =
            Capabilities::ibm(&config.backend_name, n, &config.basis_gates, pairs.clone())
                .with_max_shots(config.max_shots.unwrap_or(DEFAULT_MAX_SHOTS))
                .with_simulator(config.simulator);
        if let Some(processor) = &config.processor_type {
            capabilities = capabilities.with_processor_family(&processor.family);
        }

        let target = Target::new(
            &config.backend_name,
            CouplingMap::from_pairs(n, pairs),
            BasisGates::new(config.basis_gates.iter().cloned()),
        );
        let target = match errors {
            Some(errors) => target.with_error_map(errors),
            None => target,
        };

        Self {
            client,
            name: config.backend_name,
            capabilities,
            target,
        }
    }

    /// Compilation target: basis gates, coupling map and error rates.
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn num_qubits(&self) -> u32 {
        self.target.num_qubits
    }

    pub(crate) fn client(&self) -> &Arc<IbmClient> {
        &self.client
    }

    /// Check that a circuit only uses this device's native gates on
    /// coupled qubits, which Sampler V2 requires.
    pub fn check_isa(&self, circuit: &Circuit) -> IbmResult<()> {
        if circuit.num_qubits() > self.num_qubits() as usize {
            return Err(IbmError::TooManyQubits {
                required: circuit.num_qubits(),
                available: self.num_qubits() as usize,
            });
        }
        let mut dag = circuit.dag().clone();
        let mut properties = self.target.properties();
        BasisVerification
            .run(&mut dag, &mut properties)
            .map_err(|e| match e {
                CompileError::GateNotInBasis { .. } | CompileError::UncoupledGate { .. } => {
                    IbmError::NotIsa {
                        backend: self.name.clone(),
                        reason: e.to_string(),
                    }
                }
                other => IbmError::CircuitError(other.to_string()),
            })
    }

    /// Serialize a circuit for submission.
    pub(crate) fn to_qasm(circuit: &Circuit) -> IbmResult<String> {
        emit(circuit).map_err(|e| IbmError::CircuitError(e.to_string()))
    }

    pub(crate) fn check_shots(&self, shots: u32) -> IbmResult<()> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(IbmError::InvalidParameter(format!(
                "shots must be between 1 and {}, got {shots}",
                self.capabilities.max_shots
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.client.backend_status(&self.name).await {
            Ok(status) if status.state => {
                let mut availability = BackendAvailability::available(Some(status.length_queue));
                availability.status_message = Some(status.status);
                Ok(availability)
            }
            Ok(status) => Ok(BackendAvailability::unavailable(if status.message.is_empty() {
                status.status
            } else {
                status.message
            })),
            Err(e) => {
                warn!("IBM backend availability check failed: {e}");
                Ok(BackendAvailability::unavailable("failed to query backend"))
            }
        }
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        match self.check_isa(circuit) {
            Ok(()) => Ok(ValidationResult::Valid),
            Err(IbmError::NotIsa { reason, .. }) => {
                Ok(ValidationResult::RequiresTranspilation { details: reason })
            }
            Err(e) => Ok(ValidationResult::Invalid {
                reasons: vec![e.to_string()],
            }),
        }
    }

    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        self.check_shots(shots)
            .map_err(|e| HalError::InvalidShots(e.to_string()))?;
        self.check_isa(circuit)?;
        let qasm = Self::to_qasm(circuit)?;

        let response = self
            .client
            .submit_sampler_job(&self.name, vec![(qasm, shots)])
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.job_status(job_id.as_str()).await?;
        Ok(status.job_status())
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self.client.job_status(job_id.as_str()).await?;
        match status.job_status() {
            JobStatus::Completed => {}
            JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
            JobStatus::Cancelled => return Err(HalError::JobCancelled),
            JobStatus::Queued | JobStatus::Running => {
                return Err(IbmError::JobNotCompleted(job_id.to_string()).into());
            }
        }

        let response = self.client.job_results(job_id.as_str()).await?;
        let result = PrimitiveResult::from_response(response, &[])?;
        let first = result.pub_results().first().ok_or_else(|| {
            HalError::Backend(format!("job {job_id} returned no pub results"))
        })?;

        let counts = first.data().join_counts();
        let shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);
        let mut execution = ExecutionResult::new(counts, shots)
            .with_metadata(first.metadata().clone());
        if let Some(seconds) = status.usage.and_then(|u| u.quantum_seconds) {
            execution = execution.with_execution_time((seconds * 1000.0).round() as u64);
        }
        Ok(execution)
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(job_id.as_str()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_ENDPOINT;
    use quistik_ir::QubitId;

    fn client() -> Arc<IbmClient> {
        Arc::new(IbmClient::with_bearer(DEFAULT_ENDPOINT, "test-bearer", "crn:v1:test").unwrap())
    }

    fn eagle_config() -> BackendConfiguration {
        serde_json::from_str(
            r#"{
                "backend_name": "ibm_test_eagle",
                "n_qubits": 5,
                "basis_gates": ["ecr", "id", "rz", "sx", "x"],
                "coupling_map": [[1, 0], [1, 2], [3, 2], [3, 4]],
                "processor_type": {"family": "Eagle", "revision": 3},
                "simulator": false,
                "max_shots": 10000
            }"#,
        )
        .unwrap()
    }

    fn backend() -> IbmBackend {
        IbmBackend::from_configuration(client(), eagle_config(), None)
    }

    #[test]
    fn test_capabilities_from_configuration() {
        let backend = backend();
        let caps = backend.capabilities();
        assert_eq!(backend.name(), "ibm_test_eagle");
        assert_eq!(caps.num_qubits, 5);
        assert_eq!(caps.max_shots, 10_000);
        assert!(!caps.is_simulator);
        assert_eq!(caps.processor_family.as_deref(), Some("Eagle"));
        assert!(caps.gate_set.contains("ecr"));
        assert!(!caps.gate_set.contains("cx"));
    }

    #[test]
    fn test_target_keeps_direction() {
        let backend = backend();
        let target = backend.target();
        assert_eq!(target.num_qubits, 5);
        assert!(target.coupling_map.supports(1, 0));
        assert!(!target.coupling_map.supports(0, 1));
        assert_eq!(target.basis_gates.entangler(), Some("ecr"));
        assert!(target.error_map.is_none());
    }

    #[test]
    fn test_missing_coupling_map_means_all_to_all() {
        let mut config = eagle_config();
        config.coupling_map = None;
        config.simulator = true;
        let backend = IbmBackend::from_configuration(client(), config, None);
        assert!(backend.target().coupling_map.supports(0, 4));
        assert!(backend.target().coupling_map.supports(4, 0));
        assert!(backend.capabilities().is_simulator);
    }

    #[test]
    fn test_logical_bell_is_not_isa() {
        let backend = backend();
        let bell = Circuit::bell().unwrap();
        let err = backend.check_isa(&bell).unwrap_err();
        assert!(matches!(err, IbmError::NotIsa { .. }));
    }

    #[test]
    fn test_transpiled_bell_is_isa() {
        let backend = backend();
        let bell = Circuit::bell().unwrap();
        let compiled = quistik_compile::transpile(&bell, backend.target(), 3).unwrap();
        backend.check_isa(&compiled).unwrap();
    }

    #[test]
    fn test_wrong_direction_is_not_isa() {
        let backend = backend();
        let mut circuit = Circuit::with_size("ecr", 2, 0);
        circuit.ecr(QubitId(0), QubitId(1)).unwrap();
        let err = backend.check_isa(&circuit).unwrap_err();
        assert!(err.to_string().contains("ecr"));
    }

    #[test]
    fn test_too_many_qubits() {
        let backend = backend();
        let circuit = Circuit::with_size("wide", 6, 0);
        assert!(matches!(
            backend.check_isa(&circuit),
            Err(IbmError::TooManyQubits {
                required: 6,
                available: 5
            })
        ));
    }

    #[test]
    fn test_shot_limits() {
        let backend = backend();
        assert!(backend.check_shots(1024).is_ok());
        assert!(backend.check_shots(0).is_err());
        assert!(backend.check_shots(10_001).is_err());
    }

    #[tokio::test]
    async fn test_validate_reports_transpilation_needed() {
        let backend = backend();
        let bell = Circuit::bell().unwrap();
        let validation = backend.validate(&bell).await.unwrap();
        assert!(matches!(
            validation,
            ValidationResult::RequiresTranspilation { .. }
        ));
    }
}
