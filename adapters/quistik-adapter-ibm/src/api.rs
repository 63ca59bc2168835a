//! IBM Quantum Platform REST client.
//!
//! Covers the slice of the Qiskit Runtime API the Sampler flow needs:
//! - IAM token exchange and instance (service CRN) discovery
//! - backend listing, configuration, status and calibration properties
//! - Sampler V2 job submission, status polling, results and cancellation

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quistik_compile::ErrorMap;
use quistik_hal::{ApiToken, JobStatus};
use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::account::Account;
use crate::error::{IbmError, IbmResult};

/// Qiskit Runtime REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// IBM Cloud IAM token endpoint.
const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// IBM Cloud global search, used to find the account's Runtime instances.
const GLOBAL_SEARCH_URL: &str = "https://api.global-search-tagging.cloud.ibm.com/v3/resources/search";

/// IBM API version header value.
const IBM_API_VERSION: &str = "2026-02-01";

/// User-Agent sent with requests (Cloudflare blocks default reqwest UA).
const USER_AGENT: &str = concat!(
    "quistik/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/quistik/quistik)"
);

/// IBM Quantum API client.
pub struct IbmClient {
    client: Client,
    endpoint: String,
    /// Service CRN sent with every request.
    instance: String,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("instance", &self.instance)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// IAM token response from `iam.cloud.ibm.com`.
#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl IbmClient {
    /// Authenticate with a saved or ad-hoc account.
    ///
    /// Exchanges the API key for an IAM bearer token. When the account
    /// names no instance, the first Qiskit Runtime instance visible to the
    /// key is used.
    pub async fn connect(account: &Account) -> IbmResult<Self> {
        let iam_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let bearer = exchange_api_key(&iam_client, &account.token).await?;

        let instance = match &account.instance {
            Some(crn) => crn.clone(),
            None => discover_instance(&iam_client, &bearer).await?,
        };

        Self::with_bearer(account.api_endpoint(), &bearer, instance)
    }

    /// Build a client from an already exchanged bearer token.
    pub fn with_bearer(
        endpoint: impl Into<String>,
        bearer: &str,
        instance: impl Into<String>,
    ) -> IbmResult<Self> {
        let instance = instance.into();

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| IbmError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(&instance)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            instance,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Service CRN of the instance jobs run under.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Names of the devices visible to the instance.
    pub async fn list_backends(&self) -> IbmResult<Vec<String>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = check(self.client.get(&url).send().await?, "list backends").await?;
        let devices: DevicesResponse = response.json().await?;
        Ok(devices.devices.into_iter().map(|d| d.name).collect())
    }

    pub async fn backend_configuration(&self, name: &str) -> IbmResult<BackendConfiguration> {
        let url = format!("{}/v1/backends/{}/configuration", self.endpoint, name);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        let response = check(response, "backend configuration").await?;
        Ok(response.json().await?)
    }

    pub async fn backend_status(&self, name: &str) -> IbmResult<BackendStatus> {
        let url = format!("{}/v1/backends/{}/status", self.endpoint, name);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        let response = check(response, "backend status").await?;
        Ok(response.json().await?)
    }

    /// Latest calibration data. Simulators publish none.
    pub async fn backend_properties(&self, name: &str) -> IbmResult<BackendProperties> {
        let url = format!("{}/v1/backends/{}/properties", self.endpoint, name);
        let response = check(self.client.get(&url).send().await?, "backend properties").await?;
        Ok(response.json().await?)
    }

    /// Submit `(OpenQASM 3 circuit, shots)` PUBs to the Sampler V2 primitive.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        pubs: Vec<(String, u32)>,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let request = SamplerJobRequest::new(backend, pubs);
        debug!("submitting {} pub(s) to {backend}", request.params.pubs.len());
        let response = self.client.post(&url).json(&request).send().await?;
        let response = check(response, "job submission").await?;
        Ok(response.json().await?)
    }

    pub async fn job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        let response = check(response, "job status").await?;
        Ok(response.json().await?)
    }

    pub async fn job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        let response = check(response, "job results").await?;
        Ok(response.json().await?)
    }

    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/v1/jobs/{}/cancel", self.endpoint, job_id);
        let response = self.client.post(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        check(response, "job cancellation").await?;
        Ok(())
    }
}

/// Exchange an IBM Cloud API key for a bearer token.
async fn exchange_api_key(client: &Client, api_key: &ApiToken) -> IbmResult<String> {
    let response = client
        .post(IAM_TOKEN_URL)
        .header(header::ACCEPT, "application/json")
        .form(&[
            ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
            ("apikey", api_key.expose()),
        ])
        .send()
        .await
        .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "no body".to_string());
        return Err(IbmError::IamTokenExchange(format!(
            "IAM returned {status}: {body}"
        )));
    }

    let token: IamTokenResponse = response
        .json()
        .await
        .map_err(|e| IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}")))?;
    debug!("IAM token valid for {:?}s", token.expires_in);
    Ok(token.access_token)
}

/// Find the Qiskit Runtime instances the bearer can see and pick one.
async fn discover_instance(client: &Client, bearer: &str) -> IbmResult<String> {
    let response = client
        .post(GLOBAL_SEARCH_URL)
        .bearer_auth(bearer)
        .json(&serde_json::json!({
            "query": "service_name:quantum-computing",
            "fields": ["crn", "name"],
        }))
        .send()
        .await?;
    let response = check(response, "instance discovery").await?;
    let found: SearchResponse = response.json().await?;
    select_instance(found.items)
}

fn select_instance(items: Vec<SearchItem>) -> IbmResult<String> {
    let mut items = items.into_iter();
    let first = items.next().ok_or(IbmError::NoInstance)?;
    let others = items.count();
    if others > 0 {
        warn!(
            "account has {} Qiskit Runtime instances; using '{}'. Pass --instance to choose.",
            others + 1,
            first.name.as_deref().unwrap_or(&first.crn)
        );
    }
    Ok(first.crn)
}

/// Turn a non-success response into [`IbmError::ApiError`].
async fn check(response: Response, what: &str) -> IbmResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(ApiErrorResponse::into_message)
        .unwrap_or(body);
    Err(IbmError::ApiError {
        status: Some(status.as_u16()),
        message: format!("{what} failed ({status}): {message}"),
    })
}

// ============================================================================
// Request types
// ============================================================================

/// Sampler job request.
#[derive(Debug, Serialize)]
struct SamplerJobRequest {
    program_id: &'static str,
    backend: String,
    params: SamplerParams,
}

/// Sampler V2 parameters.
#[derive(Debug, Serialize)]
struct SamplerParams {
    version: u8,
    /// `(circuit, parameter values, shots)` triples.
    pubs: Vec<(String, serde_json::Map<String, serde_json::Value>, u32)>,
    options: serde_json::Map<String, serde_json::Value>,
}

impl SamplerJobRequest {
    fn new(backend: &str, pubs: Vec<(String, u32)>) -> Self {
        Self {
            program_id: "sampler",
            backend: backend.to_string(),
            params: SamplerParams {
                version: 2,
                pubs: pubs
                    .into_iter()
                    .map(|(qasm, shots)| (qasm, serde_json::Map::new(), shots))
                    .collect(),
                options: serde_json::Map::new(),
            },
        }
    }
}

// ============================================================================
// Response types
// ============================================================================

/// API error response. Both the old and the new error shapes occur.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ApiErrorResponse {
    fn into_message(self) -> Option<String> {
        self.message
            .or_else(|| self.errors.into_iter().next().map(|e| e.message))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    crn: String,
    #[serde(default)]
    name: Option<String>,
}

/// Device list response (`{"devices": [...]}`).
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    name: String,
}

/// Static device description from `/backends/{name}/configuration`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfiguration {
    pub backend_name: String,
    pub n_qubits: u32,
    #[serde(default)]
    pub basis_gates: Vec<String>,
    /// Directed pairs that support a two-qubit gate.
    #[serde(default)]
    pub coupling_map: Option<Vec<[u32; 2]>>,
    #[serde(default)]
    pub processor_type: Option<ProcessorType>,
    #[serde(default)]
    pub simulator: bool,
    #[serde(default)]
    pub max_shots: Option<u32>,
}

/// Processor type information.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorType {
    /// Family (e.g., "Eagle", "Heron").
    pub family: String,
    #[serde(default)]
    pub revision: Option<serde_json::Value>,
}

/// Live device state from `/backends/{name}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the device is operational.
    pub state: bool,
    /// Status string (e.g., "active").
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    /// Jobs waiting in the device queue.
    #[serde(default)]
    pub length_queue: u32,
}

/// Calibration data from `/backends/{name}/properties`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendProperties {
    /// Per-qubit measurements (`T1`, `readout_error`, ...), indexed by qubit.
    #[serde(default)]
    pub qubits: Vec<Vec<Nduv>>,
    #[serde(default)]
    pub gates: Vec<GateProperties>,
}

/// A named, dated, unit-bearing value.
#[derive(Debug, Clone, Deserialize)]
pub struct Nduv {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

/// Calibration of one gate on specific qubits.
#[derive(Debug, Clone, Deserialize)]
pub struct GateProperties {
    pub gate: String,
    pub qubits: Vec<u32>,
    #[serde(default)]
    pub parameters: Vec<Nduv>,
}

impl GateProperties {
    fn gate_error(&self) -> Option<f64> {
        self.parameters
            .iter()
            .find(|p| p.name == "gate_error")
            .map(|p| p.value)
            .filter(|e| e.is_finite() && *e < 1.0)
    }
}

/// Single-qubit gate whose error stands for the qubit's 1q error.
const ONE_QUBIT_REFERENCE: [&str; 2] = ["sx", "x"];

impl BackendProperties {
    /// Gate and readout error rates keyed the way the compiler scores
    /// layouts.
    pub fn error_map(&self) -> ErrorMap {
        let mut errors = ErrorMap::default();
        for gate in &self.gates {
            let Some(error) = gate.gate_error() else {
                continue;
            };
            match gate.qubits.as_slice() {
                [q] if ONE_QUBIT_REFERENCE.contains(&gate.gate.as_str()) => {
                    errors
                        .single_qubit
                        .entry(*q)
                        .and_modify(|e| *e = e.max(error))
                        .or_insert(error);
                }
                [a, b] => {
                    errors.two_qubit.insert((*a, *b), error);
                }
                _ => {}
            }
        }
        for (qubit, measurements) in self.qubits.iter().enumerate() {
            let Ok(qubit) = u32::try_from(qubit) else {
                break;
            };
            if let Some(readout) = measurements.iter().find(|m| m.name == "readout_error") {
                errors.readout.insert(qubit, readout.value);
            }
        }
        errors
    }
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
    #[serde(default)]
    pub backend: Option<String>,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub id: String,
    /// Mixed case on the Cloud API (`Queued`, `Completed`, ...).
    pub status: String,
    #[serde(default)]
    pub backend: Option<String>,
    /// RFC 3339 creation time.
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub state: Option<JobState>,
    #[serde(default)]
    pub usage: Option<JobUsage>,
}

/// Job state with failure reason.
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub reason_code: Option<u32>,
}

/// Billed time.
#[derive(Debug, Clone, Deserialize)]
pub struct JobUsage {
    #[serde(default)]
    pub quantum_seconds: Option<f64>,
    #[serde(default)]
    pub seconds: Option<f64>,
}

impl JobStatusResponse {
    /// Map the provider status onto the HAL lifecycle. Unknown states
    /// count as running.
    pub fn job_status(&self) -> JobStatus {
        let status = self.status.to_uppercase();
        match status.as_str() {
            "QUEUED" => JobStatus::Queued,
            "VALIDATING" | "RUNNING" => JobStatus::Running,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" | "ERROR" => JobStatus::Failed(
                self.error_message()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ),
            s if s.starts_with("CANCELLED") => JobStatus::Cancelled,
            _ => JobStatus::Running,
        }
    }

    /// The failure reason, with its code when the service gives one.
    pub fn error_message(&self) -> Option<String> {
        let state = self.state.as_ref()?;
        let reason = state.reason.clone()?;
        Some(match state.reason_code {
            Some(code) => format!("{reason} (code {code})"),
            None => reason,
        })
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Sampler V2 result payload.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// One entry per PUB, in submission order.
    pub results: Vec<PubResultPayload>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Result of one PUB.
#[derive(Debug, Deserialize)]
pub struct PubResultPayload {
    /// Classical register name to its samples.
    #[serde(default)]
    pub data: BTreeMap<String, RegisterPayload>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Per-shot samples of one classical register.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    /// One hex string per shot (`"0x0"`, `"0x3"`, ...).
    pub samples: Vec<String>,
    /// Register width, when the service reports it.
    #[serde(default)]
    pub num_bits: Option<usize>,
}
