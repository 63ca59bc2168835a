//! Sampler V2 primitive.
//!
//! [`SamplerV2::run`] submits one or more PUBs (circuit plus optional shot
//! count) to a single device and returns a [`RuntimeJob`]. Results come
//! back per PUB as a [`DataBin`] holding one [`BitArray`] of raw shots per
//! classical register.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use quistik_hal::{Counts, JobId, JobStatus, WaitOptions};
use quistik_ir::Circuit;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::api::{IbmClient, JobResultResponse, JobStatusResponse, PubResultPayload, RegisterPayload};
use crate::backend::IbmBackend;
use crate::error::{IbmError, IbmResult};

/// Shots per PUB when neither the PUB nor the call sets them.
pub const DEFAULT_SHOTS: u32 = 1024;

/// A primitive unified bloc: a circuit and an optional shot count.
#[derive(Debug, Clone, Copy)]
pub struct SamplerPub<'c> {
    pub circuit: &'c Circuit,
    pub shots: Option<u32>,
}

impl<'c> SamplerPub<'c> {
    pub fn new(circuit: &'c Circuit) -> Self {
        Self {
            circuit,
            shots: None,
        }
    }

    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }
}

impl<'c> From<&'c Circuit> for SamplerPub<'c> {
    fn from(circuit: &'c Circuit) -> Self {
        Self::new(circuit)
    }
}

/// Samples bitstrings from ISA circuits on one device.
#[derive(Debug, Clone)]
pub struct SamplerV2<'b> {
    backend: &'b IbmBackend,
    default_shots: u32,
}

impl<'b> SamplerV2<'b> {
    pub fn new(backend: &'b IbmBackend) -> Self {
        Self {
            backend,
            default_shots: DEFAULT_SHOTS,
        }
    }

    #[must_use]
    pub fn with_default_shots(mut self, shots: u32) -> Self {
        self.default_shots = shots;
        self
    }

    /// Shots used for a PUB: its own, else `shots`, else the default.
    fn resolve_shots(&self, pub_shots: Option<u32>, shots: Option<u32>) -> u32 {
        pub_shots.or(shots).unwrap_or(self.default_shots)
    }

    /// Check and serialize PUBs into `(qasm, shots, num_clbits)` triples.
    fn prepare<'c, I, P>(&self, pubs: I, shots: Option<u32>) -> IbmResult<Vec<(String, u32, usize)>>
    where
        I: IntoIterator<Item = P>,
        P: Into<SamplerPub<'c>>,
    {
        let mut prepared = vec![];
        for (index, pub_) in pubs.into_iter().map(Into::into).enumerate() {
            let pub_shots = self.resolve_shots(pub_.shots, shots);
            self.backend.check_shots(pub_shots)?;
            if pub_.circuit.num_clbits() == 0 {
                return Err(IbmError::InvalidParameter(format!(
                    "pub {index}: circuit '{}' has no classical bits to sample",
                    pub_.circuit.name()
                )));
            }
            self.backend.check_isa(pub_.circuit)?;
            let qasm = IbmBackend::to_qasm(pub_.circuit)?;
            prepared.push((qasm, pub_shots, pub_.circuit.num_clbits()));
        }
        if prepared.is_empty() {
            return Err(IbmError::InvalidParameter("no pubs to run".into()));
        }
        Ok(prepared)
    }

    /// Submit PUBs. Every circuit must already be an ISA circuit for the
    /// backend.
    #[instrument(skip_all, fields(backend = %self.backend.target().name))]
    pub async fn run<'c, I, P>(&self, pubs: I, shots: Option<u32>) -> IbmResult<RuntimeJob>
    where
        I: IntoIterator<Item = P>,
        P: Into<SamplerPub<'c>>,
    {
        let prepared = self.prepare(pubs, shots)?;
        let num_bits = prepared.iter().map(|(_, _, bits)| *bits).collect();
        let wire = prepared
            .into_iter()
            .map(|(qasm, shots, _)| (qasm, shots))
            .collect();

        let name = &self.backend.target().name;
        let response = self
            .backend
            .client()
            .submit_sampler_job(name, wire)
            .await?;
        info!("submitted sampler job {}", response.id);

        Ok(RuntimeJob {
            client: Arc::clone(self.backend.client()),
            job_id: JobId(response.id),
            backend: response.backend.unwrap_or_else(|| name.clone()),
            num_bits,
        })
    }
}

/// Handle to a submitted Runtime job.
#[derive(Debug, Clone)]
pub struct RuntimeJob {
    client: Arc<IbmClient>,
    job_id: JobId,
    backend: String,
    /// Classical bits per PUB, used to pad bitstrings.
    num_bits: Vec<usize>,
}

impl RuntimeJob {
    /// Handle for a job submitted earlier, possibly by another process.
    pub fn attach(client: Arc<IbmClient>, job_id: JobId, backend: impl Into<String>) -> Self {
        Self {
            client,
            job_id,
            backend: backend.into(),
            num_bits: vec![],
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub async fn status(&self) -> IbmResult<JobStatus> {
        Ok(self.details().await?.job_status())
    }

    /// Full status record: timestamps, usage, failure reason.
    pub async fn details(&self) -> IbmResult<JobStatusResponse> {
        self.client.job_status(self.job_id.as_str()).await
    }

    /// Block until the job finishes, then fetch its results.
    pub async fn result(&self, options: &WaitOptions) -> IbmResult<PrimitiveResult> {
        let started = Instant::now();
        loop {
            match self.status().await? {
                JobStatus::Completed => break,
                JobStatus::Failed(msg) => return Err(IbmError::JobFailed(msg)),
                JobStatus::Cancelled => {
                    return Err(IbmError::JobCancelled(self.job_id.to_string()));
                }
                status @ (JobStatus::Queued | JobStatus::Running) => {
                    debug!("job {} is {status}", self.job_id);
                }
            }
            if options
                .timeout
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                return Err(IbmError::Timeout(self.job_id.to_string()));
            }
            tokio::time::sleep(options.poll_interval).await;
        }
        self.fetch_result().await
    }

    /// Fetch results without waiting. Fails unless the job has completed.
    pub async fn fetch_result(&self) -> IbmResult<PrimitiveResult> {
        let response = self.client.job_results(self.job_id.as_str()).await?;
        PrimitiveResult::from_response(response, &self.num_bits)
    }

    pub async fn cancel(&self) -> IbmResult<()> {
        self.client.cancel_job(self.job_id.as_str()).await?;
        info!("cancelled job {}", self.job_id);
        Ok(())
    }
}

/// Results of a whole job, one entry per PUB.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveResult {
    pub_results: Vec<SamplerPubResult>,
    metadata: Value,
}

impl PrimitiveResult {
    /// Decode a results payload. `num_bits[i]` pads PUB `i`'s bitstrings
    /// when the payload does not report register widths.
    pub fn from_response(response: JobResultResponse, num_bits: &[usize]) -> IbmResult<Self> {
        let pub_results = response
            .results
            .into_iter()
            .enumerate()
            .map(|(i, payload)| SamplerPubResult::from_payload(payload, num_bits.get(i).copied()))
            .collect::<IbmResult<_>>()?;
        Ok(Self {
            pub_results,
            metadata: response.metadata,
        })
    }

    pub fn pub_results(&self) -> &[SamplerPubResult] {
        &self.pub_results
    }

    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.pub_results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pub_results.is_empty()
    }
}

impl std::ops::Index<usize> for PrimitiveResult {
    type Output = SamplerPubResult;

    fn index(&self, index: usize) -> &Self::Output {
        &self.pub_results[index]
    }
}

/// Result of one PUB.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerPubResult {
    data: DataBin,
    metadata: Value,
}

impl SamplerPubResult {
    fn from_payload(payload: PubResultPayload, num_bits: Option<usize>) -> IbmResult<Self> {
        // The circuit's clbit count only describes a lone register.
        let hint = num_bits.filter(|_| payload.data.len() == 1);
        let registers = payload
            .data
            .into_iter()
            .map(|(name, register)| {
                let bits = BitArray::from_payload(&name, register, hint)?;
                Ok((name, bits))
            })
            .collect::<IbmResult<_>>()?;
        Ok(Self {
            data: DataBin { registers },
            metadata: payload.metadata,
        })
    }

    pub fn data(&self) -> &DataBin {
        &self.data
    }

    pub fn metadata(&self) -> &Value {
        &self.metadata
    }
}

/// Per-register shot data of one PUB.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataBin {
    registers: BTreeMap<String, BitArray>,
}

impl DataBin {
    /// Shots of the classical register `name`, e.g. `"c"` or `"meas"`.
    pub fn get(&self, name: &str) -> Option<&BitArray> {
        self.registers.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BitArray)> {
        self.registers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Counts over all registers. With several registers, each shot's
    /// bitstrings are joined by spaces, last register first.
    pub fn join_counts(&self) -> Counts {
        let arrays: Vec<&BitArray> = self.registers.values().rev().collect();
        match arrays.as_slice() {
            [] => Counts::new(),
            [single] => single.get_counts(),
            _ => {
                let shots = arrays.iter().map(|a| a.num_shots()).min().unwrap_or(0);
                (0..shots)
                    .map(|shot| {
                        let joined = arrays
                            .iter()
                            .map(|a| a.bitstring(shot))
                            .collect::<Vec<_>>()
                            .join(" ");
                        (joined, 1)
                    })
                    .fold(Counts::new(), |mut counts, (bits, n)| {
                        counts.insert(bits, n);
                        counts
                    })
            }
        }
    }
}

/// Raw shots of one classical register. Bit `i` of a sample is `c[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitArray {
    samples: Vec<u64>,
    num_bits: usize,
}

impl BitArray {
    pub fn new(samples: Vec<u64>, num_bits: usize) -> Self {
        Self { samples, num_bits }
    }

    /// Decode hex samples. Width comes from the payload, else the larger of
    /// `fallback` and the widest sample.
    fn from_payload(
        register: &str,
        payload: RegisterPayload,
        fallback: Option<usize>,
    ) -> IbmResult<Self> {
        let samples = payload
            .samples
            .iter()
            .map(|s| parse_sample(s))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                IbmError::MalformedResult(format!("register '{register}' has a non-hex sample"))
            })?;
        let inferred = infer_bit_width(&samples);
        let num_bits = match payload.num_bits {
            Some(bits) => bits,
            None => fallback.map_or(inferred, |hint| hint.max(inferred)),
        };
        if num_bits > 64 {
            return Err(IbmError::MalformedResult(format!(
                "register '{register}' is {num_bits} bits wide; at most 64 are supported"
            )));
        }
        if let Some(wide) = samples.iter().find(|&&s| s & !bit_mask(num_bits) != 0) {
            return Err(IbmError::MalformedResult(format!(
                "register '{register}' has sample {wide:#x} wider than {num_bits} bits"
            )));
        }
        Ok(Self::new(samples, num_bits))
    }

    pub fn num_shots(&self) -> usize {
        self.samples.len()
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// Shot `index` as a bitstring, most significant bit first. Bits above
    /// `num_bits` are dropped.
    pub fn bitstring(&self, index: usize) -> String {
        if self.num_bits == 0 {
            return String::new();
        }
        let sample = self.samples[index] & bit_mask(self.num_bits);
        format!("{sample:0width$b}", width = self.num_bits)
    }

    pub fn get_bitstrings(&self) -> Vec<String> {
        (0..self.samples.len()).map(|i| self.bitstring(i)).collect()
    }

    /// Histogram of outcomes.
    pub fn get_counts(&self) -> Counts {
        let mut counts = Counts::new();
        for i in 0..self.samples.len() {
            counts.insert(self.bitstring(i), 1);
        }
        counts
    }
}

/// Parse a `0x`-prefixed (or bare) hex sample.
fn parse_sample(hex: &str) -> Option<u64> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    u64::from_str_radix(digits, 16).ok()
}

/// Low `num_bits` bits set.
fn bit_mask(num_bits: usize) -> u64 {
    if num_bits >= 64 {
        u64::MAX
    } else {
        (1_u64 << num_bits) - 1
    }
}

/// Bits needed for the largest sample, at least 1.
fn infer_bit_width(samples: &[u64]) -> usize {
    let max_val = samples.iter().copied().max().unwrap_or(0);
    (64 - max_val.leading_zeros() as usize).max(1)
}

impl fmt::Display for PrimitiveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimitiveResult([")?;
        for (i, pub_result) in self.pub_results.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pub_result}")?;
        }
        write!(f, "], metadata={})", py_repr(&self.metadata))
    }
}

impl fmt::Display for SamplerPubResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SamplerPubResult(data={}, metadata={})",
            self.data,
            py_repr(&self.metadata)
        )
    }
}

impl fmt::Display for DataBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataBin(")?;
        for (i, (name, bits)) in self.registers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={bits}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BitArray(<shape=(), num_shots={}, num_bits={}>)",
            self.num_shots(),
            self.num_bits
        )
    }
}

/// Render JSON the way Python prints the equivalent dict.
fn py_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".into(),
        Value::Bool(true) => "True".into(),
        Value::Bool(false) => "False".into(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::Array(items) => {
            let inner: Vec<_> = items.iter().map(py_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("'{k}': {}", py_repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}
