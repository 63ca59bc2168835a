//! Entry point to Qiskit Runtime: device discovery, selection and jobs.

use std::sync::Arc;

use quistik_hal::{BackendFilter, BackendSummary, JobId};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::account::{Account, AccountStore};
use crate::api::{BackendConfiguration, BackendStatus, IbmClient};
use crate::backend::IbmBackend;
use crate::error::IbmResult;
use crate::sampler::RuntimeJob;

/// An authenticated session with one Qiskit Runtime instance.
#[derive(Debug, Clone)]
pub struct RuntimeService {
    client: Arc<IbmClient>,
}

impl RuntimeService {
    /// Authenticate with an account held in memory.
    pub async fn from_account(account: &Account) -> IbmResult<Self> {
        info!("connecting to IBM Quantum ({})", account.channel);
        let client = IbmClient::connect(account).await?;
        debug!("using instance {}", client.instance());
        Ok(Self::from_client(Arc::new(client)))
    }

    /// Authenticate with a saved account, the default one when `name` is
    /// `None`.
    pub async fn from_saved_account(store: &AccountStore, name: Option<&str>) -> IbmResult<Self> {
        let account = store.load(name)?;
        Self::from_account(&account).await
    }

    pub fn from_client(client: Arc<IbmClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<IbmClient> {
        &self.client
    }

    /// Every visible device with its queue, in provider order.
    ///
    /// Devices whose configuration or status cannot be read are skipped.
    pub async fn summaries(&self) -> IbmResult<Vec<BackendSummary>> {
        let names = self.client.list_backends().await?;
        debug!("{} devices visible", names.len());

        let mut tasks = JoinSet::new();
        for (index, name) in names.into_iter().enumerate() {
            let client = Arc::clone(&self.client);
            tasks.spawn(async move {
                let fetched = tokio::try_join!(
                    client.backend_configuration(&name),
                    client.backend_status(&name)
                );
                (index, name, fetched)
            });
        }

        let mut summaries = vec![];
        while let Some(joined) = tasks.join_next().await {
            let Ok((index, name, fetched)) = joined else {
                warn!("backend lookup task aborted");
                continue;
            };
            match fetched {
                Ok((config, status)) => summaries.push((index, summarize(&config, &status))),
                Err(e) => warn!("skipping backend {name}: {e}"),
            }
        }
        summaries.sort_by_key(|(index, _)| *index);
        Ok(summaries.into_iter().map(|(_, summary)| summary).collect())
    }

    /// Devices matching `filter`, least busy first.
    pub async fn backends(&self, filter: &BackendFilter) -> IbmResult<Vec<BackendSummary>> {
        Ok(filter.apply(self.summaries().await?))
    }

    /// The matching device with the shortest queue, ready for compilation
    /// and submission.
    #[instrument(skip_all, fields(filter = %filter))]
    pub async fn least_busy(&self, filter: &BackendFilter) -> IbmResult<IbmBackend> {
        let chosen = filter.least_busy(self.summaries().await?)?;
        info!(
            "selected {} ({} qubits, {} pending jobs)",
            chosen.name, chosen.num_qubits, chosen.pending_jobs
        );
        self.backend(&chosen.name).await
    }

    /// A device by name.
    pub async fn backend(&self, name: &str) -> IbmResult<IbmBackend> {
        IbmBackend::connect(Arc::clone(&self.client), name).await
    }

    /// Re-attach to a previously submitted job.
    pub async fn job(&self, job_id: &str) -> IbmResult<RuntimeJob> {
        let details = self.client.job_status(job_id).await?;
        Ok(RuntimeJob::attach(
            Arc::clone(&self.client),
            JobId::new(details.id),
            details.backend.unwrap_or_default(),
        ))
    }
}

fn summarize(config: &BackendConfiguration, status: &BackendStatus) -> BackendSummary {
    BackendSummary {
        name: config.backend_name.clone(),
        num_qubits: config.n_qubits,
        simulator: config.simulator,
        operational: status.state,
        pending_jobs: status.length_queue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quistik_hal::HalError;

    use crate::error::IbmError;

    fn config(name: &str, n_qubits: u32, simulator: bool) -> BackendConfiguration {
        serde_json::from_value(serde_json::json!({
            "backend_name": name,
            "n_qubits": n_qubits,
            "basis_gates": ["ecr", "rz", "sx", "x"],
            "simulator": simulator
        }))
        .unwrap()
    }

    fn status(state: bool, length_queue: u32) -> BackendStatus {
        let label = if state { "active" } else { "maintenance" };
        serde_json::from_value(serde_json::json!({
            "state": state,
            "status": label,
            "length_queue": length_queue
        }))
        .unwrap()
    }

    fn fleet() -> Vec<BackendSummary> {
        vec![
            summarize(&config("ibm_brisbane", 127, false), &status(true, 310)),
            summarize(&config("ibm_sherbrooke", 127, false), &status(true, 12)),
            summarize(&config("ibm_kyiv", 127, false), &status(false, 0)),
            summarize(&config("ibm_small", 27, false), &status(true, 0)),
            summarize(&config("simulator_stabilizer", 5000, true), &status(true, 0)),
        ]
    }

    fn sampler_filter() -> BackendFilter {
        BackendFilter::new()
            .operational(true)
            .simulator(false)
            .min_num_qubits(127)
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&config("ibm_brisbane", 127, false), &status(true, 42));
        assert_eq!(summary.name, "ibm_brisbane");
        assert_eq!(summary.num_qubits, 127);
        assert!(summary.operational);
        assert!(!summary.simulator);
        assert_eq!(summary.pending_jobs, 42);
    }

    #[test]
    fn test_least_busy_over_fleet() {
        let chosen = sampler_filter().least_busy(fleet()).unwrap();
        assert_eq!(chosen.name, "ibm_sherbrooke");
    }

    #[test]
    fn test_no_match_converts_to_ibm_error() {
        let filter = sampler_filter().min_num_qubits(1000);
        let err: IbmError = filter.least_busy(fleet()).unwrap_err().into();
        assert!(matches!(err, IbmError::Hal(HalError::NoMatchingBackend(_))));
        assert!(err.to_string().contains("min_num_qubits=1000"));
    }
}
