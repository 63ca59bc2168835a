//! Run command implementation.
//!
//! Save the account, pick the least busy device, transpile a Bell circuit
//! for it, sample it with Sampler V2 and print what comes back.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use quistik_adapter_ibm::{IbmError, SamplerV2};
use quistik_compile::transpile;
use quistik_hal::{Backend, WaitOptions};
use quistik_ir::Circuit;

use super::common::{AccountArgs, connect, print_counts, sampler_filter, spinner};

/// Flags of `quistik run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub shots: u32,
    pub optimization_level: u8,
    pub min_qubits: u32,
    /// Pinned device; `None` selects the least busy one.
    pub backend: Option<String>,
    /// Seconds to wait for results; `None` waits forever.
    pub timeout: Option<u64>,
    /// Write the token to the account file before connecting.
    pub save: bool,
}

impl RunOptions {
    fn wait_options(&self) -> WaitOptions {
        let options = WaitOptions::default();
        match self.timeout {
            Some(secs) => options.with_timeout(Duration::from_secs(secs)),
            None => options,
        }
    }
}

/// Execute the run command.
pub async fn execute(account: &AccountArgs, options: &RunOptions) -> Result<()> {
    let service = connect(account, options.save).await?;

    let backend = match &options.backend {
        Some(name) => service
            .backend(name)
            .await
            .with_context(|| format!("Failed to load backend '{name}'"))?,
        None => service
            .least_busy(&sampler_filter(options.min_qubits))
            .await
            .context("Failed to select a backend")?,
    };
    println!("Using backend: {}", backend.name());

    let circuit = Circuit::bell()?;
    let isa = transpile(&circuit, backend.target(), options.optimization_level)
        .with_context(|| format!("Failed to transpile for {}", backend.name()))?;
    info!(
        "transpiled: depth {}, {} ops",
        isa.depth(),
        isa.dag().num_ops()
    );
    println!("Circuit transpiled successfully");
    print!("{isa}");

    let job = SamplerV2::new(&backend)
        .run([&isa], Some(options.shots))
        .await
        .context("Failed to submit sampler job")?;
    println!("Job ID: {}", job.job_id());
    println!("Waiting for results...");

    let progress = spinner(format!("Job {} on {}", job.job_id(), job.backend()))?;
    let result = job.result(&options.wait_options()).await;
    progress.finish_and_clear();

    let result = result.map_err(|e| match e {
        IbmError::Timeout(id) => anyhow::anyhow!(
            "Timed out waiting for job {id}. Check on it later with 'quistik job {id} --wait'."
        ),
        other => anyhow::Error::new(other).context("Job did not complete"),
    })?;

    println!("\n=== RESULTS ===");
    println!("{result}");

    if let Some(first) = result.pub_results().first() {
        print_counts(&first.data().join_counts());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(timeout: Option<u64>) -> RunOptions {
        RunOptions {
            shots: 1024,
            optimization_level: 3,
            min_qubits: 127,
            backend: None,
            timeout,
            save: true,
        }
    }

    #[test]
    fn test_wait_forever_by_default() {
        assert_eq!(options(None).wait_options().timeout, None);
    }

    #[test]
    fn test_timeout_in_seconds() {
        let wait = options(Some(90)).wait_options();
        assert_eq!(wait.timeout, Some(Duration::from_secs(90)));
        assert_eq!(wait.poll_interval, WaitOptions::DEFAULT_POLL_INTERVAL);
    }
}
