//! Job command implementation.
//!
//! Re-attach to a submitted job: show its state, and its results once it
//! has finished.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use console::style;

use quistik_adapter_ibm::JobStatusResponse;
use quistik_hal::{JobStatus, WaitOptions};

use super::common::{AccountArgs, connect, print_counts, spinner};

/// Execute the job command.
pub async fn execute(
    account: &AccountArgs,
    job_id: &str,
    wait: bool,
    timeout: Option<u64>,
    cancel: bool,
) -> Result<()> {
    let service = connect(account, false).await?;
    let job = service
        .job(job_id)
        .await
        .with_context(|| format!("Failed to look up job {job_id}"))?;

    if cancel {
        job.cancel()
            .await
            .with_context(|| format!("Failed to cancel job {job_id}"))?;
        println!("{} Cancelled job {}", style("✓").green().bold(), job_id);
        return Ok(());
    }

    let details = job.details().await?;
    print_details(&details);

    let status = details.job_status();
    let result = if status.is_success() {
        Some(job.fetch_result().await?)
    } else if wait && status.is_pending() {
        let mut options = WaitOptions::default();
        if let Some(secs) = timeout {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        let progress = spinner(format!("Waiting for job {job_id}"))?;
        let result = job.result(&options).await;
        progress.finish_and_clear();
        Some(result?)
    } else {
        None
    };

    match result {
        Some(result) => {
            println!("\n=== RESULTS ===");
            println!("{result}");
            if let Some(first) = result.pub_results().first() {
                print_counts(&first.data().join_counts());
            }
        }
        None if status.is_pending() => {
            println!("\nResults are not ready yet. Use --wait to block until the job finishes.");
        }
        None => {}
    }

    Ok(())
}

fn print_details(details: &JobStatusResponse) {
    let status = details.job_status();
    let styled = match &status {
        JobStatus::Completed => style(status.to_string()).green(),
        JobStatus::Failed(_) | JobStatus::Cancelled => style(status.to_string()).red(),
        JobStatus::Queued | JobStatus::Running => style(status.to_string()).yellow(),
    };

    println!("Job ID:   {}", details.id);
    if let Some(backend) = &details.backend {
        println!("Backend:  {backend}");
    }
    println!("Status:   {styled}");
    if let Some(created) = details.created_at() {
        println!(
            "Created:  {}",
            created.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
    }
    if let Some(seconds) = details.usage.as_ref().and_then(|u| u.quantum_seconds) {
        println!("Usage:    {seconds:.1} quantum seconds");
    }
    if let Some(reason) = details.error_message() {
        println!("Reason:   {reason}");
    }
}
