//! Backends command implementation.

use anyhow::{Context, Result};
use console::style;

use quistik_hal::{BackendFilter, BackendSummary};

use super::common::{AccountArgs, SelectionArgs, connect, spinner};

/// Execute the backends command.
pub async fn execute(account: &AccountArgs, selection: &SelectionArgs, all: bool) -> Result<()> {
    let service = connect(account, false).await?;
    let filter = if all {
        BackendFilter::new()
    } else {
        selection.filter()
    };

    let progress = spinner("Querying devices...".to_string())?;
    let devices = service.backends(&filter).await;
    progress.finish_and_clear();
    let devices = devices.context("Failed to list backends")?;

    if devices.is_empty() {
        println!("No backends match {filter}");
        return Ok(());
    }

    println!(
        "{} {} backends matching {}:\n",
        style("quistik").cyan().bold(),
        devices.len(),
        filter
    );
    for (index, device) in devices.iter().enumerate() {
        println!("{}", describe(device, index == 0 && !all));
    }

    Ok(())
}

fn describe(device: &BackendSummary, least_busy: bool) -> String {
    let marker = if device.operational {
        style("●").green()
    } else {
        style("○").red()
    };
    let kind = if device.simulator { ", simulator" } else { "" };
    let mut line = format!(
        "  {} {:<20} {:>4} qubits{}  pending jobs: {}",
        marker,
        style(&device.name).bold(),
        device.num_qubits,
        kind,
        device.pending_jobs
    );
    if least_busy {
        line.push_str(&format!("  {}", style("<- least busy").yellow()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, operational: bool, pending_jobs: u32) -> BackendSummary {
        BackendSummary {
            name: name.into(),
            num_qubits: 127,
            simulator: false,
            operational,
            pending_jobs,
        }
    }

    #[test]
    fn test_describe_marks_least_busy() {
        let line = console::strip_ansi_codes(&describe(&device("ibm_kyiv", true, 3), true))
            .into_owned();
        assert!(line.contains("ibm_kyiv"));
        assert!(line.contains("127 qubits"));
        assert!(line.contains("pending jobs: 3"));
        assert!(line.contains("least busy"));
    }

    #[test]
    fn test_describe_plain_entry() {
        let line = console::strip_ansi_codes(&describe(&device("ibm_brisbane", false, 40), false))
            .into_owned();
        assert!(line.contains("ibm_brisbane"));
        assert!(!line.contains("least busy"));
        assert!(!line.contains("simulator"));
    }
}
