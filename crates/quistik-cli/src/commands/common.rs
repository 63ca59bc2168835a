//! Shared helpers for CLI commands.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use quistik_adapter_ibm::{
    Account, AccountError, AccountStore, Channel, IbmError, RuntimeService,
};
use quistik_hal::{ApiToken, BackendFilter, Counts, HalResult};

/// Credentials and the profile entry they map to.
///
/// The token is only ever read from `QISKIT_IBM_TOKEN` or `--token`.
#[derive(Args, Debug, Clone)]
pub struct AccountArgs {
    /// IBM Cloud API key
    #[arg(
        long,
        env = "QISKIT_IBM_TOKEN",
        hide_env_values = true,
        value_parser = parse_token
    )]
    pub token: Option<ApiToken>,

    /// Channel (ibm_quantum_platform, ibm_cloud)
    #[arg(long, env = "QISKIT_IBM_CHANNEL", default_value = "ibm_quantum_platform")]
    pub channel: Channel,

    /// Qiskit Runtime instance CRN
    #[arg(long, env = "QISKIT_IBM_INSTANCE")]
    pub instance: Option<String>,

    /// Account name in the profile (defaults to the channel's)
    #[arg(long)]
    pub name: Option<String>,
}

fn parse_token(raw: &str) -> HalResult<ApiToken> {
    ApiToken::new(raw)
}

impl AccountArgs {
    /// The account described by the flags, if a token was given.
    pub fn account(&self) -> Option<Account> {
        let token = self.token.clone()?;
        let account = Account::new(self.channel, token);
        Some(match &self.instance {
            Some(instance) => account.with_instance(instance),
            None => account,
        })
    }
}

/// Device selection criteria.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Minimum qubit count of the device
    #[arg(long, default_value = "127")]
    pub min_qubits: u32,
}

impl SelectionArgs {
    /// Operational hardware with at least `min_qubits` qubits.
    pub fn filter(&self) -> BackendFilter {
        sampler_filter(self.min_qubits)
    }
}

pub fn sampler_filter(min_qubits: u32) -> BackendFilter {
    BackendFilter::new()
        .operational(true)
        .simulator(false)
        .min_num_qubits(min_qubits)
}

/// The account profile, honouring `QUISTIK_ACCOUNT_FILE`.
pub fn account_store() -> Result<AccountStore> {
    AccountStore::from_env().context("Failed to locate the account file")
}

/// Open a Runtime session.
///
/// With a token on the command line or in the environment, that account is
/// used, and written to the profile first when `save` is set. Otherwise the
/// saved account is loaded.
pub async fn connect(args: &AccountArgs, save: bool) -> Result<RuntimeService> {
    let store = account_store()?;
    let account = match args.account() {
        Some(account) => {
            if save {
                let name = store
                    .save(args.name.as_deref(), account.clone(), true)
                    .context("Failed to save account")?;
                info!("saved account '{name}' to {}", store.path().display());
            }
            account
        }
        None => {
            let account = match store.load(args.name.as_deref()) {
                Ok(account) => account,
                Err(AccountError::NotFound { .. }) => return Err(IbmError::MissingToken.into()),
                Err(e) => return Err(e).context("Failed to load saved account"),
            };
            match &args.instance {
                Some(instance) => account.with_instance(instance),
                None => account,
            }
        }
    };

    RuntimeService::from_account(&account)
        .await
        .context("Failed to connect to IBM Quantum")
}

/// A spinner on stderr, hidden when stderr is not a terminal.
pub fn spinner(message: String) -> Result<ProgressBar> {
    if !console::Term::stderr().is_term() {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")?,
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

/// Print counts as a histogram, most frequent outcome first.
pub fn print_counts(counts: &Counts) {
    let total = counts.total_shots();
    if total == 0 {
        println!("\n  (no shots returned)");
        return;
    }

    println!("\n{} Counts ({} shots):", style("✓").green().bold(), total);

    let sorted = counts.sorted();
    for (bitstring, count) in sorted.iter().take(16) {
        let prob = *count as f64 / total as f64 * 100.0;
        let bar: String = "█".repeat((prob / 2.0).round() as usize);
        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(token: Option<&str>, instance: Option<&str>) -> AccountArgs {
        AccountArgs {
            token: token.map(|t| ApiToken::new(t).unwrap()),
            channel: Channel::IbmQuantumPlatform,
            instance: instance.map(String::from),
            name: None,
        }
    }

    #[test]
    fn test_account_requires_token() {
        assert!(args(None, Some("crn:v1:x")).account().is_none());
    }

    #[test]
    fn test_account_from_flags() {
        let account = args(Some("not-a-real-key"), Some("crn:v1:x")).account().unwrap();
        assert_eq!(account.channel, Channel::IbmQuantumPlatform);
        assert_eq!(account.token.expose(), "not-a-real-key");
        assert_eq!(account.instance.as_deref(), Some("crn:v1:x"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", args(Some("not-a-real-key"), None));
        assert!(!rendered.contains("not-a-real-key"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(parse_token("   ").is_err());
    }

    #[test]
    fn test_sampler_filter() {
        let filter = sampler_filter(127);
        assert_eq!(filter.operational, Some(true));
        assert_eq!(filter.simulator, Some(false));
        assert_eq!(filter.min_num_qubits, Some(127));
        assert!(filter.name.is_none());
    }
}
