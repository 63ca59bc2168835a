//! Save-account command implementation.

use anyhow::{Context, Result};
use console::style;

use quistik_adapter_ibm::IbmError;

use super::common::{AccountArgs, account_store};

/// Execute the save-account command.
pub fn execute(args: &AccountArgs, overwrite: bool) -> Result<()> {
    let account = args.account().ok_or(IbmError::MissingToken)?;
    let store = account_store()?;
    let name = store
        .save(args.name.as_deref(), account, overwrite)
        .context("Failed to save account")?;

    println!(
        "{} Saved account {} ({}) to {}",
        style("✓").green().bold(),
        style(&name).cyan(),
        args.channel,
        style(store.path().display()).dim()
    );
    Ok(())
}
