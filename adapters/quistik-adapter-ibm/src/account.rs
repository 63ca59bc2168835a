//! Saved IBM Quantum accounts.
//!
//! Accounts live in a JSON profile compatible with the one
//! `qiskit-ibm-runtime` writes: a map from account name to
//! `{channel, token, instance?, url?, verify, private_endpoint}`. The
//! default location is `~/.qiskit/qiskit-ibm.json`; `QUISTIK_ACCOUNT_FILE`
//! points elsewhere.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use quistik_hal::ApiToken;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::api::DEFAULT_ENDPOINT;
use crate::error::{AccountError, AccountResult};

/// Environment variable overriding the profile location.
pub const ACCOUNT_FILE_ENV: &str = "QUISTIK_ACCOUNT_FILE";

/// Platform URL recorded for new accounts.
pub const DEFAULT_URL: &str = "https://quantum.cloud.ibm.com";

/// How an account reaches Qiskit Runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// IBM Quantum Platform (`quantum.cloud.ibm.com`).
    #[default]
    IbmQuantumPlatform,
    /// IBM Cloud.
    IbmCloud,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::IbmQuantumPlatform => "ibm_quantum_platform",
            Channel::IbmCloud => "ibm_cloud",
        }
    }

    /// Name an account on this channel is saved under when none is given.
    pub fn default_account_name(self) -> &'static str {
        match self {
            Channel::IbmQuantumPlatform => "default-ibm-quantum-platform",
            Channel::IbmCloud => "default-ibm-cloud",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ibm_quantum_platform" => Ok(Channel::IbmQuantumPlatform),
            "ibm_cloud" => Ok(Channel::IbmCloud),
            other => Err(AccountError::InvalidChannel(other.to_string())),
        }
    }
}

/// One saved account. `Debug` never shows the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub channel: Channel,
    pub token: ApiToken,
    /// Service CRN of the Qiskit Runtime instance. Discovered at connect
    /// time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_verify")]
    pub verify: bool,
    #[serde(default)]
    pub private_endpoint: bool,
}

fn default_verify() -> bool {
    true
}

impl Account {
    pub fn new(channel: Channel, token: ApiToken) -> Self {
        Self {
            channel,
            token,
            instance: None,
            url: Some(DEFAULT_URL.to_string()),
            verify: true,
            private_endpoint: false,
        }
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Base URL of the Runtime REST API for this account.
    pub fn api_endpoint(&self) -> String {
        match self.url.as_deref().map(|u| u.trim_end_matches('/')) {
            None | Some(DEFAULT_URL) => DEFAULT_ENDPOINT.to_string(),
            Some(url) if url.ends_with("/api") => url.to_string(),
            Some(url) => format!("{url}/api"),
        }
    }
}

/// The JSON profile holding named accounts.
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$QUISTIK_ACCOUNT_FILE`, or `~/.qiskit/qiskit-ibm.json`.
    pub fn from_env() -> AccountResult<Self> {
        match std::env::var_os(ACCOUNT_FILE_ENV) {
            Some(path) if !path.is_empty() => Ok(Self::at(path)),
            _ => Self::default_path().map(Self::at),
        }
    }

    pub fn default_path() -> AccountResult<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".qiskit").join("qiskit-ibm.json"))
            .ok_or(AccountError::NoHomeDirectory)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save `account` under `name`, or under its channel's default name.
    ///
    /// Fails with [`AccountError::AlreadyExists`] when the name is taken
    /// and `overwrite` is false. Other entries are written back as they
    /// were read, including ones this crate cannot decode. Returns the
    /// name used.
    pub fn save(
        &self,
        name: Option<&str>,
        account: Account,
        overwrite: bool,
    ) -> AccountResult<String> {
        let name = name
            .unwrap_or_else(|| account.channel.default_account_name())
            .to_string();
        let mut entries = self.read_entries()?;
        if entries.contains_key(&name) && !overwrite {
            return Err(AccountError::AlreadyExists(name));
        }
        entries.insert(name.clone(), serde_json::to_value(&account)?);
        self.write_entries(&entries)?;
        info!("saved account '{name}' to {}", self.path.display());
        Ok(name)
    }

    /// Load a named account. Without a name, the platform default account
    /// is tried first, then the IBM Cloud one.
    pub fn load(&self, name: Option<&str>) -> AccountResult<Account> {
        let mut entries = self.read_entries()?;
        let candidates = match name {
            Some(name) => vec![name],
            None => vec![
                Channel::IbmQuantumPlatform.default_account_name(),
                Channel::IbmCloud.default_account_name(),
            ],
        };
        for candidate in &candidates {
            if let Some(raw) = entries.remove(*candidate) {
                let account = serde_json::from_value(raw)?;
                debug!("loaded account '{candidate}'");
                return Ok(account);
            }
        }
        Err(AccountError::NotFound {
            name: candidates[0].to_string(),
            path: self.path.clone(),
        })
    }

    /// Saved accounts by name. Entries on other channels (such as the
    /// retired `ibm_quantum`) are skipped.
    pub fn list(&self) -> AccountResult<BTreeMap<String, Account>> {
        let accounts = self
            .read_entries()?
            .into_iter()
            .filter_map(|(name, raw)| match serde_json::from_value(raw) {
                Ok(account) => Some((name, account)),
                Err(e) => {
                    warn!("skipping account '{name}': {e}");
                    None
                }
            })
            .collect();
        Ok(accounts)
    }

    /// Remove a saved account. Returns whether it existed.
    pub fn delete(&self, name: &str) -> AccountResult<bool> {
        let mut entries = self.read_entries()?;
        if entries.remove(name).is_none() {
            return Ok(false);
        }
        self.write_entries(&entries)?;
        Ok(true)
    }

    fn read_entries(&self) -> AccountResult<BTreeMap<String, Value>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the profile atomically. The new file is owner-only before it
    /// is renamed into place.
    fn write_entries(&self, entries: &BTreeMap<String, Value>) -> AccountResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        restrict_permissions(file.as_file())?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// The profile holds secrets: owner read/write only.
#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> AccountResult<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> AccountResult<()> {
    Ok(())
}
