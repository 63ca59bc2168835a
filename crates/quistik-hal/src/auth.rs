//! Credentials.
//!
//! [`ApiToken`] wraps a provider secret so it never reaches logs or
//! `Debug` output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// A provider API token. `Debug` and `Display` print `[REDACTED]`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a token. Surrounding whitespace is trimmed; an empty token is
    /// rejected.
    pub fn new(token: impl Into<String>) -> HalResult<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(HalError::AuthenticationFailed("empty API token".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw secret, for request bodies only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken([REDACTED])")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
