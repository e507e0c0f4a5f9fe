//! Explicit configuration objects passed into the client and workflows.
//!
//! Nothing here is read from process-global state; the CLI builds these
//! from flags and environment variables and hands them down.

use std::fmt;
use std::time::Duration;

use crate::error::{FleetError, Result};

/// Default DigitalOcean API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com/v2";

/// Default timeout for a single API request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the provider client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token for the REST API.
    pub api_token: String,
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the public API endpoint.
    ///
    /// # Errors
    /// Returns an error if the token is empty.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(FleetError::Config("API token must not be empty".to_string()));
        }

        Ok(Self {
            api_token,
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Point the client at a different endpoint (used against mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Operator-supplied bootstrap credentials.
///
/// There are no built-in defaults: a create run without a root password is
/// refused, and a public key is only needed when the account has none.
#[derive(Clone, Default)]
pub struct CredentialConfig {
    /// Root password set on every created droplet.
    pub root_password: Option<String>,
    /// OpenSSH public key registered when the account has no key yet.
    pub ssh_public_key: Option<String>,
}

impl CredentialConfig {
    /// Root password, or a configuration error naming how to supply one.
    ///
    /// # Errors
    /// Returns an error if no password was configured.
    pub fn require_root_password(&self) -> Result<&str> {
        self.root_password.as_deref().ok_or_else(|| {
            FleetError::Config(
                "a root password is required (--root-password or DROPFLEET_ROOT_PASSWORD)"
                    .to_string(),
            )
        })
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("root_password", &self.root_password.as_ref().map(|_| "<redacted>"))
            .field("ssh_public_key", &self.ssh_public_key)
            .finish()
    }
}

/// Bounded exponential-backoff settings for status confirmation.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before the first status read.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each read.
    pub backoff_multiplier: f64,
    /// Maximum number of status reads.
    pub max_attempts: u32,
    /// Overall deadline measured from the start of polling.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            max_attempts: 6,
            timeout: Duration::from_secs(180),
        }
    }
}

impl PollConfig {
    /// Sleep once, then read once.
    #[must_use]
    pub fn single_read(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            backoff_multiplier: 1.0,
            max_attempts: 1,
            timeout: delay,
        }
    }

    /// Delay to wait after the given delay.
    #[must_use]
    pub fn next_delay(&self, delay: Duration) -> Duration {
        std::cmp::min(
            self.max_delay,
            Duration::from_secs_f64(delay.as_secs_f64() * self.backoff_multiplier),
        )
    }
}
