//! Client configuration.
//!
//! [`ConfigStore`] is the shared, runtime-mutable state (base URL and access
//! token) read by every request. [`NexusSettings`] is the startup
//! configuration loaded from the environment.

use crate::error::{NexusError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Base URL used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "http://localhost:8080/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Snapshot of the client configuration.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigState {
    /// Prefix for relative request paths.
    pub base_url: String,
    /// Bearer token, when authenticated.
    pub access_token: Option<String>,
}

impl fmt::Debug for ConfigState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigState")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Shared configuration handle.
///
/// Clones share state. Every update swaps in a new immutable
/// [`ConfigState`]; readers keep whatever snapshot they already took.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    state: Arc<RwLock<Arc<ConfigState>>>,
}

impl ConfigStore {
    /// Create a store pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let store = Self::default();
        store.set_environment(base_url);
        store
    }

    /// Current configuration.
    pub fn snapshot(&self) -> Arc<ConfigState> {
        self.state.read().clone()
    }

    /// Replace the base URL.
    pub fn set_environment(&self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        self.update(|state| ConfigState {
            base_url,
            ..state.clone()
        });
    }

    /// Set the access token. Empty tokens are rejected and leave the store
    /// untouched.
    pub fn set_token(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(NexusError::InvalidToken);
        }
        let token = token.to_string();
        self.update(|state| ConfigState {
            access_token: Some(token),
            ..state.clone()
        });
        Ok(())
    }

    /// Clear the access token.
    pub fn remove_token(&self) {
        self.update(|state| ConfigState {
            access_token: None,
            ..state.clone()
        });
    }

    fn update(&self, f: impl FnOnce(&ConfigState) -> ConfigState) {
        let mut guard = self.state.write();
        let next = f(&guard);
        *guard = Arc::new(next);
    }
}

/// Startup settings.
#[derive(Clone, Deserialize, Serialize)]
pub struct NexusSettings {
    /// Base URL of the Nexus API, e.g. `https://nexus.example.com/v1`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for NexusSettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for NexusSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NexusSettings")
            .field("environment", &self.environment)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl NexusSettings {
    /// Settings for a base URL.
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            ..Default::default()
        }
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load from `NEXUS_ENVIRONMENT`, `NEXUS_TOKEN` and `NEXUS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("NEXUS").try_parsing(true))
    }

    /// Load from any configuration source.
    pub fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize::<NexusSettings>()?;

        url::Url::parse(&settings.environment).map_err(|e| {
            NexusError::InvalidConfig(format!("environment `{}`: {e}", settings.environment))
        })?;

        Ok(settings)
    }
}
