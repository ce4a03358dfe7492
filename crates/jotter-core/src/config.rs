//! Network configuration
//!
//! Selects which identity provider and which note-store endpoint the client
//! talks to. Nothing else in the client is configurable.
//!
//! ```toml
//! network_mode = "local"
//! local_endpoint_host = "localhost:4943"
//! store_id = "bkyz2-fmaaa-aaaaa-qaaaq-cai"
//! identity_provider_id = "be2us-64aaa-aaaaa-qaabq-cai"
//! ```

use crate::errors::{JotterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Production identity provider
pub const PRODUCTION_IDENTITY_PROVIDER: &str = "https://identity.ic0.app";

/// Production store gateway
pub const PRODUCTION_STORE_ENDPOINT: &str = "https://icp-api.io";

/// Default host of a locally running replica
pub const DEFAULT_LOCAL_HOST: &str = "localhost:4943";

/// Environment variable overriding [`NetworkConfig::network_mode`]
pub const ENV_NETWORK_MODE: &str = "JOTTER_NETWORK_MODE";

/// Environment variable overriding [`NetworkConfig::local_endpoint_host`]
pub const ENV_LOCAL_HOST: &str = "JOTTER_LOCAL_HOST";

/// Which network the client binds to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// A replica on the developer's machine
    #[default]
    Local,
    /// The public network
    Production,
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for NetworkMode {
    type Err = JotterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" | "ic" => Ok(Self::Production),
            other => Err(JotterError::config(format!("unknown network mode '{other}'"))),
        }
    }
}

/// Endpoint a store handle connects to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreEndpoint {
    /// Base URL of the store gateway
    pub endpoint: String,
    /// Whether plain-http and unverified responses are acceptable (local only)
    pub allow_insecure_local: bool,
}

/// Client network configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Local replica or production network
    pub network_mode: NetworkMode,
    /// Host (and port) of the local replica
    pub local_endpoint_host: String,
    /// Service id of the remote note store
    pub store_id: String,
    /// Service id of the identity provider on a local replica
    pub identity_provider_id: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_mode: NetworkMode::Local,
            local_endpoint_host: DEFAULT_LOCAL_HOST.to_string(),
            store_id: "bkyz2-fmaaa-aaaaa-qaaaq-cai".to_string(),
            identity_provider_id: "be2us-64aaa-aaaaa-qaabq-cai".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            JotterError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| JotterError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| JotterError::config(format!("failed to serialize config: {e}")))
    }

    /// Apply `JOTTER_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_from(std::env::vars())
    }

    /// Apply `JOTTER_*` overrides from an explicit variable list
    pub fn merge_from<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            match key.as_ref() {
                ENV_NETWORK_MODE => self.network_mode = value.as_ref().parse()?,
                ENV_LOCAL_HOST => self.local_endpoint_host = value.as_ref().to_string(),
                _ => {}
            }
        }
        self.validate()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.store_id.trim().is_empty() {
            return Err(JotterError::config("store_id must not be empty"));
        }
        if self.network_mode == NetworkMode::Local {
            if self.local_endpoint_host.trim().is_empty() {
                return Err(JotterError::config(
                    "local_endpoint_host must not be empty in local mode",
                ));
            }
            if self.identity_provider_id.trim().is_empty() {
                return Err(JotterError::config(
                    "identity_provider_id must not be empty in local mode",
                ));
            }
        }
        Ok(())
    }

    /// Endpoint store handles bind to
    pub fn store_endpoint(&self) -> StoreEndpoint {
        match self.network_mode {
            NetworkMode::Local => StoreEndpoint {
                endpoint: format!("http://{}", self.local_endpoint_host),
                allow_insecure_local: true,
            },
            NetworkMode::Production => StoreEndpoint {
                endpoint: PRODUCTION_STORE_ENDPOINT.to_string(),
                allow_insecure_local: false,
            },
        }
    }

    /// Base URL of the identity provider
    pub fn identity_provider_url(&self) -> String {
        match self.network_mode {
            NetworkMode::Local => format!(
                "http://{}.{}",
                self.identity_provider_id, self.local_endpoint_host
            ),
            NetworkMode::Production => PRODUCTION_IDENTITY_PROVIDER.to_string(),
        }
    }

    /// URL of the interactive authorize exchange
    pub fn authorize_url(&self) -> String {
        format!("{}#authorize", self.identity_provider_url())
    }
}
