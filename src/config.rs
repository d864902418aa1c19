//! # Configuration
//!
//! Plain serde structs with defaults. Nothing here is global: a [`StoreConfig`] is
//! handed to the store when it is created, a [`TransportConfig`] to
//! [`ReqwestTransport::from_config`](crate::transport::ReqwestTransport::from_config).

use crate::error::ResourceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BUFFER_SIZE: usize = 64;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("resource-kit/", env!("CARGO_PKG_VERSION"));

/// Settings of the store task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Capacity of the request channel. When full, dispatchers wait.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Settings of the default HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Origin used when a resource path carries none.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            bearer_token: None,
        }
    }
}

impl TransportConfig {
    pub fn from_json_str(content: &str) -> Result<Self, ResourceError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads `RESOURCE_KIT_*` variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup("RESOURCE_KIT_BASE_URL").or(defaults.base_url),
            user_agent: lookup("RESOURCE_KIT_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout_secs: lookup("RESOURCE_KIT_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            bearer_token: lookup("RESOURCE_KIT_BEARER_TOKEN").or(defaults.bearer_token),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
