use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::load::{ConfigError, load_env_config};
use crate::shared::ValidationError;

/// Default number of times a pending load balancer is re-fetched.
const DEFAULT_LOAD_BALANCER_POLL_ATTEMPTS: u32 = 10;

/// Default pause between two load balancer fetches.
const DEFAULT_LOAD_BALANCER_POLL_INTERVAL_MS: u64 = 3_000;

/// Fixed-interval polling policy used while a load balancer ingress is pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Maximum number of fetches before giving up.
    pub max_attempts: u32,
    /// Delay, in milliseconds, between two fetches.
    pub interval_ms: u64,
}

impl PollConfig {
    /// Returns the pause between two fetches.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_LOAD_BALANCER_POLL_ATTEMPTS,
            interval_ms: DEFAULT_LOAD_BALANCER_POLL_INTERVAL_MS,
        }
    }
}

/// Settings of the ingress resolver sidecar.
///
/// Every field maps to an environment variable of the broker pod, e.g.
/// `external_ingress_port` is read from `EXTERNAL_INGRESS_PORT`. Missing
/// variables become empty strings; an empty hostname is reported when the
/// ingress is resolved, not here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngressConfig {
    /// Name of the broker pod, used to find the `<hostname>-external` service.
    #[serde(default)]
    pub hostname: String,
    /// Namespace of the broker pod.
    #[serde(default)]
    pub namespace: String,
    /// Node the broker pod is scheduled on.
    #[serde(default)]
    pub node_name: String,
    /// Port advertised when the service does not expose a node port.
    #[serde(default)]
    pub external_ingress_port: String,
    /// Comma separated `NAME:PROTOCOL` pairs of the broker listeners.
    #[serde(default)]
    pub listener_security_protocol_map: String,
    #[serde(default = "default_load_balancer_poll_attempts")]
    pub load_balancer_poll_attempts: u32,
    #[serde(default = "default_load_balancer_poll_interval_ms")]
    pub load_balancer_poll_interval_ms: u64,
}

fn default_load_balancer_poll_attempts() -> u32 {
    DEFAULT_LOAD_BALANCER_POLL_ATTEMPTS
}

fn default_load_balancer_poll_interval_ms() -> u64 {
    DEFAULT_LOAD_BALANCER_POLL_INTERVAL_MS
}

impl IngressConfig {
    /// Returns the polling policy for pending load balancers.
    pub fn load_balancer_poll(&self) -> PollConfig {
        PollConfig {
            max_attempts: self.load_balancer_poll_attempts,
            interval_ms: self.load_balancer_poll_interval_ms,
        }
    }

    /// Checks that at least one load balancer fetch is allowed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.load_balancer_poll_attempts == 0 {
            return Err(ValidationError::InvalidConfig(
                "`load_balancer_poll_attempts` must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            namespace: String::new(),
            node_name: String::new(),
            external_ingress_port: String::new(),
            listener_security_protocol_map: String::new(),
            load_balancer_poll_attempts: DEFAULT_LOAD_BALANCER_POLL_ATTEMPTS,
            load_balancer_poll_interval_ms: DEFAULT_LOAD_BALANCER_POLL_INTERVAL_MS,
        }
    }
}

/// Loads the [`IngressConfig`] from the process environment and validates it.
pub fn load_ingress_config() -> Result<IngressConfig, ConfigError> {
    let config = load_env_config::<IngressConfig>()?;
    config.validate()?;

    Ok(config)
}
