use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::load::{ConfigError, load_yaml_file};
use crate::shared::ValidationError;

/// A Kafka Connect connector together with the archives it needs on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// URLs of the archives (plugin jars, drivers, ...) required by the connector.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Payload posted verbatim to the Kafka Connect REST API.
    ///
    /// A missing or `null` value is kept as [`None`] and rejected at registration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// The connectors descriptor handed to `kafka-connectors-setup` via `--config`.
///
/// ```yaml
/// connectors:
///   sample-connector-1:
///     resources:
///       - http://foo.bar/resource1.zip
///     config:
///       name: sample-connector-1
///       config:
///         connector.class: foo.bar
/// resources:
///   - http://foo.bar/resource0.zip
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorsFile {
    /// Connectors keyed by their unique name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connectors: BTreeMap<String, Connector>,
    /// Archives shared by all connectors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

impl ConnectorsFile {
    /// Parses a descriptor from YAML (or JSON) text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Total number of archives listed by the connectors and the shared list.
    pub fn resource_count(&self) -> usize {
        self.connectors
            .values()
            .map(|connector| connector.resources.len())
            .sum::<usize>()
            + self.resources.len()
    }

    /// Rejects blank resource entries, which could never be downloaded.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let connector_resources = self
            .connectors
            .values()
            .flat_map(|connector| connector.resources.iter());

        for resource in connector_resources.chain(self.resources.iter()) {
            if resource.trim().is_empty() {
                return Err(ValidationError::InvalidResource {
                    resource: resource.clone(),
                    reason: "resource URL cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Loads the [`ConnectorsFile`] at `path` and validates it.
pub fn load_connectors_file(path: &Path) -> Result<ConnectorsFile, ConfigError> {
    let connectors_file: ConnectorsFile = load_yaml_file(path)?;
    connectors_file.validate()?;

    Ok(connectors_file)
}
