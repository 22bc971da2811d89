use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while reading configuration from the environment or from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings from the environment: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Validation(#[from] crate::shared::ValidationError),
}

/// Loads `T` from the process environment variables.
///
/// Variables are read without any prefix and their names are lowercased, so
/// `NODE_NAME` populates a `node_name` field. Values are kept as strings and
/// converted by serde when deserializing, so numeric fields accept `"10"`.
pub fn load_env_config<T>() -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    build_env_config(config::Environment::default())
}

/// Loads `T` from an explicit set of variables instead of the process environment.
///
/// Behaves like [`load_env_config`] and is meant for callers that must not
/// depend on global process state, such as tests.
pub fn load_env_config_from<T>(vars: HashMap<String, String>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    build_env_config(config::Environment::default().source(Some(vars)))
}

fn build_env_config<T>(source: config::Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let settings = config::Config::builder().add_source(source).build()?;

    Ok(settings.try_deserialize::<T>()?)
}

/// Reads the file at `path` and parses it as YAML into `T`.
///
/// JSON documents are accepted as well since JSON is a subset of YAML.
pub fn load_yaml_file<T>(path: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    Ok(serde_yaml::from_str(&content)?)
}
