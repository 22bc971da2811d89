use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Url;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::archive::extract_archive;
use crate::error::ConnectorsSetupError;

/// Side effects needed by [`crate::setup::ConnectorsSetup`].
///
/// The production implementation is [`HttpConnectorOps`]; tests substitute a
/// recording double to observe which resources and connectors were handled.
#[async_trait]
pub trait ConnectorOps: Send + Sync {
    /// Downloads `url` into `download_directory` and returns the local file name.
    async fn download_file(
        &self,
        download_directory: &Path,
        url: &str,
    ) -> Result<String, ConnectorsSetupError>;

    /// Extracts the archive at `archive` into `destination`.
    async fn extract_file(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<(), ConnectorsSetupError>;

    /// Posts `config` to the `connectors` collection of the Kafka Connect REST `endpoint`.
    async fn register_connector(
        &self,
        endpoint: &str,
        config: Option<&serde_json::Value>,
    ) -> Result<(), ConnectorsSetupError>;
}

/// Returns the last path segment of `url`, used as the local file name.
pub fn resource_file_name(url: &str) -> Result<String, ConnectorsSetupError> {
    let invalid = |reason: &str| ConnectorsSetupError::InvalidResourceUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url).map_err(|err| invalid(&err.to_string()))?;

    parsed
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| invalid("the URL path has no file name"))
}

/// Returns the URL of the connectors collection of a Kafka Connect endpoint.
pub fn connectors_url(endpoint: &str) -> String {
    format!("{}/connectors", endpoint.trim_end_matches('/'))
}

/// [`ConnectorOps`] backed by HTTP requests and local archive extraction.
#[derive(Debug, Clone)]
pub struct HttpConnectorOps {
    client: reqwest::Client,
}

impl HttpConnectorOps {
    /// Builds the ops with a default [`reqwest::Client`].
    pub fn new() -> Result<Self, ConnectorsSetupError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(ConnectorsSetupError::HttpClient)?;

        Ok(Self::with_client(client))
    }

    /// Builds the ops on top of an already configured `client`, e.g. one with timeouts or proxies.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConnectorOps for HttpConnectorOps {
    async fn download_file(
        &self,
        download_directory: &Path,
        url: &str,
    ) -> Result<String, ConnectorsSetupError> {
        let file_name = resource_file_name(url)?;
        let file_path = download_directory.join(&file_name);

        let download_error = |source| ConnectorsSetupError::Download {
            url: url.to_string(),
            source,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(download_error)?;

        let mut file = tokio::fs::File::create(&file_path)
            .await
            .map_err(ConnectorsSetupError::io(&file_path))?;

        while let Some(chunk) = response.chunk().await.map_err(download_error)? {
            file.write_all(&chunk)
                .await
                .map_err(ConnectorsSetupError::io(&file_path))?;
        }
        file.flush()
            .await
            .map_err(ConnectorsSetupError::io(&file_path))?;

        Ok(file_name)
    }

    async fn extract_file(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<(), ConnectorsSetupError> {
        let archive = PathBuf::from(archive);
        let destination = PathBuf::from(destination);

        tokio::task::spawn_blocking(move || extract_archive(&archive, &destination)).await?
    }

    async fn register_connector(
        &self,
        endpoint: &str,
        config: Option<&serde_json::Value>,
    ) -> Result<(), ConnectorsSetupError> {
        let Some(config) = config else {
            return Err(ConnectorsSetupError::MissingConnectorConfig {
                endpoint: endpoint.to_string(),
            });
        };

        let url = connectors_url(endpoint);
        let response = self
            .client
            .post(&url)
            .json(config)
            .send()
            .await
            .map_err(|source| ConnectorsSetupError::Register {
                url: url.clone(),
                source,
            })?;

        // Kafka Connect answers 409 for connectors that already exist, which is
        // expected when the setup job is re-run, so the status never fails the command.
        let status = response.status();
        if status.is_success() {
            info!(%url, %status, "connector registered");
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, %status, body = %body, "kafka connect did not accept the connector");
        }

        Ok(())
    }
}
