use std::path::Path;

use kafka_config::shared::ConnectorsFile;
use tracing::info;

use crate::error::ConnectorsSetupError;
use crate::ops::ConnectorOps;

/// Runs the `download` and `register` commands over a [`ConnectorsFile`].
///
/// Work is strictly sequential and stops at the first error. Connectors are
/// visited in name order.
pub struct ConnectorsSetup<O> {
    ops: O,
    connectors_file: ConnectorsFile,
}

impl<O> ConnectorsSetup<O>
where
    O: ConnectorOps,
{
    /// Creates the runner for `connectors_file`, performing side effects through `ops`.
    pub fn new(ops: O, connectors_file: ConnectorsFile) -> Self {
        Self {
            ops,
            connectors_file,
        }
    }

    /// Returns the descriptor this runner works on.
    pub fn connectors_file(&self) -> &ConnectorsFile {
        &self.connectors_file
    }

    /// Posts the config of every connector to `endpoint`.
    ///
    /// Returns the number of registered connectors.
    pub async fn register_connectors(&self, endpoint: &str) -> Result<usize, ConnectorsSetupError> {
        for (name, connector) in &self.connectors_file.connectors {
            info!(connector = %name, %endpoint, "registering connector");
            self.ops
                .register_connector(endpoint, connector.config.as_ref())
                .await?;
        }

        Ok(self.connectors_file.connectors.len())
    }

    /// Downloads and extracts the resources of every connector into `download_directory`.
    pub async fn download_connector_resources(
        &self,
        download_directory: &Path,
    ) -> Result<usize, ConnectorsSetupError> {
        let mut count = 0;
        for (name, connector) in &self.connectors_file.connectors {
            info!(connector = %name, "parsing connector resources");
            for resource in &connector.resources {
                self.download_and_extract(download_directory, resource)
                    .await?;
                count += 1;
            }
        }

        Ok(count)
    }

    /// Downloads and extracts the resources shared by all connectors.
    pub async fn download_resources(
        &self,
        download_directory: &Path,
    ) -> Result<usize, ConnectorsSetupError> {
        for resource in &self.connectors_file.resources {
            self.download_and_extract(download_directory, resource)
                .await?;
        }

        Ok(self.connectors_file.resources.len())
    }

    /// Runs the whole `download` command: connector resources first, shared resources after.
    pub async fn download_all(
        &self,
        download_directory: &Path,
    ) -> Result<usize, ConnectorsSetupError> {
        let connector_resources = self
            .download_connector_resources(download_directory)
            .await?;

        info!(
            directory = %download_directory.display(),
            "downloading shared connector resources"
        );
        let shared_resources = self.download_resources(download_directory).await?;

        Ok(connector_resources + shared_resources)
    }

    async fn download_and_extract(
        &self,
        download_directory: &Path,
        resource: &str,
    ) -> Result<(), ConnectorsSetupError> {
        info!(%resource, "downloading file");
        let file_name = self.ops.download_file(download_directory, resource).await?;

        info!(%resource, %file_name, "extracting file");
        self.ops
            .extract_file(&download_directory.join(&file_name), download_directory)
            .await
    }
}
