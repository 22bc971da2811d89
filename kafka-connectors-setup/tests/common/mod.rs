#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kafka_connectors_setup::error::ConnectorsSetupError;
use kafka_connectors_setup::ops::ConnectorOps;

/// A side effect requested from [`RecordingOps`].
#[derive(Debug, Clone, PartialEq)]
pub enum OpCall {
    Download {
        directory: PathBuf,
        url: String,
    },
    Extract {
        archive: PathBuf,
        destination: PathBuf,
    },
    Register {
        endpoint: String,
        config: Option<serde_json::Value>,
    },
}

/// [`ConnectorOps`] double that records every call instead of touching the network.
///
/// Downloads of `failing_url` fail, which lets tests check that a command stops
/// at the first error.
#[derive(Debug, Clone, Default)]
pub struct RecordingOps {
    calls: Arc<Mutex<Vec<OpCall>>>,
    failing_url: Option<String>,
}

impl RecordingOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(url: &str) -> Self {
        Self {
            failing_url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<OpCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn downloaded_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                OpCall::Download { url, .. } => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: OpCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ConnectorOps for RecordingOps {
    async fn download_file(
        &self,
        download_directory: &Path,
        url: &str,
    ) -> Result<String, ConnectorsSetupError> {
        self.record(OpCall::Download {
            directory: download_directory.to_path_buf(),
            url: url.to_string(),
        });

        if self.failing_url.as_deref() == Some(url) {
            return Err(ConnectorsSetupError::InvalidResourceUrl {
                url: url.to_string(),
                reason: "forced failure".to_string(),
            });
        }

        Ok(url.rsplit('/').next().unwrap_or_default().to_string())
    }

    async fn extract_file(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<(), ConnectorsSetupError> {
        self.record(OpCall::Extract {
            archive: archive.to_path_buf(),
            destination: destination.to_path_buf(),
        });

        Ok(())
    }

    async fn register_connector(
        &self,
        endpoint: &str,
        config: Option<&serde_json::Value>,
    ) -> Result<(), ConnectorsSetupError> {
        self.record(OpCall::Register {
            endpoint: endpoint.to_string(),
            config: config.cloned(),
        });

        Ok(())
    }
}

/// Builds an in-memory zip archive containing `entries`.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }

    writer.finish().unwrap().into_inner()
}
