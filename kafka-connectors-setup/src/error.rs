use thiserror::Error;

/// Errors produced while downloading connector resources or registering connectors.
///
/// Every variant is fatal for the running command: the tool never continues
/// after a failed resource or connector.
#[derive(Debug, Error)]
pub enum ConnectorsSetupError {
    #[error("invalid resource URL '{url}': {reason}")]
    InvalidResourceUrl { url: String, reason: String },

    #[error("failed to download '{url}': {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("an io error occurred on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported archive format for '{0}', expected .zip or a plain, gzip, bzip2, xz or zstd compressed tar")]
    UnsupportedArchive(String),

    #[error("failed to extract zip archive '{path}': {source}")]
    Zip {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive extraction task failed: {0}")]
    ExtractionTask(#[from] tokio::task::JoinError),

    #[error("register data is empty for endpoint {endpoint}")]
    MissingConnectorConfig { endpoint: String },

    #[error("failed to register connector at '{url}': {source}")]
    Register {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build the http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ConnectorsSetupError {
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
