use thiserror::Error;

use crate::k8s::K8sError;

/// Errors that abort the resolution of the broker's external ingress.
///
/// Listing failures and file write failures are not part of it: they are
/// logged and the resolver carries on.
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("env variable HOSTNAME not found")]
    MissingHostname,

    #[error("error fetching node '{node_name}': {source}")]
    NodeLookup {
        node_name: String,
        #[source]
        source: K8sError,
    },

    #[error("no external IP found for node '{0}'")]
    MissingNodeExternalIp(String),
}
