use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use k8s_openapi::api::core::v1::LoadBalancerIngress;
use tracing::{error, info};

/// File listing the advertised external listeners.
pub const EXTERNAL_ADVERTISED_LISTENERS_FILE: &str = "external.advertised.listeners";
/// File listing the bind addresses of the external listeners.
pub const EXTERNAL_LISTENERS_FILE: &str = "external.listeners";
/// File holding the security protocol of the external listener.
pub const EXTERNAL_LISTENER_SECURITY_PROTOCOL_MAP_FILE: &str =
    "external.listener.security.protocol.map";
/// File holding the bare external host names and addresses.
pub const EXTERNAL_DNS_FILE: &str = "external.dns";

/// Listener name used by the broker for external traffic.
pub const EXTERNAL_INGRESS_PROTOCOL_NAME: &str = "EXTERNAL_INGRESS";

const BIND_ALL_ADDRESS: &str = "0.0.0.0";

/// Listener whose protocol is reused for the external listener.
const INTERNAL_LISTENER_NAME: &str = "INTERNAL";

/// Yields the non-empty host name, then the non-empty IP, of every ingress.
fn ingress_addresses(ingresses: &[LoadBalancerIngress]) -> impl Iterator<Item = &str> {
    ingresses.iter().flat_map(|ingress| {
        [ingress.hostname.as_deref(), ingress.ip.as_deref()]
            .into_iter()
            .flatten()
            .filter(|address| !address.is_empty())
    })
}

/// Renders `EXTERNAL_INGRESS://<address>:<port>` for every ingress address.
pub fn advertised_listeners(ingresses: &[LoadBalancerIngress], port: &str) -> String {
    ingress_addresses(ingresses)
        .map(|address| format!("{EXTERNAL_INGRESS_PROTOCOL_NAME}://{address}:{port}"))
        .collect()
}

/// Renders one `EXTERNAL_INGRESS://0.0.0.0:<port>` per ingress address.
///
/// The broker binds on every interface whatever address is advertised.
pub fn bind_listeners(ingresses: &[LoadBalancerIngress], port: &str) -> String {
    ingress_addresses(ingresses)
        .map(|_| format!("{EXTERNAL_INGRESS_PROTOCOL_NAME}://{BIND_ALL_ADDRESS}:{port}"))
        .collect()
}

/// Renders the bare ingress addresses.
pub fn dns_names(ingresses: &[LoadBalancerIngress]) -> String {
    ingress_addresses(ingresses).collect()
}

/// Maps the protocol of the `INTERNAL` listener onto the external listener.
///
/// `security_protocol_map` holds comma separated `NAME:PROTOCOL` pairs. Returns
/// an empty string when no `INTERNAL` pair is present.
pub fn security_protocol_map(security_protocol_map: &str) -> String {
    if !security_protocol_map.is_empty() {
        info!(%security_protocol_map, "detected internal listener security protocol map");

        for entry in security_protocol_map.split(',') {
            let Some((name, protocol)) = entry.split_once(':') else {
                info!(%entry, "cannot detect the security protocol type");
                continue;
            };
            if protocol.contains(':') {
                info!(%entry, "cannot detect the security protocol type");
                continue;
            }

            if name == INTERNAL_LISTENER_NAME {
                return format!("{EXTERNAL_INGRESS_PROTOCOL_NAME}:{protocol}");
            }
        }
    }

    info!("no 'INTERNAL' value for LISTENER_SECURITY_PROTOCOL_MAP detected");

    String::new()
}

/// Appends `content` to the file at `path`, creating it if needed.
///
/// Existing content is kept, so running twice over the same directory
/// duplicates the entries.
pub fn append_to_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

/// The content of the four listener files derived from a resolved ingress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFiles {
    pub advertised_listeners: String,
    pub listeners: String,
    pub security_protocol_map: String,
    pub dns: String,
}

impl ListenerFiles {
    /// Renders the files for `ingresses` exposed on `port`.
    ///
    /// `raw_security_protocol_map` is the broker's `LISTENER_SECURITY_PROTOCOL_MAP`.
    pub fn render(
        ingresses: &[LoadBalancerIngress],
        port: &str,
        raw_security_protocol_map: &str,
    ) -> ListenerFiles {
        ListenerFiles {
            advertised_listeners: advertised_listeners(ingresses, port),
            listeners: bind_listeners(ingresses, port),
            security_protocol_map: security_protocol_map(raw_security_protocol_map),
            dns: dns_names(ingresses),
        }
    }

    /// Writes every file under `base_path`.
    ///
    /// A failing file is logged and skipped; the others are still written.
    /// Returns the number of files written.
    pub fn write_to(&self, base_path: &Path) -> usize {
        let files = [
            (EXTERNAL_ADVERTISED_LISTENERS_FILE, &self.advertised_listeners),
            (EXTERNAL_LISTENERS_FILE, &self.listeners),
            (
                EXTERNAL_LISTENER_SECURITY_PROTOCOL_MAP_FILE,
                &self.security_protocol_map,
            ),
            (EXTERNAL_DNS_FILE, &self.dns),
        ];

        let mut written = 0;
        for (file_name, content) in files {
            let path = base_path.join(file_name);
            match append_to_file(&path, content) {
                Ok(()) => {
                    info!(path = %path.display(), "created the listener file");
                    written += 1;
                }
                Err(err) => {
                    error!(path = %path.display(), "failed creating file: {err}");
                }
            }
        }

        written
    }
}
