use std::path::Path;

use kafka_config::shared::{IngressConfig, load_ingress_config};
use kafka_telemetry::tracing::init_tracing;
use kafka_utils::k8s::http::HttpK8sClient;
use kafka_utils::service::KafkaService;
use tracing::{error, info};

/// Directory the broker start script reads the listener files from.
const KAFKA_HOME: &str = "/opt/kafka";

fn main() -> anyhow::Result<()> {
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    info!("running kafka-utils");

    let config = match load_ingress_config() {
        Ok(config) => config,
        Err(err) => {
            error!("error in loading the ingress configuration: {err}");
            return Err(err.into());
        }
    };

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main(config))
}

async fn async_main(config: IngressConfig) -> anyhow::Result<()> {
    let client = match HttpK8sClient::new().await {
        Ok(client) => client,
        Err(err) => {
            error!("error initializing the kubernetes client: {err}");
            return Err(err.into());
        }
    };

    let service = KafkaService::new(client, config);

    // A broker without external listeners still has to start.
    match service.write_ingress_to_path(Path::new(KAFKA_HOME)).await {
        Ok(()) => info!("finished the kafka-utils bootstrap"),
        Err(err) => error!("could not run the kafka-utils bootstrap: {err}"),
    }

    Ok(())
}
