use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use kafka_config::shared::{ConnectorsFile, load_connectors_file};
use kafka_connectors_setup::ops::HttpConnectorOps;
use kafka_connectors_setup::setup::ConnectorsSetup;
use kafka_telemetry::tracing::init_tracing;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "kafka-connectors-setup")]
#[command(about = "A command-line kafka connectors configuration parser and setup helper.")]
#[command(version)]
struct Cli {
    /// Path to the configuration file.
    // Global arguments cannot be required in clap; `Cli::config_path` enforces it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Downloads the resources needed for connectors.
    Download,
    /// Register the connectors in kafka-connect.
    Register {
        /// Kafka Connect REST endpoint
        endpoint: String,
    },
}

impl Cli {
    fn config_path(&self) -> Result<&Path, clap::Error> {
        self.config.as_deref().ok_or_else(|| {
            Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "the following required arguments were not provided:\n  --config <CONFIG>",
            )
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path().unwrap_or_else(|err| err.exit());

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    info!("running kafka-connectors-setup");

    let connectors_file = match load_connectors_file(config_path) {
        Ok(connectors_file) => connectors_file,
        Err(err) => {
            error!("error in parsing configuration file: {err}");
            return Err(err.into());
        }
    };

    // Every step is sequential, a single thread is all the tool needs.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli.command, connectors_file))
}

async fn async_main(command: Command, connectors_file: ConnectorsFile) -> anyhow::Result<()> {
    let setup = ConnectorsSetup::new(HttpConnectorOps::new()?, connectors_file);

    match command {
        Command::Download => {
            let download_directory = std::env::current_dir()?;
            info!(
                directory = %download_directory.display(),
                resources = setup.connectors_file().resource_count(),
                "downloading connector resources"
            );

            if let Err(err) = setup.download_all(&download_directory).await {
                error!("error in downloading connector resources: {err}");
                return Err(err.into());
            }
        }
        Command::Register { endpoint } => {
            info!(%endpoint, "registering connectors");

            match setup.register_connectors(&endpoint).await {
                Ok(count) => info!(count, "connectors registered"),
                Err(err) => {
                    error!("error in registering connector: {err}");
                    return Err(err.into());
                }
            }
        }
    }

    Ok(())
}
