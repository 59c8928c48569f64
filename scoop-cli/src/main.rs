mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use scoop_core::{QueueBinder, Relay, RelayConfig, RelaySummary};
use scoop_rabbitmq::{RabbitChannel, RabbitMqOptions};
use tracing::{error, info};

use crate::cli::Cli;
use crate::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let config = cli.relay_config();
    if let Some(mode) = config.verbosity.mode_line() {
        info!("{mode}");
    }

    match run(&config, cli.rabbit_options()).await {
        Ok(summary) => {
            if cli.json {
                match serde_json::to_string(&summary) {
                    Ok(line) => println!("{line}"),
                    Err(e) => error!("failed to encode summary: {e}"),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &RelayConfig, opts: RabbitMqOptions) -> anyhow::Result<RelaySummary> {
    config.validate().context("Invalid arguments")?;

    let channel = RabbitChannel::connect(opts)
        .await
        .context("Failed to connect to RabbitMQ")?;

    let (from, to) = QueueBinder::new(&channel, config)
        .bind_pair(&config.source, &config.destination)
        .await
        .context("Failed to declare a queue")?;

    // On error the process exits with the channel still open; the broker
    // requeues whatever was delivered but not acked.
    let mut relay = Relay::new(&channel, config);
    let summary = relay
        .run(&from, &to)
        .await
        .context("Failed to relay messages")?;

    relay.shutdown().await.context("Failed to close the connection")?;

    info!(
        "Relayed {}/{} messages from {} to {}",
        summary.relayed, summary.requested, summary.source, summary.destination
    );
    Ok(summary)
}
