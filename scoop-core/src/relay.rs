// scoop-core/src/relay.rs
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, info};

use crate::{BrokerChannel, Delivery, QueueRef, RelayConfig, RelayError, Verbosity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Running,
    DrainingComplete,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    CountReached,
    SubscriptionClosed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelaySummary {
    pub source: String,
    pub destination: String,
    pub exchange: String,
    pub requested: u64,
    pub relayed: u64,
    pub reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Moves up to `config.count` messages from one queue to another, one at a
/// time. A source message is acked only after its copy was published; a
/// failed publish stops the relay with the message still unacked.
pub struct Relay<'a, C: BrokerChannel + ?Sized> {
    channel: &'a C,
    config: &'a RelayConfig,
    state: RelayState,
    relayed: u64,
}

impl<'a, C: BrokerChannel + ?Sized> Relay<'a, C> {
    pub fn new(channel: &'a C, config: &'a RelayConfig) -> Self {
        Self {
            channel,
            config,
            state: RelayState::Idle,
            relayed: 0,
        }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn relayed(&self) -> u64 {
        self.relayed
    }

    pub async fn run(
        &mut self,
        source: &QueueRef,
        destination: &QueueRef,
    ) -> Result<RelaySummary, RelayError> {
        let started_at = Utc::now();

        if self.config.verbosity >= Verbosity::Verbose {
            info!(
                "Moving {} messages from queue {} to {}",
                self.config.count, source.name, destination.name
            );
        }

        let reason = self.drive(source, destination).await?;
        self.state = RelayState::DrainingComplete;

        Ok(RelaySummary {
            source: source.name.clone(),
            destination: destination.name.clone(),
            exchange: self.config.exchange.clone(),
            requested: self.config.count,
            relayed: self.relayed,
            reason,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Releases the channel and connection.
    pub async fn shutdown(&mut self) -> Result<(), RelayError> {
        self.channel.close().await?;
        self.state = RelayState::Terminated;
        Ok(())
    }

    async fn drive(
        &mut self,
        source: &QueueRef,
        destination: &QueueRef,
    ) -> Result<StopReason, RelayError> {
        let count = self.config.count;

        // Nothing to do: don't subscribe, or the broker would start pushing
        // messages we never ack.
        if self.relayed >= count {
            self.log_complete();
            return Ok(StopReason::CountReached);
        }

        let mut deliveries = self
            .channel
            .consume(&source.name, &self.config.consumer_tag)
            .await?;
        self.state = RelayState::Running;

        info!("Running scoop consumer... (press Ctrl-C to cancel)");

        // The budget is checked before waiting for the next delivery, so a
        // message beyond `count` is never taken off the stream.
        while self.relayed < count {
            let delivery = match deliveries.next().await {
                Some(delivery) => delivery?,
                None => {
                    debug!(relayed = self.relayed, "subscription closed by broker");
                    return Ok(StopReason::SubscriptionClosed);
                }
            };
            self.forward(delivery, destination).await?;
        }

        self.log_complete();
        Ok(StopReason::CountReached)
    }

    async fn forward(
        &mut self,
        delivery: Delivery,
        destination: &QueueRef,
    ) -> Result<(), RelayError> {
        self.channel
            .publish(&self.config.exchange, &destination.name, &delivery.data)
            .await?;

        self.channel.ack(delivery.delivery_tag).await?;
        self.relayed += 1;

        if self.config.verbosity >= Verbosity::ExtremelyVerbose {
            if delivery.redelivered {
                info!(
                    "Successfully delivered redelivered message ({}/{})",
                    self.relayed, self.config.count
                );
            } else {
                info!(
                    "Successfully delivered message ({}/{})",
                    self.relayed, self.config.count
                );
            }
        }
        Ok(())
    }

    fn log_complete(&self) {
        if self.config.verbosity >= Verbosity::ExtremelyVerbose {
            info!("Complete");
        }
    }
}
