// scoop-core/src/broker.rs
use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::{QueueOptions, QueueRef, RelayError};

/// A message handed out by a subscription. The tag is the handle used to
/// acknowledge it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub delivery_tag: u64,
    pub redelivered: bool,
    pub data: Vec<u8>,
}

/// Ends with `None` when the broker closes the subscription.
pub type DeliveryStream = BoxStream<'static, Result<Delivery, RelayError>>;

/// The broker operations the relay depends on.
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Declares `name`, creating it if absent. Declaring an existing queue
    /// with matching options returns its current state.
    async fn declare_queue(
        &self,
        name: &str,
        options: QueueOptions,
    ) -> Result<QueueRef, RelayError>;

    /// Starts a manual-ack subscription on `queue`.
    async fn consume(&self, queue: &str, consumer_tag: &str)
        -> Result<DeliveryStream, RelayError>;

    /// Publishes `body` as `text/plain`. Returns once the channel accepted it.
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), RelayError>;

    /// Cumulative ack up to and including `delivery_tag`.
    async fn ack(&self, delivery_tag: u64) -> Result<(), RelayError>;

    async fn close(&self) -> Result<(), RelayError>;
}
