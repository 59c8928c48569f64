// scoop-core/src/queue.rs
use serde::Serialize;
use tracing::info;

use crate::{BrokerChannel, QueueOptions, RelayConfig, RelayError, Verbosity};

/// A declared queue as the broker reported it at declare time. The pending
/// count is informational and goes stale as soon as the relay starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueRef {
    pub name: String,
    pub options: QueueOptions,
    pub message_count: u32,
    pub consumer_count: u32,
}

/// Makes sure the source and destination queues exist before relaying.
pub struct QueueBinder<'a, C: BrokerChannel + ?Sized> {
    channel: &'a C,
    options: QueueOptions,
    verbosity: Verbosity,
}

impl<'a, C: BrokerChannel + ?Sized> QueueBinder<'a, C> {
    pub fn new(channel: &'a C, config: &RelayConfig) -> Self {
        Self {
            channel,
            options: config.queue_options(),
            verbosity: config.verbosity,
        }
    }

    pub async fn bind(&self, name: &str) -> Result<QueueRef, RelayError> {
        if name.is_empty() {
            return Err(RelayError::QueueDeclaration {
                queue: name.to_string(),
                cause: "queue name must not be empty".into(),
            });
        }

        // The broker does not tell us whether the queue was just created or
        // already existed; both come back the same.
        let queue = self.channel.declare_queue(name, self.options).await?;

        if self.verbosity >= Verbosity::VeryVerbose {
            info!(
                "There are {} messages in queue {}",
                queue.message_count, queue.name
            );
        }
        Ok(queue)
    }

    /// Declares source then destination.
    pub async fn bind_pair(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<(QueueRef, QueueRef), RelayError> {
        let from = self.bind(source).await?;
        let to = self.bind(destination).await?;
        Ok((from, to))
    }
}
