// scoop-core/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("queue declaration error for {queue}: {cause}")]
    QueueDeclaration { queue: String, cause: String },

    #[error("subscribe error for {queue}: {cause}")]
    Subscribe { queue: String, cause: String },

    #[error("publish error to {routing_key}: {cause}")]
    Publish { routing_key: String, cause: String },

    #[error("ack error for delivery {delivery_tag}: {cause}")]
    Ack { delivery_tag: u64, cause: String },

    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}
