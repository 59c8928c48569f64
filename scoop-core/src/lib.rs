pub mod broker;
pub mod config;
pub mod error;
pub mod queue;
pub mod relay;

pub use broker::{BrokerChannel, Delivery, DeliveryStream};
pub use config::{default_consumer_tag, QueueOptions, RelayConfig, Verbosity};
pub use error::RelayError;
pub use queue::{QueueBinder, QueueRef};
pub use relay::{Relay, RelayState, RelaySummary, StopReason};
