mod options;
mod rabbit_channel;

pub use options::RabbitMqOptions;
pub use rabbit_channel::RabbitChannel;
