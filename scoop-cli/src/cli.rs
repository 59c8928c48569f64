use clap::{ArgAction, Parser};
use scoop_core::{default_consumer_tag, RelayConfig, Verbosity};
use scoop_rabbitmq::RabbitMqOptions;

#[derive(Parser, Debug)]
#[command(
    name = "scoop",
    version,
    about = "Move a number of messages from one RabbitMQ queue to another"
)]
pub struct Cli {
    /// Username
    #[arg(long, env = "SCOOP_USERNAME", default_value = "guest")]
    pub username: String,

    /// Password
    #[arg(long, env = "SCOOP_PASSWORD", default_value = "guest", hide_env_values = true)]
    pub password: String,

    /// Hostname
    #[arg(long, env = "SCOOP_HOSTNAME", default_value = "localhost")]
    pub hostname: String,

    /// Port
    #[arg(long, env = "SCOOP_PORT", default_value_t = 5672)]
    pub port: u16,

    /// Virtual host
    #[arg(long, env = "SCOOP_VHOST", default_value = "/")]
    pub vhost: String,

    /// The queue name to consume messages from
    #[arg(long, default_value = "")]
    pub from: String,

    /// The queue name to deliver messages to
    #[arg(long, default_value = "")]
    pub to: String,

    /// The exchange name to deliver messages through (empty: default exchange)
    #[arg(long, default_value = "")]
    pub exchange: String,

    /// The number of messages to move between queues
    #[arg(long, default_value_t = 1)]
    pub count: u64,

    /// Verbosity: -v, -vv or -vvv
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Fail if a queue does not exist instead of creating it
    #[arg(long)]
    pub passive: bool,

    /// Wait for publisher confirms on every relayed message
    #[arg(long)]
    pub confirm: bool,

    /// Deliveries the broker may push ahead of acks
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub prefetch: u16,

    /// Print a JSON summary on stdout when done
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            source: self.from.clone(),
            destination: self.to.clone(),
            exchange: self.exchange.clone(),
            count: self.count,
            verbosity: Verbosity::from_level(self.verbose),
            passive: self.passive,
            consumer_tag: default_consumer_tag(),
        }
    }

    pub fn rabbit_options(&self) -> RabbitMqOptions {
        RabbitMqOptions {
            username: self.username.clone(),
            password: self.password.clone(),
            hostname: self.hostname.clone(),
            port: self.port,
            vhost: self.vhost.clone(),
            prefetch: self.prefetch,
            confirms: self.confirm,
        }
    }
}
