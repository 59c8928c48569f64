#[derive(Clone, Debug)]
pub struct RabbitMqOptions {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub vhost: String,
    /// Deliveries the broker may push before the oldest is acked.
    pub prefetch: u16,
    /// If true, enables publisher confirms and waits for the broker's ACK/NACK.
    pub confirms: bool,
}

impl Default for RabbitMqOptions {
    fn default() -> Self {
        Self {
            username: "guest".into(),
            password: "guest".into(),
            hostname: "localhost".into(),
            port: 5672,
            vhost: "/".into(),
            prefetch: 1,
            confirms: false,
        }
    }
}

impl RabbitMqOptions {
    pub fn uri(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/{}",
            self.username,
            self.password,
            self.hostname,
            self.port,
            vhost_segment(&self.vhost)
        )
    }

    /// Same as [`uri`](Self::uri) with the password masked, for logging.
    pub fn redacted_uri(&self) -> String {
        format!(
            "amqp://{}:***@{}:{}/{}",
            self.username,
            self.hostname,
            self.port,
            vhost_segment(&self.vhost)
        )
    }
}

/// The default vhost `/` has to travel as `%2f` in the URI path.
fn vhost_segment(vhost: &str) -> String {
    vhost.replace('/', "%2f")
}
