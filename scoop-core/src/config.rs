// scoop-core/src/config.rs
use serde::Serialize;
use uuid::Uuid;

use crate::RelayError;

/// How much informational output the relay produces. Each level implies the
/// ones below it, so checks are plain comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verbosity {
    #[default]
    Quiet,
    Verbose,
    VeryVerbose,
    ExtremelyVerbose,
}

impl Verbosity {
    /// Ordinals above 3 clamp to [`Verbosity::ExtremelyVerbose`].
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::Quiet,
            1 => Verbosity::Verbose,
            2 => Verbosity::VeryVerbose,
            _ => Verbosity::ExtremelyVerbose,
        }
    }

    pub fn mode_line(self) -> Option<&'static str> {
        match self {
            Verbosity::Quiet => None,
            Verbosity::Verbose => Some("Verbose mode enabled"),
            Verbosity::VeryVerbose => Some("Very verbose mode enabled"),
            Verbosity::ExtremelyVerbose => Some("Extremely verbose mode enabled"),
        }
    }
}

/// Flags a queue is declared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub struct QueueOptions {
    pub durable: bool,
    pub exclusive: bool,
    pub auto_delete: bool,
    /// Only check that the queue exists, never create it.
    pub passive: bool,
}

impl QueueOptions {
    /// Non-durable, non-exclusive, kept when unused.
    pub fn relay(passive: bool) -> Self {
        Self {
            durable: false,
            exclusive: false,
            auto_delete: false,
            passive,
        }
    }
}

/// Immutable relay settings, built once at startup.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub source: String,
    pub destination: String,
    /// Empty means the default exchange.
    pub exchange: String,
    pub count: u64,
    pub verbosity: Verbosity,
    pub passive: bool,
    pub consumer_tag: String,
}

impl RelayConfig {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            exchange: String::new(),
            count: 1,
            verbosity: Verbosity::Quiet,
            passive: false,
            consumer_tag: default_consumer_tag(),
        }
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = exchange.into();
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }

    /// Rejects missing queue names before anything touches the broker.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.source.trim().is_empty() {
            return Err(RelayError::Configuration(
                "the from argument must be defined".into(),
            ));
        }
        if self.destination.trim().is_empty() {
            return Err(RelayError::Configuration(
                "the to argument must be defined".into(),
            ));
        }
        Ok(())
    }

    pub fn queue_options(&self) -> QueueOptions {
        QueueOptions::relay(self.passive)
    }
}

pub fn default_consumer_tag() -> String {
    format!("scoop-{}", Uuid::new_v4())
}
