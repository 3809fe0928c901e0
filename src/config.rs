//! Configuration for a broker control plane node.
//!
//! Construction mirrors the rest of the crate: explicit values for tests
//! and embedding, `from_env` for deployments.
//!
//! ```rust,no_run
//! use brokerage::config::BrokerConfig;
//!
//! let config = BrokerConfig::from_env().expect("invalid broker configuration");
//! println!("broker {} listening on {}", config.broker_id, config.listener_name);
//! ```
//!
//! # Environment Variables
//!
//! - `BROKER_ID`: this node's broker id (default: `0`)
//! - `LISTENER_NAME`: listener used for this node's own endpoints
//!   (default: `PLAINTEXT`)
//! - `CLUSTER_ID`: cluster identifier reported in cluster views
//!   (default: `brokerage-cluster`)
//! - `EVENT_QUEUE_POLL_TIMEOUT_MS`: controller event queue poll timeout
//!   (default: `300000`)
//! - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)

use std::time::Duration;

use crate::constants::DEFAULT_EVENT_QUEUE_POLL_TIMEOUT_MS;
use crate::error::{Error, Result};
use crate::telemetry::LogFormat;
use crate::types::{BrokerId, ListenerName};

/// Configuration for a broker control plane node.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// This node's broker id.
    pub broker_id: BrokerId,

    /// The listener this node uses when resolving its own endpoints.
    pub listener_name: ListenerName,

    /// Cluster identifier reported in cluster views.
    pub cluster_id: String,

    /// How long the controller event thread waits before resetting the
    /// queue-time tracker during idle periods.
    pub event_queue_poll_timeout: Duration,

    /// Log output format passed to [`init_logging`].
    ///
    /// [`init_logging`]: crate::telemetry::init_logging
    pub log_format: LogFormat,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            broker_id: BrokerId::new(0),
            listener_name: ListenerName::new("PLAINTEXT"),
            cluster_id: "brokerage-cluster".to_string(),
            event_queue_poll_timeout: Duration::from_millis(DEFAULT_EVENT_QUEUE_POLL_TIMEOUT_MS),
            log_format: LogFormat::Pretty,
        }
    }
}

impl BrokerConfig {
    /// Build a configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let broker_id: i32 = std::env::var("BROKER_ID")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|e| Error::Config(format!("Invalid BROKER_ID: {}", e)))?;

        if broker_id < 0 {
            return Err(Error::Config("BROKER_ID must be non-negative".to_string()));
        }

        let listener_name = std::env::var("LISTENER_NAME")
            .map(ListenerName::new)
            .unwrap_or(defaults.listener_name);

        let cluster_id = std::env::var("CLUSTER_ID").unwrap_or(defaults.cluster_id);

        let poll_timeout_ms: u64 = std::env::var("EVENT_QUEUE_POLL_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_EVENT_QUEUE_POLL_TIMEOUT_MS.to_string())
            .parse()
            .map_err(|e| Error::Config(format!("Invalid EVENT_QUEUE_POLL_TIMEOUT_MS: {}", e)))?;

        if poll_timeout_ms == 0 {
            return Err(Error::Config(
                "EVENT_QUEUE_POLL_TIMEOUT_MS must be positive".to_string(),
            ));
        }

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.log_format,
        };

        Ok(Self {
            broker_id: BrokerId::new(broker_id),
            listener_name,
            cluster_id,
            event_queue_poll_timeout: Duration::from_millis(poll_timeout_ms),
            log_format,
        })
    }
}
