use std::fmt::Display;
use std::str::FromStr;

use crate::error::RelayError;

/// Configuration for the relay loaded from environment variables.
///
/// Every variable is required; startup aborts if any is missing or cannot
/// be parsed. All values are loaded from environment variables to support
/// containerized deployments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hostname of the MQTT broker publishing Frigate messages.
    /// Environment variable: `MQTT_BROKER`
    pub mqtt_broker: String,

    /// Port of the MQTT broker.
    /// Environment variable: `MQTT_PORT`
    pub mqtt_port: u16,

    /// Topics to subscribe to, comma-separated. Topics ending in `/events`
    /// and `/reviews` are routed to the matching dispatcher entry point;
    /// anything else is logged and ignored.
    /// Environment variable: `MQTT_TOPICS`
    pub mqtt_topics: Vec<String>,

    /// Telegram bot token used for all Bot API calls.
    /// Environment variable: `TELEGRAM_TOKEN`
    pub telegram_token: String,

    /// The chat every notification is delivered to.
    /// Environment variable: `TELEGRAM_CHAT_ID`
    pub telegram_chat_id: String,

    /// Address of the pan-tilt camera, host or host:port.
    /// Environment variable: `CAMERA_IP`
    pub camera_ip: String,

    /// Username for the pan-tilt camera.
    /// Environment variable: `CAMERA_USER`
    pub camera_user: String,

    /// Password for the pan-tilt camera.
    /// Environment variable: `CAMERA_PASSWORD`
    pub camera_password: String,

    /// Base URL of the Frigate HTTP API. A trailing slash is trimmed.
    /// Environment variable: `FRIGATE_API_URL`
    pub frigate_api_url: String,

    /// Base URL of the monitoring endpoint; pings are POSTed to
    /// `{PING_ENDPOINT}/ping`.
    /// Environment variable: `PING_ENDPOINT`
    pub ping_endpoint: String,

    /// Seconds between liveness pings.
    /// Environment variable: `PING_INTERVAL`
    pub ping_interval: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingEnvVar`] naming the first absent
    /// variable, or [`RelayError::InvalidEnvVar`] when `MQTT_PORT` or
    /// `PING_INTERVAL` fail to parse.
    pub fn load() -> Result<Self, RelayError> {
        let mqtt_broker = require_env("MQTT_BROKER")?;
        let mqtt_port = parse_env::<u16>("MQTT_PORT")?;

        let mqtt_topics = require_env("MQTT_TOPICS")?
            .split(',')
            .map(|topic| topic.trim().to_string())
            .filter(|topic| !topic.is_empty())
            .collect();

        let telegram_token = require_env("TELEGRAM_TOKEN")?;
        let telegram_chat_id = require_env("TELEGRAM_CHAT_ID")?;

        let camera_ip = require_env("CAMERA_IP")?;
        let camera_user = require_env("CAMERA_USER")?;
        let camera_password = require_env("CAMERA_PASSWORD")?;

        let frigate_api_url = require_env("FRIGATE_API_URL")?
            .trim_end_matches('/')
            .to_string();

        let ping_endpoint = require_env("PING_ENDPOINT")?;
        let ping_interval = parse_env::<u64>("PING_INTERVAL")?;

        Ok(Config {
            mqtt_broker,
            mqtt_port,
            mqtt_topics,
            telegram_token,
            telegram_chat_id,
            camera_ip,
            camera_user,
            camera_password,
            frigate_api_url,
            ping_endpoint,
            ping_interval,
        })
    }
}

fn require_env(var_name: &str) -> Result<String, RelayError> {
    std::env::var(var_name).map_err(|_| RelayError::MissingEnvVar {
        var_name: var_name.to_string(),
    })
}

fn parse_env<T>(var_name: &str) -> Result<T, RelayError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = require_env(var_name)?;
    value.parse().map_err(|e: T::Err| RelayError::InvalidEnvVar {
        var_name: var_name.to_string(),
        value: value.clone(),
        reason: e.to_string(),
    })
}

/// Application constants used throughout the system.
pub mod constants {
    /// Seconds a bridged call waits for its result before giving up.
    pub const BRIDGE_TIMEOUT_SECS: u64 = 10;

    /// Per-request timeout for outbound HTTP calls, in seconds.
    pub const HTTP_TIMEOUT_SECS: u64 = 10;

    /// Long-poll window for getUpdates, in seconds. Kept short so bridged
    /// calls queued behind a poll are picked up promptly.
    pub const POLL_TIMEOUT_SECS: u64 = 1;

    /// Delay before retrying after a failed getUpdates poll, in seconds.
    pub const POLL_RETRY_DELAY_SECS: u64 = 5;

    /// MQTT keep-alive interval, in seconds.
    pub const MQTT_KEEPALIVE_SECS: u64 = 60;

    /// Client id presented to the MQTT broker.
    pub const MQTT_CLIENT_ID: &str = "frigate-relay";

    /// Capacity of the MQTT request channel.
    pub const MQTT_CHANNEL_CAPACITY: usize = 10;

    /// Delay before the next connection attempt after an MQTT error,
    /// in seconds.
    pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;
}
