use anyhow::Result;
use log::{error, info};
use serde_json::{Value, json};
use std::time::{Duration, Instant};

use crate::config::constants;

/// Periodic liveness ping to the monitoring endpoint.
///
/// Deadline-based so it can share the scheduler loop: `tick` does nothing
/// until the interval has elapsed, then POSTs the ping and arms the next
/// deadline. The first ping fires on the first tick after startup. A
/// failed ping is logged and never stops the loop.
pub struct Pinger {
    endpoint: String,
    interval: Duration,
    next_ping: Instant,
    client: reqwest::blocking::Client,
}

impl Pinger {
    pub fn new(endpoint: impl Into<String>, interval: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            interval,
            next_ping: Instant::now(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Send the ping if it is due, otherwise return immediately.
    pub fn tick(&mut self) {
        if Instant::now() < self.next_ping {
            return;
        }

        match self.send_ping() {
            Ok(reply) => info!(
                "Ping sent at {}, response: {}",
                chrono::Utc::now().to_rfc3339(),
                reply
            ),
            Err(e) => error!("Failed to send ping: {:#}", e),
        }

        self.next_ping = Instant::now() + self.interval;
    }

    fn send_ping(&self) -> Result<Value> {
        let url = format!("{}/ping", self.endpoint);
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .json(&json!({ "cameras": {} }))
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Ping request failed: HTTP {}",
                response.status()
            ));
        }

        Ok(response.json()?)
    }
}
