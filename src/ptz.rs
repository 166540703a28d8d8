use anyhow::Result;
use std::time::Duration;

use crate::config::constants;

/// Pan-tilt camera control client.
///
/// Drives the camera's CGI interface at a fixed address with the
/// configured credentials. A preset move blocks for as long as the camera
/// takes to reposition, so callers on the scheduler thread must offload
/// the call to a worker.
#[derive(Clone)]
pub struct PtzClient {
    ip: String,
    user: String,
    password: String,
    client: reqwest::blocking::Client,
}

impl PtzClient {
    /// Create a client for the camera at `ip` (host or host:port).
    pub fn new(ip: String, user: String, password: String) -> Self {
        Self {
            ip,
            user,
            password,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Move the camera to a saved preset position.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the camera answers with a
    /// non-2xx status.
    pub fn move_to_preset(&self, preset: &str) -> Result<()> {
        let url = format!("http://{}/cgi-bin/CGIProxy.fcgi", self.ip);
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .query(&[
                ("cmd", "ptzGotoPresetPoint"),
                ("name", preset),
                ("usr", self.user.as_str()),
                ("pwd", self.password.as_str()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Preset move failed: HTTP {}",
                response.status()
            ));
        }

        Ok(())
    }
}
