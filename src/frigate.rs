use anyhow::Result;
use log::debug;
use serde_json::Value;
use std::time::Duration;

use crate::config::constants;

/// Frigate HTTP API client.
///
/// Stateless request methods against a fixed base URL: generic GET/POST
/// passthrough for JSON resources, plus best-effort binary fetches for
/// event snapshots, live camera snapshots and review previews. The binary
/// fetches return `None` instead of an error when the media is missing or
/// the API is unreachable, so callers can fall back to text notifications.
#[derive(Clone)]
pub struct FrigateApi {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl FrigateApi {
    /// Create a client for the API at `base_url`. A trailing slash is
    /// trimmed.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// GET a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-2xx status, or the body is not valid JSON.
    pub fn get(&self, endpoint: &str, params: Option<&[(&str, &str)]>) -> Result<Value> {
        let mut request = self
            .client
            .get(self.endpoint_url(endpoint))
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS));

        if let Some(params) = params {
            request = request.query(params);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Frigate API request failed: HTTP {}",
                response.status()
            ));
        }

        Ok(response.json()?)
    }

    /// POST to the API with form data and/or a JSON body.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`FrigateApi::get`].
    pub fn post(
        &self,
        endpoint: &str,
        form: Option<&[(&str, &str)]>,
        json: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .post(self.endpoint_url(endpoint))
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS));

        if let Some(form) = form {
            request = request.form(form);
        }
        if let Some(json) = json {
            request = request.json(json);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Frigate API request failed: HTTP {}",
                response.status()
            ));
        }

        Ok(response.json()?)
    }

    /// Fetch the snapshot image for an event. Best-effort.
    pub fn get_event_snapshot(&self, event_id: &str) -> Option<Vec<u8>> {
        self.fetch_binary(self.endpoint_url(&format!("events/{}/snapshot.jpg", event_id)))
    }

    /// Fetch the latest frame from a camera. Best-effort.
    pub fn get_camera_snapshot(&self, camera_id: &str) -> Option<Vec<u8>> {
        self.fetch_binary(self.endpoint_url(&format!("{}/latest.jpg", camera_id)))
    }

    /// Fetch the preview animation for a review. Best-effort.
    pub fn get_review_preview(&self, review_id: &str) -> Option<Vec<u8>> {
        self.fetch_binary(self.endpoint_url(&format!("review/{}/preview", review_id)))
    }

    /// Binary fetch that treats every failure as absence: only an HTTP 200
    /// with a readable body yields `Some`.
    fn fetch_binary(&self, url: String) -> Option<Vec<u8>> {
        let response = match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                debug!("Media fetch from '{}' failed: {}", url, e);
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            debug!("Media fetch from '{}' returned HTTP {}", url, response.status());
            return None;
        }

        match response.bytes() {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                debug!("Failed to read media body from '{}': {}", url, e);
                None
            }
        }
    }
}
