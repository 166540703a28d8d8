use anyhow::Result;
use reqwest::blocking::multipart;
use serde_json::{Value, json};
use std::time::Duration;

use crate::config::constants;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API client.
///
/// Covers the handful of methods the relay needs: outbound message, photo
/// and animation sends plus the getUpdates long poll feeding the command
/// handlers. Every call checks the HTTP status and then the Bot API
/// `{"ok": ..., "result": ...}` envelope.
pub struct TelegramBot {
    token: String,
    api_base: String,
    client: reqwest::blocking::Client,
}

impl TelegramBot {
    /// Create a client against the public Bot API server.
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a client against a custom Bot API server (self-hosted
    /// deployments, stub servers in tests).
    pub fn with_api_base(token: String, api_base: impl Into<String>) -> Self {
        Self {
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Send a plain text message to a chat.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the Bot API rejects
    /// the call.
    pub fn send_message(&self, chat_id: &str, text: &str) -> Result<Value> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
            }));

        send_checked(request)
    }

    /// Send a photo with a caption, attached as a multipart upload.
    pub fn send_photo(
        &self,
        chat_id: &str,
        caption: &str,
        photo: &[u8],
        filename: &str,
    ) -> Result<Value> {
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part(
                "photo",
                multipart::Part::bytes(photo.to_vec())
                    .file_name(filename.to_string())
                    .mime_str("image/jpeg")?,
            );

        let request = self
            .client
            .post(self.method_url("sendPhoto"))
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .multipart(form);

        send_checked(request)
    }

    /// Send an animation (GIF preview) with a caption.
    pub fn send_animation(
        &self,
        chat_id: &str,
        caption: &str,
        animation: &[u8],
        filename: &str,
    ) -> Result<Value> {
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part(
                "animation",
                multipart::Part::bytes(animation.to_vec())
                    .file_name(filename.to_string())
                    .mime_str("image/gif")?,
            );

        let request = self
            .client
            .post(self.method_url("sendAnimation"))
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .multipart(form);

        send_checked(request)
    }

    /// Long-poll for updates past `offset`.
    ///
    /// `timeout_secs` is the server-side hold time; the HTTP request
    /// timeout adds the standard margin on top so a held poll is not cut
    /// short locally. Returns the raw update array.
    pub fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Value>> {
        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(
                timeout_secs + constants::HTTP_TIMEOUT_SECS,
            ))
            .json(&json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }));

        let result = send_checked(request)?;
        Ok(result.as_array().cloned().unwrap_or_default())
    }
}

/// A transport error carries the request URL, which embeds the bot token;
/// strip it before the error can reach a log line.
fn send_checked(request: reqwest::blocking::RequestBuilder) -> Result<Value> {
    let response = request.send().map_err(reqwest::Error::without_url)?;
    check_response(response)
}

fn check_response(response: reqwest::blocking::Response) -> Result<Value> {
    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Telegram API request failed: HTTP {}",
            response.status()
        ));
    }

    let body: Value = response.json()?;
    if !body["ok"].as_bool().unwrap_or(false) {
        return Err(anyhow::anyhow!(
            "Telegram API error: {}",
            body["description"].as_str().unwrap_or("unknown error")
        ));
    }

    Ok(body["result"].clone())
}
