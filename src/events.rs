use anyhow::Result;
use chrono::{Local, TimeZone};
use log::{error, info};
use serde_json::Value;
use std::time::Duration;

use crate::config::constants;
use crate::frigate::FrigateApi;
use crate::scheduler::SchedulerHandle;

/// Turns decoded bus messages into chat notifications.
///
/// Both entry points run on the MQTT subscriber thread. Fields are
/// extracted defensively (an absent field is never fatal), media fetches
/// are best-effort, and the actual chat sends cross to the bot scheduler
/// through the bridge. Any failure is logged and swallowed so a bad or
/// unreachable message can never take the subscriber down.
pub struct EventDispatcher {
    api: FrigateApi,
    bridge: SchedulerHandle,
    chat_id: String,
}

impl EventDispatcher {
    pub fn new(api: FrigateApi, bridge: SchedulerHandle, chat_id: String) -> Self {
        Self {
            api,
            bridge,
            chat_id,
        }
    }

    /// Process a detection event message.
    ///
    /// Stationary events are discarded. Otherwise the event snapshot is
    /// fetched best-effort and the notification goes out as a photo when
    /// the snapshot exists, as plain text when it does not.
    pub fn process_event(&self, data: &Value) {
        if let Err(e) = self.try_process_event(data) {
            error!("Error processing Frigate event: {:#}", e);
        }
    }

    fn try_process_event(&self, data: &Value) -> Result<()> {
        let after = &data["after"];
        info!("Processing Frigate event: {}", after);

        if after["stationary"].as_bool().unwrap_or(false) {
            info!("Stationary event, ignoring.");
            return Ok(());
        }

        let Some(event_id) = after["id"].as_str() else {
            return Ok(());
        };

        let camera = after["camera"].as_str().unwrap_or_default();
        let label = after["label"].as_str().unwrap_or_default();
        let details = after["details"]
            .as_str()
            .unwrap_or("Sin detalles adicionales");

        let caption = event_caption(camera, label, event_id, details);
        info!("Sending event notification: {}", caption);

        let snapshot = self.api.get_event_snapshot(event_id);
        let with_snapshot = snapshot.is_some();

        let chat_id = self.chat_id.clone();
        let timeout = Duration::from_secs(constants::BRIDGE_TIMEOUT_SECS);
        let result = match snapshot {
            Some(image) => {
                let filename = format!("event_{}.jpg", event_id);
                self.bridge.call(timeout, move |bot| {
                    bot.send_photo(&chat_id, &caption, &image, &filename)
                })?
            }
            None => self
                .bridge
                .call(timeout, move |bot| bot.send_message(&chat_id, &caption))?,
        };

        info!(
            "Event notification sent ({}): {} -> {}",
            if with_snapshot { "photo" } else { "text" },
            event_id,
            result
        );
        Ok(())
    }

    /// Process a review message summarizing a span of activity.
    pub fn process_review(&self, data: &Value) {
        if let Err(e) = self.try_process_review(data) {
            error!("Error processing Frigate review: {:#}", e);
        }
    }

    fn try_process_review(&self, data: &Value) -> Result<()> {
        let after = &data["after"];
        info!("Processing Frigate review: {}", after);

        let Some(review_id) = after["id"].as_str() else {
            return Ok(());
        };

        let camera = after["camera"].as_str().unwrap_or_default();
        let start = format_start_time(after["start_time"].as_f64());
        let objects = format_objects(&after["data"]["objects"]);

        let caption = review_caption(camera, review_id, &start, &objects);
        info!("Sending review notification: {}", caption);

        let preview = self.api.get_review_preview(review_id);
        let with_preview = preview.is_some();

        let chat_id = self.chat_id.clone();
        let timeout = Duration::from_secs(constants::BRIDGE_TIMEOUT_SECS);
        let result = match preview {
            Some(animation) => {
                let filename = format!("review_{}.gif", review_id);
                self.bridge.call(timeout, move |bot| {
                    bot.send_animation(&chat_id, &caption, &animation, &filename)
                })?
            }
            None => self
                .bridge
                .call(timeout, move |bot| bot.send_message(&chat_id, &caption))?,
        };

        info!(
            "Review notification sent ({}): {} -> {}",
            if with_preview { "animation" } else { "text" },
            review_id,
            result
        );
        Ok(())
    }
}

/// Caption for a detection event notification.
pub fn event_caption(camera: &str, label: &str, event_id: &str, details: &str) -> String {
    format!(
        "Evento detectado:\nCámara: {}\nEtiqueta: {}\nID: {}\nDetalles: {}",
        camera, label, event_id, details
    )
}

/// Caption for a review notification.
pub fn review_caption(camera: &str, review_id: &str, start: &str, objects: &str) -> String {
    format!(
        "Revisión detectada:\nCámara: {}\nID: {}\nInicio: {}\nObjetos detectados: {}",
        camera, review_id, start, objects
    )
}

/// Render an epoch-seconds start time as `DD/MM/YYYY HH:MM:SS` local
/// time, or the placeholder when absent or unrepresentable.
pub fn format_start_time(start_time: Option<f64>) -> String {
    start_time
        .and_then(|ts| Local.timestamp_opt(ts as i64, 0).single())
        .map(|dt| dt.format("%d/%m/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|| "Desconocido".to_string())
}

/// Join detected object labels with ", ", or the placeholder when the
/// list is empty or absent.
pub fn format_objects(objects: &Value) -> String {
    let labels: Vec<&str> = objects
        .as_array()
        .map(|list| list.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    if labels.is_empty() {
        "Ninguno".to_string()
    } else {
        labels.join(", ")
    }
}
