use anyhow::Result;
use log::{error, info};
use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use serde_json::Value;
use std::thread;
use std::time::Duration;

use crate::config::constants;
use crate::events::EventDispatcher;

/// Background-thread MQTT subscriber.
///
/// Connects to the broker, subscribes to the configured topics on every
/// ConnAck (so subscriptions survive reconnects), and routes decoded
/// payloads to the dispatcher by topic name. The receive loop runs
/// forever; per-message failures are logged and dropped, connection
/// errors are retried after a delay.
pub struct MqttSubscriber {
    broker: String,
    port: u16,
    topics: Vec<String>,
    dispatcher: EventDispatcher,
}

impl MqttSubscriber {
    pub fn new(
        broker: String,
        port: u16,
        topics: Vec<String>,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            broker,
            port,
            topics,
            dispatcher,
        }
    }

    /// Start the receive loop on its own thread.
    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("mqtt-subscriber".to_string())
            .spawn(move || self.run())
    }

    fn run(self) {
        let mut options =
            MqttOptions::new(constants::MQTT_CLIENT_ID, &self.broker, self.port);
        options.set_keep_alive(Duration::from_secs(constants::MQTT_KEEPALIVE_SECS));

        let (client, mut connection) = Client::new(options, constants::MQTT_CHANNEL_CAPACITY);

        for notification in connection.iter() {
            match notification {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    info!("Connected to MQTT broker: {:?}", ack.code);
                    for topic in &self.topics {
                        match client.subscribe(topic.as_str(), QoS::AtMostOnce) {
                            Ok(()) => info!("Subscribed to topic: {}", topic),
                            Err(e) => error!("Failed to subscribe to '{}': {}", topic, e),
                        }
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if let Err(e) = self.route_message(&publish.topic, &publish.payload) {
                        error!("Error processing MQTT message: {:#}", e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT connection error: {}", e);
                    thread::sleep(Duration::from_secs(constants::MQTT_RECONNECT_DELAY_SECS));
                }
            }
        }
    }

    fn route_message(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let payload = std::str::from_utf8(payload)?;
        let data: Value = serde_json::from_str(payload)?;

        info!("Message received on topic: {}", topic);

        if topic.ends_with("/events") {
            self.dispatcher.process_event(&data);
        } else if topic.ends_with("/reviews") {
            self.dispatcher.process_review(&data);
        } else {
            info!("Unhandled topic: {}", topic);
        }

        Ok(())
    }
}
