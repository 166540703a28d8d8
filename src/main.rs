use anyhow::Result;
use log::info;
use std::{fs, time::Duration};

use frigate_relay::commands::CommandContext;
use frigate_relay::config::Config;
use frigate_relay::events::EventDispatcher;
use frigate_relay::frigate::FrigateApi;
use frigate_relay::mqtt::MqttSubscriber;
use frigate_relay::ping::Pinger;
use frigate_relay::ptz::PtzClient;
use frigate_relay::scheduler::Scheduler;
use frigate_relay::telegram::TelegramBot;

/// Frigate relay - security-camera notifications over Telegram.
///
/// The relay subscribes to Frigate's MQTT topics, formats detection
/// events and activity reviews into chat alerts (with the snapshot or
/// preview attached when Frigate has one), and delivers them to a fixed
/// Telegram chat. The bot also answers `/start`, `/watch <camera_id>`
/// and `/move <preset>`, and POSTs a periodic liveness ping to a
/// monitoring endpoint.
///
/// # Environment Variables
///
/// All required:
/// * `MQTT_BROKER` / `MQTT_PORT` - broker publishing Frigate messages
/// * `MQTT_TOPICS` - comma-separated topic list
/// * `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID` - bot credentials and target chat
/// * `CAMERA_IP` / `CAMERA_USER` / `CAMERA_PASSWORD` - pan-tilt camera
/// * `FRIGATE_API_URL` - Frigate HTTP API base URL
/// * `PING_ENDPOINT` / `PING_INTERVAL` - monitoring endpoint and cadence
///
/// # Usage
///
/// ```bash
/// export MQTT_BROKER="broker.local"
/// export MQTT_PORT="1883"
/// export MQTT_TOPICS="frigate/events,frigate/reviews"
/// export TELEGRAM_TOKEN="123456:ABC..."
/// export TELEGRAM_CHAT_ID="-1001234567890"
/// export CAMERA_IP="192.168.1.40"
/// export CAMERA_USER="admin"
/// export CAMERA_PASSWORD="..."
/// export FRIGATE_API_URL="http://frigate.local:5000/api"
/// export PING_ENDPOINT="https://monitor.example.com"
/// export PING_INTERVAL="300"
/// ./frigate-relay
/// ```
fn main() -> Result<()> {
    // Initialize logger to output to stdout, using RUST_LOG env var or info level by default
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stdout)
        .filter_level(
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|level| level.parse().ok())
                .unwrap_or(log::LevelFilter::Info),
        )
        .init();

    // Load configuration from environment variables
    let config = Config::load()?;

    info!("Frigate relay starting...");
    info!("Using Frigate API URL: {}", config.frigate_api_url);
    info!(
        "MQTT broker {}:{}, {} topic(s): {}",
        config.mqtt_broker,
        config.mqtt_port,
        config.mqtt_topics.len(),
        config.mqtt_topics.join(", ")
    );

    // Initialize services
    let bot = TelegramBot::new(config.telegram_token.clone());
    let api = FrigateApi::new(config.frigate_api_url.clone());
    let ptz = PtzClient::new(
        config.camera_ip.clone(),
        config.camera_user.clone(),
        config.camera_password.clone(),
    );

    // The scheduler thread owns the bot; everything else talks to it
    // through handles.
    let (scheduler, handle) = Scheduler::new(bot);

    let dispatcher = EventDispatcher::new(
        api.clone(),
        handle.clone(),
        config.telegram_chat_id.clone(),
    );

    let subscriber = MqttSubscriber::new(
        config.mqtt_broker.clone(),
        config.mqtt_port,
        config.mqtt_topics.clone(),
        dispatcher,
    );
    subscriber.spawn()?;

    info!("MQTT subscriber thread started");

    let ctx = CommandContext {
        api,
        ptz,
        bridge: handle,
    };
    let pinger = Pinger::new(
        config.ping_endpoint.clone(),
        Duration::from_secs(config.ping_interval),
    );

    // Create .ready file to indicate the application is fully initialized
    fs::write(".ready", "ready")?;
    info!("Application ready - created .ready file for healthcheck");

    info!("Frigate relay initialized successfully. Starting bot polling loop...");
    scheduler.run(ctx, pinger);

    Ok(())
}
