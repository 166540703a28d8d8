use anyhow::Result;
use log::{debug, error};
use serde_json::Value;
use std::thread;
use std::time::Duration;

use crate::config::constants;
use crate::frigate::FrigateApi;
use crate::ptz::PtzClient;
use crate::scheduler::SchedulerHandle;
use crate::telegram::TelegramBot;

/// Dependencies the command handlers work against.
pub struct CommandContext {
    pub api: FrigateApi,
    pub ptz: PtzClient,
    pub bridge: SchedulerHandle,
}

/// Dispatch one polled update to its command handler.
///
/// Runs on the scheduler thread. Updates without a text message are
/// ignored, as is non-command text. A handler error is logged here and
/// never reaches the polling loop.
pub fn handle_update(bot: &TelegramBot, ctx: &CommandContext, update: &Value) {
    let message = &update["message"];
    let Some(text) = message["text"].as_str() else {
        return;
    };
    let Some(chat_id) = message["chat"]["id"].as_i64() else {
        return;
    };
    let chat_id = chat_id.to_string();

    let Some((command, args)) = parse_command(text) else {
        return;
    };

    let outcome = match command {
        "start" => start(bot, &chat_id),
        "move" => move_camera(bot, ctx, &chat_id, &args),
        "watch" => watch_camera(bot, ctx, &chat_id, &args),
        _ => {
            debug!("Unhandled command: /{}", command);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        error!("Error handling /{} command: {:#}", command, e);
    }
}

/// Split a message text into a command name and its arguments.
///
/// Returns `None` for non-command text. A `@botname` suffix on the
/// command is stripped, as sent by clients in group chats.
pub fn parse_command(text: &str) -> Option<(&str, Vec<&str>)> {
    let mut words = text.split_whitespace();
    let command = words.next()?.strip_prefix('/')?;
    let command = command.split('@').next().unwrap_or(command);
    if command.is_empty() {
        return None;
    }
    Some((command, words.collect()))
}

fn start(bot: &TelegramBot, chat_id: &str) -> Result<()> {
    bot.send_message(
        chat_id,
        "nubi.casa - Bot de notificaciones\n\
         Usa /watch <camera_id> para ver una cámara o /move <preset> para mover la cámara.",
    )?;
    Ok(())
}

fn move_camera(
    bot: &TelegramBot,
    ctx: &CommandContext,
    chat_id: &str,
    args: &[&str],
) -> Result<()> {
    let Some(preset) = args.first() else {
        bot.send_message(chat_id, "Uso correcto: /move <preset>")?;
        return Ok(());
    };

    // The preset move blocks until the camera has repositioned; run it on
    // a worker thread and route the reply back through the bridge.
    let ptz = ctx.ptz.clone();
    let bridge = ctx.bridge.clone();
    let preset = preset.to_string();
    let chat_id = chat_id.to_string();

    thread::spawn(move || {
        let reply = match ptz.move_to_preset(&preset) {
            Ok(()) => format!("Moviendo cámara al preset {}.", preset),
            Err(e) => format!("Error al mover la cámara: {}", e),
        };

        let sent = bridge.call(
            Duration::from_secs(constants::BRIDGE_TIMEOUT_SECS),
            move |bot| bot.send_message(&chat_id, &reply),
        );
        if let Err(e) = sent {
            error!("Failed to send /move reply: {:#}", e);
        }
    });

    Ok(())
}

fn watch_camera(bot: &TelegramBot, ctx: &CommandContext, chat_id: &str, args: &[&str]) -> Result<()> {
    let Some(camera_id) = args.first() else {
        bot.send_message(chat_id, "Uso correcto: /watch <camera_id>")?;
        return Ok(());
    };

    let outcome = match ctx.api.get_camera_snapshot(camera_id) {
        Some(snapshot) => bot.send_photo(
            chat_id,
            &format!("Snapshot de la cámara *{}*.", camera_id),
            &snapshot,
            &format!("{}_latest.jpg", camera_id),
        ),
        None => bot.send_message(
            chat_id,
            &format!("No se pudo obtener snapshot de la cámara {}.", camera_id),
        ),
    };

    if let Err(e) = outcome {
        bot.send_message(chat_id, &format!("Error al obtener camara: {}", e))?;
    }

    Ok(())
}
