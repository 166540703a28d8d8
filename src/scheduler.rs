use anyhow::Result;
use log::{info, warn};
use serde_json::Value;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::commands::{self, CommandContext};
use crate::config::constants;
use crate::error::RelayError;
use crate::ping::Pinger;
use crate::telegram::TelegramBot;

/// A unit of work to run against the bot on the scheduler thread.
pub type Job = Box<dyn FnOnce(&TelegramBot) -> Result<Value> + Send>;

struct ScheduledCall {
    job: Job,
    reply: mpsc::Sender<Result<Value>>,
}

/// The single thread that owns the Telegram client.
///
/// All chat network operations execute here: the getUpdates polling loop,
/// the command handlers it dispatches, the periodic ping, and any work
/// bridged in from other threads through a [`SchedulerHandle`]. Queued
/// calls and polling interleave cooperatively, so no two chat operations
/// ever run at the same time.
pub struct Scheduler {
    bot: TelegramBot,
    jobs: mpsc::Receiver<ScheduledCall>,
}

/// Sending half of the bridge. Clone freely; handles are cheap.
///
/// Threads outside the scheduler (the MQTT subscriber, command worker
/// threads) use [`SchedulerHandle::call`] to run bot operations on the
/// scheduler and wait for the outcome.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<ScheduledCall>,
}

impl Scheduler {
    /// Create a scheduler owning `bot`, plus a handle for other threads.
    pub fn new(bot: TelegramBot) -> (Self, SchedulerHandle) {
        let (tx, jobs) = mpsc::channel();
        (Self { bot, jobs }, SchedulerHandle { tx })
    }

    /// Run every queued bridged call and signal its completion.
    ///
    /// A caller that has stopped waiting (its bridge timeout expired) is
    /// ignored; the work still ran.
    pub fn run_pending(&self) {
        for call in self.jobs.try_iter() {
            let result = (call.job)(&self.bot);
            let _ = call.reply.send(result);
        }
    }

    /// The cooperative loop: drain bridged calls, tick the pinger, poll
    /// for updates and dispatch commands. Never returns; per-iteration
    /// failures are logged and the loop continues.
    pub fn run(self, ctx: CommandContext, mut pinger: Pinger) {
        let mut offset: i64 = 0;

        info!("Bot polling loop started");

        loop {
            self.run_pending();
            pinger.tick();

            match self.bot.get_updates(offset, constants::POLL_TIMEOUT_SECS) {
                Ok(updates) => {
                    for update in updates {
                        if let Some(update_id) = update["update_id"].as_i64() {
                            offset = offset.max(update_id + 1);
                        }
                        commands::handle_update(&self.bot, &ctx, &update);
                    }
                }
                Err(e) => {
                    warn!("Failed to poll for updates: {:#}", e);
                    thread::sleep(Duration::from_secs(constants::POLL_RETRY_DELAY_SECS));
                }
            }
        }
    }
}

impl SchedulerHandle {
    /// Submit `job` to the scheduler and wait for its result.
    ///
    /// Blocks the calling thread until the scheduler has run the job, up
    /// to `timeout`. On timeout the job is not cancelled: it still runs
    /// whenever the scheduler reaches it, and its result is discarded.
    ///
    /// # Errors
    ///
    /// [`RelayError::SchedulerUnavailable`] if the scheduler has shut
    /// down, [`RelayError::BridgeTimeout`] if no result arrived in time,
    /// otherwise whatever error the job itself produced.
    pub fn call<F>(&self, timeout: Duration, job: F) -> Result<Value>
    where
        F: FnOnce(&TelegramBot) -> Result<Value> + Send + 'static,
    {
        let (reply_tx, reply_rx) = mpsc::channel();

        self.tx
            .send(ScheduledCall {
                job: Box::new(job),
                reply: reply_tx,
            })
            .map_err(|_| RelayError::SchedulerUnavailable)?;

        match reply_rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(RelayError::BridgeTimeout {
                timeout_seconds: timeout.as_secs(),
            }
            .into()),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(RelayError::SchedulerUnavailable.into())
            }
        }
    }
}
