use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use sm_core::models::{ProvisionResponse, SiteRecord};

/// Events flowing into the main loop.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Time to rescan the sites directory.
    Tick,
    Error(String),
    Info(String),
    /// A site was created; its credentials are shown once.
    SiteCreated(Box<ProvisionResponse>),
    /// A requested inventory refresh finished.
    SitesLoaded(Vec<SiteRecord>),
}

/// How often the sites directory is rescanned while the UI is open.
pub const TICK_INTERVAL: Duration = Duration::from_secs(2);

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Read terminal input on a blocking thread and forward key presses.
/// The thread exits once the receiving side is gone.
pub fn spawn_input_task(tx: mpsc::UnboundedSender<AppEvent>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "input_poll_failed");
                    continue;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "input_read_failed"),
            }
        }
    })
}

/// Send a `Tick` every `period`, starting one period from now. Ticks missed
/// while the loop was busy are skipped rather than delivered in a burst.
pub fn spawn_tick_task(
    tx: mpsc::UnboundedSender<AppEvent>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    })
}
