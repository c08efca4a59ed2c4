//! Per-product polling loop.
//!
//! A `WatchTask` drives one `ProductMonitor` on a fixed interval and sends a
//! notification when the stock changed and something can be bought. After a
//! notification it pauses for a cool-down, which keeps one restock from
//! producing a burst of messages.
//!
//! Cancellation is cooperative: the token is checked before every poll and
//! raced against every await inside the loop. The task never closes its
//! monitor; whoever cancels it is responsible for that.

mod render;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, DEFAULT_COOLDOWN, DEFAULT_POLL_INTERVAL};
use crate::monitor::ProductMonitor;
use crate::notify::Notifier;

pub use render::{render_notification, status_label, Delivery, DisplayInfo};

/// Poll timing of a watch task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Delay between polls while nothing is announced
    pub poll_interval: Duration,
    /// Delay after a notification
    pub cooldown: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl From<&Config> for Schedule {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            cooldown: config.cooldown(),
        }
    }
}

/// Lifecycle of a watch task. `Cancelled` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Running,
    Cancelled,
    /// The loop panicked; other tasks are unaffected
    Failed,
}

/// Handle to a running polling loop.
pub struct WatchTask {
    cancel: CancellationToken,
    state: watch::Receiver<WatchState>,
    handle: Option<JoinHandle<()>>,
}

impl WatchTask {
    /// Starts polling `monitor` on the current Tokio runtime.
    pub fn spawn(
        monitor: Arc<ProductMonitor>,
        notifier: Arc<dyn Notifier>,
        delivery: Delivery,
        schedule: Schedule,
    ) -> Self {
        let cancel = CancellationToken::new();
        let (state_tx, state) = watch::channel(WatchState::Running);

        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let url = monitor.identity().url().to_string();
            let run = run_loop(monitor, notifier, delivery, schedule, token);
            let final_state = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(()) => {
                    info!("Monitor for {} cancelled.", url);
                    WatchState::Cancelled
                }
                Err(panic) => {
                    error!("Error in monitor task for {}: {}", url, panic_message(&*panic));
                    WatchState::Failed
                }
            };
            let _ = state_tx.send(final_state);
        });

        Self {
            cancel,
            state,
            handle: Some(handle),
        }
    }

    pub fn state(&self) -> WatchState {
        *self.state.borrow()
    }

    /// Requests cancellation. The loop exits at its next check.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the loop to exit. Returns immediately if already awaited.
    pub async fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Watch task did not exit cleanly: {}", e);
            }
        }
    }
}

impl Drop for WatchTask {
    fn drop(&mut self) {
        // An entry dropped without unregister must not leave its loop running
        self.cancel.cancel();
    }
}

async fn run_loop(
    monitor: Arc<ProductMonitor>,
    notifier: Arc<dyn Notifier>,
    delivery: Delivery,
    schedule: Schedule,
    cancel: CancellationToken,
) {
    let url = monitor.identity().url().to_string();

    // Sizes change far less often than stock; resolve once up front
    let mut sizes = tokio::select! {
        _ = cancel.cancelled() => return,
        sizes = monitor.get_sku_size_mapping() => sizes,
    };

    loop {
        if cancel.is_cancelled() {
            return;
        }

        let in_stock = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            in_stock = monitor.check_stock() => in_stock,
        };

        let delay = if monitor.has_stock_changed() && in_stock {
            if sizes.is_empty() {
                // Cached once resolved; only a failed lookup is retried here
                sizes = tokio::select! {
                    _ = cancel.cancelled() => return,
                    sizes = monitor.get_sku_size_mapping() => sizes,
                };
            }
            let snapshot = monitor.current_snapshot();
            let notification = render_notification(&delivery, &url, &snapshot, &sizes);

            let delivered = tokio::select! {
                _ = cancel.cancelled() => return,
                result = notifier.notify(&delivery.destination, &notification) => result,
            };
            match delivered {
                Ok(()) => info!(
                    "{} is in stock ({} sizes), notified {}",
                    url,
                    notification.sizes.len(),
                    delivery.destination
                ),
                Err(e) => warn!("Failed to notify {} about {}: {}", delivery.destination, url, e),
            }
            schedule.cooldown
        } else {
            debug!("No qualifying change for {}", url);
            schedule.poll_interval
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_from_config() {
        let config = Config {
            poll_interval_ms: 250,
            cooldown_ms: 5_000,
            ..Default::default()
        };
        let schedule = Schedule::from(&config);
        assert_eq!(schedule.poll_interval, Duration::from_millis(250));
        assert_eq!(schedule.cooldown, Duration::from_secs(5));
        assert_eq!(Schedule::default().cooldown, Duration::from_secs(20));
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*boxed), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*boxed), "bang");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(&*boxed), "unknown panic");
    }
}
