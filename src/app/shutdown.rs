//! Graceful shutdown handling.

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::handler::CommandHandler;

/// Cancels `cancel` when the process receives Ctrl-C.
pub fn cancel_on_ctrl_c(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received Ctrl-C, shutting down"),
                    Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
                }
                cancel.cancel();
            }
        }
    })
}

/// Stops every monitor and the signal listener.
///
/// The state file is left untouched so the same monitors are restored on
/// the next start.
///
/// # Returns
///
/// The number of monitors stopped.
pub async fn shutdown_gracefully(
    handler: CommandHandler,
    cancel: CancellationToken,
    signal_task: Option<JoinHandle<()>>,
) -> usize {
    cancel.cancel();
    if let Some(signal_task) = signal_task {
        let _ = signal_task.await;
    }
    handler.shutdown().await
}
