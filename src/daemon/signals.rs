#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancel` on SIGTERM or SIGINT. Returns early when `cancel` is
/// triggered by someone else.
pub async fn listen_for_signals(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(err) => {
                error!(error = %err, "Failed to register SIGTERM handler");
                cancel.cancel();
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(stream) => stream,
            Err(err) => {
                error!(error = %err, "Failed to register SIGINT handler");
                cancel.cancel();
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM; initiating shutdown");
                cancel.cancel();
            }
            _ = sigint.recv() => {
                info!("Received SIGINT; initiating shutdown");
                cancel.cancel();
            }
            _ = cancel.cancelled() => {
                info!("Shutdown already requested");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    error!(error = %err, "Failed to listen for Ctrl-C");
                } else {
                    info!("Received Ctrl-C; initiating shutdown");
                }
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn test_listen_for_signals_returns_on_cancel() {
        let cancel = CancellationToken::new();
        let waiter = tokio::spawn(listen_for_signals(cancel.clone()));
        cancel.cancel();
        let finished = timeout(Duration::from_secs(1), waiter).await;
        assert!(finished.is_ok());
    }

    #[tokio::test]
    async fn test_listener_keeps_waiting_without_signal() {
        let cancel = CancellationToken::new();
        let waiter = tokio::spawn(listen_for_signals(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        assert!(!cancel.is_cancelled());
        cancel.cancel();
        let _ = waiter.await;
    }
}
