use super::{GesturenavApp, ShutdownReason};
use crate::error::{GesturenavError, Result};
use crate::events::{EventFilter, NavigationEvent};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info};

type ShutdownSender = Arc<Mutex<Option<oneshot::Sender<ShutdownReason>>>>;

impl GesturenavApp {
    /// Run until a signal, a quit request or the coordinator ends, then shut down
    pub async fn run(&mut self) -> Result<i32> {
        info!("Gesture navigation is running");

        let shutdown_receiver = self
            .shutdown_receiver
            .take()
            .ok_or_else(|| GesturenavError::system("Shutdown receiver already taken"))?;

        self.setup_signal_handlers();
        self.setup_shutdown_watchers();

        let shutdown_reason = shutdown_receiver
            .await
            .map_err(|_| GesturenavError::system("Shutdown channel closed unexpectedly"))?;

        info!("Shutdown initiated: {}", shutdown_reason);

        let exit_code = self.shutdown().await?;

        info!("Gesture navigation shutdown complete");
        Ok(exit_code)
    }

    fn setup_signal_handlers(&self) {
        // SIGTERM - Unix only
        #[cfg(unix)]
        {
            let shutdown_sender = Arc::clone(&self.shutdown_sender);
            let token = self.cancellation_token.clone();
            tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate())
                {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };
                tokio::select! {
                    _ = token.cancelled() => {}
                    Some(()) = sigterm.recv() => {
                        info!("Received SIGTERM signal");
                        send_shutdown(&shutdown_sender, ShutdownReason::Signal("SIGTERM".to_string())).await;
                    }
                }
            });
        }

        // SIGINT (Ctrl+C)
        let shutdown_sender = Arc::clone(&self.shutdown_sender);
        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                Ok(()) = signal::ctrl_c() => {
                    info!("Received SIGINT signal (Ctrl+C)");
                    send_shutdown(&shutdown_sender, ShutdownReason::Signal("SIGINT".to_string())).await;
                }
            }
        });
    }

    /// Shut down on a ShutdownRequested event or when the coordinator exits on its own
    fn setup_shutdown_watchers(&self) {
        let mut requests = self.event_bus.subscribe_filtered(
            EventFilter::EventTypes(vec!["shutdown_requested"]),
            "shutdown_watcher",
        );
        let shutdown_sender = Arc::clone(&self.shutdown_sender);
        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                Ok(NavigationEvent::ShutdownRequested { reason, .. }) = requests.recv() => {
                    send_shutdown(&shutdown_sender, ShutdownReason::UserRequest(reason)).await;
                }
            }
        });

        let handle = self.handle.clone();
        let shutdown_sender = Arc::clone(&self.shutdown_sender);
        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = handle.closed() => {
                    send_shutdown(&shutdown_sender, ShutdownReason::CoordinatorExited).await;
                }
            }
        });
    }
}

async fn send_shutdown(shutdown_sender: &ShutdownSender, reason: ShutdownReason) {
    if let Some(sender) = shutdown_sender.lock().await.take() {
        let _ = sender.send(reason);
    }
}
