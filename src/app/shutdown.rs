use super::{ComponentState, GesturenavApp};
use crate::error::{GesturenavError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

const COORDINATOR_STOP_TIMEOUT: Duration = Duration::from_secs(5);
const KEYBOARD_STOP_TIMEOUT: Duration = Duration::from_secs(2);
const LOGGER_STOP_TIMEOUT: Duration = Duration::from_secs(1);

impl GesturenavApp {
    /// Stop components in reverse start order. Returns the process exit code.
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");

        let mut exit_code = 0;

        if self.keyboard_enabled {
            if let Err(e) = self.stop_keyboard().await {
                error!("Error stopping keyboard: {}", e);
                exit_code = 1;
            }
        }

        if let Err(e) = self.stop_coordinator().await {
            error!("Error stopping coordinator: {}", e);
            exit_code = 1;
        }

        // Watchers and the event logger end with the application token
        self.cancellation_token.cancel();
        if let Some(task) = self.event_logger_task.take() {
            let stopped = self
                .stop_component("event_logger", LOGGER_STOP_TIMEOUT, async {
                    task.await
                        .map_err(|e| GesturenavError::system(format!("Event logger panicked: {}", e)))
                })
                .await;
            if let Err(e) = stopped {
                warn!("Event logger did not stop cleanly: {}", e);
            }
        }

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }

    async fn stop_keyboard(&mut self) -> Result<()> {
        let Some(keyboard_handler) = self.keyboard_handler.take() else {
            self.set_component_state("keyboard", ComponentState::Stopped)
                .await;
            return Ok(());
        };

        self.stop_component("keyboard", KEYBOARD_STOP_TIMEOUT, async move {
            keyboard_handler.stop().await
        })
        .await
    }

    async fn stop_coordinator(&mut self) -> Result<()> {
        let Some(task) = self.coordinator_task.take() else {
            self.set_component_state("coordinator", ComponentState::Stopped)
                .await;
            return Ok(());
        };

        // Already gone if it exited on its own
        let _ = self.handle.shutdown().await;

        let stats = self
            .stop_component("coordinator", COORDINATOR_STOP_TIMEOUT, async move {
                let stats = task
                    .await
                    .map_err(|e| GesturenavError::system(format!("Coordinator task panicked: {}", e)))??;
                Ok(stats)
            })
            .await?;

        for component in ["camera", "motion"] {
            self.set_component_state(component, ComponentState::Stopped)
                .await;
        }

        info!(
            "Session totals: {} frames received, {} dropped, {} classified, {} page changes",
            stats.frames_received, stats.frames_dropped, stats.frames_classified, stats.page_changes
        );
        self.final_stats = Some(stats);
        Ok(())
    }

    /// Await a component's stop future with a deadline, tracking its state
    async fn stop_component<T, F>(&self, component: &str, limit: Duration, stop: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        info!("Stopping {} component", component);
        self.set_component_state(component, ComponentState::Stopping)
            .await;

        match timeout(limit, stop).await {
            Ok(Ok(value)) => {
                self.set_component_state(component, ComponentState::Stopped)
                    .await;
                info!("{} component stopped", component);
                Ok(value)
            }
            Ok(Err(e)) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("Error stopping {} component: {}", component, e);
                Err(e)
            }
            Err(_) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("{} component stop timeout", component);
                Err(GesturenavError::system(format!(
                    "{} component stop timeout",
                    component
                )))
            }
        }
    }
}
