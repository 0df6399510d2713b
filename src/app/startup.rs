use super::{ComponentState, GesturenavApp};
use crate::coordinator::SourceStatus;
use crate::error::{GesturenavError, Result};
use crate::events::{EventBus, EventFilter, NavigationEvent};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

impl GesturenavApp {
    /// Register all components as stopped
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing gesture navigation components");

        let mut states = self.component_states.lock().await;
        for component in ["coordinator", "camera", "motion", "event_logger"] {
            states.insert(component.to_string(), ComponentState::Stopped);
        }
        if self.keyboard_enabled {
            states.insert("keyboard".to_string(), ComponentState::Stopped);
        }
        drop(states);

        info!(
            "Session configured: {} pages starting at page {}, classifying 1 of every {} frames",
            self.config.navigation.page_count,
            self.config.navigation.initial_page,
            self.config.throttle.frame_interval
        );
        Ok(())
    }

    /// Start the devices, the coordinator task and the event logger
    pub async fn start(&mut self) -> Result<SourceStatus> {
        info!("Starting gesture navigation");

        let mut coordinator = self.coordinator.take().ok_or_else(|| {
            GesturenavError::system("Navigation coordinator already started")
        })?;

        self.event_logger_task = Some(spawn_event_logger(
            Arc::clone(&self.event_bus),
            self.cancellation_token.child_token(),
        ));
        self.set_component_state("event_logger", ComponentState::Running)
            .await;

        self.set_component_state("camera", ComponentState::Starting)
            .await;
        self.set_component_state("motion", ComponentState::Starting)
            .await;

        let status = coordinator.start().await;

        let camera_state = if status.camera_ready {
            ComponentState::Running
        } else {
            ComponentState::Degraded
        };
        let motion_state = if status.motion_ready {
            ComponentState::Running
        } else {
            ComponentState::Degraded
        };
        self.set_component_state("camera", camera_state).await;
        self.set_component_state("motion", motion_state).await;

        if !status.initialized() {
            warn!("Starting without gesture input; manual scrolling only");
        }

        self.set_component_state("coordinator", ComponentState::Starting)
            .await;
        self.coordinator_task = Some(tokio::spawn(coordinator.run()));
        self.set_component_state("coordinator", ComponentState::Running)
            .await;

        if self.keyboard_enabled {
            if let Some(keyboard_handler) = &self.keyboard_handler {
                self.set_component_state("keyboard", ComponentState::Starting)
                    .await;

                keyboard_handler.start().await.map_err(|e| {
                    error!("Failed to start keyboard simulator: {}", e);
                    e
                })?;

                self.set_component_state("keyboard", ComponentState::Running)
                    .await;
            }
        }

        info!("Gesture navigation started");
        Ok(status)
    }
}

/// Log what the coordinator reports until cancelled
fn spawn_event_logger(event_bus: Arc<EventBus>, token: CancellationToken) -> JoinHandle<()> {
    let mut receiver = event_bus.subscribe_filtered(EventFilter::All, "event_logger");

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                event = receiver.recv() => match event {
                    Ok(event) => log_event(&event),
                    Err(_) => break,
                },
            }
        }
        debug!("Event logger stopped");
    })
}

// Page changes, source status and errors are already logged by the bus
fn log_event(event: &NavigationEvent) {
    match event {
        NavigationEvent::ModeChanged { .. } | NavigationEvent::OrientationChanged { .. } => {
            info!("{}", event.description())
        }
        NavigationEvent::GestureRecognized { .. }
        | NavigationEvent::PhaseChanged { .. }
        | NavigationEvent::GateChanged { .. } => debug!("{}", event.description()),
        _ => {}
    }
}
