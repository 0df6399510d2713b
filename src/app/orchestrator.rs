use super::keyboard_input::{KeyboardInputHandler, SimulatorControls};
use super::types::{ComponentState, ShutdownReason};
use crate::classifier::ScriptedClassifier;
use crate::config::GesturenavConfig;
use crate::coordinator::{
    CoordinatorHandle, CoordinatorStats, NavigationCoordinator, NavigationCoordinatorBuilder,
};
use crate::devices::{SimulatedMotionSource, SimulatedScrollView, SyntheticCamera};
use crate::error::Result;
use crate::events::EventBus;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wires a navigation session to simulated devices and owns its lifecycle
pub struct GesturenavApp {
    pub(super) config: GesturenavConfig,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) handle: CoordinatorHandle,

    // Devices shared with the coordinator
    pub(super) camera: SyntheticCamera,
    pub(super) motion_source: SimulatedMotionSource,
    pub(super) scroll_view: SimulatedScrollView,
    pub(super) classifier: ScriptedClassifier,

    pub(super) coordinator: Option<NavigationCoordinator>,
    pub(super) coordinator_task: Option<JoinHandle<Result<CoordinatorStats>>>,
    pub(super) event_logger_task: Option<JoinHandle<()>>,
    pub(super) keyboard_handler: Option<KeyboardInputHandler>,
    pub(super) keyboard_enabled: bool,
    pub(super) final_stats: Option<CoordinatorStats>,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<String, ComponentState>>>,
    pub(super) shutdown_sender: Arc<Mutex<Option<oneshot::Sender<ShutdownReason>>>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl GesturenavApp {
    pub fn new(config: GesturenavConfig) -> Result<Self> {
        let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));

        let camera = SyntheticCamera::new(config.camera.fps, config.camera.resolution);
        let motion_source = SimulatedMotionSource::new(config.motion.sample_interval());
        let mut scroll_view = SimulatedScrollView::new(config.navigation.initial_page);
        if config.navigation.animation_ms > 0 {
            scroll_view =
                scroll_view.with_animation(Duration::from_millis(config.navigation.animation_ms));
        }
        let classifier = ScriptedClassifier::new();

        let (coordinator, handle) = NavigationCoordinatorBuilder::new()
            .config(config.clone())
            .event_bus(Arc::clone(&event_bus))
            .camera(camera.clone())
            .motion_source(motion_source.clone())
            .scroll_view(scroll_view.clone())
            .classifier(classifier.clone())
            .build()?;
        scroll_view.attach(handle.clone());

        let controls = SimulatorControls::new(
            &config,
            Arc::clone(&event_bus),
            handle.clone(),
            classifier.clone(),
            motion_source.clone(),
            scroll_view.clone(),
        );
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        Ok(Self {
            config,
            event_bus,
            handle,
            camera,
            motion_source,
            scroll_view,
            classifier,
            coordinator: Some(coordinator),
            coordinator_task: None,
            event_logger_task: None,
            keyboard_handler: Some(KeyboardInputHandler::new(controls)),
            keyboard_enabled: false,
            final_stats: None,
            component_states: Arc::new(Mutex::new(HashMap::new())),
            shutdown_sender: Arc::new(Mutex::new(Some(shutdown_sender))),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Enable or disable the keyboard simulator
    pub fn set_keyboard_enabled(&mut self, enabled: bool) {
        self.keyboard_enabled = enabled;
    }

    pub fn config(&self) -> &GesturenavConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    pub fn classifier(&self) -> &ScriptedClassifier {
        &self.classifier
    }

    pub fn motion_source(&self) -> &SimulatedMotionSource {
        &self.motion_source
    }

    pub fn scroll_view(&self) -> &SimulatedScrollView {
        &self.scroll_view
    }

    pub fn camera(&self) -> &SyntheticCamera {
        &self.camera
    }

    /// Live counters while running, final counters after shutdown
    pub fn stats(&self) -> CoordinatorStats {
        self.final_stats
            .clone()
            .unwrap_or_else(|| self.handle.stats())
    }

    /// Ask the running application to shut down
    pub async fn request_shutdown(&self, reason: ShutdownReason) -> bool {
        match self.shutdown_sender.lock().await.take() {
            Some(sender) => sender.send(reason).is_ok(),
            None => false,
        }
    }
}
