use super::handle::{Command, CoordinatorHandle};
use super::intake::{PendingFrame, SampleIntake};
use super::stats::CoordinatorStats;
use crate::classifier::{ClassifierAdapter, GestureVerdict};
use crate::config::GesturenavConfig;
use crate::devices::{CameraPipeline, MotionSource, ScrollView};
use crate::error::{GesturenavError, Result};
use crate::events::{EventBus, NavigationEvent};
use crate::frame::FrameConverter;
use crate::motion::{MotionGate, MotionSample};
use crate::navigation::{NavigationIntent, NavigationState, PageNavigator, Transition};
use crate::orientation::{CaptureOrientation, OrientationSynchronizer};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which collaborators came up when the session started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStatus {
    pub camera_ready: bool,
    pub motion_ready: bool,
}

impl SourceStatus {
    /// False when gesture navigation is inert and only manual scrolling works
    pub fn initialized(&self) -> bool {
        self.camera_ready && self.motion_ready
    }
}

/// Owns every piece of navigation state and applies commands one at a time.
///
/// The coordinator is driven either by [`NavigationCoordinator::run`] on its
/// own task, or step by step in tests.
pub struct NavigationCoordinator {
    pub(super) session_id: Uuid,
    pub(super) intake: Arc<SampleIntake>,
    pub(super) gate: MotionGate,
    pub(super) classifier: ClassifierAdapter,
    pub(super) converter: Box<dyn FrameConverter>,
    pub(super) navigator: PageNavigator,
    pub(super) orientation: OrientationSynchronizer,
    pub(super) camera: Box<dyn CameraPipeline>,
    pub(super) motion_source: Box<dyn MotionSource>,
    pub(super) scroll_view: Box<dyn ScrollView>,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) mode: usize,
    pub(super) mode_count: usize,
    pub(super) sender: mpsc::Sender<Command>,
    pub(super) receiver: Option<mpsc::Receiver<Command>>,
    pub(super) stats: Arc<Mutex<CoordinatorStats>>,
    pub(super) cancellation_token: CancellationToken,
    pub(super) sources: SourceStatus,
}

impl NavigationCoordinator {
    /// Defaults for the pieces that only depend on configuration
    pub(super) fn components(config: &GesturenavConfig) -> (MotionGate, PageNavigator) {
        (
            MotionGate::new(config.motion.threshold),
            PageNavigator::new(config.navigation.page_count, config.navigation.initial_page)
                .with_fling_threshold(config.navigation.fling_velocity_threshold),
        )
    }

    /// A new handle onto this coordinator's command queue and sample intake
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle::new(
            self.sender.clone(),
            Arc::clone(&self.intake),
            self.mode_count,
            Arc::clone(&self.stats),
        )
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> NavigationState {
        self.navigator.state()
    }

    pub fn mode(&self) -> usize {
        self.mode
    }

    pub fn gesture_allowed(&self) -> bool {
        self.gate.is_allowed()
    }

    pub fn capture_orientation(&self) -> Option<CaptureOrientation> {
        self.orientation.applied()
    }

    pub fn sources(&self) -> SourceStatus {
        self.sources
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.stats.lock().clone()
    }

    /// Token that stops the session when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn is_active(&self) -> bool {
        !self.cancellation_token.is_cancelled()
    }

    /// Start the camera and motion source. Failures leave gesture input
    /// gated off; they are reported, not returned.
    pub async fn start(&mut self) -> SourceStatus {
        info!("Starting navigation session {}", self.session_id);
        self.intake.clear();

        let camera_ready = match self.camera.start(self.handle()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Camera did not start: {}", e);
                self.publish(NavigationEvent::SystemError {
                    component: "camera".to_string(),
                    error: e.to_string(),
                })
                .await;
                false
            }
        };

        let motion_ready = match self.motion_source.start(self.handle()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Motion source did not start: {}", e);
                self.publish(NavigationEvent::SystemError {
                    component: "motion".to_string(),
                    error: e.to_string(),
                })
                .await;
                false
            }
        };

        self.sources = SourceStatus {
            camera_ready,
            motion_ready,
        };

        for (component, available) in [("camera", camera_ready), ("motion", motion_ready)] {
            self.publish(NavigationEvent::SourceStatus {
                component: component.to_string(),
                available,
                timestamp: SystemTime::now(),
            })
            .await;
        }

        if !self.sources.initialized() {
            warn!("Gesture navigation is inert for this session; manual scrolling still works");
        }

        self.sources
    }

    /// Stop delivering frames and motion samples. Verdicts computed after
    /// this point are discarded.
    pub fn stop(&mut self) {
        if self.cancellation_token.is_cancelled() {
            return;
        }
        info!("Stopping navigation session {}", self.session_id);
        self.cancellation_token.cancel();
        self.camera.stop();
        self.motion_source.stop();
    }

    /// Process commands and parked samples until shutdown or cancellation,
    /// then stop the sources.
    pub async fn run(mut self) -> Result<CoordinatorStats> {
        let mut receiver = self.receiver.take().ok_or_else(|| {
            GesturenavError::system("Coordinator command queue already taken")
        })?;
        let token = self.cancellation_token.clone();
        let intake = Arc::clone(&self.intake);

        info!("Navigation coordinator running (session {})", self.session_id);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Navigation coordinator cancelled");
                    break;
                }
                command = receiver.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                _ = intake.ready() => self.process_pending().await,
            }
        }

        self.stop();
        let stats = self.stats();
        info!(
            "Navigation session {} finished: {} frames, {} classified, {} page changes",
            self.session_id, stats.frames_received, stats.frames_classified, stats.page_changes
        );
        Ok(stats)
    }

    pub(crate) async fn handle_command(&mut self, command: Command) {
        match command {
            Command::DragBegan => {
                let transition = self.navigator.begin_drag();
                self.apply_transition(transition).await;
            }
            Command::DragEnded { velocity } => {
                let offset = self.scroll_view.current_offset();
                let transition = self.navigator.end_drag(velocity, offset);
                self.apply_transition(transition).await;
            }
            Command::DecelerationEnded => {
                let offset = self.scroll_view.current_offset();
                let transition = self.navigator.finish_settling(offset);
                self.apply_transition(transition).await;
            }
            Command::LayoutChanged(orientation) => {
                let applied = self.orientation.sync(orientation, self.camera.as_mut());
                self.publish_orientation(applied).await;
            }
            Command::DeviceRotated(orientation) => {
                let applied = self.orientation.sync_device(orientation, self.camera.as_mut());
                self.publish_orientation(applied).await;
            }
            Command::SetMode(mode) => self.set_mode(mode).await,
            Command::RequestPage(page) => {
                let transition = self.navigator.request_page(page);
                self.apply_transition(transition).await;
            }
            Command::Shutdown => self.stop(),
        }
    }

    /// Apply the newest motion sample, then the parked frame if there is one.
    ///
    /// The frame is taken before the motion slot is read, so any sample
    /// submitted ahead of that frame is applied before it is gated.
    pub(crate) async fn process_pending(&mut self) {
        let pending = self.intake.take_frame();
        if let Some(sample) = self.intake.take_motion() {
            self.on_motion(sample).await;
        }
        if let Some(pending) = pending {
            self.on_frame(pending).await;
        }
    }

    /// One admitted camera tick: gate, classify, navigate.
    async fn on_frame(&mut self, pending: PendingFrame) {
        let PendingFrame { count, frame } = pending;

        if !self.gate.is_allowed() {
            self.stats.lock().record_frame_gated();
            return;
        }

        let verdict = match self.converter.convert(&frame) {
            Some(image) => self.classifier.classify(&image, self.mode),
            None => GestureVerdict::None,
        };
        self.stats.lock().record_frame_classified();

        if !self.is_active() {
            debug!("Discarding verdict for frame {} after stop", frame.sequence);
            return;
        }

        if !verdict.is_gesture() {
            return;
        }

        debug!(
            "Frame {} (tick {}) classified as {:?} in mode {}",
            frame.sequence, count, verdict, self.mode
        );
        self.publish(NavigationEvent::GestureRecognized {
            verdict,
            mode: self.mode,
            timestamp: SystemTime::now(),
        })
        .await;

        let transition = self.navigator.apply_verdict(verdict);
        self.stats.lock().record_gesture(transition.page_changed());
        self.apply_transition(transition).await;
    }

    async fn on_motion(&mut self, sample: MotionSample) {
        let was_allowed = self.gate.is_allowed();
        let allowed = self.gate.update(sample.energy, self.navigator.phase());
        if allowed != was_allowed {
            self.publish_gate(allowed).await;
        }
    }

    async fn set_mode(&mut self, mode: usize) {
        if mode >= self.mode_count {
            warn!("Ignoring gesture mode {} (supported: {})", mode, self.mode_count);
            return;
        }
        if mode == self.mode {
            return;
        }

        info!("Gesture mode changed {} -> {}", self.mode, mode);
        self.mode = mode;
        self.publish(NavigationEvent::ModeChanged {
            mode,
            timestamp: SystemTime::now(),
        })
        .await;
    }

    /// Push the effects of a state machine transition out to the view and the UI
    async fn apply_transition(&mut self, transition: Transition) {
        if transition.is_noop() {
            return;
        }

        if let Some(NavigationIntent::ScrollToPage(page)) = transition.intent {
            debug!("Animating scroll view to page {}", page);
            self.scroll_view.animate_to_offset(page as f64);
        }

        if transition.phase_changed() {
            self.publish(NavigationEvent::PhaseChanged {
                from: transition.from.phase,
                to: transition.to.phase,
                timestamp: SystemTime::now(),
            })
            .await;

            let was_allowed = self.gate.is_allowed();
            let allowed = self.gate.refresh(transition.to.phase);
            if allowed != was_allowed {
                self.publish_gate(allowed).await;
            }
        }

        if transition.page_changed() {
            self.stats.lock().record_page_change();
            self.publish(NavigationEvent::PageChanged {
                page: transition.to.current_page,
                previous: transition.from.current_page,
                timestamp: SystemTime::now(),
            })
            .await;
        }
    }

    async fn publish_gate(&self, allowed: bool) {
        self.publish(NavigationEvent::GateChanged {
            allowed,
            timestamp: SystemTime::now(),
        })
        .await;
    }

    async fn publish_orientation(&self, applied: Option<CaptureOrientation>) {
        if let Some(orientation) = applied {
            self.publish(NavigationEvent::OrientationChanged {
                orientation,
                timestamp: SystemTime::now(),
            })
            .await;
        }
    }

    /// Notifications are best effort; nobody listening is not an error
    async fn publish(&self, event: NavigationEvent) {
        let _ = self.event_bus.publish(event).await;
    }
}
