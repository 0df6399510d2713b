use crate::classifier::{GestureVerdict, ScriptedClassifier};
use crate::config::GesturenavConfig;
use crate::coordinator::CoordinatorHandle;
use crate::devices::{ScrollView, SimulatedMotionSource, SimulatedScrollView};
use crate::error::Result;
use crate::events::{EventBus, NavigationEvent};
use crate::orientation::InterfaceOrientation;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::runtime::Handle;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const LAYOUT_CYCLE: [InterfaceOrientation; 4] = [
    InterfaceOrientation::Portrait,
    InterfaceOrientation::LandscapeRight,
    InterfaceOrientation::PortraitUpsideDown,
    InterfaceOrientation::LandscapeLeft,
];

const DRAG_STEP: f64 = 0.35;
const FLING_VELOCITY: f64 = 2.0;

/// What a key press asks the simulator to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Gesture(GestureVerdict),
    SelectMode(usize),
    RotateLayout,
    ToggleMotion,
    DragBegin,
    /// Move the view by a page fraction while dragging
    DragBy(f64),
    DragRelease,
    Fling,
    Quit,
}

impl KeyAction {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Left | KeyCode::Char('a') => Some(KeyAction::Gesture(GestureVerdict::Left)),
            KeyCode::Right | KeyCode::Char('d') => Some(KeyAction::Gesture(GestureVerdict::Right)),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                c.to_digit(10).map(|mode| KeyAction::SelectMode(mode as usize))
            }
            KeyCode::Char('r') => Some(KeyAction::RotateLayout),
            KeyCode::Char('s') => Some(KeyAction::ToggleMotion),
            KeyCode::Char('g') => Some(KeyAction::DragBegin),
            KeyCode::Char('[') => Some(KeyAction::DragBy(-DRAG_STEP)),
            KeyCode::Char(']') => Some(KeyAction::DragBy(DRAG_STEP)),
            KeyCode::Char('h') => Some(KeyAction::DragRelease),
            KeyCode::Char('f') => Some(KeyAction::Fling),
            KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
            _ => None,
        }
    }
}

/// Drives the simulated devices the way a user in front of the camera would
#[derive(Clone)]
pub struct SimulatorControls {
    event_bus: Arc<EventBus>,
    handle: CoordinatorHandle,
    classifier: ScriptedClassifier,
    motion_source: SimulatedMotionSource,
    scroll_view: SimulatedScrollView,
    motion_spike: f64,
    page_count: usize,
    settle_delay: Duration,
    layout_index: Arc<AtomicUsize>,
}

impl SimulatorControls {
    pub fn new(
        config: &GesturenavConfig,
        event_bus: Arc<EventBus>,
        handle: CoordinatorHandle,
        classifier: ScriptedClassifier,
        motion_source: SimulatedMotionSource,
        scroll_view: SimulatedScrollView,
    ) -> Self {
        Self {
            event_bus,
            handle,
            classifier,
            motion_source,
            scroll_view,
            motion_spike: (config.motion.threshold * 10.0).max(f64::EPSILON),
            page_count: config.navigation.page_count,
            settle_delay: Duration::from_millis(config.navigation.animation_ms),
            layout_index: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn perform(&self, action: KeyAction) -> Result<()> {
        match action {
            KeyAction::Gesture(verdict) => {
                info!("Simulating {:?} hand gesture", verdict);
                self.classifier.push(verdict);
            }
            KeyAction::SelectMode(mode) => {
                self.handle.set_mode(mode).await?;
            }
            KeyAction::RotateLayout => {
                let index = (self.layout_index.fetch_add(1, Ordering::Relaxed) + 1)
                    % LAYOUT_CYCLE.len();
                let orientation = LAYOUT_CYCLE[index];
                info!("Simulating layout change to {:?}", orientation);
                self.handle.layout_changed(orientation).await?;
            }
            KeyAction::ToggleMotion => {
                let energy = if self.motion_source.energy() > 0.0 {
                    0.0
                } else {
                    self.motion_spike
                };
                info!("Simulated device motion energy set to {}", energy);
                self.motion_source.set_energy(energy);
            }
            KeyAction::DragBegin => self.handle.drag_began().await?,
            KeyAction::DragBy(delta) => {
                let max = self.page_count.saturating_sub(1) as f64;
                let offset = (self.scroll_view.current_offset() + delta).clamp(0.0, max);
                debug!("Dragging scroll view to {:.2}", offset);
                self.scroll_view.set_offset(offset);
            }
            KeyAction::DragRelease => self.handle.drag_ended(0.0).await?,
            KeyAction::Fling => self.fling().await?,
            KeyAction::Quit => {
                info!("Quit key pressed - requesting shutdown");
                self.event_bus
                    .publish(NavigationEvent::ShutdownRequested {
                        timestamp: SystemTime::now(),
                        reason: "User requested via keyboard".to_string(),
                    })
                    .await?;
            }
        }
        Ok(())
    }

    /// Release the drag with momentum and let the view decelerate to the next page
    async fn fling(&self) -> Result<()> {
        self.handle.drag_ended(FLING_VELOCITY).await?;

        let max = self.page_count.saturating_sub(1) as f64;
        let target = (self.scroll_view.current_offset().floor() + 1.0).min(max);
        let scroll_view = self.scroll_view.clone();
        let handle = self.handle.clone();
        let delay = self.settle_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scroll_view.set_offset(target);
            if let Err(e) = handle.deceleration_ended().await {
                debug!("Could not report fling deceleration: {}", e);
            }
        });
        Ok(())
    }
}

/// Terminal keyboard driver for the simulator
pub struct KeyboardInputHandler {
    controls: SimulatorControls,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    pub fn new(controls: SimulatorControls) -> Self {
        Self {
            controls,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start listening for keyboard input
    pub async fn start(&self) -> Result<()> {
        info!(
            "Starting keyboard simulator - arrows/a/d gesture, digits select mode, \
             r rotate, s shake, g/[/]/h drag, f fling, q quit"
        );

        let controls = self.controls.clone();
        let cancellation_token = self.cancellation_token.clone();
        let runtime_handle = Handle::current();

        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            debug!("Raw mode enabled - keyboard simulator active");

            loop {
                if cancellation_token.is_cancelled() {
                    debug!("Keyboard simulator stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }

                        let Some(action) = KeyAction::from_key(key_event.code) else {
                            debug!("Key pressed: {:?}", key_event.code);
                            continue;
                        };

                        let controls = controls.clone();
                        runtime_handle.spawn(async move {
                            if let Err(e) = controls.perform(action).await {
                                warn!("Simulator action {:?} failed: {}", action, e);
                            }
                        });

                        if action == KeyAction::Quit {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            }

            debug!("Keyboard simulator task exited");
        });

        Ok(())
    }

    /// Stop the keyboard simulator
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard simulator");
        self.cancellation_token.cancel();

        // Give the polling loop a moment to restore the terminal
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = disable_raw_mode();

        Ok(())
    }
}
