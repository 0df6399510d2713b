use super::interface::ScrollView;
use crate::coordinator::CoordinatorHandle;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct ScrollState {
    offset: f64,
    generation: u64,
    animations: Vec<f64>,
}

/// In-memory paged scroll view.
///
/// Without an animation duration, `animate_to_offset` jumps immediately and
/// reports nothing. With one, the offset arrives after the delay and the
/// attached coordinator is told the deceleration ended. A newer animation
/// supersedes an older one, so a chain of page changes settles once.
#[derive(Clone)]
pub struct SimulatedScrollView {
    state: Arc<Mutex<ScrollState>>,
    animation: Option<Duration>,
    notifier: Arc<Mutex<Option<CoordinatorHandle>>>,
}

impl SimulatedScrollView {
    pub fn new(initial_page: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScrollState {
                offset: initial_page as f64,
                ..ScrollState::default()
            })),
            animation: None,
            notifier: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_animation(mut self, duration: Duration) -> Self {
        self.animation = Some(duration);
        self
    }

    /// Route deceleration-ended events to a coordinator
    pub fn attach(&self, handle: CoordinatorHandle) {
        *self.notifier.lock() = Some(handle);
    }

    /// Move the view as a user drag would
    pub fn set_offset(&self, offset: f64) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.offset = offset;
    }

    /// Targets requested through `animate_to_offset`, oldest first
    pub fn animations(&self) -> Vec<f64> {
        self.state.lock().animations.clone()
    }
}

impl ScrollView for SimulatedScrollView {
    fn current_offset(&self) -> f64 {
        self.state.lock().offset
    }

    fn animate_to_offset(&mut self, offset: f64) {
        let generation = {
            let mut state = self.state.lock();
            state.animations.push(offset);
            state.generation += 1;
            if self.animation.is_none() {
                state.offset = offset;
            }
            state.generation
        };

        let Some(duration) = self.animation else {
            return;
        };

        let notifier = self.notifier.lock().clone();
        let Some(handle) = notifier else {
            warn!("Scroll view has no coordinator attached, jumping to {:.2}", offset);
            self.state.lock().offset = offset;
            return;
        };

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                self.state.lock().offset = offset;
                return;
            }
        };

        let state = Arc::clone(&self.state);
        runtime.spawn(async move {
            tokio::time::sleep(duration).await;

            {
                let mut state = state.lock();
                if state.generation != generation {
                    debug!("Animation to {:.2} superseded", offset);
                    return;
                }
                state.offset = offset;
            }

            if let Err(e) = handle.deceleration_ended().await {
                debug!("Could not report settled scroll view: {}", e);
            }
        });
    }
}
