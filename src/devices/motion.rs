use super::interface::MotionSource;
use crate::coordinator::CoordinatorHandle;
use crate::error::{GesturenavError, Result};
use crate::motion::MotionSample;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Motion sampler that reports an adjustable energy level on a fixed period
#[derive(Clone)]
pub struct SimulatedMotionSource {
    period: Duration,
    available: bool,
    energy: Arc<Mutex<f64>>,
    samples_sent: Arc<AtomicU64>,
    is_running: Arc<AtomicBool>,
    cancellation_token: CancellationToken,
}

impl SimulatedMotionSource {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            available: true,
            energy: Arc::new(Mutex::new(0.0)),
            samples_sent: Arc::new(AtomicU64::new(0)),
            is_running: Arc::new(AtomicBool::new(false)),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// A sensor that fails to start
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Duration::from_millis(50))
        }
    }

    /// Energy reported from the next sample on
    pub fn set_energy(&self, energy: f64) {
        *self.energy.lock() = energy;
    }

    pub fn energy(&self) -> f64 {
        *self.energy.lock()
    }

    pub fn samples_sent(&self) -> u64 {
        self.samples_sent.load(Ordering::Relaxed)
    }
}

impl MotionSource for SimulatedMotionSource {
    fn start(&mut self, handle: CoordinatorHandle) -> Result<()> {
        if !self.available {
            return Err(GesturenavError::unavailable(
                "motion",
                "device motion is not available",
            ));
        }

        if self.is_running.swap(true, Ordering::SeqCst) {
            warn!("Simulated motion source is already running");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|e| {
            self.is_running.store(false, Ordering::SeqCst);
            GesturenavError::component("motion".to_string(), e.to_string())
        })?;

        info!("Starting simulated motion source every {:?}", self.period);

        self.cancellation_token = CancellationToken::new();
        let token = self.cancellation_token.clone();
        let energy = Arc::clone(&self.energy);
        let samples_sent = Arc::clone(&self.samples_sent);
        let is_running = Arc::clone(&self.is_running);
        let period = self.period;

        runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let sample = MotionSample::new(*energy.lock());
                        if !handle.submit_motion(sample) {
                            debug!("Coordinator gone, motion source stopping");
                            break;
                        }
                        samples_sent.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }

            is_running.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    fn stop(&mut self) {
        self.cancellation_token.cancel();
    }
}
