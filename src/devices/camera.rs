use super::interface::CameraPipeline;
use crate::coordinator::CoordinatorHandle;
use crate::error::{GesturenavError, Result};
use crate::frame::{FrameFormat, FrameSample};
use crate::orientation::CaptureOrientation;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::runtime::Handle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Camera stand-in that emits blank BGRA frames at a fixed rate.
///
/// Clones share counters and orientation, so a test can keep one copy while
/// the coordinator owns another.
#[derive(Clone)]
pub struct SyntheticCamera {
    fps: u32,
    resolution: (u32, u32),
    available: bool,
    orientation: Arc<Mutex<CaptureOrientation>>,
    orientation_updates: Arc<AtomicU64>,
    frame_counter: Arc<AtomicU64>,
    is_running: Arc<AtomicBool>,
    cancellation_token: CancellationToken,
}

impl SyntheticCamera {
    pub fn new(fps: u32, resolution: (u32, u32)) -> Self {
        Self {
            fps: fps.max(1),
            resolution,
            available: true,
            orientation: Arc::new(Mutex::new(CaptureOrientation::Portrait)),
            orientation_updates: Arc::new(AtomicU64::new(0)),
            frame_counter: Arc::new(AtomicU64::new(0)),
            is_running: Arc::new(AtomicBool::new(false)),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// A camera whose start always fails, as when no front camera exists
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(30, (640, 480))
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_counter.load(Ordering::Relaxed)
    }

    pub fn orientation_updates(&self) -> u64 {
        self.orientation_updates.load(Ordering::Relaxed)
    }

    pub fn is_capturing(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }
}

impl CameraPipeline for SyntheticCamera {
    fn start(&mut self, handle: CoordinatorHandle) -> Result<()> {
        if !self.available {
            return Err(GesturenavError::unavailable(
                "camera",
                "no front-facing capture device",
            ));
        }

        if self.is_running.swap(true, Ordering::SeqCst) {
            warn!("Synthetic camera is already capturing");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|e| {
            self.is_running.store(false, Ordering::SeqCst);
            GesturenavError::component("camera".to_string(), e.to_string())
        })?;

        info!(
            "Starting synthetic camera ({}x{} @ {}fps)",
            self.resolution.0, self.resolution.1, self.fps
        );

        self.cancellation_token = CancellationToken::new();
        let token = self.cancellation_token.clone();
        let frame_counter = Arc::clone(&self.frame_counter);
        let is_running = Arc::clone(&self.is_running);
        let (width, height) = self.resolution;
        let period = Duration::from_millis(1000 / self.fps as u64);
        let format = FrameFormat::Bgra32;
        let pixels = Arc::new(vec![0u8; width as usize * height as usize * format.bytes_per_pixel()]);

        runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let frame = FrameSample {
                            sequence: frame_counter.fetch_add(1, Ordering::Relaxed),
                            timestamp: SystemTime::now(),
                            data: Arc::clone(&pixels),
                            width,
                            height,
                            format,
                        };

                        if !handle.submit_frame(frame) {
                            debug!("Coordinator gone, synthetic camera stopping");
                            break;
                        }
                    }
                }
            }

            is_running.store(false, Ordering::SeqCst);
            debug!("Synthetic camera task exited");
        });

        Ok(())
    }

    fn stop(&mut self) {
        if self.is_running.load(Ordering::SeqCst) {
            info!("Stopping synthetic camera");
        }
        self.cancellation_token.cancel();
    }

    fn set_orientation(&mut self, orientation: CaptureOrientation) {
        *self.orientation.lock() = orientation;
        self.orientation_updates.fetch_add(1, Ordering::Relaxed);
    }

    fn current_preview_orientation(&self) -> CaptureOrientation {
        *self.orientation.lock()
    }
}
