use super::intake::{PendingFrame, SampleIntake};
use super::stats::CoordinatorStats;
use crate::error::{GesturenavError, Result};
use crate::frame::FrameSample;
use crate::motion::MotionSample;
use crate::orientation::{DeviceOrientation, InterfaceOrientation};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// UI work items applied one at a time, in order, on the coordinator task
#[derive(Debug)]
pub(crate) enum Command {
    DragBegan,
    DragEnded { velocity: f64 },
    DecelerationEnded,
    LayoutChanged(InterfaceOrientation),
    DeviceRotated(DeviceOrientation),
    SetMode(usize),
    RequestPage(usize),
    Shutdown,
}

/// Cloneable entry point into the coordinator's serialized context.
///
/// Camera and motion callbacks use the non-blocking `submit_*` calls. They
/// park the newest sample for the coordinator instead of queueing it: a frame
/// that waits too long is displaced by the next one, and motion is only ever
/// replaced by newer motion. UI events are queued, awaited and never dropped.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
    intake: Arc<SampleIntake>,
    mode_count: usize,
    stats: Arc<Mutex<CoordinatorStats>>,
}

impl CoordinatorHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<Command>,
        intake: Arc<SampleIntake>,
        mode_count: usize,
        stats: Arc<Mutex<CoordinatorStats>>,
    ) -> Self {
        Self {
            sender,
            intake,
            mode_count,
            stats,
        }
    }

    /// Hand a captured frame over. Returns false once the coordinator is gone.
    ///
    /// Every delivered frame advances the throttle count, including frames
    /// that are throttled here or displaced before the coordinator gets to
    /// them.
    pub fn submit_frame(&self, frame: FrameSample) -> bool {
        if self.sender.is_closed() {
            return false;
        }

        self.stats.lock().record_frame_received();
        let (count, process) = self.intake.throttle().admit();
        if !process {
            self.stats.lock().record_frame_throttled();
            return true;
        }

        if let Some(displaced) = self.intake.put_frame(PendingFrame { count, frame }) {
            trace!(
                "Coordinator busy, dropping camera frame {} (tick {})",
                displaced.frame.sequence,
                displaced.count
            );
            self.stats.lock().record_frame_dropped();
        }
        true
    }

    /// Hand a motion sample over. Returns false once the coordinator is gone.
    ///
    /// The sample is applied before the next frame is gated; a sample that
    /// is superseded before then is folded into the newer one.
    pub fn submit_motion(&self, sample: MotionSample) -> bool {
        if self.sender.is_closed() {
            return false;
        }

        let replaced = self.intake.put_motion(sample);
        let mut stats = self.stats.lock();
        stats.record_motion_sample();
        if replaced {
            stats.record_motion_coalesced();
        }
        true
    }

    pub async fn drag_began(&self) -> Result<()> {
        self.send(Command::DragBegan).await
    }

    /// `velocity` in pages per second at the moment the finger lifted
    pub async fn drag_ended(&self, velocity: f64) -> Result<()> {
        self.send(Command::DragEnded { velocity }).await
    }

    pub async fn deceleration_ended(&self) -> Result<()> {
        self.send(Command::DecelerationEnded).await
    }

    pub async fn layout_changed(&self, orientation: InterfaceOrientation) -> Result<()> {
        self.send(Command::LayoutChanged(orientation)).await
    }

    pub async fn device_rotated(&self, orientation: DeviceOrientation) -> Result<()> {
        self.send(Command::DeviceRotated(orientation)).await
    }

    /// Select the classifier mode; out-of-range modes are rejected
    pub async fn set_mode(&self, mode: usize) -> Result<()> {
        if mode >= self.mode_count {
            return Err(GesturenavError::InvalidMode {
                mode,
                mode_count: self.mode_count,
            });
        }
        self.send(Command::SetMode(mode)).await
    }

    /// Ask for a page programmatically; out-of-range pages are clamped
    pub async fn request_page(&self, page: usize) -> Result<()> {
        self.send(Command::RequestPage(page)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    pub fn mode_count(&self) -> usize {
        self.mode_count
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the coordinator has stopped taking commands
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    /// Snapshot of the session counters
    pub fn stats(&self) -> CoordinatorStats {
        self.stats.lock().clone()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.sender.send(command).await.map_err(|e| {
            debug!("Coordinator stopped, dropping {:?}", e.0);
            GesturenavError::system("Navigation coordinator is not running")
        })
    }
}
