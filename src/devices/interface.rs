use crate::coordinator::CoordinatorHandle;
use crate::error::Result;
use crate::orientation::CaptureOrientation;

/// Front camera capture pipeline.
///
/// Once started, the pipeline delivers frames from its own thread or task by
/// calling [`CoordinatorHandle::submit_frame`]. Device selection, resolution
/// and frame-rate setup all live behind `start`.
pub trait CameraPipeline: Send + Sync {
    /// Begin delivering frames. An error means the camera is unavailable.
    fn start(&mut self, handle: CoordinatorHandle) -> Result<()>;

    fn stop(&mut self);

    fn set_orientation(&mut self, orientation: CaptureOrientation);

    fn current_preview_orientation(&self) -> CaptureOrientation;
}

/// Periodic device-motion sampler delivering through
/// [`CoordinatorHandle::submit_motion`]. Latest value only, no history.
pub trait MotionSource: Send + Sync {
    fn start(&mut self, handle: CoordinatorHandle) -> Result<()>;

    fn stop(&mut self);
}

/// Paged scroll view. Offsets are expressed in pages, so page `n` sits at `n as f64`.
///
/// Drag and deceleration events reach the coordinator through
/// [`CoordinatorHandle::drag_began`], [`CoordinatorHandle::drag_ended`] and
/// [`CoordinatorHandle::deceleration_ended`].
pub trait ScrollView: Send + Sync {
    fn current_offset(&self) -> f64;

    fn animate_to_offset(&mut self, offset: f64);
}
