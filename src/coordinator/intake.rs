use crate::frame::FrameSample;
use crate::motion::MotionSample;
use crate::throttle::FrameThrottle;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// A frame that passed the throttle, tagged with its delivery count
#[derive(Debug)]
pub(crate) struct PendingFrame {
    pub count: u64,
    pub frame: FrameSample,
}

/// Latest-value hand-off from the capture callbacks to the coordinator task.
///
/// At most one frame and one motion sample wait at any time. A newer frame
/// displaces an unprocessed one, and a newer motion sample replaces an
/// unapplied one, so the coordinator never works through a backlog.
#[derive(Debug)]
pub(crate) struct SampleIntake {
    throttle: FrameThrottle,
    frame: Mutex<Option<PendingFrame>>,
    motion: Mutex<Option<MotionSample>>,
    ready: Notify,
}

impl SampleIntake {
    pub fn new(frame_interval: u64) -> Self {
        Self {
            throttle: FrameThrottle::new(frame_interval),
            frame: Mutex::new(None),
            motion: Mutex::new(None),
            ready: Notify::new(),
        }
    }

    pub fn throttle(&self) -> &FrameThrottle {
        &self.throttle
    }

    /// Park a frame for the coordinator, returning the one it displaced
    pub fn put_frame(&self, pending: PendingFrame) -> Option<PendingFrame> {
        let displaced = self.frame.lock().replace(pending);
        self.ready.notify_one();
        displaced
    }

    /// Park the newest motion sample. True when an unapplied one was replaced.
    pub fn put_motion(&self, sample: MotionSample) -> bool {
        let replaced = self.motion.lock().replace(sample).is_some();
        self.ready.notify_one();
        replaced
    }

    pub fn take_frame(&self) -> Option<PendingFrame> {
        self.frame.lock().take()
    }

    pub fn take_motion(&self) -> Option<MotionSample> {
        self.motion.lock().take()
    }

    /// Forget anything still waiting and restart the frame count
    pub fn clear(&self) {
        self.frame.lock().take();
        self.motion.lock().take();
        self.throttle.reset();
    }

    /// Resolves once something was parked since the last wake-up
    pub async fn ready(&self) {
        self.ready.notified().await
    }
}
