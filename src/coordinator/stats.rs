use serde::Serialize;
use std::time::SystemTime;

/// Session counters for the navigation coordinator
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinatorStats {
    pub frames_received: u64,
    pub frames_dropped: u64,
    pub frames_throttled: u64,
    pub frames_gated: u64,
    pub frames_classified: u64,
    pub motion_samples: u64,
    pub motion_samples_coalesced: u64,
    pub gestures_recognized: u64,
    pub gestures_ignored: u64,
    pub page_changes: u64,
    pub last_page_change: Option<SystemTime>,
}

impl CoordinatorStats {
    pub fn record_frame_received(&mut self) {
        self.frames_received += 1;
    }

    pub fn record_frame_dropped(&mut self) {
        self.frames_dropped += 1;
    }

    pub fn record_frame_throttled(&mut self) {
        self.frames_throttled += 1;
    }

    pub fn record_frame_gated(&mut self) {
        self.frames_gated += 1;
    }

    pub fn record_frame_classified(&mut self) {
        self.frames_classified += 1;
    }

    pub fn record_motion_sample(&mut self) {
        self.motion_samples += 1;
    }

    /// A motion sample was replaced by a newer one before it was applied
    pub fn record_motion_coalesced(&mut self) {
        self.motion_samples_coalesced += 1;
    }

    /// A gesture verdict reached the state machine; `applied` when it moved the page
    pub fn record_gesture(&mut self, applied: bool) {
        if applied {
            self.gestures_recognized += 1;
        } else {
            self.gestures_ignored += 1;
        }
    }

    pub fn record_page_change(&mut self) {
        self.page_changes += 1;
        self.last_page_change = Some(SystemTime::now());
    }

    /// Share of delivered frames that reached the classifier
    pub fn classification_rate(&self) -> f64 {
        if self.frames_received == 0 {
            0.0
        } else {
            self.frames_classified as f64 / self.frames_received as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
