use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Keeps one frame out of every `interval` delivered frames.
///
/// The decision depends only on the running frame count, never on whether
/// earlier frames were kept, so a slow classifier cannot skew the cadence.
/// The count is atomic so capture callbacks can admit frames as they arrive.
#[derive(Debug)]
pub struct FrameThrottle {
    interval: u64,
    counter: AtomicU64,
}

impl FrameThrottle {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            counter: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn should_process(&self, frame_sequence_number: u64) -> bool {
        frame_sequence_number % self.interval == 0
    }

    /// Counts a delivered frame and reports whether it should be classified
    pub fn admit(&self) -> (u64, bool) {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
        (sequence, self.should_process(sequence))
    }

    /// Number of frames counted since the last reset
    pub fn frames_seen(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        let seen = self.counter.swap(0, Ordering::Relaxed);
        debug!("Frame throttle reset after {} frames", seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_every_second_frame_processed() {
        let throttle = FrameThrottle::new(2);
        let processed: Vec<u64> = (0..6)
            .filter_map(|_| {
                let (seq, keep) = throttle.admit();
                keep.then_some(seq)
            })
            .collect();

        assert_eq!(processed, vec![0, 2, 4]);
    }

    #[test]
    fn test_decision_is_independent_of_history() {
        let throttle = FrameThrottle::new(2);
        for k in [0u64, 1, 2, 3, 101, 1000, u64::MAX] {
            assert_eq!(throttle.should_process(k), k % 2 == 0);
        }
        // Asking twice changes nothing
        assert!(throttle.should_process(4));
        assert!(throttle.should_process(4));
    }

    #[test]
    fn test_reset_restarts_count() {
        let throttle = FrameThrottle::new(3);
        throttle.admit();
        throttle.admit();
        assert_eq!(throttle.frames_seen(), 2);

        throttle.reset();
        assert_eq!(throttle.admit(), (0, true));
    }

    #[test]
    fn test_zero_interval_processes_everything() {
        let throttle = FrameThrottle::new(0);
        assert_eq!(throttle.interval(), 1);
        assert!((0..5).all(|k| throttle.should_process(k)));
    }

    #[test]
    fn test_concurrent_admits_count_every_frame() {
        let throttle = Arc::new(FrameThrottle::new(4));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                std::thread::spawn(move || (0..250).filter(|_| throttle.admit().1).count())
            })
            .collect();

        let kept: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
        assert_eq!(throttle.frames_seen(), 1000);
        assert_eq!(kept, 250);
    }
}
