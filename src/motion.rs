use crate::navigation::NavigationPhase;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tracing::debug;

/// Latest device-motion reading. Only the most recent one matters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Squared magnitude of user (non-gravity) acceleration
    pub energy: f64,
    pub timestamp: SystemTime,
}

impl MotionSample {
    pub fn new(energy: f64) -> Self {
        Self {
            energy,
            timestamp: SystemTime::now(),
        }
    }

    /// Build a sample from a user-acceleration vector in g
    pub fn from_acceleration(x: f64, y: f64, z: f64) -> Self {
        Self::new(x * x + y * y + z * z)
    }
}

/// Suppresses gesture input while the device moves or the view is in motion.
///
/// The gate stays closed until the first sample arrives, so a missing motion
/// source leaves gesture navigation inert.
#[derive(Debug, Clone)]
pub struct MotionGate {
    threshold: f64,
    last_energy: Option<f64>,
    suppressed: bool,
}

impl MotionGate {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_energy: None,
            suppressed: true,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn last_energy(&self) -> Option<f64> {
        self.last_energy
    }

    /// Record a new motion energy and re-derive the gate. Returns `is_allowed()`.
    pub fn update(&mut self, motion_energy: f64, phase: NavigationPhase) -> bool {
        self.last_energy = Some(motion_energy);
        self.refresh(phase)
    }

    /// Re-derive the gate from the latest sample after a phase change.
    pub fn refresh(&mut self, phase: NavigationPhase) -> bool {
        let was_suppressed = self.suppressed;
        self.suppressed = match self.last_energy {
            None => true,
            Some(energy) if energy.is_nan() || energy > self.threshold => true,
            Some(_) => phase.is_interacting(),
        };

        if was_suppressed != self.suppressed {
            debug!(
                "Motion gate {} (energy: {:?}, threshold: {}, phase: {:?})",
                if self.suppressed { "closed" } else { "opened" },
                self.last_energy,
                self.threshold,
                phase
            );
        }

        !self.suppressed
    }

    pub fn is_allowed(&self) -> bool {
        !self.suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EARLY_THRESHOLD: f64 = 1.0 / 7000.0;

    #[test]
    fn test_closed_until_first_sample() {
        let gate = MotionGate::new(0.001);
        assert!(!gate.is_allowed());
        assert_eq!(gate.last_energy(), None);
    }

    #[test]
    fn test_high_energy_always_suppresses() {
        for phase in [
            NavigationPhase::Idle,
            NavigationPhase::UserDragging,
            NavigationPhase::Settling,
        ] {
            let mut gate = MotionGate::new(EARLY_THRESHOLD);
            gate.update(0.0, NavigationPhase::Idle);
            assert!(gate.is_allowed());

            for energy in [0.000144, 0.01, 1.0, f64::INFINITY, f64::NAN] {
                assert!(!gate.update(energy, phase));
                assert!(!gate.is_allowed());
            }
        }
    }

    #[test]
    fn test_repeated_motion_keeps_gate_closed() {
        let mut gate = MotionGate::new(EARLY_THRESHOLD);
        gate.update(0.0002, NavigationPhase::Idle);
        assert!(!gate.is_allowed());
        gate.update(0.0002, NavigationPhase::Idle);
        assert!(!gate.is_allowed());
    }

    #[test]
    fn test_still_device_opens_gate_only_when_idle() {
        let mut gate = MotionGate::new(0.001);

        assert!(!gate.update(0.0001, NavigationPhase::UserDragging));
        assert!(!gate.update(0.0001, NavigationPhase::Settling));
        assert!(gate.update(0.0001, NavigationPhase::Idle));

        // Threshold itself is not "above" the threshold
        assert!(gate.update(0.001, NavigationPhase::Idle));
    }

    #[test]
    fn test_refresh_follows_phase() {
        let mut gate = MotionGate::new(0.001);
        gate.update(0.0, NavigationPhase::Idle);
        assert!(gate.is_allowed());

        assert!(!gate.refresh(NavigationPhase::Settling));
        assert!(gate.refresh(NavigationPhase::Idle));
    }

    #[test]
    fn test_sample_from_acceleration() {
        let sample = MotionSample::from_acceleration(0.01, 0.02, 0.0);
        assert!((sample.energy - 0.0005).abs() < 1e-12);
    }
}
