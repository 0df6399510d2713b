use crate::error::{GesturenavError, Result};
use crate::frame::FrameImage;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-frame output of the gesture classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureVerdict {
    Left,
    Right,
    None,
}

impl GestureVerdict {
    /// Decode the integer gesture type reported by native classifiers
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => GestureVerdict::Right,
            2 => GestureVerdict::Left,
            _ => GestureVerdict::None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            GestureVerdict::Right => 1,
            GestureVerdict::Left => 2,
            GestureVerdict::None => 0,
        }
    }

    pub fn is_gesture(&self) -> bool {
        !matches!(self, GestureVerdict::None)
    }
}

/// External image classifier. `mode` selects one of its detection strategies.
pub trait GestureClassifier: Send + Sync {
    fn classify(&mut self, image: &FrameImage, mode: usize) -> Result<GestureVerdict>;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassifierStats {
    pub classified: u64,
    pub gestures: u64,
    pub failures: u64,
}

/// Delegates to the external classifier and flattens every failure to `None`
pub struct ClassifierAdapter {
    classifier: Box<dyn GestureClassifier>,
    stats: ClassifierStats,
}

impl ClassifierAdapter {
    pub fn new(classifier: Box<dyn GestureClassifier>) -> Self {
        Self {
            classifier,
            stats: ClassifierStats::default(),
        }
    }

    pub fn classify(&mut self, image: &FrameImage, mode: usize) -> GestureVerdict {
        self.stats.classified += 1;

        let classifier = &mut self.classifier;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(image, mode)));

        let verdict = match outcome {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                debug!("Classifier error treated as no gesture: {}", e);
                self.stats.failures += 1;
                GestureVerdict::None
            }
            Err(_) => {
                warn!("Classifier panicked in mode {}, treating as no gesture", mode);
                self.stats.failures += 1;
                GestureVerdict::None
            }
        };

        if verdict.is_gesture() {
            self.stats.gestures += 1;
        }
        verdict
    }

    pub fn stats(&self) -> &ClassifierStats {
        &self.stats
    }
}

/// Classifier fed from a queue of pending verdicts, for simulation and tests
#[derive(Debug, Clone, Default)]
pub struct ScriptedClassifier {
    pending: Arc<Mutex<VecDeque<GestureVerdict>>>,
    seen_modes: Arc<Mutex<Vec<usize>>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script<I: IntoIterator<Item = GestureVerdict>>(script: I) -> Self {
        let classifier = Self::new();
        classifier.pending.lock().extend(script);
        classifier
    }

    /// Queue a verdict for the next classified frame
    pub fn push(&self, verdict: GestureVerdict) {
        self.pending.lock().push_back(verdict);
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Modes the classifier was invoked with, in call order
    pub fn seen_modes(&self) -> Vec<usize> {
        self.seen_modes.lock().clone()
    }
}

impl GestureClassifier for ScriptedClassifier {
    fn classify(&mut self, _image: &FrameImage, mode: usize) -> Result<GestureVerdict> {
        self.seen_modes.lock().push(mode);
        Ok(self
            .pending
            .lock()
            .pop_front()
            .unwrap_or(GestureVerdict::None))
    }
}

/// Classifier that always fails, standing in for an unavailable model
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClassifier;

impl GestureClassifier for UnavailableClassifier {
    fn classify(&mut self, _image: &FrameImage, _mode: usize) -> Result<GestureVerdict> {
        Err(GesturenavError::Classification {
            details: "no classifier loaded".to_string(),
        })
    }
}
