use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GesturenavConfig {
    pub camera: CameraConfig,
    pub throttle: ThrottleConfig,
    pub motion: MotionConfig,
    pub navigation: NavigationConfig,
    pub classifier: ClassifierConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Frames per second delivered by the camera pipeline
    #[serde(default = "default_camera_fps")]
    pub fps: u32,

    /// Capture resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ThrottleConfig {
    /// Classify one frame out of every `frame_interval` delivered frames
    #[serde(default = "default_frame_interval")]
    pub frame_interval: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MotionConfig {
    /// Motion energy above which gesture input is suppressed
    #[serde(default = "default_motion_threshold")]
    pub threshold: f64,

    /// Motion sampling period in milliseconds
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NavigationConfig {
    /// Number of pages in the scroll view
    #[serde(default = "default_page_count")]
    pub page_count: usize,

    /// Page shown when the session starts
    #[serde(default = "default_initial_page")]
    pub initial_page: usize,

    /// Release velocity (pages/s) above which a drag ends in a fling
    #[serde(default = "default_fling_velocity_threshold")]
    pub fling_velocity_threshold: f64,

    /// Duration of the simulated page animation in milliseconds
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClassifierConfig {
    /// Number of detection strategies supported by the classifier
    #[serde(default = "default_mode_count")]
    pub mode_count: usize,

    /// Mode selected at session start
    #[serde(default = "default_mode")]
    pub default_mode: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Capacity of the queue for UI commands; senders wait when it is full
    #[serde(default = "default_command_queue_capacity")]
    pub command_queue_capacity: usize,
}

impl MotionConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl CameraConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.fps.max(1) as u64)
    }
}

impl GesturenavConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("gesturenav.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.fps", default_camera_fps())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("throttle.frame_interval", default_frame_interval())?
            .set_default("motion.threshold", default_motion_threshold())?
            .set_default("motion.sample_interval_ms", default_sample_interval_ms())?
            .set_default("navigation.page_count", default_page_count() as u64)?
            .set_default("navigation.initial_page", default_initial_page() as u64)?
            .set_default(
                "navigation.fling_velocity_threshold",
                default_fling_velocity_threshold(),
            )?
            .set_default("navigation.animation_ms", default_animation_ms())?
            .set_default("classifier.mode_count", default_mode_count() as u64)?
            .set_default("classifier.default_mode", default_mode() as u64)?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as u64,
            )?
            .set_default(
                "system.command_queue_capacity",
                default_command_queue_capacity() as u64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            // GESTURENAV_MOTION__THRESHOLD=0.0005
            .add_source(
                Environment::with_prefix("GESTURENAV")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: GesturenavConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.fps == 0 {
            return Err(ConfigError::Message(
                "Camera fps must be greater than 0".to_string(),
            ));
        }

        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.throttle.frame_interval == 0 {
            return Err(ConfigError::Message(
                "Throttle frame_interval must be greater than 0".to_string(),
            ));
        }

        if !self.motion.threshold.is_finite() || self.motion.threshold < 0.0 {
            return Err(ConfigError::Message(
                "Motion threshold must be a finite, non-negative number".to_string(),
            ));
        }

        if self.motion.sample_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Motion sample_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.navigation.page_count == 0 {
            return Err(ConfigError::Message(
                "Navigation page_count must be greater than 0".to_string(),
            ));
        }

        if self.navigation.initial_page >= self.navigation.page_count {
            return Err(ConfigError::Message(format!(
                "Navigation initial_page {} is outside 0..{}",
                self.navigation.initial_page, self.navigation.page_count
            )));
        }

        if !self.navigation.fling_velocity_threshold.is_finite()
            || self.navigation.fling_velocity_threshold < 0.0
        {
            return Err(ConfigError::Message(
                "Navigation fling_velocity_threshold must be a finite, non-negative number"
                    .to_string(),
            ));
        }

        if self.classifier.mode_count == 0 {
            return Err(ConfigError::Message(
                "Classifier mode_count must be greater than 0".to_string(),
            ));
        }

        if self.classifier.default_mode >= self.classifier.mode_count {
            return Err(ConfigError::Message(format!(
                "Classifier default_mode {} is outside 0..{}",
                self.classifier.default_mode, self.classifier.mode_count
            )));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        if self.system.command_queue_capacity == 0 {
            return Err(ConfigError::Message(
                "Command queue capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GesturenavConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                fps: default_camera_fps(),
                resolution: default_camera_resolution(),
            },
            throttle: ThrottleConfig {
                frame_interval: default_frame_interval(),
            },
            motion: MotionConfig {
                threshold: default_motion_threshold(),
                sample_interval_ms: default_sample_interval_ms(),
            },
            navigation: NavigationConfig {
                page_count: default_page_count(),
                initial_page: default_initial_page(),
                fling_velocity_threshold: default_fling_velocity_threshold(),
                animation_ms: default_animation_ms(),
            },
            classifier: ClassifierConfig {
                mode_count: default_mode_count(),
                default_mode: default_mode(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
                command_queue_capacity: default_command_queue_capacity(),
            },
        }
    }
}

// Default value functions
fn default_camera_fps() -> u32 {
    30
}
fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}

fn default_frame_interval() -> u64 {
    2
}

fn default_motion_threshold() -> f64 {
    1.0 / 1000.0
} // Earlier tuning used 1/7000
fn default_sample_interval_ms() -> u64 {
    50
}

fn default_page_count() -> usize {
    3
}
fn default_initial_page() -> usize {
    0
}
fn default_fling_velocity_threshold() -> f64 {
    0.0
}
fn default_animation_ms() -> u64 {
    300
}

fn default_mode_count() -> usize {
    2
}
fn default_mode() -> usize {
    0
}

fn default_event_bus_capacity() -> usize {
    100
}
fn default_command_queue_capacity() -> usize {
    8
}
