use thiserror::Error;

#[derive(Error, Debug)]
pub enum GesturenavError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },

    #[error("{component} unavailable: {details}")]
    SourceUnavailable { component: String, details: String },

    #[error("Gesture mode {mode} out of range (supported modes: {mode_count})")]
    InvalidMode { mode: usize, mode_count: usize },

    #[error("Classification failed: {details}")]
    Classification { details: String },

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Event channel closed")]
    ChannelClosed,
}

impl GesturenavError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn unavailable<S: Into<String>>(component: S, details: S) -> Self {
        Self::SourceUnavailable {
            component: component.into(),
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GesturenavError>;
