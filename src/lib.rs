pub mod app;
pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod devices;
pub mod error;
pub mod events;
pub mod frame;
pub mod motion;
pub mod navigation;
pub mod orientation;
pub mod throttle;

pub use app::{ComponentState, GesturenavApp, ShutdownReason};
pub use classifier::{ClassifierAdapter, GestureClassifier, GestureVerdict, ScriptedClassifier};
pub use config::GesturenavConfig;
pub use coordinator::{
    CoordinatorHandle, CoordinatorStats, NavigationCoordinator, NavigationCoordinatorBuilder,
    SourceStatus,
};
pub use devices::{
    CameraPipeline, MotionSource, ScrollView, SimulatedMotionSource, SimulatedScrollView,
    SyntheticCamera,
};
pub use error::{EventBusError, GesturenavError, Result};
pub use events::{EventBus, EventFilter, EventReceiver, NavigationEvent};
pub use frame::{FrameConverter, FrameFormat, FrameImage, FrameSample, RawFrameConverter};
pub use motion::{MotionGate, MotionSample};
pub use navigation::{NavigationIntent, NavigationPhase, NavigationState, PageNavigator, Transition};
pub use orientation::{
    CaptureOrientation, DeviceOrientation, InterfaceOrientation, OrientationSynchronizer,
};
pub use throttle::FrameThrottle;
