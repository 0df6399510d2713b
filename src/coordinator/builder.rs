use super::handle::CoordinatorHandle;
use super::intake::SampleIntake;
use super::session::{NavigationCoordinator, SourceStatus};
use super::stats::CoordinatorStats;
use crate::classifier::{ClassifierAdapter, GestureClassifier};
use crate::config::GesturenavConfig;
use crate::devices::{CameraPipeline, MotionSource, ScrollView};
use crate::error::{GesturenavError, Result};
use crate::events::EventBus;
use crate::frame::{FrameConverter, RawFrameConverter};
use crate::orientation::OrientationSynchronizer;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// Builder wiring the coordinator to its collaborators
pub struct NavigationCoordinatorBuilder {
    config: Option<GesturenavConfig>,
    event_bus: Option<Arc<EventBus>>,
    camera: Option<Box<dyn CameraPipeline>>,
    motion_source: Option<Box<dyn MotionSource>>,
    scroll_view: Option<Box<dyn ScrollView>>,
    classifier: Option<Box<dyn GestureClassifier>>,
    converter: Option<Box<dyn FrameConverter>>,
}

impl NavigationCoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            event_bus: None,
            camera: None,
            motion_source: None,
            scroll_view: None,
            classifier: None,
            converter: None,
        }
    }

    pub fn config(mut self, config: GesturenavConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn camera<C: CameraPipeline + 'static>(mut self, camera: C) -> Self {
        self.camera = Some(Box::new(camera));
        self
    }

    pub fn motion_source<M: MotionSource + 'static>(mut self, motion_source: M) -> Self {
        self.motion_source = Some(Box::new(motion_source));
        self
    }

    pub fn scroll_view<S: ScrollView + 'static>(mut self, scroll_view: S) -> Self {
        self.scroll_view = Some(Box::new(scroll_view));
        self
    }

    pub fn classifier<G: GestureClassifier + 'static>(mut self, classifier: G) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub fn converter<F: FrameConverter + 'static>(mut self, converter: F) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    pub fn build(self) -> Result<(NavigationCoordinator, CoordinatorHandle)> {
        let config = self
            .config
            .ok_or_else(|| GesturenavError::system("Coordinator configuration must be specified"))?;
        config.validate()?;

        let camera = self
            .camera
            .ok_or_else(|| GesturenavError::system("A camera pipeline must be specified"))?;
        let motion_source = self
            .motion_source
            .ok_or_else(|| GesturenavError::system("A motion source must be specified"))?;
        let scroll_view = self
            .scroll_view
            .ok_or_else(|| GesturenavError::system("A scroll view must be specified"))?;
        let classifier = self
            .classifier
            .ok_or_else(|| GesturenavError::system("A gesture classifier must be specified"))?;

        let event_bus = self
            .event_bus
            .unwrap_or_else(|| Arc::new(EventBus::new(config.system.event_bus_capacity)));
        let converter = self
            .converter
            .unwrap_or_else(|| Box::new(RawFrameConverter) as Box<dyn FrameConverter>);

        let (sender, receiver) = mpsc::channel(config.system.command_queue_capacity);
        let (gate, navigator) = NavigationCoordinator::components(&config);

        debug!(
            "Building coordinator: {} pages, throttle 1/{}, motion threshold {}",
            config.navigation.page_count, config.throttle.frame_interval, config.motion.threshold
        );

        let coordinator = NavigationCoordinator {
            session_id: Uuid::new_v4(),
            intake: Arc::new(SampleIntake::new(config.throttle.frame_interval)),
            gate,
            classifier: ClassifierAdapter::new(classifier),
            converter,
            navigator,
            orientation: OrientationSynchronizer::new(),
            camera,
            motion_source,
            scroll_view,
            event_bus,
            mode: config.classifier.default_mode,
            mode_count: config.classifier.mode_count,
            sender,
            receiver: Some(receiver),
            stats: Arc::new(Mutex::new(CoordinatorStats::default())),
            cancellation_token: CancellationToken::new(),
            sources: SourceStatus::default(),
        };

        let handle = coordinator.handle();
        Ok((coordinator, handle))
    }
}

impl Default for NavigationCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
