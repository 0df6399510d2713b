use crate::classifier::GestureVerdict;
use crate::error::EventBusError;
use crate::navigation::NavigationPhase;
use crate::orientation::CaptureOrientation;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Notifications published by the coordinator to the UI layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NavigationEvent {
    /// The current page changed
    PageChanged {
        page: usize,
        previous: usize,
        timestamp: SystemTime,
    },
    /// A classified gesture reached the state machine
    GestureRecognized {
        verdict: GestureVerdict,
        mode: usize,
        timestamp: SystemTime,
    },
    /// The scroll interaction phase changed
    PhaseChanged {
        from: NavigationPhase,
        to: NavigationPhase,
        timestamp: SystemTime,
    },
    /// Gesture input was enabled or suppressed
    GateChanged { allowed: bool, timestamp: SystemTime },
    /// The classifier mode selector changed
    ModeChanged { mode: usize, timestamp: SystemTime },
    /// The camera capture orientation was updated
    OrientationChanged {
        orientation: CaptureOrientation,
        timestamp: SystemTime,
    },
    /// A camera or motion source became available or failed to start
    SourceStatus {
        component: String,
        available: bool,
        timestamp: SystemTime,
    },
    /// A system error occurred in a component
    SystemError { component: String, error: String },
    /// System shutdown requested
    ShutdownRequested {
        timestamp: SystemTime,
        reason: String,
    },
}

impl NavigationEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> SystemTime {
        match self {
            NavigationEvent::PageChanged { timestamp, .. } => *timestamp,
            NavigationEvent::GestureRecognized { timestamp, .. } => *timestamp,
            NavigationEvent::PhaseChanged { timestamp, .. } => *timestamp,
            NavigationEvent::GateChanged { timestamp, .. } => *timestamp,
            NavigationEvent::ModeChanged { timestamp, .. } => *timestamp,
            NavigationEvent::OrientationChanged { timestamp, .. } => *timestamp,
            NavigationEvent::SourceStatus { timestamp, .. } => *timestamp,
            NavigationEvent::SystemError { .. } => SystemTime::now(),
            NavigationEvent::ShutdownRequested { timestamp, .. } => *timestamp,
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            NavigationEvent::PageChanged { page, previous, .. } => {
                format!("Page changed {} -> {}", previous, page)
            }
            NavigationEvent::GestureRecognized { verdict, mode, .. } => {
                format!("Gesture {:?} recognized (mode {})", verdict, mode)
            }
            NavigationEvent::PhaseChanged { from, to, .. } => {
                format!("Phase {:?} -> {:?}", from, to)
            }
            NavigationEvent::GateChanged { allowed, .. } => format!(
                "Gesture input {}",
                if *allowed { "enabled" } else { "suppressed" }
            ),
            NavigationEvent::ModeChanged { mode, .. } => format!("Gesture mode set to {}", mode),
            NavigationEvent::OrientationChanged { orientation, .. } => {
                format!("Capture orientation {:?}", orientation)
            }
            NavigationEvent::SourceStatus {
                component,
                available,
                ..
            } => format!(
                "{} {}",
                component,
                if *available { "available" } else { "unavailable" }
            ),
            NavigationEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
            NavigationEvent::ShutdownRequested { reason, .. } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            NavigationEvent::PageChanged { .. } => "page_changed",
            NavigationEvent::GestureRecognized { .. } => "gesture_recognized",
            NavigationEvent::PhaseChanged { .. } => "phase_changed",
            NavigationEvent::GateChanged { .. } => "gate_changed",
            NavigationEvent::ModeChanged { .. } => "mode_changed",
            NavigationEvent::OrientationChanged { .. } => "orientation_changed",
            NavigationEvent::SourceStatus { .. } => "source_status",
            NavigationEvent::SystemError { .. } => "system_error",
            NavigationEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Broadcast bus connecting the coordinator with UI listeners
pub struct EventBus {
    sender: broadcast::Sender<NavigationEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.sender.subscribe()
    }

    /// Subscribe with a filter
    pub fn subscribe_filtered(&self, filter: EventFilter, name: &str) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe(), filter, name.to_string())
    }

    /// Publish an event to all subscribers
    pub async fn publish(&self, event: NavigationEvent) -> Result<usize, EventBusError> {
        match &event {
            NavigationEvent::PageChanged { page, previous, .. } => {
                info!("Page changed {} -> {}", previous, page);
            }
            NavigationEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            NavigationEvent::SourceStatus {
                component,
                available,
                ..
            } => {
                if *available {
                    info!("{} available", component);
                } else {
                    warn!("{} unavailable, gesture navigation inert", component);
                }
            }
            NavigationEvent::ShutdownRequested { reason, .. } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => debug!("Event: {}", event.description()),
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    All,
    EventTypes(Vec<&'static str>),
    Custom(fn(&NavigationEvent) -> bool),
}

impl EventFilter {
    pub fn matches(&self, event: &NavigationEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::Custom(filter_fn) => filter_fn(event),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<NavigationEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    pub fn new(
        receiver: broadcast::Receiver<NavigationEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<NavigationEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Page notifications are level-like; keep reading
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<NavigationEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_event_bus_basic_operations() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let subscriber_count = event_bus
            .publish(NavigationEvent::PageChanged {
                page: 2,
                previous: 1,
                timestamp: SystemTime::now(),
            })
            .await
            .unwrap();
        assert_eq!(subscriber_count, 1);

        match receiver.recv().await.unwrap() {
            NavigationEvent::PageChanged { page, previous, .. } => {
                assert_eq!((page, previous), (2, 1));
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_fails() {
        let event_bus = EventBus::new(10);
        let result = event_bus
            .publish(NavigationEvent::ModeChanged {
                mode: 1,
                timestamp: SystemTime::now(),
            })
            .await;
        assert!(result.is_err());
        assert!(!event_bus.has_subscribers());
    }

    #[tokio::test]
    async fn test_filtered_receiver() {
        let event_bus = EventBus::new(10);
        let mut pages =
            event_bus.subscribe_filtered(EventFilter::EventTypes(vec!["page_changed"]), "pages");

        event_bus
            .publish(NavigationEvent::GateChanged {
                allowed: true,
                timestamp: SystemTime::now(),
            })
            .await
            .unwrap();
        event_bus
            .publish(NavigationEvent::PageChanged {
                page: 1,
                previous: 0,
                timestamp: SystemTime::now(),
            })
            .await
            .unwrap();

        let event = timeout(Duration::from_millis(100), pages.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type(), "page_changed");
        assert!(pages.try_recv().unwrap().is_none());
    }

    #[test]
    fn test_event_serializes_to_json() {
        let event = NavigationEvent::GestureRecognized {
            verdict: GestureVerdict::Left,
            mode: 0,
            timestamp: SystemTime::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("GestureRecognized"));
        assert!(json.contains("Left"));
    }
}
