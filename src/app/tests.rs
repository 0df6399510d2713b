use super::*;
use crate::classifier::GestureVerdict;
use crate::config::GesturenavConfig;
use crate::events::{EventFilter, NavigationEvent};
use std::time::{Duration, SystemTime};
use tokio::time::{sleep, timeout};

fn create_test_config() -> GesturenavConfig {
    let mut config = GesturenavConfig::default();
    config.camera.fps = 100;
    config.camera.resolution = (8, 8);
    config.throttle.frame_interval = 1;
    config.motion.sample_interval_ms = 5;
    config.navigation.animation_ms = 10;
    config.system.command_queue_capacity = 32;
    config
}

#[tokio::test]
async fn test_app_creation() {
    let app = GesturenavApp::new(create_test_config()).unwrap();

    assert!(app.get_all_component_states().await.is_empty());
    assert_eq!(app.stats().frames_received, 0);
    assert_eq!(app.config().navigation.page_count, 3);
    assert!(!app.camera().is_capturing());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let mut config = create_test_config();
    config.navigation.initial_page = 5;
    assert!(GesturenavApp::new(config).is_err());
}

#[tokio::test]
async fn test_initialize_registers_components() {
    let mut app = GesturenavApp::new(create_test_config()).unwrap();
    app.initialize().await.unwrap();

    let states = app.get_all_component_states().await;
    assert_eq!(states.len(), 4);
    assert!(states.values().all(|state| *state == ComponentState::Stopped));
    assert_eq!(app.get_component_state("keyboard").await, None);
}

#[tokio::test]
async fn test_component_state_tracking() {
    let app = GesturenavApp::new(create_test_config()).unwrap();

    app.set_component_state("camera", ComponentState::Starting)
        .await;
    assert_eq!(
        app.get_component_state("camera").await,
        Some(ComponentState::Starting)
    );

    app.set_component_state("camera", ComponentState::Degraded)
        .await;
    app.set_component_state("motion", ComponentState::Failed)
        .await;
    app.set_component_state("coordinator", ComponentState::Running)
        .await;

    assert_eq!(app.unhealthy_components().await, vec!["camera", "motion"]);
}

#[tokio::test]
async fn test_start_twice_fails() {
    let mut app = GesturenavApp::new(create_test_config()).unwrap();
    app.initialize().await.unwrap();

    let status = app.start().await.unwrap();
    assert!(status.initialized());
    assert!(app.start().await.is_err());

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_gesture_session_lifecycle() {
    let mut app = GesturenavApp::new(create_test_config()).unwrap();
    let event_bus = app.event_bus();
    let mut pages =
        event_bus.subscribe_filtered(EventFilter::EventTypes(vec!["page_changed"]), "test");

    app.initialize().await.unwrap();
    app.start().await.unwrap();
    assert_eq!(
        app.get_component_state("coordinator").await,
        Some(ComponentState::Running)
    );

    app.classifier().push(GestureVerdict::Right);
    let event = timeout(Duration::from_secs(2), pages.recv())
        .await
        .expect("page change in time")
        .unwrap();
    assert!(matches!(
        event,
        NavigationEvent::PageChanged { page: 1, .. }
    ));

    // Let the page animation settle before quitting
    sleep(Duration::from_millis(50)).await;
    assert_eq!(app.scroll_view().animations(), vec![1.0]);

    let (exit_code, _) = tokio::join!(app.run(), async {
        sleep(Duration::from_millis(50)).await;
        event_bus
            .publish(NavigationEvent::ShutdownRequested {
                timestamp: SystemTime::now(),
                reason: "test".to_string(),
            })
            .await
            .unwrap();
    });

    assert_eq!(exit_code.unwrap(), 0);
    assert_eq!(app.stats().page_changes, 1);
    assert!(app.stats().frames_classified > 0);
    assert_eq!(
        app.get_component_state("coordinator").await,
        Some(ComponentState::Stopped)
    );
    assert!(app.unhealthy_components().await.is_empty());
}

#[tokio::test]
async fn test_coordinator_exit_ends_run() {
    let mut app = GesturenavApp::new(create_test_config()).unwrap();
    app.initialize().await.unwrap();
    app.start().await.unwrap();

    app.handle().shutdown().await.unwrap();
    let exit_code = timeout(Duration::from_secs(2), app.run())
        .await
        .expect("run ends once the coordinator exits")
        .unwrap();
    assert_eq!(exit_code, 0);
}

#[tokio::test]
async fn test_requested_shutdown_before_start() {
    let mut app = GesturenavApp::new(create_test_config()).unwrap();
    app.initialize().await.unwrap();

    assert!(
        app.request_shutdown(ShutdownReason::Error("test".to_string()))
            .await
    );
    // Only one request is delivered
    assert!(!app.request_shutdown(ShutdownReason::CoordinatorExited).await);

    assert_eq!(app.run().await.unwrap(), 0);
    assert!(app.run().await.is_err());
}

#[test]
fn test_shutdown_reason_display() {
    assert_eq!(
        ShutdownReason::Signal("SIGTERM".to_string()).to_string(),
        "received SIGTERM"
    );
    assert_eq!(
        ShutdownReason::UserRequest("quit".to_string()).to_string(),
        "user request (quit)"
    );
    assert!(ShutdownReason::CoordinatorExited
        .to_string()
        .contains("coordinator"));
}
