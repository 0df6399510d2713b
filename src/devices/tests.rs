use super::*;
use crate::classifier::ScriptedClassifier;
use crate::config::GesturenavConfig;
use crate::coordinator::{CoordinatorHandle, NavigationCoordinator, NavigationCoordinatorBuilder};
use crate::events::{EventBus, EventFilter, NavigationEvent};
use crate::navigation::NavigationPhase;
use crate::orientation::CaptureOrientation;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn coordinator_with(
    event_bus: Arc<EventBus>,
    scroll: SimulatedScrollView,
) -> (NavigationCoordinator, CoordinatorHandle) {
    let mut config = GesturenavConfig::default();
    config.system.command_queue_capacity = 64;

    NavigationCoordinatorBuilder::new()
        .config(config)
        .event_bus(event_bus)
        .camera(SyntheticCamera::new(30, (4, 4)))
        .motion_source(SimulatedMotionSource::new(Duration::from_millis(50)))
        .scroll_view(scroll)
        .classifier(ScriptedClassifier::new())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_synthetic_camera_delivers_frames() {
    let (coordinator, handle) =
        coordinator_with(Arc::new(EventBus::new(16)), SimulatedScrollView::new(0));
    let session = tokio::spawn(coordinator.run());

    let mut camera = SyntheticCamera::new(200, (8, 8));
    camera.start(handle.clone()).unwrap();
    assert!(camera.is_capturing());

    sleep(Duration::from_millis(100)).await;
    assert!(camera.frame_count() > 0);

    camera.stop();
    sleep(Duration::from_millis(30)).await;
    assert!(!camera.is_capturing());

    handle.shutdown().await.unwrap();
    let stats = session.await.unwrap().unwrap();
    assert!(stats.frames_received > 0);
    assert_eq!(stats.frames_received, camera.frame_count());
    assert_eq!(
        stats.frames_received,
        stats.frames_throttled + stats.frames_dropped + stats.frames_gated + stats.frames_classified
    );
}

#[tokio::test]
async fn test_unavailable_camera_fails_to_start() {
    let (_coordinator, handle) =
        coordinator_with(Arc::new(EventBus::new(16)), SimulatedScrollView::new(0));

    let mut camera = SyntheticCamera::unavailable();
    let err = camera.start(handle).unwrap_err();
    assert!(err.to_string().contains("camera"));
    assert!(!camera.is_capturing());
    assert_eq!(camera.frame_count(), 0);
}

#[test]
fn test_camera_start_requires_runtime() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (_coordinator, handle) = runtime.block_on(async {
        coordinator_with(Arc::new(EventBus::new(16)), SimulatedScrollView::new(0))
    });

    let mut camera = SyntheticCamera::new(30, (4, 4));
    assert!(camera.start(handle).is_err());
    assert!(!camera.is_capturing());
}

#[test]
fn test_camera_orientation() {
    let mut camera = SyntheticCamera::new(30, (4, 4));
    assert_eq!(camera.current_preview_orientation(), CaptureOrientation::Portrait);

    camera.set_orientation(CaptureOrientation::LandscapeLeft);
    assert_eq!(
        camera.current_preview_orientation(),
        CaptureOrientation::LandscapeLeft
    );
    assert_eq!(camera.orientation_updates(), 1);

    // Clones observe the same device
    let observer = camera.clone();
    assert_eq!(
        observer.current_preview_orientation(),
        CaptureOrientation::LandscapeLeft
    );
}

#[tokio::test]
async fn test_motion_source_reports_energy() {
    let (coordinator, handle) =
        coordinator_with(Arc::new(EventBus::new(16)), SimulatedScrollView::new(0));
    let session = tokio::spawn(coordinator.run());

    let mut motion = SimulatedMotionSource::new(Duration::from_millis(5));
    motion.set_energy(0.5);
    assert_eq!(motion.energy(), 0.5);
    motion.start(handle.clone()).unwrap();

    sleep(Duration::from_millis(60)).await;
    motion.stop();
    let sent = motion.samples_sent();
    assert!(sent > 0);

    handle.shutdown().await.unwrap();
    let stats = session.await.unwrap().unwrap();
    assert_eq!(stats.motion_samples, sent);
}

#[tokio::test]
async fn test_unavailable_motion_source_fails_to_start() {
    let (_coordinator, handle) =
        coordinator_with(Arc::new(EventBus::new(16)), SimulatedScrollView::new(0));

    let mut motion = SimulatedMotionSource::unavailable();
    assert!(motion.start(handle).is_err());
    assert_eq!(motion.samples_sent(), 0);
}

#[test]
fn test_scroll_view_jumps_without_animation() {
    let mut scroll = SimulatedScrollView::new(1);
    assert_eq!(scroll.current_offset(), 1.0);

    scroll.animate_to_offset(2.0);
    assert_eq!(scroll.current_offset(), 2.0);

    scroll.set_offset(0.4);
    assert_eq!(scroll.current_offset(), 0.4);
    assert_eq!(scroll.animations(), vec![2.0]);
}

#[tokio::test]
async fn test_scroll_view_reports_settled_animation() {
    let event_bus = Arc::new(EventBus::new(64));
    let mut phases =
        event_bus.subscribe_filtered(EventFilter::EventTypes(vec!["phase_changed"]), "phases");
    let scroll = SimulatedScrollView::new(0).with_animation(Duration::from_millis(10));

    let (coordinator, handle) = coordinator_with(Arc::clone(&event_bus), scroll.clone());
    scroll.attach(handle.clone());
    let session = tokio::spawn(coordinator.run());

    handle.request_page(2).await.unwrap();

    let mut seen = Vec::new();
    while let Ok(Ok(event)) = timeout(Duration::from_secs(1), phases.recv()).await {
        if let NavigationEvent::PhaseChanged { to, .. } = event {
            seen.push(to);
            if to == NavigationPhase::Idle {
                break;
            }
        }
    }
    assert_eq!(seen, vec![NavigationPhase::Settling, NavigationPhase::Idle]);
    assert_eq!(scroll.current_offset(), 2.0);

    handle.shutdown().await.unwrap();
    session.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_newer_animation_supersedes_older() {
    let mut scroll = SimulatedScrollView::new(0).with_animation(Duration::from_millis(20));
    let (_coordinator, handle) =
        coordinator_with(Arc::new(EventBus::new(16)), scroll.clone());
    scroll.attach(handle);

    scroll.animate_to_offset(1.0);
    scroll.animate_to_offset(2.0);
    assert_eq!(scroll.current_offset(), 0.0);

    sleep(Duration::from_millis(60)).await;
    assert_eq!(scroll.current_offset(), 2.0);
    assert_eq!(scroll.animations(), vec![1.0, 2.0]);

    // A drag in the middle of an animation wins over the pending target
    scroll.animate_to_offset(0.0);
    scroll.set_offset(1.3);
    sleep(Duration::from_millis(60)).await;
    assert_eq!(scroll.current_offset(), 1.3);
}
