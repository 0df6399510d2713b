use crate::devices::CameraPipeline;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Orientation of the user interface as reported on layout changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceOrientation {
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Physical device orientation from the accelerometer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceOrientation {
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
}

/// Orientation the camera stamps on captured frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl From<InterfaceOrientation> for CaptureOrientation {
    fn from(orientation: InterfaceOrientation) -> Self {
        match orientation {
            InterfaceOrientation::Unknown => CaptureOrientation::Portrait,
            InterfaceOrientation::Portrait => CaptureOrientation::Portrait,
            InterfaceOrientation::PortraitUpsideDown => CaptureOrientation::PortraitUpsideDown,
            InterfaceOrientation::LandscapeLeft => CaptureOrientation::LandscapeLeft,
            InterfaceOrientation::LandscapeRight => CaptureOrientation::LandscapeRight,
        }
    }
}

// Device landscape sides are mirrored relative to the interface
impl From<DeviceOrientation> for CaptureOrientation {
    fn from(orientation: DeviceOrientation) -> Self {
        match orientation {
            DeviceOrientation::PortraitUpsideDown => CaptureOrientation::PortraitUpsideDown,
            DeviceOrientation::LandscapeLeft => CaptureOrientation::LandscapeRight,
            DeviceOrientation::LandscapeRight => CaptureOrientation::LandscapeLeft,
            DeviceOrientation::Unknown
            | DeviceOrientation::Portrait
            | DeviceOrientation::FaceUp
            | DeviceOrientation::FaceDown => CaptureOrientation::Portrait,
        }
    }
}

impl CaptureOrientation {
    /// Clockwise rotation a preview needs to show frames upright
    pub fn degrees(&self) -> u16 {
        match self {
            CaptureOrientation::Portrait => 0,
            CaptureOrientation::LandscapeRight => 90,
            CaptureOrientation::PortraitUpsideDown => 180,
            CaptureOrientation::LandscapeLeft => 270,
        }
    }
}

/// Keeps the camera's capture orientation in line with the interface
#[derive(Debug, Default)]
pub struct OrientationSynchronizer {
    applied: Option<CaptureOrientation>,
}

impl OrientationSynchronizer {
    pub fn new() -> Self {
        Self { applied: None }
    }

    pub fn applied(&self) -> Option<CaptureOrientation> {
        self.applied
    }

    /// Called on every layout change. Returns the orientation pushed to the
    /// camera, or `None` when it already had it.
    pub fn sync(
        &mut self,
        orientation: InterfaceOrientation,
        camera: &mut dyn CameraPipeline,
    ) -> Option<CaptureOrientation> {
        debug!("Layout changed, interface orientation {:?}", orientation);
        self.apply(orientation.into(), camera)
    }

    /// Align capture with the physical device, used when capture starts
    pub fn sync_device(
        &mut self,
        orientation: DeviceOrientation,
        camera: &mut dyn CameraPipeline,
    ) -> Option<CaptureOrientation> {
        debug!("Device rotated to {:?}", orientation);
        self.apply(orientation.into(), camera)
    }

    fn apply(
        &mut self,
        capture: CaptureOrientation,
        camera: &mut dyn CameraPipeline,
    ) -> Option<CaptureOrientation> {
        if self.applied == Some(capture) {
            return None;
        }

        info!("Setting capture orientation to {:?}", capture);
        camera.set_orientation(capture);
        self.applied = Some(capture);
        Some(capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{CameraPipeline, SyntheticCamera};

    #[test]
    fn test_interface_mapping() {
        use InterfaceOrientation::*;
        let cases = [
            (Unknown, CaptureOrientation::Portrait),
            (Portrait, CaptureOrientation::Portrait),
            (PortraitUpsideDown, CaptureOrientation::PortraitUpsideDown),
            (LandscapeLeft, CaptureOrientation::LandscapeLeft),
            (LandscapeRight, CaptureOrientation::LandscapeRight),
        ];
        for (interface, capture) in cases {
            assert_eq!(CaptureOrientation::from(interface), capture);
        }
    }

    #[test]
    fn test_device_mapping_swaps_landscape() {
        use DeviceOrientation::*;
        assert_eq!(CaptureOrientation::from(LandscapeLeft), CaptureOrientation::LandscapeRight);
        assert_eq!(CaptureOrientation::from(LandscapeRight), CaptureOrientation::LandscapeLeft);
        assert_eq!(CaptureOrientation::from(FaceUp), CaptureOrientation::Portrait);
        assert_eq!(CaptureOrientation::from(FaceDown), CaptureOrientation::Portrait);
        assert_eq!(CaptureOrientation::from(Unknown), CaptureOrientation::Portrait);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut camera = SyntheticCamera::new(30, (64, 48));
        let mut sync = OrientationSynchronizer::new();

        assert_eq!(
            sync.sync(InterfaceOrientation::LandscapeLeft, &mut camera),
            Some(CaptureOrientation::LandscapeLeft)
        );
        assert_eq!(sync.sync(InterfaceOrientation::LandscapeLeft, &mut camera), None);

        assert_eq!(camera.current_preview_orientation(), CaptureOrientation::LandscapeLeft);
        assert_eq!(camera.orientation_updates(), 1);
    }

    #[test]
    fn test_unknown_after_portrait_is_a_noop() {
        let mut camera = SyntheticCamera::new(30, (64, 48));
        let mut sync = OrientationSynchronizer::new();

        sync.sync(InterfaceOrientation::Portrait, &mut camera);
        assert_eq!(sync.sync(InterfaceOrientation::Unknown, &mut camera), None);
        assert_eq!(sync.sync_device(DeviceOrientation::FaceUp, &mut camera), None);
        assert_eq!(camera.orientation_updates(), 1);

        sync.sync_device(DeviceOrientation::LandscapeLeft, &mut camera);
        assert_eq!(sync.applied(), Some(CaptureOrientation::LandscapeRight));
        assert_eq!(camera.orientation_updates(), 2);
    }
}
