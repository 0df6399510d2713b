use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Pixel layouts a camera pipeline may deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    /// 32-bit BGRA, the layout front cameras typically hand out
    Bgra32,
    /// RGB24 format - uncompressed RGB data
    Rgb24,
    /// 8-bit grayscale
    Gray8,
}

impl FrameFormat {
    /// Get bytes per pixel for the format
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Bgra32 => 4,
            FrameFormat::Rgb24 => 3,
            FrameFormat::Gray8 => 1,
        }
    }
}

/// One camera frame as delivered by the capture callback
#[derive(Debug, Clone)]
pub struct FrameSample {
    /// Sequence number assigned by the camera pipeline
    pub sequence: u64,
    /// Timestamp when frame was captured
    pub timestamp: SystemTime,
    /// Raw frame data (shared ownership for efficiency)
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
}

impl FrameSample {
    pub fn new(sequence: u64, data: Vec<u8>, width: u32, height: u32, format: FrameFormat) -> Self {
        Self {
            sequence,
            timestamp: SystemTime::now(),
            data: Arc::new(data),
            width,
            height,
            format,
        }
    }

    /// Blank frame of the right size, used by synthetic sources
    pub fn blank(sequence: u64, width: u32, height: u32, format: FrameFormat) -> Self {
        let size = width as usize * height as usize * format.bytes_per_pixel();
        Self::new(sequence, vec![0; size], width, height, format)
    }

    pub fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    /// Validate frame data size against expected size
    pub fn validate_size(&self) -> bool {
        self.data.len() == self.expected_size()
    }

    /// Get frame age in milliseconds
    pub fn age_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.timestamp)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Image handed to the gesture classifier
#[derive(Debug, Clone)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
    pub pixels: Arc<Vec<u8>>,
}

/// Turns a raw capture buffer into a classifier-ready image
pub trait FrameConverter: Send + Sync {
    fn convert(&self, frame: &FrameSample) -> Option<FrameImage>;
}

/// Shares the capture buffer as-is after checking its size
#[derive(Debug, Default, Clone, Copy)]
pub struct RawFrameConverter;

impl FrameConverter for RawFrameConverter {
    fn convert(&self, frame: &FrameSample) -> Option<FrameImage> {
        if !frame.validate_size() {
            debug!(
                "Frame {} has {} bytes, expected {} for {}x{} {:?}",
                frame.sequence,
                frame.data.len(),
                frame.expected_size(),
                frame.width,
                frame.height,
                frame.format
            );
            return None;
        }

        Some(FrameImage {
            width: frame.width,
            height: frame.height,
            format: frame.format,
            pixels: Arc::clone(&frame.data),
        })
    }
}
