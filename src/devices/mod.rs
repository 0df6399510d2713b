mod camera;
mod interface;
mod motion;
mod scroll;
#[cfg(test)]
mod tests;

pub use camera::SyntheticCamera;
pub use interface::{CameraPipeline, MotionSource, ScrollView};
pub use motion::SimulatedMotionSource;
pub use scroll::SimulatedScrollView;
