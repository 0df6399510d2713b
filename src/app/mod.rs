pub mod keyboard_input;

mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use keyboard_input::{KeyAction, KeyboardInputHandler, SimulatorControls};
pub use orchestrator::GesturenavApp;
pub use types::{ComponentState, ShutdownReason};
