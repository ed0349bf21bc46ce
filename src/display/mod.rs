/// Output side of the console: character display, backlight and what is shown
use std::fmt;

pub mod backlight;
pub mod console;
pub mod messages;
pub mod state_machine;

pub use backlight::{BacklightController, BacklightInput};
pub use console::{ConsoleBacklight, ConsoleDisplay};
pub use messages::MessageSet;
pub use state_machine::{DisplayStateMachine, Screen};

/// A display, backlight or keypad primitive failed. Always fatal.
#[derive(Debug)]
pub struct HardwareError {
    pub device: &'static str,
    pub message: String,
}

impl HardwareError {
    pub fn new(device: &'static str, message: impl Into<String>) -> Self {
        HardwareError {
            device,
            message: message.into(),
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.device, self.message)
    }
}

impl std::error::Error for HardwareError {}

/// Character-grid display primitives
pub trait DisplaySink {
    fn clear(&mut self) -> Result<(), HardwareError>;

    /// Write `text` from the top-left corner; `\n` starts the next row
    fn write(&mut self, text: &str) -> Result<(), HardwareError>;
}

/// Backlight power primitive. Only `BacklightController` calls this.
pub trait BacklightSink {
    fn set_power(&mut self, on: bool) -> Result<(), HardwareError>;
}
