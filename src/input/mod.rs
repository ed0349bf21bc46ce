pub mod keypad;
pub mod queue;

pub use keypad::{Keypad, StdinKeypad};
pub use queue::InputQueue;
