/// Backlight idle timeout handling
use log::debug;
use tokio::time::{Duration, Instant};

use crate::display::{BacklightSink, HardwareError};

/// What the state machine should do with a drained batch of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklightInput {
    /// Backlight was already on, pass the events through
    Forward,
    /// Backlight was off; the batch only woke the screen
    Consumed,
}

/// Owns the backlight sink and the idle deadline
///
/// `On` stays on while input keeps arriving before the deadline. The first
/// batch of input after dimming turns the light back on and is swallowed.
pub struct BacklightController<B> {
    sink: B,
    on: bool,
    deadline: Instant,
    timeout: Duration,
}

impl<B: BacklightSink> BacklightController<B> {
    /// Switch the light on and start the idle timer
    pub fn new(mut sink: B, timeout: Duration, now: Instant) -> Result<Self, HardwareError> {
        sink.set_power(true)?;
        Ok(BacklightController {
            sink,
            on: true,
            deadline: now + timeout,
            timeout,
        })
    }

    #[cfg(test)]
    pub fn is_on(&self) -> bool {
        self.on
    }

    #[cfg(test)]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Feed one drained batch; an empty batch is not activity
    pub fn on_input(&mut self, now: Instant, event_count: usize) -> Result<BacklightInput, HardwareError> {
        if event_count == 0 {
            return Ok(BacklightInput::Forward);
        }

        self.deadline = now + self.timeout;
        if self.on {
            return Ok(BacklightInput::Forward);
        }

        self.sink.set_power(true)?;
        self.on = true;
        debug!("Backlight on, {} event(s) consumed as wake", event_count);
        Ok(BacklightInput::Consumed)
    }

    /// Dim once the idle deadline has passed
    pub fn on_tick(&mut self, now: Instant) -> Result<(), HardwareError> {
        if self.on && now > self.deadline {
            self.sink.set_power(false)?;
            self.on = false;
            debug!("Backlight off after idle timeout");
        }
        Ok(())
    }

    /// Teardown: leave the light off regardless of state
    pub fn shutdown(&mut self) -> Result<(), HardwareError> {
        self.on = false;
        self.sink.set_power(false)
    }
}
