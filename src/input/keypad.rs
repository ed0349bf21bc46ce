/// Keypad sources that fire a callback per logical button
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::display::HardwareError;
use crate::models::Button;

pub type Callback = Box<dyn FnMut() + Send>;

/// Edge-triggered button input
pub trait Keypad {
    /// Call `callback` on each press of `button`, at most once per `debounce`
    fn register(
        &mut self,
        button: Button,
        debounce: Duration,
        callback: Callback,
    ) -> Result<(), HardwareError>;

    /// Stop delivering presses for every button
    fn deregister_all(&mut self) -> Result<(), HardwareError>;
}

/// Suppresses repeat edges inside the debounce window
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer { window, last: None }
    }

    pub fn fire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

struct Registration {
    debouncer: Debouncer,
    callback: Callback,
}

type Registry = Arc<Mutex<HashMap<Button, Registration>>>;

/// Keypad driven by keys typed on the terminal
///
/// `p`/`h` = Prev, `n`/`l` = Next, `s` = ToggleScroll, `a` = AcknowledgeError.
/// Each key is one edge; presses are read on a dedicated thread which plays
/// the part of the interrupt context.
#[derive(Default)]
pub struct StdinKeypad {
    registry: Registry,
    reader: Option<thread::JoinHandle<()>>,
}

impl StdinKeypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button_for_key(key: char) -> Option<Button> {
        match key.to_ascii_lowercase() {
            'p' | 'h' => Some(Button::Prev),
            'n' | 'l' => Some(Button::Next),
            's' => Some(Button::ToggleScroll),
            'a' => Some(Button::AcknowledgeError),
            _ => None,
        }
    }

    fn dispatch(registry: &Registry, button: Button, now: Instant) {
        let mut handlers = registry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(registration) = handlers.get_mut(&button) {
            if registration.debouncer.fire(now) {
                (registration.callback)();
            } else {
                debug!("Debounced {:?}", button);
            }
        }
    }

    fn start_reader(&mut self) -> Result<(), HardwareError> {
        if self.reader.is_some() {
            return Ok(());
        }

        let registry = Arc::clone(&self.registry);
        let handle = thread::Builder::new()
            .name("keypad".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!("Keypad read failed: {}", e);
                            break;
                        }
                    };
                    for button in line.chars().filter_map(StdinKeypad::button_for_key) {
                        StdinKeypad::dispatch(&registry, button, Instant::now());
                    }
                }
                info!("Keypad input closed");
            })
            .map_err(|e| HardwareError::new("keypad", e.to_string()))?;

        self.reader = Some(handle);
        Ok(())
    }
}

impl Keypad for StdinKeypad {
    fn register(
        &mut self,
        button: Button,
        debounce: Duration,
        callback: Callback,
    ) -> Result<(), HardwareError> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                button,
                Registration {
                    debouncer: Debouncer::new(debounce),
                    callback,
                },
            );
        self.start_reader()
    }

    fn deregister_all(&mut self) -> Result<(), HardwareError> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        // The reader thread blocks on stdin and dies with the process
        Ok(())
    }
}
