/// The control loop tying input, observation polling and the display together
use futures_util::future::OptionFuture;
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, timeout, Duration, Instant};

use crate::config::Timings;
use crate::display::{
    BacklightController, BacklightInput, BacklightSink, DisplaySink, DisplayStateMachine,
    HardwareError, MessageSet, Screen,
};
use crate::input::InputQueue;
use crate::models::{DisplayState, ErrorCondition};
use crate::observation::{
    clamp_observation, missing_fields, FetchError, ObservationSource, RawReading,
};
use crate::utils::now_local;

type FetchResult = Result<RawReading, FetchError>;

/// Outcome of the most recent fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataStatus {
    Unknown,
    Available,
    Unavailable,
}

/// Reject readings that lack any of the required fields
fn validate(raw: RawReading) -> FetchResult {
    let missing = missing_fields(&raw);
    if missing.is_empty() {
        Ok(raw)
    } else {
        Err(FetchError::Incomplete(missing))
    }
}

/// Step a deadline by `delta`, skipping ticks that were missed entirely
fn next_deadline(deadline: Instant, delta: Duration, now: Instant) -> Instant {
    let next = deadline + delta;
    if next <= now {
        now + delta
    } else {
        next
    }
}

pub struct Coordinator<D, B, S> {
    timings: Timings,
    queue: InputQueue,
    display: D,
    backlight: BacklightController<B>,
    machine: DisplayStateMachine,
    source: Arc<S>,
    address: String,
    messages: MessageSet,
    condition: ErrorCondition,
    data: DataStatus,
    rendered: Option<(Screen, String)>,
    fetch: Option<JoinHandle<FetchResult>>,
    fast_deadline: Instant,
    slow_deadline: Instant,
}

impl<D, B, S> Coordinator<D, B, S>
where
    D: DisplaySink,
    B: BacklightSink,
    S: ObservationSource,
{
    /// Take ownership of the hardware and start on the informational splash.
    /// Both ticks are due immediately.
    pub fn new(
        display: D,
        backlight: B,
        source: S,
        queue: InputQueue,
        address: impl Into<String>,
        timings: Timings,
    ) -> Result<Self, HardwareError> {
        let now = Instant::now();
        let address = address.into();

        Ok(Coordinator {
            timings,
            queue,
            display,
            backlight: BacklightController::new(backlight, timings.backlight_timeout, now)?,
            machine: DisplayStateMachine::new(timings.scroll_interval, now),
            source: Arc::new(source),
            messages: MessageSet::without_data(&address),
            address,
            condition: ErrorCondition::ShowInformational,
            data: DataStatus::Unknown,
            rendered: None,
            fetch: None,
            fast_deadline: now,
            slow_deadline: now,
        })
    }

    pub fn state(&self) -> DisplayState {
        self.machine.state()
    }

    pub fn condition(&self) -> ErrorCondition {
        self.condition
    }

    #[cfg(test)]
    pub fn messages(&self) -> &MessageSet {
        &self.messages
    }

    #[cfg(test)]
    pub fn backlight_on(&self) -> bool {
        self.backlight.is_on()
    }

    /// Run until `shutdown` resolves or a hardware primitive fails, then
    /// release the hardware.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), HardwareError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Display coordinator started");

        let result = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break Ok(()),
                Some(joined) = OptionFuture::from(self.fetch.as_mut()), if self.fetch.is_some() => {
                    self.fetch = None;
                    let result = joined.unwrap_or_else(|e| {
                        warn!("Fetch task failed: {}", e);
                        Err(FetchError::Aborted)
                    });
                    self.apply_fetch(result);
                }
                _ = sleep_until(self.fast_deadline) => {
                    let now = Instant::now();
                    if let Err(e) = self.fast_tick(now) {
                        break Err(e);
                    }
                    self.fast_deadline = next_deadline(self.fast_deadline, self.timings.fast_tick, now);
                }
                _ = sleep_until(self.slow_deadline) => {
                    let now = Instant::now();
                    self.request_fetch();
                    self.slow_deadline = next_deadline(self.slow_deadline, self.timings.slow_tick, now);
                }
            }
        };

        let teardown = self.shutdown();
        info!(
            "Display coordinator stopped in {:?} ({:?})",
            self.state(),
            self.condition()
        );
        result.and(teardown)
    }

    /// Drain input, update backlight and state, redraw when needed
    pub fn fast_tick(&mut self, now: Instant) -> Result<(), HardwareError> {
        let events = self.queue.drain();
        let events = match self.backlight.on_input(now, events.len())? {
            BacklightInput::Forward => events,
            BacklightInput::Consumed => Vec::new(),
        };

        if self.machine.handle_events(&events, now) {
            self.acknowledge();
        }
        if events.is_empty() {
            self.machine.tick(now);
        }

        self.backlight.on_tick(now)?;
        self.render()
    }

    /// `Error` was left through AcknowledgeError
    fn acknowledge(&mut self) {
        match self.condition {
            ErrorCondition::ShowInformational => {
                if self.data == DataStatus::Unavailable {
                    info!("Acknowledged splash, no data available");
                    self.condition = ErrorCondition::NoDataPoints;
                    self.machine.force_error();
                } else {
                    self.condition = ErrorCondition::None;
                }
            }
            ErrorCondition::NoDataPoints => {
                debug!("Acknowledged no data, forcing a refresh");
                self.request_fetch();
            }
            ErrorCondition::None => {}
        }
    }

    /// Start a fetch unless one is already in flight
    pub fn request_fetch(&mut self) {
        if self.fetch.is_some() {
            debug!("Fetch already in flight, skipping");
            return;
        }

        let source = Arc::clone(&self.source);
        let limit = self.timings.fetch_timeout;
        self.fetch = Some(tokio::spawn(async move {
            match timeout(limit, source.latest()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout),
            }
        }));
    }

    /// Recompute the whole MessageSet from a fetch outcome
    pub fn apply_fetch(&mut self, result: FetchResult) {
        match result.and_then(validate) {
            Ok(raw) => {
                let observation = clamp_observation(&raw);
                debug!("Observation: {:?}", observation);
                self.messages = MessageSet::from_observation(&observation, &self.address, &now_local());
                self.data = DataStatus::Available;

                if self.condition == ErrorCondition::NoDataPoints {
                    info!("Observation data restored");
                    self.condition = ErrorCondition::None;
                    self.machine.recover();
                }
            }
            Err(e) => {
                warn!("No data points: {}", e);
                self.messages = MessageSet::without_data(&self.address);
                self.data = DataStatus::Unavailable;

                // The splash stays up; the failure surfaces once acknowledged
                if self.condition != ErrorCondition::ShowInformational {
                    self.condition = ErrorCondition::NoDataPoints;
                    self.machine.force_error();
                }
            }
        }
    }

    fn render(&mut self) -> Result<(), HardwareError> {
        let screen = self.machine.screen(self.condition);
        let text = self.messages.text(screen);

        let (screen_changed, text_changed) = match &self.rendered {
            Some((last_screen, last_text)) => (*last_screen != screen, last_text != text),
            None => (true, true),
        };
        if !self.machine.needs_render(screen_changed) && !text_changed {
            return Ok(());
        }

        debug!("Rendering {:?} ({:?})", self.machine.state(), screen);
        self.display.clear()?;
        self.display.write(text)?;
        self.rendered = Some((screen, text.to_string()));
        self.machine.mark_rendered();
        Ok(())
    }

    /// Teardown: drop any in-flight fetch, dim, blank the screen
    pub fn shutdown(&mut self) -> Result<(), HardwareError> {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        let backlight = self.backlight.shutdown();
        let display = self.display.clear();
        backlight.and(display)
    }
}
