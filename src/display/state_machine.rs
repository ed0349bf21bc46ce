/// Which screen the console is in and how button presses move between them
use log::debug;
use tokio::time::{Duration, Instant};

use crate::models::{Button, DisplayState, ErrorCondition, Page};

/// The message a state currently implies. Kept apart from `DisplayState` so
/// that scroll advancement is visible to the render rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Info,
    NoData,
    Page(Page),
}

pub struct DisplayStateMachine {
    state: DisplayState,
    rendered: Option<DisplayState>,
    scroll_cursor: Page,
    scroll_deadline: Instant,
    scroll_interval: Duration,
}

impl DisplayStateMachine {
    /// Starts in `Error`, showing the informational splash
    pub fn new(scroll_interval: Duration, now: Instant) -> Self {
        DisplayStateMachine {
            state: DisplayState::Error,
            rendered: None,
            scroll_cursor: Page::Default,
            scroll_deadline: now,
            scroll_interval,
        }
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    #[cfg(test)]
    pub fn scroll_cursor(&self) -> Page {
        self.scroll_cursor
    }

    /// Apply a drained batch in arrival order.
    ///
    /// Returns true when an `AcknowledgeError` took the machine out of `Error`.
    pub fn handle_events(&mut self, events: &[Button], now: Instant) -> bool {
        let mut acknowledged = false;

        for &button in events {
            let next = match (self.state, button) {
                (DisplayState::Error, Button::AcknowledgeError) => {
                    acknowledged = true;
                    DisplayState::Default
                }
                (DisplayState::Error, _) => DisplayState::Error,
                (DisplayState::Scroll, _) => DisplayState::Default,
                (state, button) => match (state.page(), button) {
                    (Some(page), Button::Prev) => page.prev().state(),
                    (Some(page), Button::Next) => page.next().state(),
                    (Some(_), Button::ToggleScroll) => {
                        self.scroll_cursor = Page::Default;
                        self.scroll_deadline = now;
                        DisplayState::Scroll
                    }
                    _ => state,
                },
            };

            if next != self.state {
                debug!("{:?} --{:?}--> {:?}", self.state, button, next);
                self.state = next;
            }
        }

        acknowledged
    }

    /// Fast tick with no input. Returns true when the scroll cursor moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.state != DisplayState::Scroll || now <= self.scroll_deadline {
            return false;
        }

        self.scroll_cursor = self.scroll_cursor.next();
        self.scroll_deadline = now + self.scroll_interval;
        debug!("Scroll advanced to {:?}", self.scroll_cursor);
        true
    }

    /// No data: `Error` regardless of the current state
    pub fn force_error(&mut self) {
        if self.state != DisplayState::Error {
            debug!("{:?} forced to Error", self.state);
            self.state = DisplayState::Error;
        }
    }

    /// Data is back: leave `Error` for the default page
    pub fn recover(&mut self) {
        if self.state == DisplayState::Error {
            self.state = DisplayState::Default;
        }
    }

    pub fn screen(&self, condition: ErrorCondition) -> Screen {
        match self.state {
            DisplayState::Error => match condition {
                ErrorCondition::ShowInformational => Screen::Info,
                ErrorCondition::NoDataPoints | ErrorCondition::None => Screen::NoData,
            },
            DisplayState::Scroll => Screen::Page(self.scroll_cursor),
            state => state
                .page()
                .map(Screen::Page)
                .unwrap_or(Screen::NoData),
        }
    }

    /// Redraw on a state change, or when `Error`/`Scroll` switched message
    pub fn needs_render(&self, screen_changed: bool) -> bool {
        if self.rendered != Some(self.state) {
            return true;
        }
        screen_changed && matches!(self.state, DisplayState::Error | DisplayState::Scroll)
    }

    pub fn mark_rendered(&mut self) {
        self.rendered = Some(self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_default(now: Instant) -> DisplayStateMachine {
        let mut machine = DisplayStateMachine::new(Duration::from_secs(5), now);
        assert!(machine.handle_events(&[Button::AcknowledgeError], now));
        assert_eq!(machine.state(), DisplayState::Default);
        machine
    }

    #[test]
    fn starts_on_the_informational_splash() {
        let machine = DisplayStateMachine::new(Duration::from_secs(5), Instant::now());
        assert_eq!(machine.state(), DisplayState::Error);
        assert_eq!(machine.screen(ErrorCondition::ShowInformational), Screen::Info);
        assert_eq!(machine.screen(ErrorCondition::NoDataPoints), Screen::NoData);
    }

    #[test]
    fn error_ignores_navigation() {
        let now = Instant::now();
        let mut machine = DisplayStateMachine::new(Duration::from_secs(5), now);
        let acked = machine.handle_events(&[Button::Next, Button::Prev, Button::ToggleScroll], now);
        assert!(!acked);
        assert_eq!(machine.state(), DisplayState::Error);
    }

    #[test]
    fn six_nexts_close_the_cycle() {
        let now = Instant::now();
        let mut machine = at_default(now);
        machine.handle_events(&[Button::Next; 6], now);
        assert_eq!(machine.state(), DisplayState::Default);
    }

    #[test]
    fn next_then_prev_round_trips_from_every_page() {
        let now = Instant::now();
        for start in 0..Page::CYCLE.len() {
            for k in 0..=8 {
                let mut machine = at_default(now);
                machine.handle_events(&vec![Button::Next; start], now);
                let origin = machine.state();

                machine.handle_events(&vec![Button::Next; k], now);
                machine.handle_events(&vec![Button::Prev; k], now);
                assert_eq!(machine.state(), origin, "start {} k {}", start, k);
            }
        }
    }

    #[test]
    fn prev_wraps_from_default_to_timestamp() {
        let now = Instant::now();
        let mut machine = at_default(now);
        machine.handle_events(&[Button::Prev], now);
        assert_eq!(machine.state(), DisplayState::Timestamp);
    }

    #[test]
    fn acknowledge_outside_error_is_a_no_op() {
        let now = Instant::now();
        let mut machine = at_default(now);
        machine.handle_events(&[Button::Next], now);
        assert!(!machine.handle_events(&[Button::AcknowledgeError], now));
        assert_eq!(machine.state(), DisplayState::Today);
    }

    #[test]
    fn toggle_scroll_resets_cursor_after_earlier_navigation() {
        let now = Instant::now();
        let mut machine = at_default(now);
        machine.handle_events(&[Button::Next, Button::Next, Button::ToggleScroll], now);
        assert_eq!(machine.state(), DisplayState::Scroll);
        assert_eq!(machine.scroll_cursor(), Page::Default);
        assert_eq!(
            machine.screen(ErrorCondition::None),
            Screen::Page(Page::Default)
        );
    }

    #[test]
    fn any_button_leaves_scroll_immediately() {
        let now = Instant::now();
        for button in Button::ALL {
            let mut machine = at_default(now);
            machine.handle_events(&[Button::ToggleScroll], now);
            machine.tick(now + Duration::from_secs(1));
            machine.handle_events(&[button], now + Duration::from_millis(1001));
            assert_eq!(machine.state(), DisplayState::Default, "{:?}", button);
        }
    }

    #[test]
    fn scroll_advances_after_each_interval_and_wraps() {
        let t0 = Instant::now();
        let mut machine = at_default(t0);
        machine.handle_events(&[Button::ToggleScroll], t0);

        // deadline was reset to "now", so the first later tick advances
        assert!(!machine.tick(t0));
        assert!(machine.tick(t0 + Duration::from_secs(1)));
        assert_eq!(machine.scroll_cursor(), Page::Today);

        assert!(!machine.tick(t0 + Duration::from_secs(6)));
        assert!(machine.tick(t0 + Duration::from_secs(7)));
        assert_eq!(machine.scroll_cursor(), Page::Pressure);

        let mut t = t0 + Duration::from_secs(7);
        for _ in 0..4 {
            t += Duration::from_secs(6);
            assert!(machine.tick(t));
        }
        assert_eq!(machine.scroll_cursor(), Page::Default);
        assert_eq!(machine.state(), DisplayState::Scroll);
    }

    #[test]
    fn tick_outside_scroll_does_nothing() {
        let now = Instant::now();
        let mut machine = at_default(now);
        assert!(!machine.tick(now + Duration::from_secs(60)));
        assert_eq!(machine.state(), DisplayState::Default);
    }

    #[test]
    fn force_error_overrides_scroll() {
        let now = Instant::now();
        let mut machine = at_default(now);
        machine.handle_events(&[Button::ToggleScroll], now);
        machine.force_error();
        assert_eq!(machine.state(), DisplayState::Error);
        machine.recover();
        assert_eq!(machine.state(), DisplayState::Default);
    }

    #[test]
    fn renders_on_state_change_and_on_scroll_advance_only() {
        let now = Instant::now();
        let mut machine = at_default(now);
        assert!(machine.needs_render(false));
        machine.mark_rendered();
        assert!(!machine.needs_render(false));
        // static page: a changed selection alone does not redraw
        assert!(!machine.needs_render(true));

        machine.handle_events(&[Button::ToggleScroll], now);
        assert!(machine.needs_render(false));
        machine.mark_rendered();
        machine.tick(now + Duration::from_secs(1));
        assert!(machine.needs_render(true));
    }
}
