/// Lux sensor reading, optionally with its raw ambient/infrared channels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LuxReading {
    pub lux: f64,
    pub ambient: Option<f64>,
    pub infrared: Option<f64>,
}

/// One bounded weather reading. Built only through `observation::clamp`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub lux: LuxReading,
    pub altitude: f64,
    pub timestamp: i64,
}

/// Logical keypad buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Prev,
    Next,
    ToggleScroll,
    AcknowledgeError,
}

impl Button {
    pub const ALL: [Button; 4] = [
        Button::Prev,
        Button::Next,
        Button::ToggleScroll,
        Button::AcknowledgeError,
    ];
}

/// The mode the console is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Error,
    Default,
    Today,
    Pressure,
    Lux,
    Altitude,
    Timestamp,
    Scroll,
}

impl DisplayState {
    pub fn page(self) -> Option<Page> {
        match self {
            DisplayState::Default => Some(Page::Default),
            DisplayState::Today => Some(Page::Today),
            DisplayState::Pressure => Some(Page::Pressure),
            DisplayState::Lux => Some(Page::Lux),
            DisplayState::Altitude => Some(Page::Altitude),
            DisplayState::Timestamp => Some(Page::Timestamp),
            DisplayState::Error | DisplayState::Scroll => None,
        }
    }
}

/// One of the six data pages, in their fixed cyclic order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Default,
    Today,
    Pressure,
    Lux,
    Altitude,
    Timestamp,
}

impl Page {
    pub const CYCLE: [Page; 6] = [
        Page::Default,
        Page::Today,
        Page::Pressure,
        Page::Lux,
        Page::Altitude,
        Page::Timestamp,
    ];

    fn index(self) -> usize {
        Page::CYCLE
            .iter()
            .position(|p| *p == self)
            .unwrap_or_default()
    }

    /// Next page, wrapping from Timestamp to Default
    pub fn next(self) -> Page {
        Page::CYCLE[(self.index() + 1) % Page::CYCLE.len()]
    }

    /// Previous page, wrapping from Default to Timestamp
    pub fn prev(self) -> Page {
        let len = Page::CYCLE.len();
        Page::CYCLE[(self.index() + len - 1) % len]
    }

    pub fn state(self) -> DisplayState {
        match self {
            Page::Default => DisplayState::Default,
            Page::Today => DisplayState::Today,
            Page::Pressure => DisplayState::Pressure,
            Page::Lux => DisplayState::Lux,
            Page::Altitude => DisplayState::Altitude,
            Page::Timestamp => DisplayState::Timestamp,
        }
    }
}

/// Why the console is (or will be) showing the `Error` state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCondition {
    NoDataPoints,
    ShowInformational,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_prev_wrap_around_the_cycle() {
        assert_eq!(Page::Timestamp.next(), Page::Default);
        assert_eq!(Page::Default.prev(), Page::Timestamp);
        assert_eq!(Page::Lux.next(), Page::Altitude);
        assert_eq!(Page::Lux.prev(), Page::Pressure);
    }

    #[test]
    fn page_and_state_agree() {
        for page in Page::CYCLE {
            assert_eq!(page.state().page(), Some(page));
        }
        assert_eq!(DisplayState::Scroll.page(), None);
        assert_eq!(DisplayState::Error.page(), None);
    }
}
