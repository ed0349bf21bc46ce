/// Display-ready strings derived from the latest observation
use time::OffsetDateTime;

use crate::display::Screen;
use crate::models::{Observation, Page};
use crate::utils::format_datetime;

pub const MSG_NO_DATA: &str = "No data points\navailable";

/// Every string the console can show, replaced as a whole on each recompute
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSet {
    pub default: String,
    pub today: String,
    pub pressure: String,
    pub lux: String,
    pub altitude: String,
    pub timestamp: String,
    pub info: String,
    pub error: String,
}

fn info_message(address: &str) -> String {
    format!("IP address:\n{}", address)
}

/// Round to whole units without ever printing `-0`
fn whole(value: f64) -> f64 {
    let rounded = value.round();
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

impl MessageSet {
    /// Before the first successful fetch every page reads "no data"
    pub fn without_data(address: &str) -> Self {
        MessageSet {
            default: MSG_NO_DATA.to_string(),
            today: MSG_NO_DATA.to_string(),
            pressure: MSG_NO_DATA.to_string(),
            lux: MSG_NO_DATA.to_string(),
            altitude: MSG_NO_DATA.to_string(),
            timestamp: MSG_NO_DATA.to_string(),
            info: info_message(address),
            error: MSG_NO_DATA.to_string(),
        }
    }

    /// Format a bounded observation. Values are rounded to whole units.
    pub fn from_observation(obs: &Observation, address: &str, today: &OffsetDateTime) -> Self {
        MessageSet {
            default: format!(
                "Temp: {:.0}\u{b0}C\nHumidity: {:.0}%",
                whole(obs.temperature),
                whole(obs.humidity)
            ),
            today: format!("Today is:\n{}", format_datetime(today)),
            pressure: format!("Pressure:\n{:.0}hPa", whole(obs.pressure / 100.0)),
            lux: format!("Lux level:\n{:.0}lx", whole(obs.lux.lux)),
            altitude: format!("Altitude:\n{:.0}m", whole(obs.altitude)),
            timestamp: format!("Time since epoch\n{}", obs.timestamp),
            info: info_message(address),
            error: MSG_NO_DATA.to_string(),
        }
    }

    pub fn page(&self, page: Page) -> &str {
        match page {
            Page::Default => &self.default,
            Page::Today => &self.today,
            Page::Pressure => &self.pressure,
            Page::Lux => &self.lux,
            Page::Altitude => &self.altitude,
            Page::Timestamp => &self.timestamp,
        }
    }

    pub fn text(&self, screen: Screen) -> &str {
        match screen {
            Screen::Info => &self.info,
            Screen::NoData => &self.error,
            Screen::Page(page) => self.page(page),
        }
    }
}
