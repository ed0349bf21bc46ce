use log::{debug, info};
use std::env;
use std::str::FromStr;
use tokio::time::Duration;
use url::Url;

use crate::utils::local_ip_address;

const DEFAULT_API_URL: &str = "http://localhost/api/latest";
/// Presses closer together than this are one press
pub const MIN_DEBOUNCE_MS: u64 = 500;

/// Cadences and timeouts of the coordinator loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    pub fast_tick: Duration,
    pub slow_tick: Duration,
    pub fetch_timeout: Duration,
    pub backlight_timeout: Duration,
    pub scroll_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            fast_tick: Duration::from_millis(1000),
            slow_tick: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(5),
            backlight_timeout: Duration::from_secs(10),
            scroll_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LcdConfig {
    pub api_url: Url,
    pub timings: Timings,
    pub debounce: Duration,
    pub queue_capacity: usize,
    pub columns: usize,
    pub rows: usize,
    pub device_address: String,
}

/// Read `key` and parse it, or fall back to `default` when unset
fn env_or<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{} has invalid value '{}': {}", key, raw, e).into()),
        Err(_) => Ok(default),
    }
}

fn parse_api_url(raw: &str) -> Result<Url, Box<dyn std::error::Error>> {
    let url = Url::parse(raw).map_err(|e| format!("WEATHER_API_URL is not a URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("WEATHER_API_URL has unsupported scheme '{}'", other).into()),
    }
}

impl LcdConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let api_url = match env::var("WEATHER_API_URL") {
            Ok(raw) => parse_api_url(raw.trim())?,
            Err(_) => parse_api_url(DEFAULT_API_URL)?,
        };

        let timings = Timings {
            fast_tick: Duration::from_millis(env_or("FAST_TICK_MS", 1000u64)?),
            slow_tick: Duration::from_secs(env_or("SLOW_TICK_SECS", 60u64)?),
            fetch_timeout: Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", 5u64)?),
            backlight_timeout: Duration::from_secs(env_or("BACKLIGHT_TIMEOUT_SECS", 10u64)?),
            scroll_interval: Duration::from_secs(env_or("SCROLL_INTERVAL_SECS", 5u64)?),
        };
        let debounce_ms = env_or("BUTTON_DEBOUNCE_MS", MIN_DEBOUNCE_MS)?.max(MIN_DEBOUNCE_MS);
        let queue_capacity = env_or("INPUT_QUEUE_CAPACITY", 16usize)?;
        let columns = env_or("LCD_COLUMNS", 16usize)?;
        let rows = env_or("LCD_ROWS", 2usize)?;

        if timings.fast_tick.is_zero() || timings.slow_tick.is_zero() {
            return Err("FAST_TICK_MS and SLOW_TICK_SECS must be greater than zero".into());
        }
        if timings.fetch_timeout.is_zero() || timings.fetch_timeout > timings.slow_tick {
            return Err("FETCH_TIMEOUT_SECS must be between 1 and SLOW_TICK_SECS".into());
        }
        if queue_capacity == 0 {
            return Err("INPUT_QUEUE_CAPACITY must be at least 1".into());
        }

        let device_address = match env::var("DEVICE_ADDRESS") {
            Ok(address) if !address.trim().is_empty() => address.trim().to_string(),
            _ => match local_ip_address() {
                Some(ip) => ip.to_string(),
                None => {
                    debug!("Could not discover a local address");
                    "unknown".to_string()
                }
            },
        };

        info!(
            "Polling {} every {}s, device address {}",
            api_url,
            timings.slow_tick.as_secs(),
            device_address
        );

        Ok(LcdConfig {
            api_url,
            timings,
            debounce: Duration::from_millis(debounce_ms),
            queue_capacity,
            columns,
            rows,
            device_address,
        })
    }
}
