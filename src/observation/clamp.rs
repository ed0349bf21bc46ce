/// Bounding of raw sensor readings into `Observation` records
use log::debug;
use serde_json::{Map, Value};

use crate::models::{LuxReading, Observation};

// Closed ranges every observation field is saturated into
pub const TEMPERATURE_RANGE: (f64, f64) = (-10.0, 85.0); // °C
pub const PRESSURE_RANGE: (f64, f64) = (85_000.0, 108_000.0); // Pa
pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0); // %
pub const LUX_RANGE: (f64, f64) = (0.0, 40_000.0); // lx
pub const ALTITUDE_RANGE: (f64, f64) = (0.0, 10_000.0); // m

/// Keys a reading must carry before it is accepted by the coordinator
pub const REQUIRED_FIELDS: [&str; 6] = ["temp", "pres", "rhum", "lux", "alt", "time"];

/// A raw reading as returned by the observation API
pub type RawReading = Map<String, Value>;

fn clamp_to((min, max): (f64, f64), value: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

fn number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Lux arrives either as a bare number or as `{luxd|lux, ambient, infrared}`
fn lux_reading(value: &Value) -> Option<LuxReading> {
    match value {
        Value::Object(fields) => {
            let lux = fields
                .get("luxd")
                .or_else(|| fields.get("lux"))
                .and_then(number)?;
            Some(LuxReading {
                lux,
                ambient: fields.get("ambient").and_then(number),
                infrared: fields.get("infrared").and_then(number),
            })
        }
        other => number(other).map(|lux| LuxReading {
            lux,
            ..Default::default()
        }),
    }
}

/// Required fields that are absent or not numeric
pub fn missing_fields(raw: &RawReading) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| match raw.get(*key) {
            Some(value) if *key == "lux" => lux_reading(value).is_none(),
            Some(value) => number(value).is_none(),
            None => true,
        })
        .collect()
}

/// Clamp a raw reading into a bounded `Observation`
///
/// Absent (or non-numeric) fields default to zero before clamping, unknown keys
/// are ignored. Never fails.
pub fn clamp_observation(raw: &RawReading) -> Observation {
    let mut observation = Observation::default();

    for (key, value) in raw {
        match key.as_str() {
            "temp" => observation.temperature = number(value).unwrap_or(0.0),
            "pres" => observation.pressure = number(value).unwrap_or(0.0),
            "rhum" => observation.humidity = number(value).unwrap_or(0.0),
            "alt" => observation.altitude = number(value).unwrap_or(0.0),
            "lux" => observation.lux = lux_reading(value).unwrap_or_default(),
            "time" => {
                observation.timestamp = value
                    .as_i64()
                    .or_else(|| number(value).map(|v| v as i64))
                    .unwrap_or(0)
            }
            _ => debug!("Ignoring unused observation key: {}", key),
        }
    }

    observation.temperature = clamp_to(TEMPERATURE_RANGE, observation.temperature);
    observation.pressure = clamp_to(PRESSURE_RANGE, observation.pressure);
    observation.humidity = clamp_to(HUMIDITY_RANGE, observation.humidity);
    observation.lux.lux = clamp_to(LUX_RANGE, observation.lux.lux);
    observation.altitude = clamp_to(ALTITUDE_RANGE, observation.altitude);

    observation
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawReading {
        match value {
            Value::Object(map) => map,
            _ => panic!("test reading must be an object"),
        }
    }

    #[test]
    fn out_of_range_values_saturate_at_the_bounds() {
        let obs = clamp_observation(&raw(json!({
            "temp": 200, "pres": 10, "rhum": -5, "lux": 99999, "alt": 20000, "time": 1000
        })));
        assert_eq!(obs.temperature, 85.0);
        assert_eq!(obs.pressure, 85_000.0);
        assert_eq!(obs.humidity, 0.0);
        assert_eq!(obs.lux.lux, 40_000.0);
        assert_eq!(obs.altitude, 10_000.0);
        assert_eq!(obs.timestamp, 1000);
    }

    #[test]
    fn in_range_values_pass_through() {
        let obs = clamp_observation(&raw(json!({
            "temp": 21.5, "pres": 101325, "rhum": 45, "lux": 320.25, "alt": 12, "time": 1700000000
        })));
        assert_eq!(obs.temperature, 21.5);
        assert_eq!(obs.pressure, 101_325.0);
        assert_eq!(obs.humidity, 45.0);
        assert_eq!(obs.lux.lux, 320.25);
        assert_eq!(obs.altitude, 12.0);
        assert_eq!(obs.timestamp, 1_700_000_000);
    }

    #[test]
    fn absent_fields_default_to_zero_then_clamp() {
        let obs = clamp_observation(&RawReading::new());
        assert_eq!(obs.temperature, 0.0);
        assert_eq!(obs.humidity, 0.0);
        assert_eq!(obs.altitude, 0.0);
        assert_eq!(obs.timestamp, 0);
        // zero lies below the pressure range
        assert_eq!(obs.pressure, PRESSURE_RANGE.0);
    }

    #[test]
    fn every_clamped_field_stays_in_range() {
        for v in [-1e9, -10.5, 0.0, 42.0, 50_000.0, 1e12] {
            let obs = clamp_observation(&raw(json!({
                "temp": v, "pres": v, "rhum": v, "lux": v, "alt": v, "time": 0
            })));
            assert!((TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1).contains(&obs.temperature));
            assert!((PRESSURE_RANGE.0..=PRESSURE_RANGE.1).contains(&obs.pressure));
            assert!((HUMIDITY_RANGE.0..=HUMIDITY_RANGE.1).contains(&obs.humidity));
            assert!((LUX_RANGE.0..=LUX_RANGE.1).contains(&obs.lux.lux));
            assert!((ALTITUDE_RANGE.0..=ALTITUDE_RANGE.1).contains(&obs.altitude));
        }
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let obs = clamp_observation(&raw(json!({ "temp": 20, "wind": 12, "raw": [1, 2] })));
        assert_eq!(obs.temperature, 20.0);
    }

    #[test]
    fn lux_object_keeps_sub_readings() {
        let obs = clamp_observation(&raw(json!({
            "lux": { "luxd": -3, "ambient": 120, "infrared": 40 }
        })));
        assert_eq!(obs.lux.lux, 0.0);
        assert_eq!(obs.lux.ambient, Some(120.0));
        assert_eq!(obs.lux.infrared, Some(40.0));
    }

    #[test]
    fn missing_fields_reports_absent_and_non_numeric_keys() {
        let reading = raw(json!({
            "temp": 20, "pres": "high", "rhum": 50, "lux": { "ambient": 1 }, "time": 5
        }));
        assert_eq!(missing_fields(&reading), vec!["pres", "lux", "alt"]);

        let complete = raw(json!({
            "temp": 20, "pres": 90000, "rhum": 50, "lux": 100, "alt": 50, "time": 1000
        }));
        assert!(missing_fields(&complete).is_empty());
    }
}
