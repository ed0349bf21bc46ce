pub mod clamp;
pub mod client;

pub use clamp::{clamp_observation, missing_fields, RawReading};
pub use client::{FetchError, HttpObservationSource, ObservationSource};
