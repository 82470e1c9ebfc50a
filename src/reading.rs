//! The record produced for every accepted angle measurement.

use serde::{Deserialize, Serialize};

use crate::constants::TIMESTAMP_DECIMALS;

/// One parsed angle measurement and the session time it arrived at.
///
/// # Fields
/// - `timestamp_seconds`: Seconds since the session started, rounded to
///   [`TIMESTAMP_DECIMALS`] digits
/// - `angle_degrees`: Angle exactly as parsed from the frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "Timestamp (s)")]
    pub timestamp_seconds: f64,
    #[serde(rename = "Angle (deg)")]
    pub angle_degrees: f64,
}

impl Reading {
    /// Build a reading from an unrounded elapsed time.
    pub fn new(elapsed_seconds: f64, angle_degrees: f64) -> Self {
        Self {
            timestamp_seconds: round_to(elapsed_seconds, TIMESTAMP_DECIMALS),
            angle_degrees,
        }
    }
}

/// Round `value` to `decimals` digits after the point.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_rounded() {
        let reading = Reading::new(1.234_567_89, 10.0);
        assert_eq!(reading.timestamp_seconds, 1.234_57);
        assert_eq!(reading.angle_degrees, 10.0);
    }

    #[test]
    fn test_angle_is_not_rounded() {
        let reading = Reading::new(0.0, -179.123_456_7);
        assert_eq!(reading.angle_degrees, -179.123_456_7);
    }

    #[test]
    fn test_round_to_zero_decimals() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(2.4, 0), 2.0);
    }
}
