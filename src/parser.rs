//! Angle extraction from decoded text frames.
//!
//! The sensor prints lines such as `Angle: -12.3456`. Frames without the
//! [`ANGLE_MARKER`] are noise (boot banners, debug prints) and are ignored.
//! Frames with the marker must carry a number after it; how that
//! number is delimited depends on the transport, see [`LineFormat`].

use std::fmt;

use crate::constants::ANGLE_MARKER;

/// How the value is laid out after the marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineFormat {
    #[default]
    /// Serial firmware output: the value is the first whitespace-separated
    /// token after the colon, anything following it is ignored.
    Serial,
    /// Datagram payload: everything after the colon, trimmed, is the value.
    Network,
}

/// Result of looking at a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParseOutcome {
    /// The frame does not contain the marker.
    Ignored,
    /// The frame carried an angle.
    Angle(f64),
}

/// A frame carried the marker but no usable number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing follows the colon.
    MissingValue { line: String },
    /// The payload is not a floating point number.
    InvalidNumber { line: String, value: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingValue { line } => {
                write!(f, "no angle value after marker in {line:?}")
            }
            ParseError::InvalidNumber { line, value } => {
                write!(f, "invalid angle value {value:?} in {line:?}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// What to do with a frame that has the marker but an unparseable value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Stop the session with the parse error.
    #[default]
    Fatal,
    /// Log the frame and keep listening.
    Skip,
}

/// Parse one decoded line.
pub fn parse_line(line: &str, format: LineFormat) -> Result<ParseOutcome, ParseError> {
    let Some(marker_pos) = line.find(ANGLE_MARKER) else {
        return Ok(ParseOutcome::Ignored);
    };

    let value = match format {
        LineFormat::Serial => line[marker_pos + ANGLE_MARKER.len()..]
            .split_whitespace()
            .next()
            .unwrap_or(""),
        LineFormat::Network => {
            // The marker contains a colon, so there is always one to find.
            let colon = line.find(':').unwrap_or(marker_pos + ANGLE_MARKER.len() - 1);
            line[colon + 1..].trim()
        }
    };

    if value.is_empty() {
        return Err(ParseError::MissingValue {
            line: line.to_string(),
        });
    }

    value
        .parse::<f64>()
        .map(ParseOutcome::Angle)
        .map_err(|_| ParseError::InvalidNumber {
            line: line.to_string(),
            value: value.to_string(),
        })
}
