//! Transports that deliver sensor frames.
//!
//! Every transport implements [`FrameSource`]. A poll waits at most one poll
//! interval so the session loop can notice a stop request between frames;
//! there is no reconnect logic, an I/O error ends the session.

pub mod lines;
pub mod serial;
pub mod udp;

use std::net::SocketAddr;

use anyhow::Result;

pub use lines::LineSource;
pub use serial::SerialSource;
pub use udp::UdpSource;

/// One decoded line or datagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame text with surrounding whitespace stripped.
    pub text: String,
    /// Sender of the frame, for datagram transports.
    pub peer: Option<SocketAddr>,
}

/// What a single poll of a [`FrameSource`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Poll {
    Frame(Frame),
    /// Nothing arrived within the poll interval.
    Idle,
    /// Bytes arrived but were not valid UTF-8 and were dropped.
    Undecodable,
    /// The stream ended.
    Closed,
}

/// A stream of sensor frames.
pub trait FrameSource {
    /// Wait for the next frame, up to the source's poll interval.
    fn poll_frame(&mut self) -> Result<Poll>;

    /// Human readable description used in the listening banner.
    fn describe(&self) -> String;
}

/// Decode raw frame bytes, `None` if they are not UTF-8.
pub fn decode_frame(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes)
        .ok()
        .map(|text| text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_whitespace() {
        assert_eq!(
            decode_frame(b"  Angle: 1.0\r\n"),
            Some("Angle: 1.0".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert_eq!(decode_frame(&[0x41, 0xff, 0xfe, 0x0a]), None);
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_frame(b"\n"), Some(String::new()));
    }
}
