//! Human readable status lines on the console.

use std::io::Write;
use std::net::SocketAddr;

use anyhow::{Context, Result};

use crate::reading::Reading;

/// How a reading is rendered on the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportStyle {
    /// Decimal places for the elapsed time.
    pub time_decimals: usize,
    /// Decimal places for the angle, `None` prints the value as parsed.
    pub angle_decimals: Option<usize>,
    /// Append the sender's IP address.
    pub show_peer: bool,
}

impl ReportStyle {
    /// Serial and replay sessions: `1.2345s -> 12.5°`
    pub fn serial() -> Self {
        Self {
            time_decimals: 4,
            angle_decimals: None,
            show_peer: false,
        }
    }

    /// UDP sessions: `1.23s -> 12.50° from 10.0.0.7`
    pub fn network() -> Self {
        Self {
            time_decimals: 2,
            angle_decimals: Some(2),
            show_peer: true,
        }
    }
}

pub struct ConsoleReporter<W: Write> {
    out: W,
    style: ReportStyle,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, style: ReportStyle) -> Self {
        Self { out, style }
    }

    pub fn listening(&mut self, source: &str) -> Result<()> {
        writeln!(self.out, "[Listening] on {source}").context("Failed to write to console")
    }

    /// Print one reading. `elapsed_seconds` is the unrounded session time.
    pub fn reading(
        &mut self,
        elapsed_seconds: f64,
        reading: &Reading,
        peer: Option<SocketAddr>,
    ) -> Result<()> {
        let mut line = format!(
            "{:.*}s -> ",
            self.style.time_decimals, elapsed_seconds
        );
        match self.style.angle_decimals {
            Some(decimals) => line.push_str(&format!("{:.*}°", decimals, reading.angle_degrees)),
            None => line.push_str(&format!("{:?}°", reading.angle_degrees)),
        }
        if self.style.show_peer {
            if let Some(peer) = peer {
                line.push_str(&format!(" from {}", peer.ip()));
            }
        }
        writeln!(self.out, "{line}").context("Failed to write to console")
    }

    pub fn stopped(&mut self) -> Result<()> {
        writeln!(self.out, "Logging stopped.").context("Failed to write to console")?;
        self.out.flush().context("Failed to flush console")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
