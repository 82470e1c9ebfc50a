//! Serial port transport.

use std::io::BufReader;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serialport::{ClearBuffer, SerialPort};
use tracing::info;

use super::{FrameSource, LineSource, Poll};

/// Settings needed to open the sensor's serial port.
#[derive(Clone, Debug)]
pub struct SerialSettings {
    pub device: String,
    pub baud_rate: u32,
    /// Time to wait after opening before reading, while the board resets.
    pub settle_delay: Duration,
    pub poll_interval: Duration,
}

/// Line reader over an open serial port.
pub struct SerialSource {
    lines: LineSource<BufReader<Box<dyn SerialPort>>>,
}

impl SerialSource {
    /// Open the port and wait out the settle delay.
    ///
    /// Whatever the board printed while booting is discarded before the first
    /// read.
    pub fn open(settings: &SerialSettings) -> Result<Self> {
        let port = serialport::new(&settings.device, settings.baud_rate)
            .timeout(settings.poll_interval)
            .open()
            .with_context(|| {
                format!(
                    "Failed to open serial device {} at {} baud",
                    settings.device, settings.baud_rate
                )
            })?;

        if !settings.settle_delay.is_zero() {
            info!(
                "Waiting {:?} for {} to settle",
                settings.settle_delay, settings.device
            );
            thread::sleep(settings.settle_delay);
        }
        port.clear(ClearBuffer::Input)
            .with_context(|| format!("Failed to clear input buffer of {}", settings.device))?;

        let name = format!("serial {} @ {} baud", settings.device, settings.baud_rate);
        Ok(Self {
            lines: LineSource::new(BufReader::new(port), name),
        })
    }
}

impl FrameSource for SerialSource {
    fn poll_frame(&mut self) -> Result<Poll> {
        self.lines.poll_frame()
    }

    fn describe(&self) -> String {
        self.lines.describe()
    }
}
