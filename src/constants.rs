//! Default values for the logger configuration.
//!
//! Everything here can be overridden through [`crate::Config`]; these are the
//! values the sensor firmware and the bench setup expect out of the box.

use std::time::Duration;

/// Substring that marks a line as carrying an angle measurement.
pub const ANGLE_MARKER: &str = "Angle:";

/// Serial device the sensor board enumerates as.
pub const DEFAULT_SERIAL_DEVICE: &str = "/dev/ttyACM0";

/// Baud rate the sensor firmware configures its UART for.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Delay after opening the serial port before the first read. Opening the
/// port resets most USB-serial boards and they print garbage while booting.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Local address the UDP listener binds to.
pub const DEFAULT_UDP_BIND: &str = "0.0.0.0:12345";

/// Maximum datagram size accepted by the UDP listener.
pub const UDP_RECV_BUFFER_SIZE: usize = 1024;

/// CSV file written by the serial and replay paths.
pub const DEFAULT_SERIAL_OUTPUT: &str = "angle_log.csv";

/// CSV file written by the UDP path. The `data/` directory must already exist.
pub const DEFAULT_UDP_OUTPUT: &str = "data/wifi_angle_log.csv";

/// How long a single blocking read may wait before the loop checks for a stop request.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Column names of the CSV header row.
pub const CSV_HEADER: [&str; 2] = ["Timestamp (s)", "Angle (deg)"];

/// Number of decimal digits kept for logged timestamps.
pub const TIMESTAMP_DECIMALS: i32 = 5;
