//! anglelog library - the pieces behind the `anglelog` binary.
//!
//! An angle sensor prints lines such as `Angle: 12.3456` over a serial port
//! or as UDP datagrams. This crate reads those frames, keeps the ones that
//! carry the angle marker, and appends `(elapsed seconds, angle)` rows to a
//! CSV file while echoing each reading to the console.
//!
//! # Modules
//!
//! - [`source`] - Serial, UDP and replay transports
//! - [`parser`] - Angle extraction from a decoded frame
//! - [`output`] - CSV log and console reporter
//! - [`session`] - The read, parse and record loop
//!
//! # Example
//!
//! ```no_run
//! use anglelog::{anglelog, Config, ShutdownSignal};
//!
//! let shutdown = ShutdownSignal::new();
//! shutdown.install_ctrlc_handler().expect("Failed to install handler");
//! let stats = anglelog(Config::udp(), &shutdown).expect("Logging failed");
//! println!("{} readings", stats.accepted);
//! ```

pub mod anglelog_core;
pub mod constants;
pub mod output;
pub mod parser;
pub mod reading;
pub mod session;
pub mod source;

pub use anglelog_core::{anglelog, open_source, run_with_source, Config, Transport};
pub use parser::{parse_line, LineFormat, MalformedPolicy, ParseError, ParseOutcome};
pub use reading::Reading;
pub use session::{Session, SessionOptions, SessionStats, ShutdownSignal, StopReason};
