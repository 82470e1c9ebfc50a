//! Wiring of configuration, transport, log and console into one session.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_POLL_INTERVAL, DEFAULT_SERIAL_DEVICE, DEFAULT_SERIAL_OUTPUT,
    DEFAULT_SETTLE_DELAY, DEFAULT_UDP_BIND, DEFAULT_UDP_OUTPUT,
};
use crate::output::{ConsoleReporter, CsvLog, ReportStyle};
use crate::parser::{LineFormat, MalformedPolicy};
use crate::session::{Session, SessionOptions, SessionStats, ShutdownSignal, StopReason};
use crate::source::serial::SerialSettings;
use crate::source::{FrameSource, LineSource, SerialSource, UdpSource};

/// Where frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transport {
    Serial {
        device: String,
        baud_rate: u32,
        settle_delay: Duration,
    },
    Udp {
        bind: String,
    },
    /// A captured serial transcript; `-` reads stdin.
    Replay {
        input: PathBuf,
    },
}

impl Transport {
    fn line_format(&self) -> LineFormat {
        match self {
            Transport::Udp { .. } => LineFormat::Network,
            Transport::Serial { .. } | Transport::Replay { .. } => LineFormat::Serial,
        }
    }

    fn report_style(&self) -> ReportStyle {
        match self {
            Transport::Udp { .. } => ReportStyle::network(),
            Transport::Serial { .. } | Transport::Replay { .. } => ReportStyle::serial(),
        }
    }
}

/// Configuration for one logging run.
/// Built from the command line by the binary; every field has a default
/// matching the sensor board's factory setup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Verbosity level (0 = warn, 1 = info, 2 = debug, 3+ = trace)
    pub verbosity: u8,
    pub transport: Transport,
    /// CSV file to create, truncating any previous run
    pub output: PathBuf,
    /// Longest a single read blocks before the stop flag is checked
    pub poll_interval: Duration,
    /// Duration in seconds (0 = until interrupted)
    pub duration: u64,
    /// Stop after this many readings (0 = unlimited)
    pub count: u64,
    pub malformed: MalformedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config::serial()
    }
}

impl Config {
    /// Defaults for the serial sensor link.
    pub fn serial() -> Self {
        Config {
            verbosity: 0,
            transport: Transport::Serial {
                device: DEFAULT_SERIAL_DEVICE.to_string(),
                baud_rate: DEFAULT_BAUD_RATE,
                settle_delay: DEFAULT_SETTLE_DELAY,
            },
            output: PathBuf::from(DEFAULT_SERIAL_OUTPUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
            duration: 0,
            count: 0,
            malformed: MalformedPolicy::default(),
        }
    }

    /// Defaults for the WiFi board streaming datagrams.
    pub fn udp() -> Self {
        Config {
            transport: Transport::Udp {
                bind: DEFAULT_UDP_BIND.to_string(),
            },
            output: PathBuf::from(DEFAULT_UDP_OUTPUT),
            ..Config::serial()
        }
    }

    /// Defaults for replaying a captured transcript.
    pub fn replay(input: impl Into<PathBuf>) -> Self {
        Config {
            transport: Transport::Replay {
                input: input.into(),
            },
            ..Config::serial()
        }
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            format: self.transport.line_format(),
            malformed: self.malformed,
            max_readings: (self.count > 0).then_some(self.count),
            duration: (self.duration > 0).then(|| Duration::from_secs(self.duration)),
        }
    }
}

fn open_replay(input: &Path) -> Result<LineSource<Box<dyn BufRead>>> {
    if input == Path::new("-") {
        return Ok(LineSource::new(
            Box::new(BufReader::new(io::stdin())) as Box<dyn BufRead>,
            "stdin",
        ));
    }
    let file = File::open(input)
        .with_context(|| format!("Failed to open replay input {}", input.display()))?;
    Ok(LineSource::new(
        Box::new(BufReader::new(file)) as Box<dyn BufRead>,
        format!("replay {}", input.display()),
    ))
}

/// Open the configured transport.
pub fn open_source(config: &Config) -> Result<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match &config.transport {
        Transport::Serial {
            device,
            baud_rate,
            settle_delay,
        } => Box::new(SerialSource::open(&SerialSettings {
            device: device.clone(),
            baud_rate: *baud_rate,
            settle_delay: *settle_delay,
            poll_interval: config.poll_interval,
        })?),
        Transport::Udp { bind } => Box::new(UdpSource::bind(bind, config.poll_interval)?),
        Transport::Replay { input } => Box::new(open_replay(input)?),
    };
    Ok(source)
}

/// Run a session with an already opened source, printing to stdout.
pub fn run_with_source(
    config: &Config,
    source: &mut dyn FrameSource,
    shutdown: &ShutdownSignal,
) -> Result<(StopReason, SessionStats)> {
    let log = CsvLog::create(&config.output)?;
    info!("Logging readings to {}", config.output.display());
    let console = ConsoleReporter::new(io::stdout(), config.transport.report_style());

    let mut session = Session::new(log, console, config.session_options());
    // On error the session is dropped without the stop message; every row
    // written so far is already flushed.
    let reason = session.run(source, shutdown)?;
    info!("Stopped: {:?}", reason);
    let (stats, _, _) = session.finish()?;
    Ok((reason, stats))
}

/// Open the transport, then the log, and record until stopped.
pub fn anglelog(config: Config, shutdown: &ShutdownSignal) -> Result<SessionStats> {
    let mut source = open_source(&config)?;
    let (_, stats) = run_with_source(&config, source.as_mut(), shutdown)?;
    Ok(stats)
}
