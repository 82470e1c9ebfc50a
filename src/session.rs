//! The read, parse and record loop.
//!
//! A [`Session`] owns everything that lives for one run: the start instant
//! that timestamps are measured from, the CSV log and the console reporter.
//! [`Session::run`] drives a [`FrameSource`] until the shutdown signal fires,
//! the source closes, an optional limit is reached, or a fatal error occurs.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::output::{ConsoleReporter, CsvLog};
use crate::parser::{parse_line, LineFormat, MalformedPolicy, ParseOutcome};
use crate::reading::Reading;
use crate::source::{Frame, FrameSource, Poll};

/// Stop request shared between the Ctrl-C handler and the session loop.
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route Ctrl-C (SIGINT/SIGTERM) to this signal.
    pub fn install_ctrlc_handler(&self) -> Result<()> {
        let signal = self.clone();
        ctrlc::set_handler(move || signal.signal()).context("Failed to set Ctrl-C handler")
    }

    pub fn signal(&self) {
        self.requested.store(true, Ordering::Relaxed);
    }

    pub fn is_signaled(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }
}

/// Per-run behavior that is not tied to a transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionOptions {
    pub format: LineFormat,
    pub malformed: MalformedPolicy,
    /// Stop after this many accepted readings.
    pub max_readings: Option<u64>,
    /// Stop once this much time has passed since the session started.
    pub duration: Option<Duration>,
}

/// Frame counters, reported when the session ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub accepted: u64,
    /// Frames without the angle marker.
    pub ignored: u64,
    /// Frames that were not valid text.
    pub undecodable: u64,
    /// Marked frames whose value was rejected and skipped.
    pub malformed: u64,
}

/// Why [`Session::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    SourceClosed,
    ReadingLimit,
    DurationElapsed,
}

pub struct Session<L: Write, C: Write> {
    start: Instant,
    log: CsvLog<L>,
    console: ConsoleReporter<C>,
    options: SessionOptions,
    stats: SessionStats,
}

impl<L: Write, C: Write> Session<L, C> {
    /// Start the session clock. The log header has already been written by
    /// [`CsvLog`].
    pub fn new(log: CsvLog<L>, console: ConsoleReporter<C>, options: SessionOptions) -> Self {
        Self {
            start: Instant::now(),
            log,
            console,
            options,
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Parse one frame and record it if it carries an angle.
    ///
    /// Returns the recorded reading, or `None` if the frame was ignored or
    /// skipped. A malformed value is an error under [`MalformedPolicy::Fatal`].
    pub fn handle_frame(&mut self, frame: &Frame) -> Result<Option<Reading>> {
        let angle = match parse_line(&frame.text, self.options.format) {
            Ok(ParseOutcome::Ignored) => {
                self.stats.ignored += 1;
                return Ok(None);
            }
            Ok(ParseOutcome::Angle(angle)) => angle,
            Err(e) => match self.options.malformed {
                MalformedPolicy::Fatal => return Err(e).context("Malformed angle frame"),
                MalformedPolicy::Skip => {
                    warn!("Skipping malformed frame: {e}");
                    self.stats.malformed += 1;
                    return Ok(None);
                }
            },
        };

        let elapsed = self.start.elapsed().as_secs_f64();
        let reading = Reading::new(elapsed, angle);
        self.log.append(&reading)?;
        self.console.reading(elapsed, &reading, frame.peer)?;
        self.stats.accepted += 1;
        Ok(Some(reading))
    }

    /// Poll `source` and record frames until something stops the session.
    pub fn run<S: FrameSource + ?Sized>(
        &mut self,
        source: &mut S,
        shutdown: &ShutdownSignal,
    ) -> Result<StopReason> {
        self.console.listening(&source.describe())?;
        info!("Session started on {}", source.describe());

        loop {
            if shutdown.is_signaled() {
                return Ok(StopReason::Interrupted);
            }
            if let Some(duration) = self.options.duration {
                if self.start.elapsed() >= duration {
                    return Ok(StopReason::DurationElapsed);
                }
            }

            match source.poll_frame()? {
                Poll::Frame(frame) => {
                    self.handle_frame(&frame)?;
                    if let Some(max) = self.options.max_readings {
                        if self.stats.accepted >= max {
                            return Ok(StopReason::ReadingLimit);
                        }
                    }
                }
                Poll::Idle => {}
                Poll::Undecodable => self.stats.undecodable += 1,
                Poll::Closed => {
                    debug!("{} closed", source.describe());
                    return Ok(StopReason::SourceClosed);
                }
            }
        }
    }

    /// Print the stop confirmation and flush the log.
    pub fn finish(mut self) -> Result<(SessionStats, L, C)> {
        self.console.stopped()?;
        let rows = self.log.rows();
        let log = self.log.finish()?;
        info!(
            "Logged {} readings ({} ignored, {} undecodable, {} malformed)",
            rows, self.stats.ignored, self.stats.undecodable, self.stats.malformed
        );
        Ok((self.stats, log, self.console.into_inner()))
    }
}
