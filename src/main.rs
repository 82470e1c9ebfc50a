use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anglelog::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_POLL_INTERVAL, DEFAULT_SERIAL_DEVICE, DEFAULT_SETTLE_DELAY,
    DEFAULT_UDP_BIND,
};
use anglelog::{anglelog, Config, MalformedPolicy, ShutdownSignal, Transport};
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "anglelog")]
#[command(about = "Log angle sensor readings to CSV")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read newline-delimited frames from a serial port
    Serial {
        /// Serial device path
        #[arg(short, long, default_value = DEFAULT_SERIAL_DEVICE)]
        device: String,
        #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
        baud: u32,
        /// Milliseconds to wait after opening the port before reading
        #[arg(long, default_value_t = DEFAULT_SETTLE_DELAY.as_millis() as u64)]
        settle_ms: u64,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Receive one frame per UDP datagram
    Udp {
        /// Local address to bind
        #[arg(short, long, default_value = DEFAULT_UDP_BIND)]
        bind: String,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Replay a captured serial transcript ("-" for stdin)
    Replay {
        input: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// CSV file to write (truncated if it exists)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Stop after this many seconds (0 = until Ctrl-C)
    #[arg(long, default_value = "0")]
    duration: u64,
    /// Stop after this many readings (0 = unlimited)
    #[arg(long, default_value = "0")]
    count: u64,
    /// Log and skip frames whose angle does not parse instead of exiting
    #[arg(long)]
    skip_malformed: bool,
    /// Milliseconds a read may block before checking for Ctrl-C
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64,
          value_parser = clap::value_parser!(u64).range(1..))]
    poll_ms: u64,
}

impl CommonArgs {
    fn apply(self, mut config: Config) -> Config {
        if let Some(output) = self.output {
            config.output = output;
        }
        config.duration = self.duration;
        config.count = self.count;
        config.poll_interval = Duration::from_millis(self.poll_ms);
        if self.skip_malformed {
            config.malformed = MalformedPolicy::Skip;
        }
        config
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut config = match cli.command {
            Commands::Serial {
                device,
                baud,
                settle_ms,
                common,
            } => common.apply(Config {
                transport: Transport::Serial {
                    device,
                    baud_rate: baud,
                    settle_delay: Duration::from_millis(settle_ms),
                },
                ..Config::serial()
            }),
            Commands::Udp { bind, common } => common.apply(Config {
                transport: Transport::Udp { bind },
                ..Config::udp()
            }),
            Commands::Replay { input, common } => common.apply(Config::replay(input)),
        };
        config.verbosity = cli.verbose;
        config
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let config = Config::from(Cli::parse());
    setup_logging(config.verbosity);

    let shutdown = ShutdownSignal::new();
    shutdown.install_ctrlc_handler()?;

    anglelog(config, &shutdown)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::from(Cli::try_parse_from(args).expect("arguments should parse"))
    }

    #[test]
    fn test_serial_defaults() {
        let config = parse(&["anglelog", "serial"]);
        assert_eq!(
            config.transport,
            Transport::Serial {
                device: "/dev/ttyACM0".to_string(),
                baud_rate: 115_200,
                settle_delay: Duration::from_secs(2),
            }
        );
        assert_eq!(config.output, PathBuf::from("angle_log.csv"));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.malformed, MalformedPolicy::Fatal);
    }

    #[test]
    fn test_udp_overrides() {
        let config = parse(&[
            "anglelog",
            "-vv",
            "udp",
            "--bind",
            "127.0.0.1:9000",
            "--output",
            "out.csv",
            "--count",
            "10",
            "--skip-malformed",
        ]);
        assert_eq!(config.verbosity, 2);
        assert_eq!(
            config.transport,
            Transport::Udp {
                bind: "127.0.0.1:9000".to_string()
            }
        );
        assert_eq!(config.output, PathBuf::from("out.csv"));
        assert_eq!(config.count, 10);
        assert_eq!(config.malformed, MalformedPolicy::Skip);
    }

    #[test]
    fn test_udp_default_output() {
        let config = parse(&["anglelog", "udp"]);
        assert_eq!(config.output, PathBuf::from("data/wifi_angle_log.csv"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        assert!(Cli::try_parse_from(["anglelog", "udp", "--poll-ms", "0"]).is_err());
    }

    #[test]
    fn test_replay_requires_input() {
        assert!(Cli::try_parse_from(["anglelog", "replay"]).is_err());
        let config = parse(&["anglelog", "replay", "capture.txt"]);
        assert_eq!(
            config.transport,
            Transport::Replay {
                input: PathBuf::from("capture.txt")
            }
        );
    }
}
