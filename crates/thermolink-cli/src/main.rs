//! Command-line diagnostics for the Thermolink thermostat bridge.
//!
//! Runs channel reads and writes against a snapshot file. Writes go to a
//! dry-run sink that prints the remote command instead of sending it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use thermolink_bridge::{
    ChannelValue, CommandParams, CommandSink, HostFault, RemoteError, RemoteResult, StateCache,
    StateSource, ThermostatBridge,
};
use thermolink_core::{
    BridgeConfig, ChannelAccess, CharacteristicValue, LocalMode, LocalUnits, LogicalChannel,
    Snapshot,
};

const EXIT_FAULT: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// Thermolink - thermostat state bridge diagnostics.
#[derive(Parser, Debug)]
#[command(name = "thermolink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file. Environment variables are used otherwise.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Remote device id (overrides configuration).
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Read one channel from a snapshot file.
    Get {
        /// Channel name, e.g. target-temperature.
        channel: LogicalChannel,
        /// Snapshot file (JSON array of capability states).
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Write one channel and print the command that would be sent.
    Set {
        /// Channel name, e.g. cool-threshold.
        channel: LogicalChannel,
        /// Value as JSON (number, bool or string); bare words are strings.
        value: String,
        /// Snapshot file (JSON array of capability states).
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// List channels with their ranges and access.
    Channels,
}

/// Serves the snapshot stored in a JSON file, re-read on every fetch.
struct FileStateSource {
    path: PathBuf,
}

#[async_trait]
impl StateSource for FileStateSource {
    async fn fetch_snapshot(&self, device_id: &str) -> RemoteResult<Snapshot> {
        tracing::debug!(device_id, path = %self.path.display(), "Reading snapshot file");
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| RemoteError::Transport(format!("{}: {}", self.path.display(), e)))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("malformed snapshot in {}", self.path.display()))?;
        Ok(snapshot)
    }
}

/// Prints commands instead of sending them.
struct DryRunSink;

#[async_trait]
impl CommandSink for DryRunSink {
    async fn set_device_state(
        &self,
        device_id: &str,
        action: &str,
        params: &CommandParams,
    ) -> RemoteResult<()> {
        tracing::info!(device_id, action, "Dry run, command not sent");
        println!("{}", format_command(action, params));
        Ok(())
    }
}

fn format_command(action: &str, params: &CommandParams) -> String {
    let mut line = action.to_string();
    for (field, value) in params {
        line.push_str(&format!(" {}={}", field, value));
    }
    line
}

fn format_value(value: &ChannelValue) -> String {
    match value {
        ChannelValue::Temperature(t) => format!("{}", t),
        ChannelValue::Mode(m) => {
            let name = match m {
                LocalMode::Off => "OFF",
                LocalMode::Heat => "HEAT",
                LocalMode::Cool => "COOL",
                LocalMode::Auto => "AUTO",
            };
            format!("{} ({})", name, m.as_u8())
        }
        ChannelValue::Units(u) => {
            let name = match u {
                LocalUnits::Celsius => "CELSIUS",
                LocalUnits::Fahrenheit => "FAHRENHEIT",
            };
            format!("{} ({})", name, u.as_u8())
        }
        ChannelValue::State(s) => format!("{:?} ({})", s, s.as_u8()).to_uppercase(),
    }
}

fn parse_value(raw: &str) -> CharacteristicValue {
    serde_json::from_str(raw).unwrap_or_else(|_| CharacteristicValue::Text(raw.to_string()))
}

fn load_config(args: &Args) -> Result<BridgeConfig> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::from_json_file(path)?,
        None => BridgeConfig::from_env(),
    };
    if let Some(device) = &args.device {
        config.device_id = device.clone();
    }
    if args.json_logs {
        config.log_json = true;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("thermolink=info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    }
}

/// Bridge over a snapshot file, with the point cache primed from it.
async fn open_bridge(config: &BridgeConfig, snapshot: &Path) -> Result<ThermostatBridge> {
    let upstream: Arc<dyn StateSource> = Arc::new(FileStateSource {
        path: snapshot.to_path_buf(),
    });
    let cache = Arc::new(StateCache::new(upstream, config.cache_ttl()));
    cache
        .fetch_snapshot(&config.device_id)
        .await
        .context("cannot load snapshot")?;

    let points = Arc::new(cache.point_cache(config.device_id.clone()));
    Ok(ThermostatBridge::new(
        config.device_id.clone(),
        cache,
        Arc::new(DryRunSink),
        points,
    ))
}

fn report_fault(fault: HostFault) -> ExitCode {
    eprintln!("fault: {} ({})", fault, fault.status_code());
    ExitCode::from(EXIT_FAULT)
}

fn print_channels() {
    println!("{:<20} {:<42} {:<10} ACCESS", "CHANNEL", "REMOTE", "RANGE");
    for channel in LogicalChannel::ALL {
        let remote = channel
            .key()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());
        let range = channel
            .range()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let access = match channel.access() {
            ChannelAccess::ReadOnly => "read",
            ChannelAccess::ReadWrite => "read/write",
        };
        println!(
            "{:<20} {:<42} {:<10} {}",
            channel.to_string(),
            remote,
            range,
            access
        );
    }
}

async fn run(args: Args, config: BridgeConfig) -> Result<ExitCode> {
    match args.command {
        Command::Channels => {
            print_channels();
            Ok(ExitCode::SUCCESS)
        }
        Command::Get { channel, snapshot } => {
            let bridge = open_bridge(&config, &snapshot).await?;
            match bridge.get(channel).await {
                Ok(value) => {
                    println!("{}: {}", channel, format_value(&value));
                    Ok(ExitCode::SUCCESS)
                }
                Err(fault) => Ok(report_fault(fault)),
            }
        }
        Command::Set {
            channel,
            value,
            snapshot,
        } => {
            let bridge = open_bridge(&config, &snapshot).await?;
            match bridge.set(channel, parse_value(&value)).await {
                Ok(()) => Ok(ExitCode::SUCCESS),
                Err(fault) => Ok(report_fault(fault)),
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = load_config(&args);
    let json_logs = match &config {
        Ok(config) => config.log_json,
        Err(_) => args.json_logs,
    };
    init_logging(json_logs);

    let result = match config {
        Ok(config) => run(args, config).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}
