//! vmremote - Voicemeeter remote control from the command line
//!
//! Entry point for the `vmremote` binary.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use vmremote::{
    ConnectionState, DeviceDirectory, EngineKind, EngineVersion, LevelType, ParameterAddress,
    Remote, RemoteConfig, RemoteHandle,
};

/// Argument errors reported before touching the engine
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("not a parameter path: {0}")]
    BadPath(String),
    #[error("invalid level type {0} (expected 0-3)")]
    BadLevelType(String),
    #[error("invalid channel index: {0}")]
    BadChannel(String),
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// What the invocation asked for
enum Command {
    Devices,
    Info,
    Get(ParameterAddress),
    Set(String),
    Level(LevelType, usize),
    Watch(Vec<ParameterAddress>),
    Launch(EngineKind),
}

#[derive(Serialize)]
struct InfoReport {
    state: ConnectionState,
    kind: Option<EngineKind>,
    version: Option<EngineVersion>,
    devices: DeviceDirectory,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vmremote=info".parse()?)
                .add_directive("vmremote_core=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut command: Option<Command> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut json = false;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--version" | "-v" => {
                println!("vmremote {}", vmremote::VERSION);
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--json" => json = true,
            "--config" | "-c" => {
                let value = args.get(i + 1).ok_or(CliError::MissingValue("--config"))?;
                config_path = Some(PathBuf::from(value));
                i += 1;
            }
            "--devices" | "-l" => command = Some(Command::Devices),
            "--info" | "-i" => command = Some(Command::Info),
            "--get" | "-g" => {
                let value = args.get(i + 1).ok_or(CliError::MissingValue("--get"))?;
                command = Some(Command::Get(parse_path(value)?));
                i += 1;
            }
            "--set" | "-s" => {
                let value = args.get(i + 1).ok_or(CliError::MissingValue("--set"))?;
                command = Some(Command::Set(value.clone()));
                i += 1;
            }
            "--level" => {
                let (kind, channel) = match (args.get(i + 1), args.get(i + 2)) {
                    (Some(kind), Some(channel)) => (kind, channel),
                    _ => return Err(CliError::MissingValue("--level").into()),
                };
                let level_type = kind
                    .parse()
                    .ok()
                    .and_then(LevelType::from_code)
                    .ok_or_else(|| CliError::BadLevelType(kind.clone()))?;
                let channel = channel
                    .parse()
                    .map_err(|_| CliError::BadChannel(channel.clone()))?;
                command = Some(Command::Level(level_type, channel));
                i += 2;
            }
            "--watch" | "-w" => {
                let mut paths = Vec::new();
                while let Some(next) = args.get(i + 1).filter(|a| !a.starts_with('-')) {
                    paths.push(parse_path(next)?);
                    i += 1;
                }
                command = Some(Command::Watch(paths));
            }
            "--launch" => {
                let value = args.get(i + 1).ok_or(CliError::MissingValue("--launch"))?;
                let kind = value.parse::<EngineKind>().map_err(anyhow::Error::msg)?;
                command = Some(Command::Launch(kind));
                i += 1;
            }
            arg => {
                print_help();
                return Err(CliError::UnknownArgument(arg.to_string()).into());
            }
        }
        i += 1;
    }

    let Some(command) = command else {
        print_help();
        return Ok(());
    };

    let config = match config_path {
        Some(path) => RemoteConfig::load_from(&path),
        None => RemoteConfig::load(),
    };
    let remote = Remote::init(config).context("Failed to bind the Voicemeeter remote library")?;

    match command {
        Command::Launch(kind) => {
            remote.launch(kind)?;
            println!("Started {kind}");
            Ok(())
        }
        Command::Watch(paths) => watch(remote, paths),
        command => {
            remote.connect().context("Failed to connect to Voicemeeter")?;
            let result = run_once(&remote, command, json);
            if let Err(e) = remote.disconnect() {
                warn!(error = %e, "Disconnect failed");
            }
            result
        }
    }
}

fn parse_path(text: &str) -> Result<ParameterAddress> {
    ParameterAddress::parse(text).ok_or_else(|| CliError::BadPath(text.to_string()).into())
}

fn print_help() {
    println!("Usage: vmremote [OPTIONS] COMMAND");
    println!();
    println!("Commands:");
    println!("  -l, --devices           List the audio devices the engine sees");
    println!("  -i, --info              Show engine edition, version and devices");
    println!("  -g, --get PATH          Read one parameter");
    println!("  -s, --set SCRIPT        Issue a parameter script");
    println!("      --level TYPE INDEX  Read one meter level (TYPE 0-3)");
    println!("  -w, --watch [PATH...]   Print changes until Ctrl+C");
    println!("      --launch KIND       Start standard, banana or potato");
    println!();
    println!("Options:");
    println!("  -c, --config FILE       Use this config file");
    println!("      --json              Print results as JSON");
    println!("  -v, --version           Show version");
    println!("  -h, --help              Show this help");
    println!();
    println!("Examples:");
    println!("  vmremote --get \"Strip[0].Gain\"");
    println!("  vmremote --set \"Strip[0].Gain=-6;Bus[1].Mute=1;\"");
    println!("  vmremote --watch \"Strip[0].Gain\" \"Bus[0].Mute\"");
}

fn run_once(remote: &Remote, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Devices => {
            let devices = remote.refresh_devices()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&devices)?);
            } else {
                print_devices(&devices);
            }
        }
        Command::Info => {
            let report = InfoReport {
                state: remote.state(),
                kind: remote.engine_kind(),
                version: remote.version(),
                devices: remote.refresh_devices()?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                if let Some(kind) = report.kind {
                    let (strips, buses) = kind.layout();
                    println!("{kind} ({strips} strips, {buses} buses)");
                }
                if let Some(version) = report.version {
                    println!("Version: {version}");
                }
                println!();
                print_devices(&report.devices);
            }
        }
        Command::Get(address) => {
            let value = remote.get(&address)?;
            if json {
                let out = serde_json::json!({ "path": address.path(), "value": value });
                println!("{out}");
            } else {
                println!("{address} = {value}");
            }
        }
        Command::Set(script) => {
            remote.set_raw(&script)?;
            info!(script = %script, "Script applied");
        }
        Command::Level(level_type, channel) => {
            let level = remote.level(level_type, channel)?;
            if json {
                println!("{}", serde_json::json!({ "channel": channel, "level": level }));
            } else {
                println!("{level_type:?}[{channel}] = {level:.4}");
            }
        }
        Command::Watch(_) | Command::Launch(_) => {}
    }
    Ok(())
}

fn print_devices(devices: &DeviceDirectory) {
    if devices.is_empty() {
        println!("No devices reported.");
        return;
    }
    for (title, list) in [("Outputs", &devices.outputs), ("Inputs", &devices.inputs)] {
        println!("{title} ({}):", list.len());
        for (i, device) in list.iter().enumerate() {
            println!("  {}. {} [type {}]", i + 1, device.name, device.kind);
            if !device.hardware_id.is_empty() {
                println!("     {}", device.hardware_id);
            }
        }
        println!();
    }
}

/// Print change notifications until Ctrl+C
fn watch(remote: Remote, paths: Vec<ParameterAddress>) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .ok();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let handle = RemoteHandle::spawn(remote);
        handle
            .connect()
            .await
            .context("Failed to connect to Voicemeeter")?;
        let (subscription, mut changes) = handle.changes().await?;

        println!("Watching for changes. Press Ctrl+C to stop.");
        println!("────────────────────────────────────────");

        while running.load(Ordering::SeqCst) {
            match tokio::time::timeout(Duration::from_millis(100), changes.recv()).await {
                Ok(Some(())) => {
                    let stamp = chrono::Local::now().format("%H:%M:%S%.3f");
                    if paths.is_empty() {
                        println!("[{stamp}] parameters changed");
                    }
                    for address in &paths {
                        match handle.get(address.clone()).await {
                            Ok(value) => println!("[{stamp}] {address} = {value}"),
                            Err(e) => warn!(path = %address, error = %e, "Read failed"),
                        }
                    }
                }
                Ok(None) => break,
                Err(_) => {}
            }
        }

        println!();
        println!("Stopping...");
        subscription.unsubscribe();
        handle.disconnect().await?;
        println!("Done.");
        Ok::<(), anyhow::Error>(())
    })
}
