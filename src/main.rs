//! Seat heater controller: host runner.
//!
//! Wires the coordination core to simulated hardware:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  stdin thread (interrupt controller)                         │
//! │    d / p        → Controller::press(seat)                    │
//! │    t <celsius>  → SimSensor::set                             │
//! │                                                              │
//! │  ──────────────────── Port Trait Boundary ───────────────    │
//! │                                                              │
//! │  edge-executor LocalExecutor: eight tasks                    │
//! │    SimSensor · LogActuator · StdoutConsole                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use embassy_time::Duration;
use log::{info, warn};

use seatheat::adapters::console::StdoutConsole;
use seatheat::adapters::sim::{LogActuator, SimSensor};
use seatheat::app::state::{Celsius, Seat};
use seatheat::app::system::Controller;
use seatheat::config::ControllerConfig;

/// Dual-seat heater controller running against simulated hardware
#[derive(Parser, Debug)]
#[command(name = "seatheat")]
#[command(about = "Dual-seat heater controller (host simulation)", long_about = None)]
#[command(version)]
struct Args {
    /// JSON file overriding the default periods and thresholds
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many milliseconds (default: run until killed)
    #[arg(long, value_name = "MS")]
    duration_ms: Option<u64>,

    /// Initial simulated temperature
    #[arg(long, value_name = "CELSIUS", default_value_t = seatheat::adapters::sim::DEFAULT_SIM_TEMPERATURE)]
    temperature: Celsius,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// One line typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Press(Seat),
    SetTemperature(Celsius),
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let cmd = match words.next()? {
        "d" => Command::Press(Seat::Driver),
        "p" => Command::Press(Seat::Passenger),
        "t" => Command::SetTemperature(words.next()?.parse().ok()?),
        _ => return None,
    };
    words.next().is_none().then_some(cmd)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!("seatheat v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref())?;
    config
        .validate()
        .context("invalid controller configuration")?;

    let controller = Arc::new(Controller::new(config, StdoutConsole::new()));
    let sensor = Arc::new(SimSensor::new(args.temperature));

    spawn_input_thread(Arc::clone(&controller), Arc::clone(&sensor))?;
    info!("input: d/p press a seat button, t <n> sets the sensor temperature");

    match args.duration_ms {
        Some(ms) => {
            controller.run_for(&*sensor, LogActuator::new(), Duration::from_millis(ms));
            info!("run finished after {ms} ms");
        }
        None => controller.run(&*sensor, LogActuator::new()),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ControllerConfig> {
    let Some(path) = path else {
        return Ok(ControllerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!("config loaded from {}", path.display());
    Ok(config)
}

/// Stdin plays the interrupt controller. The thread is detached; it ends
/// with the process.
fn spawn_input_thread(
    controller: Arc<Controller<StdoutConsole>>,
    sensor: Arc<SimSensor>,
) -> Result<()> {
    std::thread::Builder::new()
        .name("input".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(Command::Press(seat)) => controller.press(seat),
                    Some(Command::SetTemperature(c)) => {
                        sensor.set(c);
                        info!("input: sensor now reads {c}");
                    }
                    None if line.trim().is_empty() => {}
                    None => warn!("input: unrecognised command {:?}", line.trim()),
                }
            }
        })
        .context("spawning input thread")?;
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
