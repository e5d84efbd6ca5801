//! mousehz CLI
//!
//! Live mouse polling-rate meter with optional CSV logging.

use clap::{Parser, Subcommand};
use crossbeam_channel::{never, select, unbounded, Receiver};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mousehz::{
    collector::{check_permission, raise_process_priority, Collector, CollectorConfig, DeviceKind},
    config::Config,
    core::PollMeter,
    export::EXPORT_FILENAME,
    Snapshot, VERSION,
};

#[derive(Parser)]
#[command(name = "mousehz")]
#[command(version = VERSION)]
#[command(about = "Mouse polling-rate meter using raw motion event timing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start measuring the polling rate
    Start {
        /// Rolling window capacity (number of samples to average over)
        #[arg(long)]
        window: Option<usize>,

        /// Begin with CSV logging already enabled
        #[arg(long)]
        log: bool,

        /// Directory to export the CSV log into
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Stop automatically after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Show configuration
    Config,
}

/// Control-surface commands read from stdin while the meter runs.
enum ControlCommand {
    Clear,
    ToggleLogging,
    Quit,
}

impl ControlCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "clear" | "c" => Some(ControlCommand::Clear),
            "log" | "l" => Some(ControlCommand::ToggleLogging),
            "quit" | "q" | "exit" => Some(ControlCommand::Quit),
            _ => None,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            window,
            log,
            output,
            duration,
        } => {
            cmd_start(window, log, output, duration);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_start(
    window: Option<usize>,
    log_from_start: bool,
    output: Option<PathBuf>,
    duration: Option<u64>,
) {
    println!("mousehz v{VERSION}");
    println!();

    if !check_permission() {
        eprintln!("Error: input monitoring permission not granted.");
        eprintln!();
        eprintln!("Raw motion events cannot be captured without it. On macOS, grant");
        eprintln!("Input Monitoring access in System Settings > Privacy & Security,");
        eprintln!("then restart mousehz.");
        std::process::exit(1);
    }

    // Reduce scheduling jitter where the platform allows it; failure is
    // harmless, the measurement just sees a little more noise
    let _ = raise_process_priority();

    // Load configuration and apply per-run overrides
    let mut config = Config::load().unwrap_or_default();
    if let Some(capacity) = window {
        config.window_capacity = capacity;
    }
    if let Some(dir) = output {
        config.export_path = dir;
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: could not create export directory: {e}");
    }

    let export_path = config.export_path.join(EXPORT_FILENAME);
    let mut meter = PollMeter::new(config.window_capacity, export_path);
    if log_from_start {
        meter.start_logging();
    }

    let mut collector = Collector::new(CollectorConfig::default());
    if let Err(e) = collector.start() {
        // Fatal to the feature: no events will ever arrive
        eprintln!("Error: could not register for raw motion events: {e}");
        std::process::exit(1);
    }

    println!("Measuring... move the mouse.");
    println!("  Window capacity: {} samples", config.window_capacity);
    println!("  CSV export: {:?}", meter.export_path());
    println!(
        "  Logging: {}",
        if meter.is_logging() { "on" } else { "off" }
    );
    println!();
    println!("Commands: clear (reset stats), log (toggle CSV logging), quit. Ctrl+C stops.");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let mut commands = spawn_stdin_reader();
    let events = collector.receiver().clone();

    let started = Instant::now();
    let refresh = Duration::from_millis(config.refresh_interval_ms);
    let mut last_refresh = Instant::now();
    let mut dirty = true;

    while running.load(Ordering::SeqCst) {
        select! {
            recv(events) -> event => match event {
                Ok(event) => {
                    if event.device == DeviceKind::Mouse
                        && meter.on_event(event.ticks).is_some()
                    {
                        dirty = true;
                    }
                }
                Err(_) => {
                    eprintln!("Collector disconnected unexpectedly");
                    break;
                }
            },
            recv(commands) -> command => match command {
                Ok(ControlCommand::Clear) => {
                    meter.reset_stats();
                    println!();
                    println!("Statistics cleared.");
                    dirty = true;
                }
                Ok(ControlCommand::ToggleLogging) => {
                    println!();
                    toggle_logging(&mut meter);
                    dirty = true;
                }
                Ok(ControlCommand::Quit) => break,
                Err(_) => {
                    // stdin closed; a disconnected channel is permanently
                    // ready in select!, so swap in one that never fires and
                    // let the loop rest on the default timeout
                    commands = never();
                }
            },
            default(Duration::from_millis(50)) => {}
        }

        if dirty && last_refresh.elapsed() >= refresh {
            print_status_line(&meter.snapshot(), meter.is_logging());
            last_refresh = Instant::now();
            dirty = false;
        }

        if let Some(limit) = duration {
            if started.elapsed() >= Duration::from_secs(limit) {
                break;
            }
        }
    }

    println!();
    println!();
    println!("Stopping...");
    collector.stop();

    if meter.is_logging() {
        match meter.stop_logging() {
            Ok(path) => println!("Saved CSV log to {path:?}"),
            Err(e) => {
                eprintln!("Error: {e}");
                eprintln!(
                    "{} records are still buffered; the intended path was {:?}",
                    meter.pending_records(),
                    meter.export_path()
                );
            }
        }
    }

    print_summary(&meter.snapshot(), started.elapsed());
}

fn toggle_logging(meter: &mut PollMeter) {
    if meter.is_logging() {
        match meter.stop_logging() {
            Ok(path) => println!("Logging stopped. Saved CSV log to {path:?}"),
            Err(e) => {
                eprintln!("Error: {e}");
                eprintln!(
                    "Logging stopped; {} records kept in memory. Enter `log` twice to retry \
                     the export.",
                    meter.pending_records()
                );
            }
        }
    } else {
        meter.start_logging();
        println!("Logging started (stop with `log`).");
    }
}

fn print_status_line(snapshot: &Snapshot, logging: bool) {
    print!(
        "\rInstant: {:6.0} Hz | Avg ({:>3}): {:6.0} Hz | Peak: {:6.0} Hz | Samples: {:<8}{}",
        snapshot.instant_hz,
        snapshot.window_count,
        snapshot.average_hz,
        snapshot.peak_hz,
        snapshot.total_samples,
        if logging { " [LOG]" } else { "      " }
    );
    let _ = std::io::stdout().flush();
}

fn print_summary(snapshot: &Snapshot, elapsed: Duration) {
    println!();
    println!("Session summary:");
    println!("  Duration: {:.1}s", elapsed.as_secs_f64());
    println!("  Samples accepted: {}", snapshot.total_samples);
    println!("  Peak: {:.0} Hz", snapshot.peak_hz);
    println!(
        "  Average over last {} samples: {:.0} Hz",
        snapshot.window_count, snapshot.average_hz
    );
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Read control commands from stdin on a background thread.
fn spawn_stdin_reader() -> Receiver<ControlCommand> {
    let (sender, receiver) = unbounded();

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = ControlCommand::parse(&line) {
                if sender.send(command).is_err() {
                    break;
                }
            }
        }
    });

    receiver
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert!(matches!(
            ControlCommand::parse(" Clear \n"),
            Some(ControlCommand::Clear)
        ));
        assert!(matches!(
            ControlCommand::parse("l"),
            Some(ControlCommand::ToggleLogging)
        ));
        assert!(matches!(
            ControlCommand::parse("QUIT"),
            Some(ControlCommand::Quit)
        ));
        assert!(ControlCommand::parse("bogus").is_none());
    }

    #[test]
    fn test_closed_command_channel_rests_on_timeout() {
        // Same arm structure as the cmd_start loop: once the command
        // sender is gone, the receiver must be swapped for never() or the
        // disconnected arm stays ready and the loop spins flat out.
        let (sender, mut commands) = unbounded::<ControlCommand>();
        drop(sender);

        let started = Instant::now();
        let mut iterations = 0u32;
        while started.elapsed() < Duration::from_millis(200) {
            iterations += 1;
            select! {
                recv(commands) -> command => {
                    if command.is_err() {
                        commands = never();
                    }
                }
                default(Duration::from_millis(50)) => {}
            }
        }

        // ~4 wakeups expected from the 50ms timeout; spinning means thousands
        assert!(iterations < 50, "loop iterated {iterations} times");
    }
}
