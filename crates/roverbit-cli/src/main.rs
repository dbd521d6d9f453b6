//! `roverbit` – run the rover controller on console drivers.
//!
//! This binary:
//!
//! 1. Loads `~/.roverbit/config.toml`, writing the defaults on first run.
//! 2. Runs the startup self-checks and prints the report.
//! 3. Hands the rover to a [`RoverLoop`] worker thread.
//! 4. Acts as the operator's remote: each line typed on stdin is transmitted
//!    on the configured radio group, and everything the rover's transceiver
//!    hears is forwarded to the worker.
//! 5. Intercepts **Ctrl-C** to stop the motors and exit.

mod config;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use roverbit_hal::SystemClock;
use roverbit_hal::console::{ConsoleDisplay, ConsoleMotion};
use roverbit_middleware::{RadioBus, RadioReceiver};
use roverbit_runtime::{Hardware, Rover, RoverConfig, RoverLoop, StartupReport};

fn main() -> ExitCode {
    let _telemetry = roverbit_runtime::init_tracing("roverbit");

    print_banner();

    let rover_config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };
    let group = rover_config.radio_group;

    // ── Shutdown flag ─────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_ctrlc = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the rover …".yellow().bold());
        shutdown_ctrlc.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; use Ctrl-D to exit");
    }

    // ── Radio ─────────────────────────────────────────────────────────────
    let bus = RadioBus::default();
    let link = bus.link();
    let inbound = link.subscribe();

    let hardware = Hardware {
        motion: Box::new(ConsoleMotion::new()),
        display: Box::new(ConsoleDisplay::new()),
        radio: Box::new(link),
        clock: Arc::new(SystemClock::new()),
    };

    // ── Startup ───────────────────────────────────────────────────────────
    let mut rover = Rover::new(rover_config, hardware);
    let report = rover.startup();
    print_report(&report);

    let (commands, queue) = mpsc::channel::<String>();
    let worker = match RoverLoop::new(rover, queue, shutdown.clone()).spawn() {
        Ok(handle) => handle,
        Err(e) => {
            println!("{}: {}", "Failed to start rover loop".red(), e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "\n  Type {} / {} / {} / {} and press Enter to transmit on group {}.",
        "Forward".bold(),
        "Backward".bold(),
        "Left".bold(),
        "Right".bold(),
        group.to_string().bold()
    );
    println!("  Ctrl-D or Ctrl-C exits.\n");

    // ── Remote ────────────────────────────────────────────────────────────
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            println!("{}: {}", "Failed to start async runtime".red(), e);
            shutdown.store(true, Ordering::SeqCst);
            let _ = worker.join();
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(remote(bus, group, inbound, commands, shutdown.clone()));
    // Stdin is read on a blocking thread that cannot be cancelled.
    runtime.shutdown_timeout(Duration::from_millis(100));

    shutdown.store(true, Ordering::SeqCst);
    match worker.join() {
        Ok(rover) => {
            info!(state = ?rover.state(), "rover stopped");
            println!("{}", "  ✓ Motors stopped. Goodbye.".green());
            ExitCode::SUCCESS
        }
        Err(_) => {
            println!("{}", "Rover loop panicked".red());
            ExitCode::FAILURE
        }
    }
}

/// Read the config file, falling back to (and saving) the defaults.
fn load_config() -> Result<RoverConfig, roverbit_types::RoverError> {
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  Wrote default config to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("  {} {}", "Could not save default config:".yellow(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };
    println!("  Profile: {}", cfg.profile.to_string().cyan());
    cfg.to_rover_config()
}

/// Transmit stdin lines and forward received packets to the worker until
/// stdin closes, the worker goes away, or the shutdown flag is raised.
async fn remote(
    bus: RadioBus,
    group: u8,
    mut inbound: RadioReceiver,
    commands: mpsc::Sender<String>,
    shutdown: Arc<AtomicBool>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(Duration::from_millis(100));

    loop {
        tokio::select! {
            packet = inbound.recv() => {
                let Some(packet) = packet else { break };
                if commands.send(packet.payload).is_err() {
                    break;
                }
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let token = line.trim();
                        if token.is_empty() {
                            continue;
                        }
                        if let Err(e) = bus.send(group, token) {
                            warn!(error = %e, "transmit failed");
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
            _ = poll.tick() => {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
            }
        }
    }
}

fn print_report(report: &StartupReport) {
    println!("\n  Startup checks:");
    for (label, outcome) in report.steps() {
        match outcome.failure() {
            None => println!("    {} {}", "✓".green(), label),
            Some(reason) => println!("    {} {} – {}", "✗".red(), label, reason.dimmed()),
        }
    }
    if !report.all_succeeded() {
        println!(
            "  {}",
            "Some checks failed; the rover will keep running.".yellow()
        );
    }
}

fn print_banner() {
    println!();
    println!("{}", "  ┌──────────────────────────────┐".cyan());
    println!("{}", "  │   roverbit remote control    │".cyan().bold());
    println!("{}", "  └──────────────────────────────┘".cyan());
    println!();
}
