//! [`RoverLoop`] – single-consumer worker driving a [`Rover`].
//!
//! The radio transport pushes tokens into a [`std::sync::mpsc`] channel from
//! any thread.  One worker owns the `Rover` and is the only caller of its
//! hooks: it dispatches each token as it arrives and ticks the watchdog
//! whenever no token shows up within the tick interval.  Hooks block for
//! their hold durations, so tokens sent meanwhile queue in the channel and
//! run afterwards in order.
//!
//! The loop ends when the shutdown flag is raised or every sender is
//! dropped.  The rover is stopped and handed back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::rover::Rover;

/// Owns a [`Rover`] and the receiving end of its command queue.
pub struct RoverLoop {
    rover: Rover,
    commands: Receiver<String>,
    shutdown: Arc<AtomicBool>,
}

impl RoverLoop {
    pub fn new(rover: Rover, commands: Receiver<String>, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            rover,
            commands,
            shutdown,
        }
    }

    /// Run on the current thread until shutdown or disconnection.
    pub fn run(mut self) -> Rover {
        let tick_interval = self.rover.config().tick_interval;
        info!(tick_ms = tick_interval.as_millis() as u64, "rover loop started");

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.commands.recv_timeout(tick_interval) {
                Ok(token) => {
                    self.rover.on_command(&token);
                }
                Err(RecvTimeoutError::Timeout) => {
                    let transition = self.rover.tick();
                    debug!(?transition, "tick");
                }
                Err(RecvTimeoutError::Disconnected) => {
                    info!("command channel closed");
                    break;
                }
            }
        }

        info!("rover loop stopping");
        self.rover.shutdown();
        self.rover
    }

    /// Run on a dedicated thread named `rover`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(self) -> std::io::Result<JoinHandle<Rover>> {
        thread::Builder::new()
            .name("rover".to_string())
            .spawn(move || self.run())
    }
}
