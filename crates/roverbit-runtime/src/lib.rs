//! `roverbit-runtime` – Controller & Scheduler
//!
//! Wires the kernel to concrete drivers and runs it.
//!
//! # Modules
//!
//! - [`rover`] – [`Rover`][rover::Rover]: the single owner of all control
//!   state and drivers.  Exposes the process hooks: best-effort
//!   [`startup`][rover::Rover::startup] self-checks, the
//!   [`on_command`][rover::Rover::on_command] radio callback, and the
//!   scheduler [`tick`][rover::Rover::tick].  Every hook runs under
//!   [`run_safely`][roverbit_kernel::run_safely], so no failure escapes.
//! - [`rover_loop`] – [`RoverLoop`][rover_loop::RoverLoop]: one worker thread
//!   draining a command queue and ticking the watchdog in between, which
//!   serialises every hook call.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber with an optional OTLP span exporter.

pub mod rover;
pub mod rover_loop;
pub mod telemetry;

pub use rover::{Hardware, Rover, RoverConfig, StartupReport};
pub use rover_loop::RoverLoop;
pub use telemetry::{TracerProviderGuard, init_tracing};
