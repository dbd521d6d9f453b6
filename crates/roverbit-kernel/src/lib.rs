//! `roverbit-kernel` – Command Dispatch & Idle Supervision
//!
//! The rover's control core.  It owns no hardware; every operation borrows
//! the drivers it needs from `roverbit-hal` for the duration of the call.
//!
//! # Modules
//!
//! - [`sequencer`] – [`Sequencer`][sequencer::Sequencer]: latched one-shot
//!   sound sequences (`Startup`, `Beep`) that play at most once per process,
//!   plus the repeatable idle animation.
//! - [`dispatcher`] – [`CommandDispatcher`][dispatcher::CommandDispatcher]:
//!   maps a [`Command`][roverbit_types::Command] to a timed drive with an
//!   arrow indicator and always leaves the drive train stopped.
//!   [`demo_move`][dispatcher::demo_move] is the startup self-check move.
//! - [`watchdog`] – [`IdleWatchdog`][watchdog::IdleWatchdog]: the
//!   `Active`/`Idle` state machine driven by command recency.
//! - [`safe_invoke`] – [`run_safely`][safe_invoke::run_safely]: runs a step,
//!   logs the outcome, and never lets a failure escape.
//!
//! # Threading
//!
//! All mutable state lives in these structs and is mutated through `&mut
//! self`.  Callers on a multi-threaded host must give one worker exclusive
//! ownership (see `roverbit-runtime`'s `RoverLoop`).

pub mod dispatcher;
pub mod safe_invoke;
pub mod sequencer;
pub mod watchdog;

pub use dispatcher::{CommandDispatcher, DriveSettings, demo_move};
pub use safe_invoke::{StepOutcome, run_safely};
pub use sequencer::{Playback, PlaybackLatches, Sequencer};
pub use watchdog::{ActivityState, IdleWatchdog, Transition};
