//! `roverbit-hal` – Hardware Abstraction Layer
//!
//! The control core never touches hardware directly.  It talks to four
//! collaborator traits, and drivers (real, console, or simulated) implement
//! them.
//!
//! # Modules
//!
//! - [`motion`] – [`Motion`][motion::Motion]: drive, turn, stop, and an
//!   optional servo.
//! - [`display`] – [`Presentation`][display::Presentation]: LED matrix,
//!   text, tones, melodies, and the timed `pause` primitive.
//! - [`radio`] – [`Radio`][radio::Radio]: transport group selection.
//! - [`clock`] – [`Clock`][clock::Clock]: monotonic time since start.
//! - [`console`] – drivers that log every call through `tracing` and sleep for
//!   real on timed operations.  Used by the `roverbit` binary.
//! - [`sim`] – recording test doubles sharing a [`CallLog`][sim::CallLog] and
//!   a manually advanced [`SimClock`][sim::SimClock].

pub mod clock;
pub mod console;
pub mod display;
pub mod motion;
pub mod radio;
pub mod sim;

pub use clock::{Clock, SystemClock};
pub use display::Presentation;
pub use motion::Motion;
pub use radio::Radio;
