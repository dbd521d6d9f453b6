//! `roverbit-middleware` – In-process Radio Transport
//!
//! Carries string commands from a remote controller to the rover without
//! caring what they mean.
//!
//! # Modules
//!
//! - [`radio_bus`] – [`RadioBus`][radio_bus::RadioBus]: a shared "air" built
//!   on Tokio broadcast channels, and [`RadioLink`][radio_bus::RadioLink],
//!   the rover's transceiver.  The link implements the HAL
//!   [`Radio`][roverbit_hal::Radio] trait and only hears packets sent to the
//!   group it has joined.

pub mod radio_bus;

pub use radio_bus::{RadioBus, RadioLink, RadioReceiver};
