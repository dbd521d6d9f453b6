//! Generic `Motion` trait for the rover's drive train.
//!
//! Drivers implement this trait and are handed to the controller at
//! construction.  The control core only ever talks to the trait, so the same
//! dispatch logic runs against real motors, the console driver, or the
//! recording simulation.

use roverbit_types::RoverError;

/// The rover's differential drive plus an optional servo.
///
/// Speeds are percentages of full power.  `drive_straight` accepts a signed
/// speed (negative reverses); the turn commands take a magnitude.
pub trait Motion: Send {
    /// Drive both wheels at `speed`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the command cannot be applied.
    fn drive_straight(&mut self, speed: i32) -> Result<(), RoverError>;

    /// Spin to the left at `speed`.
    fn turn_left(&mut self, speed: i32) -> Result<(), RoverError>;

    /// Spin to the right at `speed`.
    fn turn_right(&mut self, speed: i32) -> Result<(), RoverError>;

    /// Cut power to both wheels.
    fn stop(&mut self) -> Result<(), RoverError>;

    /// Move the servo to `position` degrees.
    ///
    /// Rovers without a servo keep the default, which reports a fault.
    fn set_servo_position(&mut self, position: u16) -> Result<(), RoverError> {
        Err(RoverError::hardware(
            "servo",
            format!("no servo fitted (requested position {position})"),
        ))
    }
}
