//! Generic `Presentation` trait for the LED matrix and tone output.

use std::time::Duration;

use roverbit_types::{ArrowDirection, Icon, LedFrame, Melody, MelodyMode, Note, RoverError};

/// The rover's display and speaker.
///
/// Showing things returns immediately.  `play_tone` and `pause` block the
/// caller for their duration; a background melody does not.
pub trait Presentation: Send {
    fn show_arrow(&mut self, direction: ArrowDirection) -> Result<(), RoverError>;

    fn show_icon(&mut self, icon: Icon) -> Result<(), RoverError>;

    fn show_leds(&mut self, frame: &LedFrame) -> Result<(), RoverError>;

    fn show_string(&mut self, text: &str) -> Result<(), RoverError>;

    fn show_number(&mut self, value: i32) -> Result<(), RoverError>;

    /// Blank the LED matrix.
    fn clear(&mut self) -> Result<(), RoverError>;

    /// Play `note` and return once it has finished.
    fn play_tone(&mut self, note: Note, duration: Duration) -> Result<(), RoverError>;

    /// Start a built-in melody.
    fn begin_melody(&mut self, melody: Melody, mode: MelodyMode) -> Result<(), RoverError>;

    /// Silence any melody started with [`begin_melody`][Self::begin_melody].
    fn stop_melody(&mut self) -> Result<(), RoverError>;

    /// Hold the current output for `duration`.
    fn pause(&mut self, duration: Duration) -> Result<(), RoverError>;
}
