//! Console drivers that narrate hardware calls through `tracing`.
//!
//! These stand in for the motor board and LED matrix when the rover runs on a
//! desktop.  Timed operations really sleep, so the control loop sees the same
//! blocking behaviour it would on the device.

use std::thread;
use std::time::Duration;

use roverbit_types::{ArrowDirection, Icon, LedFrame, Melody, MelodyMode, Note, RoverError};
use tracing::{debug, info};

use crate::display::Presentation;
use crate::motion::Motion;

// ────────────────────────────────────────────────────────────────────────────
// Motion
// ────────────────────────────────────────────────────────────────────────────

/// Drive train that logs each command and tracks whether it is moving.
#[derive(Debug, Default)]
pub struct ConsoleMotion {
    moving: bool,
    servo: Option<u16>,
}

impl ConsoleMotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` after a drive or turn command until the next `stop`.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn servo_position(&self) -> Option<u16> {
        self.servo
    }
}

impl Motion for ConsoleMotion {
    fn drive_straight(&mut self, speed: i32) -> Result<(), RoverError> {
        info!(speed, "motors: drive straight");
        self.moving = speed != 0;
        Ok(())
    }

    fn turn_left(&mut self, speed: i32) -> Result<(), RoverError> {
        info!(speed, "motors: turn left");
        self.moving = speed != 0;
        Ok(())
    }

    fn turn_right(&mut self, speed: i32) -> Result<(), RoverError> {
        info!(speed, "motors: turn right");
        self.moving = speed != 0;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RoverError> {
        info!("motors: stop");
        self.moving = false;
        Ok(())
    }

    fn set_servo_position(&mut self, position: u16) -> Result<(), RoverError> {
        if position > 180 {
            return Err(RoverError::hardware(
                "servo",
                format!("position {position} outside 0..=180"),
            ));
        }
        info!(position, "servo: set position");
        self.servo = Some(position);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Presentation
// ────────────────────────────────────────────────────────────────────────────

/// Display and speaker that log what would be shown or heard.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    melody: Option<Melody>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presentation for ConsoleDisplay {
    fn show_arrow(&mut self, direction: ArrowDirection) -> Result<(), RoverError> {
        info!(?direction, "display: arrow");
        Ok(())
    }

    fn show_icon(&mut self, icon: Icon) -> Result<(), RoverError> {
        info!(?icon, "display: icon");
        Ok(())
    }

    fn show_leds(&mut self, frame: &LedFrame) -> Result<(), RoverError> {
        debug!("display: leds\n{frame}");
        Ok(())
    }

    fn show_string(&mut self, text: &str) -> Result<(), RoverError> {
        info!(text, "display: string");
        Ok(())
    }

    fn show_number(&mut self, value: i32) -> Result<(), RoverError> {
        info!(value, "display: number");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RoverError> {
        debug!("display: clear");
        Ok(())
    }

    fn play_tone(&mut self, note: Note, duration: Duration) -> Result<(), RoverError> {
        info!(?note, hz = note.frequency_hz(), ms = duration.as_millis() as u64, "speaker: tone");
        thread::sleep(duration);
        Ok(())
    }

    fn begin_melody(&mut self, melody: Melody, mode: MelodyMode) -> Result<(), RoverError> {
        info!(?melody, ?mode, "speaker: begin melody");
        if mode == MelodyMode::ForeverInBackground {
            self.melody = Some(melody);
        }
        Ok(())
    }

    fn stop_melody(&mut self) -> Result<(), RoverError> {
        if let Some(melody) = self.melody.take() {
            info!(?melody, "speaker: stop melody");
        }
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> Result<(), RoverError> {
        thread::sleep(duration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_motion_tracks_movement() {
        let mut motion = ConsoleMotion::new();
        assert!(!motion.is_moving());
        motion.turn_left(50).unwrap();
        assert!(motion.is_moving());
        motion.stop().unwrap();
        assert!(!motion.is_moving());
    }

    #[test]
    fn console_servo_rejects_out_of_range() {
        let mut motion = ConsoleMotion::new();
        assert!(motion.set_servo_position(90).is_ok());
        assert!(motion.set_servo_position(270).is_err());
        assert_eq!(motion.servo_position(), Some(90));
    }

    #[test]
    fn console_display_stops_background_melody() {
        let mut display = ConsoleDisplay::new();
        display
            .begin_melody(Melody::Entertainer, MelodyMode::ForeverInBackground)
            .unwrap();
        assert_eq!(display.melody, Some(Melody::Entertainer));
        display.stop_melody().unwrap();
        assert_eq!(display.melody, None);
    }
}
