//! [`CommandDispatcher`] – turns a radio command into a timed drive.
//!
//! Every recognised direction follows the same script: show the arrow,
//! start the motors, hold for [`DriveSettings::hold`], stop, clear the
//! display.  Anything else gets a bare fail-safe stop.
//!
//! # Safety invariant
//!
//! [`CommandDispatcher::dispatch`] calls [`Motion::stop`] on every path,
//! including the paths where the arrow, the drive command, or the hold
//! failed.  The first failure is still reported to the caller.

use std::time::Duration;

use roverbit_hal::{Motion, Presentation};
use roverbit_types::{ArrowDirection, Command, RoverError};
use tracing::{debug, info};

/// How long the self-check move keeps its arrow on screen.
pub const DEMO_MOVE_HOLD: Duration = Duration::from_millis(1_000);

/// Speed and hold time applied to every drive command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveSettings {
    /// Percentage of full power.  Backward uses the negated value.
    pub speed: i32,
    /// How long the motors run before they are stopped.
    pub hold: Duration,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            speed: 50,
            hold: Duration::from_millis(500),
        }
    }
}

/// Stateless mapping from [`Command`] to drive-train and display calls.
#[derive(Debug, Clone, Default)]
pub struct CommandDispatcher {
    settings: DriveSettings,
}

impl CommandDispatcher {
    pub fn new(settings: DriveSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> DriveSettings {
        self.settings
    }

    /// Execute `command`, blocking for the hold time.
    ///
    /// # Errors
    ///
    /// Returns the first driver failure.  The drive train has been told to
    /// stop regardless.
    pub fn dispatch(
        &self,
        command: &Command,
        motion: &mut dyn Motion,
        display: &mut dyn Presentation,
    ) -> Result<(), RoverError> {
        let Some(arrow) = command.arrow() else {
            debug!(%command, "unrecognised command, fail-safe stop");
            return motion.stop();
        };

        info!(%command, speed = self.settings.speed, "executing drive command");
        let driven = self.drive(command, arrow, motion, display);
        let stopped = motion.stop();
        let cleared = display.clear();
        driven.and(stopped).and(cleared)
    }

    fn drive(
        &self,
        command: &Command,
        arrow: ArrowDirection,
        motion: &mut dyn Motion,
        display: &mut dyn Presentation,
    ) -> Result<(), RoverError> {
        let speed = self.settings.speed;
        display.show_arrow(arrow)?;
        match command {
            Command::Left => motion.turn_left(speed)?,
            Command::Right => motion.turn_right(speed)?,
            Command::Forward => motion.drive_straight(speed)?,
            Command::Backward => motion.drive_straight(-speed)?,
            Command::Unknown(_) => {}
        }
        display.pause(self.settings.hold)
    }
}

/// Startup self-check: show `direction` for a second, clear, then run
/// `followup`.
///
/// Not used for live commands.  The motors are not touched.
pub fn demo_move<F>(
    direction: ArrowDirection,
    display: &mut dyn Presentation,
    followup: F,
) -> Result<(), RoverError>
where
    F: FnOnce() -> Result<(), RoverError>,
{
    info!(?direction, "demo move");
    display.show_arrow(direction)?;
    display.pause(DEMO_MOVE_HOLD)?;
    display.clear()?;
    followup()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roverbit_hal::Clock;
    use roverbit_hal::sim::{CallLog, HardwareCall, SimDisplay, SimMotion, SimRig};

    fn run(command: Command) -> SimRig {
        let rig = SimRig::new();
        let mut motion = rig.motion();
        let mut display = rig.display();
        CommandDispatcher::default()
            .dispatch(&command, &mut motion, &mut display)
            .unwrap();
        rig
    }

    #[test]
    fn each_direction_follows_the_drive_script() {
        let cases = [
            (Command::Left, ArrowDirection::East, HardwareCall::TurnLeft(50)),
            (Command::Right, ArrowDirection::West, HardwareCall::TurnRight(50)),
            (Command::Forward, ArrowDirection::North, HardwareCall::DriveStraight(50)),
            (Command::Backward, ArrowDirection::South, HardwareCall::DriveStraight(-50)),
        ];
        for (command, arrow, drive) in cases {
            let rig = run(command);
            assert_eq!(
                rig.log().calls(),
                vec![
                    HardwareCall::Arrow(arrow),
                    drive,
                    HardwareCall::Pause(Duration::from_millis(500)),
                    HardwareCall::Stop,
                    HardwareCall::Clear,
                ]
            );
            assert_eq!(rig.clock().now(), Duration::from_millis(500));
        }
    }

    #[test]
    fn drive_train_ends_stopped_for_every_direction() {
        for token in ["Left", "Right", "Forward", "Backward", "Jump"] {
            let rig = run(Command::parse(token));
            assert_eq!(rig.log().motion_calls().last(), Some(&HardwareCall::Stop));
        }
    }

    #[test]
    fn unknown_command_only_stops() {
        let rig = run(Command::parse("Sideways"));
        assert_eq!(rig.log().calls(), vec![HardwareCall::Stop]);
        assert_eq!(rig.clock().now(), Duration::ZERO);
    }

    #[test]
    fn custom_settings_change_speed_and_hold() {
        let rig = SimRig::new();
        let mut motion = rig.motion();
        let mut display = rig.display();
        let dispatcher = CommandDispatcher::new(DriveSettings {
            speed: 80,
            hold: Duration::from_millis(250),
        });
        dispatcher
            .dispatch(&Command::Backward, &mut motion, &mut display)
            .unwrap();
        assert!(rig.log().calls().contains(&HardwareCall::DriveStraight(-80)));
        assert_eq!(rig.clock().now(), Duration::from_millis(250));
    }

    #[test]
    fn failed_drive_still_stops_and_reports() {
        let log = CallLog::new();
        let mut motion = SimMotion::new(log.clone()).failing_drive();
        let mut display = SimDisplay::new(log.clone());

        let err = CommandDispatcher::default()
            .dispatch(&Command::Forward, &mut motion, &mut display)
            .unwrap_err();

        assert!(err.to_string().contains("injected drive fault"));
        assert_eq!(
            log.calls(),
            vec![
                HardwareCall::Arrow(ArrowDirection::North),
                HardwareCall::DriveStraight(50),
                HardwareCall::Stop,
                HardwareCall::Clear,
            ]
        );
    }

    #[test]
    fn failed_arrow_still_stops_without_driving() {
        let log = CallLog::new();
        let mut motion = SimMotion::new(log.clone());
        let mut display = SimDisplay::new(log.clone()).failing_arrows();

        assert!(
            CommandDispatcher::default()
                .dispatch(&Command::Left, &mut motion, &mut display)
                .is_err()
        );
        assert_eq!(log.motion_calls(), vec![HardwareCall::Stop]);
    }

    #[test]
    fn demo_move_shows_arrow_then_runs_followup() {
        let rig = SimRig::new();
        let mut display = rig.display();
        let mut followed = false;

        demo_move(ArrowDirection::North, &mut display, || {
            followed = true;
            Ok(())
        })
        .unwrap();

        assert!(followed);
        assert_eq!(
            rig.log().calls(),
            vec![
                HardwareCall::Arrow(ArrowDirection::North),
                HardwareCall::Pause(DEMO_MOVE_HOLD),
                HardwareCall::Clear,
            ]
        );
    }

    #[test]
    fn demo_move_skips_followup_when_display_fails() {
        let mut display = SimDisplay::new(CallLog::new()).failing_arrows();
        let mut followed = false;
        let result = demo_move(ArrowDirection::North, &mut display, || {
            followed = true;
            Ok(())
        });
        assert!(result.is_err());
        assert!(!followed);
    }
}
