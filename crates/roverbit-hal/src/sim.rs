//! In-process simulation drivers for testing without physical hardware.
//!
//! Every simulated driver appends to a shared [`CallLog`], so a test can hand
//! the drivers to the controller and still inspect the exact sequence of
//! hardware calls afterwards.  [`SimDisplay`] can advance a [`SimClock`] on
//! every `pause` and `play_tone`, which makes hold durations observable
//! without real sleeping.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use roverbit_hal::sim::{HardwareCall, SimRig};
//! use roverbit_hal::{Clock, Motion, Presentation};
//!
//! let rig = SimRig::new();
//! let mut motion = rig.motion();
//! let mut display = rig.display();
//!
//! motion.drive_straight(50).unwrap();
//! display.pause(Duration::from_millis(500)).unwrap();
//! motion.stop().unwrap();
//!
//! assert_eq!(rig.clock().now(), Duration::from_millis(500));
//! assert_eq!(rig.log().last(), Some(HardwareCall::Stop));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use roverbit_types::{ArrowDirection, Icon, LedFrame, Melody, MelodyMode, Note, RoverError};

use crate::clock::Clock;
use crate::display::Presentation;
use crate::motion::Motion;
use crate::radio::Radio;

// ────────────────────────────────────────────────────────────────────────────
// Call log
// ────────────────────────────────────────────────────────────────────────────

/// One recorded hardware call.
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareCall {
    DriveStraight(i32),
    TurnLeft(i32),
    TurnRight(i32),
    Stop,
    Servo(u16),
    Arrow(ArrowDirection),
    Icon(Icon),
    Leds(LedFrame),
    Text(String),
    Number(i32),
    Clear,
    Tone(Note, Duration),
    BeginMelody(Melody, MelodyMode),
    StopMelody,
    Pause(Duration),
    SetGroup(u8),
}

impl HardwareCall {
    /// `true` for calls that go to the drive train.
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            HardwareCall::DriveStraight(_)
                | HardwareCall::TurnLeft(_)
                | HardwareCall::TurnRight(_)
                | HardwareCall::Stop
                | HardwareCall::Servo(_)
        )
    }
}

/// Shared, ordered record of hardware calls.  Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<HardwareCall>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<HardwareCall>> {
        // A panicking test driver must not hide the calls made before it.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, call: HardwareCall) {
        self.entries().push(call);
    }

    /// Copy of every call recorded so far.
    pub fn calls(&self) -> Vec<HardwareCall> {
        self.entries().clone()
    }

    /// Only the drive-train calls, in order.
    pub fn motion_calls(&self) -> Vec<HardwareCall> {
        self.entries().iter().filter(|c| c.is_motion()).cloned().collect()
    }

    pub fn last(&self) -> Option<HardwareCall> {
        self.entries().last().cloned()
    }

    pub fn count(&self, predicate: impl Fn(&HardwareCall) -> bool) -> usize {
        self.entries().iter().filter(|c| predicate(c)).count()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Clock
// ────────────────────────────────────────────────────────────────────────────

/// Manually advanced clock with millisecond resolution.  Clones share time.
#[derive(Debug, Clone, Default)]
pub struct SimClock(Arc<AtomicU64>);

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Jump to `at`.  Ignored if `at` is in the past, keeping the clock
    /// monotonic.
    pub fn set(&self, at: Duration) {
        self.0.fetch_max(at.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.0.load(Ordering::SeqCst))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub drive train
// ────────────────────────────────────────────────────────────────────────────

/// Simulated drive train.  Succeeds unless a fault has been injected.
#[derive(Debug, Clone, Default)]
pub struct SimMotion {
    log: CallLog,
    fail_drive: bool,
    fail_stop: bool,
}

impl SimMotion {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Make every drive and turn command fail after it is recorded.
    pub fn failing_drive(mut self) -> Self {
        self.fail_drive = true;
        self
    }

    /// Make `stop` fail after it is recorded.
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    fn drive(&self, call: HardwareCall) -> Result<(), RoverError> {
        self.log.record(call);
        if self.fail_drive {
            return Err(RoverError::hardware("sim_motion", "injected drive fault"));
        }
        Ok(())
    }
}

impl Motion for SimMotion {
    fn drive_straight(&mut self, speed: i32) -> Result<(), RoverError> {
        self.drive(HardwareCall::DriveStraight(speed))
    }

    fn turn_left(&mut self, speed: i32) -> Result<(), RoverError> {
        self.drive(HardwareCall::TurnLeft(speed))
    }

    fn turn_right(&mut self, speed: i32) -> Result<(), RoverError> {
        self.drive(HardwareCall::TurnRight(speed))
    }

    fn stop(&mut self) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Stop);
        if self.fail_stop {
            return Err(RoverError::hardware("sim_motion", "injected stop fault"));
        }
        Ok(())
    }

    fn set_servo_position(&mut self, position: u16) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Servo(position));
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub display
// ────────────────────────────────────────────────────────────────────────────

/// Simulated display and speaker.
#[derive(Debug, Clone, Default)]
pub struct SimDisplay {
    log: CallLog,
    clock: Option<SimClock>,
    fail_arrows: bool,
    fail_leds: bool,
    panic_on_pause: bool,
}

impl SimDisplay {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Advance `clock` by the duration of every `pause` and `play_tone`.
    pub fn with_clock(mut self, clock: SimClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Make `show_arrow` fail after it is recorded.
    pub fn failing_arrows(mut self) -> Self {
        self.fail_arrows = true;
        self
    }

    /// Make `show_leds` fail after it is recorded.
    pub fn failing_leds(mut self) -> Self {
        self.fail_leds = true;
        self
    }

    /// Make `pause` panic after it is recorded, as a crashing driver would.
    pub fn panicking_pause(mut self) -> Self {
        self.panic_on_pause = true;
        self
    }

    fn elapse(&self, duration: Duration) {
        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
    }
}

impl Presentation for SimDisplay {
    fn show_arrow(&mut self, direction: ArrowDirection) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Arrow(direction));
        if self.fail_arrows {
            return Err(RoverError::hardware("sim_display", "injected arrow fault"));
        }
        Ok(())
    }

    fn show_icon(&mut self, icon: Icon) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Icon(icon));
        Ok(())
    }

    fn show_leds(&mut self, frame: &LedFrame) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Leds(*frame));
        if self.fail_leds {
            return Err(RoverError::hardware("sim_display", "injected led fault"));
        }
        Ok(())
    }

    fn show_string(&mut self, text: &str) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Text(text.to_string()));
        Ok(())
    }

    fn show_number(&mut self, value: i32) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Number(value));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Clear);
        Ok(())
    }

    fn play_tone(&mut self, note: Note, duration: Duration) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Tone(note, duration));
        self.elapse(duration);
        Ok(())
    }

    fn begin_melody(&mut self, melody: Melody, mode: MelodyMode) -> Result<(), RoverError> {
        self.log.record(HardwareCall::BeginMelody(melody, mode));
        Ok(())
    }

    fn stop_melody(&mut self) -> Result<(), RoverError> {
        self.log.record(HardwareCall::StopMelody);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> Result<(), RoverError> {
        self.log.record(HardwareCall::Pause(duration));
        if self.panic_on_pause {
            panic!("display driver crashed");
        }
        self.elapse(duration);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub radio
// ────────────────────────────────────────────────────────────────────────────

/// Simulated transceiver that accepts any group.
#[derive(Debug, Clone, Default)]
pub struct SimRadio {
    log: CallLog,
    group: Option<u8>,
}

impl SimRadio {
    pub fn new(log: CallLog) -> Self {
        Self { log, group: None }
    }
}

impl Radio for SimRadio {
    fn set_group(&mut self, group: u8) -> Result<(), RoverError> {
        self.log.record(HardwareCall::SetGroup(group));
        self.group = Some(group);
        Ok(())
    }

    fn group(&self) -> Option<u8> {
        self.group
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig builder
// ────────────────────────────────────────────────────────────────────────────

/// A matched set of simulated drivers sharing one [`CallLog`] and one
/// [`SimClock`].
///
/// The display returned by [`display`][Self::display] advances the rig's
/// clock, so every blocking hold moves simulated time forward.
#[derive(Debug, Clone, Default)]
pub struct SimRig {
    log: CallLog,
    clock: SimClock,
}

impl SimRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    pub fn clock(&self) -> SimClock {
        self.clock.clone()
    }

    pub fn motion(&self) -> SimMotion {
        SimMotion::new(self.log.clone())
    }

    pub fn display(&self) -> SimDisplay {
        SimDisplay::new(self.log.clone()).with_clock(self.clock.clone())
    }

    pub fn radio(&self) -> SimRadio {
        SimRadio::new(self.log.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
