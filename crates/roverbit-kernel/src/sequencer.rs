//! [`Sequencer`] – latched sound and animation sequences.
//!
//! `Startup` and `Beep` are guarded by a [`PlaybackLatches`] flag each.  The
//! latch is tripped *before* the sequence starts, so a sequence that fails
//! half-way through is still never replayed.  The idle animation is not
//! latched and may run any number of times.
//!
//! All sequences block the caller for their full duration through
//! [`Presentation::pause`] and [`Presentation::play_tone`].
//!
//! # Example
//!
//! ```rust
//! use roverbit_hal::sim::{HardwareCall, SimRig};
//! use roverbit_kernel::{Playback, Sequencer};
//! use roverbit_types::SoundId;
//!
//! let rig = SimRig::new();
//! let mut display = rig.display();
//! let mut sequencer = Sequencer::new();
//!
//! assert_eq!(sequencer.trigger(SoundId::Beep, &mut display).unwrap(), Playback::Played);
//! assert_eq!(sequencer.trigger(SoundId::Beep, &mut display).unwrap(), Playback::AlreadyPlayed);
//! assert_eq!(rig.log().count(|c| matches!(c, HardwareCall::Tone(..))), 2);
//! ```

use std::time::Duration;

use roverbit_hal::Presentation;
use roverbit_types::{Icon, LedFrame, Melody, MelodyMode, Note, RoverError, SoundId};
use tracing::{debug, info, warn};

// ────────────────────────────────────────────────────────────────────────────
// Sequence data
// ────────────────────────────────────────────────────────────────────────────

/// Diamond that expands into an X, shown while the rover boots.
pub const STARTUP_FRAMES: [LedFrame; 3] = [
    LedFrame::from_rows([0b00100, 0b01010, 0b10001, 0b01010, 0b00100]),
    LedFrame::from_rows([0b01010, 0b10001, 0b00000, 0b10001, 0b01010]),
    LedFrame::from_rows([0b10001, 0b01010, 0b00100, 0b01010, 0b10001]),
];

/// Breathing square shown while no commands arrive.
pub const IDLE_FRAMES: [LedFrame; 4] = [
    LedFrame::from_rows([0b00000, 0b00000, 0b00100, 0b00000, 0b00000]),
    LedFrame::from_rows([0b00000, 0b01110, 0b01010, 0b01110, 0b00000]),
    LedFrame::from_rows([0b11111, 0b10001, 0b10001, 0b10001, 0b11111]),
    LedFrame::from_rows([0b00000, 0b01110, 0b01010, 0b01110, 0b00000]),
];

const STARTUP_LOOPS: usize = 3;
const STARTUP_TONES: [Note; 3] = [Note::A4, Note::B4, Note::C5];
const BEEP_TONES: [Note; 2] = [Note::A4, Note::B4];

const FRAME_HOLD: Duration = Duration::from_millis(200);
const TONE_LENGTH: Duration = Duration::from_millis(500);
const BEEP_GAP: Duration = Duration::from_millis(500);
const SUCCESS_HOLD: Duration = Duration::from_millis(100);

/// Code rendered when a sound is requested by an unknown name.
pub const INVALID_SOUND_CODE: i32 = 23;
const ERROR_LABEL: &str = "Error Code:";
const ERROR_HOLD: Duration = Duration::from_millis(100);

const IDLE_MELODY: Melody = Melody::Entertainer;

// ────────────────────────────────────────────────────────────────────────────
// Latches
// ────────────────────────────────────────────────────────────────────────────

/// One trip-once flag per [`SoundId`].  Never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackLatches {
    startup: bool,
    beep: bool,
}

impl PlaybackLatches {
    pub fn is_set(&self, sound: SoundId) -> bool {
        match sound {
            SoundId::Startup => self.startup,
            SoundId::Beep => self.beep,
        }
    }

    /// Set the latch for `sound`.  Returns `true` only for the call that
    /// actually tripped it.
    fn trip(&mut self, sound: SoundId) -> bool {
        let latch = match sound {
            SoundId::Startup => &mut self.startup,
            SoundId::Beep => &mut self.beep,
        };
        !std::mem::replace(latch, true)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sequencer
// ────────────────────────────────────────────────────────────────────────────

/// What a trigger request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// The sequence ran (this was the first request).
    Played,
    /// The latch was already set; nothing happened.
    AlreadyPlayed,
    /// The name was not a known sound; the error code was shown instead.
    Rejected,
}

/// Plays the latched one-shot sequences and the idle animation.
#[derive(Debug, Default)]
pub struct Sequencer {
    latches: PlaybackLatches,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current latch state.
    pub fn latches(&self) -> PlaybackLatches {
        self.latches
    }

    /// Play `sound` unless it has already been played.
    ///
    /// # Errors
    ///
    /// Propagates the first display failure.  The latch stays set.
    pub fn trigger(
        &mut self,
        sound: SoundId,
        display: &mut dyn Presentation,
    ) -> Result<Playback, RoverError> {
        if !self.latches.trip(sound) {
            debug!(%sound, "sound already played, skipping");
            return Ok(Playback::AlreadyPlayed);
        }
        info!(%sound, "playing sound");
        match sound {
            SoundId::Startup => play_startup(display)?,
            SoundId::Beep => play_beep(display)?,
        }
        Ok(Playback::Played)
    }

    /// Resolve `name` to a [`SoundId`] and trigger it.
    ///
    /// Unknown names are not an error for the caller: the error code is
    /// rendered on the display and [`Playback::Rejected`] is returned.
    pub fn trigger_named(
        &mut self,
        name: &str,
        display: &mut dyn Presentation,
    ) -> Result<Playback, RoverError> {
        match name.parse::<SoundId>() {
            Ok(sound) => self.trigger(sound, display),
            Err(e) => {
                warn!(error = %e, "invalid sound requested, showing error code");
                show_error_code(display)?;
                Ok(Playback::Rejected)
            }
        }
    }

    /// Run one pass of the idle animation.
    ///
    /// `episode_start` is `true` on the first pass of an idle episode; that
    /// pass also starts the background melody.
    pub fn play_idle_animation(
        &self,
        display: &mut dyn Presentation,
        episode_start: bool,
    ) -> Result<(), RoverError> {
        if episode_start {
            debug!(melody = ?IDLE_MELODY, "starting idle melody");
            display.begin_melody(IDLE_MELODY, MelodyMode::ForeverInBackground)?;
        }
        for frame in &IDLE_FRAMES {
            display.show_leds(frame)?;
            display.pause(FRAME_HOLD)?;
        }
        Ok(())
    }
}

fn play_startup(display: &mut dyn Presentation) -> Result<(), RoverError> {
    for pass in 0..STARTUP_LOOPS {
        debug!(pass = pass + 1, "startup animation pass");
        for frame in &STARTUP_FRAMES {
            display.show_leds(frame)?;
            display.pause(FRAME_HOLD)?;
        }
    }
    for note in STARTUP_TONES {
        display.play_tone(note, TONE_LENGTH)?;
    }
    display.show_icon(Icon::Yes)?;
    display.pause(SUCCESS_HOLD)?;
    display.clear()
}

fn play_beep(display: &mut dyn Presentation) -> Result<(), RoverError> {
    let [first, second] = BEEP_TONES;
    display.play_tone(first, TONE_LENGTH)?;
    display.pause(BEEP_GAP)?;
    display.play_tone(second, TONE_LENGTH)
}

fn show_error_code(display: &mut dyn Presentation) -> Result<(), RoverError> {
    display.show_string(ERROR_LABEL)?;
    display.pause(ERROR_HOLD)?;
    display.show_number(INVALID_SOUND_CODE)?;
    display.clear()
}
