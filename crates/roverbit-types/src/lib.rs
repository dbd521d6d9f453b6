use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A movement command received over the radio link.
///
/// The transport delivers bare string tokens; [`Command::parse`] validates
/// them at the boundary.  Anything outside the four known directions becomes
/// [`Command::Unknown`], which the dispatcher answers with a fail-safe stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Left,
    Right,
    Forward,
    Backward,
    /// Any unrecognised token, kept verbatim for logging.
    Unknown(String),
}

impl Command {
    /// Parse a raw radio token.  Matching is exact and case-sensitive.
    pub fn parse(token: &str) -> Self {
        match token {
            "Left" => Command::Left,
            "Right" => Command::Right,
            "Forward" => Command::Forward,
            "Backward" => Command::Backward,
            other => Command::Unknown(other.to_string()),
        }
    }

    /// The arrow shown on the display while this command is held.
    ///
    /// The indicator mapping mirrors the physical mounting of the display on
    /// the rover, which is why `Left` shows an east-facing arrow.
    pub fn arrow(&self) -> Option<ArrowDirection> {
        match self {
            Command::Left => Some(ArrowDirection::East),
            Command::Right => Some(ArrowDirection::West),
            Command::Forward => Some(ArrowDirection::North),
            Command::Backward => Some(ArrowDirection::South),
            Command::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Left => write!(f, "Left"),
            Command::Right => write!(f, "Right"),
            Command::Forward => write!(f, "Forward"),
            Command::Backward => write!(f, "Backward"),
            Command::Unknown(token) => write!(f, "Unknown({token})"),
        }
    }
}

/// One-shot sound sequences.  Each plays at most once per process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundId {
    Startup,
    Beep,
}

impl FromStr for SoundId {
    type Err = RoverError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Startup" => Ok(SoundId::Startup),
            "Beep" => Ok(SoundId::Beep),
            other => Err(RoverError::InvalidSound(other.to_string())),
        }
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundId::Startup => write!(f, "Startup"),
            SoundId::Beep => write!(f, "Beep"),
        }
    }
}

/// Compass direction of an arrow drawn on the LED matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrowDirection {
    North,
    East,
    South,
    West,
}

/// Built-in icons of the presentation sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Icon {
    /// Check mark.
    Yes,
}

/// A 5×5 LED matrix frame.
///
/// Each row is a 5-bit mask; bit 4 is the leftmost LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedFrame {
    rows: [u8; 5],
}

impl LedFrame {
    pub const fn from_rows(rows: [u8; 5]) -> Self {
        Self {
            rows: [
                rows[0] & 0b11111,
                rows[1] & 0b11111,
                rows[2] & 0b11111,
                rows[3] & 0b11111,
                rows[4] & 0b11111,
            ],
        }
    }

    /// Whether the LED at (`x`, `y`) is lit.  Out-of-range coordinates are off.
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        x < 5 && y < 5 && self.rows[y] & (0b10000 >> x) != 0
    }

    pub fn lit_count(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }
}

impl fmt::Display for LedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..5 {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..5 {
                if x > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", if self.is_lit(x, y) { '#' } else { '.' })?;
            }
        }
        Ok(())
    }
}

/// Musical notes used by the sound sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Note {
    A4,
    B4,
    C5,
}

impl Note {
    /// Pitch in hertz.
    pub fn frequency_hz(self) -> u32 {
        match self {
            Note::A4 => 440,
            Note::B4 => 494,
            Note::C5 => 523,
        }
    }
}

/// Built-in melodies of the tone output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Melody {
    Entertainer,
}

/// How a melody is played by the tone output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MelodyMode {
    Once,
    ForeverInBackground,
}

/// A message received on the radio link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioPacket {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    /// Radio group the packet was transmitted on.
    pub group: u8,
    pub payload: String,
}

impl RadioPacket {
    pub fn new(group: u8, payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            group,
            payload: payload.into(),
        }
    }
}

/// Error type shared by drivers, the control core, and configuration.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoverError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Invalid sound identifier: {0:?}")]
    InvalidSound(String),

    #[error("Radio Error: {0}")]
    Radio(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl RoverError {
    /// Shorthand for [`RoverError::HardwareFault`].
    pub fn hardware(component: impl Into<String>, details: impl Into<String>) -> Self {
        RoverError::HardwareFault {
            component: component.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_parse_to_directions() {
        assert_eq!(Command::parse("Left"), Command::Left);
        assert_eq!(Command::parse("Right"), Command::Right);
        assert_eq!(Command::parse("Forward"), Command::Forward);
        assert_eq!(Command::parse("Backward"), Command::Backward);
    }

    #[test]
    fn token_matching_is_case_sensitive() {
        assert_eq!(
            Command::parse("left"),
            Command::Unknown("left".to_string())
        );
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
    }

    #[test]
    fn arrow_mapping_follows_display_mounting() {
        assert_eq!(Command::Left.arrow(), Some(ArrowDirection::East));
        assert_eq!(Command::Right.arrow(), Some(ArrowDirection::West));
        assert_eq!(Command::Forward.arrow(), Some(ArrowDirection::North));
        assert_eq!(Command::Backward.arrow(), Some(ArrowDirection::South));
        assert_eq!(Command::Unknown("Jump".into()).arrow(), None);
    }

    #[test]
    fn sound_id_rejects_unknown_names() {
        assert_eq!("Startup".parse::<SoundId>().unwrap(), SoundId::Startup);
        assert_eq!("Beep".parse::<SoundId>().unwrap(), SoundId::Beep);
        let err = "Siren".parse::<SoundId>().unwrap_err();
        assert_eq!(err, RoverError::InvalidSound("Siren".to_string()));
    }

    #[test]
    fn led_frame_renders_as_grid() {
        let frame = LedFrame::from_rows([0b00100, 0b01010, 0b10001, 0b01010, 0b00100]);
        let text = frame.to_string();
        assert_eq!(text.lines().next(), Some(". . # . ."));
        assert_eq!(text.lines().nth(2), Some("# . . . #"));
        assert_eq!(frame.lit_count(), 8);
        assert!(frame.is_lit(2, 0));
        assert!(!frame.is_lit(5, 0));
    }

    #[test]
    fn led_frame_masks_extra_bits() {
        let frame = LedFrame::from_rows([0xFF, 0, 0, 0, 0]);
        assert_eq!(frame.lit_count(), 5);
    }

    #[test]
    fn notes_ascend() {
        assert!(Note::A4.frequency_hz() < Note::B4.frequency_hz());
        assert!(Note::B4.frequency_hz() < Note::C5.frequency_hz());
    }

    #[test]
    fn radio_packet_serializes_payload() {
        let packet = RadioPacket::new(2, "Forward");
        let json = serde_json::to_string(&packet).unwrap();
        let back: RadioPacket = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, packet.id);
        assert_eq!(back.group, 2);
        assert_eq!(back.payload, "Forward");
    }

    #[test]
    fn rover_error_display() {
        let err = RoverError::hardware("left_motor", "stalled");
        assert!(err.to_string().contains("left_motor"));
        assert!(err.to_string().contains("stalled"));

        let err = RoverError::InvalidSound("Siren".into());
        assert!(err.to_string().contains("Siren"));
    }
}
