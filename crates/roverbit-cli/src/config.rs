//! Rover settings file – reads/writes `~/.roverbit/config.toml`.
//!
//! Every field has a default, so an empty file (or no file) gives the
//! group-two profile with stock timings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use roverbit_runtime::RoverConfig;
use roverbit_types::RoverError;
use serde::{Deserialize, Serialize};

/// Which deployment variant to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Radio group 2, no servo.
    #[default]
    GroupTwo,
    /// Radio group 4, servo parked during the stop-motors check.
    GroupFour,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::GroupTwo => write!(f, "group_two"),
            Profile::GroupFour => write!(f, "group_four"),
        }
    }
}

/// Persisted rover settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profile: Profile,

    /// Overrides the profile's radio group when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio_group: Option<u8>,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Drive power in percent, 1..=100.
    #[serde(default = "default_drive_speed")]
    pub drive_speed: i32,

    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_idle_timeout_ms() -> u64 {
    10_000
}
fn default_drive_speed() -> i32 {
    50
}
fn default_hold_ms() -> u64 {
    500
}
fn default_tick_interval_ms() -> u64 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            radio_group: None,
            idle_timeout_ms: default_idle_timeout_ms(),
            drive_speed: default_drive_speed(),
            hold_ms: default_hold_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    /// Validate and convert into the runtime's [`RoverConfig`].
    pub fn to_rover_config(&self) -> Result<RoverConfig, RoverError> {
        if !(1..=100).contains(&self.drive_speed) {
            return Err(RoverError::Config(format!(
                "drive_speed must be within 1..=100, got {}",
                self.drive_speed
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(RoverError::Config(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }

        let mut rover = match self.profile {
            Profile::GroupTwo => RoverConfig::group_two(),
            Profile::GroupFour => RoverConfig::group_four(),
        };
        if let Some(group) = self.radio_group {
            rover.radio_group = group;
        }
        rover.idle_timeout = Duration::from_millis(self.idle_timeout_ms);
        rover.drive.speed = self.drive_speed;
        rover.drive.hold = Duration::from_millis(self.hold_ms);
        rover.tick_interval = Duration::from_millis(self.tick_interval_ms);
        Ok(rover)
    }
}

/// Return the path to `~/.roverbit/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".roverbit").join("config.toml")
}

/// Load the config from disk and apply environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, RoverError> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, RoverError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        RoverError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| RoverError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(cfg))
}

/// Apply `ROVERBIT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ROVERBIT_RADIO_GROUP` | `radio_group` |
/// | `ROVERBIT_IDLE_TIMEOUT_MS` | `idle_timeout_ms` |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ROVERBIT_RADIO_GROUP")
        && let Ok(group) = v.trim().parse::<u8>()
    {
        cfg.radio_group = Some(group);
    }
    if let Ok(v) = std::env::var("ROVERBIT_IDLE_TIMEOUT_MS")
        && let Ok(ms) = v.trim().parse::<u64>()
    {
        cfg.idle_timeout_ms = ms;
    }
}

/// Save the config to disk, creating `~/.roverbit/` if necessary.
pub fn save(cfg: &Config) -> Result<(), RoverError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), RoverError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            RoverError::Config(format!("failed to create {}: {e}", parent.display()))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| RoverError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw)
        .map_err(|e| RoverError::Config(format!("failed to write {}: {e}", path.display())))
}
