//! [`Rover`] – the controller that owns every driver and all control state.
//!
//! The latches (inside the [`Sequencer`]), the last-activity timestamp and
//! the idle flag (inside the [`IdleWatchdog`]) all live here and are only
//! reachable through `&mut self`.  Whoever owns the `Rover` is therefore the
//! single thread of control the kernel assumes.
//!
//! # Example
//!
//! ```rust
//! use roverbit_hal::sim::{HardwareCall, SimRig};
//! use roverbit_runtime::{Hardware, Rover, RoverConfig};
//!
//! let rig = SimRig::new();
//! let mut rover = Rover::new(RoverConfig::group_two(), Hardware::sim(&rig));
//!
//! assert!(rover.startup().all_succeeded());
//! rover.on_command("Forward");
//! assert_eq!(rig.log().motion_calls().last(), Some(&HardwareCall::Stop));
//! ```

use std::sync::Arc;
use std::time::Duration;

use roverbit_hal::sim::SimRig;
use roverbit_hal::{Clock, Motion, Presentation, Radio};
use roverbit_kernel::watchdog::DEFAULT_IDLE_TIMEOUT;
use roverbit_kernel::{
    ActivityState, CommandDispatcher, DriveSettings, IdleWatchdog, Playback, PlaybackLatches,
    Sequencer, StepOutcome, Transition, demo_move, run_safely,
};
use roverbit_types::{ArrowDirection, Command, SoundId};
use tracing::{info, warn};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Servo angle used by the group-four profile when parking the servo.
pub const SERVO_REST_POSITION: u16 = 90;

/// Deployment settings.
///
/// The two named profiles describe the two rovers in service.  They share
/// one core and differ only in radio group and the servo park.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoverConfig {
    /// Radio group joined during startup.
    pub radio_group: u8,
    /// Servo angle set by the stop-motors self-check, if the rover has one.
    pub servo_rest_position: Option<u16>,
    /// Silence allowed before idle mode engages.
    pub idle_timeout: Duration,
    /// Speed and hold time of every drive command.
    pub drive: DriveSettings,
    /// How often [`RoverLoop`][crate::RoverLoop] ticks while no command is
    /// waiting.
    pub tick_interval: Duration,
}

impl RoverConfig {
    /// Rover listening on group 2, no servo.
    pub fn group_two() -> Self {
        Self {
            radio_group: 2,
            servo_rest_position: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            drive: DriveSettings::default(),
            tick_interval: Duration::from_millis(20),
        }
    }

    /// Rover listening on group 4 that parks its servo when stopping.
    pub fn group_four() -> Self {
        Self {
            radio_group: 4,
            servo_rest_position: Some(SERVO_REST_POSITION),
            ..Self::group_two()
        }
    }
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self::group_two()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Hardware bundle
// ────────────────────────────────────────────────────────────────────────────

/// The drivers a [`Rover`] takes ownership of.
pub struct Hardware {
    pub motion: Box<dyn Motion>,
    pub display: Box<dyn Presentation>,
    pub radio: Box<dyn Radio>,
    pub clock: Arc<dyn Clock>,
}

impl Hardware {
    /// Simulated drivers from `rig`, sharing its call log and clock.
    pub fn sim(rig: &SimRig) -> Self {
        Self {
            motion: Box::new(rig.motion()),
            display: Box::new(rig.display()),
            radio: Box::new(rig.radio()),
            clock: Arc::new(rig.clock()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Startup report
// ────────────────────────────────────────────────────────────────────────────

pub const STEP_PLAY_SOUND: &str = "PlaySound";
pub const STEP_STOP_MOTORS: &str = "stopMotors";
pub const STEP_MOVE: &str = "move";
pub const STEP_RADIO_GROUP: &str = "Setting radio group";

/// Outcome of each startup step, in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupReport {
    steps: Vec<(&'static str, StepOutcome)>,
}

impl StartupReport {
    fn record(&mut self, label: &'static str, outcome: StepOutcome) {
        self.steps.push((label, outcome));
    }

    pub fn steps(&self) -> &[(&'static str, StepOutcome)] {
        &self.steps
    }

    pub fn outcome(&self, label: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|(l, _)| *l == label).map(|(_, o)| o)
    }

    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|(_, o)| o.is_success())
    }

    /// Labels of the steps that did not succeed.
    pub fn failures(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|(_, o)| !o.is_success())
            .map(|(l, _)| *l)
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rover
// ────────────────────────────────────────────────────────────────────────────

/// The rover controller.
pub struct Rover {
    config: RoverConfig,
    motion: Box<dyn Motion>,
    display: Box<dyn Presentation>,
    radio: Box<dyn Radio>,
    clock: Arc<dyn Clock>,
    sequencer: Sequencer,
    dispatcher: CommandDispatcher,
    watchdog: IdleWatchdog,
}

impl Rover {
    /// Take ownership of `hardware`.  The watchdog's activity clock starts
    /// now, so idle mode cannot engage during the first timeout window.
    pub fn new(config: RoverConfig, hardware: Hardware) -> Self {
        let Hardware {
            motion,
            display,
            radio,
            clock,
        } = hardware;
        let watchdog = IdleWatchdog::new(config.idle_timeout, clock.now());
        let dispatcher = CommandDispatcher::new(config.drive);
        Self {
            config,
            motion,
            display,
            radio,
            clock,
            sequencer: Sequencer::new(),
            dispatcher,
            watchdog,
        }
    }

    pub fn config(&self) -> &RoverConfig {
        &self.config
    }

    pub fn state(&self) -> ActivityState {
        self.watchdog.state()
    }

    pub fn last_activity(&self) -> Duration {
        self.watchdog.last_activity()
    }

    pub fn latches(&self) -> PlaybackLatches {
        self.sequencer.latches()
    }

    pub fn radio_group(&self) -> Option<u8> {
        self.radio.group()
    }

    /// Run the best-effort startup self-checks, then join the radio group.
    ///
    /// Each step runs under [`run_safely`]; a failing step is logged and the
    /// next one still runs.
    ///
    /// The group is joined here, before any command or tick hook runs.  Until
    /// then the radio hears nothing, so no command can arrive early.
    pub fn startup(&mut self) -> StartupReport {
        info!(group = self.config.radio_group, "running startup self-checks");
        let mut report = StartupReport::default();

        report.record(
            STEP_PLAY_SOUND,
            run_safely(STEP_PLAY_SOUND, || {
                self.sequencer
                    .trigger(SoundId::Startup, self.display.as_mut())
                    .map(drop)
            }),
        );

        report.record(
            STEP_STOP_MOTORS,
            run_safely(STEP_STOP_MOTORS, || {
                info!("motors stopping");
                self.motion.stop()?;
                if let Some(position) = self.config.servo_rest_position {
                    self.motion.set_servo_position(position)?;
                }
                Ok(())
            }),
        );

        report.record(
            STEP_MOVE,
            run_safely(STEP_MOVE, || {
                demo_move(ArrowDirection::North, self.display.as_mut(), || {
                    info!("moved north");
                    Ok(())
                })
            }),
        );

        report.record(
            STEP_RADIO_GROUP,
            run_safely(STEP_RADIO_GROUP, || {
                info!(group = self.config.radio_group, "setting radio group");
                self.radio.set_group(self.config.radio_group)
            }),
        );

        if !report.all_succeeded() {
            warn!(failed = ?report.failures(), "startup completed with failures");
        }
        report
    }

    /// Radio callback: handle one inbound token.
    ///
    /// The activity timestamp is refreshed and any idle episode ends before
    /// the command runs, whether or not the token is recognised.
    ///
    /// If the command does not succeed, the motors get one more `stop`.  A
    /// driver that panics mid-hold skips the dispatcher's own stop.
    pub fn on_command(&mut self, token: &str) -> StepOutcome {
        let now = self.clock.now();
        let command = Command::parse(token);
        let ended_idle = self.watchdog.record_activity(now);
        info!(%command, at_ms = now.as_millis() as u64, "command received");

        let outcome = run_safely("onCommand", || {
            let silenced = if ended_idle {
                self.display.stop_melody()
            } else {
                Ok(())
            };
            let dispatched =
                self.dispatcher
                    .dispatch(&command, self.motion.as_mut(), self.display.as_mut());
            silenced.and(dispatched)
        });
        if !outcome.is_success() {
            run_safely("failsafeStop", || self.motion.stop());
        }
        outcome
    }

    /// Scheduler hook: evaluate the idle watchdog once.
    ///
    /// While idle, each tick plays one pass of the idle animation; the first
    /// tick of an episode also starts the idle melody.
    pub fn tick(&mut self) -> Transition {
        let transition = self.watchdog.poll(self.clock.now());
        match transition {
            Transition::EnterIdle | Transition::StayIdle => {
                let episode_start = transition == Transition::EnterIdle;
                run_safely("idleAnimation", || {
                    self.sequencer
                        .play_idle_animation(self.display.as_mut(), episode_start)
                });
            }
            Transition::LeaveIdle => {
                run_safely("leaveIdle", || self.display.stop_melody());
            }
            Transition::StayActive => {}
        }
        transition
    }

    /// Play a one-shot sound by name.  Unknown names show the error code.
    pub fn play_sound(&mut self, name: &str) -> Option<Playback> {
        let mut playback = None;
        run_safely("PlaySound", || {
            playback = Some(self.sequencer.trigger_named(name, self.display.as_mut())?);
            Ok(())
        });
        playback
    }

    /// Stop the motors, silence the speaker and blank the display.
    pub fn shutdown(&mut self) -> StepOutcome {
        run_safely("shutdown", || {
            let stopped = self.motion.stop();
            let silenced = self.display.stop_melody();
            let cleared = self.display.clear();
            stopped.and(silenced).and(cleared)
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
