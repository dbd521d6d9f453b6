//! [`run_safely`] – fault-isolating step runner.
//!
//! Startup is best-effort: each self-check step runs under [`run_safely`],
//! which logs the outcome and hands it back as a [`StepOutcome`] value.  A
//! failing step never aborts the steps after it.
//!
//! Driver errors arrive as `Err(RoverError)`.  A driver that panics is also
//! contained: the panic is caught at this boundary and reported as
//! [`StepOutcome::Panicked`].
//!
//! ```rust
//! use roverbit_kernel::{StepOutcome, run_safely};
//! use roverbit_types::RoverError;
//!
//! let outcome = run_safely("calibrate", || Err(RoverError::hardware("imu", "no response")));
//! assert!(matches!(outcome, StepOutcome::Failed(_)));
//!
//! // The next step still runs.
//! assert!(run_safely("stopMotors", || Ok(())).is_success());
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use roverbit_types::RoverError;
use tracing::{debug, error, info};

/// How a wrapped step ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Succeeded,
    Failed(RoverError),
    /// The step panicked; carries the panic message.
    Panicked(String),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }

    /// Human-readable failure message, if any.
    pub fn failure(&self) -> Option<String> {
        match self {
            StepOutcome::Succeeded => None,
            StepOutcome::Failed(e) => Some(e.to_string()),
            StepOutcome::Panicked(msg) => Some(format!("panicked: {msg}")),
        }
    }
}

/// Run `op`, log the result under `label`, and return it as a value.
pub fn run_safely<F>(label: &str, op: F) -> StepOutcome
where
    F: FnOnce() -> Result<(), RoverError>,
{
    debug!(label, "running step");
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(())) => {
            info!(label, "step executed successfully");
            StepOutcome::Succeeded
        }
        Ok(Err(e)) => {
            error!(label, error = %e, "step failed");
            StepOutcome::Failed(e)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(label, panic = %message, "step panicked");
            StepOutcome::Panicked(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_reported() {
        let mut ran = false;
        let outcome = run_safely("noop", || {
            ran = true;
            Ok(())
        });
        assert!(ran);
        assert_eq!(outcome, StepOutcome::Succeeded);
        assert_eq!(outcome.failure(), None);
    }

    #[test]
    fn error_is_captured_not_propagated() {
        let outcome = run_safely("move", || Err(RoverError::hardware("display", "bus timeout")));
        assert_eq!(
            outcome,
            StepOutcome::Failed(RoverError::hardware("display", "bus timeout"))
        );
        assert!(outcome.failure().unwrap().contains("bus timeout"));
    }

    #[test]
    fn panic_is_contained() {
        let outcome = run_safely("explode", || panic!("servo driver blew up"));
        assert_eq!(
            outcome,
            StepOutcome::Panicked("servo driver blew up".to_string())
        );
    }

    #[test]
    fn formatted_panic_message_is_kept() {
        let channel = 7;
        let outcome = run_safely("explode", || panic!("channel {channel} missing"));
        assert_eq!(outcome, StepOutcome::Panicked("channel 7 missing".to_string()));
    }

    #[test]
    fn later_steps_run_after_failure() {
        let mut order = Vec::new();
        let steps: [(&str, bool); 3] = [("a", true), ("b", false), ("c", true)];
        for (label, ok) in steps {
            run_safely(label, || {
                order.push(label);
                if ok {
                    Ok(())
                } else {
                    Err(RoverError::Radio("no carrier".into()))
                }
            });
        }
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
