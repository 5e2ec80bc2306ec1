use std::fmt;
use std::sync::Arc;

use crate::error::SignalError;
use crate::trigger::EventTrigger;

/// A generic "signal to fire" callback.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
enum Stop {
    Trigger(EventTrigger),
    Callback(Callback),
}

/// Callbacks that influence the execution of a long running operation.
///
/// Cloning a bundle shares the underlying stop flag.
#[derive(Clone)]
pub struct Signals {
    stop: Stop,
}

impl Signals {
    /// Creates a bundle whose stop trigger is never fired by anyone else.
    pub fn new() -> Self {
        Self::with_stop(EventTrigger::new())
    }

    /// Creates a bundle around an existing stop trigger.
    pub fn with_stop(stop: EventTrigger) -> Self {
        Self {
            stop: Stop::Trigger(stop),
        }
    }

    /// Creates a bundle whose stop slot is an arbitrary callback.
    ///
    /// Such a bundle can be fired but not polled: [`check_stop`] reports
    /// [`SignalError::NotEventTrigger`].
    pub fn from_callback(stop: Callback) -> Self {
        Self {
            stop: Stop::Callback(stop),
        }
    }

    /// Fires the stop slot.
    pub fn stop(&self) {
        match &self.stop {
            Stop::Trigger(t) => t.trigger(),
            Stop::Callback(cb) => cb(),
        }
    }

    /// Returns the [`EventTrigger`] backing the stop slot.
    pub fn stop_trigger(&self) -> Result<&EventTrigger, SignalError> {
        match &self.stop {
            Stop::Trigger(t) => Ok(t),
            Stop::Callback(_) => Err(SignalError::NotEventTrigger),
        }
    }
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Signals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stop {
            Stop::Trigger(t) => f.debug_struct("Signals").field("stop", t).finish(),
            Stop::Callback(_) => f
                .debug_struct("Signals")
                .field("stop", &"<callback>")
                .finish(),
        }
    }
}

/// Checks the stop signal.
///
/// Returns [`SignalError::Cancelled`] once the stop trigger has fired, and
/// [`SignalError::NotEventTrigger`] if the bundle cannot be polled at all.
pub fn check_stop(signals: &Signals) -> Result<(), SignalError> {
    if signals.stop_trigger()?.is_triggered() {
        return Err(SignalError::Cancelled);
    }
    Ok(())
}
