//! Thread-safe event triggers and cooperative cancellation.
//!
//! An [`EventTrigger`] is a shared atomic flag: cloning it hands out another
//! handle to the same flag, so a trigger fired from any thread is observed by
//! every clone. [`Signals`] bundles the callbacks that influence a long
//! running computation; today that is a single `stop` slot.
//!
//! Long running loops poll the bundle with [`check_stop`] and bail out with
//! `?` once a stop has been requested.
//!
//! ```
//! use dbscan_signals::{check_stop, EventTrigger, SignalError, Signals};
//!
//! let stop = EventTrigger::new();
//! let signals = Signals::with_stop(stop.clone());
//! assert!(check_stop(&signals).is_ok());
//!
//! std::thread::spawn(move || stop.trigger()).join().unwrap();
//! assert_eq!(check_stop(&signals), Err(SignalError::Cancelled));
//! ```

mod error;
mod signals;
mod trigger;

pub use error::SignalError;
pub use signals::{check_stop, Callback, Signals};
pub use trigger::{EventTrigger, MemoryOrder};
