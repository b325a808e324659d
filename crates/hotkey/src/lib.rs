//! A single system-wide hotkey with a managed lifecycle.
//!
//! The pieces, leaves first:
//! - [`keybind::Resolver`] turns a configured [`HotkeyBinding`] into platform codes.
//! - [`capability::CapabilityChecker`] refuses sessions that cannot host a
//!   hotkey before the OS is asked.
//! - [`Registrar`] owns the OS registration and retries transient failures.
//! - A listener thread waits on the backend's trigger stream and runs the
//!   bound [`Action`] for each press, off the listener so it stays responsive.
//! - [`HotkeyManager`] sequences all of it behind one lock:
//!   `Idle -> register -> Registered -> start -> Running -> stop -> Idle`.
//!
//! The OS is reached only through [`HotkeyBackend`]. Enable the `native`
//! feature for [`NativeBackend`], or `test-utils` for the scriptable
//! [`FakeBackend`].

mod action;
mod backend;
mod dispatch;
mod error;
mod manager;
mod registrar;

#[cfg(any(test, feature = "test-utils"))]
mod fake;
#[cfg(feature = "native")]
mod native;

#[cfg(test)]
mod test_lifecycle;

pub use action::{Action, ActionFactory, ActionSource};
pub use backend::{BackendError, HotkeyBackend, RawHandle, Trigger};
pub use capability::{CapabilityChecker, Unsupported};
pub use error::{Error, Result};
#[cfg(any(test, feature = "test-utils"))]
pub use fake::FakeBackend;
pub use keybind::{HotkeyBinding, Platform, ResolvedBinding};
pub use manager::{HotkeyManager, ManagerConfig, ManagerState};
#[cfg(feature = "native")]
pub use native::NativeBackend;
pub use registrar::{
    DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, RegisteredHandle, Registrar, RetryPolicy,
};
