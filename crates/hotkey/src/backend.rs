//! The OS seam: register, unregister, and a stream of triggers.
//!
//! Everything non-deterministic about global hotkeys lives behind
//! [`HotkeyBackend`]. One implementation is picked at startup; the state
//! machine and retry logic above it are the same on every platform.

use crossbeam_channel::Receiver;
use keybind::ResolvedBinding;
use thiserror::Error;

/// OS-assigned registration id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RawHandle(pub u32);

/// One press of a registered combination, as delivered by the OS.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Trigger {
    /// Registration the press belongs to.
    pub handle: RawHandle,
}

/// Failure reported by a backend, carrying the OS-provided reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    /// Human-readable reason.
    message: String,
}

impl BackendError {
    /// Wrap an OS error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying reason.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Platform hotkey primitive.
///
/// `register` and `unregister` are synchronous and called from the
/// manager's calling thread. `events` hands out a receiver that a single
/// listener thread blocks on; triggers for every handle the backend owns
/// arrive on it in OS delivery order.
pub trait HotkeyBackend {
    /// Reserve `binding` system-wide.
    fn register(&mut self, binding: &ResolvedBinding) -> Result<RawHandle, BackendError>;
    /// Release a registration made by this backend.
    fn unregister(&mut self, handle: RawHandle) -> Result<(), BackendError>;
    /// The trigger stream.
    fn events(&self) -> Receiver<Trigger>;
}

impl<B: HotkeyBackend + ?Sized> HotkeyBackend for Box<B> {
    fn register(&mut self, binding: &ResolvedBinding) -> Result<RawHandle, BackendError> {
        (**self).register(binding)
    }

    fn unregister(&mut self, handle: RawHandle) -> Result<(), BackendError> {
        (**self).unregister(handle)
    }

    fn events(&self) -> Receiver<Trigger> {
        (**self).events()
    }
}
