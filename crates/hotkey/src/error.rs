//! Error types and result alias for the hotkey crate.
use std::{io, result::Result as StdResult};

use capability::Unsupported;
use thiserror::Error;

use crate::BackendError;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Error variants produced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured binding names an unknown modifier or key.
    #[error(transparent)]
    BindingInvalid(#[from] keybind::Error),
    /// `register` was called before a binding was set.
    #[error("no hotkey binding configured")]
    NoBinding,
    /// A registration is already held.
    #[error("hotkey already registered")]
    AlreadyRegistered,
    /// `start` was called with no registration held.
    #[error("hotkey not registered")]
    NotRegistered,
    /// The session cannot host a global hotkey.
    #[error("platform unsupported: {0}")]
    PlatformUnsupported(#[from] Unsupported),
    /// The OS refused the registration on every attempt.
    #[error("hotkey registration failed after {attempts} attempt(s): {source}")]
    RegistrationFailed {
        /// Attempts made.
        attempts: u32,
        /// The error from the last attempt.
        #[source]
        source: BackendError,
    },
    /// The OS refused to release the registration.
    #[error("hotkey unregistration failed: {0}")]
    UnregistrationFailed(#[source] BackendError),
    /// `start` was called with no action or action factory set.
    #[error("no action bound to hotkey")]
    ActionUnavailable,
    /// The listener thread could not be created.
    #[error("failed to spawn hotkey listener: {0}")]
    ListenerSpawn(#[source] io::Error),
}

impl Error {
    /// True for failures a host should absorb by running without the hotkey.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::PlatformUnsupported(_) | Self::RegistrationFailed { .. }
        )
    }
}
