//! Error types and result alias for the keybind crate.
use std::{fmt, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Why a binding token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidKind {
    /// The token is not a recognized modifier name for the target platform.
    UnknownModifier,
    /// The token is not a recognized key name.
    UnknownKey,
    /// No key was given.
    EmptyKey,
    /// The modifier's code collides with another modifier in the binding.
    CodeConflict,
}

impl fmt::Display for InvalidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnknownModifier => "unknown modifier",
            Self::UnknownKey => "unknown key",
            Self::EmptyKey => "empty key",
            Self::CodeConflict => "conflicting modifier code for",
        };
        f.write_str(s)
    }
}

/// Error variants produced by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A binding contained a token that could not be resolved.
    #[error("invalid binding: {kind} {token:?}")]
    BindingInvalid {
        /// The offending token, verbatim.
        token: String,
        /// What was wrong with it.
        kind: InvalidKind,
    },
}

impl Error {
    pub(crate) fn invalid(token: &str, kind: InvalidKind) -> Self {
        Self::BindingInvalid {
            token: token.to_string(),
            kind,
        }
    }

    /// The token that caused the failure.
    pub fn token(&self) -> &str {
        match self {
            Self::BindingInvalid { token, .. } => token,
        }
    }

    /// The failure kind.
    pub fn kind(&self) -> InvalidKind {
        match self {
            Self::BindingInvalid { kind, .. } => *kind,
        }
    }
}
