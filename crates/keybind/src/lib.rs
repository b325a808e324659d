//! keybind: hotkey bindings and their platform-level codes.
//!
//! - `HotkeyBinding`: the configured form, modifier names plus a key name.
//! - `Modifier`, `Modifiers`, `Key`: the closed set of names a binding may use.
//! - `Platform`: the target OS whose code tables a binding resolves against.
//! - `Resolver`: turns a `HotkeyBinding` into a `ResolvedBinding` carrying
//!   the target platform's modifier and key codes.
//!
//! Resolution is pure. The target platform is always an explicit input, so
//! the tables for every OS can be exercised on any host.

mod binding;
mod error;
mod key;
mod modifiers;
mod platform;
mod resolve;

pub use binding::HotkeyBinding;
pub use error::{Error, InvalidKind, Result};
pub use key::Key;
pub use modifiers::{Modifier, Modifiers};
pub use platform::Platform;
pub use resolve::{ResolvedBinding, Resolver};
