use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, InvalidKind};

/// A hotkey as configured: modifier names plus one key name.
///
/// Names are kept verbatim; nothing is validated until the binding is
/// resolved against a platform with [`crate::Resolver`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    /// Modifier names, e.g. `["Ctrl", "Shift"]`. Order does not matter.
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// The primary key name, e.g. `"G"`.
    pub key: String,
}

impl HotkeyBinding {
    /// Construct a binding from modifier names and a key name.
    pub fn new<I, S>(modifiers: I, key: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modifiers: modifiers.into_iter().map(Into::into).collect(),
            key: key.into(),
        }
    }
}

impl FromStr for HotkeyBinding {
    type Err = Error;

    /// Parses the textual form `"Ctrl+Shift+G"`.
    ///
    /// Components are separated by `+` and trimmed; the last component is the
    /// key. This only splits the string, names are checked on resolution.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = parts.pop().unwrap_or_default();
        if key.is_empty() {
            return Err(Error::invalid(key, InvalidKind::EmptyKey));
        }
        if let Some(empty) = parts.iter().find(|p| p.is_empty()) {
            return Err(Error::invalid(empty, InvalidKind::UnknownModifier));
        }
        Ok(Self::new(parts, key))
    }
}

impl fmt::Display for HotkeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{m}+")?;
        }
        f.write_str(&self.key)
    }
}
