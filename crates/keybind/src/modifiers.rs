use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::Platform;

/// Modifier keys a binding may hold down with its primary key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Control.
    Ctrl,
    /// Shift.
    Shift,
    /// Alt, Option on macOS.
    Alt,
    /// Command on macOS, the Windows key elsewhere.
    Super,
}

impl Modifier {
    /// Canonical display order: Ctrl, Alt, Shift, Super.
    pub const ALL: &'static [Self] = &[Self::Ctrl, Self::Alt, Self::Shift, Self::Super];

    /// Parses a modifier name for `platform`. Matching is case-sensitive.
    ///
    /// `"Win"` is an alias for `Super` on Windows only.
    pub fn from_name(s: &str, platform: Platform) -> Option<Self> {
        match s {
            "Ctrl" => Some(Self::Ctrl),
            "Shift" => Some(Self::Shift),
            "Alt" => Some(Self::Alt),
            "Super" => Some(Self::Super),
            "Win" if platform == Platform::Windows => Some(Self::Super),
            _ => None,
        }
    }

    /// Canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ctrl => "Ctrl",
            Self::Shift => "Shift",
            Self::Alt => "Alt",
            Self::Super => "Super",
        }
    }

    /// Default platform code for this modifier.
    ///
    /// The Alt code is the one most often in doubt; [`crate::Resolver`]
    /// allows overriding it.
    pub fn code(self, platform: Platform) -> u32 {
        match (platform, self) {
            (Platform::Windows, Self::Alt) => 0x0001,
            (Platform::Windows, Self::Ctrl) => 0x0002,
            (Platform::Windows, Self::Shift) => 0x0004,
            (Platform::Windows, Self::Super) => 0x0008,
            (Platform::MacOs, Self::Super) => 0x0100,
            (Platform::MacOs, Self::Shift) => 0x0200,
            (Platform::MacOs, Self::Alt) => 0x0800,
            (Platform::MacOs, Self::Ctrl) => 0x1000,
            (Platform::Linux, Self::Shift) => 0x0001,
            (Platform::Linux, Self::Ctrl) => 0x0004,
            (Platform::Linux, Self::Alt) => 0x0008,
            (Platform::Linux, Self::Super) => 0x0040,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of modifiers. Duplicates collapse by construction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        /// Control.
        const CTRL = 1;
        /// Shift.
        const SHIFT = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Super / Command / Windows.
        const SUPER = 1 << 3;
    }
}

impl From<Modifier> for Modifiers {
    fn from(m: Modifier) -> Self {
        match m {
            Modifier::Ctrl => Self::CTRL,
            Modifier::Shift => Self::SHIFT,
            Modifier::Alt => Self::ALT,
            Modifier::Super => Self::SUPER,
        }
    }
}

impl Modifiers {
    /// Members of this set in canonical order.
    pub fn modifiers(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL
            .iter()
            .copied()
            .filter(move |m| self.contains(Self::from(*m)))
    }

    /// Number of distinct modifiers in the set.
    pub fn count(self) -> usize {
        self.bits().count_ones() as usize
    }
}
