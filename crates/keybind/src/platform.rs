use std::{env, fmt};

use serde::{Deserialize, Serialize};

/// Target operating system for code resolution.
///
/// Resolution never consults the build target directly; callers choose a
/// platform, usually [`Platform::current`] once at startup.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Win32 `RegisterHotKey` flags and virtual-key codes.
    Windows,
    /// Carbon `RegisterEventHotKey` masks and `kVK_*` codes.
    MacOs,
    /// X11 modifier masks and keysyms.
    Linux,
}

impl Platform {
    /// All platforms with a code table.
    pub const ALL: &'static [Self] = &[Self::Windows, Self::MacOs, Self::Linux];

    /// The platform this process is running on.
    ///
    /// Any non-Windows, non-macOS OS is treated as X11-based.
    pub fn current() -> Self {
        match env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            _ => Self::Linux,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        };
        f.write_str(s)
    }
}
