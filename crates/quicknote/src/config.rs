//! Loading the quicknote configuration from RON.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use hotkey::{DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, ManagerConfig, RetryPolicy};
use keybind::{HotkeyBinding, Platform};
use ron::{Options, extensions::Extensions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while reading or parsing a configuration file.
#[derive(Debug, Error)]
pub enum Error {
    /// The file exists but could not be read.
    #[error("{message}")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// The file is not valid RON for [`Config`].
    #[error("{message}")]
    Parse {
        /// File being parsed, if the text came from disk.
        path: Option<PathBuf>,
        /// Parser message including the location.
        message: String,
    },
}

impl Error {
    /// Render the error with its path for display to a user.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => {
                format!("Read error at {}: {}", path.display(), message)
            }
            Self::Parse {
                path: Some(p),
                message,
            } => format!("Config parse error in {}: {}", p.display(), message),
            Self::Parse {
                path: None,
                message,
            } => format!("Config parse error: {message}"),
        }
    }
}

/// Result alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// User configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The global hotkey that summons the note window.
    pub hotkey: HotkeyBinding,
    /// Registration attempts, including the first.
    pub retry_attempts: u32,
    /// Delay between registration attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Override for the platform's Alt modifier code. Checked by `check`;
    /// the native backend registers by modifier and ignores it.
    pub alt_code: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotkey: default_binding(Platform::current()),
            retry_attempts: DEFAULT_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            alt_code: None,
        }
    }
}

impl Config {
    /// Retry policy for hotkey registration.
    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Manager settings for the running platform.
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            name: "quicknote".to_string(),
            platform: Platform::current(),
            alt_code: self.alt_code,
            retry: self.retry(),
        }
    }
}

/// The default quick-note binding for `platform`.
pub fn default_binding(platform: Platform) -> HotkeyBinding {
    match platform {
        Platform::MacOs => HotkeyBinding::new(["Super", "Shift"], "G"),
        Platform::Windows | Platform::Linux => HotkeyBinding::new(["Ctrl", "Shift"], "G"),
    }
}

/// `~/.quicknote/config.ron`.
pub fn default_config_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".quicknote");
    p.push("config.ron");
    p
}

/// Use `explicit` when given, else the default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(default_config_path, Path::to_path_buf)
}

/// Parse configuration text. `Option` fields accept bare values.
pub fn parse(text: &str, path: Option<&Path>) -> Result<Config> {
    Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(text)
        .map_err(|e| Error::Parse {
            path: path.map(Path::to_path_buf),
            message: e.to_string(),
        })
}

/// Load the configuration at `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<Config> {
    match fs::read_to_string(path) {
        Ok(text) => parse(&text, Some(path)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(Error::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}
