//! Session capability checks for global hotkeys.
//!
//! Some sessions cannot host an OS-level hotkey at all: Linux running nested
//! under another OS without input-hook support (WSL), or any session with no
//! reachable display server. This crate answers "can we even try?" before a
//! registration is attempted.
//!
//! Notes
//! - The answer depends only on the process environment, so
//!   [`CapabilityChecker`] memoizes it. [`CapabilityChecker::system`] is
//!   computed once per process.
//! - Failures are non-retryable. Hosts are expected to log and carry on
//!   without the hotkey.
//! - Windows and macOS sessions are always reported as supported.

use std::{env, fs, sync::Arc};

use keybind::Platform;
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;
use tracing::debug;

/// Kernel identification string on Linux.
const OSRELEASE_PATH: &str = "/proc/sys/kernel/osrelease";

/// Why the session cannot host a global hotkey.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    /// Linux nested under another OS, with no native input-hook support.
    #[error("virtualized environment without input hook support")]
    VirtualizedNoHookSupport,
    /// No display or windowing server is reachable.
    #[error("no display server (headless session)")]
    Headless,
}

/// The inputs capability detection reads.
pub trait Environment: Send + Sync {
    /// Value of an environment variable, if set.
    fn var(&self, key: &str) -> Option<String>;
    /// Kernel release string, if the platform exposes one.
    fn kernel_release(&self) -> Option<String>;
    /// Platform the process runs on.
    fn platform(&self) -> Platform;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    fn kernel_release(&self) -> Option<String> {
        fs::read_to_string(OSRELEASE_PATH).ok()
    }

    fn platform(&self) -> Platform {
        Platform::current()
    }
}

/// Non-empty value of `key`.
fn present(env: &dyn Environment, key: &str) -> bool {
    env.var(key).is_some_and(|v| !v.trim().is_empty())
}

/// True when running under WSL or a similarly layered Linux kernel.
pub fn is_virtualized(env: &dyn Environment) -> bool {
    if env.platform() != Platform::Linux {
        return false;
    }
    if present(env, "WSL_DISTRO_NAME") || present(env, "WSL_INTEROP") {
        return true;
    }
    env.kernel_release().is_some_and(|r| {
        let r = r.to_ascii_lowercase();
        r.contains("microsoft") || r.contains("wsl")
    })
}

/// True when no X11 or Wayland display is advertised.
pub fn is_headless(env: &dyn Environment) -> bool {
    env.platform() == Platform::Linux
        && !present(env, "DISPLAY")
        && !present(env, "WAYLAND_DISPLAY")
}

/// Run both checks, virtualization first.
pub fn evaluate(env: &dyn Environment) -> Result<(), Unsupported> {
    if is_virtualized(env) {
        return Err(Unsupported::VirtualizedNoHookSupport);
    }
    if is_headless(env) {
        return Err(Unsupported::Headless);
    }
    Ok(())
}

/// Shared checker over the real environment.
static SYSTEM: Lazy<Arc<CapabilityChecker>> =
    Lazy::new(|| Arc::new(CapabilityChecker::new(SystemEnvironment)));

/// Memoizing capability check over an [`Environment`].
pub struct CapabilityChecker {
    /// Environment probed on first use.
    env: Box<dyn Environment>,
    /// Cached verdict.
    verdict: OnceCell<Result<(), Unsupported>>,
}

impl CapabilityChecker {
    /// A checker over `env`. Nothing is probed until [`Self::check`].
    pub fn new(env: impl Environment + 'static) -> Self {
        Self {
            env: Box::new(env),
            verdict: OnceCell::new(),
        }
    }

    /// A checker that reports `verdict` without probing anything.
    pub fn assume(verdict: Result<(), Unsupported>) -> Self {
        Self {
            env: Box::new(SystemEnvironment),
            verdict: OnceCell::with_value(verdict),
        }
    }

    /// The process-wide checker over the real environment.
    pub fn system() -> Arc<Self> {
        SYSTEM.clone()
    }

    /// Whether the session supports global hotkeys. Probes once.
    pub fn check(&self) -> Result<(), Unsupported> {
        *self.verdict.get_or_init(|| {
            let verdict = evaluate(self.env.as_ref());
            debug!(platform = %self.env.platform(), ?verdict, "capability_checked");
            verdict
        })
    }
}

/// Snapshot of the capability inputs, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct SupportStatus {
    /// Platform the process runs on.
    pub platform: Platform,
    /// Nested/virtualized Linux detected.
    pub virtualized: bool,
    /// No display server advertised.
    pub headless: bool,
}

impl SupportStatus {
    /// True when neither blocking condition holds.
    pub fn supported(&self) -> bool {
        self.blocker().is_none()
    }

    /// The condition that blocks hotkeys, virtualization first.
    pub fn blocker(&self) -> Option<Unsupported> {
        if self.virtualized {
            Some(Unsupported::VirtualizedNoHookSupport)
        } else if self.headless {
            Some(Unsupported::Headless)
        } else {
            None
        }
    }
}

/// Snapshot `env`.
pub fn support_status(env: &dyn Environment) -> SupportStatus {
    SupportStatus {
        platform: env.platform(),
        virtualized: is_virtualized(env),
        headless: is_headless(env),
    }
}

/// Query the real environment. Not cached; use [`CapabilityChecker`] for gating.
pub fn check_support() -> SupportStatus {
    support_status(&SystemEnvironment)
}
