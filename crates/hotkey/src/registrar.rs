//! Ownership of the OS registration, with bounded retry.

use std::{thread, time::Duration};

use keybind::ResolvedBinding;
use tracing::{debug, info, warn};

use crate::{Error, HotkeyBackend, RawHandle, Result};

/// Registration attempts made before giving up.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Pause between registration attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// How registration failures are retried.
///
/// Failures are retried uniformly: the OS error alone does not say whether a
/// failure is transient or a conflict with another process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retry.
    pub fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// A live OS registration. Exactly one owner; never cloned.
#[derive(Debug)]
pub struct RegisteredHandle {
    raw: RawHandle,
    binding: ResolvedBinding,
}

impl RegisteredHandle {
    /// OS-assigned id.
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// The binding this registration reserves.
    pub fn binding(&self) -> &ResolvedBinding {
        &self.binding
    }
}

/// Registration controller: holds the backend and at most one handle.
pub struct Registrar<B> {
    backend: B,
    handle: Option<RegisteredHandle>,
    retry: RetryPolicy,
}

impl<B: HotkeyBackend> Registrar<B> {
    /// A controller with no registration held.
    pub fn new(backend: B, retry: RetryPolicy) -> Self {
        Self {
            backend,
            handle: None,
            retry,
        }
    }

    /// The held registration, if any.
    pub fn handle(&self) -> Option<&RegisteredHandle> {
        self.handle.as_ref()
    }

    /// Whether a registration is held.
    pub fn is_registered(&self) -> bool {
        self.handle.is_some()
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Register `binding` with the OS.
    ///
    /// Fails with [`Error::AlreadyRegistered`] while a handle is held, so a
    /// live registration is never silently replaced.
    pub fn register(&mut self, binding: ResolvedBinding) -> Result<&RegisteredHandle> {
        if self.handle.is_some() {
            return Err(Error::AlreadyRegistered);
        }
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 0;
        let raw = loop {
            attempt += 1;
            match self.backend.register(&binding) {
                Ok(raw) => break raw,
                Err(e) if attempt < attempts => {
                    warn!(attempt, attempts, error = %e, "hotkey_register_retry");
                    thread::sleep(self.retry.delay);
                }
                Err(e) => {
                    warn!(attempts, error = %e, "hotkey_register_failed");
                    return Err(Error::RegistrationFailed {
                        attempts,
                        source: e,
                    });
                }
            }
        };
        debug!(handle = raw.0, attempt, "hotkey_register_ok");
        Ok(self.handle.insert(RegisteredHandle { raw, binding }))
    }

    /// Release the held registration. A no-op when none is held.
    ///
    /// If the OS refuses, the handle is kept so the release can be retried.
    pub fn unregister(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            debug!("hotkey_unregister_noop");
            return Ok(());
        };
        match self.backend.unregister(handle.raw) {
            Ok(()) => {
                info!(handle = handle.raw.0, binding = %handle.binding, "hotkey_unregistered");
                Ok(())
            }
            Err(e) => {
                warn!(handle = handle.raw.0, error = %e, "hotkey_unregister_failed");
                self.handle = Some(handle);
                Err(Error::UnregistrationFailed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use keybind::{HotkeyBinding, Platform, Resolver};

    use super::*;
    use crate::FakeBackend;

    fn resolved() -> ResolvedBinding {
        Resolver::new(Platform::Linux)
            .resolve(&HotkeyBinding::new(["Ctrl", "Shift"], "G"))
            .expect("resolve")
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn default_policy_is_three_attempts_100ms() {
        let p = RetryPolicy::default();
        assert_eq!(p.attempts, 3);
        assert_eq!(p.delay, Duration::from_millis(100));
    }

    #[test]
    fn register_then_unregister() {
        let fake = FakeBackend::new();
        let mut r = Registrar::new(fake.clone(), fast_retry());
        let raw = r.register(resolved()).expect("register").raw();
        assert_eq!(raw, RawHandle(1));
        assert!(r.is_registered());
        r.unregister().expect("unregister");
        assert!(!r.is_registered());
        assert_eq!(fake.unregistered(), vec![RawHandle(1)]);
    }

    #[test]
    fn second_register_is_rejected_and_first_survives() {
        let fake = FakeBackend::new();
        let mut r = Registrar::new(fake.clone(), fast_retry());
        r.register(resolved()).expect("register");
        let e = r.register(resolved()).unwrap_err();
        assert!(matches!(e, Error::AlreadyRegistered));
        assert_eq!(fake.register_calls(), 1);
        assert_eq!(r.handle().map(RegisteredHandle::raw), Some(RawHandle(1)));
        assert_eq!(fake.live(), vec![RawHandle(1)]);
    }

    #[test]
    fn transient_failures_are_retried() {
        let fake = FakeBackend::new();
        fake.fail_next(2);
        let mut r = Registrar::new(fake.clone(), fast_retry());
        r.register(resolved()).expect("third attempt succeeds");
        assert_eq!(fake.register_calls(), 3);
    }

    #[test]
    fn persistent_failure_surfaces_last_error() {
        let fake = FakeBackend::new();
        fake.fail_next(10);
        let mut r = Registrar::new(fake.clone(), fast_retry());
        match r.register(resolved()) {
            Err(Error::RegistrationFailed { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(source.message().contains("already registered"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(fake.register_calls(), 3);
        assert!(!r.is_registered());
    }

    #[test]
    fn single_attempt_policy_does_not_retry() {
        let fake = FakeBackend::new();
        fake.fail_next(1);
        let mut r = Registrar::new(fake.clone(), RetryPolicy::once());
        assert!(r.register(resolved()).is_err());
        assert_eq!(fake.register_calls(), 1);
    }

    #[test]
    fn unregister_without_handle_is_noop() {
        let fake = FakeBackend::new();
        let mut r = Registrar::new(fake.clone(), fast_retry());
        r.unregister().expect("noop");
        assert_eq!(fake.unregister_calls(), 0);
    }

    #[test]
    fn failed_unregister_keeps_handle() {
        let fake = FakeBackend::new();
        let mut r = Registrar::new(fake.clone(), fast_retry());
        r.register(resolved()).expect("register");
        fake.fail_unregister(true);
        assert!(matches!(r.unregister(), Err(Error::UnregistrationFailed(_))));
        assert!(r.is_registered());
        fake.fail_unregister(false);
        r.unregister().expect("retry");
        assert!(!r.is_registered());
    }
}
