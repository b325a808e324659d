//! Lifecycle: the public Register/Start/Stop/Unregister surface.

use std::{fmt, sync::Arc};

use capability::CapabilityChecker;
use keybind::{HotkeyBinding, Platform, ResolvedBinding, Resolver};
use parking_lot::Mutex;
use tracing::{Span, debug, info, info_span, warn};

use crate::{
    Action, ActionSource, Error, HotkeyBackend, RegisteredHandle, Result, RetryPolicy,
    action::LazyAction,
    dispatch::Listener,
    registrar::Registrar,
};

/// Observable manager state.
///
/// A stopped manager is `Idle` again and may be re-registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// No OS registration held.
    Idle,
    /// Registered with the OS; listener not started.
    Registered,
    /// Listener running.
    Running,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Registered => "registered",
            Self::Running => "running",
        };
        f.write_str(s)
    }
}

/// Construction-time settings for a [`HotkeyManager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Name recorded on the manager's tracing span.
    pub name: String,
    /// Platform whose code tables bindings resolve against.
    pub platform: Platform,
    /// Override for the platform's Alt modifier code.
    ///
    /// Only backends that register by code honour it; [`crate::HotkeyBackend`]
    /// implementations that register by logical modifier, such as the
    /// native backend, log a warning and use the platform default.
    pub alt_code: Option<u32>,
    /// Registration retry policy.
    pub retry: RetryPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            name: "hotkey".to_string(),
            platform: Platform::current(),
            alt_code: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl ManagerConfig {
    fn resolver(&self) -> Resolver {
        let resolver = Resolver::new(self.platform);
        match self.alt_code {
            Some(code) => resolver.with_alt_code(code),
            None => resolver,
        }
    }
}

/// Mutable state, all behind one lock.
struct Inner<B> {
    registrar: Registrar<B>,
    binding: Option<HotkeyBinding>,
    action: Option<Arc<LazyAction>>,
    listener: Option<Listener>,
}

impl<B: HotkeyBackend> Inner<B> {
    /// Join a listener that exited on its own, e.g. when its trigger source closed.
    fn reap(&mut self) {
        if let Some(listener) = self.listener.take_if(|l| l.is_finished()) {
            listener.shutdown();
            debug!("hotkey_listener_reaped");
        }
    }

    fn state(&mut self) -> ManagerState {
        self.reap();
        if self.listener.is_some() {
            ManagerState::Running
        } else if self.registrar.is_registered() {
            ManagerState::Registered
        } else {
            ManagerState::Idle
        }
    }
}

/// Manages one global hotkey over a [`HotkeyBackend`].
///
/// Every operation takes the same lock, so transitions never interleave.
/// `stop` blocks until the listener and any in-flight `show` calls have
/// returned; an [`Action`] must therefore not call back into its own
/// manager from `show`.
pub struct HotkeyManager<B: HotkeyBackend> {
    inner: Mutex<Inner<B>>,
    resolver: Resolver,
    checker: Arc<CapabilityChecker>,
    span: Span,
}

impl<B: HotkeyBackend> HotkeyManager<B> {
    /// A manager gated by the process-wide capability checker.
    pub fn new(backend: B, config: ManagerConfig) -> Self {
        Self::with_checker(backend, config, CapabilityChecker::system())
    }

    /// A manager gated by `checker`.
    pub fn with_checker(backend: B, config: ManagerConfig, checker: Arc<CapabilityChecker>) -> Self {
        let span = info_span!("hotkey", name = %config.name);
        Self {
            inner: Mutex::new(Inner {
                registrar: Registrar::new(backend, config.retry),
                binding: None,
                action: None,
                listener: None,
            }),
            resolver: config.resolver(),
            checker,
            span,
        }
    }

    /// Set the binding used by the next `register`.
    pub fn set_binding(&self, binding: HotkeyBinding) {
        self.inner.lock().binding = Some(binding);
    }

    /// Bind a ready-made action. Takes effect on the next `start`.
    pub fn set_action(&self, action: Arc<dyn Action>) {
        self.set_action_source(ActionSource::Direct(action));
    }

    /// Bind an action constructor, run on the first trigger. Takes effect on the next `start`.
    pub fn set_action_factory<F>(&self, factory: F)
    where
        F: Fn() -> Arc<dyn Action> + Send + Sync + 'static,
    {
        self.set_action_source(ActionSource::Factory(Box::new(factory)));
    }

    /// Bind an action from either source.
    pub fn set_action_source(&self, source: ActionSource) {
        self.inner.lock().action = Some(Arc::new(LazyAction::new(source)));
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ManagerState {
        self.inner.lock().state()
    }

    /// Whether an OS registration is held.
    pub fn is_registered(&self) -> bool {
        self.inner.lock().registrar.is_registered()
    }

    /// Whether the listener is running.
    pub fn is_running(&self) -> bool {
        self.inner.lock().state() == ManagerState::Running
    }

    /// The binding currently registered, if any.
    pub fn registered_binding(&self) -> Option<ResolvedBinding> {
        self.inner
            .lock()
            .registrar
            .handle()
            .map(|h| h.binding().clone())
    }

    /// Resolve the configured binding and register it with the OS.
    ///
    /// The capability check runs before the backend is touched; an
    /// unsupported session never reaches the OS primitive.
    pub fn register(&self) -> Result<()> {
        let _enter = self.span.enter();
        let mut inner = self.inner.lock();
        if inner.registrar.is_registered() {
            warn!("hotkey_already_registered");
            return Err(Error::AlreadyRegistered);
        }
        let binding = inner.binding.as_ref().ok_or(Error::NoBinding)?;
        let resolved = self.resolver.resolve(binding).inspect_err(|e| {
            warn!(binding = %binding, error = %e, "hotkey_binding_invalid");
        })?;
        if let Err(reason) = self.checker.check() {
            warn!(%reason, "hotkey_platform_unsupported");
            return Err(reason.into());
        }
        let handle = inner.registrar.register(resolved)?;
        info!(
            binding = %handle.binding(),
            handle = handle.raw().0,
            "hotkey_registered"
        );
        Ok(())
    }

    /// Start the listener. A no-op when already running.
    ///
    /// Triggers queued before the call are discarded.
    pub fn start(&self) -> Result<()> {
        let _enter = self.span.enter();
        let mut inner = self.inner.lock();
        if inner.state() == ManagerState::Running {
            debug!("hotkey_start_noop");
            return Ok(());
        }
        let handle = inner
            .registrar
            .handle()
            .map(RegisteredHandle::raw)
            .ok_or(Error::NotRegistered)?;
        let action = inner.action.clone().ok_or(Error::ActionUnavailable)?;
        let events = inner.registrar.backend().events();
        let stale = events.try_iter().count();
        if stale > 0 {
            debug!(stale, "hotkey_stale_triggers_dropped");
        }
        let listener =
            Listener::spawn(events, handle, action, self.span.clone()).map_err(Error::ListenerSpawn)?;
        inner.listener = Some(listener);
        info!(handle = handle.0, "hotkey_started");
        Ok(())
    }

    /// Stop the listener and release the registration.
    ///
    /// A no-op when the listener is not running; a registration made
    /// without `start` is left in place.
    pub fn stop(&self) -> Result<()> {
        let _enter = self.span.enter();
        let mut inner = self.inner.lock();
        inner.reap();
        let Some(listener) = inner.listener.take() else {
            debug!(state = %inner.state(), "hotkey_stop_noop");
            return Ok(());
        };
        listener.shutdown();
        inner.registrar.unregister()?;
        info!("hotkey_stopped");
        Ok(())
    }

    /// Stop the listener if running and release any registration.
    pub fn unregister(&self) -> Result<()> {
        let _enter = self.span.enter();
        let mut inner = self.inner.lock();
        if let Some(listener) = inner.listener.take() {
            listener.shutdown();
        }
        inner.registrar.unregister()
    }
}

impl<B: HotkeyBackend> Drop for HotkeyManager<B> {
    fn drop(&mut self) {
        let _enter = self.span.enter();
        let inner = self.inner.get_mut();
        if let Some(listener) = inner.listener.take() {
            listener.shutdown();
        }
        if let Err(e) = inner.registrar.unregister() {
            warn!(error = %e, "hotkey_drop_unregister_failed");
        }
    }
}
