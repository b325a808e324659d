//! Scriptable in-memory backend for tests.
//!
//! Clones share state, so a test can hand one clone to a manager and keep
//! another to script failures, emit triggers and inspect calls.

use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
    },
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use keybind::ResolvedBinding;
use parking_lot::Mutex;

use crate::{BackendError, HotkeyBackend, RawHandle, Trigger};

#[derive(Default)]
struct State {
    register_calls: AtomicUsize,
    events_calls: AtomicUsize,
    fail_next: AtomicU32,
    fail_unregister: AtomicBool,
    next_id: AtomicU32,
    live: Mutex<BTreeSet<RawHandle>>,
    unregistered: Mutex<Vec<RawHandle>>,
    last_binding: Mutex<Option<ResolvedBinding>>,
    /// Trigger sender; `None` once the stream is closed.
    tx: Mutex<Option<Sender<Trigger>>>,
}

/// In-memory [`HotkeyBackend`]. Handles are numbered from 1.
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<State>,
    rx: Receiver<Trigger>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    /// A backend that accepts every registration.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        let state = State {
            tx: Mutex::new(Some(tx)),
            ..State::default()
        };
        Self {
            state: Arc::new(state),
            rx,
        }
    }

    /// Make the next `n` registrations fail as if another process held the binding.
    pub fn fail_next(&self, n: u32) {
        self.state.fail_next.store(n, Ordering::SeqCst);
    }

    /// Make unregistration fail until reset.
    pub fn fail_unregister(&self, fail: bool) {
        self.state.fail_unregister.store(fail, Ordering::SeqCst);
    }

    /// Number of `register` calls, failed ones included.
    pub fn register_calls(&self) -> usize {
        self.state.register_calls.load(Ordering::SeqCst)
    }

    /// Number of successful `unregister` calls.
    pub fn unregister_calls(&self) -> usize {
        self.state.unregistered.lock().len()
    }

    /// Handles released, in order.
    pub fn unregistered(&self) -> Vec<RawHandle> {
        self.state.unregistered.lock().clone()
    }

    /// Number of `events` calls, i.e. consumers handed the stream.
    pub fn events_calls(&self) -> usize {
        self.state.events_calls.load(Ordering::SeqCst)
    }

    /// Currently registered handles.
    pub fn live(&self) -> Vec<RawHandle> {
        self.state.live.lock().iter().copied().collect()
    }

    /// The binding most recently passed to `register`.
    pub fn last_binding(&self) -> Option<ResolvedBinding> {
        self.state.last_binding.lock().clone()
    }

    /// Deliver one trigger for `handle`. Dropped once the stream is closed.
    pub fn emit(&self, handle: RawHandle) {
        if let Some(tx) = self.state.tx.lock().as_ref() {
            // Send only fails when every receiver is gone; we hold one.
            tx.send(Trigger { handle }).ok();
        }
    }

    /// Close the trigger stream, as if the OS event source went away.
    pub fn close_events(&self) {
        self.state.tx.lock().take();
    }

    /// Triggers emitted but not yet drained by a consumer.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl HotkeyBackend for FakeBackend {
    fn register(&mut self, binding: &ResolvedBinding) -> Result<RawHandle, BackendError> {
        self.state.register_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_binding.lock() = Some(binding.clone());
        let failing = self
            .state
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BackendError::new(
                "hotkey already registered by another process",
            ));
        }
        let handle = RawHandle(self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.state.live.lock().insert(handle);
        Ok(handle)
    }

    fn unregister(&mut self, handle: RawHandle) -> Result<(), BackendError> {
        if self.state.fail_unregister.load(Ordering::SeqCst) {
            return Err(BackendError::new("unregister refused"));
        }
        if !self.state.live.lock().remove(&handle) {
            return Err(BackendError::new(format!("unknown handle {}", handle.0)));
        }
        self.state.unregistered.lock().push(handle);
        Ok(())
    }

    fn events(&self) -> Receiver<Trigger> {
        self.state.events_calls.fetch_add(1, Ordering::SeqCst);
        self.rx.clone()
    }
}
