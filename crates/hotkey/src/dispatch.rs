//! Background listener that turns triggers into action invocations.
//!
//! One listener thread blocks on the backend's trigger stream and a
//! cancellation channel. Each matching trigger is handed to a short-lived
//! thread so a slow `show` never delays the next OS event. Those threads
//! pass a start gate in trigger order before calling `show`; the calls
//! themselves may begin and run concurrently.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use parking_lot::{Condvar, Mutex};
use tracing::{Span, debug, trace, warn};

use crate::{RawHandle, Trigger, action::LazyAction};

/// Name of the listener thread.
const LISTENER_THREAD: &str = "hotkey-listener";
/// Name of per-trigger action threads.
const ACTION_THREAD: &str = "hotkey-action";

/// Ticketed gate: concurrent dispatches pass through in ticket order.
pub struct StartGate {
    next: Mutex<u64>,
    turn: Condvar,
}

impl StartGate {
    pub fn new() -> Self {
        Self {
            next: Mutex::new(0),
            turn: Condvar::new(),
        }
    }

    /// Block until `ticket` is next in line, then let it through.
    pub fn enter(&self, ticket: u64) {
        let mut next = self.next.lock();
        while *next != ticket {
            self.turn.wait(&mut next);
        }
        *next += 1;
        self.turn.notify_all();
    }
}

/// A running listener. Dropping without [`Listener::shutdown`] detaches it.
pub struct Listener {
    cancel: Sender<()>,
    thread: JoinHandle<()>,
}

impl Listener {
    /// Spawn the listener thread for triggers on `handle`.
    pub fn spawn(
        events: Receiver<Trigger>,
        handle: RawHandle,
        action: Arc<LazyAction>,
        span: Span,
    ) -> io::Result<Self> {
        let (cancel, cancelled) = bounded::<()>(0);
        let thread = thread::Builder::new()
            .name(LISTENER_THREAD.into())
            .spawn(move || {
                let _enter = span.enter();
                run(&events, &cancelled, handle, &action);
            })?;
        Ok(Self { cancel, thread })
    }

    /// Whether the listener thread has exited on its own.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Signal cancellation and wait for the listener and any in-flight
    /// action calls to finish.
    pub fn shutdown(self) {
        let Self { cancel, thread } = self;
        // Closing the channel wakes the select.
        drop(cancel);
        if thread.join().is_err() {
            warn!("hotkey_listener_panicked");
        }
    }
}

/// Listener loop body.
fn run(
    events: &Receiver<Trigger>,
    cancelled: &Receiver<()>,
    handle: RawHandle,
    action: &Arc<LazyAction>,
) {
    debug!(handle = handle.0, "hotkey_listener_started");
    let gate = Arc::new(StartGate::new());
    let mut inflight: Vec<JoinHandle<()>> = Vec::new();
    let mut ticket: u64 = 0;

    loop {
        select! {
            recv(cancelled) -> _ => break,
            recv(events) -> msg => match msg {
                Ok(trigger) if trigger.handle == handle => {
                    // Both arms may be ready; cancellation wins.
                    if !matches!(cancelled.try_recv(), Err(TryRecvError::Empty)) {
                        break;
                    }
                    inflight.retain(|t| !t.is_finished());
                    trace!(ticket, "hotkey_triggered");
                    dispatch(action, &gate, ticket, &mut inflight);
                    ticket += 1;
                }
                Ok(trigger) => trace!(handle = trigger.handle.0, "hotkey_trigger_foreign"),
                Err(_) => {
                    debug!("hotkey_event_source_closed");
                    break;
                }
            },
        }
    }

    for t in inflight {
        if t.join().is_err() {
            warn!("hotkey_action_panicked");
        }
    }
    debug!(triggers = ticket, "hotkey_listener_exited");
}

/// Run `action.show()` on its own thread, admitted through `gate`.
fn dispatch(
    action: &Arc<LazyAction>,
    gate: &Arc<StartGate>,
    ticket: u64,
    inflight: &mut Vec<JoinHandle<()>>,
) {
    let (a, g) = (action.clone(), gate.clone());
    let span = Span::current();
    let spawned = thread::Builder::new()
        .name(ACTION_THREAD.into())
        .spawn(move || {
            let _enter = span.enter();
            g.enter(ticket);
            a.get().show();
        });
    match spawned {
        Ok(t) => inflight.push(t),
        Err(e) => {
            warn!(error = %e, "hotkey_action_spawn_failed_inline");
            gate.enter(ticket);
            action.get().show();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::unbounded;

    use super::*;
    use crate::{Action, ActionSource};

    #[test]
    fn gate_admits_in_ticket_order() {
        let gate = Arc::new(StartGate::new());
        let order = Arc::new(Mutex::new(Vec::new()));
        let threads: Vec<_> = (0..8u64)
            .rev()
            .map(|ticket| {
                let (gate, order) = (gate.clone(), order.clone());
                thread::spawn(move || {
                    gate.enter(ticket);
                    order.lock().push(ticket);
                })
            })
            .collect();
        for t in threads {
            t.join().expect("join");
        }
        assert_eq!(*order.lock(), (0..8).collect::<Vec<_>>());
    }

    struct Slow {
        shown: Mutex<usize>,
    }

    impl Action for Slow {
        fn show(&self) {
            thread::sleep(Duration::from_millis(30));
            *self.shown.lock() += 1;
        }
        fn hide(&self) {}
    }

    #[test]
    fn shutdown_waits_for_inflight_actions() {
        let slow = Arc::new(Slow {
            shown: Mutex::new(0),
        });
        let action = Arc::new(LazyAction::new(ActionSource::Direct(slow.clone())));
        let (tx, rx) = unbounded();
        let listener =
            Listener::spawn(rx, RawHandle(1), action, Span::none()).expect("spawn listener");
        tx.send(Trigger {
            handle: RawHandle(1),
        })
        .expect("send");
        // Let the listener pick the trigger up before cancelling.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !tx.is_empty() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        thread::sleep(Duration::from_millis(5));
        listener.shutdown();
        assert_eq!(*slow.shown.lock(), 1);
    }

    #[test]
    fn foreign_handles_are_ignored() {
        let slow = Arc::new(Slow {
            shown: Mutex::new(0),
        });
        let action = Arc::new(LazyAction::new(ActionSource::Direct(slow.clone())));
        let (tx, rx) = unbounded();
        let listener =
            Listener::spawn(rx, RawHandle(7), action, Span::none()).expect("spawn listener");
        for _ in 0..3 {
            tx.send(Trigger {
                handle: RawHandle(8),
            })
            .expect("send");
        }
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !tx.is_empty() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        listener.shutdown();
        assert_eq!(*slow.shown.lock(), 0);
    }

    #[test]
    fn closed_source_ends_listener() {
        let slow = Arc::new(Slow {
            shown: Mutex::new(0),
        });
        let action = Arc::new(LazyAction::new(ActionSource::Direct(slow)));
        let (tx, rx) = unbounded::<Trigger>();
        let listener =
            Listener::spawn(rx, RawHandle(1), action, Span::none()).expect("spawn listener");
        drop(tx);
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !listener.thread.is_finished() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(listener.thread.is_finished());
        listener.shutdown();
    }
}
