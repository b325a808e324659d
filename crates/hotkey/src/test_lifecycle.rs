use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use capability::{CapabilityChecker, Unsupported};
use keybind::{HotkeyBinding, Platform};

use crate::{
    Action, Error, FakeBackend, HotkeyManager, ManagerConfig, ManagerState, RawHandle,
    RetryPolicy,
};

const H1: RawHandle = RawHandle(1);

#[derive(Default)]
struct Recorder {
    shows: AtomicUsize,
    hides: AtomicUsize,
}

impl Recorder {
    fn shows(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }
}

impl Action for Recorder {
    fn show(&self) {
        self.shows.fetch_add(1, Ordering::SeqCst);
    }
    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }
}

fn config() -> ManagerConfig {
    ManagerConfig {
        name: "test".into(),
        platform: Platform::Linux,
        alt_code: None,
        retry: RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(1),
        },
    }
}

fn manager_with(
    fake: &FakeBackend,
    verdict: Result<(), Unsupported>,
) -> HotkeyManager<FakeBackend> {
    let m = HotkeyManager::with_checker(
        fake.clone(),
        config(),
        Arc::new(CapabilityChecker::assume(verdict)),
    );
    m.set_binding(HotkeyBinding::new(["Ctrl", "Shift"], "G"));
    m
}

fn manager(fake: &FakeBackend) -> HotkeyManager<FakeBackend> {
    manager_with(fake, Ok(()))
}

fn running(fake: &FakeBackend, action: Arc<Recorder>) -> HotkeyManager<FakeBackend> {
    let m = manager(fake);
    m.set_action(action);
    m.register().expect("register");
    m.start().expect("start");
    m
}

/// Poll `cond` for up to two seconds.
fn wait_until(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

#[test]
fn quick_note_scenario() {
    let fake = FakeBackend::new();
    let m = manager(&fake);
    let action = Arc::new(Recorder::default());
    let built = Arc::new(AtomicUsize::new(0));
    {
        let (action, built) = (action.clone(), built.clone());
        m.set_action_factory(move || {
            built.fetch_add(1, Ordering::SeqCst);
            action.clone() as Arc<dyn Action>
        });
    }

    m.register().expect("register");
    assert_eq!(m.state(), ManagerState::Registered);
    assert_eq!(fake.live(), vec![H1]);
    let bound = fake.last_binding().expect("binding passed to backend");
    assert_eq!(bound.to_string(), "Ctrl+Shift+G");

    m.start().expect("start");
    assert_eq!(m.state(), ManagerState::Running);
    assert_eq!(built.load(Ordering::SeqCst), 0, "factory is lazy");

    fake.emit(H1);
    assert!(wait_until(|| action.shows() == 1));
    assert_eq!(built.load(Ordering::SeqCst), 1);

    m.stop().expect("stop");
    assert_eq!(m.state(), ManagerState::Idle);
    assert_eq!(fake.unregistered(), vec![H1]);
    assert_eq!(action.shows(), 1);
}

#[test]
fn double_register_keeps_first_handle() {
    let fake = FakeBackend::new();
    let m = manager(&fake);
    m.register().expect("register");
    assert!(matches!(m.register(), Err(Error::AlreadyRegistered)));
    assert_eq!(fake.register_calls(), 1);
    assert_eq!(fake.live(), vec![H1]);
    assert_eq!(m.state(), ManagerState::Registered);
    assert!(m.registered_binding().is_some());
}

#[test]
fn stop_before_start_is_noop() {
    let fake = FakeBackend::new();
    let m = manager(&fake);
    m.stop().expect("stop while idle");
    assert_eq!(m.state(), ManagerState::Idle);

    m.register().expect("register");
    m.stop().expect("stop while registered");
    assert_eq!(m.state(), ManagerState::Registered);
    assert_eq!(fake.unregister_calls(), 0);
}

#[test]
fn second_start_reuses_listener() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    let m = running(&fake, action.clone());
    m.start().expect("second start is a no-op");
    assert_eq!(fake.events_calls(), 1);

    for _ in 0..20 {
        fake.emit(H1);
    }
    assert!(wait_until(|| action.shows() == 20));
    assert_eq!(fake.pending(), 0);
    m.stop().expect("stop");
}

#[test]
fn every_trigger_is_delivered_once() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    let m = running(&fake, action.clone());
    for _ in 0..25 {
        fake.emit(H1);
    }
    assert!(wait_until(|| action.shows() == 25));
    thread::sleep(Duration::from_millis(20));
    assert_eq!(action.shows(), 25);
    m.stop().expect("stop");
    assert_eq!(action.hides.load(Ordering::SeqCst), 0);
}

#[test]
fn foreign_triggers_are_ignored() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    let m = running(&fake, action.clone());
    fake.emit(RawHandle(99));
    fake.emit(H1);
    assert!(wait_until(|| action.shows() == 1));
    assert!(wait_until(|| fake.pending() == 0));
    m.stop().expect("stop");
    assert_eq!(action.shows(), 1);
}

#[test]
fn no_show_after_stop_returns() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    let m = running(&fake, action.clone());

    let emitting = Arc::new(AtomicBool::new(true));
    let emitter = {
        let (fake, emitting) = (fake.clone(), emitting.clone());
        thread::spawn(move || {
            while emitting.load(Ordering::SeqCst) {
                fake.emit(H1);
                thread::yield_now();
            }
        })
    };
    assert!(wait_until(|| action.shows() > 0));

    m.stop().expect("stop");
    let at_stop = action.shows();
    for _ in 0..10 {
        fake.emit(H1);
    }
    thread::sleep(Duration::from_millis(50));
    assert_eq!(action.shows(), at_stop);

    emitting.store(false, Ordering::SeqCst);
    emitter.join().expect("emitter");
    assert_eq!(action.shows(), at_stop);
}

#[test]
fn slow_action_does_not_stall_listener() {
    struct Slow {
        started: AtomicUsize,
        finished: AtomicUsize,
    }
    impl Action for Slow {
        fn show(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(300));
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
        fn hide(&self) {}
    }

    let fake = FakeBackend::new();
    let slow = Arc::new(Slow {
        started: AtomicUsize::new(0),
        finished: AtomicUsize::new(0),
    });
    let m = manager(&fake);
    m.set_action(slow.clone());
    m.register().expect("register");
    m.start().expect("start");
    for _ in 0..5 {
        fake.emit(H1);
    }
    assert!(wait_until(|| slow.started.load(Ordering::SeqCst) == 5));
    assert_eq!(slow.finished.load(Ordering::SeqCst), 0);

    m.stop().expect("stop");
    assert_eq!(slow.finished.load(Ordering::SeqCst), 5);
}

#[test]
fn unsupported_platform_never_reaches_backend() {
    let fake = FakeBackend::new();
    let m = manager_with(&fake, Err(Unsupported::Headless));
    let err = m.register().unwrap_err();
    assert!(matches!(
        err,
        Error::PlatformUnsupported(Unsupported::Headless)
    ));
    assert!(err.is_soft());
    assert_eq!(fake.register_calls(), 0);
    assert_eq!(m.state(), ManagerState::Idle);
}

#[test]
fn invalid_binding_never_reaches_backend() {
    let fake = FakeBackend::new();
    let m = manager(&fake);
    m.set_binding(HotkeyBinding::new(["Ctrl", "Hyper"], "G"));
    match m.register() {
        Err(Error::BindingInvalid(e)) => assert_eq!(e.token(), "Hyper"),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(fake.register_calls(), 0);
    assert_eq!(m.state(), ManagerState::Idle);
}

#[test]
fn register_requires_binding() {
    let fake = FakeBackend::new();
    let m = HotkeyManager::with_checker(
        fake.clone(),
        config(),
        Arc::new(CapabilityChecker::assume(Ok(()))),
    );
    assert!(matches!(m.register(), Err(Error::NoBinding)));
    assert_eq!(fake.register_calls(), 0);
}

#[test]
fn start_requires_registration_and_action() {
    let fake = FakeBackend::new();
    let m = manager(&fake);
    m.set_action(Arc::new(Recorder::default()));
    assert!(matches!(m.start(), Err(Error::NotRegistered)));

    let m = manager(&fake);
    m.register().expect("register");
    assert!(matches!(m.start(), Err(Error::ActionUnavailable)));
    assert_eq!(m.state(), ManagerState::Registered);
    assert_eq!(fake.events_calls(), 0);
}

#[test]
fn registration_failure_leaves_idle() {
    let fake = FakeBackend::new();
    fake.fail_next(5);
    let m = manager(&fake);
    let err = m.register().unwrap_err();
    assert!(matches!(err, Error::RegistrationFailed { attempts: 3, .. }));
    assert!(err.is_soft());
    assert_eq!(fake.register_calls(), 3);
    assert_eq!(m.state(), ManagerState::Idle);
}

#[test]
fn reregister_after_stop() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    let m = running(&fake, action.clone());
    m.stop().expect("stop");

    m.register().expect("register again");
    m.start().expect("start again");
    fake.emit(RawHandle(2));
    assert!(wait_until(|| action.shows() == 1));
    m.stop().expect("stop");
    assert_eq!(fake.unregistered(), vec![H1, RawHandle(2)]);
}

#[test]
fn unregister_from_any_state() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    let m = running(&fake, action.clone());
    m.unregister().expect("unregister while running");
    assert_eq!(m.state(), ManagerState::Idle);
    assert_eq!(fake.unregistered(), vec![H1]);

    m.unregister().expect("unregister while idle");
    assert_eq!(fake.unregister_calls(), 1);

    fake.emit(H1);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(action.shows(), 0);
}

#[test]
fn factory_unused_without_trigger() {
    let fake = FakeBackend::new();
    let m = manager(&fake);
    let built = Arc::new(AtomicUsize::new(0));
    {
        let built = built.clone();
        m.set_action_factory(move || {
            built.fetch_add(1, Ordering::SeqCst);
            Arc::new(Recorder::default()) as Arc<dyn Action>
        });
    }
    m.register().expect("register");
    m.start().expect("start");
    m.stop().expect("stop");
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_release_on_stop_is_reported() {
    let fake = FakeBackend::new();
    let m = running(&fake, Arc::new(Recorder::default()));
    fake.fail_unregister(true);
    assert!(matches!(m.stop(), Err(Error::UnregistrationFailed(_))));
    assert_eq!(m.state(), ManagerState::Registered);
    fake.fail_unregister(false);
    m.unregister().expect("release");
    assert_eq!(m.state(), ManagerState::Idle);
}

#[test]
fn drop_releases_registration() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    drop(running(&fake, action));
    assert_eq!(fake.unregistered(), vec![H1]);
    assert!(fake.live().is_empty());
}

#[test]
fn trigger_queued_before_start_is_dropped() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    let m = manager(&fake);
    m.set_action(action.clone());
    m.register().expect("register");
    fake.emit(H1);
    m.start().expect("start");
    thread::sleep(Duration::from_millis(50));
    assert_eq!(action.shows(), 0);
    assert_eq!(fake.pending(), 0);

    fake.emit(H1);
    assert!(wait_until(|| action.shows() == 1));
    m.stop().expect("stop");
}

#[test]
fn trigger_from_previous_run_is_not_replayed() {
    let fake = FakeBackend::new();
    let action = Arc::new(Recorder::default());
    let m = running(&fake, action.clone());
    m.stop().expect("stop");

    m.register().expect("register again");
    // A press that lands before the next start, on the reused handle.
    fake.emit(RawHandle(2));
    m.start().expect("start again");
    thread::sleep(Duration::from_millis(50));
    assert_eq!(action.shows(), 0);
    m.stop().expect("stop");
}

#[test]
fn closed_trigger_source_leaves_registered() {
    let fake = FakeBackend::new();
    let m = running(&fake, Arc::new(Recorder::default()));
    fake.close_events();
    assert!(wait_until(|| m.state() == ManagerState::Registered));
    assert!(!m.is_running());
    assert!(m.is_registered());

    m.start().expect("restart spawns a fresh listener");
    assert_eq!(fake.events_calls(), 2);
    assert!(wait_until(|| !m.is_running()));
    m.unregister().expect("unregister");
    assert_eq!(m.state(), ManagerState::Idle);
}
