//! Arming and disarming the hotkey without ever taking the app down.

use hotkey::{ActionSource, Error, HotkeyBackend, HotkeyBinding, HotkeyManager};
use tracing::{error, info, warn};

/// Log a hotkey failure at a level matching its severity.
fn report(stage: &str, e: &Error) {
    if e.is_soft() {
        warn!(stage, error = %e, "quicknote_hotkey_unavailable");
    } else {
        error!(stage, error = %e, "quicknote_hotkey_failed");
    }
}

/// Bind, register and start the hotkey. Returns whether it is live.
///
/// A failed start releases the registration again.
pub fn arm<B: HotkeyBackend>(
    manager: &HotkeyManager<B>,
    binding: HotkeyBinding,
    action: ActionSource,
) -> bool {
    manager.set_binding(binding);
    manager.set_action_source(action);
    if let Err(e) = manager.register() {
        report("register", &e);
        return false;
    }
    if let Err(e) = manager.start() {
        report("start", &e);
        if let Err(e) = manager.unregister() {
            report("unregister", &e);
        }
        return false;
    }
    if let Some(b) = manager.registered_binding() {
        info!(binding = %b, "quicknote_hotkey_armed");
    }
    true
}

/// Stop the listener and release the registration, logging failures.
pub fn disarm<B: HotkeyBackend>(manager: &HotkeyManager<B>) {
    if let Err(e) = manager.stop() {
        report("stop", &e);
    }
    if let Err(e) = manager.unregister() {
        report("unregister", &e);
    }
}
