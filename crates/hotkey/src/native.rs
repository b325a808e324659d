//! OS backend built on the `global-hotkey` crate.
//!
//! On macOS and Windows the process must run an event loop on the thread
//! that created the backend, or no presses are delivered. On Linux the crate
//! drives its own X11 thread.

use std::collections::{BTreeSet, HashMap};

use crossbeam_channel::{Receiver, unbounded};
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers as NativeModifiers},
};
use keybind::{Key, Modifiers, Platform, ResolvedBinding};
use tracing::{debug, trace, warn};

use crate::{BackendError, HotkeyBackend, RawHandle, Trigger};

/// Backend registering hotkeys with the running OS.
///
/// Only one may exist per process: the crate's event handler is global.
pub struct NativeBackend {
    manager: GlobalHotKeyManager,
    platform: Platform,
    registered: HashMap<u32, HotKey>,
    rx: Receiver<Trigger>,
}

impl NativeBackend {
    /// Connect to the OS hotkey service and route its presses into our stream.
    pub fn new() -> Result<Self, BackendError> {
        let manager = GlobalHotKeyManager::new().map_err(|e| BackendError::new(e.to_string()))?;
        let (tx, rx) = unbounded();
        GlobalHotKeyEvent::set_event_handler(Some(move |event: GlobalHotKeyEvent| {
            trace!(id = event.id, state = ?event.state, "native_hotkey_event");
            if event.state == HotKeyState::Pressed
                && tx
                    .send(Trigger {
                        handle: RawHandle(event.id),
                    })
                    .is_err()
            {
                trace!(id = event.id, "native_hotkey_event_unconsumed");
            }
        }));
        debug!("native_hotkey_backend_ready");
        Ok(Self {
            manager,
            platform: Platform::current(),
            registered: HashMap::new(),
            rx,
        })
    }
}

impl HotkeyBackend for NativeBackend {
    fn register(&mut self, binding: &ResolvedBinding) -> Result<RawHandle, BackendError> {
        if binding.platform != self.platform {
            return Err(BackendError::new(format!(
                "binding resolved for {}, running on {}",
                binding.platform, self.platform
            )));
        }
        if overrides_default_codes(binding) {
            warn!(
                binding = %binding,
                codes = ?binding.modifier_codes,
                "native_hotkey_code_override_ignored"
            );
        }
        let hotkey = HotKey::new(Some(native_modifiers(binding.modifiers)), native_code(binding.key));
        self.manager
            .register(hotkey)
            .map_err(|e| BackendError::new(e.to_string()))?;
        self.registered.insert(hotkey.id(), hotkey);
        Ok(RawHandle(hotkey.id()))
    }

    fn unregister(&mut self, handle: RawHandle) -> Result<(), BackendError> {
        let Some(hotkey) = self.registered.remove(&handle.0) else {
            return Ok(());
        };
        self.manager
            .unregister(hotkey)
            .map_err(|e| BackendError::new(e.to_string()))
    }

    fn events(&self) -> Receiver<Trigger> {
        self.rx.clone()
    }
}

/// Whether `binding` carries codes other than its platform's default table.
///
/// The crate registers by logical key and modifier, so such codes cannot
/// be honoured here.
fn overrides_default_codes(binding: &ResolvedBinding) -> bool {
    let defaults: BTreeSet<u32> = binding
        .modifiers
        .modifiers()
        .map(|m| m.code(binding.platform))
        .collect();
    defaults != binding.modifier_codes || binding.key.code(binding.platform) != binding.key_code
}

/// Translate our modifier set into the crate's.
fn native_modifiers(mods: Modifiers) -> NativeModifiers {
    let mut out = NativeModifiers::empty();
    if mods.contains(Modifiers::CTRL) {
        out |= NativeModifiers::CONTROL;
    }
    if mods.contains(Modifiers::SHIFT) {
        out |= NativeModifiers::SHIFT;
    }
    if mods.contains(Modifiers::ALT) {
        out |= NativeModifiers::ALT;
    }
    if mods.contains(Modifiers::SUPER) {
        out |= NativeModifiers::SUPER;
    }
    out
}

/// Translate our key into the crate's physical key code.
fn native_code(key: Key) -> Code {
    match key {
        Key::A => Code::KeyA,
        Key::B => Code::KeyB,
        Key::C => Code::KeyC,
        Key::D => Code::KeyD,
        Key::E => Code::KeyE,
        Key::F => Code::KeyF,
        Key::G => Code::KeyG,
        Key::H => Code::KeyH,
        Key::I => Code::KeyI,
        Key::J => Code::KeyJ,
        Key::K => Code::KeyK,
        Key::L => Code::KeyL,
        Key::M => Code::KeyM,
        Key::N => Code::KeyN,
        Key::O => Code::KeyO,
        Key::P => Code::KeyP,
        Key::Q => Code::KeyQ,
        Key::R => Code::KeyR,
        Key::S => Code::KeyS,
        Key::T => Code::KeyT,
        Key::U => Code::KeyU,
        Key::V => Code::KeyV,
        Key::W => Code::KeyW,
        Key::X => Code::KeyX,
        Key::Y => Code::KeyY,
        Key::Z => Code::KeyZ,
        Key::Digit0 => Code::Digit0,
        Key::Digit1 => Code::Digit1,
        Key::Digit2 => Code::Digit2,
        Key::Digit3 => Code::Digit3,
        Key::Digit4 => Code::Digit4,
        Key::Digit5 => Code::Digit5,
        Key::Digit6 => Code::Digit6,
        Key::Digit7 => Code::Digit7,
        Key::Digit8 => Code::Digit8,
        Key::Digit9 => Code::Digit9,
        Key::F1 => Code::F1,
        Key::F2 => Code::F2,
        Key::F3 => Code::F3,
        Key::F4 => Code::F4,
        Key::F5 => Code::F5,
        Key::F6 => Code::F6,
        Key::F7 => Code::F7,
        Key::F8 => Code::F8,
        Key::F9 => Code::F9,
        Key::F10 => Code::F10,
        Key::F11 => Code::F11,
        Key::F12 => Code::F12,
        Key::Space => Code::Space,
        Key::Return => Code::Enter,
        Key::Escape => Code::Escape,
        Key::Delete => Code::Delete,
        Key::Tab => Code::Tab,
        Key::Left => Code::ArrowLeft,
        Key::Right => Code::ArrowRight,
        Key::Up => Code::ArrowUp,
        Key::Down => Code::ArrowDown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_a_native_code() {
        let codes: std::collections::HashSet<_> = Key::ALL.iter().map(|k| native_code(*k)).collect();
        assert_eq!(codes.len(), Key::ALL.len());
    }

    #[test]
    fn alt_override_is_detected() {
        let b = keybind::HotkeyBinding::new(["Ctrl", "Alt"], "N");
        let plain = keybind::Resolver::new(Platform::Linux).resolve(&b).expect("resolve");
        assert!(!overrides_default_codes(&plain));
        let custom = keybind::Resolver::new(Platform::Linux)
            .with_alt_code(0x80)
            .resolve(&b)
            .expect("resolve");
        assert!(overrides_default_codes(&custom));
    }

    #[test]
    fn modifiers_translate() {
        let m = native_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(m, NativeModifiers::CONTROL | NativeModifiers::SHIFT);
        assert!(native_modifiers(Modifiers::empty()).is_empty());
    }
}
