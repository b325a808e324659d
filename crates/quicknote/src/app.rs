//! The winit application: one note window, created on first show.

use hotkey::{HotkeyBackend, HotkeyManager};
use tracing::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, ModifiersState, NamedKey},
    window::{Window, WindowId},
};

use crate::{action::AppEvent, host};

/// What a key press in the note window asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Put the window away.
    Dismiss,
    /// Leave the event loop.
    Quit,
}

/// Map a key press to a window command.
fn command_for(key: &Key, mods: ModifiersState) -> Option<Command> {
    match key {
        Key::Named(NamedKey::Escape) => Some(Command::Dismiss),
        Key::Character(c)
            if c.eq_ignore_ascii_case("q") && (mods.control_key() || mods.super_key()) =>
        {
            Some(Command::Quit)
        }
        _ => None,
    }
}

/// Event-loop state.
pub struct App<B: HotkeyBackend> {
    /// The note window, once first shown.
    window: Option<Window>,
    /// Modifiers held in the note window.
    modifiers: ModifiersState,
    /// The hotkey, when it could be set up.
    hotkey: Option<HotkeyManager<B>>,
}

impl<B: HotkeyBackend> App<B> {
    /// Wrap an already-armed hotkey manager.
    pub fn new(hotkey: Option<HotkeyManager<B>>) -> Self {
        Self {
            window: None,
            modifiers: ModifiersState::empty(),
            hotkey,
        }
    }

    fn show(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = Window::default_attributes()
                .with_title("Quick note")
                .with_inner_size(LogicalSize::new(480.0, 320.0))
                .with_visible(false);
            match event_loop.create_window(attrs) {
                Ok(w) => self.window = Some(w),
                Err(e) => {
                    error!(error = %e, "quicknote_window_create_failed");
                    return;
                }
            }
        }
        if let Some(w) = &self.window {
            w.set_visible(true);
            w.focus_window();
            debug!("quicknote_window_shown");
        }
    }

    fn hide(&self) {
        if let Some(w) = &self.window {
            w.set_visible(false);
            debug!("quicknote_window_hidden");
        }
    }
}

impl<B: HotkeyBackend> ApplicationHandler<AppEvent> for App<B> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        debug!("quicknote_resumed");
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Show => self.show(event_loop),
            AppEvent::Hide => self.hide(),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.hide(),
            WindowEvent::ModifiersChanged(m) => self.modifiers = m.state(),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match command_for(&event.logical_key, self.modifiers) {
                    Some(Command::Dismiss) => self.hide(),
                    Some(Command::Quit) => event_loop.exit(),
                    None => {}
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(m) = self.hotkey.take() {
            host::disarm(&m);
        }
        info!("quicknote_exiting");
    }
}
