//! The capability a hotkey triggers.

use std::{fmt, sync::Arc};

use once_cell::sync::OnceCell;
use tracing::debug;

/// Something the hotkey can show, and the host can hide.
///
/// `show` may be called from several threads at once when triggers arrive
/// faster than it returns, so it must be safe to call reentrantly.
pub trait Action: Send + Sync {
    /// Bring the action's UI up. Showing an already-visible UI is a no-op.
    fn show(&self);
    /// Dismiss the action's UI.
    fn hide(&self);
}

/// Builds the action on first trigger.
pub type ActionFactory = Box<dyn Fn() -> Arc<dyn Action> + Send + Sync>;

/// Where the triggered action comes from.
pub enum ActionSource {
    /// A ready-made action.
    Direct(Arc<dyn Action>),
    /// A constructor, run lazily on the first trigger.
    Factory(ActionFactory),
}

impl fmt::Debug for ActionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("ActionSource::Direct"),
            Self::Factory(_) => f.write_str("ActionSource::Factory"),
        }
    }
}

/// An [`ActionSource`] resolved at most once, then cached.
pub struct LazyAction {
    source: ActionSource,
    resolved: OnceCell<Arc<dyn Action>>,
}

impl LazyAction {
    pub fn new(source: ActionSource) -> Self {
        Self {
            source,
            resolved: OnceCell::new(),
        }
    }

    /// The action, running the factory if this is the first use.
    pub fn get(&self) -> &Arc<dyn Action> {
        self.resolved.get_or_init(|| match &self.source {
            ActionSource::Direct(action) => action.clone(),
            ActionSource::Factory(make) => {
                debug!("hotkey_action_factory_invoked");
                make()
            }
        })
    }

    /// Whether the action has been resolved yet.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}
