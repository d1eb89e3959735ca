//! Native handle → widget lookup used by message dispatch.

use std::collections::HashMap;

use tracing::trace;

use super::WidgetId;
use crate::logging::targets;
use crate::native::Handle;

/// Maps live native handles to the widget that owns them.
///
/// Owned by the [`Ui`](crate::Ui) root and mutated only on the UI thread.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    entries: HashMap<Handle, WidgetId>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `handle` as owned by `id`, replacing any stale entry.
    pub fn register(&mut self, handle: Handle, id: WidgetId) {
        trace!(target: targets::WIDGET, %handle, ?id, "registered handle");
        self.entries.insert(handle, id);
    }

    /// Forget `handle`. Returns the widget it mapped to.
    pub fn deregister(&mut self, handle: Handle) -> Option<WidgetId> {
        let id = self.entries.remove(&handle)?;
        trace!(target: targets::WIDGET, %handle, ?id, "deregistered handle");
        Some(id)
    }

    pub fn lookup(&self, handle: Handle) -> Option<WidgetId> {
        self.entries.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
