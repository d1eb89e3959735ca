//! Ui root: owns the platform, the widget tree, the handle registry and the
//! state store, and runs the message pump.

use std::any::type_name;
use std::collections::HashSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Rectangle, Size};
use crate::layout::LayoutFlags;
use crate::logging::targets;
use crate::native::{Handle, HeadlessPlatform, LResult, Message, Platform};
use crate::state::{MemoryStateStore, StateStore};
use crate::widget::{
    Context, HandleRegistry, LifecycleEvent, LifecycleLog, Widget, WidgetId, WidgetRef, WidgetTree,
    DEFAULT_LIFECYCLE_HISTORY,
};

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// When selection controls publish their change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionNotify {
    /// Publish only when the selection actually changed.
    #[default]
    OnChange,
    /// Publish on every selection handling pass, changed or not.
    Always,
}

/// Configuration for a [`Ui`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    /// Publication policy shared by every selection control.
    pub selection_notify: SelectionNotify,
    /// Pixels a tab page extends left of the tab strip's display area.
    pub page_inset: i32,
    /// Whether new tab widgets save and restore their selection.
    pub tab_widgets_persistent: bool,
    /// Lifecycle events kept for [`Ui::drain_lifecycle`]; older ones drop.
    pub lifecycle_history: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            selection_notify: SelectionNotify::OnChange,
            page_inset: 2,
            tab_widgets_persistent: true,
            lifecycle_history: DEFAULT_LIFECYCLE_HISTORY,
        }
    }
}

impl UiConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection notification policy (builder).
    pub fn with_selection_notify(mut self, policy: SelectionNotify) -> Self {
        self.selection_notify = policy;
        self
    }

    /// Set the tab page inset (builder).
    pub fn with_page_inset(mut self, inset: i32) -> Self {
        self.page_inset = inset;
        self
    }

    /// Set whether new tab widgets persist their selection (builder).
    pub fn with_tab_widgets_persistent(mut self, persistent: bool) -> Self {
        self.tab_widgets_persistent = persistent;
        self
    }

    /// Set how many lifecycle events are kept (builder).
    pub fn with_lifecycle_history(mut self, entries: usize) -> Self {
        self.lifecycle_history = entries;
        self
    }
}

// ---------------------------------------------------------------------------
// Ui
// ---------------------------------------------------------------------------

/// The root of a widget toolkit instance.
///
/// Everything runs on the thread that owns the `Ui`. Widgets are created
/// through [`context`](Self::context) and addressed by [`WidgetRef`]s.
/// Dropping the `Ui` disposes every widget still alive.
pub struct Ui<P: Platform = HeadlessPlatform> {
    platform: P,
    tree: WidgetTree,
    registry: HandleRegistry,
    classes: HashSet<&'static str>,
    lifecycle: LifecycleLog,
    store: Box<dyn StateStore>,
    config: UiConfig,
}

impl Ui<HeadlessPlatform> {
    /// A `Ui` over an in-memory platform, for tests and tooling.
    pub fn new_headless() -> Self {
        Self::new(HeadlessPlatform::new())
    }
}

impl<P: Platform> Ui<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            tree: WidgetTree::new(),
            registry: HandleRegistry::new(),
            classes: HashSet::new(),
            lifecycle: LifecycleLog::default(),
            store: Box::new(MemoryStateStore::new()),
            config: UiConfig::default(),
        }
    }

    /// Replace the configuration (builder).
    pub fn with_config(mut self, config: UiConfig) -> Self {
        self.lifecycle.set_capacity(config.lifecycle_history);
        self.config = config;
        self
    }

    /// Replace the state store (builder).
    pub fn with_store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Borrow everything widgets need for one operation.
    pub fn context(&mut self) -> Context<'_> {
        Context::new(
            &mut self.platform,
            &mut self.tree,
            &mut self.registry,
            &mut self.classes,
            &mut self.lifecycle,
            self.store.as_mut(),
            &self.config,
        )
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn StateStore {
        self.store.as_mut()
    }

    /// Drain lifecycle events recorded since the last call, oldest first.
    /// At most [`UiConfig::lifecycle_history`] of them are kept.
    pub fn drain_lifecycle(&mut self) -> Vec<LifecycleEvent> {
        self.lifecycle.drain()
    }

    pub fn lookup(&self, handle: Handle) -> Option<WidgetId> {
        self.registry.lookup(handle)
    }

    pub fn handle_of(&self, id: impl Into<WidgetId>) -> Option<Handle> {
        self.tree.handle(id.into())
    }

    // ── Widgets ──────────────────────────────────────────────────────

    pub fn widget<W: Widget>(&self, widget: WidgetRef<W>) -> Result<&W> {
        let id = widget.id();
        self.tree
            .get(id)?
            .as_any()
            .downcast_ref::<W>()
            .ok_or(Error::WrongWidgetType {
                id,
                expected: type_name::<W>(),
            })
    }

    /// Run `f` with mutable access to a widget and a context.
    pub fn update<W: Widget, R>(
        &mut self,
        widget: WidgetRef<W>,
        f: impl FnOnce(&mut W, &mut Context<'_>) -> Result<R>,
    ) -> Result<R> {
        self.context().with_widget(widget.id(), f)
    }

    pub fn dispose(&mut self, id: impl Into<WidgetId>) {
        self.context().dispose(id.into());
    }

    pub fn set_bounds(&mut self, id: impl Into<WidgetId>, bounds: Rectangle) -> Result<()> {
        self.context().set_bounds(id.into(), bounds)
    }

    pub fn bounds(&mut self, id: impl Into<WidgetId>) -> Result<Rectangle> {
        self.context().bounds(id.into())
    }

    pub fn layout_flags(&mut self, id: impl Into<WidgetId>) -> Result<LayoutFlags> {
        self.context().layout_flags(id.into())
    }

    pub fn preferred_size(&mut self, id: impl Into<WidgetId>) -> Result<Size> {
        self.context().preferred_size(id.into())
    }

    pub fn is_visible(&mut self, id: impl Into<WidgetId>) -> Result<bool> {
        self.context().is_visible(id.into())
    }

    pub fn save_state(&mut self, id: impl Into<WidgetId>) -> Result<()> {
        self.context().save_state(id.into())
    }

    pub fn restore_state(&mut self, id: impl Into<WidgetId>) -> Result<()> {
        self.context().restore_state(id.into())
    }

    // ── Message pump ─────────────────────────────────────────────────

    /// Deliver one message; see [`Context::dispatch`].
    pub fn dispatch(&mut self, handle: Handle, message: &Message) -> LResult {
        self.context().dispatch(handle, message)
    }

    /// Drain the platform queue, dispatching one message at a time. Returns
    /// how many messages were delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Some((handle, message)) = self.platform.next_message() {
            self.dispatch(handle, &message);
            delivered += 1;
        }
        delivered
    }

    /// Dispose every widget and forget every handle.
    pub fn shutdown(&mut self) {
        let roots = self.tree.roots();
        if !roots.is_empty() {
            debug!(target: targets::WIDGET, widgets = self.tree.len(), "shutting down");
        }
        let mut cx = self.context();
        for root in roots {
            cx.dispose(root);
        }
        self.registry.clear();
    }
}

impl<P: Platform> Drop for Ui<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
