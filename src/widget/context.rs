//! [`Context`]: what a widget can reach while it runs.
//!
//! A context borrows the [`Ui`](crate::Ui)'s platform, tree, handle registry,
//! state store and config for the duration of one operation. Widget
//! construction, disposal and message dispatch are implemented here so that
//! containers can create and dispose children from inside their own
//! handlers.

use std::any::type_name;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use super::{HandleRegistry, LifecycleLog, Widget, WidgetBase, WidgetId, WidgetRef, WidgetTree};
use crate::error::{Error, Result};
use crate::geometry::{Rectangle, Size};
use crate::layout::LayoutFlags;
use crate::logging::targets;
use crate::native::{class, CreateParams, Handle, LResult, Message, NativeWindow, Platform};
use crate::state::StateStore;
use crate::ui::UiConfig;

/// Borrowed view of the UI state handed to widgets.
pub struct Context<'a> {
    platform: &'a mut dyn Platform,
    tree: &'a mut WidgetTree,
    registry: &'a mut HandleRegistry,
    classes: &'a mut HashSet<&'static str>,
    lifecycle: &'a mut LifecycleLog,
    store: &'a mut dyn StateStore,
    config: &'a UiConfig,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        platform: &'a mut dyn Platform,
        tree: &'a mut WidgetTree,
        registry: &'a mut HandleRegistry,
        classes: &'a mut HashSet<&'static str>,
        lifecycle: &'a mut LifecycleLog,
        store: &'a mut dyn StateStore,
        config: &'a UiConfig,
    ) -> Self {
        Self {
            platform,
            tree,
            registry,
            classes,
            lifecycle,
            store,
            config,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn platform(&mut self) -> &mut dyn Platform {
        &mut *self.platform
    }

    pub fn tree(&self) -> &WidgetTree {
        self.tree
    }

    pub fn registry(&self) -> &HandleRegistry {
        self.registry
    }

    pub fn store(&mut self) -> &mut dyn StateStore {
        &mut *self.store
    }

    pub fn config(&self) -> &UiConfig {
        self.config
    }

    /// Native handle of a live widget.
    pub fn handle_of(&self, id: WidgetId) -> Result<Handle> {
        self.tree.handle(id).ok_or(Error::WidgetNotFound(id))
    }

    // ── Construction ─────────────────────────────────────────────────

    /// Create a widget atop a new native window.
    ///
    /// Allocates the window (child of `parent`'s window when given), inserts
    /// the widget built by `build` into the tree, registers its handle and
    /// then runs `post_create`. If anything fails the widget is disposed again
    /// and no window, registry entry or tree slot is left behind.
    pub fn initialize<W: Widget>(
        &mut self,
        parent: Option<WidgetId>,
        params: CreateParams,
        build: impl FnOnce(WidgetBase) -> W,
        post_create: impl FnOnce(&mut W, &mut Context<'_>) -> Result<()>,
    ) -> Result<WidgetRef<W>> {
        let parent_handle = parent.map(|p| self.handle_of(p)).transpose()?;
        self.ensure_class(params.class)?;
        let params = params.with_parent(parent_handle);
        let window = NativeWindow::create(self.platform, &params)?;
        let handle = window.handle()?;

        let id = self
            .tree
            .insert_with(parent, handle, |id| Box::new(build(WidgetBase::new(id, window))));
        self.registry.register(handle, id);
        self.lifecycle.created(id);
        debug!(target: targets::WIDGET, ?id, %handle, widget = type_name::<W>(), "widget created");

        let mut guard = DisposeGuard {
            cx: self,
            id,
            armed: true,
        };
        guard.cx.with_widget::<W, _>(id, post_create)?;
        guard.armed = false;
        Ok(WidgetRef::new(id))
    }

    fn ensure_class(&mut self, class: &'static str) -> Result<()> {
        if class::SYSTEM.contains(&class) || self.classes.contains(class) {
            return Ok(());
        }
        self.platform.register_class(class)?;
        self.classes.insert(class);
        trace!(target: targets::WIDGET, class, "registered window class");
        Ok(())
    }

    // ── Disposal ─────────────────────────────────────────────────────

    /// Dispose a widget and its whole subtree. Idempotent.
    ///
    /// A surviving parent is told first through
    /// [`Widget::detach_child`]; if it refuses, nothing is disposed. A
    /// parent that is itself running is told once its handler returns.
    /// Descendants are disposed before their ancestors; each has
    /// [`Widget::on_dispose`] run, its window released and its handle
    /// deregistered. A widget that is currently running (its own handler
    /// disposed it) is finished off when its handler returns.
    pub fn dispose(&mut self, id: WidgetId) {
        if !self.tree.contains(id) {
            return;
        }
        if let Some(parent) = self.tree.parent(id) {
            match self.with_dyn(parent, |p, cx| p.detach_child(cx, id)) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(target: targets::WIDGET, ?id, ?parent, %err, "parent refused to detach child; dispose aborted");
                    return;
                }
                Err(Error::WidgetBusy(_)) => {
                    trace!(target: targets::WIDGET, ?id, ?parent, "parent busy; detach deferred");
                    self.tree.defer_detach(parent, id);
                }
                Err(err) => trace!(target: targets::WIDGET, ?id, ?parent, %err, "parent unavailable"),
            }
        }
        if !self.tree.contains(id) {
            return;
        }

        let doomed = self.tree.walk_depth_first(id);
        for &node in doomed.iter().rev() {
            if let Some(handle) = self.tree.handle(node) {
                self.registry.deregister(handle);
            }
            match self.tree.take(node) {
                Ok(mut widget) => self.finish(widget.as_mut()),
                Err(_) => trace!(target: targets::WIDGET, ?node, "widget busy; finished when its handler returns"),
            }
            self.lifecycle.disposed(node);
        }
        self.tree.remove(id);
        debug!(target: targets::WIDGET, ?id, widgets = doomed.len(), "widget disposed");
    }

    fn finish(&mut self, widget: &mut dyn Widget) {
        widget.on_dispose(self);
        widget.base_mut().window_mut().release(self.platform);
    }

    // ── Access ───────────────────────────────────────────────────────

    /// Run `f` with exclusive access to one widget and to this context.
    ///
    /// The widget is checked out of the tree for the duration, so `f` may
    /// touch any other widget (but not this one: it reports `WidgetBusy`).
    /// The widget goes back into the tree even if `f` panics; the panic then
    /// continues.
    pub fn with_dyn<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Widget, &mut Context<'_>) -> R,
    ) -> Result<R> {
        let mut widget = self.tree.take(id)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(widget.as_mut(), &mut *self)));
        match self.tree.restore(id, widget) {
            Ok(()) => {
                if outcome.is_ok() {
                    self.run_deferred_detach(id);
                }
            }
            // Disposed while it was running.
            Err(mut orphan) => self.finish(orphan.as_mut()),
        }
        match outcome {
            Ok(result) => Ok(result),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn run_deferred_detach(&mut self, id: WidgetId) {
        for child in self.tree.take_deferred_detach(id) {
            match self.with_dyn(id, |p, cx| p.detach_child(cx, child)) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(target: targets::WIDGET, parent = ?id, ?child, %err, "deferred detach failed")
                }
                Err(err) => trace!(target: targets::WIDGET, parent = ?id, ?child, %err, "parent unavailable"),
            }
        }
    }

    /// Like [`with_dyn`](Self::with_dyn) for a widget of known type.
    pub fn with_widget<W: Widget, R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut W, &mut Context<'_>) -> Result<R>,
    ) -> Result<R> {
        self.with_dyn(id, |widget, cx| match widget.as_any_mut().downcast_mut::<W>() {
            Some(widget) => f(widget, cx),
            None => Err(Error::WrongWidgetType {
                id,
                expected: type_name::<W>(),
            }),
        })?
    }

    /// Shared access to a widget of known type.
    pub fn widget<W: Widget>(&self, id: WidgetId) -> Result<&W> {
        self.tree
            .get(id)?
            .as_any()
            .downcast_ref::<W>()
            .ok_or(Error::WrongWidgetType {
                id,
                expected: type_name::<W>(),
            })
    }

    /// Attach a widget to a new parent in both the widget tree and the
    /// native window hierarchy. On failure the native parent is put back.
    pub fn attach(&mut self, child: WidgetId, parent: WidgetId, index: Option<usize>) -> Result<()> {
        let child_handle = self.handle_of(child)?;
        let parent_handle = self.handle_of(parent)?;
        let previous = self.platform.parent(child_handle)?;
        self.platform.set_parent(child_handle, Some(parent_handle))?;
        if let Err(err) = self.tree.attach(child, parent, index) {
            if let Err(undo) = self.platform.set_parent(child_handle, previous) {
                warn!(target: targets::WIDGET, ?child, %undo, "could not restore native parent");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Detach a widget from its parent in both hierarchies. It stays alive.
    /// The tree link is always cut; the native error, if any, is returned.
    pub fn detach(&mut self, child: WidgetId) -> Result<()> {
        let handle = self.handle_of(child)?;
        self.tree.detach(child);
        self.platform.set_parent(handle, None)
    }

    // ── Layout contract ──────────────────────────────────────────────

    pub fn layout_flags(&self, id: WidgetId) -> Result<LayoutFlags> {
        Ok(self.tree.get(id)?.layout_flags())
    }

    pub fn preferred_size(&self, id: WidgetId) -> Result<Size> {
        let base_units = self.platform.dialog_base_units();
        Ok(self.tree.get(id)?.preferred_size(base_units))
    }

    pub fn set_bounds(&mut self, id: WidgetId, bounds: Rectangle) -> Result<()> {
        self.with_dyn(id, |widget, cx| widget.set_bounds(cx, bounds))?
    }

    pub fn bounds(&self, id: WidgetId) -> Result<Rectangle> {
        self.platform.bounds(self.handle_of(id)?)
    }

    pub fn is_visible(&self, id: WidgetId) -> Result<bool> {
        self.platform.is_visible(self.handle_of(id)?)
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<()> {
        let handle = self.handle_of(id)?;
        self.platform.set_visible(handle, visible)
    }

    pub fn invalidate(&mut self, id: WidgetId) -> Result<()> {
        let handle = self.handle_of(id)?;
        self.platform.invalidate(handle)
    }

    // ── Persistence ──────────────────────────────────────────────────

    pub fn save_state(&mut self, id: WidgetId) -> Result<()> {
        self.with_dyn(id, |widget, cx| widget.save_state(cx))?
    }

    pub fn restore_state(&mut self, id: WidgetId) -> Result<()> {
        self.with_dyn(id, |widget, cx| widget.restore_state(cx))?
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Deliver one message to the widget owning `handle`.
    ///
    /// Messages for unknown windows, or for a widget that is already running,
    /// go straight to the platform default procedure, so every message gets
    /// a response.
    pub fn dispatch(&mut self, handle: Handle, message: &Message) -> LResult {
        let Some(id) = self.registry.lookup(handle) else {
            trace!(target: targets::DISPATCH, %handle, message = message.message_name(), "no widget; default handling");
            return self.platform.default_proc(handle, message);
        };
        trace!(target: targets::DISPATCH, %handle, ?id, message = message.message_name(), "dispatch");
        let outcome = self.with_dyn(id, |widget, cx| match widget.handle_message(cx, message) {
            Some(result) => result,
            None => cx.default_handling(widget, handle, message),
        });
        match outcome {
            Ok(result) => result,
            Err(err) => {
                trace!(target: targets::DISPATCH, %handle, %err, "widget unavailable; default handling");
                self.platform.default_proc(handle, message)
            }
        }
    }

    /// Behavior shared by every widget for messages it did not claim.
    fn default_handling(&mut self, widget: &mut dyn Widget, handle: Handle, message: &Message) -> LResult {
        match message {
            Message::Size(size) | Message::Sizing(size) => widget.on_resize(self, *size),
            Message::Destroy => {
                let id = widget.base().id();
                debug!(target: targets::DISPATCH, %handle, ?id, "window destroyed by platform");
                self.dispose(id);
            }
            _ => {}
        }
        self.platform.default_proc(handle, message)
    }
}

/// Disposes a half-constructed widget unless disarmed.
struct DisposeGuard<'c, 'a> {
    cx: &'c mut Context<'a>,
    id: WidgetId,
    armed: bool,
}

impl Drop for DisposeGuard<'_, '_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(target: targets::WIDGET, id = ?self.id, "construction failed; rolling back");
            // The parent never adopted it, so it is not asked to let go.
            self.cx.tree.detach(self.id);
            self.cx.dispose(self.id);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
