//! Widget trait: layout contract, message handling, persistence, disposal.
//!
//! Every control implements [`Widget`] and composes a [`WidgetBase`]. The
//! trait is object-safe; the tree stores `Box<dyn Widget>` and hands each
//! widget a [`Context`] giving it access to the platform and the rest of
//! the tree while it runs.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use super::{Context, WidgetBase, WidgetId};
use crate::error::Result;
use crate::geometry::{Rectangle, Size};
use crate::layout::LayoutFlags;
use crate::native::{LResult, Message};

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Core trait implemented by all widgets.
pub trait Widget: Any {
    /// Type name used in logs and tree snapshots (e.g. "ComboBox").
    fn widget_type(&self) -> &'static str;

    fn base(&self) -> &WidgetBase;

    fn base_mut(&mut self) -> &mut WidgetBase;

    /// How a layout may resize this widget. Pure.
    fn layout_flags(&self) -> LayoutFlags;

    /// Natural size given the platform's dialog base units. Pure.
    fn preferred_size(&self, base_units: Size) -> Size;

    /// Handle a message addressed to this widget's window.
    ///
    /// Return `None` to fall through to the shared default handling (resize
    /// callbacks, then the platform default procedure).
    fn handle_message(&mut self, cx: &mut Context<'_>, message: &Message) -> Option<LResult> {
        let _ = (cx, message);
        None
    }

    /// The client area changed size.
    fn on_resize(&mut self, cx: &mut Context<'_>, size: Size) {
        let _ = (cx, size);
    }

    /// Move and resize the native window, then run [`on_resize`](Self::on_resize).
    fn set_bounds(&mut self, cx: &mut Context<'_>, bounds: Rectangle) -> Result<()> {
        self.base().window().set_bounds(cx.platform(), bounds)?;
        self.on_resize(cx, bounds.size());
        Ok(())
    }

    /// Write persistent state to the context's state store.
    fn save_state(&mut self, cx: &mut Context<'_>) -> Result<()> {
        let _ = cx;
        Ok(())
    }

    /// Read persistent state back from the context's state store.
    fn restore_state(&mut self, cx: &mut Context<'_>) -> Result<()> {
        let _ = cx;
        Ok(())
    }

    /// A child is about to be disposed while this widget survives. Containers
    /// drop their bookkeeping for it here.
    fn detach_child(&mut self, cx: &mut Context<'_>, child: WidgetId) -> Result<()> {
        let _ = (cx, child);
        Ok(())
    }

    /// Release resources other than the widget's own window (which the
    /// context releases afterwards). Children are already disposed.
    fn on_dispose(&mut self, cx: &mut Context<'_>) {
        let _ = cx;
    }

    /// Downcast to `&dyn Any` for runtime type inspection.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any` for mutable runtime type inspection.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ---------------------------------------------------------------------------
// WidgetRef
// ---------------------------------------------------------------------------

/// Typed handle to a widget in the tree.
///
/// Cheap to copy; it does not keep the widget alive. Access goes through
/// [`Ui::widget`](crate::Ui::widget) / [`Ui::update`](crate::Ui::update) or
/// the [`Context`] equivalents, which check the type at runtime.
pub struct WidgetRef<W> {
    id: WidgetId,
    _marker: PhantomData<fn() -> W>,
}

impl<W> WidgetRef<W> {
    pub(crate) fn new(id: WidgetId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(self) -> WidgetId {
        self.id
    }
}

impl<W> Clone for WidgetRef<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for WidgetRef<W> {}

impl<W> PartialEq for WidgetRef<W> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<W> Eq for WidgetRef<W> {}

impl<W> Hash for WidgetRef<W> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<W> fmt::Debug for WidgetRef<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WidgetRef<{}>({:?})", short_type_name::<W>(), self.id)
    }
}

impl<W> From<WidgetRef<W>> for WidgetId {
    fn from(widget: WidgetRef<W>) -> Self {
        widget.id
    }
}

fn short_type_name<W>() -> &'static str {
    let full = std::any::type_name::<W>();
    full.rsplit("::").next().unwrap_or(full)
}
