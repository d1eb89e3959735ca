//! ComboBox: drop-down list of text items with a single selection.

use std::any::Any;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::event::{Event, EventPublisher};
use crate::geometry::Size;
use crate::layout::LayoutFlags;
use crate::logging::targets;
use crate::native::{class, CommandCode, CreateParams, Handle, LResult, Message, Style};
use crate::ui::SelectionNotify;
use crate::widget::{Context, Widget, WidgetBase, WidgetId, WidgetRef};

/// Drop-down list bound to the platform's combo box control.
///
/// The item list and the selection live in the native control; the widget
/// mirrors them. Every mutation goes to the control first and only touches
/// the mirror once the control accepted it.
pub struct ComboBox {
    base: WidgetBase,
    items: Vec<String>,
    /// Last selection observed or published; detects redundant notifications.
    prev_selected: Option<usize>,
    selected_index_changed: EventPublisher,
}

impl ComboBox {
    /// Create an empty combo box.
    pub fn new(cx: &mut Context<'_>, parent: Option<WidgetId>) -> Result<WidgetRef<Self>> {
        Self::new_with(cx, parent, |_, _| Ok(()))
    }

    /// Create an empty combo box and run `post_create` on it before it is
    /// handed out. If `post_create` fails the combo box is disposed.
    pub fn new_with(
        cx: &mut Context<'_>,
        parent: Option<WidgetId>,
        post_create: impl FnOnce(&mut Self, &mut Context<'_>) -> Result<()>,
    ) -> Result<WidgetRef<Self>> {
        let params = CreateParams::new(class::COMBO_BOX)
            .with_style(Style::CHILD | Style::TABSTOP | Style::VISIBLE | Style::VSCROLL | Style::DROPDOWNLIST);
        cx.initialize(
            parent,
            params,
            |base| ComboBox {
                base,
                items: Vec::new(),
                prev_selected: None,
                selected_index_changed: EventPublisher::new(),
            },
            post_create,
        )
    }

    // ── Items ────────────────────────────────────────────────────────

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    /// Insert `text` at `index` (`index == item_count()` appends).
    pub fn insert_item(&mut self, cx: &mut Context<'_>, index: usize, text: &str) -> Result<()> {
        let count = self.items.len();
        if index > count {
            return Err(Error::InvalidIndex { index, count });
        }
        let handle = self.base.handle()?;
        cx.platform().combo_insert_string(handle, index, text)?;

        self.items.insert(index, text.to_owned());
        if let Some(selected) = self.prev_selected {
            if selected >= index {
                self.prev_selected = Some(selected + 1);
            }
        }
        debug!(target: targets::COMBO_BOX, %handle, index, text, "item inserted");
        Ok(())
    }

    /// Append `text`; returns its index.
    pub fn add_item(&mut self, cx: &mut Context<'_>, text: &str) -> Result<usize> {
        let index = self.items.len();
        self.insert_item(cx, index, text)?;
        Ok(index)
    }

    /// Remove the item at `index` and return its text.
    ///
    /// Removing the selected item leaves nothing selected. That is not
    /// published; the next selection is.
    pub fn remove_item(&mut self, cx: &mut Context<'_>, index: usize) -> Result<String> {
        let count = self.items.len();
        if index >= count {
            return Err(Error::InvalidIndex { index, count });
        }
        let handle = self.base.handle()?;
        cx.platform().combo_delete_string(handle, index)?;

        let text = self.items.remove(index);
        self.prev_selected = match self.prev_selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        debug!(target: targets::COMBO_BOX, %handle, index, "item removed");
        Ok(text)
    }

    /// Remove every item. The selection becomes none without publishing.
    pub fn clear_items(&mut self, cx: &mut Context<'_>) -> Result<()> {
        let handle = self.base.handle()?;
        cx.platform().combo_reset_content(handle)?;
        self.items.clear();
        self.prev_selected = None;
        Ok(())
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn selected_index(&self) -> Option<usize> {
        self.prev_selected
    }

    /// Published after the selected index changed.
    pub fn selected_index_changed(&self) -> &Event {
        self.selected_index_changed.event()
    }

    /// Select `index`, or clear the selection with `None`.
    ///
    /// Fails with [`Error::InvalidIndex`] when the control does not end up
    /// with the requested selection; the previous selection is put back.
    pub fn set_selected_index(&mut self, cx: &mut Context<'_>, index: Option<usize>) -> Result<()> {
        let handle = self.base.handle()?;
        let actual = cx.platform().combo_set_cur_sel(handle, index)?;
        if actual != index {
            self.restore_native_selection(cx, handle);
            return Err(match index {
                Some(index) => Error::InvalidIndex {
                    index,
                    count: self.items.len(),
                },
                None => Error::native("CB_SETCURSEL", "selection could not be cleared"),
            });
        }
        self.record_selection(cx, actual);
        Ok(())
    }

    fn restore_native_selection(&self, cx: &mut Context<'_>, handle: Handle) {
        if let Err(err) = cx.platform().combo_set_cur_sel(handle, self.prev_selected) {
            warn!(target: targets::COMBO_BOX, %handle, %err, "restoring selection failed");
        }
    }

    /// Record `selection` and publish according to the notification policy.
    fn record_selection(&mut self, cx: &Context<'_>, selection: Option<usize>) {
        let changed = selection != self.prev_selected;
        self.prev_selected = selection;
        if changed || cx.config().selection_notify == SelectionNotify::Always {
            debug!(target: targets::COMBO_BOX, ?selection, changed, "selected index changed");
            self.selected_index_changed.publish();
        }
    }

    // ── Edit text ────────────────────────────────────────────────────

    /// Selected character range of the edit field as `(start, end)`.
    pub fn text_selection(&self, cx: &mut Context<'_>) -> Result<(usize, usize)> {
        let handle = self.base.handle()?;
        cx.platform().combo_edit_sel(handle)
    }

    pub fn set_text_selection(&mut self, cx: &mut Context<'_>, start: usize, end: usize) -> Result<()> {
        let handle = self.base.handle()?;
        cx.platform().combo_set_edit_sel(handle, start, end)
    }
}

impl Widget for ComboBox {
    fn widget_type(&self) -> &'static str {
        "ComboBox"
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn layout_flags(&self) -> LayoutFlags {
        LayoutFlags::SHRINKABLE_HORZ | LayoutFlags::GROWABLE_HORZ
    }

    fn preferred_size(&self, base_units: Size) -> Size {
        Size::from_dialog_units(Size::new(50, 12), base_units)
    }

    fn handle_message(&mut self, cx: &mut Context<'_>, message: &Message) -> Option<LResult> {
        let Message::Command {
            code: CommandCode::SelEndOk,
            ..
        } = message
        else {
            return None;
        };
        let handle = self.base.handle().ok()?;
        match cx.platform().combo_cur_sel(handle) {
            Ok(selection) => self.record_selection(cx, selection),
            Err(err) => warn!(target: targets::COMBO_BOX, %handle, %err, "reading selection failed"),
        }
        Some(0)
    }

    fn on_dispose(&mut self, _cx: &mut Context<'_>) {
        self.selected_index_changed.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================
