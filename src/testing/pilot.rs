//! Pilot: drives a headless [`Ui`] the way a user would.
//!
//! Every interaction queues the native messages a real window manager would
//! send and then pumps them, so widgets react through their regular message
//! handlers.

use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::native::{Handle, HeadlessPlatform, NativeOp};
use crate::ui::{Ui, UiConfig};
use crate::widget::{WidgetId, WidgetRef};
use crate::widgets::{ComboBox, TabWidget};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless UI driver for tests.
///
/// ```ignore
/// use casement::testing::Pilot;
/// use casement::widgets::ComboBox;
///
/// let mut pilot = Pilot::new();
/// let combo = ComboBox::new(&mut pilot.ui_mut().context(), None)?;
/// pilot.ui_mut().update(combo, |cb, cx| cb.add_item(cx, "A"))?;
/// pilot.choose_combo_item(combo, 0)?;
/// ```
pub struct Pilot {
    ui: Ui<HeadlessPlatform>,
}

impl Pilot {
    pub fn new() -> Self {
        Self {
            ui: Ui::new_headless(),
        }
    }

    pub fn with_config(config: UiConfig) -> Self {
        Self {
            ui: Ui::new_headless().with_config(config),
        }
    }

    // ── User simulation ──────────────────────────────────────────────

    /// Pick an item from a combo box list.
    pub fn choose_combo_item(&mut self, combo: WidgetRef<ComboBox>, index: usize) -> Result<()> {
        let handle = self.handle(combo)?;
        self.ui.platform_mut().user_select_combo_item(handle, index)?;
        self.process();
        Ok(())
    }

    /// Click the tab at `index`.
    pub fn click_tab(&mut self, tabs: WidgetRef<TabWidget>, index: usize) -> Result<()> {
        let strip = self.ui.widget(tabs)?.tab_strip()?;
        self.ui.platform_mut().user_select_tab(strip, index)?;
        self.process();
        Ok(())
    }

    /// Drag the window of `widget` to a new size.
    pub fn resize(&mut self, widget: impl Into<WidgetId>, size: Size) -> Result<()> {
        let handle = self.handle(widget)?;
        self.ui.platform_mut().user_resize(handle, size)?;
        self.process();
        Ok(())
    }

    /// Make the next call of `op` fail.
    pub fn fail_next(&mut self, op: NativeOp) {
        self.ui.platform_mut().fail_next(op);
    }

    fn handle(&self, widget: impl Into<WidgetId>) -> Result<Handle> {
        let id = widget.into();
        self.ui.handle_of(id).ok_or(Error::WidgetNotFound(id))
    }

    // ── Processing ───────────────────────────────────────────────────

    /// Deliver every queued message; returns how many were delivered.
    pub fn process(&mut self) -> usize {
        self.ui.pump()
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn ui(&self) -> &Ui<HeadlessPlatform> {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui<HeadlessPlatform> {
        &mut self.ui
    }

    /// Text dump of the widget tree.
    pub fn snapshot(&self) -> String {
        super::snapshot::tree_to_string(&self.ui)
    }
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
