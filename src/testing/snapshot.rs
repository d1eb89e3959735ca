//! Text snapshots of a widget tree.
//!
//! Each widget becomes one line: its type, its name when set, its bounds and
//! a `hidden` marker when its window is not visible. Children are indented
//! two spaces below their parent, in tree order.

use std::fmt::Write;

use crate::native::Platform;
use crate::ui::Ui;
use crate::widget::{Widget, WidgetId};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render every root of `ui` and its subtree.
pub fn tree_to_string<P: Platform>(ui: &Ui<P>) -> String {
    let mut out = String::new();
    for root in ui.tree().roots() {
        write_subtree(ui, root, 0, &mut out);
    }
    out.trim_end().to_owned()
}

/// Render a single subtree.
pub fn subtree_to_string<P: Platform>(ui: &Ui<P>, id: impl Into<WidgetId>) -> String {
    let mut out = String::new();
    write_subtree(ui, id.into(), 0, &mut out);
    out.trim_end().to_owned()
}

fn write_subtree<P: Platform>(ui: &Ui<P>, id: WidgetId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let Ok(widget) = ui.tree().get(id) else {
        let _ = writeln!(out, "{indent}<busy>");
        return;
    };
    let _ = write!(out, "{indent}{}", widget.widget_type());
    let name = widget.base().name();
    if !name.is_empty() {
        let _ = write!(out, " #{name}");
    }
    if let Ok(handle) = widget.base().handle() {
        if let Ok(bounds) = ui.platform().bounds(handle) {
            let _ = write!(out, " [{bounds}]");
        }
        if !ui.platform().is_visible(handle).unwrap_or(false) {
            out.push_str(" hidden");
        }
    }
    out.push('\n');
    for &child in ui.tree().children(id) {
        write_subtree(ui, child, depth + 1, out);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
