//! Declarative construction: describe a widget as a struct literal, then
//! [`create`](Declaration::create) it under a parent.
//!
//! A declaration only consumes the construction contract of the widget it
//! describes. Its initial properties are applied inside the post-create
//! hook, so a failure there disposes the half-built widget.

pub mod web_view;

pub use web_view::WebView;

use crate::error::Result;
use crate::widget::{Context, LayoutHints, WidgetId};

/// A widget description that can be turned into a live widget.
pub trait Declaration {
    /// Build the widget as a child of `parent`.
    fn create(self, cx: &mut Context<'_>, parent: Option<WidgetId>) -> Result<WidgetId>;

    /// Name and layout placement shared by every declaration.
    fn common_info(&self) -> (&str, LayoutHints);
}
