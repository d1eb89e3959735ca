//! WebView: host window for an embedded browser.

use std::any::Any;

use tracing::debug;

use crate::error::Result;
use crate::geometry::Size;
use crate::layout::LayoutFlags;
use crate::logging::targets;
use crate::native::{class, CreateParams, Style};
use crate::widget::{Context, Widget, WidgetBase, WidgetId, WidgetRef};

/// Embedded browser. Navigation is delegated to the platform.
pub struct WebView {
    base: WidgetBase,
}

impl WebView {
    pub fn new(cx: &mut Context<'_>, parent: Option<WidgetId>) -> Result<WidgetRef<Self>> {
        Self::new_with(cx, parent, |_, _| Ok(()))
    }

    pub fn new_with(
        cx: &mut Context<'_>,
        parent: Option<WidgetId>,
        post_create: impl FnOnce(&mut Self, &mut Context<'_>) -> Result<()>,
    ) -> Result<WidgetRef<Self>> {
        let params = CreateParams::new(class::WEB_VIEW)
            .with_style(Style::CHILD | Style::VISIBLE | Style::CLIPSIBLINGS);
        cx.initialize(parent, params, |base| WebView { base }, post_create)
    }

    /// The page currently shown.
    pub fn url(&self, cx: &mut Context<'_>) -> Result<String> {
        cx.platform().web_view_url(self.base.handle()?)
    }

    /// Navigate to `url`.
    pub fn set_url(&mut self, cx: &mut Context<'_>, url: &str) -> Result<()> {
        let handle = self.base.handle()?;
        cx.platform().web_view_navigate(handle, url)?;
        debug!(target: targets::WIDGET, %handle, url, "navigated");
        Ok(())
    }
}

impl Widget for WebView {
    fn widget_type(&self) -> &'static str {
        "WebView"
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn layout_flags(&self) -> LayoutFlags {
        LayoutFlags::ALL
    }

    fn preferred_size(&self, base_units: Size) -> Size {
        Size::from_dialog_units(Size::new(100, 100), base_units)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
