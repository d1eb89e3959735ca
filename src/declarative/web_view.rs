//! Declarative [`WebView`](crate::widgets::WebView).

use tracing::debug;

use super::Declaration;
use crate::error::Result;
use crate::logging::targets;
use crate::widget::{Context, LayoutHints, Widget, WidgetId, WidgetRef};
use crate::widgets;

/// Struct-literal description of an embedded browser.
///
/// ```ignore
/// let mut browser = None;
/// declarative::WebView {
///     assign_to: Some(&mut browser),
///     name: "help".into(),
///     url: "https://example.org/".into(),
///     ..Default::default()
/// }
/// .create(cx, Some(page))?;
/// ```
#[derive(Debug, Default)]
pub struct WebView<'a> {
    /// Receives the created widget once its URL is set.
    pub assign_to: Option<&'a mut Option<WidgetRef<widgets::WebView>>>,
    pub name: String,
    /// Zero means the default factor of 1.
    pub stretch_factor: u32,
    pub row: usize,
    /// Zero means the default span of 1.
    pub row_span: usize,
    pub column: usize,
    /// Zero means the default span of 1.
    pub column_span: usize,
    /// Initial page; empty leaves the view blank.
    pub url: String,
}

impl WebView<'_> {
    fn hints(&self) -> LayoutHints {
        let defaults = LayoutHints::default();
        LayoutHints {
            stretch_factor: nonzero_or(self.stretch_factor, defaults.stretch_factor),
            row: self.row,
            row_span: nonzero_or(self.row_span, defaults.row_span),
            column: self.column,
            column_span: nonzero_or(self.column_span, defaults.column_span),
        }
    }

    /// Like [`Declaration::create`], keeping the widget's concrete type.
    pub fn build(self, cx: &mut Context<'_>, parent: Option<WidgetId>) -> Result<WidgetRef<widgets::WebView>> {
        let hints = self.hints();
        let WebView {
            assign_to,
            name,
            url,
            ..
        } = self;
        widgets::WebView::new_with(cx, parent, move |view, cx| {
            let base = view.base_mut();
            base.set_name(name);
            *base.hints_mut() = hints;
            if !url.is_empty() {
                view.set_url(cx, &url)?;
            }
            if let Some(slot) = assign_to {
                *slot = Some(WidgetRef::new(view.base().id()));
            }
            debug!(target: targets::WIDGET, id = ?view.base().id(), name = view.base().name(), "declared web view built");
            Ok(())
        })
    }
}

impl Declaration for WebView<'_> {
    fn create(self, cx: &mut Context<'_>, parent: Option<WidgetId>) -> Result<WidgetId> {
        self.build(cx, parent).map(WidgetRef::id)
    }

    fn common_info(&self) -> (&str, LayoutHints) {
        (&self.name, self.hints())
    }
}

fn nonzero_or<T: Default + PartialEq>(value: T, default: T) -> T {
    if value == T::default() {
        default
    } else {
        value
    }
}
