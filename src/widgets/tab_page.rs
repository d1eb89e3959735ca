//! TabPage: a titled composite shown inside a [`TabWidget`](super::TabWidget).

use std::any::Any;

use tracing::warn;

use crate::error::Result;
use crate::geometry::Size;
use crate::layout::{BoxLayout, LayoutFlags, LayoutItem};
use crate::logging::targets;
use crate::native::{class, CreateParams, ExStyle, Style};
use crate::widget::{Context, Widget, WidgetBase, WidgetId, WidgetRef};

/// Composite container for one tab.
///
/// Created as a hidden top-level window; inserting it into a tab widget
/// turns it into a child of that widget. Child widgets are created with the
/// page as their parent and, when a [`BoxLayout`] is set, are arranged
/// whenever the page is resized.
pub struct TabPage {
    base: WidgetBase,
    title: String,
    layout: Option<BoxLayout>,
}

impl TabPage {
    pub fn new(cx: &mut Context<'_>, title: impl Into<String>) -> Result<WidgetRef<Self>> {
        Self::new_with(cx, title, |_, _| Ok(()))
    }

    pub fn new_with(
        cx: &mut Context<'_>,
        title: impl Into<String>,
        post_create: impl FnOnce(&mut Self, &mut Context<'_>) -> Result<()>,
    ) -> Result<WidgetRef<Self>> {
        let title = title.into();
        let params = CreateParams::new(class::COMPOSITE)
            .with_style(Style::POPUP)
            .with_ex_style(ExStyle::CONTROLPARENT);
        cx.initialize(
            None,
            params,
            |base| TabPage {
                base,
                title,
                layout: None,
            },
            post_create,
        )
    }

    /// Text shown on the page's tab.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn layout(&self) -> Option<&BoxLayout> {
        self.layout.as_ref()
    }

    /// Install (or remove) the layout and arrange the children right away.
    pub fn set_layout(&mut self, cx: &mut Context<'_>, layout: Option<BoxLayout>) -> Result<()> {
        self.layout = layout;
        let size = cx.bounds(self.base.id())?.size();
        self.arrange(cx, size)
    }

    /// Child widgets in creation order.
    pub fn children(&self, cx: &Context<'_>) -> Vec<WidgetId> {
        cx.tree().children(self.base.id()).to_vec()
    }

    fn arrange(&self, cx: &mut Context<'_>, size: Size) -> Result<()> {
        let Some(layout) = self.layout else {
            return Ok(());
        };
        let children = self.children(cx);
        let items = children
            .iter()
            .map(|&child| -> Result<LayoutItem> {
                Ok(LayoutItem {
                    flags: cx.layout_flags(child)?,
                    preferred: cx.preferred_size(child)?,
                    stretch: cx.tree().get(child)?.base().hints().stretch_factor,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let rects = layout.arrange(size, &items)?;
        for (child, rect) in children.into_iter().zip(rects) {
            cx.set_bounds(child, rect)?;
        }
        Ok(())
    }
}

impl Widget for TabPage {
    fn widget_type(&self) -> &'static str {
        "TabPage"
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn layout_flags(&self) -> LayoutFlags {
        LayoutFlags::SHRINKABLE_HORZ
            | LayoutFlags::SHRINKABLE_VERT
            | LayoutFlags::GROWABLE_HORZ
            | LayoutFlags::GROWABLE_VERT
    }

    fn preferred_size(&self, base_units: Size) -> Size {
        Size::from_dialog_units(Size::new(100, 100), base_units)
    }

    fn on_resize(&mut self, cx: &mut Context<'_>, size: Size) {
        if let Err(err) = self.arrange(cx, size) {
            warn!(target: targets::LAYOUT, id = ?self.base.id(), %err, "arranging page children failed");
        }
    }

    fn save_state(&mut self, cx: &mut Context<'_>) -> Result<()> {
        for child in self.children(cx) {
            cx.save_state(child)?;
        }
        Ok(())
    }

    fn restore_state(&mut self, cx: &mut Context<'_>) -> Result<()> {
        for child in self.children(cx) {
            cx.restore_state(child)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;
    use crate::native::Platform;
    use crate::widgets::{ComboBox, WebView};
    use crate::Ui;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_starts_hidden_and_top_level() {
        let mut ui = Ui::new_headless();
        let page = TabPage::new(&mut ui.context(), "General").unwrap();
        let handle = ui.handle_of(page).unwrap();
        assert_eq!(ui.widget(page).unwrap().title(), "General");
        assert!(!ui.is_visible(page).unwrap());
        assert_eq!(ui.platform().parent(handle).unwrap(), None);
        assert!(ui.platform().style(handle).unwrap().contains(Style::POPUP));
    }

    #[test]
    fn layout_arranges_children_on_resize() {
        let mut ui = Ui::new_headless();
        let page = TabPage::new(&mut ui.context(), "Layout").unwrap();
        let combo = ComboBox::new(&mut ui.context(), Some(page.id())).unwrap();
        let web = WebView::new(&mut ui.context(), Some(page.id())).unwrap();
        ui.update(page, |p, cx| p.set_layout(cx, Some(BoxLayout::vertical())))
            .unwrap();

        ui.set_bounds(page, Rectangle::new(0, 0, 300, 200)).unwrap();

        // The combo box keeps its preferred height and fills the width; the
        // greedy web view takes the rest.
        assert_eq!(ui.bounds(combo).unwrap(), Rectangle::new(0, 0, 300, 24));
        assert_eq!(ui.bounds(web).unwrap(), Rectangle::new(0, 24, 300, 176));
    }

    #[test]
    fn without_layout_children_are_left_alone() {
        let mut ui = Ui::new_headless();
        let page = TabPage::new(&mut ui.context(), "Free").unwrap();
        let combo = ComboBox::new(&mut ui.context(), Some(page.id())).unwrap();
        ui.set_bounds(combo, Rectangle::new(5, 5, 50, 20)).unwrap();
        ui.set_bounds(page, Rectangle::new(0, 0, 300, 200)).unwrap();
        assert_eq!(ui.bounds(combo).unwrap(), Rectangle::new(5, 5, 50, 20));
    }

    #[test]
    fn disposing_page_disposes_children_first() {
        let mut ui = Ui::new_headless();
        let page = TabPage::new(&mut ui.context(), "Owner").unwrap();
        let combo = ComboBox::new(&mut ui.context(), Some(page.id())).unwrap();
        ui.drain_lifecycle();

        ui.dispose(page);
        assert_eq!(
            ui.drain_lifecycle(),
            vec![
                crate::widget::LifecycleEvent::Disposed { id: combo.id() },
                crate::widget::LifecycleEvent::Disposed { id: page.id() },
            ]
        );
        assert_eq!(ui.platform().window_count(), 0);
    }
}
