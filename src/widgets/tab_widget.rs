//! TabWidget: a native tab strip over a stack of [`TabPage`]s.
//!
//! The widget keeps three things in sync: the native tab strip's items and
//! selection, the ordered list of pages, and page visibility. Exactly one
//! page is visible whenever there are pages, and it is the selected one.
//!
//! States:
//!
//! - *Empty*: no pages, nothing selected.
//! - *Pages, none selected*: transient, only while pages are being
//!   inserted into an empty widget.
//! - *Pages with selection*: the usual state.

use std::any::Any;

use tracing::{debug, warn};

use super::TabPage;
use crate::error::{Error, Result};
use crate::event::{Event, EventPublisher};
use crate::geometry::{Rectangle, Size};
use crate::layout::LayoutFlags;
use crate::logging::targets;
use crate::native::{class, CreateParams, ExStyle, Handle, LResult, Message, NativeWindow, NotifyCode, Style};
use crate::ui::SelectionNotify;
use crate::widget::{Context, Widget, WidgetBase, WidgetId, WidgetRef};

/// Tabbed container.
pub struct TabWidget {
    base: WidgetBase,
    /// Native tab strip; `None` only until the post-create hook ran.
    tab_strip: Option<NativeWindow>,
    pages: Vec<WidgetId>,
    selected_index: Option<usize>,
    selected_index_changed: EventPublisher,
    persistent: bool,
}

impl TabWidget {
    pub fn new(cx: &mut Context<'_>, parent: Option<WidgetId>) -> Result<WidgetRef<Self>> {
        Self::new_with(cx, parent, |_, _| Ok(()))
    }

    /// Create the container and its tab strip, then run `post_create`. Any
    /// failure disposes the half-built widget.
    pub fn new_with(
        cx: &mut Context<'_>,
        parent: Option<WidgetId>,
        post_create: impl FnOnce(&mut Self, &mut Context<'_>) -> Result<()>,
    ) -> Result<WidgetRef<Self>> {
        let persistent = cx.config().tab_widgets_persistent;
        let params = CreateParams::new(class::TAB_WIDGET)
            .with_style(Style::CHILD | Style::VISIBLE)
            .with_ex_style(ExStyle::CONTROLPARENT);
        cx.initialize(
            parent,
            params,
            |base| TabWidget {
                base,
                tab_strip: None,
                pages: Vec::new(),
                selected_index: None,
                selected_index_changed: EventPublisher::new(),
                persistent,
            },
            |tw, cx| {
                let strip = CreateParams::new(class::TAB_CONTROL)
                    .with_parent(Some(tw.base.handle()?))
                    .with_style(Style::CHILD | Style::CLIPSIBLINGS | Style::TABSTOP | Style::VISIBLE);
                tw.tab_strip = Some(NativeWindow::create(cx.platform(), &strip)?);
                post_create(tw, cx)
            },
        )
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Page ids in tab order.
    pub fn pages(&self) -> &[WidgetId] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<WidgetRef<TabPage>> {
        self.pages.get(index).copied().map(WidgetRef::new)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected_page(&self) -> Option<WidgetRef<TabPage>> {
        self.selected_index.and_then(|index| self.page(index))
    }

    /// Published after the selected page changed.
    pub fn selected_index_changed(&self) -> &Event {
        self.selected_index_changed.event()
    }

    /// Whether [`save_state`](Widget::save_state) and
    /// [`restore_state`](Widget::restore_state) persist the selection.
    pub fn persistent(&self) -> bool {
        self.persistent
    }

    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    /// Handle of the native tab strip.
    pub fn tab_strip(&self) -> Result<Handle> {
        self.tab_strip
            .as_ref()
            .ok_or_else(|| Error::native("tab strip", "tab strip not created"))?
            .handle()
    }

    // ── Pages ────────────────────────────────────────────────────────

    /// Insert `page` at `index` (`index == page_count()` appends).
    ///
    /// The native tab is inserted first; if that fails nothing changes. The
    /// page is hidden and re-parented into this widget. The first page of an
    /// empty widget becomes the selected, visible page without publishing.
    pub fn insert_page(&mut self, cx: &mut Context<'_>, index: usize, page: WidgetRef<TabPage>) -> Result<()> {
        let count = self.pages.len();
        if index > count {
            return Err(Error::InvalidIndex { index, count });
        }
        let page_id = page.id();
        if cx.tree().parent(page_id).is_some() {
            return Err(Error::native("insert page", "page already has a parent"));
        }
        let title = cx.widget::<TabPage>(page_id)?.title().to_owned();
        let strip = self.tab_strip()?;

        cx.platform()
            .tab_insert_item(strip, index, &title)
            .map_err(|err| Error::NativeInsert {
                index,
                reason: err.to_string(),
            })?;
        if let Err(err) = self.adopt_page(cx, page_id, index) {
            if let Err(undo) = cx.platform().tab_delete_item(strip, index) {
                warn!(target: targets::TAB_WIDGET, index, %undo, "removing native tab after failed insert failed");
            }
            return Err(err);
        }
        self.pages.insert(index, page_id);

        match self.selected_index {
            None => {
                // Inserting into an empty strip selects its first tab.
                self.selected_index = Some(0);
                if let Err(err) = cx.set_visible(self.pages[0], true) {
                    warn!(target: targets::TAB_WIDGET, %err, "showing first page failed");
                }
            }
            // The native strip shifts its selection the same way.
            Some(selected) if selected >= index => self.selected_index = Some(selected + 1),
            Some(_) => {}
        }
        debug!(target: targets::TAB_WIDGET, index, %title, selected = ?self.selected_index, "page inserted");

        self.resize_pages(cx);
        Ok(())
    }

    /// Append `page`; returns its index.
    pub fn add_page(&mut self, cx: &mut Context<'_>, page: WidgetRef<TabPage>) -> Result<usize> {
        let index = self.pages.len();
        self.insert_page(cx, index, page)?;
        Ok(index)
    }

    /// Hide `page`, restyle it as a child and attach it. On failure the
    /// page's style and visibility are put back.
    fn adopt_page(&self, cx: &mut Context<'_>, page: WidgetId, index: usize) -> Result<()> {
        let handle = cx.handle_of(page)?;
        let visible = cx.platform().is_visible(handle)?;
        let style = cx.platform().style(handle)?;

        let adopted = cx
            .platform()
            .set_visible(handle, false)
            .and_then(|()| cx.platform().set_style(handle, (style | Style::CHILD) & !Style::POPUP))
            .and_then(|()| cx.attach(page, self.base.id(), Some(index)));
        if adopted.is_err() {
            let restored = cx
                .platform()
                .set_style(handle, style)
                .and_then(|()| cx.platform().set_visible(handle, visible));
            if let Err(undo) = restored {
                warn!(target: targets::TAB_WIDGET, ?page, %undo, "restoring page after failed adopt failed");
            }
        }
        adopted
    }

    /// Remove the page at `index` and hand it back, hidden and top-level.
    ///
    /// When the removed page was selected the first remaining page becomes
    /// selected and that change is published. Otherwise the selection stays
    /// on the same page without publishing.
    pub fn remove_page(&mut self, cx: &mut Context<'_>, index: usize) -> Result<WidgetRef<TabPage>> {
        let count = self.pages.len();
        if index >= count {
            return Err(Error::InvalidIndex { index, count });
        }
        let strip = self.tab_strip()?;
        cx.platform().tab_delete_item(strip, index)?;

        let page = self.drop_page(cx, strip, index);
        self.release_page(cx, page);
        Ok(WidgetRef::new(page))
    }

    /// Forget the page at `index` once its native tab is gone and fix up the
    /// selection.
    fn drop_page(&mut self, cx: &mut Context<'_>, strip: Handle, index: usize) -> WidgetId {
        let page = self.pages.remove(index);
        match self.selected_index {
            Some(selected) if selected == index => {
                self.selected_index = None;
                if self.pages.is_empty() {
                    self.publish_selection(cx, true);
                } else {
                    self.select_first_remaining(cx, strip);
                }
            }
            Some(selected) if selected > index => self.selected_index = Some(selected - 1),
            _ => {}
        }
        debug!(target: targets::TAB_WIDGET, index, selected = ?self.selected_index, "page removed");
        page
    }

    /// The selected page was removed: the first page takes over, even if the
    /// native strip refuses to follow.
    fn select_first_remaining(&mut self, cx: &mut Context<'_>, strip: Handle) {
        if let Err(err) = cx.platform().tab_set_cur_sel(strip, 0) {
            warn!(target: targets::TAB_WIDGET, %err, "selecting first tab failed");
        }
        self.selected_index = Some(0);
        let page = self.pages[0];
        let shown = cx.set_visible(page, true).and_then(|()| cx.invalidate(page));
        if let Err(err) = shown {
            warn!(target: targets::TAB_WIDGET, ?page, %err, "showing page failed");
        }
        self.publish_selection(cx, true);
    }

    /// Remove every page and hand them back, hidden and top-level.
    pub fn clear_pages(&mut self, cx: &mut Context<'_>) -> Result<Vec<WidgetRef<TabPage>>> {
        let strip = self.tab_strip()?;
        cx.platform().tab_delete_all_items(strip)?;

        let pages = std::mem::take(&mut self.pages);
        let had_selection = self.selected_index.take().is_some();
        for &page in &pages {
            self.release_page(cx, page);
        }
        self.publish_selection(cx, had_selection);
        debug!(target: targets::TAB_WIDGET, pages = pages.len(), "pages cleared");
        Ok(pages.into_iter().map(WidgetRef::new).collect())
    }

    fn release_page(&self, cx: &mut Context<'_>, page: WidgetId) {
        if let Err(err) = Self::unparent_page(cx, page) {
            warn!(target: targets::TAB_WIDGET, ?page, %err, "releasing page failed");
        }
    }

    fn unparent_page(cx: &mut Context<'_>, page: WidgetId) -> Result<()> {
        let handle = cx.handle_of(page)?;
        cx.detach(page)?;
        cx.platform().set_visible(handle, false)?;
        let style = cx.platform().style(handle)?;
        cx.platform().set_style(handle, (style | Style::POPUP) & !Style::CHILD)
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select the page at `index`.
    ///
    /// Selecting the current page is a no-op. The native select command does
    /// not notify, so the selection-changed handling runs right here.
    pub fn set_selected_index(&mut self, cx: &mut Context<'_>, index: usize) -> Result<()> {
        if self.selected_index == Some(index) {
            return Ok(());
        }
        let count = self.pages.len();
        if index >= count {
            return Err(Error::InvalidIndex { index, count });
        }
        let strip = self.tab_strip()?;
        cx.platform().tab_set_cur_sel(strip, index)?;
        self.on_selection_changed(cx);
        Ok(())
    }

    /// Bring page visibility in line with the native selection and publish.
    fn on_selection_changed(&mut self, cx: &mut Context<'_>) {
        let previous = self.selected_page().map(WidgetRef::id);
        if let Some(page) = previous {
            if let Err(err) = cx.set_visible(page, false) {
                warn!(target: targets::TAB_WIDGET, ?page, %err, "hiding page failed");
            }
        }

        let selection = match self.tab_strip().and_then(|strip| cx.platform().tab_cur_sel(strip)) {
            Ok(selection) => selection.filter(|&index| index < self.pages.len()),
            Err(err) => {
                warn!(target: targets::TAB_WIDGET, %err, "reading tab selection failed");
                None
            }
        };
        self.selected_index = selection;

        let current = self.selected_page().map(WidgetRef::id);
        if let Some(page) = current {
            let shown = cx.set_visible(page, true).and_then(|()| cx.invalidate(page));
            if let Err(err) = shown {
                warn!(target: targets::TAB_WIDGET, ?page, %err, "showing page failed");
            }
        }
        self.publish_selection(cx, current != previous);
    }

    fn publish_selection(&self, cx: &Context<'_>, changed: bool) {
        if changed || cx.config().selection_notify == SelectionNotify::Always {
            debug!(target: targets::TAB_WIDGET, selected = ?self.selected_index, changed, "selected index changed");
            self.selected_index_changed.publish();
        }
    }

    // ── Layout ───────────────────────────────────────────────────────

    /// Give every page the strip's display area, widened by the page inset.
    fn resize_pages(&self, cx: &mut Context<'_>) {
        let Ok(strip) = self.tab_strip() else {
            return;
        };
        let area = cx
            .platform()
            .bounds(strip)
            .and_then(|bounds| cx.platform().tab_adjust_rect(strip, bounds));
        let area = match area {
            Ok(area) => area,
            Err(err) => {
                warn!(target: targets::TAB_WIDGET, %err, "computing page area failed");
                return;
            }
        };
        let inset = cx.config().page_inset;
        let bounds = Rectangle::new(area.x - inset, area.y, area.width + inset, area.height);
        for &page in &self.pages {
            if let Err(err) = cx.set_bounds(page, bounds) {
                warn!(target: targets::TAB_WIDGET, ?page, %err, "resizing page failed");
                return;
            }
        }
    }
}

impl Widget for TabWidget {
    fn widget_type(&self) -> &'static str {
        "TabWidget"
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

    fn handle_message(&mut self, cx: &mut Context<'_>, message: &Message) -> Option<LResult> {
        match message {
            Message::Notify {
                source,
                code: NotifyCode::SelChange,
            } if self.tab_strip().ok() == Some(*source) => {
                self.on_selection_changed(cx);
                Some(0)
            }
            _ => None,
        }
    }

    fn on_resize(&mut self, cx: &mut Context<'_>, size: Size) {
        let Ok(strip) = self.tab_strip() else {
            return;
        };
        if let Err(err) = cx.platform().set_bounds(strip, size.to_rectangle()) {
            warn!(target: targets::TAB_WIDGET, %err, "moving tab strip failed");
            return;
        }
        self.resize_pages(cx);
    }

    /// Store the selected index (`-1` for none) when persistent, then let
    /// every page save its own state.
    fn save_state(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if self.persistent {
            if let Some(key) = self.base.persistence_key() {
                let value = self.selected_index.map_or_else(|| "-1".to_owned(), |index| index.to_string());
                cx.store().put_state(key, &value)?;
            }
        }
        for &page in &self.pages {
            cx.save_state(page)?;
        }
        Ok(())
    }

    /// Re-select the stored index when persistent, then let every page
    /// restore its own state. Missing or out-of-range values are ignored;
    /// a value that is not an integer is an error.
    fn restore_state(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if self.persistent {
            if let Some(key) = self.base.persistence_key().map(str::to_owned) {
                if let Some(value) = cx.store().get_state(&key)?.filter(|value| !value.is_empty()) {
                    let index: i64 = value.trim().parse().map_err(|source| Error::PersistedStateParse {
                        key: key.clone(),
                        value: value.clone(),
                        source,
                    })?;
                    match usize::try_from(index) {
                        Ok(index) if index < self.pages.len() => self.set_selected_index(cx, index)?,
                        _ => debug!(target: targets::STATE, %key, index, "ignoring out-of-range tab index"),
                    }
                }
            }
        }
        for &page in &self.pages {
            cx.restore_state(page)?;
        }
        Ok(())
    }

    fn detach_child(&mut self, cx: &mut Context<'_>, child: WidgetId) -> Result<()> {
        let Some(index) = self.pages.iter().position(|&page| page == child) else {
            return Ok(());
        };
        if cx.tree().contains(child) {
            return self.remove_page(cx, index).map(|_| ());
        }
        // Already disposed while this widget was busy: the page is gone, so
        // the list follows it whatever the strip says.
        let strip = self.tab_strip()?;
        if let Err(err) = cx.platform().tab_delete_item(strip, index) {
            warn!(target: targets::TAB_WIDGET, index, %err, "deleting tab of disposed page failed");
        }
        self.drop_page(cx, strip, index);
        Ok(())
    }

    fn on_dispose(&mut self, cx: &mut Context<'_>) {
        self.selected_index_changed.clear();
        if let Some(mut strip) = self.tab_strip.take() {
            strip.release(cx.platform());
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{NativeOp, Platform};
    use crate::state::StateStore;
    use crate::ui::UiConfig;
    use crate::Ui;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn tabs_with(ui: &mut Ui, titles: &[&str]) -> (WidgetRef<TabWidget>, Vec<WidgetRef<TabPage>>) {
        let tabs = TabWidget::new(&mut ui.context(), None).unwrap();
        let mut pages = Vec::new();
        for title in titles {
            let page = TabPage::new(&mut ui.context(), *title).unwrap();
            ui.update(tabs, |tw, cx| tw.add_page(cx, page)).unwrap();
            pages.push(page);
        }
        ui.update(tabs, |tw, _| {
            tw.base_mut().set_name("tabs");
            Ok(())
        })
        .unwrap();
        (tabs, pages)
    }

    fn count_changes(ui: &Ui, tabs: WidgetRef<TabWidget>) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        ui.widget(tabs)
            .unwrap()
            .selected_index_changed()
            .subscribe(move || h.set(h.get() + 1));
        hits
    }

    fn visible_pages(ui: &mut Ui, pages: &[WidgetRef<TabPage>]) -> Vec<usize> {
        (0..pages.len())
            .filter(|&i| ui.is_visible(pages[i]).unwrap())
            .collect()
    }

    fn strip_of(ui: &Ui, tabs: WidgetRef<TabWidget>) -> Handle {
        ui.widget(tabs).unwrap().tab_strip().unwrap()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn creation_builds_tab_strip_inside_widget() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &[]);
        let handle = ui.handle_of(tabs).unwrap();
        let strip = strip_of(&ui, tabs);
        assert_eq!(ui.platform().children_of(handle), vec![strip]);
        assert_eq!(ui.platform().class_of(strip), Some(class::TAB_CONTROL));
        assert!(ui.platform().ex_style_of(handle).unwrap().contains(ExStyle::CONTROLPARENT));
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), None);
    }

    #[test]
    fn failing_post_create_leaves_nothing_behind() {
        let mut ui = Ui::new_headless();
        let err = TabWidget::new_with(&mut ui.context(), None, |_, _| Err(Error::native("hook", "refused")))
            .err();
        assert_eq!(err, Some(Error::native("hook", "refused")));
        assert_eq!(ui.platform().window_count(), 0);
        assert!(ui.tree().is_empty());
        assert!(ui.registry().is_empty());
    }

    // ── Pages ────────────────────────────────────────────────────────

    #[test]
    fn first_page_is_selected_and_shown_without_publishing() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &[]);
        let hits = count_changes(&ui, tabs);
        let page = TabPage::new(&mut ui.context(), "General").unwrap();
        ui.update(tabs, |tw, cx| tw.add_page(cx, page)).unwrap();

        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(0));
        assert!(ui.is_visible(page).unwrap());
        assert_eq!(hits.get(), 0);
        assert_eq!(ui.tree().parent(page.id()), Some(tabs.id()));

        let handle = ui.handle_of(page).unwrap();
        let style = ui.platform().style(handle).unwrap();
        assert!(style.contains(Style::CHILD));
        assert!(!style.contains(Style::POPUP));
    }

    #[test]
    fn only_the_selected_page_is_visible() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        assert_eq!(visible_pages(&mut ui, &pages), vec![0]);

        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 2)).unwrap();
        assert_eq!(visible_pages(&mut ui, &pages), vec![2]);
        let handle = ui.handle_of(pages[2]).unwrap();
        assert_eq!(ui.platform().paint_requests(handle), 1);
    }

    #[test]
    fn insert_before_selection_keeps_selected_page() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B"]);
        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 1)).unwrap();
        let hits = count_changes(&ui, tabs);

        let front = TabPage::new(&mut ui.context(), "Front").unwrap();
        ui.update(tabs, |tw, cx| tw.insert_page(cx, 0, front)).unwrap();

        let tw = ui.widget(tabs).unwrap();
        assert_eq!(tw.selected_index(), Some(2));
        assert_eq!(tw.selected_page(), Some(pages[1]));
        assert_eq!(tw.pages(), &[front.id(), pages[0].id(), pages[1].id()]);
        let strip = strip_of(&ui, tabs);
        assert_eq!(ui.platform().tab_items(strip).unwrap(), vec!["Front", "A", "B"]);
        assert_eq!(ui.platform().tab_cur_sel(strip).unwrap(), Some(2));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn failed_native_insert_changes_nothing() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A"]);
        let page = TabPage::new(&mut ui.context(), "B").unwrap();
        ui.platform_mut().fail_next(NativeOp::TabInsert);

        let err = ui.update(tabs, |tw, cx| tw.add_page(cx, page)).unwrap_err();
        assert!(matches!(err, Error::NativeInsert { index: 1, .. }));
        assert_eq!(ui.widget(tabs).unwrap().page_count(), 1);
        assert_eq!(ui.tree().parent(page.id()), None);
        assert!(!ui.is_visible(page).unwrap());
    }

    #[test]
    fn failed_adopt_restores_page_style_and_visibility() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A"]);
        let page = TabPage::new(&mut ui.context(), "B").unwrap();
        let handle = ui.handle_of(page).unwrap();
        ui.platform_mut().set_visible(handle, true).unwrap();
        let style_before = ui.platform().style(handle).unwrap();
        ui.platform_mut().fail_next(NativeOp::SetParent);

        assert!(ui.update(tabs, |tw, cx| tw.add_page(cx, page)).is_err());
        assert_eq!(ui.platform().style(handle).unwrap(), style_before);
        assert!(ui.platform().style(handle).unwrap().contains(Style::POPUP));
        assert!(!ui.platform().style(handle).unwrap().contains(Style::CHILD));
        assert!(ui.is_visible(page).unwrap());
        assert_eq!(ui.tree().parent(page.id()), None);
        assert_eq!(ui.platform().tab_items(strip_of(&ui, tabs)).unwrap(), vec!["A"]);
        assert_eq!(ui.widget(tabs).unwrap().page_count(), 1);
    }

    #[test]
    fn insert_index_out_of_range() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A"]);
        let page = TabPage::new(&mut ui.context(), "B").unwrap();
        let err = ui.update(tabs, |tw, cx| tw.insert_page(cx, 3, page)).unwrap_err();
        assert_eq!(err, Error::InvalidIndex { index: 3, count: 1 });
    }

    #[test]
    fn removing_selected_page_selects_first_and_publishes() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 2)).unwrap();
        let hits = count_changes(&ui, tabs);

        let removed = ui.update(tabs, |tw, cx| tw.remove_page(cx, 2)).unwrap();
        assert_eq!(removed, pages[2]);
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(0));
        assert_eq!(hits.get(), 1);
        assert_eq!(visible_pages(&mut ui, &pages), vec![0]);

        // The removed page is handed back hidden and top-level.
        let handle = ui.handle_of(removed).unwrap();
        assert_eq!(ui.tree().parent(removed.id()), None);
        assert_eq!(ui.platform().parent(handle).unwrap(), None);
        assert!(ui.platform().style(handle).unwrap().contains(Style::POPUP));
    }

    #[test]
    fn removing_selected_page_survives_refused_native_select() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        let hits = count_changes(&ui, tabs);
        ui.platform_mut().fail_next(NativeOp::TabSetCurSel);

        ui.update(tabs, |tw, cx| tw.remove_page(cx, 0)).unwrap();
        let tw = ui.widget(tabs).unwrap();
        assert_eq!(tw.selected_index(), Some(0));
        assert_eq!(tw.selected_page(), Some(pages[1]));
        assert_eq!(hits.get(), 1);
        assert_eq!(visible_pages(&mut ui, &pages[1..]), vec![0]);
    }

    #[test]
    fn failed_native_delete_changes_nothing() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B"]);
        let hits = count_changes(&ui, tabs);
        ui.platform_mut().fail_next(NativeOp::TabDelete);

        assert!(ui.update(tabs, |tw, cx| tw.remove_page(cx, 0)).is_err());
        let tw = ui.widget(tabs).unwrap();
        assert_eq!(tw.pages(), &[pages[0].id(), pages[1].id()]);
        assert_eq!(tw.selected_index(), Some(0));
        assert_eq!(hits.get(), 0);
        assert_eq!(visible_pages(&mut ui, &pages), vec![0]);
        assert_eq!(ui.tree().parent(pages[0].id()), Some(tabs.id()));
    }

    #[test]
    fn removing_earlier_page_rebases_without_publishing() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 2)).unwrap();
        let hits = count_changes(&ui, tabs);

        ui.update(tabs, |tw, cx| tw.remove_page(cx, 0)).unwrap();
        let tw = ui.widget(tabs).unwrap();
        assert_eq!(tw.selected_index(), Some(1));
        assert_eq!(tw.selected_page(), Some(pages[2]));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn removing_last_page_empties_and_publishes() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A"]);
        let hits = count_changes(&ui, tabs);
        ui.update(tabs, |tw, cx| tw.remove_page(cx, 0)).unwrap();
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), None);
        assert_eq!(hits.get(), 1);

        let err = ui.update(tabs, |tw, cx| tw.remove_page(cx, 0)).unwrap_err();
        assert_eq!(err, Error::InvalidIndex { index: 0, count: 0 });
    }

    #[test]
    fn clear_pages_returns_every_page() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B"]);
        let hits = count_changes(&ui, tabs);

        let removed = ui.update(tabs, |tw, cx| tw.clear_pages(cx)).unwrap();
        assert_eq!(removed, pages);
        assert_eq!(ui.widget(tabs).unwrap().page_count(), 0);
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), None);
        assert_eq!(hits.get(), 1);
        assert!(visible_pages(&mut ui, &pages).is_empty());
        assert!(ui.platform().tab_items(strip_of(&ui, tabs)).unwrap().is_empty());
    }

    #[test]
    fn disposing_a_page_removes_it_from_the_widget() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        ui.dispose(pages[1]);

        let tw = ui.widget(tabs).unwrap();
        assert_eq!(tw.pages(), &[pages[0].id(), pages[2].id()]);
        assert_eq!(tw.selected_index(), Some(0));
        let strip = strip_of(&ui, tabs);
        assert_eq!(ui.platform().tab_items(strip).unwrap(), vec!["A", "C"]);
        assert!(ui.handle_of(pages[1]).is_none());
    }

    #[test]
    fn failed_clear_keeps_every_page() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B"]);
        ui.platform_mut().fail_next(NativeOp::TabDeleteAll);

        assert!(ui.update(tabs, |tw, cx| tw.clear_pages(cx)).is_err());
        assert_eq!(ui.widget(tabs).unwrap().page_count(), 2);
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(0));
        assert_eq!(visible_pages(&mut ui, &pages), vec![0]);
    }

    #[test]
    fn page_dispose_is_aborted_when_its_tab_cannot_be_deleted() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        ui.platform_mut().fail_next(NativeOp::TabDelete);

        ui.dispose(pages[1]);
        assert!(ui.tree().contains(pages[1].id()));
        let tw = ui.widget(tabs).unwrap();
        assert_eq!(tw.page_count(), 3);
        assert_eq!(tw.selected_index(), Some(0));
        assert_eq!(ui.platform().tab_items(strip_of(&ui, tabs)).unwrap(), vec!["A", "B", "C"]);
        assert_eq!(visible_pages(&mut ui, &pages), vec![0]);

        // Once the strip cooperates the page goes away normally.
        ui.dispose(pages[1]);
        assert_eq!(ui.widget(tabs).unwrap().pages(), &[pages[0].id(), pages[2].id()]);
    }

    #[test]
    fn page_disposed_from_inside_the_widget_is_dropped_afterwards() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        let hits = count_changes(&ui, tabs);

        ui.update(tabs, |_, cx| {
            cx.dispose(pages[0].id());
            Ok(())
        })
        .unwrap();
        assert!(!ui.tree().contains(pages[0].id()));
        let tw = ui.widget(tabs).unwrap();
        assert_eq!(tw.pages(), &[pages[1].id(), pages[2].id()]);
        assert_eq!(tw.selected_page(), Some(pages[1]));
        assert_eq!(hits.get(), 1);
        assert_eq!(ui.platform().tab_items(strip_of(&ui, tabs)).unwrap(), vec!["B", "C"]);
        assert_eq!(visible_pages(&mut ui, &pages[1..]), vec![0]);
    }

    #[test]
    fn disposing_widget_releases_every_window() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A", "B"]);
        ui.dispose(tabs);
        assert_eq!(ui.platform().window_count(), 0);
        assert!(ui.tree().is_empty());
        assert!(ui.registry().is_empty());
    }

    // ── Selection ────────────────────────────────────────────────────

    #[test]
    fn selecting_current_page_is_a_no_op() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A", "B"]);
        let hits = count_changes(&ui, tabs);
        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 0)).unwrap();
        assert_eq!(hits.get(), 0);
        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 1)).unwrap();
        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 1)).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B"]);
        let err = ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 4)).unwrap_err();
        assert_eq!(err, Error::InvalidIndex { index: 4, count: 2 });
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(0));
        assert_eq!(visible_pages(&mut ui, &pages), vec![0]);
    }

    #[test]
    fn user_click_switches_pages() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        let hits = count_changes(&ui, tabs);
        let strip = strip_of(&ui, tabs);

        ui.platform_mut().user_select_tab(strip, 1).unwrap();
        assert_eq!(ui.pump(), 1);

        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(1));
        assert_eq!(visible_pages(&mut ui, &pages), vec![1]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn always_policy_publishes_on_repeat_click() {
        let mut ui =
            Ui::new_headless().with_config(UiConfig::new().with_selection_notify(SelectionNotify::Always));
        let (tabs, _) = tabs_with(&mut ui, &["A", "B"]);
        let hits = count_changes(&ui, tabs);
        let strip = strip_of(&ui, tabs);

        ui.platform_mut().user_select_tab(strip, 0).unwrap();
        ui.pump();
        assert_eq!(hits.get(), 1);
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(0));
    }

    // ── Layout ───────────────────────────────────────────────────────

    #[test]
    fn resize_fills_display_area_with_inset() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B"]);
        ui.set_bounds(tabs, Rectangle::new(0, 0, 400, 300)).unwrap();

        let strip = strip_of(&ui, tabs);
        assert_eq!(ui.platform().bounds(strip).unwrap(), Rectangle::new(0, 0, 400, 300));
        for page in pages {
            assert_eq!(ui.bounds(page).unwrap(), Rectangle::new(2, 24, 394, 272));
        }
    }

    #[test]
    fn pages_inserted_later_get_the_display_area() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A"]);
        ui.set_bounds(tabs, Rectangle::new(0, 0, 400, 300)).unwrap();
        let late = TabPage::new(&mut ui.context(), "Late").unwrap();
        ui.update(tabs, |tw, cx| tw.add_page(cx, late)).unwrap();
        assert_eq!(ui.bounds(late).unwrap(), Rectangle::new(2, 24, 394, 272));
    }

    #[test]
    fn failed_display_rect_leaves_pages_in_place() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A"]);
        ui.platform_mut().fail_next(NativeOp::TabAdjustRect);
        ui.set_bounds(tabs, Rectangle::new(0, 0, 400, 300)).unwrap();
        ui.platform_mut().clear_failure(NativeOp::TabAdjustRect);
        assert_eq!(ui.bounds(pages[0]).unwrap().size(), Size::new(2, 0));
    }

    #[test]
    fn layout_contract() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &[]);
        assert_eq!(ui.layout_flags(tabs).unwrap(), LayoutFlags::ALL);
        assert_eq!(ui.preferred_size(tabs).unwrap(), Size::new(200, 200));
    }

    // ── Persistence ──────────────────────────────────────────────────

    #[test]
    fn selection_round_trips_through_store() {
        let mut ui = Ui::new_headless();
        let (tabs, pages) = tabs_with(&mut ui, &["A", "B", "C"]);
        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 2)).unwrap();
        ui.save_state(tabs).unwrap();
        assert_eq!(ui.store().get_state("tabs").unwrap(), Some("2".to_owned()));

        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 0)).unwrap();
        ui.restore_state(tabs).unwrap();
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(2));
        assert_eq!(visible_pages(&mut ui, &pages), vec![2]);
    }

    #[test]
    fn empty_widget_saves_minus_one_and_ignores_it() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &[]);
        ui.save_state(tabs).unwrap();
        assert_eq!(ui.store().get_state("tabs").unwrap(), Some("-1".to_owned()));
        ui.restore_state(tabs).unwrap();
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), None);
    }

    #[test]
    fn out_of_range_and_empty_values_are_ignored() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A", "B"]);
        ui.update(tabs, |tw, cx| tw.set_selected_index(cx, 1)).unwrap();

        ui.store_mut().put_state("tabs", "7").unwrap();
        ui.restore_state(tabs).unwrap();
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(1));

        ui.store_mut().put_state("tabs", "").unwrap();
        ui.restore_state(tabs).unwrap();
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(1));
    }

    #[test]
    fn unparsable_value_is_an_error() {
        let mut ui = Ui::new_headless();
        let (tabs, _) = tabs_with(&mut ui, &["A", "B"]);
        ui.store_mut().put_state("tabs", "abc").unwrap();
        let err = ui.restore_state(tabs).unwrap_err();
        assert!(matches!(
            err,
            Error::PersistedStateParse { ref key, ref value, .. } if key == "tabs" && value == "abc"
        ));
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(0));
    }

    #[test]
    fn non_persistent_widget_skips_the_store() {
        let mut ui = Ui::new_headless().with_config(UiConfig::new().with_tab_widgets_persistent(false));
        let (tabs, _) = tabs_with(&mut ui, &["A", "B"]);
        assert!(!ui.widget(tabs).unwrap().persistent());
        ui.save_state(tabs).unwrap();
        assert_eq!(ui.store().get_state("tabs").unwrap(), None);

        ui.store_mut().put_state("tabs", "1").unwrap();
        ui.restore_state(tabs).unwrap();
        assert_eq!(ui.widget(tabs).unwrap().selected_index(), Some(0));
    }
}
