//! In-memory [`Platform`] with Win32-like control semantics.
//!
//! [`HeadlessPlatform`] keeps a table of windows and emulates the parts of the
//! native controls the toolkit relies on: selection shifting when items are
//! inserted or deleted, a cleared selection after an out-of-range select, tab
//! selection that emits no notification, and a display-rect translation for
//! the tab strip. Failures can be injected one call at a time with
//! [`fail_next`](HeadlessPlatform::fail_next).

use std::collections::{BTreeMap, HashSet, VecDeque};

use super::message::{CommandCode, LResult, Message, NotifyCode};
use super::{class, CreateParams, ExStyle, Handle, Platform, Style};
use crate::error::{Error, Result};
use crate::geometry::{Rectangle, Size};

/// Height of the tab header row reserved by [`Platform::tab_adjust_rect`].
pub const TAB_HEADER_HEIGHT: i32 = 24;
/// Border width around the tab display area.
pub const TAB_BORDER: i32 = 4;

/// Dialog base units reported unless overridden.
pub const DEFAULT_BASE_UNITS: Size = Size { width: 8, height: 16 };

// ---------------------------------------------------------------------------
// NativeOp
// ---------------------------------------------------------------------------

/// Native calls that can be made to fail with
/// [`HeadlessPlatform::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeOp {
    CreateWindow,
    DestroyWindow,
    SetParent,
    SetStyle,
    SetVisible,
    SetBounds,
    Bounds,
    Invalidate,
    ComboInsert,
    ComboDelete,
    ComboReset,
    ComboSetCurSel,
    TabInsert,
    TabDelete,
    TabDeleteAll,
    TabSetCurSel,
    TabCurSel,
    TabAdjustRect,
    Navigate,
}

impl NativeOp {
    /// The native API name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            NativeOp::CreateWindow => "CreateWindowEx",
            NativeOp::DestroyWindow => "DestroyWindow",
            NativeOp::SetParent => "SetParent",
            NativeOp::SetStyle => "SetWindowLong",
            NativeOp::SetVisible => "ShowWindow",
            NativeOp::SetBounds => "MoveWindow",
            NativeOp::Bounds => "GetWindowRect",
            NativeOp::Invalidate => "InvalidateRect",
            NativeOp::ComboInsert => "CB_INSERTSTRING",
            NativeOp::ComboDelete => "CB_DELETESTRING",
            NativeOp::ComboReset => "CB_RESETCONTENT",
            NativeOp::ComboSetCurSel => "CB_SETCURSEL",
            NativeOp::TabInsert => "TCM_INSERTITEM",
            NativeOp::TabDelete => "TCM_DELETEITEM",
            NativeOp::TabDeleteAll => "TCM_DELETEALLITEMS",
            NativeOp::TabSetCurSel => "TCM_SETCURSEL",
            NativeOp::TabCurSel => "TCM_GETCURSEL",
            NativeOp::TabAdjustRect => "TCM_ADJUSTRECT",
            NativeOp::Navigate => "Navigate",
        }
    }
}

// ---------------------------------------------------------------------------
// Window table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Control {
    Plain,
    ComboBox {
        items: Vec<String>,
        cur_sel: Option<usize>,
        edit_sel: (usize, usize),
    },
    Tab {
        items: Vec<String>,
        cur_sel: Option<usize>,
    },
    WebView {
        url: String,
    },
}

impl Control {
    fn for_class(class: &str) -> Self {
        match class {
            class::COMBO_BOX => Control::ComboBox {
                items: Vec::new(),
                cur_sel: None,
                edit_sel: (0, 0),
            },
            class::TAB_CONTROL => Control::Tab {
                items: Vec::new(),
                cur_sel: None,
            },
            class::WEB_VIEW => Control::WebView { url: String::new() },
            _ => Control::Plain,
        }
    }
}

#[derive(Debug, Clone)]
struct WindowState {
    class: &'static str,
    style: Style,
    ex_style: ExStyle,
    parent: Option<Handle>,
    bounds: Rectangle,
    paint_requests: u32,
    control: Control,
}

// ---------------------------------------------------------------------------
// HeadlessPlatform
// ---------------------------------------------------------------------------

/// A window manager that lives entirely in memory.
#[derive(Debug)]
pub struct HeadlessPlatform {
    windows: BTreeMap<Handle, WindowState>,
    next_handle: u64,
    registered: HashSet<&'static str>,
    queue: VecDeque<(Handle, Message)>,
    failures: HashSet<NativeOp>,
    base_units: Size,
    default_handled: usize,
}

impl HeadlessPlatform {
    /// An empty window table with only the system classes available.
    pub fn new() -> Self {
        Self {
            windows: BTreeMap::new(),
            next_handle: 0x10,
            registered: class::SYSTEM.iter().copied().collect(),
            queue: VecDeque::new(),
            failures: HashSet::new(),
            base_units: DEFAULT_BASE_UNITS,
            default_handled: 0,
        }
    }

    /// Override the dialog base units (builder).
    pub fn with_base_units(mut self, base_units: Size) -> Self {
        self.base_units = base_units;
        self
    }

    // ── Failure injection ────────────────────────────────────────────

    /// Make the next call of `op` fail.
    ///
    /// Mutating calls consume the failure. Queries (`Bounds`, `TabCurSel`,
    /// `TabAdjustRect`) keep failing until [`clear_failure`](Self::clear_failure).
    pub fn fail_next(&mut self, op: NativeOp) {
        self.failures.insert(op);
    }

    /// Drop a pending injected failure.
    pub fn clear_failure(&mut self, op: NativeOp) {
        self.failures.remove(&op);
    }

    /// Forget a registered toolkit class so creating it fails.
    pub fn unregister_class(&mut self, class: &str) {
        self.registered.remove(class);
    }

    fn check(&mut self, op: NativeOp) -> Result<()> {
        if self.failures.remove(&op) {
            Err(Error::native(op.name(), "injected failure"))
        } else {
            Ok(())
        }
    }

    // ── User simulation ──────────────────────────────────────────────

    /// Queue a message for `handle`.
    pub fn post_message(&mut self, handle: Handle, message: Message) {
        self.queue.push_back((handle, message));
    }

    /// The user picks an item from a combo box list.
    pub fn user_select_combo_item(&mut self, handle: Handle, index: usize) -> Result<()> {
        match &mut self.window_mut(handle, "CBN_SELENDOK")?.control {
            Control::ComboBox { items, cur_sel, .. } if index < items.len() => {
                *cur_sel = Some(index);
            }
            Control::ComboBox { items, .. } => {
                return Err(Error::InvalidIndex { index, count: items.len() });
            }
            _ => return Err(Error::native("CBN_SELENDOK", "not a combo box")),
        }
        self.post_message(handle, Message::Command { source: handle, code: CommandCode::SelEndOk });
        Ok(())
    }

    /// The user clicks a tab. The change notification goes to the tab
    /// strip's parent.
    pub fn user_select_tab(&mut self, handle: Handle, index: usize) -> Result<()> {
        let window = self.window_mut(handle, "TCN_SELCHANGE")?;
        match &mut window.control {
            Control::Tab { items, cur_sel } if index < items.len() => {
                *cur_sel = Some(index);
            }
            Control::Tab { items, .. } => {
                return Err(Error::InvalidIndex { index, count: items.len() });
            }
            _ => return Err(Error::native("TCN_SELCHANGE", "not a tab control")),
        }
        let parent = window
            .parent
            .ok_or_else(|| Error::native("TCN_SELCHANGE", "tab control has no parent"))?;
        self.post_message(parent, Message::Notify { source: handle, code: NotifyCode::SelChange });
        Ok(())
    }

    /// The user resizes a window; queues the resulting size message.
    pub fn user_resize(&mut self, handle: Handle, size: Size) -> Result<()> {
        let window = self.window_mut(handle, "WM_SIZE")?;
        window.bounds.width = size.width;
        window.bounds.height = size.height;
        self.post_message(handle, Message::Size(size));
        Ok(())
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Number of live windows.
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Live windows whose parent is `handle`, in creation order.
    pub fn children_of(&self, handle: Handle) -> Vec<Handle> {
        self.windows
            .iter()
            .filter(|(_, w)| w.parent == Some(handle))
            .map(|(&h, _)| h)
            .collect()
    }

    /// Class name of a live window.
    pub fn class_of(&self, handle: Handle) -> Option<&'static str> {
        self.windows.get(&handle).map(|w| w.class)
    }

    /// Extended style of a live window.
    pub fn ex_style_of(&self, handle: Handle) -> Option<ExStyle> {
        self.windows.get(&handle).map(|w| w.ex_style)
    }

    /// Strings held by a native combo box.
    pub fn combo_items(&self, handle: Handle) -> Result<Vec<String>> {
        match &self.window(handle, "combo_items")?.control {
            Control::ComboBox { items, .. } => Ok(items.clone()),
            _ => Err(Error::native("combo_items", "not a combo box")),
        }
    }

    /// Labels held by a native tab strip.
    pub fn tab_items(&self, handle: Handle) -> Result<Vec<String>> {
        match &self.window(handle, "tab_items")?.control {
            Control::Tab { items, .. } => Ok(items.clone()),
            _ => Err(Error::native("tab_items", "not a tab control")),
        }
    }

    /// How many times `handle` was invalidated.
    pub fn paint_requests(&self, handle: Handle) -> u32 {
        self.windows.get(&handle).map_or(0, |w| w.paint_requests)
    }

    /// Messages that fell through to [`Platform::default_proc`].
    pub fn default_handled(&self) -> usize {
        self.default_handled
    }

    /// Messages waiting in the queue.
    pub fn pending_messages(&self) -> usize {
        self.queue.len()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn window(&self, handle: Handle, op: &'static str) -> Result<&WindowState> {
        self.windows
            .get(&handle)
            .ok_or_else(|| Error::native(op, format!("invalid window handle {handle}")))
    }

    fn window_mut(&mut self, handle: Handle, op: &'static str) -> Result<&mut WindowState> {
        self.windows
            .get_mut(&handle)
            .ok_or_else(|| Error::native(op, format!("invalid window handle {handle}")))
    }

    fn combo(&mut self, handle: Handle, op: NativeOp) -> Result<(&mut Vec<String>, &mut Option<usize>)> {
        self.check(op)?;
        match &mut self.window_mut(handle, op.name())?.control {
            Control::ComboBox { items, cur_sel, .. } => Ok((items, cur_sel)),
            _ => Err(Error::native(op.name(), "not a combo box")),
        }
    }

    fn tab(&mut self, handle: Handle, op: NativeOp) -> Result<(&mut Vec<String>, &mut Option<usize>)> {
        self.check(op)?;
        match &mut self.window_mut(handle, op.name())?.control {
            Control::Tab { items, cur_sel } => Ok((items, cur_sel)),
            _ => Err(Error::native(op.name(), "not a tab control")),
        }
    }

    fn descendants(&self, root: Handle) -> Vec<Handle> {
        let mut found = vec![root];
        let mut cursor = 0;
        while cursor < found.len() {
            let current = found[cursor];
            found.extend(self.children_of(current));
            cursor += 1;
        }
        found
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Shift a selection after inserting at `index`.
fn shift_on_insert(cur_sel: &mut Option<usize>, index: usize) {
    if let Some(sel) = cur_sel {
        if *sel >= index {
            *sel += 1;
        }
    }
}

/// Shift a selection after deleting `index`; deleting the selection clears it.
fn shift_on_delete(cur_sel: &mut Option<usize>, index: usize) {
    *cur_sel = match *cur_sel {
        Some(sel) if sel == index => None,
        Some(sel) if sel > index => Some(sel - 1),
        other => other,
    };
}

impl Platform for HeadlessPlatform {
    fn register_class(&mut self, class: &'static str) -> Result<()> {
        self.registered.insert(class);
        Ok(())
    }

    fn is_class_registered(&self, class: &str) -> bool {
        self.registered.contains(class)
    }

    fn create_window(&mut self, params: &CreateParams) -> Result<Handle> {
        let creation_error = |reason: &str| Error::NativeCreation {
            class: params.class.to_owned(),
            reason: reason.to_owned(),
        };
        if self.failures.remove(&NativeOp::CreateWindow) {
            return Err(creation_error("injected failure"));
        }
        if !self.registered.contains(params.class) {
            return Err(creation_error("window class not registered"));
        }
        if let Some(parent) = params.parent {
            if !self.windows.contains_key(&parent) {
                return Err(creation_error("invalid parent window"));
            }
        }

        let handle = Handle::from_raw(self.next_handle)
            .ok_or_else(|| creation_error("handle space exhausted"))?;
        self.next_handle += 1;
        self.windows.insert(
            handle,
            WindowState {
                class: params.class,
                style: params.style,
                ex_style: params.ex_style,
                parent: params.parent,
                bounds: Rectangle::EMPTY,
                paint_requests: 0,
                control: Control::for_class(params.class),
            },
        );
        Ok(handle)
    }

    fn destroy_window(&mut self, handle: Handle) -> Result<()> {
        self.check(NativeOp::DestroyWindow)?;
        self.window(handle, "DestroyWindow")?;
        let doomed = self.descendants(handle);
        for h in &doomed {
            self.windows.remove(h);
        }
        self.queue.retain(|(h, _)| !doomed.contains(h));
        Ok(())
    }

    fn is_window(&self, handle: Handle) -> bool {
        self.windows.contains_key(&handle)
    }

    fn parent(&self, handle: Handle) -> Result<Option<Handle>> {
        Ok(self.window(handle, "GetParent")?.parent)
    }

    fn set_parent(&mut self, handle: Handle, parent: Option<Handle>) -> Result<()> {
        self.check(NativeOp::SetParent)?;
        if let Some(p) = parent {
            if p == handle || self.descendants(handle).contains(&p) {
                return Err(Error::native("SetParent", "parent would create a cycle"));
            }
            self.window(p, "SetParent")?;
        }
        self.window_mut(handle, "SetParent")?.parent = parent;
        Ok(())
    }

    fn style(&self, handle: Handle) -> Result<Style> {
        Ok(self.window(handle, "GetWindowLong")?.style)
    }

    fn set_style(&mut self, handle: Handle, style: Style) -> Result<()> {
        self.check(NativeOp::SetStyle)?;
        self.window_mut(handle, "SetWindowLong")?.style = style;
        Ok(())
    }

    fn is_visible(&self, handle: Handle) -> Result<bool> {
        Ok(self.window(handle, "IsWindowVisible")?.style.contains(Style::VISIBLE))
    }

    fn set_visible(&mut self, handle: Handle, visible: bool) -> Result<()> {
        self.check(NativeOp::SetVisible)?;
        let window = self.window_mut(handle, "ShowWindow")?;
        window.style = if visible {
            window.style | Style::VISIBLE
        } else {
            window.style & !Style::VISIBLE
        };
        Ok(())
    }

    fn invalidate(&mut self, handle: Handle) -> Result<()> {
        self.check(NativeOp::Invalidate)?;
        self.window_mut(handle, "InvalidateRect")?.paint_requests += 1;
        Ok(())
    }

    fn bounds(&self, handle: Handle) -> Result<Rectangle> {
        if self.failures.contains(&NativeOp::Bounds) {
            return Err(Error::native(NativeOp::Bounds.name(), "injected failure"));
        }
        Ok(self.window(handle, "GetWindowRect")?.bounds)
    }

    fn set_bounds(&mut self, handle: Handle, bounds: Rectangle) -> Result<()> {
        self.check(NativeOp::SetBounds)?;
        self.window_mut(handle, "MoveWindow")?.bounds = bounds;
        Ok(())
    }

    fn dialog_base_units(&self) -> Size {
        self.base_units
    }

    fn next_message(&mut self) -> Option<(Handle, Message)> {
        self.queue.pop_front()
    }

    fn default_proc(&mut self, _handle: Handle, _message: &Message) -> LResult {
        self.default_handled += 1;
        0
    }

    fn combo_insert_string(&mut self, handle: Handle, index: usize, text: &str) -> Result<usize> {
        let (items, cur_sel) = self.combo(handle, NativeOp::ComboInsert)?;
        if index > items.len() {
            return Err(Error::native("CB_INSERTSTRING", "index out of range"));
        }
        items.insert(index, text.to_owned());
        shift_on_insert(cur_sel, index);
        Ok(index)
    }

    fn combo_delete_string(&mut self, handle: Handle, index: usize) -> Result<usize> {
        let (items, cur_sel) = self.combo(handle, NativeOp::ComboDelete)?;
        if index >= items.len() {
            return Err(Error::native("CB_DELETESTRING", "index out of range"));
        }
        items.remove(index);
        shift_on_delete(cur_sel, index);
        Ok(items.len())
    }

    fn combo_reset_content(&mut self, handle: Handle) -> Result<()> {
        let (items, cur_sel) = self.combo(handle, NativeOp::ComboReset)?;
        items.clear();
        *cur_sel = None;
        Ok(())
    }

    fn combo_count(&self, handle: Handle) -> Result<usize> {
        match &self.window(handle, "CB_GETCOUNT")?.control {
            Control::ComboBox { items, .. } => Ok(items.len()),
            _ => Err(Error::native("CB_GETCOUNT", "not a combo box")),
        }
    }

    fn combo_set_cur_sel(&mut self, handle: Handle, index: Option<usize>) -> Result<Option<usize>> {
        let (items, cur_sel) = self.combo(handle, NativeOp::ComboSetCurSel)?;
        *cur_sel = index.filter(|&i| i < items.len());
        Ok(*cur_sel)
    }

    fn combo_cur_sel(&self, handle: Handle) -> Result<Option<usize>> {
        match &self.window(handle, "CB_GETCURSEL")?.control {
            Control::ComboBox { cur_sel, .. } => Ok(*cur_sel),
            _ => Err(Error::native("CB_GETCURSEL", "not a combo box")),
        }
    }

    fn combo_edit_sel(&self, handle: Handle) -> Result<(usize, usize)> {
        match &self.window(handle, "CB_GETEDITSEL")?.control {
            Control::ComboBox { edit_sel, .. } => Ok(*edit_sel),
            _ => Err(Error::native("CB_GETEDITSEL", "not a combo box")),
        }
    }

    fn combo_set_edit_sel(&mut self, handle: Handle, start: usize, end: usize) -> Result<()> {
        match &mut self.window_mut(handle, "CB_SETEDITSEL")?.control {
            Control::ComboBox { edit_sel, .. } => {
                *edit_sel = (start, end);
                Ok(())
            }
            _ => Err(Error::native("CB_SETEDITSEL", "not a combo box")),
        }
    }

    fn tab_insert_item(&mut self, handle: Handle, index: usize, text: &str) -> Result<usize> {
        let (items, cur_sel) = self.tab(handle, NativeOp::TabInsert)?;
        if index > items.len() {
            return Err(Error::native("TCM_INSERTITEM", "index out of range"));
        }
        items.insert(index, text.to_owned());
        if cur_sel.is_none() && items.len() == 1 {
            *cur_sel = Some(0);
        } else {
            shift_on_insert(cur_sel, index);
        }
        Ok(index)
    }

    fn tab_delete_item(&mut self, handle: Handle, index: usize) -> Result<()> {
        let (items, cur_sel) = self.tab(handle, NativeOp::TabDelete)?;
        if index >= items.len() {
            return Err(Error::native("TCM_DELETEITEM", "index out of range"));
        }
        items.remove(index);
        shift_on_delete(cur_sel, index);
        Ok(())
    }

    fn tab_delete_all_items(&mut self, handle: Handle) -> Result<()> {
        let (items, cur_sel) = self.tab(handle, NativeOp::TabDeleteAll)?;
        items.clear();
        *cur_sel = None;
        Ok(())
    }

    fn tab_count(&self, handle: Handle) -> Result<usize> {
        match &self.window(handle, "TCM_GETITEMCOUNT")?.control {
            Control::Tab { items, .. } => Ok(items.len()),
            _ => Err(Error::native("TCM_GETITEMCOUNT", "not a tab control")),
        }
    }

    fn tab_set_cur_sel(&mut self, handle: Handle, index: usize) -> Result<Option<usize>> {
        let (items, cur_sel) = self.tab(handle, NativeOp::TabSetCurSel)?;
        if index >= items.len() {
            return Err(Error::native("TCM_SETCURSEL", "index out of range"));
        }
        Ok(cur_sel.replace(index))
    }

    fn tab_cur_sel(&self, handle: Handle) -> Result<Option<usize>> {
        if self.failures.contains(&NativeOp::TabCurSel) {
            return Err(Error::native(NativeOp::TabCurSel.name(), "injected failure"));
        }
        match &self.window(handle, "TCM_GETCURSEL")?.control {
            Control::Tab { cur_sel, .. } => Ok(*cur_sel),
            _ => Err(Error::native("TCM_GETCURSEL", "not a tab control")),
        }
    }

    fn tab_adjust_rect(&self, handle: Handle, rect: Rectangle) -> Result<Rectangle> {
        if self.failures.contains(&NativeOp::TabAdjustRect) {
            return Err(Error::native(NativeOp::TabAdjustRect.name(), "injected failure"));
        }
        match &self.window(handle, "TCM_ADJUSTRECT")?.control {
            Control::Tab { .. } => Ok(Rectangle::new(
                rect.x + TAB_BORDER,
                rect.y + TAB_HEADER_HEIGHT,
                (rect.width - 2 * TAB_BORDER).max(0),
                (rect.height - TAB_HEADER_HEIGHT - TAB_BORDER).max(0),
            )),
            _ => Err(Error::native("TCM_ADJUSTRECT", "not a tab control")),
        }
    }

    fn web_view_navigate(&mut self, handle: Handle, url: &str) -> Result<()> {
        self.check(NativeOp::Navigate)?;
        match &mut self.window_mut(handle, "Navigate")?.control {
            Control::WebView { url: current } => {
                *current = url.to_owned();
                Ok(())
            }
            _ => Err(Error::native("Navigate", "not a web view")),
        }
    }

    fn web_view_url(&self, handle: Handle) -> Result<String> {
        match &self.window(handle, "LocationURL")?.control {
            Control::WebView { url } => Ok(url.clone()),
            _ => Err(Error::native("LocationURL", "not a web view")),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
