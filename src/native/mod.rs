//! Native platform seam: handles, styles, messages and the [`Platform`] trait.
//!
//! Everything the toolkit asks of the window manager goes through
//! [`Platform`]. [`HeadlessPlatform`] implements it in memory and is what the
//! test-suite and the [`Pilot`](crate::testing::Pilot) drive.

pub mod headless;
pub mod message;
pub mod window;

use std::fmt;
use std::num::NonZeroU64;
use std::ops::{BitAnd, BitOr, Not};

use crate::error::Result;
use crate::geometry::{Rectangle, Size};

pub use headless::{HeadlessPlatform, NativeOp};
pub use message::{CommandCode, LResult, Message, NotifyCode};
pub use window::NativeWindow;

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Opaque native window handle. Never null.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(NonZeroU64);

impl Handle {
    /// Wrap a raw platform value. Returns `None` for the null handle.
    #[inline]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// The raw platform value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.0.get())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

// ---------------------------------------------------------------------------
// Window classes
// ---------------------------------------------------------------------------

/// Window class names known to the toolkit.
pub mod class {
    /// System drop-down list control.
    pub const COMBO_BOX: &str = "COMBOBOX";
    /// System tab strip control.
    pub const TAB_CONTROL: &str = "SysTabControl32";
    /// Toolkit container hosting a tab strip and its pages.
    pub const TAB_WIDGET: &str = "Casement_TabWidget";
    /// Toolkit container used for tab pages.
    pub const COMPOSITE: &str = "Casement_Composite";
    /// Toolkit host for an embedded browser.
    pub const WEB_VIEW: &str = "Casement_WebView";

    /// Classes the platform provides without registration.
    pub const SYSTEM: &[&str] = &[COMBO_BOX, TAB_CONTROL];
}

// ---------------------------------------------------------------------------
// Style / ExStyle
// ---------------------------------------------------------------------------

/// Window style bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style(pub u32);

impl Style {
    pub const NONE: Style = Style(0);
    pub const CHILD: Style = Style(0x4000_0000);
    pub const POPUP: Style = Style(0x8000_0000);
    pub const VISIBLE: Style = Style(0x1000_0000);
    pub const CLIPSIBLINGS: Style = Style(0x0400_0000);
    pub const VSCROLL: Style = Style(0x0020_0000);
    pub const TABSTOP: Style = Style(0x0001_0000);
    pub const DROPDOWNLIST: Style = Style(0x0000_0003);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Style) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for Style {
    type Output = Style;
    fn bitor(self, rhs: Self) -> Self::Output {
        Style(self.0 | rhs.0)
    }
}

impl BitAnd for Style {
    type Output = Style;
    fn bitand(self, rhs: Self) -> Self::Output {
        Style(self.0 & rhs.0)
    }
}

impl Not for Style {
    type Output = Style;
    fn not(self) -> Self::Output {
        Style(!self.0)
    }
}

/// Extended window style bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExStyle(pub u32);

impl ExStyle {
    pub const NONE: ExStyle = ExStyle(0);
    pub const CONTROLPARENT: ExStyle = ExStyle(0x0001_0000);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: ExStyle) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for ExStyle {
    type Output = ExStyle;
    fn bitor(self, rhs: Self) -> Self::Output {
        ExStyle(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// CreateParams
// ---------------------------------------------------------------------------

/// Everything the platform needs to allocate a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateParams {
    pub parent: Option<Handle>,
    pub class: &'static str,
    pub style: Style,
    pub ex_style: ExStyle,
}

impl CreateParams {
    /// Parameters for a window of `class` with no styles and no parent.
    pub fn new(class: &'static str) -> Self {
        Self {
            parent: None,
            class,
            style: Style::NONE,
            ex_style: ExStyle::NONE,
        }
    }

    /// Set the parent window (builder).
    pub fn with_parent(mut self, parent: Option<Handle>) -> Self {
        self.parent = parent;
        self
    }

    /// Set the window style (builder).
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the extended window style (builder).
    pub fn with_ex_style(mut self, ex_style: ExStyle) -> Self {
        self.ex_style = ex_style;
        self
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// The native window manager.
///
/// Object-safe; widgets receive it as `&mut dyn Platform` through the
/// [`Context`](crate::widget::Context). Every call is made from the UI thread.
pub trait Platform {
    // ── Classes and windows ──────────────────────────────────────────

    /// Register a toolkit window class. Registering twice is not an error.
    fn register_class(&mut self, class: &'static str) -> Result<()>;

    /// Whether `class` can currently be instantiated.
    fn is_class_registered(&self, class: &str) -> bool;

    /// Allocate a native window. Fails with `NativeCreation`.
    fn create_window(&mut self, params: &CreateParams) -> Result<Handle>;

    /// Release a native window and every native window parented to it.
    fn destroy_window(&mut self, handle: Handle) -> Result<()>;

    /// Whether `handle` refers to a live window.
    fn is_window(&self, handle: Handle) -> bool;

    fn parent(&self, handle: Handle) -> Result<Option<Handle>>;
    fn set_parent(&mut self, handle: Handle, parent: Option<Handle>) -> Result<()>;

    fn style(&self, handle: Handle) -> Result<Style>;
    fn set_style(&mut self, handle: Handle, style: Style) -> Result<()>;

    fn is_visible(&self, handle: Handle) -> Result<bool>;
    fn set_visible(&mut self, handle: Handle, visible: bool) -> Result<()>;

    /// Schedule a repaint of the whole window.
    fn invalidate(&mut self, handle: Handle) -> Result<()>;

    /// Bounds in the parent's client coordinates.
    fn bounds(&self, handle: Handle) -> Result<Rectangle>;
    fn set_bounds(&mut self, handle: Handle, bounds: Rectangle) -> Result<()>;

    /// Average character cell of the default dialog font, in pixels.
    fn dialog_base_units(&self) -> Size;

    // ── Message queue ────────────────────────────────────────────────

    /// Pop the next queued message, if any.
    fn next_message(&mut self) -> Option<(Handle, Message)>;

    /// The platform's handling for messages no widget claimed.
    fn default_proc(&mut self, handle: Handle, message: &Message) -> LResult;

    // ── Combo box ────────────────────────────────────────────────────

    /// Insert a string; returns the index it landed at.
    fn combo_insert_string(&mut self, handle: Handle, index: usize, text: &str) -> Result<usize>;
    /// Delete a string; returns the remaining count.
    fn combo_delete_string(&mut self, handle: Handle, index: usize) -> Result<usize>;
    fn combo_reset_content(&mut self, handle: Handle) -> Result<()>;
    fn combo_count(&self, handle: Handle) -> Result<usize>;
    /// Request a selection; returns the selection the control ended up with.
    fn combo_set_cur_sel(&mut self, handle: Handle, index: Option<usize>) -> Result<Option<usize>>;
    fn combo_cur_sel(&self, handle: Handle) -> Result<Option<usize>>;
    fn combo_edit_sel(&self, handle: Handle) -> Result<(usize, usize)>;
    fn combo_set_edit_sel(&mut self, handle: Handle, start: usize, end: usize) -> Result<()>;

    // ── Tab strip ────────────────────────────────────────────────────

    /// Insert a tab; returns the index it landed at.
    fn tab_insert_item(&mut self, handle: Handle, index: usize, text: &str) -> Result<usize>;
    fn tab_delete_item(&mut self, handle: Handle, index: usize) -> Result<()>;
    fn tab_delete_all_items(&mut self, handle: Handle) -> Result<()>;
    fn tab_count(&self, handle: Handle) -> Result<usize>;
    /// Select a tab without emitting a change notification; returns the
    /// previous selection.
    fn tab_set_cur_sel(&mut self, handle: Handle, index: usize) -> Result<Option<usize>>;
    fn tab_cur_sel(&self, handle: Handle) -> Result<Option<usize>>;
    /// Translate a tab strip window rectangle into its display area.
    fn tab_adjust_rect(&self, handle: Handle, rect: Rectangle) -> Result<Rectangle>;

    // ── Web view ─────────────────────────────────────────────────────

    fn web_view_navigate(&mut self, handle: Handle, url: &str) -> Result<()>;
    fn web_view_url(&self, handle: Handle) -> Result<String>;
}
