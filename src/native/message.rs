//! Typed native messages delivered by the platform's message pump.
//!
//! The platform translates its raw window messages into [`Message`] before
//! handing them to [`Ui::dispatch`](crate::Ui::dispatch). Control
//! notifications keep the handle of the control that raised them.

use super::Handle;
use crate::geometry::Size;

/// Value a window procedure returns to the platform.
pub type LResult = isize;

// ---------------------------------------------------------------------------
// Notification codes
// ---------------------------------------------------------------------------

/// Notification codes carried by [`Message::Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    /// The user closed a combo box list accepting the highlighted item.
    SelEndOk,
    /// The user closed a combo box list without accepting.
    SelEndCancel,
    /// Any code the toolkit has no name for.
    Other(u16),
}

/// Notification codes carried by [`Message::Notify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyCode {
    /// The selected tab is about to change.
    SelChanging,
    /// The selected tab changed.
    SelChange,
    /// Any code the toolkit has no name for.
    Other(i32),
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A message addressed to one native window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The client area now has the given size.
    Size(Size),
    /// The user is dragging the window frame; the client area will have the
    /// given size.
    Sizing(Size),
    /// Command notification from a control.
    Command { source: Handle, code: CommandCode },
    /// Structured notification from a common control.
    Notify { source: Handle, code: NotifyCode },
    /// The window needs repainting.
    Paint,
    /// The platform destroyed the window.
    Destroy,
    /// A message with no typed representation.
    Raw { id: u32, wparam: usize, lparam: isize },
}

impl Message {
    /// Human-readable message name for logging.
    pub fn message_name(&self) -> &'static str {
        match self {
            Message::Size(_) => "Size",
            Message::Sizing(_) => "Sizing",
            Message::Command { .. } => "Command",
            Message::Notify { .. } => "Notify",
            Message::Paint => "Paint",
            Message::Destroy => "Destroy",
            Message::Raw { .. } => "Raw",
        }
    }

    /// The new client size for resize messages.
    pub fn resize(&self) -> Option<Size> {
        match self {
            Message::Size(size) | Message::Sizing(size) => Some(*size),
            _ => None,
        }
    }
}
