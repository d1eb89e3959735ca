//! Error type shared by the whole toolkit.

use std::num::ParseIntError;

use crate::widget::WidgetId;

/// Errors raised by native calls, widget operations and state persistence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The platform refused to allocate a native window.
    #[error("cannot create native window of class `{class}`: {reason}")]
    NativeCreation { class: String, reason: String },

    /// A native mutation or query failed.
    #[error("native operation `{operation}` failed: {reason}")]
    NativeOperation { operation: &'static str, reason: String },

    /// The native tab strip rejected a page insertion.
    #[error("native tab insertion at index {index} failed: {reason}")]
    NativeInsert { index: usize, reason: String },

    /// A caller-supplied index was out of range or not accepted by the control.
    #[error("invalid index {index} (count {count})")]
    InvalidIndex { index: usize, count: usize },

    /// A persisted value could not be parsed back into an index.
    #[error("persisted state `{value}` under key `{key}` is not an index: {source}")]
    PersistedStateParse {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The widget id does not refer to a live widget.
    #[error("widget {0:?} does not exist")]
    WidgetNotFound(WidgetId),

    /// The widget exists but has a different concrete type.
    #[error("widget {id:?} is not a {expected}")]
    WrongWidgetType { id: WidgetId, expected: &'static str },

    /// The widget is currently executing a handler further up the stack.
    #[error("widget {0:?} is busy handling a message")]
    WidgetBusy(WidgetId),

    /// The state store failed to read or write a value.
    #[error("state store error: {0}")]
    StateStore(String),

    /// The layout engine could not arrange a set of items.
    #[error("layout failed: {0}")]
    Layout(String),
}

impl Error {
    /// Shorthand for a [`Error::NativeOperation`].
    pub fn native(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::NativeOperation { operation, reason: reason.into() }
    }
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
