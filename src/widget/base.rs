//! State every widget composes with.

use super::WidgetId;
use crate::error::Result;
use crate::native::{Handle, NativeWindow};

/// Placement hints read by layouts. Widgets themselves never interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutHints {
    /// Share of surplus space along a layout's main axis.
    pub stretch_factor: u32,
    pub row: usize,
    pub row_span: usize,
    pub column: usize,
    pub column_span: usize,
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            stretch_factor: 1,
            row: 0,
            row_span: 1,
            column: 0,
            column_span: 1,
        }
    }
}

/// Common widget state: identity, the owned native window, name, persistence
/// key and layout hints.
#[derive(Debug)]
pub struct WidgetBase {
    id: WidgetId,
    window: NativeWindow,
    name: String,
    persistence_key: Option<String>,
    hints: LayoutHints,
}

impl WidgetBase {
    pub fn new(id: WidgetId, window: NativeWindow) -> Self {
        Self {
            id,
            window,
            name: String::new(),
            persistence_key: None,
            hints: LayoutHints::default(),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn window(&self) -> &NativeWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut NativeWindow {
        &mut self.window
    }

    /// The live native handle; an error once the window was released.
    pub fn handle(&self) -> Result<Handle> {
        self.window.handle()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_persistence_key(&mut self, key: Option<String>) {
        self.persistence_key = key;
    }

    /// Key under which the widget persists its state: the explicit key, else
    /// the widget name. `None` when neither is set.
    pub fn persistence_key(&self) -> Option<&str> {
        match &self.persistence_key {
            Some(key) => Some(key),
            None if !self.name.is_empty() => Some(&self.name),
            None => None,
        }
    }

    pub fn hints(&self) -> LayoutHints {
        self.hints
    }

    pub fn hints_mut(&mut self) -> &mut LayoutHints {
        &mut self.hints
    }
}
