//! Layout: per-widget resize flags and the taffy-backed box layout.

pub mod engine;
pub mod flags;

pub use engine::{BoxLayout, LayoutItem, Orientation};
pub use flags::LayoutFlags;
