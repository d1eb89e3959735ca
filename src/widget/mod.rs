//! Widget system: trait, base state, tree, registry, context, lifecycle.

pub mod base;
pub mod context;
pub mod lifecycle;
pub mod registry;
pub mod traits;
pub mod tree;

pub use base::{LayoutHints, WidgetBase};
pub use context::Context;
pub use lifecycle::{LifecycleEvent, LifecycleLog, DEFAULT_LIFECYCLE_HISTORY};
pub use registry::HandleRegistry;
pub use traits::{Widget, WidgetRef};
pub use tree::{WidgetId, WidgetTree};
