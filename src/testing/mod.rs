//! Headless testing helpers: [`Pilot`] and tree snapshots.
//!
//! Use the [`Pilot`] to drive a [`Ui`](crate::Ui) over the in-memory
//! platform as a user would. Use [`tree_to_string`] to capture the widget
//! tree (types, names, bounds, visibility) for assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{subtree_to_string, tree_to_string};
