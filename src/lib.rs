//! # casement
//!
//! A widget toolkit core that binds native window-manager controls into a
//! managed widget tree.
//!
//! casement owns the parts a native toolkit leaves implicit: creating a
//! widget atop a native window with full rollback on failure, routing native
//! messages to typed widget handlers, keeping a tab strip, its pages and
//! their visibility in sync, and persisting the selected tab across
//! sessions. Rendering is left to the platform.
//!
//! ## Core Systems
//!
//! - **[`native`]**: the [`Platform`](native::Platform) seam, window handles, messages and an in-memory platform
//! - **[`widget`]**: Widget trait, slotmap-backed widget tree, handle registry, lifecycle tracking
//! - **[`widgets`]**: ComboBox, TabWidget, TabPage, WebView
//! - **[`event`]**: payload-free event publisher
//! - **[`layout`]**: layout flags and a taffy-powered box layout
//! - **[`declarative`]**: struct-literal widget construction
//! - **[`state`]**: persistence store for UI state
//! - **[`ui`]**: the [`Ui`] root tying everything together
//! - **[`testing`]**: a headless pilot and tree snapshots
//! - **[`geometry`]**: Size, Rectangle, Margins primitives

// Foundation
pub mod error;
pub mod geometry;
pub mod logging;

// Platform
pub mod native;

// Widget system
pub mod widget;
pub mod widgets;

// Events, layout and persistence
pub mod event;
pub mod layout;
pub mod state;

// Construction
pub mod declarative;

// Application
pub mod ui;

// Testing
pub mod testing;

pub use error::{Error, Result};
pub use ui::{SelectionNotify, Ui, UiConfig};
