//! Tracing targets used throughout casement.
//!
//! casement logs through the `tracing` crate and never installs a
//! subscriber itself. Filter on these targets to follow one subsystem, for
//! example `RUST_LOG=casement::dispatch=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Native window creation and release.
    pub const NATIVE: &str = "casement::native";
    /// Message routing from the pump to widgets.
    pub const DISPATCH: &str = "casement::dispatch";
    /// Widget construction, disposal and registry changes.
    pub const WIDGET: &str = "casement::widget";
    /// Event publication.
    pub const EVENT: &str = "casement::event";
    /// Tab widget page and selection management.
    pub const TAB_WIDGET: &str = "casement::tab_widget";
    /// Combo box item and selection management.
    pub const COMBO_BOX: &str = "casement::combo_box";
    /// Layout passes.
    pub const LAYOUT: &str = "casement::layout";
    /// State persistence.
    pub const STATE: &str = "casement::state";
}
