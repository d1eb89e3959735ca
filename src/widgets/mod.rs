//! Built-in widgets: ComboBox, TabWidget, TabPage, WebView.

pub mod combo_box;
pub mod tab_page;
pub mod tab_widget;
pub mod web_view;

pub use combo_box::ComboBox;
pub use tab_page::TabPage;
pub use tab_widget::TabWidget;
pub use web_view::WebView;
