//! Reusable UI components.

pub mod label_picker;
pub mod picker_menu;

pub use label_picker::{LabelPicker, PickerAction};
