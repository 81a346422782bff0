pub mod controller;
pub mod element;

pub use controller::{SyncController, SyncOptions};
pub use element::{InlineStyle, Pane, PaneElement};
