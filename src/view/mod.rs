// File: ./src/view/mod.rs
pub mod edit_form;
pub mod event;
pub mod format;
pub mod trip_info;

pub use edit_form::{EditFormView, Field, FormSignal};
pub use event::{EventSignal, EventView};
pub use trip_info::TripInfo;
