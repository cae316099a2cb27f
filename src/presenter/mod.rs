// File: ./src/presenter/mod.rs
pub mod board;
pub mod event;
pub mod new_event;

pub use board::{DataChange, FilterType, PresenterRef, SortType, TripBoard};
pub use event::{
    ChangeData, ChangeMode, EscapeBehavior, EventPresenter, Mode, PresenterOptions,
    classify_update,
};
pub use new_event::NewEventPresenter;
