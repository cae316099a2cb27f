// File: ./src/tui/action.rs
use crate::model::{Event, TripData, UserAction};
use crate::presenter::DataChange;

#[derive(Debug)]
pub enum Action {
    // Loading
    Reload,

    // CRUD
    AddEvent(Event),
    UpdateEvent(Event),
    DeleteEvent(Event),

    // Lifecycle
    Quit,
}

impl From<DataChange> for Action {
    fn from(change: DataChange) -> Self {
        match change.action {
            UserAction::AddEvent => Action::AddEvent(change.event),
            UserAction::UpdateEvent => Action::UpdateEvent(change.event),
            UserAction::DeleteEvent => Action::DeleteEvent(change.event),
        }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    TripLoaded(TripData),
    Error(String),
    Status(String),
}
