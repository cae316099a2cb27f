// File: ./src/tui/state.rs
use crate::dom::{Container, Document, Key};
use crate::model::{Destination, Offer, TripData};
use crate::presenter::{FilterType, PresenterOptions, SortType, TripBoard};
use crate::store::{DestinationsStore, OffersStore};
use crate::tui::action::{Action, AppEvent};
use anyhow::Result;
use ratatui::widgets::ListState;
use std::rc::Rc;

pub struct AppState {
    pub board: Option<TripBoard>,
    pub options: PresenterOptions,
    pub default_sort: SortType,
    pub default_filter: FilterType,

    pub loading: bool,
    pub message: String,
    pub show_full_help: bool,
    pub list_state: ListState,
}

impl AppState {
    pub fn new(options: PresenterOptions, default_sort: SortType, default_filter: FilterType) -> Self {
        Self {
            board: None,
            options,
            default_sort,
            default_filter,
            loading: true,
            message: "Loading trip...".to_string(),
            show_full_help: false,
            list_state: ListState::default(),
        }
    }

    /// Builds the reference stores and a fresh board from a loaded trip.
    pub fn load_trip(&mut self, data: TripData) -> Result<()> {
        let events = data.decode_events()?;

        let mut offers = OffersStore::new();
        offers.set_offers(data.offers.into_iter().map(Offer::from).collect());
        let mut destinations = DestinationsStore::new();
        destinations.set_destinations(data.destinations.into_iter().map(Destination::from).collect());

        let mut board = TripBoard::new(
            Container::new(),
            Document::new(),
            Some(Rc::new(destinations)),
            Some(Rc::new(offers)),
            self.options,
        );
        board.set_events(events)?;
        board.set_filter(self.default_filter)?;
        board.set_sort(self.default_sort)?;
        self.message = format!("{} events loaded", board.events().len());
        self.list_state.select(Some(board.cursor()));
        self.board = Some(board);
        self.loading = false;
        Ok(())
    }

    pub fn on_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TripLoaded(data) => {
                if let Err(e) = self.load_trip(data) {
                    self.loading = false;
                    self.message = format!("Error: {:#}", e);
                }
            }
            AppEvent::Error(e) => self.message = format!("Error: {}", e),
            AppEvent::Status(s) => self.message = s,
        }
    }

    pub fn is_form_focused(&self) -> bool {
        self.board.as_ref().is_some_and(|b| b.is_form_focused())
    }

    /// Handles one key and returns what has to be sent to the gateway.
    pub fn handle_key(&mut self, key: Key) -> Vec<Action> {
        if !self.is_form_focused() {
            match key {
                Key::Char('q') => return vec![Action::Quit],
                Key::Char('?') => {
                    self.show_full_help = !self.show_full_help;
                    return Vec::new();
                }
                Key::Char('r') => {
                    self.loading = true;
                    self.message = "Reloading...".to_string();
                    return vec![Action::Reload];
                }
                _ => {}
            }
        }

        let Some(board) = self.board.as_mut() else {
            return Vec::new();
        };
        if let Err(e) = board.handle_key(key) {
            log::warn!("Key {:?} left the list inconsistent: {}", key, e);
            self.message = format!("Error: {}", e);
        }
        self.list_state.select(Some(board.cursor()));
        board.take_changes().into_iter().map(Action::from).collect()
    }
}
