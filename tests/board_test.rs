use chrono::{DateTime, Duration, TimeZone, Utc};
use std::rc::Rc;
use tripdeck::dom::{Container, Document, Key};
use tripdeck::model::{Destination, Event, Offer, UpdateType, UserAction};
use tripdeck::presenter::{Mode, PresenterOptions, TripBoard};
use tripdeck::store::{DestinationsStore, OffersStore};
use tripdeck::view::Field;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

fn meal() -> Offer {
    Offer {
        kind: "train".into(),
        title: "Meal on board".into(),
        price: 5,
    }
}

fn leg(id: &str, city: &str, day: u32, price: u32) -> Event {
    Event {
        id: id.into(),
        kind: "train".into(),
        destination: Destination::named(city),
        time_start: at(day, 8),
        time_end: at(day, 8) + Duration::minutes(150),
        price,
        offers: vec![meal()],
        is_favorite: false,
    }
}

fn board_with(options: PresenterOptions) -> TripBoard {
    let mut destinations = DestinationsStore::new();
    destinations.set_destinations(vec![Destination::named("Rome"), Destination::named("Oslo")]);
    let mut offers = OffersStore::new();
    offers.set_offers(vec![meal()]);

    let mut board = TripBoard::new(
        Container::new(),
        Document::new(),
        Some(Rc::new(destinations)),
        Some(Rc::new(offers)),
        options,
    );
    board
        .set_events(vec![
            leg("1", "Rome", 10, 20),
            leg("2", "Oslo", 11, 30),
            leg("3", "Rome", 12, 40),
        ])
        .unwrap();
    board
}

fn board() -> TripBoard {
    board_with(PresenterOptions::full())
}

fn mode_of(board: &TripBoard, id: &str) -> Mode {
    board.presenter(id).unwrap().borrow().mode()
}

fn focus_price(board: &mut TripBoard, id: &str) {
    let form = board.presenter(id).unwrap().borrow().edit_form().unwrap();
    for _ in 0..6 {
        if form.focus() == Field::Price {
            return;
        }
        board.handle_key(Key::Tab).unwrap();
    }
    panic!("price field never got focus");
}

fn type_price(board: &mut TripBoard, id: &str, price: &str) {
    focus_price(board, id);
    let form = board.presenter(id).unwrap().borrow().edit_form().unwrap();
    while !form.field_value(Field::Price).is_empty() {
        board.handle_key(Key::Backspace).unwrap();
    }
    for c in price.chars() {
        board.handle_key(Key::Char(c)).unwrap();
    }
}

#[test]
fn test_only_one_event_is_edited_at_a_time() {
    let mut board = board();
    board.handle_key(Key::Enter).unwrap();
    assert_eq!(mode_of(&board, "1"), Mode::Editing);
    assert!(board.is_form_focused());

    board.handle_key(Key::Down).unwrap();
    board.handle_key(Key::Enter).unwrap();

    assert_eq!(mode_of(&board, "1"), Mode::Default);
    assert_eq!(mode_of(&board, "2"), Mode::Editing);
    assert_eq!(board.editing_count(), 1);
    assert_eq!(board.document().listener_count(), 1);
    assert_eq!(board.container().len(), 3);
}

#[test]
fn test_escape_discards_unsaved_edits() {
    let mut board = board();
    board.handle_key(Key::Enter).unwrap();
    type_price(&mut board, "1", "99");
    let form = board.presenter("1").unwrap().borrow().edit_form().unwrap();
    assert_eq!(form.field_value(Field::Price), "99");

    board.handle_key(Key::Esc).unwrap();

    assert_eq!(mode_of(&board, "1"), Mode::Default);
    assert_eq!(board.document().listener_count(), 0);
    assert_eq!(form.field_value(Field::Price), "20");
    assert!(board.take_changes().is_empty());
}

#[test]
fn test_unchanged_submit_is_a_patch() {
    let mut board = board();
    board.handle_key(Key::Enter).unwrap();
    board.handle_key(Key::Enter).unwrap();

    let changes = board.take_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].action, UserAction::UpdateEvent);
    assert_eq!(changes[0].update_type, UpdateType::Patch);
    assert_eq!(changes[0].event, leg("1", "Rome", 10, 20));
    assert_eq!(mode_of(&board, "1"), Mode::Default);
    assert_eq!(board.document().listener_count(), 0);
}

#[test]
fn test_price_change_is_minor_and_lands_in_the_list() {
    let mut board = board();
    board.handle_key(Key::Enter).unwrap();
    type_price(&mut board, "1", "75");
    board.handle_key(Key::Enter).unwrap();

    let changes = board.take_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].update_type, UpdateType::Minor);
    let meta = changes[0].meta.unwrap();
    assert!(!meta.is_price_equal);
    assert!(meta.is_date_start_equal);

    let stored = board.events().iter().find(|e| e.id == "1").unwrap();
    assert_eq!(stored.price, 75);
    assert_eq!(board.editing_count(), 0);
}

#[test]
fn test_simple_options_always_patch() {
    let mut board = board_with(PresenterOptions::simple());
    board.handle_key(Key::Enter).unwrap();
    type_price(&mut board, "1", "75");
    board.handle_key(Key::Enter).unwrap();

    let changes = board.take_changes();
    assert_eq!(changes[0].update_type, UpdateType::Patch);
    assert!(changes[0].meta.is_none());
}

#[test]
fn test_delete_from_form_removes_the_row() {
    let mut board = board();
    board.handle_key(Key::Enter).unwrap();
    board.handle_key(Key::Delete).unwrap();

    let changes = board.take_changes();
    assert_eq!(changes[0].action, UserAction::DeleteEvent);
    assert_eq!(changes[0].update_type, UpdateType::Major);
    assert!(changes[0].meta.is_none());
    assert_eq!(board.events().len(), 2);
    assert_eq!(board.container().len(), 2);
    assert!(board.presenter("1").is_none());
    assert_eq!(board.document().listener_count(), 0);
}

#[test]
fn test_favorite_toggles_in_place() {
    let mut board = board();
    let row = board.container().node_at(0);
    board.handle_key(Key::Char('f')).unwrap();

    let changes = board.take_changes();
    assert_eq!(changes[0].update_type, UpdateType::Patch);
    assert!(changes[0].event.is_favorite);
    assert!(board.events()[0].is_favorite);
    assert_eq!(mode_of(&board, "1"), Mode::Default);
    assert_ne!(board.container().node_at(0), row);
    assert_eq!(board.container().len(), 3);
}

#[test]
fn test_editing_an_event_closes_the_new_event_form() {
    let mut board = board();
    board.handle_key(Key::Char('n')).unwrap();
    assert!(board.is_new_event_open());
    assert_eq!(board.container().len(), 4);

    board.handle_key(Key::Down).unwrap();
    board.handle_key(Key::Enter).unwrap();

    assert!(!board.is_new_event_open());
    assert_eq!(board.editing_count(), 1);
    assert_eq!(board.container().len(), 3);
}

#[test]
fn test_escape_closes_the_new_event_form() {
    let mut board = board();
    board.handle_key(Key::Char('n')).unwrap();
    board.handle_key(Key::Esc).unwrap();

    assert!(!board.is_new_event_open());
    assert_eq!(board.document().listener_count(), 0);
    assert_eq!(board.container().len(), 3);
    assert!(board.take_changes().is_empty());
}

#[test]
fn test_type_only_edit_on_precise_times_is_a_patch() {
    let mut board = board();
    let start = at(10, 22) + Duration::seconds(56) + Duration::milliseconds(845);
    let precise = Event {
        time_start: start,
        time_end: start + Duration::minutes(95),
        ..leg("1", "Rome", 10, 20)
    };
    board
        .set_events(vec![precise.clone(), leg("2", "Oslo", 11, 30)])
        .unwrap();

    board.handle_key(Key::Enter).unwrap();
    board.handle_key(Key::Right).unwrap();
    board.handle_key(Key::Enter).unwrap();

    let changes = board.take_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].update_type, UpdateType::Patch);
    assert!(changes[0].meta.unwrap().is_date_start_equal);
    assert_ne!(changes[0].event.kind, precise.kind);
    assert_eq!(changes[0].event.time_start, precise.time_start);
    assert_eq!(changes[0].event.time_end, precise.time_end);
}
