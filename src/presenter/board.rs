// File: ./src/presenter/board.rs
//! The list owner: one [`EventPresenter`] per visible event, plus the new-event form.
//!
//! Presenters never touch each other. When one opens its form it calls its `change_mode`
//! closure, and the board resets every other presenter through its registry. Data changes are
//! queued by the `change_data` closures and applied once the key that caused them has been fully
//! handled, so no presenter is borrowed while the list is rebuilt.
use crate::dom::{Container, Document, Key, NodeId, RenderError};
use crate::model::{Event, UpdateMeta, UpdateType, UserAction};
use crate::presenter::event::{ChangeData, ChangeMode, EventPresenter, Mode, PresenterOptions};
use crate::presenter::new_event::NewEventPresenter;
use crate::store::{DestinationsStore, OffersStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub type PresenterRef = Rc<RefCell<EventPresenter>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    #[default]
    Day,
    Time,
    Price,
}

impl SortType {
    pub fn next(self) -> Self {
        match self {
            SortType::Day => SortType::Time,
            SortType::Time => SortType::Price,
            SortType::Price => SortType::Day,
        }
    }

    fn sort(self, events: &mut [Event]) {
        match self {
            SortType::Day => events.sort_by_key(|e| e.time_start),
            SortType::Time => events.sort_by_key(|e| std::cmp::Reverse(e.duration())),
            SortType::Price => events.sort_by_key(|e| std::cmp::Reverse(e.price)),
        }
    }

    /// Whether an edit that kept these fields could still move the row.
    fn is_affected_by(self, meta: &UpdateMeta) -> bool {
        match self {
            SortType::Day => !meta.is_date_start_equal,
            SortType::Time => !meta.is_duration_equal,
            SortType::Price => !meta.is_price_equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Everything,
    Future,
    Past,
}

impl FilterType {
    pub fn next(self) -> Self {
        match self {
            FilterType::Everything => FilterType::Future,
            FilterType::Future => FilterType::Past,
            FilterType::Past => FilterType::Everything,
        }
    }

    fn keeps(self, event: &Event, now: DateTime<Utc>) -> bool {
        match self {
            FilterType::Everything => true,
            FilterType::Future => event.is_future(now),
            FilterType::Past => event.is_past(now),
        }
    }
}

/// One `change_data` call as the board received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChange {
    pub action: UserAction,
    pub update_type: UpdateType,
    pub event: Event,
    pub meta: Option<UpdateMeta>,
}

pub struct TripBoard {
    container: Container,
    document: Document,
    destinations: Option<Rc<DestinationsStore>>,
    offers: Option<Rc<OffersStore>>,
    options: PresenterOptions,

    events: Vec<Event>,
    presenters: Rc<RefCell<Vec<(String, PresenterRef)>>>,
    new_event: Rc<RefCell<NewEventPresenter>>,
    pending: Rc<RefCell<VecDeque<DataChange>>>,
    applied: Vec<DataChange>,

    sort: SortType,
    filter: FilterType,
    cursor: usize,
    clock: fn() -> DateTime<Utc>,
}

impl TripBoard {
    pub fn new(
        container: Container,
        document: Document,
        destinations: Option<Rc<DestinationsStore>>,
        offers: Option<Rc<OffersStore>>,
        options: PresenterOptions,
    ) -> Self {
        let pending: Rc<RefCell<VecDeque<DataChange>>> = Rc::default();
        let new_event = NewEventPresenter::new(
            container.clone(),
            document.clone(),
            destinations.clone(),
            offers.clone(),
            queue_into(&pending),
        );
        Self {
            container,
            document,
            destinations,
            offers,
            options,
            events: Vec::new(),
            presenters: Rc::default(),
            new_event: Rc::new(RefCell::new(new_event)),
            pending,
            applied: Vec::new(),
            sort: SortType::default(),
            filter: FilterType::default(),
            cursor: 0,
            clock: Utc::now,
        }
    }

    /// Replaces the clock used by the past/future filters and new-event defaults.
    pub fn set_clock(&mut self, clock: fn() -> DateTime<Utc>) {
        self.clock = clock;
    }

    pub fn set_events(&mut self, events: Vec<Event>) -> Result<(), RenderError> {
        self.events = events;
        self.render_list()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn sort(&self) -> SortType {
        self.sort
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_sort(&mut self, sort: SortType) -> Result<(), RenderError> {
        self.sort = sort;
        self.render_list()
    }

    pub fn set_filter(&mut self, filter: FilterType) -> Result<(), RenderError> {
        self.filter = filter;
        self.sort = SortType::Day;
        self.render_list()
    }

    /// Events in display order, after filtering.
    pub fn visible_events(&self) -> Vec<Event> {
        let now = (self.clock)();
        let mut visible: Vec<Event> = self
            .events
            .iter()
            .filter(|e| self.filter.keeps(e, now))
            .cloned()
            .collect();
        self.sort.sort(&mut visible);
        visible
    }

    pub fn presenter(&self, id: &str) -> Option<PresenterRef> {
        self.presenters
            .borrow()
            .iter()
            .find(|(pid, _)| pid == id)
            .map(|(_, p)| Rc::clone(p))
    }

    pub fn editing_count(&self) -> usize {
        let editing = self
            .presenters
            .borrow()
            .iter()
            .filter(|(_, p)| p.borrow().mode() == Mode::Editing)
            .count();
        editing + usize::from(self.new_event.borrow().is_open())
    }

    /// Whether the cursor sits on an open form, which then receives every key.
    pub fn is_form_focused(&self) -> bool {
        self.is_form(self.container.node_at(self.cursor))
    }

    pub fn is_new_event_open(&self) -> bool {
        self.new_event.borrow().is_open()
    }

    /// Changes applied since the last call, oldest first.
    pub fn take_changes(&mut self) -> Vec<DataChange> {
        std::mem::take(&mut self.applied)
    }

    pub fn open_new_event(&mut self) -> Result<(), RenderError> {
        self.reset_all()?;
        self.new_event.borrow_mut().init((self.clock)())?;
        self.cursor = 0;
        Ok(())
    }

    /// Puts every presenter back to its summary row.
    pub fn reset_all(&self) -> Result<(), RenderError> {
        let presenters: Vec<PresenterRef> = self
            .presenters
            .borrow()
            .iter()
            .map(|(_, p)| Rc::clone(p))
            .collect();
        for p in presenters {
            p.borrow_mut().reset_view()?;
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: Key) -> Result<(), RenderError> {
        for owner in self.document.listeners() {
            if owner == NewEventPresenter::owner() {
                self.new_event.borrow_mut().handle_document_key(key);
            } else if let Some(p) = self.presenter(&owner) {
                p.borrow_mut().handle_document_key(key)?;
            }
        }

        let focused = self.container.node_at(self.cursor);
        let on_form = self.is_form(focused);
        match key {
            Key::Down => self.move_cursor(1),
            Key::Up if !on_form => self.move_cursor(-1),
            Key::Char('n') if !on_form => self.open_new_event()?,
            Key::Char('s') if !on_form => self.set_sort(self.sort.next())?,
            Key::Char('v') if !on_form => self.set_filter(self.filter.next())?,
            Key::Esc => {}
            _ => {
                let owner = self.owner_of(focused);
                self.dispatch(focused, key)?;
                self.flush()?;
                if let Some(owner) = owner {
                    self.follow(&owner);
                }
            }
        }

        self.flush()?;
        self.move_cursor(0);
        Ok(())
    }

    fn is_form(&self, node: Option<NodeId>) -> bool {
        let Some(node) = node else { return false };
        if self.new_event.borrow().node_id() == Some(node) {
            return true;
        }
        self.presenters
            .borrow()
            .iter()
            .any(|(_, p)| p.borrow().edit_form_id() == Some(node))
    }

    fn owner_of(&self, node: Option<NodeId>) -> Option<String> {
        let node = node?;
        self.presenters
            .borrow()
            .iter()
            .find(|(_, p)| p.borrow().owns_node(node))
            .map(|(id, _)| id.clone())
    }

    fn dispatch(&mut self, node: Option<NodeId>, key: Key) -> Result<(), RenderError> {
        let Some(node) = node else { return Ok(()) };
        if self.new_event.borrow().node_id() == Some(node) {
            self.new_event.borrow_mut().handle_key(key);
            return Ok(());
        }
        let Some(owner) = self.owner_of(Some(node)) else {
            return Ok(());
        };
        if let Some(p) = self.presenter(&owner) {
            p.borrow_mut().handle_key(key)?;
        }
        Ok(())
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.container.len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Moves the cursor to wherever the event's row or form ended up.
    fn follow(&mut self, id: &str) {
        let Some(p) = self.presenter(id) else { return };
        let nodes = {
            let p = p.borrow();
            [p.event_view_id(), p.edit_form_id()]
        };
        if let Some(pos) = nodes
            .into_iter()
            .flatten()
            .find_map(|node| self.container.position(node))
        {
            self.cursor = pos;
        }
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(change) = next else { break };
            self.apply(&change)?;
            self.applied.push(change);
        }
        Ok(())
    }

    fn apply(&mut self, change: &DataChange) -> Result<(), RenderError> {
        let event = &change.event;
        match (change.action, change.update_type) {
            (UserAction::UpdateEvent, UpdateType::Patch) => {
                self.replace_event(event);
                let moves = change.meta.is_some_and(|meta| {
                    self.sort.is_affected_by(&meta)
                        || (!meta.is_date_start_equal && self.filter != FilterType::Everything)
                });
                match self.presenter(&event.id).filter(|_| !moves) {
                    Some(p) => {
                        p.borrow_mut().init(event)?;
                        Ok(())
                    }
                    None => self.render_list(),
                }
            }
            (UserAction::UpdateEvent, _) => {
                self.replace_event(event);
                self.render_list()
            }
            (UserAction::AddEvent, _) => {
                self.events.push(event.clone());
                self.render_list()
            }
            (UserAction::DeleteEvent, _) => {
                self.events.retain(|e| e.id != event.id);
                self.sort = SortType::Day;
                self.render_list()
            }
        }
    }

    fn replace_event(&mut self, updated: &Event) {
        if let Some(slot) = self.events.iter_mut().find(|e| e.id == updated.id) {
            *slot = updated.clone();
        } else {
            log::warn!("Update for unknown event {}", updated.id);
        }
    }

    fn clear_list(&mut self) {
        let presenters = std::mem::take(&mut *self.presenters.borrow_mut());
        for (_, p) in presenters {
            p.borrow_mut().destroy();
        }
    }

    fn render_list(&mut self) -> Result<(), RenderError> {
        self.clear_list();
        for event in self.visible_events() {
            let presenter = Rc::new(RefCell::new(self.make_presenter(&event.id)));
            presenter.borrow_mut().init(&event)?;
            self.presenters.borrow_mut().push((event.id.clone(), presenter));
        }
        log::debug!(
            "Rendered {} of {} events ({:?}, {:?})",
            self.presenters.borrow().len(),
            self.events.len(),
            self.sort,
            self.filter
        );
        self.move_cursor(0);
        Ok(())
    }

    fn make_presenter(&self, id: &str) -> EventPresenter {
        EventPresenter::new(
            self.container.clone(),
            self.document.clone(),
            self.destinations.clone(),
            self.offers.clone(),
            queue_into(&self.pending),
            self.mode_broadcast(id),
            self.options,
        )
    }

    fn mode_broadcast(&self, own_id: &str) -> ChangeMode {
        let registry = Rc::downgrade(&self.presenters);
        let new_event = Rc::downgrade(&self.new_event);
        let own_id = own_id.to_string();
        Box::new(move || {
            if let Some(new_event) = new_event.upgrade() {
                new_event.borrow_mut().destroy();
            }
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let others: Vec<PresenterRef> = registry
                .borrow()
                .iter()
                .filter(|(id, _)| *id != own_id)
                .map(|(_, p)| Rc::clone(p))
                .collect();
            for p in others {
                if let Err(e) = p.borrow_mut().reset_view() {
                    log::warn!("Could not reset sibling of {}: {}", own_id, e);
                }
            }
        })
    }
}

fn queue_into(pending: &Rc<RefCell<VecDeque<DataChange>>>) -> ChangeData {
    let pending = Rc::downgrade(pending);
    Box::new(move |action, update_type, event, meta| {
        if let Some(pending) = pending.upgrade() {
            pending.borrow_mut().push_back(DataChange {
                action,
                update_type,
                event,
                meta,
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Destination;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn event(id: &str, day: u32, hours: i64, price: u32) -> Event {
        let start = Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap();
        Event {
            id: id.into(),
            kind: "bus".into(),
            destination: Destination::named("Oslo"),
            time_start: start,
            time_end: start + Duration::hours(hours),
            price,
            offers: vec![],
            is_favorite: false,
        }
    }

    fn board(events: Vec<Event>) -> TripBoard {
        let mut b = TripBoard::new(
            Container::new(),
            Document::new(),
            None,
            None,
            PresenterOptions::full(),
        );
        b.set_clock(fixed_now);
        b.set_events(events).unwrap();
        b
    }

    fn ids(b: &TripBoard) -> Vec<String> {
        b.visible_events().into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_sorting() {
        let mut b = board(vec![event("a", 3, 1, 50), event("b", 1, 5, 10), event("c", 2, 3, 90)]);
        assert_eq!(ids(&b), vec!["b", "c", "a"]);
        b.set_sort(SortType::Time).unwrap();
        assert_eq!(ids(&b), vec!["b", "c", "a"]);
        b.set_sort(SortType::Price).unwrap();
        assert_eq!(ids(&b), vec!["c", "a", "b"]);
        assert_eq!(b.container().len(), 3);
    }

    #[test]
    fn test_filtering() {
        let mut future = event("f", 1, 1, 1);
        future.time_start = fixed_now() + Duration::days(2);
        future.time_end = future.time_start + Duration::hours(1);
        let mut b = board(vec![event("p", 1, 1, 1), future]);
        b.set_filter(FilterType::Future).unwrap();
        assert_eq!(ids(&b), vec!["f"]);
        b.set_filter(FilterType::Past).unwrap();
        assert_eq!(ids(&b), vec!["p"]);
        assert_eq!(b.container().len(), 1);
    }

    #[test]
    fn test_single_editor_across_rows() {
        let mut b = board(vec![event("a", 1, 1, 1), event("b", 2, 1, 1), event("c", 3, 1, 1)]);
        b.handle_key(Key::Enter).unwrap();
        assert_eq!(b.editing_count(), 1);
        for _ in 0..2 {
            b.handle_key(Key::Down).unwrap();
            b.handle_key(Key::Enter).unwrap();
            assert_eq!(b.editing_count(), 1);
        }
        assert_eq!(
            b.presenter("c").unwrap().borrow().mode(),
            Mode::Editing
        );
        assert_eq!(b.document().listeners(), vec!["c".to_string()]);
    }

    #[test]
    fn test_escape_routes_through_document() {
        let mut b = board(vec![event("a", 1, 1, 1)]);
        b.handle_key(Key::Enter).unwrap();
        b.handle_key(Key::Esc).unwrap();
        assert_eq!(b.editing_count(), 0);
        assert_eq!(b.document().listener_count(), 0);
    }

    #[test]
    fn test_favorite_patches_single_row() {
        let mut b = board(vec![event("a", 1, 1, 1), event("b", 2, 1, 1)]);
        let untouched = b.presenter("b").unwrap();
        b.handle_key(Key::Char('f')).unwrap();
        assert!(b.events().iter().find(|e| e.id == "a").unwrap().is_favorite);
        assert!(Rc::ptr_eq(&untouched, &b.presenter("b").unwrap()));
        let changes = b.take_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].update_type, UpdateType::Patch);
        assert!(b.take_changes().is_empty());
    }

    #[test]
    fn test_delete_removes_row_and_resets_sort() {
        let mut b = board(vec![event("a", 1, 1, 1), event("b", 2, 1, 1)]);
        b.set_sort(SortType::Price).unwrap();
        b.handle_key(Key::Enter).unwrap();
        b.handle_key(Key::Delete).unwrap();
        assert_eq!(ids(&b), vec!["b"]);
        assert_eq!(b.sort(), SortType::Day);
        assert_eq!(b.container().len(), 1);
        assert_eq!(b.editing_count(), 0);
        assert_eq!(b.document().listener_count(), 0);
    }

    #[test]
    fn test_new_event_closes_when_row_edited() {
        let mut b = board(vec![event("a", 1, 1, 1)]);
        b.handle_key(Key::Char('n')).unwrap();
        assert!(b.is_new_event_open());
        assert_eq!(b.container().len(), 2);
        b.handle_key(Key::Down).unwrap();
        b.handle_key(Key::Enter).unwrap();
        assert!(!b.is_new_event_open());
        assert_eq!(b.editing_count(), 1);
        assert_eq!(b.container().len(), 1);
    }

    #[test]
    fn test_new_event_resets_open_row() {
        let mut b = board(vec![event("a", 1, 1, 1)]);
        b.handle_key(Key::Enter).unwrap();
        b.open_new_event().unwrap();
        assert_eq!(b.presenter("a").unwrap().borrow().mode(), Mode::Default);
        assert_eq!(b.editing_count(), 1);
        assert_eq!(b.cursor(), 0);
    }
}
