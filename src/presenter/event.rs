// File: ./src/presenter/event.rs
use crate::dom::{Container, Document, Element, Key, KeyListener, NodeId, RenderError, RenderPosition};
use crate::model::{Event, UpdateMeta, UpdateType, UserAction};
use crate::store::{DestinationsStore, OffersStore};
use crate::view::{EditFormView, EventSignal, EventView, FormSignal};
use std::rc::Rc;

/// Receives every data change a presenter wants applied: what happened, how significant it
/// is, the new event value, and for edits which sort keys survived.
pub type ChangeData = Box<dyn FnMut(UserAction, UpdateType, Event, Option<UpdateMeta>)>;

/// Asks the owner to put every sibling presenter back into [`Mode::Default`].
pub type ChangeMode = Box<dyn FnMut()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Default,
    Editing,
}

/// What Escape does to a form that holds unsaved edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeBehavior {
    /// Put the form back to the stored event, then close it.
    ResetForm,
    /// Close the form and leave its fields as typed until the next `init`.
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterOptions {
    pub escape: EscapeBehavior,
    /// When off, every submitted edit is reported as a `Patch` without meta.
    pub classify_updates: bool,
}

impl PresenterOptions {
    pub fn full() -> Self {
        Self {
            escape: EscapeBehavior::ResetForm,
            classify_updates: true,
        }
    }

    pub fn simple() -> Self {
        Self {
            escape: EscapeBehavior::Immediate,
            classify_updates: false,
        }
    }
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// Decides how much of the list an edit invalidates.
///
/// Price, offers total, destination and end time feed grouping and ordering, so a change to any
/// of them is `Minor`. Anything else is a `Patch` that only needs the row redrawn.
pub fn classify_update(original: &Event, submitted: &Event) -> (UpdateType, UpdateMeta) {
    let meta = UpdateMeta::between(original, submitted);
    let is_offers_price_equal = original.offers_total() == submitted.offers_total();
    let is_destination_equal = original.destination.is_same(&submitted.destination);
    let is_date_end_equal = original.time_end == submitted.time_end;

    let is_minor = !meta.is_price_equal
        || !is_offers_price_equal
        || !is_destination_equal
        || !is_date_end_equal;

    let update_type = if is_minor {
        UpdateType::Minor
    } else {
        UpdateType::Patch
    };
    (update_type, meta)
}

/// Owns one event's summary row and edit form and switches between them.
pub struct EventPresenter {
    container: Container,
    document: Document,
    destinations: Option<Rc<DestinationsStore>>,
    offers: Option<Rc<OffersStore>>,
    change_data: ChangeData,
    change_mode: ChangeMode,
    options: PresenterOptions,

    event: Option<Event>,
    mode: Mode,
    event_view: Option<Rc<EventView>>,
    edit_form: Option<Rc<EditFormView>>,
    listener: Option<KeyListener>,
}

impl EventPresenter {
    pub fn new(
        container: Container,
        document: Document,
        destinations: Option<Rc<DestinationsStore>>,
        offers: Option<Rc<OffersStore>>,
        change_data: ChangeData,
        change_mode: ChangeMode,
        options: PresenterOptions,
    ) -> Self {
        Self {
            container,
            document,
            destinations,
            offers,
            change_data,
            change_mode,
            options,
            event: None,
            mode: Mode::Default,
            event_view: None,
            edit_form: None,
            listener: None,
        }
    }

    pub fn init(&mut self, event: &Event) -> Result<(), RenderError> {
        let prev_view = self.event_view.take();
        let prev_form = self.edit_form.take();

        let view = Rc::new(EventView::new(event));
        let form = Rc::new(EditFormView::new(
            event,
            self.destinations.clone(),
            self.offers.clone(),
            true,
        ));
        self.event = Some(event.clone());
        self.event_view = Some(Rc::clone(&view));
        self.edit_form = Some(Rc::clone(&form));

        let (prev_view, prev_form) = match (prev_view, prev_form) {
            (Some(v), Some(f)) => (v, f),
            _ => return self.container.render(view, RenderPosition::Append),
        };

        if self.container.contains(prev_view.node_id()) {
            self.container.replace(view, prev_view.node_id())?;
        }
        if self.container.contains(prev_form.node_id()) {
            self.container.replace(form, prev_form.node_id())?;
        }
        self.container.remove(prev_view.node_id());
        self.container.remove(prev_form.node_id());
        Ok(())
    }

    pub fn destroy(&mut self) {
        if let Some(view) = self.event_view.take() {
            self.container.remove(view.node_id());
        }
        if let Some(form) = self.edit_form.take() {
            self.container.remove(form.node_id());
        }
        self.listener = None;
        self.mode = Mode::Default;
    }

    pub fn reset_view(&mut self) -> Result<(), RenderError> {
        if self.mode != Mode::Default {
            self.replace_form_to_event()?;
        }
        Ok(())
    }

    /// Opens the edit form as if its edit button had been pressed.
    pub fn open_editor(&mut self) -> Result<(), RenderError> {
        if self.mode == Mode::Editing {
            return Ok(());
        }
        self.replace_event_to_form()
    }

    /// Feeds a key to whichever view is currently shown.
    pub fn handle_key(&mut self, key: Key) -> Result<(), RenderError> {
        match self.mode {
            Mode::Default => {
                let signal = self.event_view.as_ref().and_then(|v| v.handle_key(key));
                match signal {
                    Some(EventSignal::EditClick) => self.replace_event_to_form(),
                    Some(EventSignal::FavoriteClick) => {
                        self.handle_favorite_click();
                        Ok(())
                    }
                    None => Ok(()),
                }
            }
            Mode::Editing => {
                let signal = self.edit_form.as_ref().and_then(|f| f.handle_key(key));
                match signal {
                    Some(FormSignal::CloseClick) => self.replace_form_to_event(),
                    Some(FormSignal::Submit(submitted)) => self.handle_submit(submitted),
                    Some(FormSignal::DeleteClick(event)) => {
                        self.handle_delete_click(event);
                        Ok(())
                    }
                    None => Ok(()),
                }
            }
        }
    }

    /// Keys delivered through the document listener held while editing.
    pub fn handle_document_key(&mut self, key: Key) -> Result<(), RenderError> {
        if self.listener.is_none() || key != Key::Esc {
            return Ok(());
        }
        if self.options.escape == EscapeBehavior::ResetForm {
            if let (Some(form), Some(event)) = (&self.edit_form, &self.event) {
                form.reset(event);
            }
        }
        self.replace_form_to_event()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn edit_form(&self) -> Option<Rc<EditFormView>> {
        self.edit_form.clone()
    }

    pub fn event_view_id(&self) -> Option<NodeId> {
        self.event_view.as_ref().map(|v| v.node_id())
    }

    pub fn edit_form_id(&self) -> Option<NodeId> {
        self.edit_form.as_ref().map(|f| f.node_id())
    }

    pub fn owns_node(&self, id: NodeId) -> bool {
        self.event_view_id() == Some(id) || self.edit_form_id() == Some(id)
    }

    /// Whether the Escape listener is currently registered on the document.
    pub fn holds_key_listener(&self) -> bool {
        self.listener.is_some()
    }

    fn replace_event_to_form(&mut self) -> Result<(), RenderError> {
        let (Some(view), Some(form)) = (&self.event_view, &self.edit_form) else {
            return Ok(());
        };
        self.container
            .replace(Rc::clone(form) as Rc<dyn Element>, view.node_id())?;
        let owner = self.event.as_ref().map(|e| e.id.as_str()).unwrap_or_default();
        self.listener = Some(self.document.add_key_listener(owner));
        (self.change_mode)();
        self.mode = Mode::Editing;
        log::debug!("Event {} opened for editing", owner);
        Ok(())
    }

    fn replace_form_to_event(&mut self) -> Result<(), RenderError> {
        if let (Some(view), Some(form)) = (&self.event_view, &self.edit_form) {
            self.container
                .replace(Rc::clone(view) as Rc<dyn Element>, form.node_id())?;
        }
        self.listener = None;
        self.mode = Mode::Default;
        Ok(())
    }

    fn handle_submit(&mut self, submitted: Event) -> Result<(), RenderError> {
        let Some(original) = &self.event else {
            return self.replace_form_to_event();
        };
        if self.options.classify_updates {
            let (update_type, meta) = classify_update(original, &submitted);
            log::info!("Event {} updated ({:?})", submitted.id, update_type);
            (self.change_data)(UserAction::UpdateEvent, update_type, submitted, Some(meta));
        } else {
            (self.change_data)(UserAction::UpdateEvent, UpdateType::Patch, submitted, None);
        }
        self.replace_form_to_event()
    }

    fn handle_delete_click(&mut self, event: Event) {
        log::info!("Event {} deleted", event.id);
        (self.change_data)(UserAction::DeleteEvent, UpdateType::Major, event, None);
    }

    fn handle_favorite_click(&mut self) {
        if let Some(event) = &self.event {
            (self.change_data)(
                UserAction::UpdateEvent,
                UpdateType::Patch,
                event.with_favorite_toggled(),
                None,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Destination, Offer};
    use crate::view::Field;
    use chrono::{Duration, TimeZone, Utc};
    use std::cell::{Cell, RefCell};

    type Calls = Rc<RefCell<Vec<(UserAction, UpdateType, Event, Option<UpdateMeta>)>>>;

    struct Harness {
        container: Container,
        document: Document,
        calls: Calls,
        mode_changes: Rc<Cell<usize>>,
        presenter: EventPresenter,
    }

    fn harness(options: PresenterOptions) -> Harness {
        let container = Container::new();
        let document = Document::new();
        let calls: Calls = Rc::default();
        let mode_changes = Rc::new(Cell::new(0));

        let sink = Rc::clone(&calls);
        let counter = Rc::clone(&mode_changes);
        let presenter = EventPresenter::new(
            container.clone(),
            document.clone(),
            None,
            None,
            Box::new(move |a, u, e, m| sink.borrow_mut().push((a, u, e, m))),
            Box::new(move || counter.set(counter.get() + 1)),
            options,
        );
        Harness {
            container,
            document,
            calls,
            mode_changes,
            presenter,
        }
    }

    fn sample() -> Event {
        Event {
            id: "e1".into(),
            kind: "taxi".into(),
            destination: Destination::named("Paris"),
            time_start: Utc.with_ymd_and_hms(2024, 3, 18, 10, 0, 0).unwrap(),
            time_end: Utc.with_ymd_and_hms(2024, 3, 18, 12, 0, 0).unwrap(),
            price: 100,
            offers: vec![Offer {
                kind: "luggage".into(),
                title: "Add luggage".into(),
                price: 10,
            }],
            is_favorite: false,
        }
    }

    fn type_price(form: &EditFormView, digits: &str) {
        while form.focus() != Field::Price {
            form.handle_key(Key::Tab);
        }
        for _ in 0..form.field_value(Field::Price).len() {
            form.handle_key(Key::Backspace);
        }
        for c in digits.chars() {
            form.handle_key(Key::Char(c));
        }
    }

    #[test]
    fn test_first_init_mounts_summary() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        assert_eq!(h.container.len(), 1);
        assert!(h.container.contains(h.presenter.event_view_id().unwrap()));
        assert!(!h.container.contains(h.presenter.edit_form_id().unwrap()));
        assert_eq!(h.presenter.mode(), Mode::Default);
    }

    #[test]
    fn test_destroy_detaches_everything_and_is_idempotent() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.open_editor().unwrap();
        h.presenter.destroy();
        h.presenter.destroy();
        assert!(h.container.is_empty());
        assert_eq!(h.document.listener_count(), 0);
        assert_eq!(h.presenter.mode(), Mode::Default);
    }

    #[test]
    fn test_edit_click_swaps_in_form_and_notifies() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.handle_key(Key::Enter).unwrap();
        assert_eq!(h.presenter.mode(), Mode::Editing);
        assert!(h.container.contains(h.presenter.edit_form_id().unwrap()));
        assert_eq!(h.container.len(), 1);
        assert_eq!(h.mode_changes.get(), 1);
        assert_eq!(h.document.listeners(), vec!["e1".to_string()]);
    }

    #[test]
    fn test_close_click_returns_to_summary() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.handle_key(Key::Enter).unwrap();
        h.presenter.handle_key(Key::Up).unwrap();
        assert_eq!(h.presenter.mode(), Mode::Default);
        assert!(h.container.contains(h.presenter.event_view_id().unwrap()));
        assert_eq!(h.document.listener_count(), 0);
        assert!(h.calls.borrow().is_empty());
    }

    #[test]
    fn test_reset_view_twice_is_quiet() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.open_editor().unwrap();
        h.presenter.reset_view().unwrap();
        let mutations = h.container.mutation_count();
        let notified = h.mode_changes.get();
        h.presenter.reset_view().unwrap();
        h.presenter.reset_view().unwrap();
        assert_eq!(h.container.mutation_count(), mutations);
        assert_eq!(h.mode_changes.get(), notified);
        assert_eq!(h.document.listener_count(), 0);
    }

    #[test]
    fn test_price_change_is_minor() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.handle_key(Key::Enter).unwrap();
        type_price(&h.presenter.edit_form().unwrap(), "150");
        h.presenter.handle_key(Key::Enter).unwrap();

        let calls = h.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (action, update_type, event, meta) = &calls[0];
        assert_eq!(*action, UserAction::UpdateEvent);
        assert_eq!(*update_type, UpdateType::Minor);
        assert_eq!(event.price, 150);
        assert!(!meta.unwrap().is_price_equal);
        assert_eq!(h.presenter.mode(), Mode::Default);
    }

    #[test]
    fn test_cosmetic_change_is_patch() {
        let original = sample();
        let mut submitted = original.clone();
        submitted.kind = "bus".into();
        let (update_type, meta) = classify_update(&original, &submitted);
        assert_eq!(update_type, UpdateType::Patch);
        assert!(meta.is_date_start_equal && meta.is_duration_equal && meta.is_price_equal);
    }

    #[test]
    fn test_classification_fields() {
        let original = sample();

        let mut moved_start = original.clone();
        moved_start.time_start -= Duration::hours(1);
        let (t, meta) = classify_update(&original, &moved_start);
        assert_eq!(t, UpdateType::Patch);
        assert!(!meta.is_date_start_equal);
        assert!(!meta.is_duration_equal);

        let mut moved_end = original.clone();
        moved_end.time_end += Duration::hours(1);
        assert_eq!(classify_update(&original, &moved_end).0, UpdateType::Minor);

        let mut other_place = original.clone();
        other_place.destination = Destination::named("Rome");
        assert_eq!(classify_update(&original, &other_place).0, UpdateType::Minor);

        let mut pricier_offers = original.clone();
        pricier_offers.offers[0].price = 20;
        assert_eq!(classify_update(&original, &pricier_offers).0, UpdateType::Minor);
    }

    #[test]
    fn test_simple_variant_always_patches() {
        let mut h = harness(PresenterOptions::simple());
        h.presenter.init(&sample()).unwrap();
        h.presenter.handle_key(Key::Enter).unwrap();
        type_price(&h.presenter.edit_form().unwrap(), "999");
        h.presenter.handle_key(Key::Enter).unwrap();
        let calls = h.calls.borrow();
        assert_eq!(calls[0].1, UpdateType::Patch);
        assert!(calls[0].3.is_none());
    }

    #[test]
    fn test_escape_discards_edits() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.handle_key(Key::Enter).unwrap();
        let form = h.presenter.edit_form().unwrap();
        type_price(&form, "777");

        h.presenter.handle_document_key(Key::Esc).unwrap();

        assert_eq!(h.presenter.mode(), Mode::Default);
        assert_eq!(form.field_value(Field::Price), "100");
        let shown = h.container.nodes()[0]
            .lines(false)
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect::<String>();
        assert!(shown.contains("€100"));
        assert!(!shown.contains("777"));
        assert!(h.calls.borrow().is_empty());
        assert_eq!(h.document.listener_count(), 0);
    }

    #[test]
    fn test_escape_without_reset_keeps_draft() {
        let mut h = harness(PresenterOptions::simple());
        h.presenter.init(&sample()).unwrap();
        h.presenter.open_editor().unwrap();
        let form = h.presenter.edit_form().unwrap();
        type_price(&form, "777");
        h.presenter.handle_document_key(Key::Esc).unwrap();
        assert_eq!(h.presenter.mode(), Mode::Default);
        assert_eq!(form.field_value(Field::Price), "777");
    }

    #[test]
    fn test_document_keys_ignored_without_listener() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        let mutations = h.container.mutation_count();
        h.presenter.handle_document_key(Key::Esc).unwrap();
        assert_eq!(h.container.mutation_count(), mutations);
    }

    #[test]
    fn test_delete_forwards_major_without_transition() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.handle_key(Key::Enter).unwrap();
        h.presenter.handle_key(Key::Delete).unwrap();

        let calls = h.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            (UserAction::DeleteEvent, UpdateType::Major, sample(), None)
        );
        assert_eq!(h.presenter.mode(), Mode::Editing);
    }

    #[test]
    fn test_favorite_click_forwards_flipped_copy() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.handle_key(Key::Char('f')).unwrap();
        let calls = h.calls.borrow();
        assert_eq!(calls[0].0, UserAction::UpdateEvent);
        assert_eq!(calls[0].1, UpdateType::Patch);
        assert!(calls[0].2.is_favorite);
        assert!(!h.presenter.event().unwrap().is_favorite);
        assert_eq!(h.presenter.mode(), Mode::Default);
    }

    #[test]
    fn test_reinit_in_default_replaces_summary_once() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        let old = h.presenter.event_view_id().unwrap();
        let before = h.container.nodes()[0].lines(false);

        h.presenter.init(&sample()).unwrap();

        let new = h.presenter.event_view_id().unwrap();
        assert_ne!(old, new);
        assert_eq!(h.container.len(), 1);
        assert!(h.container.contains(new));
        assert_eq!(h.container.detach_count(old), 1);
        assert_eq!(h.container.nodes()[0].lines(false), before);
    }

    #[test]
    fn test_reinit_while_editing_keeps_form_visible() {
        let mut h = harness(PresenterOptions::full());
        h.presenter.init(&sample()).unwrap();
        h.presenter.open_editor().unwrap();
        let old_form = h.presenter.edit_form_id().unwrap();

        let mut updated = sample();
        updated.price = 300;
        h.presenter.init(&updated).unwrap();

        assert_eq!(h.presenter.mode(), Mode::Editing);
        assert_eq!(h.container.len(), 1);
        assert!(h.container.contains(h.presenter.edit_form_id().unwrap()));
        assert_eq!(h.container.detach_count(old_form), 1);
        assert_eq!(h.presenter.edit_form().unwrap().field_value(Field::Price), "300");
    }
}
