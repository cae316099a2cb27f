// File: ./src/presenter/new_event.rs
use crate::dom::{Container, Document, Element, Key, KeyListener, NodeId, RenderError, RenderPosition};
use crate::model::{Event, UpdateType, UserAction};
use crate::presenter::event::ChangeData;
use crate::store::{DestinationsStore, OffersStore};
use crate::view::{EditFormView, FormSignal};
use chrono::{DateTime, Utc};
use std::rc::Rc;

const OWNER: &str = "new-event";

/// Shows a blank form at the top of the list and turns its submit into an `AddEvent`.
pub struct NewEventPresenter {
    container: Container,
    document: Document,
    destinations: Option<Rc<DestinationsStore>>,
    offers: Option<Rc<OffersStore>>,
    change_data: ChangeData,
    form: Option<Rc<EditFormView>>,
    listener: Option<KeyListener>,
}

impl NewEventPresenter {
    pub fn new(
        container: Container,
        document: Document,
        destinations: Option<Rc<DestinationsStore>>,
        offers: Option<Rc<OffersStore>>,
        change_data: ChangeData,
    ) -> Self {
        Self {
            container,
            document,
            destinations,
            offers,
            change_data,
            form: None,
            listener: None,
        }
    }

    pub fn init(&mut self, now: DateTime<Utc>) -> Result<(), RenderError> {
        if self.form.is_some() {
            return Ok(());
        }
        let form = Rc::new(EditFormView::new(
            &Event::blank(now),
            self.destinations.clone(),
            self.offers.clone(),
            false,
        ));
        self.container
            .render(Rc::clone(&form) as Rc<dyn Element>, RenderPosition::Prepend)?;
        self.form = Some(form);
        self.listener = Some(self.document.add_key_listener(OWNER));
        Ok(())
    }

    pub fn destroy(&mut self) {
        if let Some(form) = self.form.take() {
            self.container.remove(form.node_id());
        }
        self.listener = None;
    }

    pub fn is_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn node_id(&self) -> Option<NodeId> {
        self.form.as_ref().map(|f| f.node_id())
    }

    pub fn form(&self) -> Option<Rc<EditFormView>> {
        self.form.clone()
    }

    pub fn owner() -> &'static str {
        OWNER
    }

    pub fn handle_key(&mut self, key: Key) {
        let signal = self.form.as_ref().and_then(|f| f.handle_key(key));
        match signal {
            Some(FormSignal::Submit(event)) => {
                log::info!("Event {} added", event.id);
                (self.change_data)(UserAction::AddEvent, UpdateType::Minor, event, None);
                self.destroy();
            }
            Some(FormSignal::DeleteClick(_)) | Some(FormSignal::CloseClick) => self.destroy(),
            None => {}
        }
    }

    pub fn handle_document_key(&mut self, key: Key) {
        if self.listener.is_some() && key == Key::Esc {
            self.destroy();
        }
    }
}
