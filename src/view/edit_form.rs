// File: ./src/view/edit_form.rs
use crate::dom::{Element, Key, NodeId};
use crate::model::{Destination, EVENT_TYPES, Event, Offer};
use crate::store::{DestinationsStore, OffersStore};
use crate::view::format::{FORM_DATE_FORMAT, format_form_date, type_color};
use chrono::{DateTime, NaiveDateTime, Utc};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSignal {
    CloseClick,
    Submit(Event),
    DeleteClick(Event),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Type,
    Destination,
    Start,
    End,
    Price,
    Offers,
}

/// Highest base price the form accepts.
pub const MAX_PRICE: u32 = 1_000_000;

const FIELDS: [Field; 6] = [
    Field::Type,
    Field::Destination,
    Field::Start,
    Field::End,
    Field::Price,
    Field::Offers,
];

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Type => "Type",
            Field::Destination => "Destination",
            Field::Start => "From",
            Field::End => "To",
            Field::Price => "Price, €",
            Field::Offers => "Offers",
        }
    }

    fn step(self, forward: bool) -> Field {
        let pos = FIELDS.iter().position(|f| *f == self).unwrap_or(0);
        let len = FIELDS.len();
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        FIELDS[next]
    }
}

#[derive(Debug, Clone)]
struct Draft {
    kind: String,
    destination: String,
    time_start: String,
    time_end: String,
    price: String,
    selected_offers: Vec<String>,
    focus: Field,
    offer_cursor: usize,
    error: Option<String>,
}

impl Draft {
    fn from_event(event: &Event) -> Self {
        Self {
            kind: event.kind.clone(),
            destination: event.destination.name.clone(),
            time_start: format_form_date(event.time_start),
            time_end: format_form_date(event.time_end),
            price: event.price.to_string(),
            selected_offers: event.offers.iter().map(|o| o.kind.clone()).collect(),
            focus: Field::Type,
            offer_cursor: 0,
            error: None,
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Destination => Some(&mut self.destination),
            Field::Start => Some(&mut self.time_start),
            Field::End => Some(&mut self.time_end),
            Field::Price => Some(&mut self.price),
            Field::Type | Field::Offers => None,
        }
    }
}

/// Editable form for one event. Field values live in a draft that only turns into an
/// [`Event`] on submit.
pub struct EditFormView {
    id: NodeId,
    original: Event,
    destinations: Option<Rc<DestinationsStore>>,
    offers: Option<Rc<OffersStore>>,
    is_editing_existing: bool,
    draft: RefCell<Draft>,
}

impl EditFormView {
    pub fn new(
        event: &Event,
        destinations: Option<Rc<DestinationsStore>>,
        offers: Option<Rc<OffersStore>>,
        is_editing_existing: bool,
    ) -> Self {
        Self {
            id: NodeId::next(),
            original: event.clone(),
            destinations,
            offers,
            is_editing_existing,
            draft: RefCell::new(Draft::from_event(event)),
        }
    }

    pub fn original(&self) -> &Event {
        &self.original
    }

    pub fn is_editing_existing(&self) -> bool {
        self.is_editing_existing
    }

    /// Puts every field back to the values of `event`, without remounting.
    pub fn reset(&self, event: &Event) {
        *self.draft.borrow_mut() = Draft::from_event(event);
    }

    pub fn focus(&self) -> Field {
        self.draft.borrow().focus
    }

    pub fn field_value(&self, field: Field) -> String {
        let draft = self.draft.borrow();
        match field {
            Field::Type => draft.kind.clone(),
            Field::Destination => draft.destination.clone(),
            Field::Start => draft.time_start.clone(),
            Field::End => draft.time_end.clone(),
            Field::Price => draft.price.clone(),
            Field::Offers => draft.selected_offers.join(","),
        }
    }

    pub fn is_offer_selected(&self, kind: &str) -> bool {
        self.draft.borrow().selected_offers.iter().any(|k| k == kind)
    }

    pub fn error(&self) -> Option<String> {
        self.draft.borrow().error.clone()
    }

    fn available_offers(&self) -> Vec<Offer> {
        self.offers
            .as_ref()
            .map(|store| store.get_offers().iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn handle_key(&self, key: Key) -> Option<FormSignal> {
        match key {
            Key::Up => {
                return self
                    .is_editing_existing
                    .then_some(FormSignal::CloseClick);
            }
            Key::Delete => return Some(FormSignal::DeleteClick(self.original.clone())),
            Key::Enter => return self.submit(),
            _ => {}
        }

        let available = self.available_offers();
        let mut draft = self.draft.borrow_mut();
        match (draft.focus, key) {
            (_, Key::Tab) => draft.focus = draft.focus.step(true),
            (_, Key::BackTab) => draft.focus = draft.focus.step(false),
            (Field::Type, Key::Left | Key::Right) => {
                let pos = EVENT_TYPES
                    .iter()
                    .position(|t| *t == draft.kind)
                    .unwrap_or(0);
                let len = EVENT_TYPES.len();
                let next = if key == Key::Right {
                    (pos + 1) % len
                } else {
                    (pos + len - 1) % len
                };
                draft.kind = EVENT_TYPES[next].to_string();
            }
            (Field::Offers, Key::Left) => draft.offer_cursor = draft.offer_cursor.saturating_sub(1),
            (Field::Offers, Key::Right) => {
                if draft.offer_cursor + 1 < available.len() {
                    draft.offer_cursor += 1;
                }
            }
            (Field::Offers, Key::Char(' ')) => {
                if let Some(offer) = available.get(draft.offer_cursor) {
                    if let Some(pos) = draft.selected_offers.iter().position(|k| *k == offer.kind)
                    {
                        draft.selected_offers.remove(pos);
                    } else {
                        draft.selected_offers.push(offer.kind.clone());
                    }
                }
            }
            (Field::Price, Key::Char(c)) if !c.is_ascii_digit() => {}
            (_, Key::Char(c)) => {
                if let Some(text) = draft.text_mut() {
                    text.push(c);
                }
            }
            (_, Key::Backspace) => {
                if let Some(text) = draft.text_mut() {
                    text.pop();
                }
            }
            _ => return None,
        }
        draft.error = None;
        None
    }

    fn submit(&self) -> Option<FormSignal> {
        let built = self.build_event(&self.draft.borrow());
        match built {
            Ok(event) => Some(FormSignal::Submit(event)),
            Err(msg) => {
                self.draft.borrow_mut().error = Some(msg);
                None
            }
        }
    }

    fn build_event(&self, draft: &Draft) -> Result<Event, String> {
        let time_start = draft_date(&draft.time_start, self.original.time_start)
            .ok_or_else(|| format!("Start must look like {}", example_date()))?;
        let time_end = draft_date(&draft.time_end, self.original.time_end)
            .ok_or_else(|| format!("End must look like {}", example_date()))?;
        if time_start > time_end {
            return Err("The leg cannot end before it starts".to_string());
        }

        let price = draft
            .price
            .trim()
            .parse::<u32>()
            .map_err(|_| "Price must be a whole, non-negative number".to_string())?;
        if price > MAX_PRICE {
            return Err(format!("Price cannot exceed {}", MAX_PRICE));
        }

        let name = draft.destination.trim();
        let destination = match &self.destinations {
            Some(store) => store
                .get_destinations()
                .get(name)
                .cloned()
                .ok_or_else(|| format!("Unknown destination '{}'", name))?,
            None if name.is_empty() => return Err("Destination is required".to_string()),
            None if name == self.original.destination.name => self.original.destination.clone(),
            None => Destination::named(name),
        };

        let offers = match &self.offers {
            Some(store) => store
                .get_offers()
                .iter()
                .filter(|o| draft.selected_offers.contains(&o.kind))
                .map(|o| {
                    self.original
                        .offers
                        .iter()
                        .find(|prev| prev.kind == o.kind)
                        .unwrap_or(o)
                        .clone()
                })
                .collect(),
            None => self.original.offers.clone(),
        };

        Ok(Event {
            id: self.original.id.clone(),
            kind: draft.kind.clone(),
            destination,
            time_start,
            time_end,
            price,
            offers,
            is_favorite: self.original.is_favorite,
        })
    }

    fn field_line(&self, draft: &Draft, field: Field, value: Vec<Span<'static>>) -> Line<'static> {
        let active = draft.focus == field;
        let label_style = if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let marker = if active { " > " } else { "   " };
        let mut spans = vec![Span::styled(
            format!("{}{:<13}", marker, format!("{}:", field.label())),
            label_style,
        )];
        spans.extend(value);
        if active && !matches!(field, Field::Type | Field::Offers) {
            spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    }
}

/// The form shows minutes only; an untouched field keeps the stored instant.
fn draft_date(raw: &str, original: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if raw.trim() == format_form_date(original) {
        return Some(original);
    }
    parse_form_date(raw)
}

fn parse_form_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), FORM_DATE_FORMAT)
        .ok()
        .map(|n| n.and_utc())
}

fn example_date() -> String {
    format_form_date(Utc::now())
}

impl Element for EditFormView {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn lines(&self, _focused: bool) -> Vec<Line<'static>> {
        let draft = self.draft.borrow();
        let title = if self.is_editing_existing {
            format!(" ┌ Edit: {} → {}", self.original.kind, self.original.destination.name)
        } else {
            " ┌ New event".to_string()
        };
        let mut lines = vec![Line::from(Span::styled(
            title,
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ))];

        lines.push(self.field_line(
            &draft,
            Field::Type,
            vec![Span::styled(
                format!("< {} >", draft.kind),
                Style::default().fg(type_color(&draft.kind)),
            )],
        ));
        for (field, value) in [
            (Field::Destination, &draft.destination),
            (Field::Start, &draft.time_start),
            (Field::End, &draft.time_end),
            (Field::Price, &draft.price),
        ] {
            lines.push(self.field_line(&draft, field, vec![Span::raw(value.clone())]));
        }

        let available = self.available_offers();
        if !available.is_empty() {
            let offer_spans = available
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    let check = if draft.selected_offers.contains(&o.kind) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    let style = if draft.focus == Field::Offers && draft.offer_cursor == i {
                        Style::default().bg(Color::Blue)
                    } else {
                        Style::default()
                    };
                    Span::styled(format!("{} {} +€{}  ", check, o.title, o.price), style)
                })
                .collect();
            lines.push(self.field_line(&draft, Field::Offers, offer_spans));
        }

        if let Some(store) = &self.destinations {
            if let Some(dest) = store.get_destinations().get(draft.destination.trim()) {
                if !dest.description.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("   {}", dest.description),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }

        if let Some(err) = &draft.error {
            lines.push(Line::from(Span::styled(
                format!("   ! {}", err),
                Style::default().fg(Color::Red),
            )));
        }

        let buttons = if self.is_editing_existing {
            " └ Enter:Save  Del:Delete  ↑:Close  Esc:Cancel"
        } else {
            " └ Enter:Save  Del:Cancel  Esc:Cancel"
        };
        lines.push(Line::from(Span::styled(
            buttons,
            Style::default().fg(Color::DarkGray),
        )));
        lines
    }
}
