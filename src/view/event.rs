// File: ./src/view/event.rs
use crate::dom::{Element, Key, NodeId};
use crate::model::Event;
use crate::view::format::{format_day, format_duration, format_time, type_color};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSignal {
    EditClick,
    FavoriteClick,
}

/// Read-only summary row for one event.
pub struct EventView {
    id: NodeId,
    event: Event,
}

impl EventView {
    pub fn new(event: &Event) -> Self {
        Self {
            id: NodeId::next(),
            event: event.clone(),
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn handle_key(&self, key: Key) -> Option<EventSignal> {
        match key {
            Key::Enter | Key::Char('e') => Some(EventSignal::EditClick),
            Key::Char('f') => Some(EventSignal::FavoriteClick),
            _ => None,
        }
    }
}

impl Element for EventView {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn lines(&self, focused: bool) -> Vec<Line<'static>> {
        let e = &self.event;
        let base = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let marker = if focused { "> " } else { "  " };

        let star = if e.is_favorite {
            Span::styled(" ★", Style::default().fg(Color::Yellow))
        } else {
            Span::styled(" ☆", Style::default().fg(Color::DarkGray))
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(marker, base),
            Span::styled(format!("{:<7}", format_day(e.time_start)), base.fg(Color::DarkGray)),
            Span::styled(format!("{:<12}", e.kind), base.fg(type_color(&e.kind))),
            Span::styled(format!("{:<16}", e.destination.name), base),
            Span::styled(
                format!(
                    "{} — {}  ",
                    format_time(e.time_start),
                    format_time(e.time_end)
                ),
                base,
            ),
            Span::styled(
                format!("{:<12}", format_duration(e.duration())),
                base.fg(Color::DarkGray),
            ),
            Span::styled(format!("€{}", e.price), base),
            star,
        ])];

        for offer in &e.offers {
            lines.push(Line::from(Span::styled(
                format!("         + {} +€{}", offer.title, offer.price),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }
}
