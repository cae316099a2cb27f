// File: ./src/model/item.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every event type the form lets the user pick from, in display order.
pub const EVENT_TYPES: [&str; 10] = [
    "taxi",
    "bus",
    "train",
    "ship",
    "transport",
    "drive",
    "flight",
    "check-in",
    "sightseeing",
    "restaurant",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub kind: String,
    pub title: String,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub src: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub description: String,
    pub pictures: Vec<Picture>,
}

impl Destination {
    /// A destination known only by name (no description, no pictures).
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Destinations are references into the reference-data store, so two values denote the
    /// same place when their names match.
    pub fn is_same(&self, other: &Destination) -> bool {
        self.name == other.name
    }
}

/// One leg of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub kind: String,
    pub destination: Destination,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub price: u32,
    pub offers: Vec<Offer>,
    pub is_favorite: bool,
}

impl Event {
    /// A fresh event for the "new event" form, starting and ending now.
    pub fn blank(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: EVENT_TYPES[0].to_string(),
            destination: Destination::default(),
            time_start: now,
            time_end: now,
            price: 0,
            offers: Vec::new(),
            is_favorite: false,
        }
    }

    pub fn duration(&self) -> Duration {
        self.time_end - self.time_start
    }

    pub fn offers_total(&self) -> u64 {
        self.offers.iter().map(|o| u64::from(o.price)).sum()
    }

    /// Price of the leg including every selected offer.
    pub fn total_price(&self) -> u64 {
        u64::from(self.price).saturating_add(self.offers_total())
    }

    pub fn has_offer(&self, kind: &str) -> bool {
        self.offers.iter().any(|o| o.kind == kind)
    }

    pub fn with_favorite_toggled(&self) -> Event {
        Event {
            is_favorite: !self.is_favorite,
            ..self.clone()
        }
    }

    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        self.time_start > now
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.time_end < now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    UpdateEvent,
    DeleteEvent,
    AddEvent,
}

/// How much re-derivation a change requires from the list owner, in ascending severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UpdateType {
    /// Cosmetic: re-render the one row.
    Patch,
    /// Affects ordering or filtering: re-sort and re-filter the list.
    Minor,
    /// Structural: rebuild the whole list.
    Major,
}

/// Which sort-relevant fields survived an edit unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateMeta {
    pub is_date_start_equal: bool,
    pub is_duration_equal: bool,
    pub is_price_equal: bool,
}

impl UpdateMeta {
    pub fn between(original: &Event, updated: &Event) -> Self {
        Self {
            is_date_start_equal: original.time_start == updated.time_start,
            is_duration_equal: original.duration() == updated.duration(),
            is_price_equal: original.price == updated.price,
        }
    }
}
