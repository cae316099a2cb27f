// File: ./src/model/adapter.rs
// Handles conversion between the model and the gateway's JSON shape
use crate::model::item::{Destination, Event, Offer, Picture};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOffer {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePicture {
    pub src: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDestination {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pictures: Vec<WirePicture>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub destination: WireDestination,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub base_price: u32,
    #[serde(default)]
    pub offers: Vec<WireOffer>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Everything the gateway stores for one trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripData {
    #[serde(default)]
    pub events: Vec<WireEvent>,
    #[serde(default)]
    pub destinations: Vec<WireDestination>,
    #[serde(default)]
    pub offers: Vec<WireOffer>,
}

impl From<WireOffer> for Offer {
    fn from(w: WireOffer) -> Self {
        Self {
            kind: w.kind,
            title: w.title,
            price: w.price,
        }
    }
}

impl From<&Offer> for WireOffer {
    fn from(o: &Offer) -> Self {
        Self {
            kind: o.kind.clone(),
            title: o.title.clone(),
            price: o.price,
        }
    }
}

impl From<WireDestination> for Destination {
    fn from(w: WireDestination) -> Self {
        Self {
            name: w.name,
            description: w.description,
            pictures: w
                .pictures
                .into_iter()
                .map(|p| Picture {
                    src: p.src,
                    description: p.description,
                })
                .collect(),
        }
    }
}

impl From<&Destination> for WireDestination {
    fn from(d: &Destination) -> Self {
        Self {
            name: d.name.clone(),
            description: d.description.clone(),
            pictures: d
                .pictures
                .iter()
                .map(|p| WirePicture {
                    src: p.src.clone(),
                    description: p.description.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<WireEvent> for Event {
    type Error = anyhow::Error;

    fn try_from(w: WireEvent) -> Result<Self> {
        if w.date_from > w.date_to {
            bail!("event {} ends before it starts", w.id);
        }
        Ok(Self {
            id: w.id,
            kind: w.kind,
            destination: w.destination.into(),
            time_start: w.date_from,
            time_end: w.date_to,
            price: w.base_price,
            offers: w.offers.into_iter().map(Offer::from).collect(),
            is_favorite: w.is_favorite,
        })
    }
}

impl From<&Event> for WireEvent {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id.clone(),
            kind: e.kind.clone(),
            destination: (&e.destination).into(),
            date_from: e.time_start,
            date_to: e.time_end,
            base_price: e.price,
            offers: e.offers.iter().map(WireOffer::from).collect(),
            is_favorite: e.is_favorite,
        }
    }
}

impl Event {
    pub fn from_json(raw: &str) -> Result<Self> {
        let wire: WireEvent = serde_json::from_str(raw).context("Malformed event JSON")?;
        Event::try_from(wire)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&WireEvent::from(self))?)
    }
}

impl TripData {
    /// Decodes every stored event, rejecting the whole trip if one of them is malformed.
    pub fn decode_events(&self) -> Result<Vec<Event>> {
        self.events
            .iter()
            .cloned()
            .map(|w| {
                let id = w.id.clone();
                Event::try_from(w).with_context(|| format!("Invalid event {}", id))
            })
            .collect()
    }

    pub fn set_events(&mut self, events: &[Event]) {
        self.events = events.iter().map(WireEvent::from).collect();
    }
}
