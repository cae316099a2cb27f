// File: ./src/view/trip_info.rs
use crate::model::Event;
use crate::view::format::format_day;

/// Header line for the whole trip: route, dates and what it costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripInfo {
    pub route: String,
    pub dates: String,
    pub total_cost: u64,
}

impl TripInfo {
    /// `None` for an empty trip. Events are taken in chronological order.
    pub fn from_events(events: &[Event]) -> Option<Self> {
        let mut ordered: Vec<&Event> = events.iter().collect();
        ordered.sort_by_key(|e| e.time_start);
        let first = ordered.first()?;
        let last = ordered.last()?;

        let mut cities: Vec<&str> = Vec::new();
        for e in &ordered {
            if cities.last() != Some(&e.destination.name.as_str()) {
                cities.push(&e.destination.name);
            }
        }
        let route = if cities.len() > 3 {
            format!("{} — ... — {}", cities[0], cities[cities.len() - 1])
        } else {
            cities.join(" — ")
        };

        let end = ordered
            .iter()
            .map(|e| e.time_end)
            .max()
            .unwrap_or(last.time_end);
        let dates = format!("{} — {}", format_day(first.time_start), format_day(end));

        Some(Self {
            route,
            dates,
            total_cost: events
                .iter()
                .map(Event::total_price)
                .fold(0u64, u64::saturating_add),
        })
    }
}
