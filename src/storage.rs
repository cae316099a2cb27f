// File: ./src/storage.rs
// JSON file that plays the role of the remote data gateway.
use crate::model::{Event, TripData, UserAction, WireDestination, WireEvent, WireOffer};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the trip, writing the sample trip first if the file does not exist yet.
    pub fn load(&self) -> Result<TripData> {
        self.with_lock(|| {
            if !self.path.exists() {
                log::info!("No trip at {}, seeding sample data", self.path.display());
                let seed = sample_trip(Utc::now());
                self.write(&seed)?;
                return Ok(seed);
            }
            self.read()
        })
    }

    pub fn save(&self, data: &TripData) -> Result<()> {
        self.with_lock(|| self.write(data))
    }

    /// Persists one change to the event list.
    pub fn apply(&self, action: UserAction, event: &Event) -> Result<()> {
        self.with_lock(|| {
            let mut data = if self.path.exists() {
                self.read()?
            } else {
                TripData::default()
            };
            let wire = WireEvent::from(event);
            match action {
                UserAction::AddEvent => data.events.push(wire),
                UserAction::UpdateEvent => match data.events.iter_mut().find(|e| e.id == event.id) {
                    Some(slot) => *slot = wire,
                    None => anyhow::bail!("Event {} is not stored", event.id),
                },
                UserAction::DeleteEvent => data.events.retain(|e| e.id != event.id),
            }
            self.write(&data)
        })
    }

    fn read(&self) -> Result<TripData> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Corrupt trip file {}", self.path.display()))
    }

    fn write(&self, data: &TripData) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(data)?)?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_path = self.path.with_extension("lock");
        let lock: File = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock {}", lock_path.display()))?;
        lock.lock_exclusive()?;
        let result = f();
        let _ = FileExt::unlock(&lock);
        result
    }
}

fn offer(kind: &str, title: &str, price: u32) -> WireOffer {
    WireOffer {
        kind: kind.to_string(),
        title: title.to_string(),
        price,
    }
}

fn destination(name: &str, description: &str) -> WireDestination {
    WireDestination {
        name: name.to_string(),
        description: description.to_string(),
        pictures: Vec::new(),
    }
}

/// A short three-leg trip around `now`, used on first start.
pub fn sample_trip(now: DateTime<Utc>) -> TripData {
    let destinations = vec![
        destination("Amsterdam", "Canals, bikes and a very flat horizon."),
        destination("Geneva", "A lakeside city at the foot of the Alps."),
        destination("Chamonix", "Mountain town under Mont Blanc."),
    ];
    let offers = vec![
        offer("taxi", "Upgrade to a business class", 120),
        offer("flight", "Add luggage", 30),
        offer("train", "Travel by first class", 40),
        offer("check-in", "Add breakfast", 50),
        offer("sightseeing", "Book tickets", 40),
    ];

    let leg = |id: &str, kind: &str, dest: usize, from_h: i64, hours: i64, price: u32| WireEvent {
        id: id.to_string(),
        kind: kind.to_string(),
        destination: destinations[dest].clone(),
        date_from: now + Duration::hours(from_h),
        date_to: now + Duration::hours(from_h + hours),
        base_price: price,
        offers: offers.iter().filter(|o| o.kind == kind).cloned().collect(),
        is_favorite: false,
    };
    let events = vec![
        leg("1", "taxi", 0, -30, 1, 20),
        leg("2", "flight", 1, 26, 2, 160),
        leg("3", "check-in", 2, 50, 1, 600),
    ];

    TripData {
        events,
        destinations,
        offers,
    }
}
