// File: ./src/store/mod.rs
// Reference data the forms read from: offers keyed by type, destinations keyed by name.
use crate::model::{Destination, Offer};
use std::collections::HashMap;

/// Insertion-ordered lookup table. Re-inserting a key replaces the value in place.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    index: HashMap<String, usize>,
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    fn insert(&mut self, key: String, item: T) {
        match self.index.get(&key) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.index.insert(key, self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OffersStore {
    offers: Registry<Offer>,
}

impl OffersStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offers(&mut self, offers: Vec<Offer>) {
        for offer in offers {
            self.offers.insert(offer.kind.clone(), offer);
        }
        log::debug!("Offers store holds {} entries", self.offers.len());
    }

    pub fn get_offers(&self) -> &Registry<Offer> {
        &self.offers
    }
}

#[derive(Debug, Clone, Default)]
pub struct DestinationsStore {
    destinations: Registry<Destination>,
}

impl DestinationsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_destinations(&mut self, destinations: Vec<Destination>) {
        for destination in destinations {
            self.destinations
                .insert(destination.name.clone(), destination);
        }
    }

    pub fn get_destinations(&self) -> &Registry<Destination> {
        &self.destinations
    }
}
