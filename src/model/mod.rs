// File: ./src/model/mod.rs
pub mod adapter;
pub mod item;

pub use adapter::{TripData, WireDestination, WireEvent, WireOffer};
pub use item::{
    Destination, EVENT_TYPES, Event, Offer, Picture, UpdateMeta, UpdateType, UserAction,
};
