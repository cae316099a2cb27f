// File: ./src/lib.rs
pub mod config;
pub mod dom;
pub mod model;
pub mod presenter;
pub mod storage;
pub mod store;
#[cfg(feature = "tui")]
pub mod tui;
pub mod view;
