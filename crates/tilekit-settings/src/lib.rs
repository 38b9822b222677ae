//! Tilekit Settings Crate
//!
//! Application configuration (snapping, zoom bounds, history depth and the
//! last crop/tile settings) and a small key-value store for persisting the
//! crop and tile settings between sessions.

pub mod config;
pub mod error;
pub mod store;

pub use config::{Config, HistoryConfig};
pub use error::{SettingsError, SettingsResult};
pub use store::{SettingsStore, StoredLayout, LAYOUT_KEY};
