//! # Event Bus Module
//!
//! Typed publish/subscribe channel between the placement engine, the
//! viewport and whatever presentation layer sits on top.
//!
//! ## Overview
//!
//! - Publishers emit [`PuzzleEvent`] values; the set of events is closed and
//!   checked at compile time.
//! - Subscribers filter by [`EventCategory`] and receive a clone of each
//!   matching event, synchronously on the publishing thread.
//! - Async consumers can take a broadcast receiver instead.
//!
//! There is no global bus: each engine component is handed an
//! `Arc<EventBus>` when it is built.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tilekit_core::event_bus::{EventBus, EventCategory, EventFilter, PuzzleEvent};
//!
//! let bus = Arc::new(EventBus::new());
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Placement]),
//!     |event| {
//!         if let PuzzleEvent::TilePlaced { tile, .. } = event {
//!             println!("placed {} at {}", tile.id, tile.position);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
