//! # Tilekit Assembly
//!
//! Everything that decides where tiles end up:
//!
//! - [`slicing`] turns a crop region and a tile size into tile records.
//! - [`placement`] is the authoritative placement store with bounded
//!   undo/redo ([`history`]).
//! - [`snap`] resolves a raw drop position into the final one (grid, then
//!   target slot, then neighbouring tiles).
//! - [`progress`] reports completion, hints and layout problems.
//! - [`session`] ties the above together behind the calls a UI makes.

pub mod history;
pub mod placement;
pub mod progress;
pub mod session;
pub mod slicing;
pub mod snap;

pub use history::History;
pub use placement::{ExportedState, PlacementState, PlacementStatistics, PuzzleState};
pub use progress::{Hint, HintDirection, PuzzleProgress, ValidationIssue, ValidationReport};
pub use session::{AssemblySession, SessionStatistics};
pub use slicing::slice_tiles;
pub use snap::{NeighborSide, PlacementView, SnapKind, SnapOutcome, SnapResolver};
