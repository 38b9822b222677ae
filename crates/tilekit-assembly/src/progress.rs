//! Completion, hints and layout validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use tilekit_core::geometry::distance;
use tilekit_core::{CropSettings, Point};

use crate::placement::{percentage, PlacementState};

/// How far along the puzzle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleProgress {
    pub total_tiles: usize,
    pub placed_tiles: usize,
    /// Placed within the threshold of their target slot.
    pub correctly_placed: usize,
    /// Correct share of all tiles, rounded to a whole percent.
    pub completion_percentage: u32,
}

impl PuzzleProgress {
    pub fn compute(state: &PlacementState, threshold: f64) -> Self {
        let total = state.tiles().len();
        let correct = state
            .placed_tiles()
            .iter()
            .filter(|p| is_correct(state, &p.id, p.position, threshold))
            .count();
        Self {
            total_tiles: total,
            placed_tiles: state.placed_tiles().len(),
            correctly_placed: correct,
            completion_percentage: percentage(correct, total),
        }
    }
}

/// All tiles placed and every one of them on its target.
pub fn is_complete(state: &PlacementState, threshold: f64) -> bool {
    !state.tiles().is_empty()
        && state.placed_tiles().len() == state.tiles().len()
        && state
            .placed_tiles()
            .iter()
            .all(|p| is_correct(state, &p.id, p.position, threshold))
}

fn is_correct(state: &PlacementState, tile_id: &str, position: Point, threshold: f64) -> bool {
    state
        .target_position(tile_id)
        .is_some_and(|target| distance(position, target) <= threshold)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintDirection {
    Left,
    Right,
    Up,
    Down,
}

impl fmt::Display for HintDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HintDirection::Left => write!(f, "left"),
            HintDirection::Right => write!(f, "right"),
            HintDirection::Up => write!(f, "up"),
            HintDirection::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Hint {
    /// Not placed yet: this is where it goes.
    Target { position: Point },
    /// Already in its slot.
    Correct,
    /// Placed but off target; move along the dominant axis.
    Direction {
        direction: HintDirection,
        distance: f64,
    },
}

impl Hint {
    /// Hint for one tile, `None` if the tile has no target slot.
    pub fn for_tile(state: &PlacementState, tile_id: &str, threshold: f64) -> Option<Self> {
        let target = state.target_position(tile_id)?;
        let Some(placed) = state.placed_tile(tile_id) else {
            return Some(Hint::Target { position: target });
        };

        let d = distance(placed.position, target);
        if d <= threshold {
            return Some(Hint::Correct);
        }

        let dx = target.x - placed.position.x;
        let dy = target.y - placed.position.y;
        let direction = if dx.abs() > dy.abs() {
            if dx > 0.0 {
                HintDirection::Right
            } else {
                HintDirection::Left
            }
        } else if dy > 0.0 {
            HintDirection::Down
        } else {
            HintDirection::Up
        };
        Some(Hint::Direction {
            direction,
            distance: d,
        })
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Target { position } => write!(f, "Place the tile at {}", position),
            Hint::Correct => write!(f, "Tile is in the right place"),
            Hint::Direction {
                direction,
                distance,
            } => write!(f, "Move {} {} px", direction, distance.round()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ValidationIssue {
    NotInitialized,
    NoTiles,
    /// Pairs of placed tiles whose areas overlap. Shared edges do not count.
    Overlapping { pairs: Vec<(String, String)> },
    /// Placed tiles reaching outside `[0, crop.width] x [0, crop.height]`.
    OutOfBounds { tile_ids: Vec<String> },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NotInitialized => write!(f, "Puzzle is not initialized"),
            ValidationIssue::NoTiles => write!(f, "No tiles available"),
            ValidationIssue::Overlapping { pairs } => {
                write!(f, "{} overlapping tile pairs", pairs.len())
            }
            ValidationIssue::OutOfBounds { tile_ids } => {
                write!(f, "{} tiles out of bounds", tile_ids.len())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn check(state: &PlacementState, initialized: bool) -> Self {
        let mut issues = Vec::new();
        if !initialized {
            issues.push(ValidationIssue::NotInitialized);
        }
        if state.tiles().is_empty() {
            issues.push(ValidationIssue::NoTiles);
        }

        let pairs = overlapping_pairs(state);
        if !pairs.is_empty() {
            issues.push(ValidationIssue::Overlapping { pairs });
        }

        let tile_ids = out_of_bounds(state, &state.crop_settings());
        if !tile_ids.is_empty() {
            issues.push(ValidationIssue::OutOfBounds { tile_ids });
        }

        Self { issues }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

fn overlapping_pairs(state: &PlacementState) -> Vec<(String, String)> {
    let placed = state.placed_tiles();
    let mut pairs = Vec::new();
    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            if a.rect().overlaps(&b.rect()) {
                pairs.push((a.id.clone(), b.id.clone()));
            }
        }
    }
    pairs
}

fn out_of_bounds(state: &PlacementState, crop: &CropSettings) -> Vec<String> {
    state
        .placed_tiles()
        .iter()
        .filter(|p| {
            let r = p.rect();
            r.x < 0.0 || r.y < 0.0 || r.right() > crop.width || r.bottom() > crop.height
        })
        .map(|p| p.id.clone())
        .collect()
}
