//! SameGame board engine with union-find cluster tracking.
//!
//! # Board Layout
//!
//! ```text
//! Cells are stored row-major, y = 0 is the top row:
//!
//!   index = x + y * width
//!
//!   y=0   0  1  2  3      <- top
//!   y=1   4  5  6  7
//!   y=2   8  9 10 11      <- bottom, gravity pulls towards here
//!
//! After every move, non-empty columns are packed towards x = 0.
//! ```
//!
//! # Color Codes
//!
//! ```text
//! 0     Empty
//! 1..=5 playable colors (NB_COLORS = 5)
//! ```
//!
//! A cluster is a maximal 4-connected run of equal colors. Each cluster is
//! identified by the index of its union-find representative, and a move is
//! addressed by that representative only.

pub mod board;
pub mod error;
pub mod forest;
pub mod history;
pub mod policy;
pub mod render;
pub mod scoring;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::{Deserialize, Serialize};

pub use board::{Board, Cluster, ClusterInfo};
pub use error::{Result, SameGameError};
pub use forest::ClusterForest;
pub use history::{ActionHistory, TranspositionEntry, TranspositionTable};
pub use policy::{GreedyPolicy, LowColorCountPolicy, Policy, PolicyKind, RandomPolicy};
pub use scoring::Scoring;

/// Number of playable colors.
pub const NB_COLORS: usize = 5;

/// Default board width used by the contest boards.
pub const DEFAULT_WIDTH: usize = 15;

/// Default board height used by the contest boards.
pub const DEFAULT_HEIGHT: usize = 15;

/// Cell color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    #[default]
    Empty = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
}

impl Color {
    /// The playable colors, in code order.
    pub const PLAYABLE: [Color; NB_COLORS] =
        [Color::Red, Color::Green, Color::Yellow, Color::Blue, Color::Magenta];

    /// Convert from a color value (0..=NB_COLORS) to Color.
    #[inline]
    pub fn from_value(value: i64) -> Option<Color> {
        match value {
            0 => Some(Color::Empty),
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            3 => Some(Color::Yellow),
            4 => Some(Color::Blue),
            5 => Some(Color::Magenta),
            _ => None,
        }
    }

    /// Numeric value, usable as an index into per-color tables.
    #[inline]
    pub const fn value(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Color::Empty)
    }
}

/// A move: the index of a cluster representative.
///
/// Only meaningful for the board state it was produced from. After any
/// `apply`, the cell may no longer be a representative.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Action {
    pub index: usize,
}

impl Action {
    #[inline]
    pub const fn new(index: usize) -> Action {
        Action { index }
    }
}

impl From<usize> for Action {
    fn from(index: usize) -> Self {
        Action { index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_value() {
        assert_eq!(Color::from_value(0), Some(Color::Empty));
        assert_eq!(Color::from_value(3), Some(Color::Yellow));
        assert_eq!(Color::from_value(5), Some(Color::Magenta));
        assert_eq!(Color::from_value(6), None);
        assert_eq!(Color::from_value(-1), None);
    }

    #[test]
    fn test_color_value_roundtrip() {
        for color in Color::PLAYABLE {
            assert_eq!(Color::from_value(color.value() as i64), Some(color));
            assert!(!color.is_empty());
        }
        assert!(Color::Empty.is_empty());
        assert_eq!(Color::default(), Color::Empty);
    }

    #[test]
    fn test_action_from_index() {
        let action: Action = 7.into();
        assert_eq!(action, Action::new(7));
        assert_eq!(action.index, 7);
    }
}
