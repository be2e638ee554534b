//! Player color representation.

use serde::Serialize;

/// The two sides of a two-player board game. Black moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Returns the opposite color.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// The color to move after `plies` moves from the initial position.
    #[inline]
    pub const fn to_move_after(plies: usize) -> Self {
        if plies % 2 == 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Single-letter form used in GTP commands.
    pub const fn as_gtp(self) -> &'static str {
        match self {
            Color::Black => "b",
            Color::White => "w",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}
