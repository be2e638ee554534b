//! Scripted openings and the opening book they are drawn from.
//!
//! An opening is written as a flat string of two-character coordinates, e.g.
//! `f5d6c3d3c4` (one line per opening in an XOT-style book file).

use std::path::{Path, PathBuf};

use gtp::{Color, Vertex};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Width of one move token in opening notation.
const TOKEN_WIDTH: usize = 2;

/// Errors that can occur when loading an opening book.
#[derive(Debug, Error)]
pub enum OpeningError {
    /// Failed to read the opening book file.
    #[error("failed to read opening book: {0}")]
    IoError(#[from] std::io::Error),

    /// The file holds no openings.
    #[error("opening book {} is empty", .0.display())]
    Empty(PathBuf),
}

/// One scripted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningMove {
    pub color: Color,
    pub vertex: Vertex,
}

/// A decoded opening: moves in order, colors alternating from black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening {
    moves: Vec<OpeningMove>,
}

impl Opening {
    pub fn moves(&self) -> &[OpeningMove] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Side to move once the opening has been played.
    pub fn side_to_move(&self) -> Color {
        Color::to_move_after(self.moves.len())
    }

    /// The coordinates concatenated back into notation.
    pub fn notation(&self) -> String {
        self.moves.iter().map(|m| m.vertex.to_string()).collect()
    }
}

impl std::fmt::Display for Opening {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.notation())
    }
}

/// Decodes opening notation into moves.
///
/// Surrounding whitespace is ignored. A trailing partial token (odd length) is
/// dropped.
///
/// # Example
///
/// ```
/// use gtp::{Color, Vertex};
/// use gtp_arena::opening::decode;
///
/// let opening = decode("e6f6");
/// assert_eq!(opening.len(), 2);
/// assert_eq!(opening.moves()[0].color, Color::Black);
/// assert_eq!(opening.moves()[1].vertex, Vertex::coord("f6"));
/// ```
pub fn decode(notation: &str) -> Opening {
    let chars: Vec<char> = notation.trim().chars().collect();
    let moves = chars
        .chunks_exact(TOKEN_WIDTH)
        .enumerate()
        .map(|(i, token)| OpeningMove {
            color: Color::to_move_after(i),
            vertex: Vertex::Coord(token.iter().collect()),
        })
        .collect();
    Opening { moves }
}

/// The set of opening lines a match draws from.
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    lines: Vec<String>,
}

impl OpeningBook {
    /// Builds a book from lines, skipping blank ones.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self { lines }
    }

    /// Loads a book file: one opening per non-blank line.
    ///
    /// # Errors
    ///
    /// Returns [`OpeningError::IoError`] if the file cannot be read and
    /// [`OpeningError::Empty`] if it contains no openings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OpeningError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let book = Self::from_lines(String::from_utf8_lossy(&bytes).lines());
        if book.is_empty() {
            return Err(OpeningError::Empty(path.to_path_buf()));
        }
        tracing::info!("Loaded {} openings from {}", book.len(), path.display());
        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Picks an opening uniformly at random.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<Opening> {
        self.lines.choose(rng).map(|line| decode(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn test_decode_two_moves() {
        let opening = decode("e6f6");
        assert_eq!(
            opening.moves(),
            &[
                OpeningMove {
                    color: Color::Black,
                    vertex: Vertex::coord("e6"),
                },
                OpeningMove {
                    color: Color::White,
                    vertex: Vertex::coord("f6"),
                },
            ]
        );
        assert_eq!(opening.side_to_move(), Color::Black);
    }

    #[test]
    fn test_decode_odd_length_drops_partial_token() {
        let opening = decode("f5d6c");
        assert_eq!(opening.len(), 2);
        assert_eq!(opening.notation(), "f5d6");
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let opening = decode("  f5d6c3\r\n");
        assert_eq!(opening.len(), 3);
        assert_eq!(opening.side_to_move(), Color::White);
    }

    #[test]
    fn test_decode_empty() {
        let opening = decode("");
        assert!(opening.is_empty());
        assert_eq!(opening.side_to_move(), Color::Black);
    }

    #[test]
    fn test_book_skips_blank_lines() {
        let book = OpeningBook::from_lines(["f5d6", "", "   ", "c4c3\r"]);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_book_choose_is_seeded() {
        let book = OpeningBook::from_lines(["f5d6", "c4c3", "e6f4", "d3c5"]);
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(book.choose(&mut a), book.choose(&mut b));
        }
    }

    #[test]
    fn test_empty_book_chooses_nothing() {
        let book = OpeningBook::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(book.choose(&mut rng).is_none());
    }

    #[test]
    fn test_load_book_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "f5d6c3d3c4f4").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "f5f6e6f4").unwrap();

        let book = OpeningBook::load(file.path()).unwrap();
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_load_empty_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();

        match OpeningBook::load(file.path()) {
            Err(OpeningError::Empty(path)) => assert_eq!(path, file.path()),
            other => panic!("Expected Empty, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        assert!(matches!(
            OpeningBook::load("/nonexistent/xot.txt"),
            Err(OpeningError::IoError(_))
        ));
    }

    proptest! {
        #[test]
        fn decode_yields_alternating_moves(notation in "([a-h][1-8]){0,30}") {
            let opening = decode(&notation);
            prop_assert_eq!(opening.len(), notation.len() / 2);
            for (i, mv) in opening.moves().iter().enumerate() {
                let expected = if i % 2 == 0 { Color::Black } else { Color::White };
                prop_assert_eq!(mv.color, expected);
            }
            prop_assert_eq!(opening.notation(), notation);
        }

        #[test]
        fn side_to_move_is_black_iff_even(notation in "([a-h][1-8]){0,30}") {
            let opening = decode(&notation);
            prop_assert_eq!(opening.side_to_move() == Color::Black, opening.len() % 2 == 0);
        }
    }
}
