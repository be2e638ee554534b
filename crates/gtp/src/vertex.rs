//! Board coordinates as they appear on the wire.

use std::str::FromStr;

use serde::Serialize;

use crate::GtpError;

/// A move target: either a board coordinate such as `e6` or a pass.
///
/// Coordinates are kept as the engine spelled them; legality is the engine's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Vertex {
    Pass,
    Coord(String),
}

impl Vertex {
    /// Returns true for a pass.
    pub fn is_pass(&self) -> bool {
        matches!(self, Vertex::Pass)
    }

    /// Builds a coordinate vertex.
    pub fn coord(s: impl Into<String>) -> Self {
        Vertex::Coord(s.into())
    }
}

impl std::fmt::Display for Vertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Vertex::Pass => write!(f, "PASS"),
            Vertex::Coord(c) => write!(f, "{}", c),
        }
    }
}

impl FromStr for Vertex {
    type Err = GtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.contains(char::is_whitespace) {
            return Err(GtpError::InvalidVertex(s.to_string()));
        }
        if s.eq_ignore_ascii_case("pass") {
            Ok(Vertex::Pass)
        } else {
            Ok(Vertex::Coord(s.to_string()))
        }
    }
}
