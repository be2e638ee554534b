//! GTP (Go Text Protocol) vocabulary for driving board-game engines.
//!
//! This crate holds the pure, I/O-free half of a GTP controller: the values that
//! travel over the wire and the parsing of what comes back. Transport and process
//! management live in the `gtp-arena` crate.
//!
//! # Wire format
//!
//! - Commands are single lines, optionally prefixed by a numeric id:
//!   `7 play b e6`
//! - Responses start with `=` (success) or `?` (failure), optionally followed by the
//!   echoed id and a payload, then zero or more body lines, and end with a blank line:
//!   `= 7 PASS`
//!
//! # Commands used by the arena
//!
//! - `clear_board` - Reset the engine's board
//! - `play <color> <vertex>` - Apply a move (or `PASS`)
//! - `genmove <color>` - Ask the engine for a move
//! - `final_score` (or an engine specific equivalent) - Query the result
//! - `quit` - Exit engine

mod color;
mod command;
mod response;
mod score;
mod vertex;

pub use color::Color;
pub use command::GtpCommand;
pub use response::{EchoedId, Response, Status, StatusLine};
pub use score::{parse_final_score, try_parse_final_score};
pub use vertex::Vertex;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GtpError {
    #[error("Invalid vertex: {0}")]
    InvalidVertex(String),
    #[error("Invalid status line: {0}")]
    InvalidStatusLine(String),
}
