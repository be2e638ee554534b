//! The capability a game needs from an engine.

use gtp::{Color, Response, Vertex};

use crate::channel::ChannelError;

/// A stateful engine that owns the board.
///
/// The arena never tracks the position itself; it only forwards moves and reads
/// answers. Every method returns the raw [`Response`] so the caller decides what a
/// failure marker means at that point of the game.
pub trait Engine {
    /// Label used in logs and errors.
    fn name(&self) -> &str;

    /// Clears the engine's board (`clear_board`).
    fn reset(&mut self) -> Result<Response, ChannelError>;

    /// Applies a move for `color` (`play <color> <vertex>`).
    fn play(&mut self, color: Color, vertex: &Vertex) -> Result<Response, ChannelError>;

    /// Asks the engine for a move for `color` (`genmove <color>`).
    fn genmove(&mut self, color: Color) -> Result<Response, ChannelError>;

    /// Queries the final result of the finished game.
    fn final_result(&mut self) -> Result<Response, ChannelError>;
}
