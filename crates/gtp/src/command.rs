//! GTP command formatting.

use crate::{Color, Vertex};

/// Commands sent from controller to engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GtpCommand {
    /// Reset the board to the initial position.
    ClearBoard,
    /// Apply a move for the given side.
    Play { color: Color, vertex: Vertex },
    /// Ask the engine to choose (and normally apply) a move.
    GenMove(Color),
    /// Standard `final_score` query.
    FinalScore,
    /// Quit the engine.
    Quit,
    /// Any other command line, sent verbatim (e.g. `gogui-rules_final_result`).
    Raw(String),
}

impl GtpCommand {
    /// Format the command body, without the request id.
    pub fn to_gtp(&self) -> String {
        match self {
            GtpCommand::ClearBoard => "clear_board".to_string(),
            GtpCommand::Play { color, vertex } => format!("play {} {}", color.as_gtp(), vertex),
            GtpCommand::GenMove(color) => format!("genmove {}", color.as_gtp()),
            GtpCommand::FinalScore => "final_score".to_string(),
            GtpCommand::Quit => "quit".to_string(),
            GtpCommand::Raw(line) => line.trim().to_string(),
        }
    }

    /// Build the result query for an engine's configured command name.
    pub fn result_query(command: &str) -> Self {
        match command.trim() {
            "final_score" => GtpCommand::FinalScore,
            other => GtpCommand::Raw(other.to_string()),
        }
    }
}

impl std::fmt::Display for GtpCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_gtp())
    }
}
