//! Game execution logic for running a game between two GTP engines.
//!
//! This module provides the [`GameRunner`] struct for executing a single game
//! between a primary engine and its opponent: scripted opening, alternating
//! `genmove`/`play` turns until two consecutive passes, and result extraction.
//!
//! Both engines keep their own board; the runner only relays moves. Any rejected
//! move means the two boards no longer agree, so it ends the game with an error
//! instead of a result.

use gtp::{try_parse_final_score, Color, Response, Vertex};
use serde::Serialize;
use thiserror::Error;

use crate::channel::ChannelError;
use crate::engine::Engine;
use crate::opening::Opening;

/// Safety bound on plies played after the opening.
///
/// Well above any legal game length; hitting it means the engines have most likely
/// drifted out of sync.
pub const MAX_PLIES: usize = 120;

/// Errors that can occur during game execution.
///
/// None of these is recoverable: the engines' internal state cannot be rolled back.
#[derive(Error, Debug)]
pub enum GameError {
    /// An error occurred while communicating with an engine.
    #[error("Engine communication failed: {0}")]
    Channel(#[from] ChannelError),
    /// An engine refused to clear its board.
    #[error("{engine} failed to clear the board: {response}")]
    ResetFailed { engine: String, response: String },
    /// An engine rejected a move of the scripted opening.
    #[error("{engine} rejected opening move {color} {vertex}: {response}")]
    IllegalOpeningMove {
        engine: String,
        color: Color,
        vertex: Vertex,
        response: String,
    },
    /// An engine rejected a move during play.
    #[error("{engine} rejected move {color} {vertex}: {response}")]
    MoveRejected {
        engine: String,
        color: Color,
        vertex: Vertex,
        response: String,
    },
    /// An engine failed to produce a move.
    #[error("{engine} failed to generate a move for {color}: {response}")]
    GenMoveFailed {
        engine: String,
        color: Color,
        response: String,
    },
    /// No two consecutive passes within the ply bound.
    #[error("Ply limit of {0} exceeded (possible desync)")]
    PlyLimitExceeded(usize),
}

/// The outcome of a game from the primary engine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Classifies a score differential by its sign.
    pub fn from_diff(diff: i32) -> Self {
        match diff.cmp(&0) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// A move played after the opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub color: Color,
    pub vertex: Vertex,
}

/// The result of a completed game.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Outcome for the primary engine.
    pub outcome: Outcome,
    /// Score differential, primary minus opponent.
    pub score_diff: i32,
    /// Score differential, black minus white.
    pub black_diff: i32,
    /// The color the primary engine played.
    pub primary_color: Color,
    /// The opening the game started from.
    pub opening: Opening,
    /// Moves played after the opening, passes included.
    pub moves: Vec<MoveRecord>,
    /// The primary engine's final-result text (empty if the query failed).
    pub final_result: String,
}

/// Plays games between a primary engine and an opponent.
///
/// The primary plays `primary_color` for the whole game and is the engine asked for
/// the final result.
///
/// # Example
///
/// ```ignore
/// let mut runner = GameRunner::new(&mut egaroucid, &mut sensei, Color::Black);
/// let result = runner.play_game(&decode("e6f6"))?;
/// println!("{:?} by {}", result.outcome, result.score_diff);
/// ```
pub struct GameRunner<'a, P: Engine, O: Engine> {
    primary: &'a mut P,
    opponent: &'a mut O,
    primary_color: Color,
}

impl<'a, P: Engine, O: Engine> GameRunner<'a, P, O> {
    pub fn new(primary: &'a mut P, opponent: &'a mut O, primary_color: Color) -> Self {
        Self {
            primary,
            opponent,
            primary_color,
        }
    }

    /// Plays one game from `opening` to two consecutive passes.
    ///
    /// # Errors
    ///
    /// Every [`GameError`] is fatal for the game; see the variants.
    pub fn play_game(&mut self, opening: &Opening) -> Result<GameResult, GameError> {
        tracing::info!(
            primary = %self.primary.name(),
            opponent = %self.opponent.name(),
            color = %self.primary_color,
            opening = %opening,
            "starting game"
        );

        setup(self.primary, opening)?;
        setup(self.opponent, opening)?;

        let mut to_move = opening.side_to_move();
        let mut passes = 0;
        let mut moves: Vec<MoveRecord> = Vec::new();

        while passes < 2 {
            if moves.len() == MAX_PLIES {
                return Err(GameError::PlyLimitExceeded(MAX_PLIES));
            }

            let vertex = if to_move == self.primary_color {
                self.primary_turn(to_move)?
            } else {
                self.opponent_turn(to_move)?
            };

            passes = if vertex.is_pass() { passes + 1 } else { 0 };
            moves.push(MoveRecord {
                color: to_move,
                vertex,
            });
            to_move = to_move.opposite();
        }

        let final_result = self.query_result()?;
        let black_diff = try_parse_final_score(&final_result).unwrap_or_else(|| {
            tracing::warn!(
                engine = %self.primary.name(),
                "unrecognized final result {:?}, scoring as a draw",
                final_result
            );
            0
        });
        let score_diff = match self.primary_color {
            Color::Black => black_diff,
            Color::White => -black_diff,
        };
        let outcome = Outcome::from_diff(score_diff);

        tracing::info!(
            primary = %self.primary.name(),
            plies = moves.len(),
            "game over: {:?} ({:+}), result {:?}",
            outcome,
            score_diff,
            final_result
        );

        Ok(GameResult {
            outcome,
            score_diff,
            black_diff,
            primary_color: self.primary_color,
            opening: opening.clone(),
            moves,
            final_result,
        })
    }

    fn primary_turn(&mut self, color: Color) -> Result<Vertex, GameError> {
        let vertex = generate(self.primary, color)?;
        if vertex.is_pass() {
            // genmove alone does not always record a pass on the engine's board.
            apply(self.primary, color, &vertex)?;
        }
        apply(self.opponent, color, &vertex)?;
        Ok(vertex)
    }

    fn opponent_turn(&mut self, color: Color) -> Result<Vertex, GameError> {
        let vertex = generate(self.opponent, color)?;
        apply(self.primary, color, &vertex)?;
        Ok(vertex)
    }

    /// Result text from the primary; a failure answer reads as "no result".
    fn query_result(&mut self) -> Result<String, GameError> {
        let response = self.primary.final_result()?;
        if response.is_failure() {
            tracing::warn!(
                engine = %self.primary.name(),
                "final result query failed, scoring as a draw: {}",
                response
            );
            return Ok(String::new());
        }
        Ok(result_text(&response))
    }
}

/// Clears the board and replays the opening.
fn setup<E: Engine>(engine: &mut E, opening: &Opening) -> Result<(), GameError> {
    let response = engine.reset()?;
    if response.is_failure() {
        return Err(GameError::ResetFailed {
            engine: engine.name().to_string(),
            response: response.text(),
        });
    }
    for mv in opening.moves() {
        let response = engine.play(mv.color, &mv.vertex)?;
        if response.is_failure() {
            return Err(GameError::IllegalOpeningMove {
                engine: engine.name().to_string(),
                color: mv.color,
                vertex: mv.vertex.clone(),
                response: response.text(),
            });
        }
    }
    Ok(())
}

fn generate<E: Engine>(engine: &mut E, color: Color) -> Result<Vertex, GameError> {
    let response = engine.genmove(color)?;
    let vertex = if response.is_success() {
        response.last_token().and_then(|t| t.parse::<Vertex>().ok())
    } else {
        None
    };
    vertex.ok_or_else(|| GameError::GenMoveFailed {
        engine: engine.name().to_string(),
        color,
        response: response.text(),
    })
}

fn apply<E: Engine>(engine: &mut E, color: Color, vertex: &Vertex) -> Result<(), GameError> {
    let response = engine.play(color, vertex)?;
    if response.is_failure() {
        return Err(GameError::MoveRejected {
            engine: engine.name().to_string(),
            color,
            vertex: vertex.clone(),
            response: response.text(),
        });
    }
    Ok(())
}

/// Payload and body of a result answer, without the status marker and id.
fn result_text(response: &Response) -> String {
    std::iter::once(response.payload())
        .chain(response.body().iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scripted::ScriptedEngine;
    use crate::opening::decode;

    #[test]
    fn test_outcome_from_diff() {
        assert_eq!(Outcome::from_diff(1), Outcome::Win);
        assert_eq!(Outcome::from_diff(-1), Outcome::Loss);
        assert_eq!(Outcome::from_diff(0), Outcome::Draw);
    }

    #[test]
    fn test_primary_black_wins_by_eight() {
        let mut primary = ScriptedEngine::new("egaroucid").with_result(Some("B+8"));
        let mut opponent = ScriptedEngine::new("sensei");

        let result = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode("e6f6"))
            .unwrap();

        assert_eq!(result.outcome, Outcome::Win);
        assert_eq!(result.score_diff, 8);
        assert_eq!(result.black_diff, 8);
        assert_eq!(result.moves.len(), 2);
        assert_eq!(result.final_result, "B+8");

        assert_eq!(
            primary.received,
            vec![
                "clear_board",
                "play b e6",
                "play w f6",
                "genmove b",
                "play b PASS",
                "play w PASS",
                "final_score",
            ]
        );
        assert_eq!(
            opponent.received,
            vec![
                "clear_board",
                "play b e6",
                "play w f6",
                "play b PASS",
                "genmove w",
            ]
        );
    }

    #[test]
    fn test_primary_white_negates_score() {
        let mut primary = ScriptedEngine::new("egaroucid").with_result(Some("B+8"));
        let mut opponent = ScriptedEngine::new("sensei");

        let result = GameRunner::new(&mut primary, &mut opponent, Color::White)
            .play_game(&decode("e6f6"))
            .unwrap();

        assert_eq!(result.outcome, Outcome::Loss);
        assert_eq!(result.score_diff, -8);
        assert_eq!(result.black_diff, 8);
        assert_eq!(result.primary_color, Color::White);
    }

    #[test]
    fn test_white_margin_as_white_is_win() {
        let mut primary = ScriptedEngine::new("p").with_result(Some("W+1"));
        let mut opponent = ScriptedEngine::new("o");

        let result = GameRunner::new(&mut primary, &mut opponent, Color::White)
            .play_game(&decode(""))
            .unwrap();
        assert_eq!(result.outcome, Outcome::Win);
        assert_eq!(result.score_diff, 1);
    }

    #[test]
    fn test_odd_opening_starts_with_white() {
        let mut primary = ScriptedEngine::new("p");
        let mut opponent = ScriptedEngine::new("o");

        GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode("f5"))
            .unwrap();

        // White (opponent) moves first after a one-move opening.
        assert_eq!(opponent.received_matching("genmove"), vec!["genmove w"]);
        assert_eq!(primary.received_matching("genmove"), vec!["genmove b"]);
        assert_eq!(primary.received[2], "play w PASS");
    }

    #[test]
    fn test_single_pass_resets_counter() {
        // b: d3, w: PASS, b: c5, w: PASS, b: PASS -> ends on the w/b pass pair.
        let mut primary = ScriptedEngine::new("p").with_moves(&["d3", "c5", "PASS"]);
        let mut opponent = ScriptedEngine::new("o").with_moves(&["PASS", "PASS"]);

        let result = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode(""))
            .unwrap();

        let played: Vec<String> = result.moves.iter().map(|m| m.vertex.to_string()).collect();
        assert_eq!(played, vec!["d3", "PASS", "c5", "PASS", "PASS"]);
        assert_eq!(primary.received_matching("genmove").len(), 3);
        assert_eq!(opponent.received_matching("genmove").len(), 2);
    }

    #[test]
    fn test_primary_pass_is_played_on_primary() {
        let mut primary = ScriptedEngine::new("p").with_moves(&["pass"]);
        let mut opponent = ScriptedEngine::new("o");

        GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode(""))
            .unwrap();

        assert_eq!(primary.received_matching("play b"), vec!["play b PASS"]);
        assert_eq!(opponent.received_matching("play b"), vec!["play b PASS"]);
    }

    #[test]
    fn test_opponent_pass_is_not_replayed_on_opponent() {
        let mut primary = ScriptedEngine::new("p");
        let mut opponent = ScriptedEngine::new("o");

        GameRunner::new(&mut primary, &mut opponent, Color::White)
            .play_game(&decode(""))
            .unwrap();

        // Opponent (black) passes first; only the primary is told about it.
        assert!(opponent.received_matching("play b").is_empty());
        assert_eq!(primary.received_matching("play b"), vec!["play b PASS"]);
    }

    #[test]
    fn test_ply_limit_exceeded() {
        let mut primary = ScriptedEngine::new("p").then_always("a1");
        let mut opponent = ScriptedEngine::new("o").then_always("a2");

        let err = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode("e6f6"))
            .unwrap_err();

        assert!(matches!(err, GameError::PlyLimitExceeded(MAX_PLIES)));
        assert_eq!(
            primary.received_matching("genmove").len() + opponent.received_matching("genmove").len(),
            MAX_PLIES
        );
        assert!(primary.received_matching("final_score").is_empty());
    }

    #[test]
    fn test_game_ending_on_last_allowed_ply_is_normal() {
        // 118 non-pass plies, then two passes: exactly MAX_PLIES plies.
        let primary_moves: Vec<&str> = std::iter::repeat("a1").take(59).chain(["PASS"]).collect();
        let opponent_moves: Vec<&str> = std::iter::repeat("a2").take(59).chain(["PASS"]).collect();
        let mut primary = ScriptedEngine::new("p").with_moves(&primary_moves);
        let mut opponent = ScriptedEngine::new("o").with_moves(&opponent_moves);

        let result = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode(""))
            .unwrap();
        assert_eq!(result.moves.len(), MAX_PLIES);
    }

    #[test]
    fn test_illegal_opening_move() {
        let mut primary = ScriptedEngine::new("p");
        let mut opponent = ScriptedEngine::new("o").rejecting("play w f6");

        let err = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode("e6f6"))
            .unwrap_err();

        match err {
            GameError::IllegalOpeningMove {
                engine,
                color,
                vertex,
                ..
            } => {
                assert_eq!(engine, "o");
                assert_eq!(color, Color::White);
                assert_eq!(vertex, Vertex::coord("f6"));
            }
            other => panic!("Expected IllegalOpeningMove, got {:?}", other),
        }
    }

    #[test]
    fn test_move_rejected_by_opponent() {
        let mut primary = ScriptedEngine::new("p").with_moves(&["d3"]);
        let mut opponent = ScriptedEngine::new("o").rejecting("play b d3");

        let err = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode(""))
            .unwrap_err();
        assert!(matches!(err, GameError::MoveRejected { ref engine, .. } if engine == "o"));
    }

    #[test]
    fn test_move_rejected_by_primary() {
        let mut primary = ScriptedEngine::new("p").rejecting("play b c4");
        let mut opponent = ScriptedEngine::new("o").with_moves(&["c4"]);

        let err = GameRunner::new(&mut primary, &mut opponent, Color::White)
            .play_game(&decode(""))
            .unwrap_err();
        assert!(matches!(err, GameError::MoveRejected { ref engine, .. } if engine == "p"));
    }

    #[test]
    fn test_rejected_pass_on_primary() {
        let mut primary = ScriptedEngine::new("p").rejecting("play b PASS");
        let mut opponent = ScriptedEngine::new("o");

        let err = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode(""))
            .unwrap_err();
        assert!(matches!(err, GameError::MoveRejected { ref engine, .. } if engine == "p"));
        assert!(opponent.received_matching("play").is_empty());
    }

    #[test]
    fn test_genmove_failure() {
        let mut primary = ScriptedEngine::new("p").rejecting("genmove b");
        let mut opponent = ScriptedEngine::new("o");

        let err = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode(""))
            .unwrap_err();
        assert!(matches!(err, GameError::GenMoveFailed { color: Color::Black, .. }));
    }

    #[test]
    fn test_failed_result_query_is_draw() {
        let mut primary = ScriptedEngine::new("p").with_result(None);
        let mut opponent = ScriptedEngine::new("o");

        let result = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode(""))
            .unwrap();
        assert_eq!(result.outcome, Outcome::Draw);
        assert_eq!(result.score_diff, 0);
        assert!(result.final_result.is_empty());
    }

    #[test]
    fn test_unparseable_result_is_draw() {
        let mut primary = ScriptedEngine::new("p").with_result(Some("no idea"));
        let mut opponent = ScriptedEngine::new("o");

        let result = GameRunner::new(&mut primary, &mut opponent, Color::White)
            .play_game(&decode(""))
            .unwrap();
        assert_eq!(result.outcome, Outcome::Draw);
    }

    #[test]
    fn test_score_sentence_result() {
        let mut primary =
            ScriptedEngine::new("p").with_result(Some("Final score is B 34 and W 30"));
        let mut opponent = ScriptedEngine::new("o");

        let result = GameRunner::new(&mut primary, &mut opponent, Color::White)
            .play_game(&decode(""))
            .unwrap();
        assert_eq!(result.black_diff, 4);
        assert_eq!(result.score_diff, -4);
        assert_eq!(result.outcome, Outcome::Loss);
    }

    #[test]
    fn test_reset_failure() {
        let mut primary = ScriptedEngine::new("p").rejecting("clear_board");
        let mut opponent = ScriptedEngine::new("o");

        let err = GameRunner::new(&mut primary, &mut opponent, Color::Black)
            .play_game(&decode("e6"))
            .unwrap_err();
        assert!(matches!(err, GameError::ResetFailed { .. }));
    }
}
