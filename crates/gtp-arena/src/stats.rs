//! Match statistics from the primary engine's point of view.
//!
//! [`MatchStats`] is a plain value folded over game results; nothing here talks to
//! an engine or writes anywhere.

use gtp::Color;
use serde::Serialize;

use crate::game_runner::{GameResult, Outcome};

/// Win/loss/draw counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColorRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl ColorRecord {
    /// Returns the record with one more game of the given outcome.
    #[must_use]
    pub fn record(mut self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
        self
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Aggregate results of a match, split by the color the primary played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Sum of primary-minus-opponent differentials.
    pub diff_sum: i64,
    pub as_black: ColorRecord,
    pub as_white: ColorRecord,
}

impl MatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stats with one more game folded in.
    #[must_use]
    pub fn record(mut self, color: Color, outcome: Outcome, diff: i32) -> Self {
        self.games += 1;
        self.diff_sum += i64::from(diff);
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
        match color {
            Color::Black => self.as_black = self.as_black.record(outcome),
            Color::White => self.as_white = self.as_white.record(outcome),
        }
        self
    }

    /// Folds in a finished game.
    #[must_use]
    pub fn record_game(self, game: &GameResult) -> Self {
        self.record(game.primary_color, game.outcome, game.score_diff)
    }

    /// (wins + draws / 2) / games, 0 before the first game.
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (f64::from(self.wins) + 0.5 * f64::from(self.draws)) / f64::from(self.games)
    }

    /// Mean differential per game, 0 before the first game.
    pub fn average_diff(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.diff_sum as f64 / f64::from(self.games)
    }

    pub fn for_color(&self, color: Color) -> &ColorRecord {
        match color {
            Color::Black => &self.as_black,
            Color::White => &self.as_white,
        }
    }
}
