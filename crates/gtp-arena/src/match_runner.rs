//! Runs a series of games between the same two engines.

use std::io::Write;

use gtp::Color;
use rand::Rng;
use thiserror::Error;

use crate::engine::Engine;
use crate::game_runner::{GameError, GameRunner};
use crate::opening::OpeningBook;
use crate::report::Reporter;
use crate::stats::MatchStats;

/// Errors that abort a match.
#[derive(Error, Debug)]
pub enum MatchError {
    /// There is nothing to draw openings from.
    #[error("Opening book is empty")]
    EmptyBook,
    /// A game failed; the engines are in an unknown state.
    #[error("Game {game} aborted: {source}")]
    Game {
        game: u32,
        #[source]
        source: GameError,
    },
    /// The report could not be written.
    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

/// The color the primary engine plays in game `index` (0-based): black on even games.
pub fn primary_color(index: u32) -> Color {
    if index % 2 == 0 {
        Color::Black
    } else {
        Color::White
    }
}

/// Plays `games` games back to back, reusing both engine sessions.
#[derive(Debug, Clone, Copy)]
pub struct MatchRunner {
    games: u32,
}

impl MatchRunner {
    pub fn new(games: u32) -> Self {
        Self { games }
    }

    pub fn games(&self) -> u32 {
        self.games
    }

    /// Runs the match and returns the final statistics.
    ///
    /// Each game starts from an opening drawn from `book` with `rng`; colors
    /// alternate, the primary taking black first. The first failing game aborts the
    /// match and is not counted.
    pub fn run<P, O, R, W>(
        &self,
        primary: &mut P,
        opponent: &mut O,
        book: &OpeningBook,
        rng: &mut R,
        reporter: &mut Reporter<W>,
    ) -> Result<MatchStats, MatchError>
    where
        P: Engine,
        O: Engine,
        R: Rng,
        W: Write,
    {
        let mut stats = MatchStats::new();

        for game in 0..self.games {
            let opening = book.choose(rng).ok_or(MatchError::EmptyBook)?;
            let color = primary_color(game);

            let result = GameRunner::new(primary, opponent, color)
                .play_game(&opening)
                .map_err(|source| MatchError::Game {
                    game: game + 1,
                    source,
                })?;

            stats = stats.record_game(&result);
            tracing::debug!(
                game = game + 1,
                "{:?} as {} ({:+})",
                result.outcome,
                color,
                result.score_diff
            );
            reporter.observe(&stats)?;
        }

        Ok(stats)
    }
}
