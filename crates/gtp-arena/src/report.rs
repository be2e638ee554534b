//! Human-readable progress reports.
//!
//! Every `every` games a block of cumulative numbers is appended to the match log
//! (and echoed to stdout when writing to a file):
//!
//! ```text
//! Games: 10
//! egaroucid: 6W 3L 1D  (WinRate=65.00%)
//! sensei   : 3W 6L 1D
//! Avg disc diff (egaroucid - sensei): 4.200
//! As Black: 4W 1L 0D
//! As White: 2W 2L 1D
//! ---
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::stats::MatchStats;

/// Formats one report block.
pub fn format_report(stats: &MatchStats, primary: &str, opponent: &str) -> String {
    let width = primary.chars().count().max(opponent.chars().count());
    format!(
        "Games: {games}\n\
         {primary:<width$}: {w}W {l}L {d}D  (WinRate={rate:.2}%)\n\
         {opponent:<width$}: {l}W {w}L {d}D\n\
         Avg disc diff ({primary} - {opponent}): {avg:.3}\n\
         As Black: {bw}W {bl}L {bd}D\n\
         As White: {ww}W {wl}L {wd}D\n\
         ---\n",
        games = stats.games,
        w = stats.wins,
        l = stats.losses,
        d = stats.draws,
        rate = stats.win_rate() * 100.0,
        avg = stats.average_diff(),
        bw = stats.as_black.wins,
        bl = stats.as_black.losses,
        bd = stats.as_black.draws,
        ww = stats.as_white.wins,
        wl = stats.as_white.losses,
        wd = stats.as_white.draws,
    )
}

/// Appends a report to a sink every `every` games.
pub struct Reporter<W: Write> {
    sink: W,
    primary: String,
    opponent: String,
    every: u32,
    echo: bool,
}

impl Reporter<BufWriter<File>> {
    /// Creates (truncating) the match log at `path` and writes its header.
    ///
    /// Reports are also printed to stdout.
    pub fn create(
        path: impl AsRef<Path>,
        primary: &str,
        opponent: &str,
        every: u32,
    ) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut reporter = Self::new(BufWriter::new(file), primary, opponent, every);
        reporter.echo = true;
        writeln!(
            reporter.sink,
            "# {} vs {} - started {}",
            primary,
            opponent,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        reporter.sink.flush()?;
        Ok(reporter)
    }
}

impl<W: Write> Reporter<W> {
    /// A reporter over any sink; `every` of 0 is treated as 1.
    pub fn new(sink: W, primary: &str, opponent: &str, every: u32) -> Self {
        Self {
            sink,
            primary: primary.to_string(),
            opponent: opponent.to_string(),
            every: every.max(1),
            echo: false,
        }
    }

    /// Writes a report if `stats` has just reached a multiple of `every` games.
    ///
    /// Returns whether a report was written.
    pub fn observe(&mut self, stats: &MatchStats) -> std::io::Result<bool> {
        if stats.games == 0 || stats.games % self.every != 0 {
            return Ok(false);
        }
        self.write_report(stats)?;
        Ok(true)
    }

    /// Writes and flushes a report unconditionally.
    pub fn write_report(&mut self, stats: &MatchStats) -> std::io::Result<()> {
        let block = format_report(stats, &self.primary, &self.opponent);
        if self.echo {
            print!("{}", block);
        }
        self.sink.write_all(block.as_bytes())?;
        self.sink.flush()?;
        tracing::info!(
            games = stats.games,
            "{} win rate {:.2}%",
            self.primary,
            stats.win_rate() * 100.0
        );
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
