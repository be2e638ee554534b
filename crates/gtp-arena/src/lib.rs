//! GTP Arena - head-to-head matches between GTP board-game engines.
//!
//! This crate drives two engine processes through many games from randomized
//! openings, alternating colors, and reports how the primary engine fares.
//!
//! # Modules
//!
//! - [`channel`] - Line transports to engine processes
//! - [`gtp_client`] - Request/response pairing over a transport
//! - [`engine`] - The engine capability a game needs
//! - [`opening`] - Opening notation and opening books
//! - [`game_runner`] - Plays one game to completion
//! - [`match_runner`] - Plays a series of games
//! - [`stats`] - Match statistics
//! - [`report`] - Periodic human-readable reports
//! - [`config`] - TOML configuration

pub mod channel;
pub mod config;
pub mod engine;
pub mod game_runner;
pub mod gtp_client;
pub mod match_runner;
pub mod opening;
pub mod report;
pub mod stats;
