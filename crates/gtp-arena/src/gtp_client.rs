//! GTP client for communicating with board-game engines.
//!
//! This module pairs every command with exactly one response. Commands are tagged
//! with a per-client request id; while waiting for the answer the client skips any
//! line that is not a status line, and any status line that echoes a different id.
//! Engines are free to print boards, search logs or leftovers from earlier commands
//! in between.
//!
//! # Example
//!
//! ```no_run
//! use gtp::{Color, GtpCommand};
//! use gtp_arena::gtp_client::GtpClient;
//! use std::process::Command;
//!
//! let mut client = GtpClient::spawn("sensei", Command::new("./sensei_depth1_gtp"))?;
//! client.command(&GtpCommand::ClearBoard)?;
//! let response = client.command(&GtpCommand::GenMove(Color::Black))?;
//! println!("Engine played: {:?}", response.last_token());
//! client.quit();
//! # Ok::<(), gtp_arena::channel::ChannelError>(())
//! ```

use std::process::Command;

use gtp::{Color, GtpCommand, Response, StatusLine, Vertex};

use crate::channel::{ChannelError, ProcessChannel, Transport};
use crate::engine::Engine;

/// A GTP engine connection with its request-id counter.
///
/// Ids start at 1 and increase by one per command for the life of the client;
/// they are never reused, not even across games.
pub struct GtpClient<T: Transport = ProcessChannel> {
    transport: T,
    next_id: u64,
    result_command: GtpCommand,
}

impl GtpClient<ProcessChannel> {
    /// Spawns a GTP engine process.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::SpawnError`] if the process cannot be spawned.
    pub fn spawn(label: impl Into<String>, command: Command) -> Result<Self, ChannelError> {
        Ok(Self::new(ProcessChannel::spawn(label, command)?))
    }
}

impl<T: Transport> GtpClient<T> {
    /// Wraps an established transport. The result query defaults to `final_score`.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: 1,
            result_command: GtpCommand::FinalScore,
        }
    }

    /// Uses `command` when asking this engine for the final result.
    pub fn with_result_command(mut self, command: GtpCommand) -> Self {
        self.result_command = command;
        self
    }

    /// The id the next command will carry.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one command line and returns the response that answers it.
    ///
    /// The command is written as `"<id> <command>"`. Lines are then discarded until a
    /// status line (`=` or `?`) shows up whose echoed id, if any, equals `<id>`. The
    /// accepted status line and every following line up to the blank terminator make
    /// up the response.
    ///
    /// # Errors
    ///
    /// Transport failures, notably [`ChannelError::ProcessTerminated`], are returned
    /// unchanged.
    pub fn send(&mut self, command: &str) -> Result<Response, ChannelError> {
        let id = self.next_id;
        self.next_id += 1;
        let command = command.trim();

        self.transport.write_line(&format!("{} {}", id, command))?;
        tracing::debug!(engine = %self.transport.label(), id, "-> {}", command);

        let (raw_status, status_line) = loop {
            let line = self.transport.read_line()?;
            match StatusLine::parse(&line) {
                Some(status) if status.answers(id) => break (line, status),
                Some(status) => {
                    tracing::debug!(
                        engine = %self.transport.label(),
                        id,
                        stale_id = ?status.id,
                        "discarding stale response: {}",
                        line
                    );
                }
                None => {
                    tracing::trace!(engine = %self.transport.label(), "ignoring: {}", line);
                }
            }
        };

        let mut body = Vec::new();
        loop {
            let line = self.transport.read_line()?;
            if line.is_empty() {
                break;
            }
            body.push(line);
        }

        let response = Response::new(raw_status, status_line, body);
        tracing::debug!(engine = %self.transport.label(), id, "<- {}", response);
        Ok(response)
    }

    /// Sends a typed command.
    pub fn command(&mut self, command: &GtpCommand) -> Result<Response, ChannelError> {
        self.send(&command.to_gtp())
    }

    /// Shuts the engine down, best effort.
    ///
    /// Writes an id-tagged `quit` without waiting for its answer, ignores any error,
    /// then closes the transport (for a process: a short grace period, then kill).
    pub fn quit(&mut self) {
        let id = self.next_id;
        self.next_id += 1;
        if let Err(e) = self
            .transport
            .write_line(&format!("{} {}", id, GtpCommand::Quit))
        {
            tracing::debug!(engine = %self.transport.label(), "quit not delivered: {}", e);
        }
        self.transport.close();
    }
}

impl<T: Transport> Engine for GtpClient<T> {
    fn name(&self) -> &str {
        self.transport.label()
    }

    fn reset(&mut self) -> Result<Response, ChannelError> {
        self.command(&GtpCommand::ClearBoard)
    }

    fn play(&mut self, color: Color, vertex: &Vertex) -> Result<Response, ChannelError> {
        self.command(&GtpCommand::Play {
            color,
            vertex: vertex.clone(),
        })
    }

    fn genmove(&mut self, color: Color) -> Result<Response, ChannelError> {
        self.command(&GtpCommand::GenMove(color))
    }

    fn final_result(&mut self) -> Result<Response, ChannelError> {
        let query = self.result_command.clone();
        self.command(&query)
    }
}
