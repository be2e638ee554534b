//! GTP response parsing.

use std::str::FromStr;

use crate::GtpError;

/// Whether the engine accepted the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Line started with `=`.
    Success,
    /// Line started with `?`.
    Failure,
}

/// The request id a status line echoes as its second whitespace-delimited token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoedId {
    /// The second token is not numeric.
    Absent,
    Id(u64),
    /// All digits, but too large for any id this client can issue.
    OutOfRange,
}

impl EchoedId {
    fn from_digits(token: &str) -> Self {
        token.parse().map_or(EchoedId::OutOfRange, EchoedId::Id)
    }

    pub fn value(self) -> Option<u64> {
        match self {
            EchoedId::Id(id) => Some(id),
            EchoedId::Absent | EchoedId::OutOfRange => None,
        }
    }
}

/// The first line of a response: marker, optional echoed id, payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub status: Status,
    pub id: EchoedId,
    /// Text after the marker and id.
    pub payload: String,
}

impl StatusLine {
    /// Parse a line if it starts with a status marker, `None` otherwise.
    pub fn parse(line: &str) -> Option<Self> {
        line.parse().ok()
    }

    /// True when the line carries no id, or carries exactly `id`.
    pub fn answers(&self, id: u64) -> bool {
        match self.id {
            EchoedId::Absent => true,
            EchoedId::Id(echoed) => echoed == id,
            EchoedId::OutOfRange => false,
        }
    }
}

impl FromStr for StatusLine {
    type Err = GtpError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let status = match line.chars().next() {
            Some('=') => Status::Success,
            Some('?') => Status::Failure,
            _ => return Err(GtpError::InvalidStatusLine(line.to_string())),
        };

        // Everything from the second token on.
        let rest = line
            .split_once(char::is_whitespace)
            .map(|(_, r)| r.trim_start())
            .unwrap_or("");
        let (second, after) = match rest.split_once(char::is_whitespace) {
            Some((tok, after)) => (tok, after),
            None => (rest, ""),
        };

        let numeric = !second.is_empty() && second.bytes().all(|b| b.is_ascii_digit());
        let (id, payload) = if numeric {
            (EchoedId::from_digits(second), after.trim())
        } else {
            (EchoedId::Absent, rest.trim())
        };

        Ok(StatusLine {
            status,
            id,
            payload: payload.to_string(),
        })
    }
}

/// One complete response: the status line plus the body lines up to the blank terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status_line: StatusLine,
    raw_status: String,
    body: Vec<String>,
}

impl Response {
    /// Assemble a response from an accepted status line and its body.
    pub fn new(raw_status: impl Into<String>, status_line: StatusLine, body: Vec<String>) -> Self {
        Self {
            status_line,
            raw_status: raw_status.into(),
            body,
        }
    }

    /// Parse a response block. The first line must be a status line; body lines
    /// are collected up to the first blank line.
    pub fn parse(text: &str) -> Result<Self, GtpError> {
        let mut lines = text.lines();
        let first = lines.next().unwrap_or("");
        let status_line: StatusLine = first.parse()?;
        let body = lines
            .take_while(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self::new(first, status_line, body))
    }

    pub fn status(&self) -> Status {
        self.status_line.status
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Success
    }

    pub fn is_failure(&self) -> bool {
        self.status() == Status::Failure
    }

    /// Echoed request id, if the engine sent one.
    pub fn id(&self) -> Option<u64> {
        self.status_line.id.value()
    }

    /// Status line text after the marker and id.
    pub fn payload(&self) -> &str {
        &self.status_line.payload
    }

    /// Lines following the status line.
    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// Last whitespace token of the payload, e.g. the move of a `genmove` answer.
    pub fn last_token(&self) -> Option<&str> {
        self.payload().split_whitespace().last()
    }

    /// The captured response verbatim: status line and body joined by newlines.
    pub fn text(&self) -> String {
        std::iter::once(self.raw_status.as_str())
            .chain(self.body.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}
