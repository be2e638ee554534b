//! Line-oriented transports to GTP engines.
//!
//! A [`Transport`] moves whole text lines to and from one engine. The production
//! transport is [`ProcessChannel`], which owns a spawned engine process and its pipes;
//! [`StreamChannel`] wraps arbitrary readers and writers and is what the tests use to
//! play the part of a noisy engine.

use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Maximum number of stderr characters kept for a [`ChannelError::ProcessTerminated`] report.
pub const STDERR_CAPTURE_LIMIT: usize = 500;

/// How long a quitting engine may take to exit on its own before it is killed.
pub const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Errors that can occur on an engine transport.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to spawn the engine process.
    #[error("Failed to spawn process: {0}")]
    SpawnError(#[source] std::io::Error),
    /// Reading or writing the engine's pipes failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The engine closed its output; whatever it wrote to stderr is attached.
    #[error("{engine} terminated. stderr={stderr}")]
    ProcessTerminated { engine: String, stderr: String },
}

/// A bidirectional, line-granular connection to one engine.
pub trait Transport {
    /// Human-readable label of the peer, used in logs and errors.
    fn label(&self) -> &str;

    /// Writes `line` followed by a newline and flushes immediately.
    fn write_line(&mut self, line: &str) -> Result<(), ChannelError>;

    /// Blocks until a full line is available and returns it without the line terminator.
    ///
    /// End of stream is reported as [`ChannelError::ProcessTerminated`].
    fn read_line(&mut self) -> Result<String, ChannelError>;

    /// Releases the peer. Must not block indefinitely and must not fail.
    fn close(&mut self) {}
}

/// Reads one line, returning `None` at end of stream.
///
/// Invalid UTF-8 is replaced rather than rejected; engines are not always careful
/// about what they print.
fn read_text_line<R: BufRead>(reader: &mut R) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Transport over a spawned engine process.
///
/// The engine's stderr is drained on a background thread so that a chatty engine can
/// never stall on a full pipe; the first [`STDERR_CAPTURE_LIMIT`] characters are kept
/// for diagnostics. Dropping the channel kills and reaps the process.
pub struct ProcessChannel {
    label: String,
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr_text: Arc<Mutex<String>>,
    stderr_reader: Option<JoinHandle<()>>,
}

impl ProcessChannel {
    /// Spawns `command` with all three standard streams piped.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::SpawnError`] if the process cannot be started,
    /// typically because the executable doesn't exist or lacks permissions.
    pub fn spawn(label: impl Into<String>, mut command: Command) -> Result<Self, ChannelError> {
        let label = label.into();
        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ChannelError::SpawnError)?;

        let (stdin, stdout, stderr) = match (
            process.stdin.take(),
            process.stdout.take(),
            process.stderr.take(),
        ) {
            (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
            _ => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(ChannelError::SpawnError(std::io::Error::other(
                    "engine pipes unavailable",
                )));
            }
        };

        let stderr_text = Arc::new(Mutex::new(String::new()));
        let stderr_reader = spawn_stderr_reader(&label, stderr, Arc::clone(&stderr_text));

        tracing::debug!(engine = %label, pid = process.id(), "spawned engine");

        Ok(Self {
            label,
            process,
            stdin,
            stdout: BufReader::new(stdout),
            stderr_text,
            stderr_reader,
        })
    }

    /// Kills the process and builds the termination error with captured stderr.
    ///
    /// The stderr reader gets [`QUIT_GRACE`] to reach end of stream. A descendant of
    /// the engine may still hold the pipe open, in which case the reader is left
    /// running and whatever it captured so far is reported.
    fn terminated(&mut self) -> ChannelError {
        let _ = self.process.kill();
        let _ = self.process.wait();
        if let Some(reader) = self.stderr_reader.take() {
            let deadline = Instant::now() + QUIT_GRACE;
            while !reader.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(10));
            }
            if reader.is_finished() {
                let _ = reader.join();
            }
        }
        let stderr = self
            .stderr_text
            .lock()
            .map(|text| text.clone())
            .unwrap_or_default();
        tracing::warn!(engine = %self.label, "engine terminated unexpectedly");
        ChannelError::ProcessTerminated {
            engine: self.label.clone(),
            stderr,
        }
    }
}

fn spawn_stderr_reader<R: Read + Send + 'static>(
    label: &str,
    stderr: R,
    sink: Arc<Mutex<String>>,
) -> Option<JoinHandle<()>> {
    let engine = label.to_string();
    let spawned = std::thread::Builder::new()
        .name(format!("{}-stderr", label))
        .spawn(move || {
            let mut reader = BufReader::new(stderr);
            while let Ok(Some(line)) = read_text_line(&mut reader) {
                tracing::trace!(engine = %engine, "stderr: {}", line);
                if let Ok(mut captured) = sink.lock() {
                    let room = STDERR_CAPTURE_LIMIT.saturating_sub(captured.chars().count());
                    let separator = if captured.is_empty() { "" } else { "\n" };
                    let piece: String = separator.chars().chain(line.chars()).take(room).collect();
                    captured.push_str(&piece);
                }
            }
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(engine = %label, "cannot drain stderr: {}", e);
            None
        }
    }
}

impl Transport for ProcessChannel {
    fn label(&self) -> &str {
        &self.label
    }

    fn write_line(&mut self, line: &str) -> Result<(), ChannelError> {
        let written = writeln!(self.stdin, "{}", line).and_then(|_| self.stdin.flush());
        match written {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Err(self.terminated()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_line(&mut self) -> Result<String, ChannelError> {
        match read_text_line(&mut self.stdout)? {
            Some(line) => Ok(line),
            None => Err(self.terminated()),
        }
    }

    /// Waits up to [`QUIT_GRACE`] for the process to exit, then kills it.
    fn close(&mut self) {
        let deadline = Instant::now() + QUIT_GRACE;
        while Instant::now() < deadline {
            match self.process.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => std::thread::sleep(Duration::from_millis(10)),
                Err(_) => break,
            }
        }
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

impl Drop for ProcessChannel {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Transport over any reader/writer pair.
///
/// End of the reader counts as the peer terminating, with no stderr to report.
pub struct StreamChannel<R, W> {
    label: String,
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StreamChannel<R, W> {
    pub fn new(label: impl Into<String>, reader: R, writer: W) -> Self {
        Self {
            label: label.into(),
            reader,
            writer,
        }
    }

    /// Everything written so far.
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: BufRead, W: Write> Transport for StreamChannel<R, W> {
    fn label(&self) -> &str {
        &self.label
    }

    fn write_line(&mut self, line: &str) -> Result<(), ChannelError> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, ChannelError> {
        read_text_line(&mut self.reader)?.ok_or_else(|| ChannelError::ProcessTerminated {
            engine: self.label.clone(),
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn channel(input: &str) -> StreamChannel<Cursor<Vec<u8>>, Vec<u8>> {
        StreamChannel::new("peer", Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_write_line_appends_newline() {
        let mut ch = channel("");
        ch.write_line("1 clear_board").unwrap();
        ch.write_line("2 genmove b").unwrap();
        assert_eq!(
            String::from_utf8(ch.writer().clone()).unwrap(),
            "1 clear_board\n2 genmove b\n"
        );
    }

    #[test]
    fn test_read_line_strips_terminators() {
        let mut ch = channel("= 1\r\n\r\nnext\nlast");
        assert_eq!(ch.read_line().unwrap(), "= 1");
        assert_eq!(ch.read_line().unwrap(), "");
        assert_eq!(ch.read_line().unwrap(), "next");
        assert_eq!(ch.read_line().unwrap(), "last");
    }

    #[test]
    fn test_end_of_stream_is_process_terminated() {
        let mut ch = channel("only\n");
        ch.read_line().unwrap();
        match ch.read_line() {
            Err(ChannelError::ProcessTerminated { engine, stderr }) => {
                assert_eq!(engine, "peer");
                assert!(stderr.is_empty());
            }
            other => panic!("Expected ProcessTerminated, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let bytes = vec![b'=', b' ', 0xff, b'\n'];
        let mut ch = StreamChannel::new("peer", Cursor::new(bytes), Vec::new());
        let line = ch.read_line().unwrap();
        assert!(line.starts_with("= "));
    }

    #[test]
    fn test_spawn_nonexistent_executable_returns_error() {
        let result = ProcessChannel::spawn("ghost", Command::new("/nonexistent/path/to/engine"));
        assert!(matches!(result, Err(ChannelError::SpawnError(_))));
    }

    #[test]
    fn test_error_display() {
        let err = ChannelError::ProcessTerminated {
            engine: "sensei".to_string(),
            stderr: "segfault".to_string(),
        };
        assert_eq!(err.to_string(), "sensei terminated. stderr=segfault");
    }
}
