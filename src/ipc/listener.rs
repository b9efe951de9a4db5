//! Unix-socket [`CommandSource`] implementation.
//!
//! Clients (key-bind helpers, scripts) connect, write one JSON [`Command`]
//! per line and get one JSON [`Reply`] line back for each, so a script can
//! tell a typo from an accepted command.
//!
//! # Wire format
//!
//! ```json
//! {"PullGroup":"Right"}
//! {"Group":{"Merge":[3,1]}}
//! {"Group":{"WithGroup":["SwapDown",3]}}
//! {"Group":{"SubMessage":["NextLayout",3]}}
//! {"Open":7}
//! "Redraw"
//! ```
//!
//! Replies are `"queued"` or `{"rejected":"<parse error>"}`.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Answer to one request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    /// The command was handed to the daemon.
    Queued,
    /// The line was not a valid command.
    Rejected(String),
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whether the daemon still accepts commands after a client is served.
enum Served {
    Open,
    SinkClosed,
}

/// A [`CommandSource`] reading commands from a Unix stream socket, one
/// client at a time.
pub struct UnixSocketListener {
    path: PathBuf,
}

impl UnixSocketListener {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse one request line.
fn parse_line(text: &str) -> Result<Command, Reply> {
    serde_json::from_str(text).map_err(|e| Reply::Rejected(e.to_string()))
}

fn write_reply(stream: &mut UnixStream, reply: &Reply) -> Result<(), UnixSocketError> {
    let mut line = serde_json::to_string(reply)?;
    line.push('\n');
    stream.write_all(line.as_bytes())?;
    Ok(())
}

/// Read commands from one client until it hangs up.
fn serve(stream: UnixStream, sink: &mpsc::Sender<Command>) -> Result<Served, UnixSocketError> {
    let mut writer = stream.try_clone()?;
    for line in BufReader::new(stream).lines() {
        let text = line?;
        if text.trim().is_empty() {
            continue;
        }
        let reply = match parse_line(&text) {
            Ok(cmd) => {
                debug!("received {:?}", cmd);
                if sink.send(cmd).is_err() {
                    return Ok(Served::SinkClosed);
                }
                Reply::Queued
            }
            Err(reply) => {
                warn!("bad command: {}", text);
                reply
            }
        };
        write_reply(&mut writer, &reply)?;
    }
    Ok(Served::Open)
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and serve clients until the daemon stops reading.
    ///
    /// Blocks; run it on a dedicated thread.  The socket file is removed
    /// on return.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        // Stale socket from a previous run.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("accept error: {}", e);
                    continue;
                }
            };
            match serve(stream, &sink) {
                Ok(Served::Open) => debug!("client disconnected"),
                Ok(Served::SinkClosed) => {
                    info!("sink closed, shutting down");
                    break;
                }
                Err(e) => warn!("client error: {}", e),
            }
        }

        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests
