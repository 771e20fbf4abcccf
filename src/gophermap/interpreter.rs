//! Gophermap interpreter
//!
//! Walks a gophermap line by line and renders the menu it describes:
//!
//! - a line without tabs is a directive (`.` stops, `*` lists the directory)
//!   or else plain text shown as an info line;
//! - a line with tabs is a menu item.
//!
//! A line that fails to parse or send is reported and skipped; only `.` or
//! the end of the file stops processing.

use log::{debug, error};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWrite, BufReader};

use crate::client::Session;
use crate::error::TransferError;
use crate::protocol::GopherItem;
use crate::protocol::responses::MSG_MAP_PARSE_FAILED;
use crate::transfer::{send_dir, send_error, send_info, send_item};

/// What a single gophermap line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    Halt,
    ListDirectory,
    Info(&'a str),
    Item(&'a str),
}

/// Interpreter state between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Start,
    Halted,
}

/// Cuts a raw line at its first CR or LF.
pub fn strip_line_ending(raw: &str) -> &str {
    match raw.find(['\r', '\n']) {
        Some(end) => &raw[..end],
        None => raw,
    }
}

/// Classifies a line that has already been stripped of its line ending.
pub fn classify_line(line: &str) -> Directive<'_> {
    if line.contains('\t') {
        return Directive::Item(line);
    }

    match line {
        "." => Directive::Halt,
        "*" => Directive::ListDirectory,
        text => Directive::Info(text),
    }
}

/// Renders one gophermap file into a session.
pub struct GophermapInterpreter<'p> {
    path: &'p Path,
    state: MapState,
    line_number: usize,
    failed: usize,
}

impl<'p> GophermapInterpreter<'p> {
    pub fn new(path: &'p Path) -> Self {
        Self {
            path,
            state: MapState::Start,
            line_number: 0,
            failed: 0,
        }
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    /// Number of lines that could not be parsed or sent.
    pub fn failed_lines(&self) -> usize {
        self.failed
    }

    /// Processes the map until `.` or end of file.
    pub async fn run<W>(&mut self, session: &mut Session<W>) -> Result<(), TransferError>
    where
        W: AsyncWrite + Unpin,
    {
        let file = match File::open(self.path).await {
            Ok(file) => file,
            Err(e) => {
                error!(
                    "Failed to open gophermap for request selector '{}': {}",
                    session.selector(),
                    e
                );
                return Err(TransferError::FileOpenFailed(self.path.to_path_buf(), e));
            }
        };

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();

        while self.state == MapState::Start {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| TransferError::FileReadFailed(self.path.to_path_buf(), e))?;
            if n == 0 {
                self.state = MapState::Halted;
                break;
            }

            self.line_number += 1;
            let raw = String::from_utf8_lossy(&buf);
            self.state = self.step(session, strip_line_ending(&raw)).await;
        }

        debug!(
            "Gophermap {} processed {} line(s)",
            self.path.display(),
            self.line_number
        );

        if self.failed > 0 {
            return Err(TransferError::Incomplete {
                failed: self.failed,
            });
        }
        Ok(())
    }

    async fn step<W>(&mut self, session: &mut Session<W>, line: &str) -> MapState
    where
        W: AsyncWrite + Unpin,
    {
        match classify_line(line) {
            Directive::Halt => return MapState::Halted,
            Directive::ListDirectory => {
                let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
                if send_dir(session, dir, false).await.is_err() {
                    self.failed += 1;
                }
            }
            Directive::Info(text) => {
                if send_info(session, text).await.is_err() {
                    self.failed += 1;
                }
            }
            Directive::Item(line) => {
                let config = session.config();
                match GopherItem::parse(line, &config.default_hostname, config.default_port) {
                    Ok(item) => {
                        if send_item(session, &item).await.is_err() {
                            self.failed += 1;
                        }
                    }
                    Err(e) => {
                        error!(
                            "Failed to parse line {} of {}: {}",
                            self.line_number,
                            self.path.display(),
                            e
                        );
                        let _ = send_error(session, MSG_MAP_PARSE_FAILED).await;
                        self.failed += 1;
                    }
                }
            }
        }

        MapState::Start
    }
}
