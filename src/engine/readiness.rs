// src/engine/readiness.rs

//! Readiness detection over accumulated backend output.
//!
//! Scanning always answers for the whole accumulated buffer, never just the
//! newest chunk: the marker may be split across chunk boundaries.

use std::fmt;

use regex::Regex;

use crate::config::ServerSection;
use crate::errors::{BootwatchError, Result};

/// Text whose first appearance means the backend accepts connections.
#[derive(Debug, Clone)]
pub enum ReadinessMarker {
    /// Literal substring, e.g. `"Uvicorn running on http://127.0.0.1:8008"`.
    Literal(String),
    /// Regex matched against the accumulated buffer. Use `(?m)` for
    /// line anchors.
    Pattern(Regex),
}

impl ReadinessMarker {
    /// The line a server prints once listening:
    /// `"<server> running on http://<host>:<port>"`.
    pub fn for_server(name: &str, host: &str, port: u16) -> Self {
        ReadinessMarker::Literal(format!("{name} running on http://{host}:{port}"))
    }

    pub fn from_config(server: &ServerSection) -> Result<Self> {
        match server.readiness_pattern {
            Some(ref pattern) => Regex::new(pattern)
                .map(ReadinessMarker::Pattern)
                .map_err(|e| {
                    BootwatchError::ConfigError(format!(
                        "[server].readiness_pattern '{}' is not a valid regex: {}",
                        pattern, e
                    ))
                }),
            None => Ok(Self::for_server(&server.name, &server.host, server.port)),
        }
    }
}

impl fmt::Display for ReadinessMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessMarker::Literal(s) => write!(f, "{s:?}"),
            ReadinessMarker::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Whether `marker` appears anywhere in `buffer`.
pub fn scan(buffer: &str, marker: &ReadinessMarker) -> bool {
    match marker {
        ReadinessMarker::Literal(m) => buffer.contains(m.as_str()),
        ReadinessMarker::Pattern(re) => re.is_match(buffer),
    }
}

/// Same answer as [`scan`] for a buffer whose first `appended_at` bytes
/// were already scanned without a match.
///
/// A literal marker can only newly match in a window starting
/// `marker.len() - 1` bytes before the appended text, so only that tail is
/// searched. Patterns have no fixed length and get the full buffer.
pub fn scan_appended(buffer: &str, appended_at: usize, marker: &ReadinessMarker) -> bool {
    match marker {
        ReadinessMarker::Literal(m) => {
            let overlap = m.len().saturating_sub(1);
            let start = floor_char_boundary(buffer, appended_at.saturating_sub(overlap));
            buffer[start..].contains(m.as_str())
        }
        ReadinessMarker::Pattern(_) => scan(buffer, marker),
    }
}

fn floor_char_boundary(s: &str, idx: usize) -> usize {
    let mut i = idx.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
