// src/engine/accumulator.rs

use std::fmt;

use crate::exec::StreamKind;

/// Everything a backend wrote during one launch attempt.
///
/// Append-only while the attempt is starting; handed to the caller inside
/// the error if the attempt fails, discarded if it succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// Append `chunk` to the buffer for `kind`; returns the offset the
    /// chunk starts at.
    pub fn append(&mut self, kind: StreamKind, chunk: &str) -> usize {
        let buf = match kind {
            StreamKind::Stdout => &mut self.stdout,
            StreamKind::Stderr => &mut self.stderr,
        };
        let at = buf.len();
        buf.push_str(chunk);
        at
    }

    pub fn buffer(&self, kind: StreamKind) -> &str {
        match kind {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

impl fmt::Display for CapturedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- backend stdout ---")?;
        writeln!(f, "{}", self.stdout.trim_end())?;
        writeln!(f, "--- backend stderr ---")?;
        write!(f, "{}", self.stderr.trim_end())
    }
}
