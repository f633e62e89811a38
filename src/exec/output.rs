// src/exec/output.rs

//! Raw output readers for the backend's stdout/stderr.
//!
//! Output is forwarded as it arrives, in whatever chunks the OS hands back;
//! no line splitting happens here because the readiness marker may show up
//! mid-line or split across reads.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::exec::process::StreamKind;

/// Size of a single read from a pipe.
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Incremental UTF-8 decoder.
///
/// A multi-byte character split across two reads is held back until the
/// rest arrives; invalid bytes become `U+FFFD`.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more.
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush whatever is left once the stream has ended.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Spawn a task that reads `reader` to EOF and forwards decoded chunks.
///
/// If the receiving side goes away, reading continues and chunks are
/// dropped, so the child never blocks on a full pipe.
pub fn spawn_chunk_reader<R>(
    reader: R,
    kind: StreamKind,
    pid: Option<u32>,
    tx: mpsc::Sender<String>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = reader;
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let mut decoder = ChunkDecoder::default();
        let mut forwarding = true;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    warn!(stream = %kind, ?pid, error = %e, "failed to read backend output");
                    break;
                }
            };

            let text = decoder.decode(&buf[..n]);
            if !text.is_empty() {
                forward(&tx, &mut forwarding, kind, pid, text).await;
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            forward(&tx, &mut forwarding, kind, pid, tail).await;
        }

        debug!(stream = %kind, ?pid, "backend output reader ended");
    })
}

async fn forward(
    tx: &mpsc::Sender<String>,
    forwarding: &mut bool,
    kind: StreamKind,
    pid: Option<u32>,
    text: String,
) {
    debug!(stream = %kind, ?pid, "backend {}: {}", kind, text.trim_end());

    if *forwarding && tx.send(text).await.is_err() {
        debug!(stream = %kind, ?pid, "output consumer gone; discarding further chunks");
        *forwarding = false;
    }
}
