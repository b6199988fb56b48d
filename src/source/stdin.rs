//! Chunk source reading the model token stream from standard input.

use super::ModelStream;
use crate::error::{Result, RoadVizError};
use std::io::Read;

/// Reads fixed-size byte chunks from any reader (stdin in the binary) and
/// yields them as UTF-8 text fragments.
///
/// A read may end mid-way through a multi-byte sequence; the incomplete
/// bytes are carried over so every yielded fragment is valid UTF-8.
pub struct StdinStream<R: Read> {
    reader: R,
    chunk_bytes: usize,
    /// Trailing bytes of an incomplete UTF-8 sequence from the last read.
    carry: Vec<u8>,
}

impl StdinStream<std::io::Stdin> {
    /// Wrap the process's standard input.
    pub fn stdin(chunk_bytes: usize) -> Self {
        Self::new(std::io::stdin(), chunk_bytes)
    }
}

impl<R: Read> StdinStream<R> {
    /// Wrap an arbitrary reader (used by tests).
    pub fn new(reader: R, chunk_bytes: usize) -> Self {
        Self {
            reader,
            chunk_bytes: chunk_bytes.max(1),
            carry: Vec::new(),
        }
    }
}

impl<R: Read> ModelStream for StdinStream<R> {
    fn next_chunk(&mut self) -> Option<Result<String>> {
        let mut buf = vec![0u8; self.chunk_bytes];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    if self.carry.is_empty() {
                        return None;
                    }
                    // Stream ended inside a multi-byte sequence.
                    self.carry.clear();
                    return Some(Err(RoadVizError::Transport(
                        "stream ended mid-way through a UTF-8 sequence".to_string(),
                    )));
                }
                Ok(n) => {
                    self.carry.extend_from_slice(&buf[..n]);
                    let valid_len = match std::str::from_utf8(&self.carry) {
                        Ok(_) => self.carry.len(),
                        Err(e) if e.error_len().is_none() => e.valid_up_to(),
                        Err(e) => {
                            return Some(Err(RoadVizError::Transport(format!(
                                "invalid UTF-8 in model stream: {e}"
                            ))))
                        }
                    };
                    if valid_len == 0 {
                        // Only a partial sequence so far; read more.
                        continue;
                    }
                    let rest = self.carry.split_off(valid_len);
                    let text = String::from_utf8(std::mem::replace(&mut self.carry, rest))
                        .expect("validated prefix is UTF-8");
                    return Some(Ok(text));
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Some(Err(RoadVizError::Transport(format!(
                        "failed to read model stream: {e}"
                    ))))
                }
            }
        }
    }
}
