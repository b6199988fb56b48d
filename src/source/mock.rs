//! Scripted model stream for tests and benches.

use super::ModelStream;
use crate::error::{Result, RoadVizError};
use std::collections::VecDeque;

/// A [`ModelStream`] that replays a scripted sequence of fragments, with
/// optional failure injection.
///
/// ```
/// use roadviz_rs::source::{MockModelStream, ModelStream};
///
/// let mut stream = MockModelStream::from_text(r#"[{"id":"1"}]"#, 5);
/// assert!(stream.next_chunk().is_some());
/// ```
#[derive(Debug, Default)]
pub struct MockModelStream {
    chunks: VecDeque<String>,
    /// Fail after this many chunks have been yielded, if set.
    fail_after: Option<usize>,
    yielded: usize,
}

impl MockModelStream {
    /// Script an explicit chunk sequence.
    pub fn from_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            fail_after: None,
            yielded: 0,
        }
    }

    /// Split `text` into fragments of at most `chunk_size` characters.
    ///
    /// Splits on character boundaries; chunk boundaries land anywhere within
    /// records, which is exactly what the decoder must tolerate.
    pub fn from_text(text: &str, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let mut chunks = VecDeque::new();
        let mut current = String::new();
        let mut len = 0;
        for c in text.chars() {
            current.push(c);
            len += 1;
            if len >= chunk_size {
                chunks.push_back(std::mem::take(&mut current));
                len = 0;
            }
        }
        if !current.is_empty() {
            chunks.push_back(current);
        }
        Self {
            chunks,
            fail_after: None,
            yielded: 0,
        }
    }

    /// Inject a transport failure after `n` chunks have been yielded.
    pub fn with_failure_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl ModelStream for MockModelStream {
    fn next_chunk(&mut self) -> Option<Result<String>> {
        if let Some(limit) = self.fail_after {
            if self.yielded >= limit {
                self.fail_after = None;
                return Some(Err(RoadVizError::Transport(
                    "injected model stream failure".to_string(),
                )));
            }
        }
        let chunk = self.chunks.pop_front()?;
        self.yielded += 1;
        Some(Ok(chunk))
    }
}
