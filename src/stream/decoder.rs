//! Incremental record decoder for the model token stream.
//!
//! [`StreamDecoder`] consumes raw text fragments in arrival order and yields
//! complete records as soon as they are decodable. Internally it owns a
//! pending buffer of not-yet-decoded content and an explicit scanner state
//! machine:
//!
//! ```text
//! Outside ──'{'──► InObject(depth)
//!    ▲                 │ '{' depth+1, '}' depth-1
//!    └──── depth 0 ────┘ (quote toggles a string sub-state in which
//!                         braces are not counted and '\' escapes)
//! ```
//!
//! Braces inside string literals do not affect the depth counter, so a field
//! value such as `"note": "see {figure 3}"` cannot corrupt partitioning.
//! Array brackets and commas between records are discarded as punctuation.
//!
//! A candidate that closes at depth 0 is drained from the buffer and parsed;
//! a parse failure is a non-fatal decode error — the fragment is dropped and
//! scanning continues with the rest of the buffer.

use crate::types::Record;

/// Scanner state across one extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Between records; skipping array punctuation until the next `{`.
    Outside,
    /// Inside an object, tracking nesting depth (>= 1).
    InObject { depth: u32 },
}

/// Byte span of one complete object within the pending buffer.
#[derive(Debug, Clone, Copy)]
struct ObjectSpan {
    start: usize,
    /// Exclusive end (one past the closing brace).
    end: usize,
}

/// Incremental decoder: text fragments in, complete records out.
///
/// Restartable per session: one decoder instance is created per stream and
/// discarded with it. `feed` returns a lazy iterator that drains complete
/// records from the buffer; content that does not yet form a complete object
/// is retained for the next call.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Accumulating buffer of not-yet-fully-decoded stream content.
    buf: String,
    /// Complete objects successfully decoded so far.
    records_decoded: u64,
    /// Candidates dropped because they failed to parse.
    decode_errors: u64,
}

impl StreamDecoder {
    /// Create a decoder for a new stream session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and lazily drain every complete record it unlocks.
    ///
    /// The returned iterator borrows the decoder; collect it (or loop it to
    /// exhaustion) before the next `feed`.
    pub fn feed<'a>(&'a mut self, chunk: &str) -> CompleteRecords<'a> {
        self.buf.push_str(chunk);
        CompleteRecords { decoder: self }
    }

    /// Finish the stream, salvaging any trailing complete objects.
    ///
    /// Tolerates residual array wrappers, trailing commas and concatenated
    /// objects that lost their outer punctuation (a missing opening brace is
    /// reconstructed when the result parses). Unbalanced tails are discarded,
    /// never an error.
    pub fn flush(&mut self) -> Vec<Record> {
        // Anything still balanced in the buffer comes out the normal way.
        let mut records: Vec<Record> = CompleteRecords { decoder: self }.collect();

        let tail = std::mem::take(&mut self.buf);
        let tail = tail
            .trim_matches(|c: char| c.is_whitespace() || c == '[' || c == ']' || c == ',')
            .to_string();
        if tail.is_empty() {
            return records;
        }

        if !tail.starts_with('{') {
            // A lost opening brace (e.g. the chunk boundary swallowed it).
            // Reconstruct and rescan; if it still does not form complete
            // objects it is dropped below.
            self.buf = format!("{{{}", tail);
            records.extend(CompleteRecords { decoder: self });
        } else {
            self.buf = tail;
        }

        if !self.buf.is_empty() {
            tracing::debug!(
                discarded_bytes = self.buf.len(),
                "Discarding incomplete trailing fragment at end of stream"
            );
            self.buf.clear();
        }

        records
    }

    /// Bytes currently held back as an incomplete tail.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Complete objects successfully decoded so far.
    pub fn records_decoded(&self) -> u64 {
        self.records_decoded
    }

    /// Candidates dropped because they failed to parse.
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }

    /// Scan the buffer for the first complete object span.
    ///
    /// Returns `None` when no complete object can be found; the buffer is
    /// left untouched so the partial tail survives until the next `feed`.
    fn scan_object(&self) -> Option<ObjectSpan> {
        let mut state = ScanState::Outside;
        let mut in_string = false;
        let mut escaped = false;
        let mut start = 0;

        for (i, c) in self.buf.char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }

            match state {
                ScanState::Outside => {
                    if c == '{' {
                        start = i;
                        state = ScanState::InObject { depth: 1 };
                    }
                    // Everything else out here is array/comma punctuation.
                }
                ScanState::InObject { depth } => match c {
                    '"' => in_string = true,
                    '{' => state = ScanState::InObject { depth: depth + 1 },
                    '}' => {
                        if depth == 1 {
                            return Some(ObjectSpan {
                                start,
                                end: i + c.len_utf8(),
                            });
                        }
                        state = ScanState::InObject { depth: depth - 1 };
                    }
                    _ => {}
                },
            }
        }

        None
    }

    /// Extract the next complete record, dropping malformed candidates.
    fn next_record(&mut self) -> Option<Record> {
        while let Some(span) = self.scan_object() {
            let candidate = self.buf[span.start..span.end].to_string();
            // Drain the candidate and the punctuation before it.
            self.buf.drain(..span.end);

            match Record::from_json_str(&candidate) {
                Ok(record) => {
                    self.records_decoded += 1;
                    return Some(record);
                }
                Err(e) => {
                    self.decode_errors += 1;
                    tracing::warn!("Dropping malformed record fragment: {}", e);
                }
            }
        }
        None
    }
}

/// Draining iterator over the complete records currently in the buffer.
///
/// Produced by [`StreamDecoder::feed`]; stops as soon as only a partial tail
/// remains.
pub struct CompleteRecords<'a> {
    decoder: &'a mut StreamDecoder,
}

impl Iterator for CompleteRecords<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.decoder.next_record()
    }
}
