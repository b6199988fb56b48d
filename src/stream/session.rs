//! Producer-side stream session.
//!
//! One [`StreamSession`] drives one model response from first chunk to
//! terminal outcome: chunks are pulled in arrival order from a
//! [`ModelStream`], decoded incrementally, deduplicated, and emitted through
//! the configured [`RecordSink`]. There is no parallel mutation anywhere —
//! one decode pass completes before the next chunk is accepted, and every
//! emit is a blocking write from the loop's perspective, which is what keeps
//! record order on the wire equal to decode order.
//!
//! Cancellation is cooperative via an `Arc<AtomicBool>`; a cancelled session
//! discards its buffered-but-incomplete tail without flushing.

use crate::error::Result;
use crate::source::ModelStream;
use crate::stream::decoder::StreamDecoder;
use crate::stream::dedup::Deduplicator;
use crate::stream::emitter::RecordSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How a session run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Upstream ended cleanly; tail flushed; `end` event sent.
    Completed,
    /// Upstream or transport failed; `error` event sent.
    Failed,
    /// Session was cancelled; no terminal event sent.
    Cancelled,
}

/// Counters reported at the end of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Chunks consumed from the upstream stream.
    pub chunks: u64,
    /// Distinct records delivered to the sink.
    pub records_emitted: u64,
    /// Duplicates dropped by the deduplicator.
    pub duplicates_dropped: u64,
    /// Malformed candidates dropped by the decoder.
    pub decode_errors: u64,
}

/// Drives one model response through decode → dedup → emit.
pub struct StreamSession<S: RecordSink> {
    decoder: StreamDecoder,
    dedup: Deduplicator,
    sink: S,
    running: Arc<AtomicBool>,
    stats: SessionStats,
}

impl<S: RecordSink> StreamSession<S> {
    /// Create a session emitting into `sink`, cancellable via `running`.
    pub fn new(sink: S, running: Arc<AtomicBool>) -> Self {
        Self {
            decoder: StreamDecoder::new(),
            dedup: Deduplicator::new(),
            sink,
            running,
            stats: SessionStats::default(),
        }
    }

    /// Consume `source` to its end and deliver exactly one terminal outcome.
    pub fn run(&mut self, source: &mut dyn ModelStream) -> Result<SessionOutcome> {
        while let Some(chunk) = source.next_chunk() {
            if !self.running.load(Ordering::Relaxed) {
                tracing::info!("Session cancelled; discarding incomplete buffer");
                return Ok(SessionOutcome::Cancelled);
            }

            let text = match chunk {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Model stream failed: {}", e);
                    self.sink.error(&e.to_string())?;
                    return Ok(SessionOutcome::Failed);
                }
            };
            self.stats.chunks += 1;

            // Collect first: emitting must not hold the decoder borrow, and
            // a decode pass completes before the next chunk is accepted.
            let records: Vec<_> = self.decoder.feed(&text).collect();
            for record in &records {
                if !self.emit_if_new(record)? {
                    return Ok(SessionOutcome::Failed);
                }
            }
        }

        // Clean end: salvage the tail, then exactly one end event.
        let trailing = self.decoder.flush();
        for record in &trailing {
            if !self.emit_if_new(record)? {
                return Ok(SessionOutcome::Failed);
            }
        }

        self.sink.end()?;
        self.stats.decode_errors = self.decoder.decode_errors();
        self.stats.duplicates_dropped = self.dedup.duplicates();
        tracing::info!(
            records = self.stats.records_emitted,
            duplicates = self.stats.duplicates_dropped,
            decode_errors = self.stats.decode_errors,
            "Stream completed"
        );
        Ok(SessionOutcome::Completed)
    }

    /// Emit `record` unless it is a duplicate. Returns `Ok(false)` when the
    /// transport failed and the terminal error event was sent.
    fn emit_if_new(&mut self, record: &crate::types::Record) -> Result<bool> {
        if !self.dedup.accept(record) {
            return Ok(true);
        }
        if let Err(e) = self.sink.emit(record) {
            tracing::error!("Emit failed: {}", e);
            // Best effort: the transport that failed to carry the record may
            // also refuse the terminal event.
            let _ = self.sink.error(&e.to_string());
            self.stats.decode_errors = self.decoder.decode_errors();
            self.stats.duplicates_dropped = self.dedup.duplicates();
            return Ok(false);
        }
        self.stats.records_emitted += 1;
        Ok(true)
    }

    /// Counters for the run so far.
    pub fn stats(&self) -> SessionStats {
        let mut stats = self.stats;
        stats.decode_errors = self.decoder.decode_errors();
        stats.duplicates_dropped = self.dedup.duplicates();
        stats
    }

    /// Consume the session, handing back its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockModelStream;
    use crate::stream::emitter::CallbackSink;
    use crate::types::Record;
    use std::cell::RefCell;

    const TWO_RECORDS: &str =
        r#"[{"id":"1","topic":"A","description":"d1"},{"id":"2","topic":"B","description":"d2"}]"#;

    fn run_with_chunks(stream: &mut MockModelStream) -> (Vec<String>, SessionOutcome, SessionStats) {
        let seen = RefCell::new(Vec::new());
        let sink = CallbackSink::new(|r: &Record| seen.borrow_mut().push(r.id().unwrap()));
        let running = Arc::new(AtomicBool::new(true));
        let mut session = StreamSession::new(sink, running);
        let outcome = session.run(stream).unwrap();
        let stats = session.stats();
        drop(session);
        (seen.into_inner(), outcome, stats)
    }

    #[test]
    fn test_clean_run_emits_in_order() {
        let mut stream = MockModelStream::from_text(TWO_RECORDS, 7);
        let (ids, outcome, stats) = run_with_chunks(&mut stream);
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(outcome, SessionOutcome::Completed);
        assert_eq!(stats.records_emitted, 2);
        assert_eq!(stats.duplicates_dropped, 0);
    }

    #[test]
    fn test_chunk_invariance() {
        for chunk_size in [1, 5, TWO_RECORDS.len()] {
            let mut stream = MockModelStream::from_text(TWO_RECORDS, chunk_size);
            let (ids, outcome, _) = run_with_chunks(&mut stream);
            assert_eq!(ids, ["1", "2"], "chunk size {chunk_size}");
            assert_eq!(outcome, SessionOutcome::Completed);
        }
    }

    #[test]
    fn test_duplicate_records_emitted_once() {
        let doubled = r#"[{"id":"1","topic":"A"},{"id":"1","topic":"A"},{"topic":"A","id":"1"}]"#;
        let mut stream = MockModelStream::from_text(doubled, 9);
        let (ids, _, stats) = run_with_chunks(&mut stream);
        assert_eq!(ids, ["1"]);
        assert_eq!(stats.duplicates_dropped, 2);
    }

    #[test]
    fn test_truncated_tail_yields_no_record() {
        let truncated = r#"[{"id":"1","topic":"A"},{"id":"2","to"#;
        let mut stream = MockModelStream::from_text(truncated, 6);
        let (ids, outcome, _) = run_with_chunks(&mut stream);
        assert_eq!(ids, ["1"]);
        assert_eq!(outcome, SessionOutcome::Completed);
    }

    #[test]
    fn test_upstream_failure_sends_single_error() {
        let mut stream =
            MockModelStream::from_chunks([r#"[{"id":"1","topic":"A"},"#, r#"{"id":"2""#])
                .with_failure_after(2);
        let (ids, outcome, _) = run_with_chunks(&mut stream);
        assert_eq!(ids, ["1"]);
        assert_eq!(outcome, SessionOutcome::Failed);
    }

    #[test]
    fn test_cancellation_discards_tail() {
        let running = Arc::new(AtomicBool::new(true));
        let sink = CallbackSink::new(|_: &Record| {});
        let mut session = StreamSession::new(sink, running.clone());

        running.store(false, Ordering::Relaxed);
        let mut stream = MockModelStream::from_text(TWO_RECORDS, 4);
        let outcome = session.run(&mut stream).unwrap();
        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert_eq!(session.stats().records_emitted, 0);
    }
}
