//! Emit strategies for deduplicated records.
//!
//! One pipeline, pluggable delivery: the session is parameterized by a
//! [`RecordSink`] instead of duplicating the decode/dedup logic per call
//! site. Local mode forwards records to an in-process callback; transport
//! mode frames each record as one discrete push event and flushes it
//! immediately so a consumer can render progressively.
//!
//! Terminal semantics are shared by every sink: `end` and `error` are each
//! sent at most once, and a sink accepts no further records after either.

use crate::error::{Result, RoadVizError};
use crate::stream::wire;
use crate::types::Record;
use crossbeam_channel::Sender;
use std::io::Write;

/// Delivery strategy for accepted records plus the terminal outcome.
pub trait RecordSink {
    /// Deliver one deduplicated record. Must complete (or fail) before the
    /// caller processes the next chunk, preserving record order.
    fn emit(&mut self, record: &Record) -> Result<()>;

    /// Signal clean completion. At most once; no-op if already terminal.
    fn end(&mut self) -> Result<()>;

    /// Signal terminal failure. At most once; no-op if already terminal.
    fn error(&mut self, message: &str) -> Result<()>;
}

/// Local mode: forwards each record to an in-process callback.
pub struct CallbackSink<F: FnMut(&Record)> {
    callback: F,
    closed: bool,
}

impl<F: FnMut(&Record)> CallbackSink<F> {
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            closed: false,
        }
    }
}

impl<F: FnMut(&Record)> RecordSink for CallbackSink<F> {
    fn emit(&mut self, record: &Record) -> Result<()> {
        if self.closed {
            return Err(RoadVizError::Transport("sink already closed".to_string()));
        }
        (self.callback)(record);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        if !self.closed {
            tracing::error!("Stream failed: {}", message);
        }
        self.closed = true;
        Ok(())
    }
}

/// Transport mode over the in-process push channel: one framed event per
/// send, blocking on a bounded channel so wire order equals emit order.
pub struct ChannelSink {
    tx: Sender<String>,
    closed: bool,
}

impl ChannelSink {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx, closed: false }
    }

    fn send(&mut self, block: String) -> Result<()> {
        self.tx
            .send(block)
            .map_err(|_| RoadVizError::Transport("event channel disconnected".to_string()))
    }
}

impl RecordSink for ChannelSink {
    fn emit(&mut self, record: &Record) -> Result<()> {
        if self.closed {
            return Err(RoadVizError::Transport("sink already closed".to_string()));
        }
        self.send(wire::frame_record(record))
    }

    fn end(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.send(wire::frame_end())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.send(wire::frame_error(message))
    }
}

/// Transport mode over any byte sink: framed events written and flushed
/// individually, never batched.
pub struct SseWriter<W: Write> {
    writer: W,
    closed: bool,
}

impl<W: Write> SseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    /// Consume the sink, handing back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_block(&mut self, block: &str) -> Result<()> {
        self.writer
            .write_all(block.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| RoadVizError::Transport(format!("event write failed: {e}")))
    }
}

impl<W: Write> RecordSink for SseWriter<W> {
    fn emit(&mut self, record: &Record) -> Result<()> {
        if self.closed {
            return Err(RoadVizError::Transport("sink already closed".to_string()));
        }
        self.write_block(&wire::frame_record(record))
    }

    fn end(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.write_block(&wire::frame_end())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.write_block(&wire::frame_error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn record(s: &str) -> Record {
        Record::from_json_str(s).unwrap()
    }

    #[test]
    fn test_callback_sink_forwards_records() {
        let mut seen = Vec::new();
        let mut sink = CallbackSink::new(|r: &Record| seen.push(r.id().unwrap()));
        sink.emit(&record(r#"{"id":"1"}"#)).unwrap();
        sink.emit(&record(r#"{"id":"2"}"#)).unwrap();
        sink.end().unwrap();
        drop(sink);
        assert_eq!(seen, ["1", "2"]);
    }

    #[test]
    fn test_callback_sink_rejects_emit_after_end() {
        let mut sink = CallbackSink::new(|_: &Record| {});
        sink.end().unwrap();
        assert!(sink.emit(&record(r#"{"id":"1"}"#)).is_err());
    }

    #[test]
    fn test_channel_sink_frames_and_preserves_order() {
        let (tx, rx) = bounded(8);
        let mut sink = ChannelSink::new(tx);
        sink.emit(&record(r#"{"id":"1"}"#)).unwrap();
        sink.emit(&record(r#"{"id":"2"}"#)).unwrap();
        sink.end().unwrap();

        let blocks: Vec<String> = rx.try_iter().collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].contains(r#""id":"1""#));
        assert!(blocks[1].contains(r#""id":"2""#));
        assert_eq!(blocks[2], wire::frame_end());
    }

    #[test]
    fn test_channel_sink_terminal_events_sent_once() {
        let (tx, rx) = bounded(8);
        let mut sink = ChannelSink::new(tx);
        sink.end().unwrap();
        sink.end().unwrap();
        sink.error("late").unwrap();

        let blocks: Vec<String> = rx.try_iter().collect();
        assert_eq!(blocks, vec![wire::frame_end()]);
    }

    #[test]
    fn test_channel_sink_disconnected_receiver_is_transport_error() {
        let (tx, rx) = bounded(8);
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        let err = sink.emit(&record(r#"{"id":"1"}"#)).unwrap_err();
        assert!(matches!(err, RoadVizError::Transport(_)));
    }

    #[test]
    fn test_sse_writer_flushes_framed_blocks() {
        let mut sink = SseWriter::new(Vec::new());
        sink.emit(&record(r#"{"id":"1","topic":"A"}"#)).unwrap();
        sink.error("boom").unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with("data: {"));
        assert!(out.ends_with("event: error\ndata: boom\n\n"));
    }

    #[test]
    fn test_sse_writer_error_after_end_suppressed() {
        let mut sink = SseWriter::new(Vec::new());
        sink.end().unwrap();
        sink.error("late").unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, wire::frame_end());
    }
}
