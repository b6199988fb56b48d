//! Framed event wire format for the push transport.
//!
//! Each emitted record is one text block terminated by a blank line, in the
//! shape of a server-sent event stream:
//!
//! ```text
//! data: {"id":"...","topic":"...","description":"..."}\n\n
//! event: end\ndata: [DONE]\n\n
//! event: error\ndata: <message>\n\n
//! ```
//!
//! No other event types exist. For parity with producers that omit the
//! named-event framing, a bare `data:` block whose payload is literally
//! `[DONE]` is treated as `end`.

use crate::error::{Result, RoadVizError};
use crate::types::Record;

/// Terminal payload marking a cleanly completed stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Named event for clean completion
pub const END_EVENT: &str = "end";

/// Named event for terminal failure
pub const ERROR_EVENT: &str = "error";

/// One parsed transport event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A record payload
    Record(Record),
    /// Clean end of the stream
    End,
    /// Terminal failure with the producer's message
    Error(String),
}

/// Frame one record as a discrete push event.
pub fn frame_record(record: &Record) -> String {
    format!("data: {}\n\n", record.to_json_string())
}

/// Frame the single terminal success event.
pub fn frame_end() -> String {
    format!("event: {END_EVENT}\ndata: {DONE_SENTINEL}\n\n")
}

/// Frame the single terminal failure event.
///
/// Newlines in the message would break block framing, so they are collapsed
/// to spaces.
pub fn frame_error(message: &str) -> String {
    let flat = message.replace(['\n', '\r'], " ");
    format!("event: {ERROR_EVENT}\ndata: {flat}\n\n")
}

/// Parse one framed block into a [`StreamEvent`].
///
/// A malformed block is a recoverable consumer parse error; callers skip the
/// event and keep processing.
pub fn parse_frame(block: &str) -> Result<StreamEvent> {
    let mut event_name: Option<&str> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event_name = Some(name.trim());
        } else if let Some(payload) = line.strip_prefix("data:") {
            data_lines.push(payload.strip_prefix(' ').unwrap_or(payload));
        }
        // Unknown field lines are ignored, as an event-stream consumer must.
    }

    let data = data_lines.join("\n");

    match event_name {
        Some(END_EVENT) => Ok(StreamEvent::End),
        Some(ERROR_EVENT) => Ok(StreamEvent::Error(data)),
        Some(other) => Err(RoadVizError::ConsumerParse(format!(
            "unknown event type: {other}"
        ))),
        None => {
            if data == DONE_SENTINEL {
                return Ok(StreamEvent::End);
            }
            if data.is_empty() {
                return Err(RoadVizError::ConsumerParse(
                    "block carries no data".to_string(),
                ));
            }
            let record = Record::from_json_str(&data)
                .map_err(|e| RoadVizError::ConsumerParse(format!("invalid record payload: {e}")))?;
            Ok(StreamEvent::Record(record))
        }
    }
}
