//! Producer-side streaming pipeline.
//!
//! Raw model text flows through three small components, each owning one
//! concern, joined by one session driver:
//!
//! ```text
//! [ModelStream] ──► [StreamDecoder] ──► [Deduplicator] ──► [RecordSink]
//!                     (partition)         (first-seen)       (deliver)
//! ```
//!
//! # Design
//!
//! - **One pipeline, pluggable delivery** — the sink is a strategy, so the
//!   print path and the transport path share the decode/dedup code.
//! - **Strictly sequential** — one decode pass per chunk, one blocking emit
//!   per record; wire order equals decode order without locks.
//! - **Failures stay local** — a malformed fragment or duplicate is a
//!   dropped unit of work; only transport failures end the session.

pub mod decoder;
pub mod dedup;
pub mod emitter;
pub mod session;
pub mod wire;

pub use decoder::StreamDecoder;
pub use dedup::Deduplicator;
pub use emitter::{CallbackSink, ChannelSink, RecordSink, SseWriter};
pub use session::{SessionOutcome, SessionStats, StreamSession};
pub use wire::{frame_end, frame_error, frame_record, parse_frame, StreamEvent, DONE_SENTINEL};
