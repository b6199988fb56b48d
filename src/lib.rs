//! # RoadViz-RS: Streaming Record Visualizer
//!
//! Decodes flat JSON records incrementally from a generative model's token
//! stream and rebuilds them as a live chain graph on the consuming side.
//! Records are surfaced as soon as they are decodable — no waiting for the
//! whole response, no record emitted twice.
//!
//! ## Architecture
//!
//! - **Producer**: an incremental decoder and first-seen filter run on a
//!   dedicated thread, emitting framed events through a pluggable sink
//! - **Transport**: bounded crossbeam channel carrying one framed event per
//!   record plus a single terminal `end`/`error` block
//! - **Consumer**: a single-threaded event loop folding events into an
//!   arena-backed chain graph with a debounced viewport refit
//!
//! ## Example
//!
//! ```
//! use roadviz_rs::config::AppConfig;
//! use roadviz_rs::graph::EventConsumer;
//! use roadviz_rs::source::MockModelStream;
//! use roadviz_rs::stream::{ChannelSink, StreamSession};
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! let config = AppConfig::default();
//! let (tx, rx) = crossbeam_channel::bounded(config.stream.channel_capacity);
//!
//! let running = Arc::new(AtomicBool::new(true));
//! let producer = std::thread::spawn(move || {
//!     let mut source = MockModelStream::from_text(
//!         r#"[{"id":"1","topic":"Ownership","description":"who frees what"}]"#,
//!         5,
//!     );
//!     let mut session = StreamSession::new(ChannelSink::new(tx), running);
//!     session.run(&mut source)
//! });
//!
//! let mut consumer = EventConsumer::new(config.graph);
//! consumer.run(&rx);
//! producer.join().unwrap().unwrap();
//!
//! assert_eq!(consumer.builder().nodes().len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod source;
pub mod stream;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Result, RoadVizError};
pub use graph::{EventConsumer, GraphBuilder, GraphPhase, Viewport};
pub use source::{MockModelStream, ModelStream, StdinStream};
pub use stream::{
    CallbackSink, ChannelSink, Deduplicator, RecordSink, SessionOutcome, StreamDecoder,
    StreamSession,
};
pub use types::Record;
