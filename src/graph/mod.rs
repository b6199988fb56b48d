//! Consumer-side chain graph.
//!
//! The mirror of the producer pipeline: framed events arrive in FIFO order
//! and are folded into a linear node+edge structure reflecting arrival
//! order, with a debounced viewport keeping the newest node in view.
//!
//! ```text
//! [event channel] ──► [EventConsumer] ──► [GraphBuilder] ──► render surface
//!                                    └──► [RefitDebouncer]
//! ```

pub mod builder;
pub mod consumer;
pub mod viewport;

pub use builder::{GraphBuilder, GraphEdge, GraphNode, GraphPhase, NodeIndex, NodePosition};
pub use consumer::EventConsumer;
pub use viewport::{refit, RefitDebouncer, Viewport};
