//! Consumer-side chain graph builder.
//!
//! One node per distinct record id, one edge per consecutive pair, in
//! arrival order. Nodes live in an arena `Vec` with an id → index map for
//! O(1) idempotent inserts; edges reference arena indices, so the structure
//! cannot form reference cycles. All mutation happens on the consumer's
//! single event loop.
//!
//! # Session state machine
//!
//! ```text
//! Idle ──start()──► Streaming ──on_end()───► Completed
//!                       │
//!                       └─────on_error()──► Failed
//! ```
//!
//! Only `Streaming` accepts records; both terminal states are absorbing.

use crate::config::GraphConfig;
use crate::types::{NodeLabel, Record};
use std::collections::HashMap;
use std::fmt;

/// Index into the node arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIndex({})", self.0)
    }
}

/// Position of a node on the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

/// One graph node; created exactly once per distinct record id and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Stable key derived from the record's own `id` field.
    pub id: String,
    /// Placement in the fixed column layout.
    pub position: NodePosition,
    /// Display payload derived from the record.
    pub label: NodeLabel,
}

/// One chain edge between consecutive nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    /// `"{source}-{target}"`, matching the node id format of the wire.
    pub id: String,
    pub source: NodeIndex,
    pub target: NodeIndex,
}

/// Session-scoped cursor advanced by one step per accepted node.
#[derive(Debug, Clone, Copy, Default)]
struct ChainCursor {
    previous: Option<NodeIndex>,
    next_y: f64,
}

/// Lifecycle of one graph session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphPhase {
    /// No stream attached yet.
    #[default]
    Idle,
    /// Receiving records.
    Streaming,
    /// Terminal: stream ended cleanly.
    Completed,
    /// Terminal: stream failed.
    Failed,
}

impl GraphPhase {
    /// Whether the session has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GraphPhase::Completed | GraphPhase::Failed)
    }
}

/// Builds and owns the chain graph for one stream session.
pub struct GraphBuilder {
    config: GraphConfig,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    index_by_id: HashMap<String, NodeIndex>,
    cursor: ChainCursor,
    phase: GraphPhase,
    last_error: Option<String>,
    /// Records ignored because they were duplicates, lacked an id, or
    /// arrived outside `Streaming`.
    ignored: u64,
}

impl GraphBuilder {
    /// Create an empty builder with the given layout configuration.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            index_by_id: HashMap::new(),
            cursor: ChainCursor::default(),
            phase: GraphPhase::Idle,
            last_error: None,
            ignored: 0,
        }
    }

    /// Attach the stream: `Idle → Streaming`. No-op in any other phase.
    pub fn start(&mut self) {
        if self.phase == GraphPhase::Idle {
            self.phase = GraphPhase::Streaming;
        }
    }

    /// Handle one record event in arrival order.
    ///
    /// Returns the index of the newly created node, or `None` when the
    /// record was ignored (duplicate id, missing id, or wrong phase).
    pub fn on_record(&mut self, record: &Record) -> Option<NodeIndex> {
        if self.phase != GraphPhase::Streaming {
            tracing::warn!(phase = ?self.phase, "Ignoring record outside streaming phase");
            self.ignored += 1;
            return None;
        }

        let Some(id) = record.id() else {
            tracing::warn!("Ignoring record without an id field");
            self.ignored += 1;
            return None;
        };

        if self.index_by_id.contains_key(&id) {
            // Defensive: the producer already deduplicates.
            self.ignored += 1;
            return None;
        }

        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(GraphNode {
            id: id.clone(),
            position: NodePosition {
                x: self.config.column_x,
                y: self.cursor.next_y,
            },
            label: record.label(),
        });
        self.index_by_id.insert(id, index);

        if let Some(previous) = self.cursor.previous {
            self.edges.push(GraphEdge {
                id: format!("{}-{}", self.nodes[previous.index()].id, self.nodes[index.index()].id),
                source: previous,
                target: index,
            });
        }

        self.cursor.previous = Some(index);
        self.cursor.next_y += self.config.row_step;
        Some(index)
    }

    /// Terminal success event: `Streaming → Completed`. Absorbing.
    pub fn on_end(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = GraphPhase::Completed;
        tracing::info!(nodes = self.nodes.len(), edges = self.edges.len(), "Graph completed");
    }

    /// Terminal failure event: `Streaming → Failed`. Absorbing.
    pub fn on_error(&mut self, message: &str) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = GraphPhase::Failed;
        self.last_error = Some(message.to_string());
        tracing::error!(nodes = self.nodes.len(), "Graph session failed: {}", message);
    }

    /// Drop every node and edge and return to `Idle` for a new session.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.index_by_id.clear();
        self.cursor = ChainCursor::default();
        self.phase = GraphPhase::Idle;
        self.last_error = None;
        self.ignored = 0;
    }

    pub fn phase(&self) -> GraphPhase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Node lookup by record id.
    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.index_by_id.get(id).map(|i| &self.nodes[i.index()])
    }

    /// The most recently added node.
    pub fn latest_node(&self) -> Option<&GraphNode> {
        self.nodes.last()
    }

    /// Records ignored (duplicates, missing id, wrong phase).
    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    /// Node ids in chain order, for consistency checks.
    pub fn chain_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Verify the simple-path invariant: edge k connects node k to node k+1.
    pub fn is_simple_path(&self) -> bool {
        if self.nodes.is_empty() {
            return self.edges.is_empty();
        }
        self.edges.len() == self.nodes.len() - 1
            && self
                .edges
                .iter()
                .enumerate()
                .all(|(k, e)| e.source.index() == k && e.target.index() == k + 1)
    }
}
