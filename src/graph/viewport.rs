//! Viewport tracking and debounced refit.
//!
//! The render surface pans a viewport over the node column; after a burst of
//! node arrivals the viewport should land once, on the newest node, rather
//! than animate once per node. [`RefitDebouncer`] coalesces refit requests
//! into the most recent one and releases it after a quiet period; the
//! released refit is computed from the full current node set, so a request
//! that fires after additional nodes arrived is self-correcting.

use crate::config::GraphConfig;
use crate::graph::builder::GraphBuilder;
use std::time::{Duration, Instant};

/// Pan/zoom state of the graph render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Viewport scrolled so the given node y stays visible, with the
    /// configured margin above it.
    pub fn fit_latest(config: &GraphConfig, latest_y: f64) -> Self {
        Self {
            x: 0.0,
            y: latest_y - config.scroll_margin,
            zoom: config.zoom,
        }
    }
}

/// Coalesces repeated refit requests into one, fired after a quiet period.
#[derive(Debug)]
pub struct RefitDebouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl RefitDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Build from the configured debounce interval.
    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(Duration::from_millis(config.refit_debounce_ms))
    }

    /// Request a refit; an already pending request is pushed back to the new
    /// quiet period (coalescing).
    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Whether a request is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the pending request once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Compute the refit for the current node set: scroll to the newest node,
/// or the origin for an empty graph.
pub fn refit(builder: &GraphBuilder, config: &GraphConfig) -> Viewport {
    match builder.latest_node() {
        Some(node) => Viewport::fit_latest(config, node.position.y),
        None => Viewport {
            zoom: config.zoom,
            ..Viewport::default()
        },
    }
}
