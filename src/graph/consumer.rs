//! Consumer event loop.
//!
//! [`EventConsumer`] sits on the receiving end of the push transport: it
//! drains framed event blocks in FIFO order, parses each one, and drives the
//! [`GraphBuilder`] plus the refit debouncer. Each event is handled to
//! completion before the next is dequeued. A malformed payload is skipped
//! (recoverable); a channel that disconnects without a terminal event is
//! reported as a transport failure.

use crate::config::GraphConfig;
use crate::graph::builder::GraphBuilder;
use crate::graph::viewport::{refit, RefitDebouncer, Viewport};
use crate::stream::wire::{parse_frame, StreamEvent};
use crossbeam_channel::Receiver;
use std::time::Instant;

/// Receives framed events and maintains the graph for one session.
pub struct EventConsumer {
    builder: GraphBuilder,
    debouncer: RefitDebouncer,
    config: GraphConfig,
    viewport: Viewport,
    parse_errors: u64,
}

impl EventConsumer {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            builder: GraphBuilder::new(config.clone()),
            debouncer: RefitDebouncer::from_config(&config),
            viewport: Viewport {
                zoom: config.zoom,
                ..Viewport::default()
            },
            config,
            parse_errors: 0,
        }
    }

    /// Handle one framed block. Returns `true` while the session is live,
    /// `false` once a terminal event has been absorbed.
    pub fn handle_block(&mut self, block: &str, now: Instant) -> bool {
        match parse_frame(block) {
            Ok(StreamEvent::Record(record)) => {
                if self.builder.on_record(&record).is_some() {
                    self.debouncer.request(now);
                }
                true
            }
            Ok(StreamEvent::End) => {
                self.builder.on_end();
                false
            }
            Ok(StreamEvent::Error(message)) => {
                self.builder.on_error(&message);
                false
            }
            Err(e) => {
                // Recoverable: skip the event, keep consuming.
                self.parse_errors += 1;
                tracing::warn!("Skipping malformed event: {}", e);
                true
            }
        }
    }

    /// Fire the pending refit if its quiet period elapsed, recomputing from
    /// the full current node set.
    pub fn poll_refit(&mut self, now: Instant) -> Option<Viewport> {
        if self.debouncer.poll(now) {
            self.viewport = refit(&self.builder, &self.config);
            tracing::debug!(y = self.viewport.y, "Viewport refit");
            return Some(self.viewport);
        }
        None
    }

    /// Drain the transport until a terminal event or disconnect.
    ///
    /// Blocks on the channel; intended to run on the consumer's dedicated
    /// loop. A disconnect before any terminal event is a transport failure.
    pub fn run(&mut self, rx: &Receiver<String>) {
        self.builder.start();
        loop {
            match rx.recv() {
                Ok(block) => {
                    let live = self.handle_block(&block, Instant::now());
                    self.poll_refit(Instant::now());
                    if !live {
                        break;
                    }
                }
                Err(_) => {
                    if !self.builder.phase().is_terminal() {
                        self.builder.on_error("transport disconnected");
                    }
                    break;
                }
            }
        }
        // Land the viewport on the final node set.
        if self.debouncer.is_pending() {
            self.viewport = refit(&self.builder, &self.config);
        }
    }

    pub fn builder(&self) -> &GraphBuilder {
        &self.builder
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Malformed events skipped so far.
    pub fn parse_errors(&self) -> u64 {
        self.parse_errors
    }
}
