//! RoadViz-RS - Main Entry Point
//!
//! Reads a generative model's token stream from stdin, decodes records
//! incrementally and either prints them (`--print`) or pushes them through
//! the event channel into the live graph builder.
//!
//! The model invocation itself is an external collaborator; pipe its output
//! in, e.g. `model-cli "List 10 React topics as a JSON array" | roadviz-rs`.

use anyhow::Context;
use roadviz_rs::{
    config::AppConfig,
    graph::EventConsumer,
    source::StdinStream,
    stream::{CallbackSink, ChannelSink, StreamSession},
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,roadviz_rs=trace")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let print_mode = std::env::args().any(|a| a == "--print");
    let config = AppConfig::load_or_default();
    tracing::info!("Starting RoadViz-RS");

    let running = Arc::new(AtomicBool::new(true));
    let mut source = StdinStream::stdin(config.stream.read_chunk_bytes);

    if print_mode {
        // Local mode: same pipeline, console sink.
        let sink = CallbackSink::new(|record: &roadviz_rs::Record| println!("{record}"));
        let mut session = StreamSession::new(sink, running);
        let outcome = session
            .run(&mut source)
            .context("stream session failed")?;
        let stats = session.stats();
        tracing::info!(?outcome, records = stats.records_emitted, "Done");
        return Ok(());
    }

    // Transport mode: producer thread feeds the bounded event channel, the
    // consumer loop folds events into the graph.
    let (tx, rx) = crossbeam_channel::bounded(config.stream.channel_capacity);
    let producer = std::thread::spawn(move || {
        let mut session = StreamSession::new(ChannelSink::new(tx), running);
        session.run(&mut source).map(|outcome| (outcome, session.stats()))
    });

    let mut consumer = EventConsumer::new(config.graph);
    consumer.run(&rx);

    let (outcome, stats) = producer
        .join()
        .map_err(|_| anyhow::anyhow!("producer thread panicked"))?
        .context("stream session failed")?;

    let graph = consumer.builder();
    tracing::info!(
        ?outcome,
        chunks = stats.chunks,
        records = stats.records_emitted,
        duplicates = stats.duplicates_dropped,
        decode_errors = stats.decode_errors,
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        viewport_y = consumer.viewport().y,
        "Shutting down"
    );

    for node in graph.nodes() {
        println!(
            "[{:>6.0}] {} — {}: {}",
            node.position.y, node.id, node.label.topic, node.label.description
        );
    }

    Ok(())
}
