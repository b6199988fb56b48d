//! End-to-end pipeline tests: model stream → decode → dedup → transport →
//! consumer → graph.

mod common;

use common::{chunked, roadmap_array, TWO_RECORD_ARRAY};
use roadviz_rs::config::AppConfig;
use roadviz_rs::graph::{EventConsumer, GraphPhase};
use roadviz_rs::source::MockModelStream;
use roadviz_rs::stream::{ChannelSink, SessionOutcome, StreamSession};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Run the full producer thread + consumer loop over a scripted stream.
fn run_pipeline(stream: MockModelStream) -> (EventConsumer, SessionOutcome) {
    let config = AppConfig::default();
    let (tx, rx) = crossbeam_channel::bounded(config.stream.channel_capacity);

    let running = Arc::new(AtomicBool::new(true));
    let producer = std::thread::spawn(move || {
        let mut stream = stream;
        let mut session = StreamSession::new(ChannelSink::new(tx), running);
        session.run(&mut stream)
    });

    let mut consumer = EventConsumer::new(config.graph);
    consumer.run(&rx);

    let outcome = producer
        .join()
        .expect("producer thread must not panic")
        .expect("session must not error");
    (consumer, outcome)
}

#[test]
fn two_records_in_three_chunks_build_two_nodes_one_edge() {
    // Three arbitrary chunk boundaries over the concrete scenario input.
    let len = TWO_RECORD_ARRAY.len();
    let stream = MockModelStream::from_chunks([
        &TWO_RECORD_ARRAY[..17],
        &TWO_RECORD_ARRAY[17..41],
        &TWO_RECORD_ARRAY[41..len],
    ]);

    let (consumer, outcome) = run_pipeline(stream);
    let graph = consumer.builder();

    // Exactly one end signal, zero error signals.
    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(graph.phase(), GraphPhase::Completed);
    assert!(graph.last_error().is_none());

    assert_eq!(graph.chain_ids(), ["1", "2"]);
    assert_eq!(graph.nodes().len(), 2);
    assert_eq!(graph.edges().len(), 1);
    assert_eq!(graph.edges()[0].id, "1-2");
    assert!(graph.is_simple_path());
}

#[test]
fn upstream_failure_after_one_record_leaves_one_node_and_failed_phase() {
    // The first chunk completes record 1; the failure lands mid-record 2.
    let stream = MockModelStream::from_chunks([
        r#"[{"id":"1","topic":"A","description":"d1"},"#,
        r#"{"id":"2","topic":"B""#,
    ])
    .with_failure_after(2);

    let (consumer, outcome) = run_pipeline(stream);
    let graph = consumer.builder();

    assert_eq!(outcome, SessionOutcome::Failed);
    assert_eq!(graph.phase(), GraphPhase::Failed);
    assert!(graph.last_error().is_some());

    // Exactly one node for the record emitted before the failure; the
    // in-flight incomplete buffer produced nothing.
    assert_eq!(graph.nodes().len(), 1);
    assert_eq!(graph.chain_ids(), ["1"]);
    assert!(graph.edges().is_empty());
}

#[test]
fn graph_matches_dedup_output_for_full_response() {
    let array = roadmap_array(10);
    let (consumer, outcome) = run_pipeline(MockModelStream::from_text(&array, 13));
    let graph = consumer.builder();

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(graph.nodes().len(), 10);
    assert_eq!(graph.edges().len(), 9);
    assert!(graph.is_simple_path());

    let expected: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
    assert_eq!(graph.chain_ids(), expected);
}

#[test]
fn duplicated_records_reach_the_graph_once() {
    let array = r#"[{"id":"1","topic":"A","description":"d"},{"id":"1","topic":"A","description":"d"},{"id":"2","topic":"B","description":"d"}]"#;
    let (consumer, _) = run_pipeline(MockModelStream::from_text(array, 8));
    let graph = consumer.builder();

    assert_eq!(graph.chain_ids(), ["1", "2"]);
    assert_eq!(graph.edges().len(), 1);
}

#[test]
fn truncated_trailing_object_is_dropped_without_failure() {
    let truncated = r#"[{"id":"1","topic":"A","description":"d1"},{"id":"2","topic":"B"#;
    let (consumer, outcome) = run_pipeline(MockModelStream::from_text(truncated, 10));
    let graph = consumer.builder();

    // The unterminated tail yields zero records; the stream still ends
    // cleanly with one end signal.
    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(graph.phase(), GraphPhase::Completed);
    assert_eq!(graph.chain_ids(), ["1"]);
}

#[test]
fn node_positions_follow_the_configured_layout() {
    let config = AppConfig::default();
    let (consumer, _) = run_pipeline(MockModelStream::from_text(&roadmap_array(3), 16));
    let graph = consumer.builder();

    for (i, node) in graph.nodes().iter().enumerate() {
        assert_eq!(node.position.x, config.graph.column_x);
        assert_eq!(node.position.y, i as f64 * config.graph.row_step);
    }

    // The final viewport keeps the newest node visible above the margin.
    let viewport = consumer.viewport();
    assert_eq!(
        viewport.y,
        2.0 * config.graph.row_step - config.graph.scroll_margin
    );
}

#[test]
fn every_chunking_of_the_same_input_yields_the_same_graph() {
    let array = roadmap_array(5);
    let baseline: Vec<String> = {
        let (consumer, _) = run_pipeline(MockModelStream::from_text(&array, array.len()));
        consumer
            .builder()
            .chain_ids()
            .iter()
            .map(|s| s.to_string())
            .collect()
    };

    for chunk_size in [1, 2, 5, 23] {
        let chunks = chunked(&array, chunk_size);
        let (consumer, outcome) = run_pipeline(MockModelStream::from_chunks(chunks));
        assert_eq!(outcome, SessionOutcome::Completed, "chunk size {chunk_size}");
        let ids: Vec<String> = consumer
            .builder()
            .chain_ids()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(ids, baseline, "chunk size {chunk_size}");
    }
}
