//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use roadviz_rs::types::Record;

/// The concrete two-record array from the pipeline contract.
pub const TWO_RECORD_ARRAY: &str =
    r#"[{"id":"1","topic":"A","description":"d1"},{"id":"2","topic":"B","description":"d2"}]"#;

/// Build a ten-record array mimicking a full model response.
pub fn roadmap_array(count: usize) -> String {
    let objects: Vec<String> = (1..=count)
        .map(|i| {
            format!(
                r#"{{"id":"{i}","topic":"Topic {i}","description":"One-liner about topic {i}"}}"#
            )
        })
        .collect();
    format!("[{}]", objects.join(","))
}

/// Split `text` into fragments of at most `size` characters.
pub fn chunked(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|c| c.iter().collect::<String>())
        .collect()
}

/// Parse a record literal, panicking on malformed test data.
pub fn record(s: &str) -> Record {
    Record::from_json_str(s).expect("test record literal must parse")
}

/// Ids of a record sequence, in order.
pub fn ids(records: &[Record]) -> Vec<String> {
    records.iter().filter_map(|r| r.id()).collect()
}
