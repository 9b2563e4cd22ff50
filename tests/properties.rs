//! Property tests for merging and canonical rendering.

use proptest::prelude::*;
use update_conf::core::MergeEngine;
use update_conf::document::Document;

fn value_line() -> impl Strategy<Value = String> {
    "[a-z0-9/._-]([a-z0-9/._= -]{0,10}[a-z0-9/._-])?"
}

fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => value_line(),
        1 => Just(String::new()),
        1 => (value_line(), value_line()).prop_map(|(a, b)| format!("{}\n{}", a, b)),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(
        (
            "[A-Za-z][A-Za-z0-9_-]{0,5}",
            prop::collection::vec(("[a-z_][a-z0-9_.]{0,5}", value()), 0..5),
        ),
        0..4,
    )
    .prop_map(|sections| {
        let mut doc = Document::new();
        for (name, entries) in sections {
            doc.section_mut(&name);
            for (key, value) in entries {
                doc.set(&name, key, value);
            }
        }
        doc
    })
}

/// Reference model: (section, key, value) triples in first-seen order.
fn model_merge(docs: &[Document]) -> Vec<(String, Vec<(String, String)>)> {
    let mut result: Vec<(String, Vec<(String, String)>)> = Vec::new();
    for doc in docs {
        for (name, section) in doc.sections() {
            let index = match result.iter().position(|(n, _)| n == name) {
                Some(index) => index,
                None => {
                    result.push((name.to_string(), Vec::new()));
                    result.len() - 1
                }
            };
            let entries = &mut result[index].1;
            for (key, value) in section.iter() {
                match entries.iter_mut().find(|(k, _)| k == key) {
                    Some(entry) => entry.1 = value.to_string(),
                    None => entries.push((key.to_string(), value.to_string())),
                }
            }
        }
    }
    result
}

fn flatten(doc: &Document) -> Vec<(String, Vec<(String, String)>)> {
    doc.sections()
        .map(|(name, section)| {
            (
                name.to_string(),
                section
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn merge_is_deterministic(docs in prop::collection::vec(document(), 0..5)) {
        let first = MergeEngine::merge(&docs);
        let second = MergeEngine::merge(&docs);
        prop_assert_eq!(first.render(), second.render());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn merge_keeps_first_position_and_last_value(docs in prop::collection::vec(document(), 0..5)) {
        let merged = MergeEngine::merge(&docs);
        prop_assert_eq!(flatten(&merged), model_merge(&docs));
    }

    #[test]
    fn render_parse_preserves_document(doc in document()) {
        let reparsed = Document::parse(&doc.render()).unwrap();
        prop_assert_eq!(reparsed, doc);
    }

    #[test]
    fn render_is_idempotent(doc in document()) {
        let rendered = doc.render();
        let again = Document::parse(&rendered).unwrap().render();
        prop_assert_eq!(again, rendered);
    }

    #[test]
    fn merging_with_itself_changes_nothing(doc in document()) {
        let merged = MergeEngine::merge([&doc, &doc]);
        prop_assert_eq!(merged, doc);
    }
}
