//! Update Semantics Integration Tests
//!
//! Round trip, rebuilding, versioned updates and the position-list
//! invariant of the inverted index.

use std::collections::HashMap;
use std::sync::Arc;

use tokengraph::core::TokenIndex;
use tokengraph::domain::RebuiltContent;
use tokengraph::store::{GraphStore, MemoryGraph};
use tokengraph::{NodeId, TokenBundle, Version};

const V0: Version = Version::ZERO;
const V1: Version = Version::new(1);

const ORIGINAL: &str = "the apple was looking over the cloud";
const UPDATED: &str = "an ordinary apple was looking at a cloud";

async fn setup() -> (Arc<MemoryGraph>, TokenIndex, NodeId) {
    let graph = Arc::new(MemoryGraph::new());
    let index = TokenIndex::new(graph.clone());
    index.initialize_corpus(V0).await.unwrap();
    let node = graph.create_node(V0).await.unwrap();
    (graph, index, node)
}

fn tokenize(index: &TokenIndex, text: &str) -> Vec<TokenBundle> {
    index
        .tokenize_strings_using_tokenizer("default", None, "text", &[text.to_string()])
        .unwrap()
}

async fn relate(index: &TokenIndex, version: Version, node: NodeId, text: &str) -> NodeId {
    let related = index
        .create_or_update_tokenize_relations_to_nodes(
            version,
            &tokenize(index, text),
            &[node],
            &["text1".to_string()],
        )
        .await
        .unwrap();
    related[0].content
}

async fn names_at(index: &TokenIndex, version: Version, node: NodeId) -> Vec<String> {
    let record = index
        .relations()
        .tokenized_content(version, node, "text1")
        .await
        .unwrap()
        .unwrap();
    index.vocabulary().token_names(version, &record.tokens).await.unwrap()
}

/// Check that every token's positions for `content` are exactly its
/// occurrence indices, in ascending order
async fn assert_positions(index: &TokenIndex, version: Version, content: NodeId) {
    let record = index.relations().read_content(version, content).await.unwrap();

    let mut expected: HashMap<NodeId, Vec<usize>> = HashMap::new();
    for (position, token) in record.tokens.iter().enumerate() {
        expected.entry(*token).or_default().push(position);
    }

    for (token, occurrences) in expected {
        let entries: Vec<_> = index
            .vocabulary()
            .postings(version, token)
            .await
            .unwrap()
            .into_iter()
            .filter(|entry| entry.content == content)
            .collect();

        assert_eq!(entries.len(), 1, "token {token} has {} entries", entries.len());
        assert_eq!(entries[0].positions, occurrences);
        assert!(entries[0].positions.iter().all(|p| *p < record.tokens.len()));
    }
}

#[tokio::test]
async fn test_round_trip_preserves_order_and_repeats() {
    let (_graph, index, node) = setup().await;
    relate(&index, V0, node, ORIGINAL).await;

    let names = names_at(&index, V0, node).await;
    assert_eq!(names, tokenize(&index, ORIGINAL)[0].tokens);
    assert_eq!(names.len(), 7);

    let record = index
        .relations()
        .tokenized_content(V0, node, "text1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.tokens[0], record.tokens[5]);
}

#[tokio::test]
async fn test_rebuild_joins_tokens() {
    let (_graph, index, node) = setup().await;
    let content = relate(&index, V0, node, "a  b\tc a").await;

    let rebuilt = index.rebuild_tokenized_contents(V0, &[content]).await.unwrap();
    assert_eq!(
        rebuilt,
        vec![RebuiltContent {
            label: "text1".to_string(),
            content_type: "text".to_string(),
            content: "a b c a".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_update_in_later_version_keeps_history() {
    let (_graph, index, node) = setup().await;

    let first = relate(&index, V0, node, ORIGINAL).await;
    let second = relate(&index, V1, node, UPDATED).await;
    assert_eq!(first, second, "same (node, label) must update, not create");

    let at_v1 = names_at(&index, V1, node).await;
    assert_eq!(at_v1.len(), 8);
    assert_eq!(at_v1, tokenize(&index, UPDATED)[0].tokens);

    let at_v0 = names_at(&index, V0, node).await;
    assert_eq!(at_v0.len(), 7);
    assert_eq!(at_v0, tokenize(&index, ORIGINAL)[0].tokens);

    let records = index.relations().tokenized_contents(V1, node).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_positions_hold_every_occurrence() {
    let (_graph, index, node) = setup().await;
    let content = relate(&index, V0, node, ORIGINAL).await;
    assert_positions(&index, V0, content).await;

    relate(&index, V1, node, UPDATED).await;
    assert_positions(&index, V1, content).await;
    assert_positions(&index, V0, content).await;
}

#[tokio::test]
async fn test_dropped_tokens_lose_their_entry() {
    let (_graph, index, node) = setup().await;
    let content = relate(&index, V0, node, ORIGINAL).await;
    relate(&index, V1, node, UPDATED).await;

    // "the" and "over" only occur in the original text
    for word in ["the", "over"] {
        let token = index.vocabulary().find_token(V1, word).await.unwrap().unwrap();

        let now = index.vocabulary().postings(V1, token).await.unwrap();
        assert!(now.iter().all(|entry| entry.content != content), "'{word}' still indexed");

        let before = index.vocabulary().postings(V0, token).await.unwrap();
        assert!(before.iter().any(|entry| entry.content == content));
    }
}

#[tokio::test]
async fn test_content_type_change_replaces_entries() {
    let (_graph, index, node) = setup().await;
    let content = relate(&index, V0, node, "one two").await;

    let bundles = index
        .tokenize_strings_using_tokenizer("default", None, "title", &["one two".to_string()])
        .unwrap();
    index
        .create_or_update_tokenize_relations_to_nodes(V1, &bundles, &[node], &["text1".to_string()])
        .await
        .unwrap();

    let token = index.vocabulary().find_token(V1, "one").await.unwrap().unwrap();
    let entries = index.vocabulary().postings(V1, token).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].content, content);
    assert_eq!(entries[0].content_type, "title");
    assert_eq!(entries[0].positions, vec![0]);
}
