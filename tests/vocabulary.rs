//! Vocabulary Integration Tests
//!
//! Bootstrap, idempotence across versions and concurrent token creation.

use std::sync::Arc;

use tokengraph::core::TokenIndex;
use tokengraph::domain::schema::{ENTRY_POINT_INDEX, NAME, VOCABULARY_NODE_NAME};
use tokengraph::store::{GraphStore, MemoryGraph};
use tokengraph::{TokenError, Version};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn index() -> (Arc<MemoryGraph>, TokenIndex) {
    let graph = Arc::new(MemoryGraph::new());
    let index = TokenIndex::new(graph.clone());
    (graph, index)
}

#[tokio::test]
async fn test_uninitialized_vocabulary_is_reported() {
    let (graph, index) = index();

    let err = index.retrieve_vocabulary_node(Version::ZERO).await.unwrap_err();
    assert!(matches!(err, TokenError::UninitializedVocabulary));

    let err = index
        .get_or_create_tokens_from_string(Version::ZERO, &strings(&["word"]))
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::UninitializedVocabulary));
    assert_eq!(graph.node_count().await, 0);
}

#[tokio::test]
async fn test_initialize_twice_yields_one_root() {
    let (graph, index) = index();

    let first = index.initialize_vocabulary(Version::ZERO).await.unwrap();
    let second = index.initialize_vocabulary(Version::ZERO).await.unwrap();
    assert_eq!(first, second);

    let registered = graph
        .global_index_lookup(Version::ZERO, ENTRY_POINT_INDEX, NAME, VOCABULARY_NODE_NAME)
        .await
        .unwrap();
    assert_eq!(registered, vec![first]);
    assert_eq!(index.retrieve_vocabulary_node(Version::ZERO).await.unwrap(), first);
}

#[tokio::test]
async fn test_root_is_not_visible_before_its_version() {
    let (_graph, index) = index();
    index.initialize_vocabulary(Version::new(2)).await.unwrap();

    let err = index.retrieve_vocabulary_node(Version::new(1)).await.unwrap_err();
    assert!(matches!(err, TokenError::UninitializedVocabulary));
    assert!(index.retrieve_vocabulary_node(Version::new(3)).await.is_ok());
}

#[tokio::test]
async fn test_earlier_initialize_reuses_later_root() {
    let (graph, index) = index();

    let late = index.initialize_corpus(Version::new(4)).await.unwrap();
    let early = index.initialize_corpus(Version::ZERO).await.unwrap();
    assert_eq!(late, early);

    let roots = graph
        .global_index_lookup(Version::new(5), ENTRY_POINT_INDEX, NAME, VOCABULARY_NODE_NAME)
        .await
        .unwrap();
    assert_eq!(roots, vec![late.vocabulary]);
    assert_eq!(index.retrieve_vocabulary_node(Version::ZERO).await.unwrap(), late.vocabulary);
}

#[tokio::test]
async fn test_get_or_create_is_idempotent_within_a_version() {
    let (_graph, index) = index();
    index.initialize_vocabulary(Version::ZERO).await.unwrap();

    for word in ["apple", "cloud", "Ünïcödé", "a-b"] {
        let first = index
            .get_or_create_tokens_from_string(Version::ZERO, &strings(&[word]))
            .await
            .unwrap();
        let second = index
            .get_or_create_tokens_from_string(Version::ZERO, &strings(&[word]))
            .await
            .unwrap();
        assert_eq!(first, second, "'{word}' resolved to two tokens");
    }
}

#[tokio::test]
async fn test_tokens_are_shared_across_versions() {
    let (_graph, index) = index();
    index.initialize_vocabulary(Version::ZERO).await.unwrap();

    let early = index
        .get_or_create_tokens_from_string(Version::new(5), &strings(&["apple"]))
        .await
        .unwrap();
    let late = index
        .get_or_create_tokens_from_string(Version::new(1), &strings(&["apple"]))
        .await
        .unwrap();
    assert_eq!(early, late);
}

#[tokio::test]
async fn test_concurrent_creation_yields_one_token() {
    let graph = Arc::new(MemoryGraph::new());
    let index = Arc::new(TokenIndex::new(graph.clone()));
    index.initialize_vocabulary(Version::ZERO).await.unwrap();
    let before = graph.node_count().await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let index = index.clone();
        handles.push(tokio::spawn(async move {
            index
                .get_or_create_tokens_from_string(Version::ZERO, &strings(&["shared", "word"]))
                .await
                .unwrap()
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(graph.node_count().await, before + 2);
}
