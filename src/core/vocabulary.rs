//! Vocabulary manager: the canonical, deduplicated set of tokens.
//!
//! Tokens are anchored at [`Version::BEGINNING`] so that a string resolves
//! to the same token whichever version is being written.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::schema::{
    CONTENT_ID, ENTRY_POINT_INDEX, INVERTED_INDEX, NAME, POSITION, TYPE, VOCABULARY_INDEX,
    VOCABULARY_NODE_NAME,
};
use crate::domain::{InvertedIndexEntry, NodeId, Value, Version};
use crate::error::{Result, TokenError};
use crate::store::GraphStore;

use super::lane::{LaneGuard, WriteLane};

/// Owner of the vocabulary root and every token
pub struct Vocabulary {
    store: Arc<dyn GraphStore>,
    lane: Arc<WriteLane>,
}

impl Vocabulary {
    pub fn new(store: Arc<dyn GraphStore>, lane: Arc<WriteLane>) -> Self {
        Self { store, lane }
    }

    /// Ensure the vocabulary root exists and is indexed at `version`.
    ///
    /// Returns the existing root when one is already reachable. A root
    /// registered only at a later version is extended back to `version`,
    /// so a single root is reachable everywhere.
    #[instrument(skip(self))]
    pub async fn initialize(&self, version: Version) -> Result<NodeId> {
        let _lane = self.lane.enter().await;

        let (root, created) =
            ensure_entry_point(self.store.as_ref(), version, VOCABULARY_NODE_NAME).await?;
        if created {
            info!(%root, "Vocabulary initialized");
        } else {
            debug!(%root, "Vocabulary already initialized");
        }
        Ok(root)
    }

    /// Get the vocabulary root, failing when it was never initialized
    pub async fn retrieve_root(&self, version: Version) -> Result<NodeId> {
        self.lookup_root(version)
            .await?
            .ok_or(TokenError::UninitializedVocabulary)
    }

    async fn lookup_root(&self, version: Version) -> Result<Option<NodeId>> {
        lookup_entry_point(self.store.as_ref(), version, VOCABULARY_NODE_NAME).await
    }

    /// Resolve each string to its token, creating unseen ones.
    ///
    /// The result has the same length and order as `names`; equal strings
    /// resolve to the same token.
    #[instrument(skip(self, names), fields(count = names.len()))]
    pub async fn get_or_create_tokens(
        &self,
        version: Version,
        names: &[String],
    ) -> Result<Vec<NodeId>> {
        validate_names(names)?;
        self.retrieve_root(version).await?;

        let lane = self.lane.enter().await;
        self.get_or_create_in_lane(&lane, version, names).await
    }

    /// Same as [`Vocabulary::get_or_create_tokens`] for callers already in
    /// the write lane. Names must have been validated.
    pub(crate) async fn get_or_create_in_lane(
        &self,
        _lane: &LaneGuard<'_>,
        version: Version,
        names: &[String],
    ) -> Result<Vec<NodeId>> {
        let mut resolved: HashMap<&str, NodeId> = HashMap::new();
        let mut tokens = Vec::with_capacity(names.len());
        let mut created = 0usize;

        for name in names {
            let token = match resolved.get(name.as_str()) {
                Some(token) => *token,
                None => {
                    let token = match self.find_token(version, name).await? {
                        Some(token) => token,
                        None => {
                            created += 1;
                            self.create_token(name).await?
                        }
                    };
                    resolved.insert(name.as_str(), token);
                    token
                }
            };
            tokens.push(token);
        }

        debug!(
            requested = names.len(),
            distinct = resolved.len(),
            created,
            "Resolved tokens"
        );
        Ok(tokens)
    }

    async fn create_token(&self, name: &str) -> Result<NodeId> {
        let token = self.store.create_node(Version::BEGINNING).await?;
        self.store
            .set_attribute(token, Version::BEGINNING, NAME, Value::from(name))
            .await?;
        self.store
            .global_index_register(Version::BEGINNING, VOCABULARY_INDEX, NAME, name, token)
            .await?;
        Ok(token)
    }

    /// Look a token up by exact string
    pub async fn find_token(&self, version: Version, name: &str) -> Result<Option<NodeId>> {
        let found = self
            .store
            .global_index_lookup(version, VOCABULARY_INDEX, NAME, name)
            .await?;
        Ok(found.first().copied())
    }

    /// Surface strings of the given tokens, in order
    pub async fn token_names(&self, version: Version, tokens: &[NodeId]) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(tokens.len());
        for token in tokens {
            let name = self.store.attribute(*token, version, NAME).await?;
            match name.as_ref().and_then(Value::as_text) {
                Some(name) => names.push(name.to_string()),
                None => {
                    return Err(TokenError::InvalidContent(format!(
                        "node {token} is not a token"
                    )))
                }
            }
        }
        Ok(names)
    }

    /// Inverted-index entries of a token as of `version`
    pub async fn postings(
        &self,
        version: Version,
        token: NodeId,
    ) -> Result<Vec<InvertedIndexEntry>> {
        let entries = self
            .store
            .read_relation(token, version, INVERTED_INDEX)
            .await?;

        let mut postings = Vec::with_capacity(entries.len());
        for entry in entries {
            postings.push(read_entry(self.store.as_ref(), version, entry).await?);
        }
        Ok(postings)
    }
}

/// Entry point registered under `name` in the entry-point index at `version`
pub(crate) async fn lookup_entry_point(
    store: &dyn GraphStore,
    version: Version,
    name: &str,
) -> Result<Option<NodeId>> {
    let found = store
        .global_index_lookup(version, ENTRY_POINT_INDEX, NAME, name)
        .await?;
    Ok(found.first().copied())
}

/// Find or create the entry point `name`, reachable from `version` onward.
///
/// Entry-point nodes are anchored at [`Version::BEGINNING`]; only their
/// index registration carries `version`. Returns the node and whether it
/// was created. Callers must hold the write lane.
pub(crate) async fn ensure_entry_point(
    store: &dyn GraphStore,
    version: Version,
    name: &str,
) -> Result<(NodeId, bool)> {
    if let Some(node) = lookup_entry_point(store, version, name).await? {
        return Ok((node, false));
    }

    if let Some(node) = lookup_entry_point(store, Version::LATEST, name).await? {
        store
            .global_index_register(version, ENTRY_POINT_INDEX, NAME, name, node)
            .await?;
        debug!(%node, name, %version, "Entry point extended to an earlier version");
        return Ok((node, false));
    }

    let node = store.create_node(Version::BEGINNING).await?;
    store
        .set_attribute(node, Version::BEGINNING, NAME, Value::from(name))
        .await?;
    store
        .global_index_register(version, ENTRY_POINT_INDEX, NAME, name, node)
        .await?;
    Ok((node, true))
}

/// Reject strings that cannot name a token
pub(crate) fn validate_names(names: &[String]) -> Result<()> {
    if let Some(index) = names.iter().position(|n| n.is_empty()) {
        return Err(TokenError::InvalidContent(format!(
            "token at index {index} is empty"
        )));
    }
    Ok(())
}

/// Read one inverted-index entry node
pub(crate) async fn read_entry(
    store: &dyn GraphStore,
    version: Version,
    entry: NodeId,
) -> Result<InvertedIndexEntry> {
    let content = store
        .attribute(entry, version, CONTENT_ID)
        .await?
        .and_then(|v| v.as_id())
        .ok_or_else(|| TokenError::InvalidContent(format!("entry {entry} has no content id")))?;

    let content_type = store
        .attribute(entry, version, TYPE)
        .await?
        .and_then(|v| v.as_text().map(str::to_string))
        .unwrap_or_default();

    let positions = store
        .attribute(entry, version, POSITION)
        .await?
        .and_then(|v| v.as_int_list().map(<[usize]>::to_vec))
        .unwrap_or_default();

    Ok(InvertedIndexEntry {
        id: entry,
        content,
        content_type,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGraph;

    fn vocabulary() -> Vocabulary {
        Vocabulary::new(Arc::new(MemoryGraph::new()), Arc::new(WriteLane::new()))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_retrieve_before_initialize() {
        let vocab = vocabulary();
        let err = vocab.retrieve_root(Version::ZERO).await.unwrap_err();
        assert!(matches!(err, TokenError::UninitializedVocabulary));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let vocab = vocabulary();
        let first = vocab.initialize(Version::ZERO).await.unwrap();
        let again = vocab.initialize(Version::ZERO).await.unwrap();
        let later = vocab.initialize(Version::new(4)).await.unwrap();

        assert_eq!(first, again);
        assert_eq!(first, later);
        assert_eq!(vocab.retrieve_root(Version::new(1)).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_initialize_out_of_order_keeps_one_root() {
        let store = Arc::new(MemoryGraph::new());
        let vocab = Vocabulary::new(store.clone(), Arc::new(WriteLane::new()));

        let late = vocab.initialize(Version::new(4)).await.unwrap();
        let early = vocab.initialize(Version::ZERO).await.unwrap();
        assert_eq!(late, early);

        for version in [Version::ZERO, Version::new(4), Version::new(5)] {
            let roots = store
                .global_index_lookup(version, ENTRY_POINT_INDEX, NAME, VOCABULARY_NODE_NAME)
                .await
                .unwrap();
            assert_eq!(roots, vec![late], "roots at {version}");
        }
        assert_eq!(store.node_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_or_create_requires_root() {
        let vocab = vocabulary();
        let err = vocab
            .get_or_create_tokens(Version::ZERO, &strings(&["apple"]))
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::UninitializedVocabulary));
    }

    #[tokio::test]
    async fn test_duplicates_resolve_to_same_token() {
        let vocab = vocabulary();
        vocab.initialize(Version::ZERO).await.unwrap();

        let tokens = vocab
            .get_or_create_tokens(Version::ZERO, &strings(&["the", "apple", "the"]))
            .await
            .unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], tokens[2]);
        assert_ne!(tokens[0], tokens[1]);
        assert_eq!(
            vocab.token_names(Version::ZERO, &tokens).await.unwrap(),
            strings(&["the", "apple", "the"])
        );
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let vocab = vocabulary();
        vocab.initialize(Version::ZERO).await.unwrap();

        let err = vocab
            .get_or_create_tokens(Version::ZERO, &strings(&["ok", ""]))
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::InvalidContent(_)));
        assert!(vocab.find_token(Version::ZERO, "ok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() {
        let vocab = vocabulary();
        vocab.initialize(Version::ZERO).await.unwrap();

        let tokens = vocab
            .get_or_create_tokens(Version::ZERO, &strings(&["Apple", "apple"]))
            .await
            .unwrap();
        assert_ne!(tokens[0], tokens[1]);
    }
}
