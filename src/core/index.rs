//! Entry point for the operations exposed to callers.

use std::sync::Arc;

use crate::domain::{NodeId, RebuiltContent, TokenBundle, Version};
use crate::error::Result;
use crate::store::GraphStore;
use crate::tokenize::TokenizerFactory;

use super::corpus::{Corpus, CorpusRoots};
use super::lane::WriteLane;
use super::relation::{RelatedContent, RelationEngine};
use super::vocabulary::Vocabulary;

/// Vocabulary, relation engine and tokenizers over one graph
pub struct TokenIndex {
    store: Arc<dyn GraphStore>,
    vocabulary: Arc<Vocabulary>,
    relations: RelationEngine,
    corpus: Corpus,
    tokenizers: TokenizerFactory,
}

impl TokenIndex {
    /// Create an index over `store` with the built-in tokenizers
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self::with_tokenizers(store, TokenizerFactory::new())
    }

    pub fn with_tokenizers(store: Arc<dyn GraphStore>, tokenizers: TokenizerFactory) -> Self {
        let lane = Arc::new(WriteLane::new());
        let vocabulary = Arc::new(Vocabulary::new(store.clone(), lane.clone()));
        let relations = RelationEngine::new(store.clone(), vocabulary.clone(), lane.clone());
        let corpus = Corpus::new(store.clone(), vocabulary.clone(), lane);

        Self {
            store,
            vocabulary,
            relations,
            corpus,
            tokenizers,
        }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn relations(&self) -> &RelationEngine {
        &self.relations
    }

    pub async fn initialize_vocabulary(&self, version: Version) -> Result<NodeId> {
        self.vocabulary.initialize(version).await
    }

    pub async fn initialize_corpus(&self, version: Version) -> Result<CorpusRoots> {
        self.corpus.initialize(version).await
    }

    pub async fn retrieve_vocabulary_node(&self, version: Version) -> Result<NodeId> {
        self.vocabulary.retrieve_root(version).await
    }

    pub async fn get_or_create_tokens_from_string(
        &self,
        version: Version,
        names: &[String],
    ) -> Result<Vec<NodeId>> {
        self.vocabulary.get_or_create_tokens(version, names).await
    }

    pub fn tokenize_strings_using_tokenizer(
        &self,
        variant: &str,
        preprocessor: Option<&str>,
        content_type: &str,
        contents: &[String],
    ) -> Result<Vec<TokenBundle>> {
        self.tokenizers
            .tokenize_strings(variant, preprocessor, content_type, contents)
    }

    pub async fn create_or_update_tokenize_relations_to_nodes(
        &self,
        version: Version,
        bundles: &[TokenBundle],
        nodes: &[NodeId],
        labels: &[String],
    ) -> Result<Vec<RelatedContent>> {
        self.relations
            .update_or_create(version, bundles, nodes, labels)
            .await
    }

    pub async fn rebuild_tokenized_contents(
        &self,
        version: Version,
        contents: &[NodeId],
    ) -> Result<Vec<RebuiltContent>> {
        self.relations.rebuild(version, contents).await
    }
}
