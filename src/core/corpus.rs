//! Corpus bootstrap.
//!
//! Initializes the vocabulary and registers the corpus entry point. Safe
//! to call any number of times: later calls find what the first created.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domain::schema::CORPUS_NODE_NAME;
use crate::domain::{NodeId, Version};
use crate::error::Result;
use crate::store::GraphStore;

use super::lane::WriteLane;
use super::vocabulary::{ensure_entry_point, lookup_entry_point, Vocabulary};

/// Entry points created by the bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRoots {
    pub vocabulary: NodeId,
    pub corpus: NodeId,
}

/// Idempotent initializer of the global entry points
pub struct Corpus {
    store: Arc<dyn GraphStore>,
    vocabulary: Arc<Vocabulary>,
    lane: Arc<WriteLane>,
}

impl Corpus {
    pub fn new(
        store: Arc<dyn GraphStore>,
        vocabulary: Arc<Vocabulary>,
        lane: Arc<WriteLane>,
    ) -> Self {
        Self {
            store,
            vocabulary,
            lane,
        }
    }

    #[instrument(skip(self))]
    pub async fn initialize(&self, version: Version) -> Result<CorpusRoots> {
        let vocabulary = self.vocabulary.initialize(version).await?;

        let _lane = self.lane.enter().await;
        let (corpus, created) =
            ensure_entry_point(self.store.as_ref(), version, CORPUS_NODE_NAME).await?;
        if created {
            info!(%corpus, "Corpus initialized");
        } else {
            debug!(%corpus, "Corpus already initialized");
        }

        Ok(CorpusRoots { vocabulary, corpus })
    }

    /// The corpus entry point, if it has been created
    pub async fn root(&self, version: Version) -> Result<Option<NodeId>> {
        lookup_entry_point(self.store.as_ref(), version, CORPUS_NODE_NAME).await
    }
}
