//! Storage collaborator interface.
//!
//! The core never persists anything itself: every read and write goes
//! through a [`GraphStore`], always scoped to an explicit version.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NodeId, Value, Version};

// Re-export the in-memory store
pub use memory::MemoryGraph;

/// Failures reported by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Node {node} does not exist at {version}")]
    NodeNotFound { node: NodeId, version: Version },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Trait for temporal graph backends
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Create a node that exists from `version` onward
    async fn create_node(&self, version: Version) -> StoreResult<NodeId>;

    /// Set an attribute at `version`, leaving earlier versions untouched
    async fn set_attribute(
        &self,
        node: NodeId,
        version: Version,
        key: &str,
        value: Value,
    ) -> StoreResult<()>;

    /// Read an attribute as of `version`
    async fn attribute(&self, node: NodeId, version: Version, key: &str)
        -> StoreResult<Option<Value>>;

    /// Read an ordered relation as of `version` (empty when never written)
    async fn read_relation(&self, node: NodeId, version: Version, name: &str)
        -> StoreResult<Vec<NodeId>>;

    /// Replace an ordered relation at `version`
    async fn write_relation(
        &self,
        node: NodeId,
        version: Version,
        name: &str,
        refs: Vec<NodeId>,
    ) -> StoreResult<()>;

    /// Find the nodes registered under `(key, value)` in a global index
    async fn global_index_lookup(
        &self,
        version: Version,
        index: &str,
        key: &str,
        value: &str,
    ) -> StoreResult<Vec<NodeId>>;

    /// Register a node under `(key, value)`, visible from `version` onward
    async fn global_index_register(
        &self,
        version: Version,
        index: &str,
        key: &str,
        value: &str,
        node: NodeId,
    ) -> StoreResult<()>;
}
