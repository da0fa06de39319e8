//! In-memory temporal graph.
//!
//! Every attribute and relation is kept as a timeline keyed by version.
//! A read at version `v` resolves to the latest write at a version `<= v`,
//! so writing at a new version never disturbs what older versions observe.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::domain::{NodeId, Value, Version};

use super::{GraphStore, StoreError, StoreResult};

/// Version-keyed history of one value
#[derive(Debug, Clone)]
struct Timeline<T> {
    entries: BTreeMap<Version, T>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Timeline<T> {
    fn at(&self, version: Version) -> Option<&T> {
        self.entries.range(..=version).next_back().map(|(_, v)| v)
    }

    fn set(&mut self, version: Version, value: T) {
        self.entries.insert(version, value);
    }
}

#[derive(Debug)]
struct NodeRecord {
    created: Version,
    attributes: HashMap<String, Timeline<Value>>,
    relations: HashMap<String, Timeline<Vec<NodeId>>>,
}

/// Registrations of one `(index, key, value)` triple
type IndexSlot = Vec<(Version, NodeId)>;

#[derive(Debug, Default)]
struct GraphState {
    next_id: u64,
    nodes: HashMap<NodeId, NodeRecord>,
    indexes: HashMap<(String, String, String), IndexSlot>,
}

impl GraphState {
    fn node(&self, node: NodeId, version: Version) -> StoreResult<&NodeRecord> {
        match self.nodes.get(&node) {
            Some(record) if record.created <= version => Ok(record),
            _ => Err(StoreError::NodeNotFound { node, version }),
        }
    }

    fn node_mut(&mut self, node: NodeId, version: Version) -> StoreResult<&mut NodeRecord> {
        match self.nodes.get_mut(&node) {
            Some(record) if record.created <= version => Ok(record),
            _ => Err(StoreError::NodeNotFound { node, version }),
        }
    }
}

/// Temporal graph held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
}

impl MemoryGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created, across all versions
    pub async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_node(&self, version: Version) -> StoreResult<NodeId> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = NodeId::new(state.next_id);
        state.nodes.insert(
            id,
            NodeRecord {
                created: version,
                attributes: HashMap::new(),
                relations: HashMap::new(),
            },
        );
        trace!(node = %id, %version, "Created node");
        Ok(id)
    }

    async fn set_attribute(
        &self,
        node: NodeId,
        version: Version,
        key: &str,
        value: Value,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state
            .node_mut(node, version)?
            .attributes
            .entry(key.to_string())
            .or_default()
            .set(version, value);
        Ok(())
    }

    async fn attribute(
        &self,
        node: NodeId,
        version: Version,
        key: &str,
    ) -> StoreResult<Option<Value>> {
        let state = self.state.read().await;
        Ok(state
            .node(node, version)?
            .attributes
            .get(key)
            .and_then(|timeline| timeline.at(version))
            .cloned())
    }

    async fn read_relation(
        &self,
        node: NodeId,
        version: Version,
        name: &str,
    ) -> StoreResult<Vec<NodeId>> {
        let state = self.state.read().await;
        Ok(state
            .node(node, version)?
            .relations
            .get(name)
            .and_then(|timeline| timeline.at(version))
            .cloned()
            .unwrap_or_default())
    }

    async fn write_relation(
        &self,
        node: NodeId,
        version: Version,
        name: &str,
        refs: Vec<NodeId>,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state
            .node_mut(node, version)?
            .relations
            .entry(name.to_string())
            .or_default()
            .set(version, refs);
        Ok(())
    }

    async fn global_index_lookup(
        &self,
        version: Version,
        index: &str,
        key: &str,
        value: &str,
    ) -> StoreResult<Vec<NodeId>> {
        let state = self.state.read().await;
        let slot_key = (index.to_string(), key.to_string(), value.to_string());
        Ok(state
            .indexes
            .get(&slot_key)
            .map(|slot| {
                slot.iter()
                    .filter(|(since, _)| *since <= version)
                    .map(|(_, node)| *node)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn global_index_register(
        &self,
        version: Version,
        index: &str,
        key: &str,
        value: &str,
        node: NodeId,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.node(node, version)?;

        let slot = state
            .indexes
            .entry((index.to_string(), key.to_string(), value.to_string()))
            .or_default();

        match slot.iter_mut().find(|(_, existing)| *existing == node) {
            Some((since, _)) => *since = (*since).min(version),
            None => slot.push((version, node)),
        }
        Ok(())
    }
}
