//! Content relation engine.
//!
//! Binds tokenizer bundles to content nodes under labels, pairing strictly
//! by index:
//! - one bundle, one node: exactly one label
//! - one bundle, N nodes: N labels, the bundle is replicated to every node
//! - T bundles, one node: T labels, T records on the node
//! - T bundles, T nodes: T labels, pairwise
//!
//! Every request is validated before the first write. Writing to a
//! (node, label) that already resolves to a tokenized content at the
//! version being written updates it; otherwise a new record is created.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::domain::schema::{
    CONTENT_ID, INVERTED_INDEX, LABEL, POSITION, TOKENIZED_CONTENTS, TOKENS, TYPE,
};
use crate::domain::{NodeId, TokenBundle, TokenizedContent, Value, Version};
use crate::error::{Result, TokenError};
use crate::store::GraphStore;

use super::lane::{LaneGuard, WriteLane};
use super::vocabulary::{read_entry, validate_names, Vocabulary};

/// One accepted (node, label, bundle) triple
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub node: NodeId,
    pub label: &'a str,
    pub bundle: &'a TokenBundle,
}

/// Outcome of writing one binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedContent {
    /// Content node that owns the record
    pub node: NodeId,

    pub label: String,

    /// The tokenized content record
    pub content: NodeId,

    /// False when an existing record was updated
    pub created: bool,
}

/// Validate a request and pair its parts by index.
///
/// Pure and synchronous: nothing is read or written.
pub fn plan<'a>(
    bundles: &'a [TokenBundle],
    nodes: &[NodeId],
    labels: &'a [String],
) -> Result<Vec<Binding<'a>>> {
    let (t, n, l) = (bundles.len(), nodes.len(), labels.len());
    let mismatch = TokenError::CardinalityMismatch {
        tokenizers: t,
        nodes: n,
        labels: l,
    };

    let bindings: Vec<Binding<'a>> = match (t, n) {
        (1, 1) if l == 1 => vec![Binding {
            node: nodes[0],
            label: &labels[0],
            bundle: &bundles[0],
        }],
        (1, n) if n > 1 && l == n => nodes
            .iter()
            .zip(labels)
            .map(|(node, label)| Binding {
                node: *node,
                label,
                bundle: &bundles[0],
            })
            .collect(),
        (t, 1) if t > 1 && l == t => bundles
            .iter()
            .zip(labels)
            .map(|(bundle, label)| Binding {
                node: nodes[0],
                label,
                bundle,
            })
            .collect(),
        (t, n) if t > 1 && n == t && l == t => bundles
            .iter()
            .zip(nodes)
            .zip(labels)
            .map(|((bundle, node), label)| Binding {
                node: *node,
                label,
                bundle,
            })
            .collect(),
        _ => return Err(mismatch),
    };

    let mut seen = HashSet::with_capacity(bindings.len());
    for binding in &bindings {
        if binding.label.is_empty() {
            return Err(TokenError::InvalidContent("label must not be empty".to_string()));
        }
        if !seen.insert((binding.node, binding.label)) {
            return Err(TokenError::InvalidContent(format!(
                "label '{}' bound twice to node {}",
                binding.label, binding.node
            )));
        }
        if binding.bundle.is_empty() {
            return Err(TokenError::InvalidContent(format!(
                "no tokens to bind under label '{}'",
                binding.label
            )));
        }
        if binding.bundle.content_type.is_empty() {
            return Err(TokenError::InvalidContent(
                "content type must not be empty".to_string(),
            ));
        }
        validate_names(&binding.bundle.tokens)?;
    }

    Ok(bindings)
}

/// Writes tokenized contents and keeps the inverted index in step
pub struct RelationEngine {
    store: Arc<dyn GraphStore>,
    vocabulary: Arc<Vocabulary>,
    lane: Arc<WriteLane>,
}

impl RelationEngine {
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

    /// Create or update the tokenized contents described by the request
    #[instrument(
        skip_all,
        fields(%version, tokenizers = bundles.len(), nodes = nodes.len(), labels = labels.len())
    )]
    pub async fn update_or_create(
        &self,
        version: Version,
        bundles: &[TokenBundle],
        nodes: &[NodeId],
        labels: &[String],
    ) -> Result<Vec<RelatedContent>> {
        let bindings = plan(bundles, nodes, labels).map_err(|e| {
            warn!(error = %e, "Rejected tokenize relation request");
            e
        })?;
        self.vocabulary.retrieve_root(version).await?;

        let lane = self.lane.enter().await;

        // Read every owner before the first write so a missing node fails cleanly
        let mut owned: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for binding in &bindings {
            if !owned.contains_key(&binding.node) {
                let contents = self
                    .store
                    .read_relation(binding.node, version, TOKENIZED_CONTENTS)
                    .await?;
                owned.insert(binding.node, contents);
            }
        }

        let mut related = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let contents = owned.entry(binding.node).or_default();
            related.push(self.apply(&lane, version, binding, contents).await?);
        }

        let created = related.iter().filter(|r| r.created).count();
        info!(
            created,
            updated = related.len() - created,
            "Tokenize relations written"
        );
        Ok(related)
    }

    async fn apply(
        &self,
        lane: &LaneGuard<'_>,
        version: Version,
        binding: Binding<'_>,
        owned: &mut Vec<NodeId>,
    ) -> Result<RelatedContent> {
        let Binding {
            node,
            label,
            bundle,
        } = binding;

        let (content, created) = match self.find_labelled(version, owned, label).await? {
            Some(content) => (content, false),
            None => {
                let content = self.store.create_node(version).await?;
                self.store
                    .set_attribute(content, version, LABEL, Value::from(label))
                    .await?;
                owned.push(content);
                self.store
                    .write_relation(node, version, TOKENIZED_CONTENTS, owned.clone())
                    .await?;
                (content, true)
            }
        };

        self.store
            .set_attribute(content, version, TYPE, Value::from(bundle.content_type.as_str()))
            .await?;

        let previous = if created {
            Vec::new()
        } else {
            self.store.read_relation(content, version, TOKENS).await?
        };

        let tokens = self
            .vocabulary
            .get_or_create_in_lane(lane, version, &bundle.tokens)
            .await?;
        self.store
            .write_relation(content, version, TOKENS, tokens.clone())
            .await?;

        self.reindex(version, content, &bundle.content_type, &previous, &tokens)
            .await?;

        debug!(
            %node,
            label,
            %content,
            created,
            tokens = tokens.len(),
            "Related tokenized content"
        );

        Ok(RelatedContent {
            node,
            label: label.to_string(),
            content,
            created,
        })
    }

    async fn find_labelled(
        &self,
        version: Version,
        contents: &[NodeId],
        label: &str,
    ) -> Result<Option<NodeId>> {
        for content in contents {
            let value = self.store.attribute(*content, version, LABEL).await?;
            if value.as_ref().and_then(Value::as_text) == Some(label) {
                return Ok(Some(*content));
            }
        }
        Ok(None)
    }

    /// Recompute this content's inverted-index entries on every token of
    /// the previous and the current stream.
    ///
    /// The entry for (token, content, content type) ends up holding exactly
    /// the token's occurrence indices. Entries left without occurrences, or
    /// written under another content type, are unlinked at this version.
    async fn reindex(
        &self,
        version: Version,
        content: NodeId,
        content_type: &str,
        previous: &[NodeId],
        tokens: &[NodeId],
    ) -> Result<()> {
        let mut occurrences: BTreeMap<NodeId, Vec<usize>> = BTreeMap::new();
        for (position, token) in tokens.iter().enumerate() {
            occurrences.entry(*token).or_default().push(position);
        }

        let touched: BTreeSet<NodeId> = previous
            .iter()
            .chain(occurrences.keys())
            .copied()
            .collect();

        for token in touched {
            let entries = self
                .store
                .read_relation(token, version, INVERTED_INDEX)
                .await?;
            let positions = occurrences.get(&token);

            let mut kept = Vec::with_capacity(entries.len() + 1);
            let mut current = None;
            let mut changed = false;

            for entry in entries {
                let existing = read_entry(self.store.as_ref(), version, entry).await?;
                if existing.content != content {
                    kept.push(entry);
                } else if current.is_none()
                    && positions.is_some()
                    && existing.content_type == content_type
                {
                    current = Some(entry);
                    kept.push(entry);
                } else {
                    changed = true;
                }
            }

            if let Some(positions) = positions {
                let entry = match current {
                    Some(entry) => entry,
                    None => {
                        let entry = self.store.create_node(version).await?;
                        self.store
                            .set_attribute(entry, version, CONTENT_ID, Value::Id(content))
                            .await?;
                        self.store
                            .set_attribute(entry, version, TYPE, Value::from(content_type))
                            .await?;
                        kept.push(entry);
                        changed = true;
                        entry
                    }
                };
                self.store
                    .set_attribute(entry, version, POSITION, Value::IntList(positions.clone()))
                    .await?;
            }

            if changed {
                self.store
                    .write_relation(token, version, INVERTED_INDEX, kept)
                    .await?;
            }
        }

        Ok(())
    }

    /// Read one tokenized content record
    pub async fn read_content(
        &self,
        version: Version,
        content: NodeId,
    ) -> Result<TokenizedContent> {
        let label = self.text_attribute(version, content, LABEL).await?;
        let content_type = self.text_attribute(version, content, TYPE).await?;
        let tokens = self.store.read_relation(content, version, TOKENS).await?;

        Ok(TokenizedContent {
            id: content,
            label,
            content_type,
            tokens,
        })
    }

    /// Every tokenized content owned by `node`, in creation order
    pub async fn tokenized_contents(
        &self,
        version: Version,
        node: NodeId,
    ) -> Result<Vec<TokenizedContent>> {
        let contents = self
            .store
            .read_relation(node, version, TOKENIZED_CONTENTS)
            .await?;

        let mut records = Vec::with_capacity(contents.len());
        for content in contents {
            records.push(self.read_content(version, content).await?);
        }
        Ok(records)
    }

    /// The tokenized content `node` owns under `label`, if any
    pub async fn tokenized_content(
        &self,
        version: Version,
        node: NodeId,
        label: &str,
    ) -> Result<Option<TokenizedContent>> {
        let contents = self
            .store
            .read_relation(node, version, TOKENIZED_CONTENTS)
            .await?;

        match self.find_labelled(version, &contents, label).await? {
            Some(content) => Ok(Some(self.read_content(version, content).await?)),
            None => Ok(None),
        }
    }

    pub(crate) fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    async fn text_attribute(&self, version: Version, node: NodeId, key: &str) -> Result<String> {
        let value = self.store.attribute(node, version, key).await?;
        value
            .as_ref()
            .and_then(Value::as_text)
            .map(str::to_string)
            .ok_or_else(|| {
                TokenError::InvalidContent(format!("node {node} has no '{key}' attribute"))
            })
    }
}
