//! Tokenized content records and the values flowing between components.

use serde::{Deserialize, Serialize};

use super::graph::NodeId;

/// A tokenizer's output for one content string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Content type carried onto the tokenized content record
    pub content_type: String,

    /// Tokens in emission order, duplicates preserved
    pub tokens: Vec<String>,
}

impl TokenBundle {
    pub fn new(content_type: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            content_type: content_type.into(),
            tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A tokenized content record as read at one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedContent {
    /// Node holding the record
    pub id: NodeId,

    /// Label under which the owning node references it
    pub label: String,

    pub content_type: String,

    /// Token nodes in order, with repeats
    pub tokens: Vec<NodeId>,
}

/// Occurrences of one token inside one tokenized content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndexEntry {
    /// Node holding the entry
    pub id: NodeId,

    /// Tokenized content the positions refer to
    pub content: NodeId,

    pub content_type: String,

    /// Occurrence indices, ascending
    pub positions: Vec<usize>,
}

/// A tokenized content turned back into text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuiltContent {
    pub label: String,
    pub content_type: String,

    /// Token names joined by a single space
    pub content: String,
}
