//! Domain types for tokengraph.
//!
//! This module contains the core data structures:
//! - Graph primitives: node ids, versions, attribute values
//! - Content records: bundles, tokenized contents, inverted-index entries
//! - Schema: attribute, relation and index names

pub mod content;
pub mod graph;
pub mod schema;

// Re-export commonly used types
pub use content::{InvertedIndexEntry, RebuiltContent, TokenBundle, TokenizedContent};
pub use graph::{NodeId, Value, Version};
