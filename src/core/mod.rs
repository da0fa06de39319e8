//! Core indexing logic.
//!
//! This module contains:
//! - Vocabulary: deduplicated token nodes
//! - RelationEngine: tokenized content records and the inverted index
//! - Corpus: entry point bootstrap
//! - TokenIndex: the operations exposed to callers
//! - Task: YAML-defined action chains run against a TaskContext

pub mod context;
pub mod corpus;
pub mod index;
pub mod lane;
mod rebuild;
pub mod relation;
pub mod task;
pub mod vocabulary;

// Re-export commonly used types
pub use context::{TaskContext, TaskResult};
pub use corpus::{Corpus, CorpusRoots};
pub use index::TokenIndex;
pub use lane::{LaneGuard, WriteLane};
pub use relation::{plan, Binding, RelatedContent, RelationEngine};
pub use task::{Action, Task};
pub use vocabulary::Vocabulary;
