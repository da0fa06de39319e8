//! tokengraph - Token vocabulary and inverted index over a versioned graph
//!
//! Texts are split into tokens, each distinct token string becomes exactly
//! one vocabulary node, and every text is stored as a tokenized content
//! record attached to a node under a label. Each token keeps an inverted
//! index of the records it occurs in and at which positions.
//!
//! # Architecture
//!
//! Every read and write happens at an explicit version:
//! - Writes at one version never change what an earlier version observes
//! - Vocabulary and relation writes are serialized through a single lane
//! - Callers carry their version in a `TaskContext`, so chains can time
//!   travel independently
//!
//! # Modules
//!
//! - `store`: Versioned graph abstraction and the in-memory backend
//! - `tokenize`: Tokenizer variants and preprocessors
//! - `core`: Vocabulary, relation engine, corpus bootstrap, tasks
//! - `domain`: Identifiers, values and record types
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Show how a text tokenizes
//! tokengraph tokenize --tokenizer simple "Hello, world"
//!
//! # Build an index and print the postings
//! tokengraph index --label body "a b a" "b c"
//!
//! # Run a task file
//! tokengraph run index-texts
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod store;
pub mod tokenize;

// Re-export main types at crate root for convenience
pub use core::{Task, TaskContext, TaskResult, TokenIndex};
pub use domain::{NodeId, TokenBundle, Value, Version};
pub use error::{Result, TokenError};
pub use store::{GraphStore, MemoryGraph, StoreError};
