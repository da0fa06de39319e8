//! Error taxonomy of the tokenization core.
//!
//! Validation errors are raised before any mutating storage call. Storage
//! failures propagate unchanged and end the current chain.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the public operations
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Vocabulary has not been initialized")]
    UninitializedVocabulary,

    #[error(
        "Cannot bind {tokenizers} tokenizer(s) to {nodes} node(s) with {labels} label(s)"
    )]
    CardinalityMismatch {
        tokenizers: usize,
        nodes: usize,
        labels: usize,
    },

    #[error("Unknown tokenizer variant: {0}")]
    UnknownTokenizerVariant(String),

    #[error("Unknown preprocessor: {0}")]
    UnknownPreprocessor(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Expected {expected} but found {found}")]
    VariableKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, TokenError>;
