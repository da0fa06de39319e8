//! Tokenizer strategies and the factory selecting them by name.
//!
//! Tokenization is pure: text in, ordered token strings out. Nothing
//! here touches the graph.

pub mod preprocessor;
pub mod tokenizers;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::TokenBundle;
use crate::error::{Result, TokenError};

pub use preprocessor::{Lowercase, Preprocessor, StripPunctuation};
pub use tokenizers::{SimpleTokenizer, WhitespaceTokenizer};

/// Name of the whitespace tokenizer
pub const DEFAULT_VARIANT: &str = "default";

/// Name of the alphanumeric-run tokenizer
pub const SIMPLE_VARIANT: &str = "simple";

/// An ordered, finite token stream over one text
pub trait Tokenizer: Send {
    /// Next token, or `None` once the stream is exhausted
    fn next_token(&mut self) -> Option<&str>;

    /// Every token, in order
    fn tokens(&self) -> &[String];

    /// Rewind the stream to its first token
    fn reset(&mut self);

    fn len(&self) -> usize {
        self.tokens().len()
    }

    fn is_empty(&self) -> bool {
        self.tokens().is_empty()
    }
}

type TokenizerCtor = Arc<dyn Fn(&str) -> Box<dyn Tokenizer> + Send + Sync>;

/// Registry of tokenizer variants and preprocessors
#[derive(Clone)]
pub struct TokenizerFactory {
    tokenizers: HashMap<String, TokenizerCtor>,
    preprocessors: HashMap<String, Arc<dyn Preprocessor>>,
}

impl fmt::Debug for TokenizerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizerFactory")
            .field("tokenizers", &self.variants())
            .field("preprocessors", &self.preprocessors())
            .finish()
    }
}

impl Default for TokenizerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenizerFactory {
    /// Create a factory with the built-in variants registered
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory.register_tokenizer(DEFAULT_VARIANT, |text| {
            Box::new(WhitespaceTokenizer::new(text))
        });
        factory.register_tokenizer(SIMPLE_VARIANT, |text| Box::new(SimpleTokenizer::new(text)));
        factory.register_preprocessor("lowercase", Lowercase);
        factory.register_preprocessor("strip_punctuation", StripPunctuation);
        factory
    }

    /// Create a factory with nothing registered
    pub fn empty() -> Self {
        Self {
            tokenizers: HashMap::new(),
            preprocessors: HashMap::new(),
        }
    }

    /// Register (or replace) a tokenizer variant
    pub fn register_tokenizer<F>(&mut self, name: &str, ctor: F)
    where
        F: Fn(&str) -> Box<dyn Tokenizer> + Send + Sync + 'static,
    {
        self.tokenizers.insert(name.to_string(), Arc::new(ctor));
    }

    /// Register (or replace) a preprocessor
    pub fn register_preprocessor<P>(&mut self, name: &str, preprocessor: P)
    where
        P: Preprocessor + 'static,
    {
        self.preprocessors
            .insert(name.to_string(), Arc::new(preprocessor));
    }

    /// Registered variant names, sorted
    pub fn variants(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tokenizers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered preprocessor names, sorted
    pub fn preprocessors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.preprocessors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build a tokenizer over `text`, preprocessing it first when asked
    pub fn create(
        &self,
        variant: &str,
        text: &str,
        preprocessor: Option<&str>,
    ) -> Result<Box<dyn Tokenizer>> {
        let ctor = self
            .tokenizers
            .get(variant)
            .ok_or_else(|| TokenError::UnknownTokenizerVariant(variant.to_string()))?;

        match preprocessor {
            Some(name) => {
                let preprocessor = self
                    .preprocessors
                    .get(name)
                    .ok_or_else(|| TokenError::UnknownPreprocessor(name.to_string()))?;
                Ok(ctor(&preprocessor.process(text)))
            }
            None => Ok(ctor(text)),
        }
    }

    /// Tokenize each content string, returning one bundle per input in order
    pub fn tokenize_strings(
        &self,
        variant: &str,
        preprocessor: Option<&str>,
        content_type: &str,
        contents: &[String],
    ) -> Result<Vec<TokenBundle>> {
        if contents.is_empty() {
            return Err(TokenError::InvalidContent(
                "no content to tokenize".to_string(),
            ));
        }
        if content_type.is_empty() {
            return Err(TokenError::InvalidContent(
                "content type must not be empty".to_string(),
            ));
        }

        let bundles = contents
            .iter()
            .enumerate()
            .map(|(index, content)| {
                let tokenizer = self.create(variant, content, preprocessor)?;
                if tokenizer.is_empty() {
                    return Err(TokenError::InvalidContent(format!(
                        "content at index {index} has no tokens"
                    )));
                }
                Ok(TokenBundle::new(content_type, tokenizer.tokens().to_vec()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            variant,
            content_type,
            bundles = bundles.len(),
            "Tokenized contents"
        );
        Ok(bundles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "the apple was looking over the cloud";

    #[test]
    fn test_default_variant() {
        let factory = TokenizerFactory::new();
        let tokenizer = factory.create(DEFAULT_VARIANT, TEXT, None).unwrap();
        assert_eq!(tokenizer.len(), 7);
        assert_eq!(tokenizer.tokens()[5], "the");
    }

    #[test]
    fn test_unknown_variant() {
        let factory = TokenizerFactory::new();
        let err = factory.create("nope", TEXT, None).err().unwrap();
        assert!(matches!(err, TokenError::UnknownTokenizerVariant(name) if name == "nope"));
    }

    #[test]
    fn test_unknown_preprocessor() {
        let factory = TokenizerFactory::new();
        let err = factory
            .create(DEFAULT_VARIANT, TEXT, Some("stem"))
            .err()
            .unwrap();
        assert!(matches!(err, TokenError::UnknownPreprocessor(_)));
    }

    #[test]
    fn test_preprocessor_applied_before_split() {
        let factory = TokenizerFactory::new();
        let tokenizer = factory
            .create(DEFAULT_VARIANT, "The APPLE", Some("lowercase"))
            .unwrap();
        assert_eq!(tokenizer.tokens(), &["the", "apple"]);
    }

    #[test]
    fn test_tokenize_strings_preserves_order() {
        let factory = TokenizerFactory::new();
        let contents = vec![TEXT.to_string(), "an orange".to_string()];
        let bundles = factory
            .tokenize_strings(DEFAULT_VARIANT, None, "my type", &contents)
            .unwrap();

        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].len(), 7);
        assert_eq!(bundles[1].tokens, vec!["an", "orange"]);
        assert!(bundles.iter().all(|b| b.content_type == "my type"));
    }

    #[test]
    fn test_tokenize_strings_is_deterministic() {
        let factory = TokenizerFactory::new();
        let contents = vec![TEXT.to_string()];
        let first = factory
            .tokenize_strings(SIMPLE_VARIANT, Some("lowercase"), "t", &contents)
            .unwrap();
        let second = factory
            .tokenize_strings(SIMPLE_VARIANT, Some("lowercase"), "t", &contents)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tokenize_strings_rejects_empty_input() {
        let factory = TokenizerFactory::new();
        assert!(matches!(
            factory.tokenize_strings(DEFAULT_VARIANT, None, "t", &[]),
            Err(TokenError::InvalidContent(_))
        ));
        assert!(matches!(
            factory.tokenize_strings(DEFAULT_VARIANT, None, "", &[TEXT.to_string()]),
            Err(TokenError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_content_without_tokens_rejected() {
        let factory = TokenizerFactory::new();

        for blank in ["", "   \t\n"] {
            let contents = vec![TEXT.to_string(), blank.to_string()];
            let err = factory
                .tokenize_strings(DEFAULT_VARIANT, None, "text", &contents)
                .unwrap_err();
            assert!(
                matches!(&err, TokenError::InvalidContent(msg) if msg.contains("index 1")),
                "{blank:?} gave {err:?}"
            );
        }

        // Punctuation only: nothing survives the simple tokenizer
        let err = factory
            .tokenize_strings(SIMPLE_VARIANT, None, "text", &["?!.".to_string()])
            .unwrap_err();
        assert!(matches!(err, TokenError::InvalidContent(_)));
    }

    #[test]
    fn test_custom_variant() {
        let mut factory = TokenizerFactory::new();
        factory.register_tokenizer("chars", |text| {
            let spaced: String = text.chars().flat_map(|c| [c, ' ']).collect();
            Box::new(WhitespaceTokenizer::new(&spaced))
        });

        let tokenizer = factory.create("chars", "abca", None).unwrap();
        assert_eq!(tokenizer.tokens(), &["a", "b", "c", "a"]);
        assert_eq!(factory.variants(), vec!["chars", "default", "simple"]);
    }
}
