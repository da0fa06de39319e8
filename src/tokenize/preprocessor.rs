//! Text preprocessors applied before splitting.

/// Transforms raw text before a tokenizer sees it
pub trait Preprocessor: Send + Sync {
    fn process(&self, text: &str) -> String;
}

/// Lowercases the whole text. Registered as `lowercase`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lowercase;

impl Preprocessor for Lowercase {
    fn process(&self, text: &str) -> String {
        text.to_lowercase()
    }
}

/// Replaces ASCII and Unicode punctuation with spaces.
/// Registered as `strip_punctuation`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StripPunctuation;

impl Preprocessor for StripPunctuation {
    fn process(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                if c.is_ascii_punctuation() || is_general_punctuation(c) {
                    ' '
                } else {
                    c
                }
            })
            .collect()
    }
}

// U+2010..U+205E: dashes, quotes, ellipsis and friends
fn is_general_punctuation(c: char) -> bool {
    ('\u{2010}'..='\u{205E}').contains(&c)
}
