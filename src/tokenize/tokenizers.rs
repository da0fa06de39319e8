//! Built-in tokenizer variants.

use super::Tokenizer;

/// Tokens held in memory with a read cursor
#[derive(Debug, Clone, Default)]
struct TokenCursor {
    tokens: Vec<String>,
    position: usize,
}

impl TokenCursor {
    fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn next(&mut self) -> Option<&str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }
}

/// Splits on Unicode whitespace. Registered as `default`.
#[derive(Debug, Clone)]
pub struct WhitespaceTokenizer {
    cursor: TokenCursor,
}

impl WhitespaceTokenizer {
    pub fn new(text: &str) -> Self {
        let tokens = text.split_whitespace().map(str::to_string).collect();
        Self {
            cursor: TokenCursor::new(tokens),
        }
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn next_token(&mut self) -> Option<&str> {
        self.cursor.next()
    }

    fn tokens(&self) -> &[String] {
        &self.cursor.tokens
    }

    fn reset(&mut self) {
        self.cursor.position = 0;
    }
}

/// Keeps runs of alphanumeric characters and drops everything else.
/// Registered as `simple`.
#[derive(Debug, Clone)]
pub struct SimpleTokenizer {
    cursor: TokenCursor,
}

impl SimpleTokenizer {
    pub fn new(text: &str) -> Self {
        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            cursor: TokenCursor::new(tokens),
        }
    }
}

impl Tokenizer for SimpleTokenizer {
    fn next_token(&mut self) -> Option<&str> {
        self.cursor.next()
    }

    fn tokens(&self) -> &[String] {
        &self.cursor.tokens
    }

    fn reset(&mut self) {
        self.cursor.position = 0;
    }
}
