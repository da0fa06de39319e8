//! Names of the attributes, relations and global indexes the crate writes.

/// Attribute holding a token's surface string or an entry-point name
pub const NAME: &str = "name";

/// Attribute holding the label of a tokenized content
pub const LABEL: &str = "label";

/// Attribute holding a content type
pub const TYPE: &str = "type";

/// Attribute of an inverted-index entry pointing at its tokenized content
pub const CONTENT_ID: &str = "id";

/// Attribute of an inverted-index entry holding occurrence indices
pub const POSITION: &str = "position";

/// Relation from a content node to its tokenized contents
pub const TOKENIZED_CONTENTS: &str = "tokenizedContents";

/// Ordered relation from a tokenized content to its tokens (with repeats)
pub const TOKENS: &str = "tokens";

/// Relation from a token to its inverted-index entries
pub const INVERTED_INDEX: &str = "invertedIndex";

/// Global index of well-known entry-point nodes, keyed by [`NAME`]
pub const ENTRY_POINT_INDEX: &str = "entryPoint";

/// Global index of tokens, keyed by [`NAME`]
pub const VOCABULARY_INDEX: &str = "vocabulary";

/// Entry-point name of the vocabulary root
pub const VOCABULARY_NODE_NAME: &str = "vocabulary";

/// Entry-point name of the corpus root
pub const CORPUS_NODE_NAME: &str = "corpus";
