//! Language-agnostic word tokenizer.
//!
//! Splits on Unicode word boundaries (UAX #29), so every CJK ideograph
//! becomes its own term while Latin words stay whole. Terms are lower-cased
//! and overly long tokens are dropped.

use tantivy::tokenizer::{
    LowerCaser, RemoveLongFilter, TextAnalyzer, Token, TokenStream, Tokenizer,
};
use tantivy::Index;
use unicode_segmentation::{UnicodeSegmentation, UnicodeWordIndices};

/// Name the analyzer is registered under on every opened index
pub const WORD_TOKENIZER: &str = "unicode_words";

/// Tokens longer than this many bytes are not indexed
const MAX_TOKEN_LEN: usize = 40;

/// Splits text on Unicode word boundaries
#[derive(Clone, Default)]
pub struct UnicodeWordTokenizer {
    token: Token,
}

pub struct UnicodeWordTokenStream<'a> {
    words: UnicodeWordIndices<'a>,
    token: &'a mut Token,
}

impl Tokenizer for UnicodeWordTokenizer {
    type TokenStream<'a> = UnicodeWordTokenStream<'a>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> UnicodeWordTokenStream<'a> {
        self.token.reset();
        UnicodeWordTokenStream {
            words: text.unicode_word_indices(),
            token: &mut self.token,
        }
    }
}

impl TokenStream for UnicodeWordTokenStream<'_> {
    fn advance(&mut self) -> bool {
        let Some((offset, word)) = self.words.next() else {
            return false;
        };

        self.token.text.clear();
        self.token.text.push_str(word);
        self.token.offset_from = offset;
        self.token.offset_to = offset + word.len();
        self.token.position = self.token.position.wrapping_add(1);
        true
    }

    fn token(&self) -> &Token {
        self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        self.token
    }
}

/// The analyzer used for tokenized fields, both at index and query time
pub fn word_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(UnicodeWordTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .build()
}

/// Tokenizers are not persisted with the index, so this runs on every open.
pub fn register(index: &Index) {
    index.tokenizers().register(WORD_TOKENIZER, word_analyzer());
}

/// Terms the analyzer produces for `text`, in order
pub fn terms(text: &str) -> Vec<String> {
    let mut analyzer = word_analyzer();
    let mut stream = analyzer.token_stream(text);
    let mut terms = Vec::new();
    while stream.advance() {
        terms.push(stream.token().text.clone());
    }
    terms
}
