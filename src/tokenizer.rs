pub struct Tokenization<'a> {
    pub tokens: Vec<&'a str>,
    pub trailing_space: bool,
}

/// Tokenizers pre-process an input line into a vector of &str tokens. The first token names the
/// command, the rest are its arguments, passed through untouched.
pub trait Tokenizer {
    // Tokenize returns a vector of tokens (&str), and a bool to indicate if there was a trailing
    // space.
    fn tokenize<'a>(&self, line: &'a str) -> Tokenization<'a>;
}

/// WhitespaceTokenizer splits a line on runs of whitespace and nothing else.
///
/// There is no quoting, escaping or expansion of any kind: `"a b"` is two tokens, `"a` and `b"`.
#[derive(Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Constructs a `WhitespaceTokenizer`.
    pub fn new() -> WhitespaceTokenizer {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, line: &'a str) -> Tokenization<'a> {
        Tokenization {
            tokens: line.split_whitespace().collect(),
            trailing_space: line.ends_with(char::is_whitespace),
        }
    }
}
