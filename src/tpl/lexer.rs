use regex::Regex;
use std::sync::LazyLock;

pub const TAG_START: &str = "{%";
pub const TAG_END: &str = "%}";
pub const VARIABLE_START: &str = "{{";
pub const VARIABLE_END: &str = "}}";

/// Complete tags, complete variables, or a dangling opener.
static TEMPLATE_PARSER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(\{%.*?%\}|\{\{.*?\}\}?|\{%|\{\{)").expect("template splitter regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// 1-based line on which the token starts.
    pub line: usize,
}

/// Pull-only, forward-only source of tokens.
pub trait TokenStream {
    fn next_token(&mut self) -> Option<Token>;

    /// Line of the most recently pulled token (1 before the first pull).
    fn line(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    TagOpen,
    VariableOpen,
    Empty,
    PlainText,
}

pub fn classify(text: &str) -> TokenKind {
    if text.starts_with(TAG_START) {
        TokenKind::TagOpen
    } else if text.starts_with(VARIABLE_START) {
        TokenKind::VariableOpen
    } else if text.is_empty() {
        TokenKind::Empty
    } else {
        TokenKind::PlainText
    }
}

/// Splits template source into tokens, tracking line numbers.
pub struct Tokenizer {
    tokens: std::vec::IntoIter<Token>,
    line: usize,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            tokens: tokenize(source).into_iter(),
            line: 1,
        }
    }
}

impl TokenStream for Tokenizer {
    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.next()?;
        self.line = token.line;
        Some(token)
    }

    fn line(&self) -> usize {
        self.line
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

fn tokenize(source: &str) -> Vec<Token> {
    let mut pieces: Vec<&str> = Vec::new();
    let mut pos = 0;
    for m in TEMPLATE_PARSER.find_iter(source) {
        // Adjacent delimiters leave an empty piece between them.
        pieces.push(&source[pos..m.start()]);
        pieces.push(m.as_str());
        pos = m.end();
    }
    pieces.push(&source[pos..]);

    if pieces.first().is_some_and(|p| p.is_empty()) {
        pieces.remove(0);
    }
    if pieces.last().is_some_and(|p| p.is_empty()) {
        pieces.pop();
    }

    let mut line = 1;
    pieces
        .into_iter()
        .map(|text| {
            let token = Token {
                text: text.to_string(),
                line,
            };
            line += text.matches('\n').count();
            token
        })
        .collect()
}
