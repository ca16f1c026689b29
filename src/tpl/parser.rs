use crate::error::Error;
use crate::models::options::TemplateOptions;
use crate::tpl::ast::{Node, Variable};
use crate::tpl::lexer::{TAG_END, Token, TokenKind, TokenStream, VARIABLE_END, classify};
use crate::tpl::registry::TagRegistry;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

static FULL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\{%\s*(\w+)\s*(.*?)\s*%\}$").expect("full tag regex")
});
static CONTENT_OF_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\{\{(.*)\}\}$").expect("variable regex"));

/// Names handed to [`Block::unknown_tag`] before the registry is consulted.
const RESERVED_TAGS: [&str; 2] = ["else", "end"];

/// Anything that owns a node list filled by the block parser.
///
/// The provided methods are the hooks a block tag may override: `if` accepts
/// `else` through [`Block::unknown_tag`], the document root accepts end of
/// input through [`Block::assert_missing_delimitation`].
pub trait Block {
    fn block_name(&self) -> &str;

    /// The node list new nodes are appended to.
    fn nodelist_mut(&mut self) -> &mut Vec<Node>;

    /// Tag name closing this block, `None` for blocks closed by end of input.
    fn block_delimiter(&self) -> Option<String> {
        Some(format!("end{}", self.block_name()))
    }

    /// Called once the closing tag has been consumed.
    fn end_tag(&mut self) {}

    fn unknown_tag(&mut self, tag: &str, _params: &str, parser: &mut Parser<'_>) -> Result<(), Error> {
        Err(unknown_tag_error(
            self.block_name(),
            self.block_delimiter().as_deref(),
            tag,
            parser.line(),
        ))
    }

    /// Called when input runs out before the closing tag; `opened_at` is the
    /// line of the opening tag.
    fn assert_missing_delimitation(&self, opened_at: usize) -> Result<(), Error> {
        Err(Error::syntax(
            format!("{} tag was never closed", self.block_name()),
            opened_at,
        ))
    }
}

/// The default diagnosis for a tag the block and the registry do not know.
pub fn unknown_tag_error(block_name: &str, delimiter: Option<&str>, tag: &str, line: usize) -> Error {
    let message = match (tag, delimiter) {
        ("else", _) => format!("{} tag does not expect else tag", block_name),
        ("end", Some(delimiter)) => format!(
            "'end' is not a valid delimiter for {} tags. use {}",
            block_name, delimiter
        ),
        ("end", None) => format!("'end' is not a valid delimiter for {} tags", block_name),
        _ => format!("Unknown tag '{}'", tag),
    };
    Error::syntax(message, line)
}

/// Root of a parsed template; only end of input closes it.
#[derive(Debug, Default)]
pub struct Document {
    pub nodelist: Vec<Node>,
}

impl Block for Document {
    fn block_name(&self) -> &str {
        "document"
    }

    fn nodelist_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodelist
    }

    fn block_delimiter(&self) -> Option<String> {
        None
    }

    fn assert_missing_delimitation(&self, _opened_at: usize) -> Result<(), Error> {
        Ok(())
    }
}

/// Cursor over a token stream plus what is needed to build tags from it.
pub struct Parser<'t> {
    tokens: &'t mut dyn TokenStream,
    registry: &'t TagRegistry,
    options: TemplateOptions,
    depth: usize,
}

impl<'t> Parser<'t> {
    pub fn new(
        tokens: &'t mut dyn TokenStream,
        registry: &'t TagRegistry,
        options: TemplateOptions,
    ) -> Self {
        Self {
            tokens,
            registry,
            options,
            depth: 0,
        }
    }

    /// Line of the token most recently consumed.
    pub fn line(&self) -> usize {
        self.tokens.line()
    }

    pub fn syntax_error(&self, message: impl Into<String>) -> Error {
        Error::syntax(message, self.line())
    }

    /// Pulls a raw token, for tags that consume their body without parsing it.
    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.next_token()
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Parses a whole document.
    pub fn parse_document(&mut self) -> Result<Vec<Node>, Error> {
        let mut document = Document::default();
        self.parse_block(&mut document)?;
        Ok(document.nodelist)
    }

    /// Fills `block`'s node list until its closing tag, or until the end of
    /// input if the block allows it.
    pub fn parse_block<B: Block + ?Sized>(&mut self, block: &mut B) -> Result<(), Error> {
        if self.depth > self.options.max_depth {
            return Err(self.syntax_error(format!(
                "Nesting too deep (limit {})",
                self.options.max_depth
            )));
        }

        let opened_at = self.line();
        self.depth += 1;
        let result = self.parse_body(block, opened_at);
        self.depth -= 1;
        result
    }

    fn parse_body<B: Block + ?Sized>(&mut self, block: &mut B, opened_at: usize) -> Result<(), Error> {
        block.nodelist_mut().clear();
        let delimiter = block.block_delimiter();

        while let Some(token) = self.tokens.next_token() {
            match classify(&token.text) {
                TokenKind::TagOpen => {
                    let Some(caps) = FULL_TOKEN.captures(&token.text) else {
                        return Err(self.syntax_error(format!(
                            "Tag '{}' was not properly terminated with regexp: {}",
                            token.text, TAG_END
                        )));
                    };
                    let name = caps.get(1).map_or("", |m| m.as_str());
                    let markup = caps.get(2).map_or("", |m| m.as_str());

                    if delimiter.as_deref() == Some(name) {
                        trace!(block = block.block_name(), line = token.line, "block closed");
                        block.end_tag();
                        return Ok(());
                    }

                    let factory = if RESERVED_TAGS.contains(&name) {
                        None
                    } else {
                        self.registry.lookup(name)
                    };
                    match factory {
                        Some(factory) => {
                            let tag = factory(name, markup, &mut *self)?;
                            block.nodelist_mut().push(Node::tag(name, tag));
                        }
                        None => {
                            debug!(block = block.block_name(), tag = name, line = token.line, "unknown tag");
                            block.unknown_tag(name, markup, self)?;
                        }
                    }
                }
                TokenKind::VariableOpen => {
                    let node = self.create_variable(&token)?;
                    block.nodelist_mut().push(node);
                }
                TokenKind::Empty => {}
                TokenKind::PlainText => block.nodelist_mut().push(Node::Text(token.text)),
            }
        }

        block.assert_missing_delimitation(opened_at)
    }

    fn create_variable(&self, token: &Token) -> Result<Node, Error> {
        match CONTENT_OF_VARIABLE.captures(&token.text) {
            Some(caps) => {
                let markup = caps.get(1).map_or("", |m| m.as_str()).trim();
                Ok(Node::Variable(Variable::new(markup)))
            }
            None => Err(self.syntax_error(format!(
                "Variable '{}' was not properly terminated with regexp: {}",
                token.text, VARIABLE_END
            ))),
        }
    }
}

/// Parses a token stream into the root node list.
pub fn parse(
    tokens: &mut dyn TokenStream,
    registry: &TagRegistry,
    options: TemplateOptions,
) -> Result<Vec<Node>, Error> {
    Parser::new(tokens, registry, options).parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tpl::lexer::Tokenizer;

    fn parse_str(source: &str) -> Result<Vec<Node>, Error> {
        let registry = TagRegistry::with_standard_tags();
        parse(&mut Tokenizer::new(source), &registry, TemplateOptions::default())
    }

    #[test]
    fn test_parse_text_and_variable() {
        let nodes = parse_str("hello {{ name }}!").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("hello ".into()),
                Node::Variable(Variable::new("name")),
                Node::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_empty_tokens_are_skipped() {
        let nodes = parse_str("{{a}}{{b}}").unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_parse_nested_blocks() {
        let nodes = parse_str("{% if x %}{% for i in list %}{{ i }}{% endfor %}{% endif %}").unwrap();
        assert_eq!(nodes.len(), 1);
        let if_body = nodes[0].children();
        assert_eq!(if_body.len(), 1);
        let for_body = if_body[0][0].children();
        assert_eq!(for_body[0], &[Node::Variable(Variable::new("i"))][..]);
    }

    #[test]
    fn test_unterminated_tag() {
        let err = parse_str("a\n{% if oops\n").unwrap_err();
        assert_eq!(err.line_number(), Some(2));
        assert!(err.message().starts_with("Tag '{%' was not properly terminated"));
    }

    #[test]
    fn test_unterminated_variable() {
        let err = parse_str("{{ x }").unwrap_err();
        assert_eq!(
            err.message(),
            "Variable '{{ x }' was not properly terminated with regexp: }}"
        );
    }

    #[test]
    fn test_unknown_tag_messages() {
        let err = parse_str("{% bogus %}").unwrap_err();
        assert_eq!(err.message(), "Unknown tag 'bogus'");

        let err = parse_str("{% for i in x %}{% else %}{% endfor %}").unwrap_err();
        assert_eq!(err.message(), "for tag does not expect else tag");

        let err = parse_str("{% for i in x %}{% end %}").unwrap_err();
        assert_eq!(
            err.message(),
            "'end' is not a valid delimiter for for tags. use endfor"
        );
    }

    #[test]
    fn test_reserved_names_bypass_registry() {
        let registry = TagRegistry::with_standard_tags();
        registry.register("else", |_, _, p| Err(p.syntax_error("registered else reached")));
        let err = parse(&mut Tokenizer::new("{% else %}"), &registry, TemplateOptions::default())
            .unwrap_err();
        assert_eq!(err.message(), "document tag does not expect else tag");
    }

    #[test]
    fn test_stray_end_tag_at_root_is_unknown() {
        let err = parse_str("{% endif %}").unwrap_err();
        assert_eq!(err.message(), "Unknown tag 'endif'");
    }

    #[test]
    fn test_unclosed_block_reports_opening_line() {
        let err = parse_str("\n{% for i in x %}\n...\n").unwrap_err();
        assert_eq!(err.message(), "for tag was never closed");
        assert_eq!(err.line_number(), Some(2));
    }

    #[test]
    fn test_nesting_limit() {
        let registry = TagRegistry::with_standard_tags();
        let source = "{% comment %}".repeat(4) + &"{% endcomment %}".repeat(4);

        let options = TemplateOptions::new().max_depth(4);
        assert!(parse(&mut Tokenizer::new(&source), &registry, options).is_ok());

        let options = TemplateOptions::new().max_depth(3);
        let err = parse(&mut Tokenizer::new(&source), &registry, options).unwrap_err();
        assert_eq!(err.message(), "Nesting too deep (limit 3)");
    }

    #[test]
    fn test_end_tag_consumes_only_itself() {
        let nodes = parse_str("{% comment %}x{% endcomment %}after").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1], Node::Text("after".into()));
    }
}
