use crate::error::Error;
use crate::tpl::render_context::Context;
use std::fmt;

/// One parsed unit of a template.
#[derive(Debug)]
pub enum Node {
    Text(String),
    Variable(Variable),
    Tag { name: String, tag: Box<dyn Tag> },
}

impl Node {
    pub fn tag(name: impl Into<String>, tag: Box<dyn Tag>) -> Self {
        Node::Tag {
            name: name.into(),
            tag,
        }
    }

    /// Child node lists of a block tag, in source order; empty otherwise.
    pub fn children(&self) -> Vec<&[Node]> {
        match self {
            Node::Tag { tag, .. } => tag.nodelists(),
            _ => Vec::new(),
        }
    }
}

/// Structural equality: same variants, same text, same tag names, same children.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Text(a), Node::Text(b)) => a == b,
            (Node::Variable(a), Node::Variable(b)) => a == b,
            (Node::Tag { name: a, .. }, Node::Tag { name: b, .. }) => {
                a == b && self.children() == other.children()
            }
            _ => false,
        }
    }
}

/// A `{{ ... }}` reference; the raw expression is resolved at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub markup: String,
}

impl Variable {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn render(&self, ctx: &Context<'_>) -> Result<String, Error> {
        if self.markup.contains('|') {
            return Err(Error::Argument(format!(
                "filters are not supported: {}",
                self.markup
            )));
        }
        Ok(ctx.evaluate(&self.markup)?.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Break,
    Continue,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Break => f.write_str("break"),
            Interrupt::Continue => f.write_str("continue"),
        }
    }
}

/// Result of rendering a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Emitted(String),
    Interrupt(Interrupt),
}

impl From<String> for Output {
    fn from(s: String) -> Self {
        Output::Emitted(s)
    }
}

/// A tag instance built by a registered factory.
pub trait Tag: fmt::Debug + Send + Sync {
    fn render(&self, ctx: &mut Context<'_>) -> Result<Output, Error>;

    /// Block tags expose their bodies so trees can be inspected and compared.
    fn nodelists(&self) -> Vec<&[Node]> {
        Vec::new()
    }
}
