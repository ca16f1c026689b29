use crate::error::Error;
use crate::tpl::ast::{Node, Output, Tag};
use crate::tpl::parser::{Block, Parser};
use crate::tpl::render_context::Context;

/// `{% comment %} ... {% endcomment %}`: the body must parse but never renders.
#[derive(Debug)]
pub struct CommentTag {
    body: Vec<Node>,
}

impl CommentTag {
    pub fn parse(_name: &str, _markup: &str, parser: &mut Parser<'_>) -> Result<Box<dyn Tag>, Error> {
        let mut tag = CommentTag { body: Vec::new() };
        parser.parse_block(&mut tag)?;
        Ok(Box::new(tag))
    }
}

impl Block for CommentTag {
    fn block_name(&self) -> &str {
        "comment"
    }

    fn nodelist_mut(&mut self) -> &mut Vec<Node> {
        &mut self.body
    }
}

impl Tag for CommentTag {
    fn render(&self, _ctx: &mut Context<'_>) -> Result<Output, Error> {
        Ok(Output::Emitted(String::new()))
    }

    fn nodelists(&self) -> Vec<&[Node]> {
        vec![self.body.as_slice()]
    }
}
