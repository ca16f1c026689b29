use crate::error::Error;
use crate::tpl::ast::{Node, Output, Tag};
use crate::tpl::parser::{Block, Parser, unknown_tag_error};
use crate::tpl::render::render_all;
use crate::tpl::render_context::Context;
use crate::tpl::tags::condition::eval_expr;

/// `{% if cond %} ... {% else %} ... {% endif %}`
#[derive(Debug)]
pub struct IfTag {
    condition: String,
    body: Vec<Node>,
    else_body: Option<Vec<Node>>,
}

impl IfTag {
    pub fn parse(_name: &str, markup: &str, parser: &mut Parser<'_>) -> Result<Box<dyn Tag>, Error> {
        if markup.is_empty() {
            return Err(parser.syntax_error("Syntax Error in tag 'if' - Valid syntax: if [condition]"));
        }
        let mut tag = IfTag {
            condition: markup.to_string(),
            body: Vec::new(),
            else_body: None,
        };
        parser.parse_block(&mut tag)?;
        Ok(Box::new(tag))
    }
}

impl Block for IfTag {
    fn block_name(&self) -> &str {
        "if"
    }

    fn nodelist_mut(&mut self) -> &mut Vec<Node> {
        match &mut self.else_body {
            Some(nodes) => nodes,
            None => &mut self.body,
        }
    }

    fn unknown_tag(&mut self, tag: &str, _params: &str, parser: &mut Parser<'_>) -> Result<(), Error> {
        if tag == "else" && self.else_body.is_none() {
            self.else_body = Some(Vec::new());
            return Ok(());
        }
        Err(unknown_tag_error(
            self.block_name(),
            self.block_delimiter().as_deref(),
            tag,
            parser.line(),
        ))
    }
}

impl Tag for IfTag {
    fn render(&self, ctx: &mut Context<'_>) -> Result<Output, Error> {
        let branch = if eval_expr(&self.condition, ctx)? {
            Some(&self.body)
        } else {
            self.else_body.as_ref()
        };
        match branch {
            Some(nodes) => render_all(nodes, ctx).map(Output::Emitted),
            None => Ok(Output::Emitted(String::new())),
        }
    }

    fn nodelists(&self) -> Vec<&[Node]> {
        let mut lists = vec![self.body.as_slice()];
        if let Some(else_body) = &self.else_body {
            lists.push(else_body);
        }
        lists
    }
}
