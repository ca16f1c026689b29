use crate::error::Error;
use crate::tpl::ast::{Interrupt, Output, Tag};
use crate::tpl::parser::Parser;
use crate::tpl::render_context::Context;

/// `{% break %}` and `{% continue %}`.
#[derive(Debug)]
pub struct InterruptTag {
    interrupt: Interrupt,
}

impl InterruptTag {
    pub fn parse(name: &str, _markup: &str, parser: &mut Parser<'_>) -> Result<Box<dyn Tag>, Error> {
        let interrupt = match name {
            "break" => Interrupt::Break,
            "continue" => Interrupt::Continue,
            other => return Err(parser.syntax_error(format!("Unknown tag '{}'", other))),
        };
        Ok(Box::new(InterruptTag { interrupt }))
    }
}

impl Tag for InterruptTag {
    fn render(&self, _ctx: &mut Context<'_>) -> Result<Output, Error> {
        Ok(Output::Interrupt(self.interrupt))
    }
}
