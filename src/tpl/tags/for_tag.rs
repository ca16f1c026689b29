use crate::data::Value;
use crate::error::Error;
use crate::tpl::ast::{Interrupt, Node, Output, Tag};
use crate::tpl::parser::{Block, Parser};
use crate::tpl::render::render_all;
use crate::tpl::render_context::Context;

/// `{% for item in collection %} ... {% endfor %}`
#[derive(Debug)]
pub struct ForTag {
    item: String,
    collection: String,
    body: Vec<Node>,
}

impl ForTag {
    pub fn parse(_name: &str, markup: &str, parser: &mut Parser<'_>) -> Result<Box<dyn Tag>, Error> {
        let parts: Vec<&str> = markup.split_whitespace().collect();
        let [item, "in", collection] = parts.as_slice() else {
            return Err(parser.syntax_error(
                "Syntax Error in 'for loop' - Valid syntax: for [item] in [collection]",
            ));
        };
        let mut tag = ForTag {
            item: item.to_string(),
            collection: collection.to_string(),
            body: Vec::new(),
        };
        parser.parse_block(&mut tag)?;
        Ok(Box::new(tag))
    }
}

impl Block for ForTag {
    fn block_name(&self) -> &str {
        "for"
    }

    fn nodelist_mut(&mut self) -> &mut Vec<Node> {
        &mut self.body
    }
}

impl Tag for ForTag {
    fn render(&self, ctx: &mut Context<'_>) -> Result<Output, Error> {
        let items = match ctx.lookup(&self.collection) {
            Value::List(items) => items,
            _ => return Ok(Output::Emitted(String::new())),
        };

        let mut out = String::new();
        for item in items {
            ctx.push(&self.item, item);
            let rendered = render_all(&self.body, ctx);
            ctx.pop();
            out.push_str(&rendered?);

            // The body stopped early; consume its interrupt here.
            if let Some(interrupt) = ctx.pop_interrupt() {
                if interrupt == Interrupt::Break {
                    break;
                }
            }
        }
        Ok(Output::Emitted(out))
    }

    fn nodelists(&self) -> Vec<&[Node]> {
        vec![self.body.as_slice()]
    }
}

#[cfg(test)]
mod tests {
    use crate::Template;
    use crate::data::Value;
    use std::collections::HashMap;

    fn numbers() -> Value {
        Value::Map(HashMap::from([("nums".to_string(), Value::from(vec![1, 2, 3, 4]))]))
    }

    #[test]
    fn test_for_loop() {
        let t = Template::parse("{% for n in nums %}[{{ n }}]{% endfor %}").unwrap();
        assert_eq!(t.render_value(&numbers()).unwrap().0, "[1][2][3][4]");
    }

    #[test]
    fn test_break_and_continue() {
        let t = Template::parse(
            "{% for n in nums %}{% if n == 2 %}{% continue %}{% endif %}{% if n == 4 %}{% break %}{% endif %}{{ n }}{% endfor %}",
        )
        .unwrap();
        assert_eq!(t.render_value(&numbers()).unwrap().0, "13");
    }

    #[test]
    fn test_non_list_renders_nothing() {
        let t = Template::parse("a{% for n in missing %}x{% endfor %}b").unwrap();
        assert_eq!(t.render_value(&numbers()).unwrap().0, "ab");
    }

    #[test]
    fn test_bad_markup() {
        let err = Template::parse("\n{% for n of nums %}{% endfor %}").unwrap_err();
        assert_eq!(err.line_number(), Some(2));
        assert!(err.message().starts_with("Syntax Error in 'for loop'"));
    }

    #[test]
    fn test_break_outside_loop_stops_document() {
        let t = Template::parse("a{% break %}b").unwrap();
        assert_eq!(t.render_value(&numbers()).unwrap().0, "a");
    }
}
