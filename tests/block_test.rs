use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use uliquid::data::Value;
use uliquid::tpl::lexer::Tokenizer;
use uliquid::tpl::{Block, Interrupt, Node, Output, Parser, Tag, TagRegistry, Variable, parse, render_all};
use uliquid::{Context, Error, ErrorKind, Template, TemplateOptions};

/// A user-defined block that wraps its body in brackets.
#[derive(Debug, Default)]
struct CustomBlock {
    body: Vec<Node>,
    closed: bool,
}

impl Block for CustomBlock {
    fn block_name(&self) -> &str {
        "customblock"
    }

    fn nodelist_mut(&mut self) -> &mut Vec<Node> {
        &mut self.body
    }

    fn end_tag(&mut self) {
        self.closed = true;
    }
}

impl Tag for CustomBlock {
    fn render(&self, ctx: &mut Context<'_>) -> Result<Output, Error> {
        Ok(Output::Emitted(format!("[{}]", render_all(&self.body, ctx)?)))
    }

    fn nodelists(&self) -> Vec<&[Node]> {
        vec![self.body.as_slice()]
    }
}

fn custom_block(_: &str, _: &str, parser: &mut Parser<'_>) -> Result<Box<dyn Tag>, Error> {
    let mut block = CustomBlock::default();
    parser.parse_block(&mut block)?;
    assert!(block.closed);
    Ok(Box::new(block))
}

fn registry() -> TagRegistry {
    let registry = TagRegistry::with_standard_tags();
    registry.register("customblock", custom_block);
    registry
}

fn parse_str(source: &str) -> Result<Vec<Node>, Error> {
    parse(&mut Tokenizer::new(source), &registry(), TemplateOptions::default())
}

#[test]
fn test_custom_block_delimiter_matching() {
    let nodes = parse_str("{% customblock %} x {% endcustomblock %}").unwrap();
    assert_eq!(nodes.len(), 1);
    let Node::Tag { name, .. } = &nodes[0] else {
        panic!("Expected tag, got {:?}", nodes[0]);
    };
    assert_eq!(name, "customblock");
    assert_eq!(nodes[0].children(), vec![&[Node::Text(" x ".into())][..]]);
}

#[test]
fn test_custom_block_unclosed() {
    let err = parse_str("{% customblock %} x ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "customblock tag was never closed");
    assert_eq!(err.line_number(), Some(1));
}

#[test]
fn test_close_delimiter_wins_over_registry() {
    let registry = registry();
    registry.register("endcustomblock", |_, _, p| Err(p.syntax_error("registry consulted")));

    let nodes = parse(
        &mut Tokenizer::new("{% customblock %}a{% endcustomblock %}"),
        &registry,
        TemplateOptions::default(),
    )
    .unwrap();
    assert_eq!(nodes.len(), 1);
}

#[test]
fn test_parsing_resumes_after_end_tag() {
    let nodes = parse_str("{% customblock %}{% customblock %}in{% endcustomblock %}{% endcustomblock %}{{ after }}").unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1], Node::Variable(Variable::new("after")));

    let inner = nodes[0].children();
    assert_eq!(inner[0].len(), 1);
    assert_eq!(inner[0][0].children(), vec![&[Node::Text("in".into())][..]]);
}

#[test]
fn test_unknown_tag_reports_its_line() {
    let err = parse_str("line one\n\n{% bogus %}").unwrap_err();
    assert_eq!(err.message(), "Unknown tag 'bogus'");
    assert_eq!(err.line_number(), Some(3));
}

#[test]
fn test_else_in_custom_block() {
    let err = parse_str("{% customblock %}{% else %}{% endcustomblock %}").unwrap_err();
    assert_eq!(err.message(), "customblock tag does not expect else tag");
}

#[test]
fn test_idempotent_parse() {
    let source = "a {{ b }}{% customblock %}{% if c %}d{% else %}{{ e }}{% endif %}{% endcustomblock %}";
    let first = parse_str(source).unwrap();
    let _unrelated = parse_str("{% for x in y %}{{ x }}{% endfor %}").unwrap();
    let second = parse_str(source).unwrap();
    assert_eq!(first, second);

    let different = parse_str("a {{ b }}{% customblock %}{% if c %}d{% endif %}{% endcustomblock %}").unwrap();
    assert_ne!(first, different);
}

#[test]
fn test_interrupt_short_circuit() {
    let nodes = parse_str("A{% break %}B").unwrap();
    let root = Value::Nil;
    let mut ctx = Context::new(&root);

    assert_eq!(render_all(&nodes, &mut ctx).unwrap(), "A");
    assert_eq!(ctx.interrupts(), &[Interrupt::Break]);
    assert!(ctx.errors().is_empty());
}

#[test]
fn test_interrupt_propagates_through_blocks() {
    let nodes = parse_str("{% customblock %}A{% continue %}B{% endcustomblock %}C").unwrap();
    let root = Value::Nil;
    let mut ctx = Context::new(&root);

    assert_eq!(render_all(&nodes, &mut ctx).unwrap(), "[A]");
    assert_eq!(ctx.pop_interrupt(), Some(Interrupt::Continue));
}

#[test]
fn test_render_shared_template_across_threads() {
    let registry = registry();
    let template = Arc::new(
        Template::parse_with(
            "{% customblock %}{{ n }}{% endcustomblock %}",
            &registry,
            TemplateOptions::default(),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let template = Arc::clone(&template);
            thread::spawn(move || {
                let data = HashMap::from([("n", i)]);
                template.render(&data).unwrap().0
            })
        })
        .collect();

    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outputs, vec!["[0]", "[1]", "[2]", "[3]"]);
}

#[test]
fn test_global_registry() {
    uliquid::tpl::register_tag("shout", |_, markup, _| {
        #[derive(Debug)]
        struct Shout(String);
        impl Tag for Shout {
            fn render(&self, _ctx: &mut Context<'_>) -> Result<Output, Error> {
                Ok(Output::Emitted(self.0.to_uppercase()))
            }
        }
        Ok(Box::new(Shout(markup.to_string())) as Box<dyn Tag>)
    });

    let (out, _) = uliquid::render_template("{% shout hello there %}!", &()).unwrap();
    assert_eq!(out, "HELLO THERE!");
}
