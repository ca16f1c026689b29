use crate::data::{Value, to_value};
use crate::error::Error;
use crate::models::options::TemplateOptions;
use crate::tpl::ast::Node;
use crate::tpl::lexer::Tokenizer;
use crate::tpl::render_context::Context;
use crate::tpl::{parser, registry, render};
use crate::tpl::registry::TagRegistry;
use tracing::debug;

/// A parsed template. Immutable once built; render it any number of times.
#[derive(Debug)]
pub struct Template {
    root: Vec<Node>,
    options: TemplateOptions,
}

impl Template {
    /// 使用全局标签注册表解析模板
    pub fn parse(source: &str) -> Result<Self, Error> {
        Self::parse_with(source, registry::global(), TemplateOptions::default())
    }

    pub fn parse_with(
        source: &str,
        registry: &TagRegistry,
        options: TemplateOptions,
    ) -> Result<Self, Error> {
        let mut tokens = Tokenizer::new(source);
        let root = parser::parse(&mut tokens, registry, options).inspect_err(|e| {
            debug!(error = %e, "template parse failed");
        })?;
        Ok(Self { root, options })
    }

    pub fn root(&self) -> &[Node] {
        &self.root
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Renders against serialized `data`; returns the output and the errors
    /// recovered along the way, in the order they occurred.
    pub fn render<T: serde::Serialize + ?Sized>(
        &self,
        data: &T,
    ) -> Result<(String, Vec<Error>), Error> {
        let value = to_value(data)?;
        self.render_value(&value)
    }

    pub fn render_value(&self, value: &Value) -> Result<(String, Vec<Error>), Error> {
        let mut ctx = Context::with_options(value, &self.options);
        let output = self.render_with(&mut ctx)?;
        Ok((output, ctx.into_errors()))
    }

    /// Renders with a caller-owned context, which keeps interrupts and errors.
    pub fn render_with(&self, ctx: &mut Context<'_>) -> Result<String, Error> {
        render::render_all(&self.root, ctx)
    }
}

/// 解析并渲染模板，返回输出和渲染中记录的错误
pub fn render_template<T: serde::Serialize + ?Sized>(
    template_content: &str,
    param: &T,
) -> Result<(String, Vec<Error>), Error> {
    Template::parse(template_content)?.render(param)
}
