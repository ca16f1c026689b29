use crate::data::Value;
use crate::error::Error;
use crate::models::options::TemplateOptions;
use crate::tpl::ast::Interrupt;
use tracing::debug;

/// Per-render state: variable scopes, pending interrupts and recovered errors.
pub struct Context<'a> {
    root: &'a Value,
    locals: Vec<(String, &'a Value)>,
    interrupts: Vec<Interrupt>,
    errors: Vec<Error>,
    strict_variables: bool,
}

impl<'a> Context<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self::with_options(root, &TemplateOptions::default())
    }

    pub fn with_options(root: &'a Value, options: &TemplateOptions) -> Self {
        Self {
            root,
            locals: Vec::new(),
            interrupts: Vec::new(),
            errors: Vec::new(),
            strict_variables: options.strict_variables,
        }
    }

    pub fn push(&mut self, key: &str, value: &'a Value) {
        self.locals.push((key.to_string(), value));
    }

    pub fn pop(&mut self) {
        self.locals.pop();
    }

    /// Resolves a variable path, `Nil` when absent.
    pub fn lookup(&self, key: &str) -> &'a Value {
        self.find(key).unwrap_or(&Value::Nil)
    }

    /// Resolves a variable path: exact local or root key first, then dotted traversal.
    pub fn find(&self, key: &str) -> Option<&'a Value> {
        if let Some(v) = self.get_from_scope(key) {
            return Some(v);
        }

        let (head, rest) = key.split_once('.')?;
        let head_value = self.get_from_scope(head)?;
        Self::resolve_path(head_value, rest)
    }

    /// Evaluates a literal or a variable path to an owned value.
    pub fn evaluate(&self, expr: &str) -> Result<Value, Error> {
        let expr = expr.trim();
        if let Some(literal) = parse_literal(expr) {
            return Ok(literal);
        }

        match self.find(expr) {
            Some(v) => Ok(v.clone()),
            None if self.strict_variables => {
                Err(Error::Standard(format!("undefined variable {}", expr)))
            }
            None => Ok(Value::Nil),
        }
    }

    pub fn has_interrupt(&self) -> bool {
        !self.interrupts.is_empty()
    }

    pub fn push_interrupt(&mut self, interrupt: Interrupt) {
        self.interrupts.push(interrupt);
    }

    pub fn pop_interrupt(&mut self) -> Option<Interrupt> {
        self.interrupts.pop()
    }

    pub fn interrupts(&self) -> &[Interrupt] {
        &self.interrupts
    }

    /// Records a recoverable error and returns the text rendered in its place.
    pub fn handle_error(&mut self, error: Error) -> String {
        debug!(error = %error, "recovered render error");
        let text = match &error {
            Error::Syntax(e) => format!("Liquid syntax error: {}", e.message),
            other => format!("Liquid error: {}", other.message()),
        };
        self.errors.push(error);
        text
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    fn get_from_scope(&self, key: &str) -> Option<&'a Value> {
        // 局部变量优先，从后往前查以支持遮蔽
        if let Some((_, v)) = self.locals.iter().rev().find(|(k, _)| k == key) {
            return Some(*v);
        }

        if let Value::Map(m) = self.root {
            return m.get(key);
        }

        None
    }

    fn resolve_path(mut current: &'a Value, path: &str) -> Option<&'a Value> {
        for part in path.split('.') {
            current = match current {
                Value::Map(m) => m.get(part)?,
                Value::List(items) => match part {
                    "first" => items.first()?,
                    "last" => items.last()?,
                    _ => items.get(part.parse::<usize>().ok()?)?,
                },
                _ => return None,
            };
        }
        Some(current)
    }
}

fn parse_literal(expr: &str) -> Option<Value> {
    match expr {
        "nil" | "null" => return Some(Value::Nil),
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }

    let quoted = expr.len() >= 2
        && ((expr.starts_with('\'') && expr.ends_with('\''))
            || (expr.starts_with('"') && expr.ends_with('"')));
    if quoted {
        return Some(Value::Str(expr[1..expr.len() - 1].to_string()));
    }

    let first = *expr.as_bytes().first()?;
    if first.is_ascii_digit() || first == b'-' {
        if let Ok(n) = expr.parse::<i64>() {
            return Some(Value::Int(n));
        }
        if let Ok(n) = expr.parse::<f64>() {
            return Some(Value::Float(n));
        }
    }
    None
}
