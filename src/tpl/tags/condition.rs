use crate::data::Value;
use crate::error::Error;
use crate::tpl::render_context::Context;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::LazyLock;

static OPERAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'[^']*'|"[^"]*"|\S+"#).expect("operand regex"));

/// Evaluates `a`, `a == b`, `a != b`, `a < b`, ... joined by `and` / `or`.
/// `and` binds tighter than `or`; quoted operands may contain spaces and keywords.
pub fn eval_expr(expr: &str, ctx: &Context<'_>) -> Result<bool, Error> {
    let tokens: Vec<&str> = OPERAND.find_iter(expr).map(|m| m.as_str()).collect();
    for or_part in tokens.split(|t| *t == "or") {
        let mut and_satisfied = true;
        for atom in or_part.split(|t| *t == "and") {
            if !eval_atom(atom, ctx)? {
                and_satisfied = false;
                break;
            }
        }
        if and_satisfied {
            return Ok(true);
        }
    }
    Ok(false)
}

fn eval_atom(parts: &[&str], ctx: &Context<'_>) -> Result<bool, Error> {
    match parts {
        [single] => Ok(ctx.evaluate(single)?.is_truthy()),
        [left, op, right] => {
            let left = ctx.evaluate(left)?;
            let right = ctx.evaluate(right)?;
            compare(&left, op, &right)
        }
        _ => Err(Error::Argument(format!("Invalid condition '{}'", parts.join(" ")))),
    }
}

fn compare(left: &Value, op: &str, right: &Value) -> Result<bool, Error> {
    match op {
        "==" => Ok(left.loose_eq(right)),
        "!=" | "<>" => Ok(!left.loose_eq(right)),
        "<" | ">" | "<=" | ">=" => {
            let ordering = order(left, right).ok_or_else(|| {
                Error::Argument(format!("Comparison of {:?} with {:?} failed", left, right))
            })?;
            Ok(match op {
                "<" => ordering == Ordering::Less,
                ">" => ordering == Ordering::Greater,
                "<=" => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
        "contains" => Ok(match (left, right) {
            (Value::Str(haystack), Value::Str(needle)) => haystack.contains(needle.as_str()),
            (Value::List(items), needle) => items.iter().any(|item| item.loose_eq(needle)),
            _ => false,
        }),
        _ => Err(Error::Argument(format!("Unknown operator {}", op))),
    }
}

fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => match (coerce_decimal(left, right), coerce_decimal(right, left)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => as_f64(left)?.partial_cmp(&as_f64(right)?),
        },
    }
}

fn as_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Int(i) => Some(Decimal::from(*i)),
        Value::Float(f) => Decimal::from_f64(*f),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}

/// Decimals reach the context as strings, so a numeric string ordered
/// against a number is read as a decimal.
fn coerce_decimal(v: &Value, other: &Value) -> Option<Decimal> {
    match v {
        Value::Str(s) if as_decimal(other).is_some() => Decimal::from_str(s.trim()).ok(),
        _ => as_decimal(v),
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Decimal(d) => d.to_f64(),
        _ => None,
    }
}
