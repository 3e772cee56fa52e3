//! Formula evaluator
//!
//! Walks the AST against a [`Scope`]. Context values arrive already coerced;
//! literals in the formula text are native.

use super::parser::Expr;
use crate::core::functions::FnContext;
use crate::core::scope::Scope;
use crate::error::{CalcError, CalcResult};
use crate::types::Value;
use std::cmp::Ordering;

/// Evaluate an expression within a scope
pub fn evaluate<'a>(expr: &Expr, scope: &Scope<'a>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Variable(name) => scope
            .lookup(name)
            .ok_or_else(|| CalcError::UndefinedVariable(name.clone())),
        Expr::Member { object, property } => {
            let target = evaluate(object, scope, ctx)?;
            Ok(match target {
                Value::Node(node) => node.get(property),
                _ => Value::Undefined,
            })
        }
        Expr::Index { object, index } => {
            let target = evaluate(object, scope, ctx)?;
            let key = evaluate(index, scope, ctx)?;
            Ok(match target {
                Value::Node(node) => node.index(&key),
                _ => Value::Undefined,
            })
        }
        Expr::FunctionCall { name, args } => evaluate_call(name, args, scope, ctx),
        Expr::BinaryOp { op, left, right } => match op.as_str() {
            "and" => {
                let l = evaluate(left, scope, ctx)?;
                if !l.is_truthy() {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(evaluate(right, scope, ctx)?.is_truthy()))
            }
            "or" => {
                let l = evaluate(left, scope, ctx)?;
                if l.is_truthy() {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(evaluate(right, scope, ctx)?.is_truthy()))
            }
            _ => {
                let l = evaluate(left, scope, ctx)?;
                let r = evaluate(right, scope, ctx)?;
                evaluate_binary_op(op, &l, &r)
            }
        },
        Expr::UnaryOp { op, operand } => {
            let val = evaluate(operand, scope, ctx)?;
            evaluate_unary_op(op, &val)
        }
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            if evaluate(condition, scope, ctx)?.is_truthy() {
                evaluate(then_branch, scope, ctx)
            } else {
                evaluate(else_branch, scope, ctx)
            }
        }
    }
}

fn evaluate_call<'a>(
    name: &str,
    args: &[Expr],
    scope: &Scope<'a>,
    ctx: &FnContext<'_>,
) -> CalcResult<Value<'a>> {
    let Some((_, function)) = scope.function(name) else {
        return Err(match scope.lookup(name) {
            Some(_) => CalcError::Eval(format!("{} is not a function", name)),
            None => CalcError::UndefinedVariable(name.to_string()),
        });
    };

    let values = args
        .iter()
        .map(|arg| evaluate(arg, scope, ctx))
        .collect::<CalcResult<Vec<_>>>()?;
    function(values, ctx)
}

fn operand(value: &Value<'_>, side: &str, op: &str) -> CalcResult<f64> {
    value.as_number().ok_or_else(|| {
        CalcError::Eval(format!(
            "{} operand of '{}' must be a number, got {} '{}'",
            side,
            op,
            value.type_name(),
            value.as_text()
        ))
    })
}

fn numeric_operands(op: &str, left: &Value<'_>, right: &Value<'_>) -> CalcResult<(f64, f64)> {
    Ok((operand(left, "Left", op)?, operand(right, "Right", op)?))
}

/// Evaluate a binary operation
fn evaluate_binary_op<'a>(op: &str, left: &Value<'a>, right: &Value<'a>) -> CalcResult<Value<'a>> {
    match op {
        "+" => {
            // Text on either side concatenates
            if matches!(left, Value::Text(_)) || matches!(right, Value::Text(_)) {
                Ok(Value::Text(format!("{}{}", left.as_text(), right.as_text())))
            } else {
                let (l, r) = numeric_operands(op, left, right)?;
                Ok(Value::Number(l + r))
            }
        }
        "-" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(Value::Number(l - r))
        }
        "*" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(Value::Number(l * r))
        }
        "/" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(Value::Number(l / r))
        }
        "%" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(Value::Number(l % r))
        }
        "^" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(Value::Number(l.powf(r)))
        }

        "==" | "=" => Ok(Value::Boolean(values_equal(left, right))),
        "!=" | "<>" => Ok(Value::Boolean(!values_equal(left, right))),
        "<" | ">" | "<=" | ">=" => {
            let ordering = compare(op, left, right)?;
            let result = match (op, ordering) {
                (_, None) => false,
                ("<", Some(o)) => o == Ordering::Less,
                (">", Some(o)) => o == Ordering::Greater,
                ("<=", Some(o)) => o != Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            };
            Ok(Value::Boolean(result))
        }

        _ => Err(CalcError::Eval(format!("Unknown operator: {}", op))),
    }
}

/// `None` when either side is NaN.
fn compare(op: &str, left: &Value<'_>, right: &Value<'_>) -> CalcResult<Option<Ordering>> {
    if let (Value::Text(l), Value::Text(r)) = (left, right) {
        return Ok(Some(l.cmp(r)));
    }
    let (l, r) = numeric_operands(op, left, right)?;
    Ok(l.partial_cmp(&r))
}

/// Strict equality: no cross-type conversion.
fn values_equal(left: &Value<'_>, right: &Value<'_>) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::Text(l), Value::Text(r)) => l == r,
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::Date(l), Value::Date(r)) => l == r,
        (Value::Node(l), Value::Node(r)) => std::ptr::eq(l.raw(), r.raw()),
        (Value::Function(l), Value::Function(r)) => l == r,
        (l, r) => l.is_nullish() && r.is_nullish(),
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op<'a>(op: &str, operand_value: &Value<'a>) -> CalcResult<Value<'a>> {
    match op {
        "-" => Ok(Value::Number(-operand(operand_value, "Unary", op)?)),
        // Explicit numeric cast; never fails
        "+" => Ok(Value::Number(operand_value.to_number())),
        "not" => Ok(Value::Boolean(!operand_value.is_truthy())),
        _ => Err(CalcError::Eval(format!("Unknown unary operator: {}", op))),
    }
}
