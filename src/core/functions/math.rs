//! Arithmetic, logical and statistical functions

use super::{require_args, require_args_range, FnContext, FunctionCategory, FunctionLibrary};
use crate::error::CalcResult;
use crate::types::Value;
use rand::Rng;

pub(super) fn register(library: &mut FunctionLibrary) {
    use FunctionCategory::*;

    library.register("ABS", Arithmetic, "ABS(x)", "Absolute value", abs);
    library.register("CEIL", Arithmetic, "CEIL(x)", "Round up to an integer", ceil);
    library.register("FLOOR", Arithmetic, "FLOOR(x)", "Round down to an integer", floor);
    library.register(
        "ROUND",
        Arithmetic,
        "ROUND(x, places=0)",
        "Round half away from zero to `places` digits",
        round,
    );
    library.register("RAND", Arithmetic, "RAND()", "Uniform random number in [0, 1)", rand_fn);

    library.register("AND", Logical, "AND(...args)", "True when every argument is truthy", and);
    library.register("OR", Logical, "OR(...args)", "True when any argument is truthy", or);
    library.register("NOT", Logical, "NOT(x)", "Negated truthiness", not);
    library.register("IF", Logical, "IF(cond, a, b)", "`a` when `cond` is truthy, else `b`", if_fn);

    library.register("SUM", Statistical, "SUM(...args)", "Sum; non-numeric arguments count as 0", sum);
    library.register(
        "AVERAGE",
        Statistical,
        "AVERAGE(...args)",
        "Mean of the numeric arguments, 0 when there are none",
        average,
    );
    library.register("MAX", Statistical, "MAX(...args)", "Largest numeric argument", max);
    library.register("MIN", Statistical, "MIN(...args)", "Smallest numeric argument", min);
}

fn first_number(args: &[Value<'_>]) -> f64 {
    args.first().map_or(f64::NAN, Value::to_number)
}

/// Numeric readings of the arguments, array elements included, NaN kept.
fn numbers(args: &[Value<'_>]) -> Vec<f64> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::Node(node) if node.is_array() => {
                values.extend(node.elements().iter().map(Value::to_number));
            }
            other => values.push(other.to_number()),
        }
    }
    values
}

/// MAX and MIN keep infinities; only NaN is dropped.
fn non_nan_numbers(args: &[Value<'_>]) -> Vec<f64> {
    numbers(args).into_iter().filter(|n| !n.is_nan()).collect()
}

fn finite_numbers(args: &[Value<'_>]) -> Vec<f64> {
    numbers(args).into_iter().filter(|n| n.is_finite()).collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// ARITHMETIC
// ═══════════════════════════════════════════════════════════════════════════════

fn abs<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args("ABS", &args, 1)?;
    Ok(Value::Number(first_number(&args).abs()))
}

fn ceil<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args("CEIL", &args, 1)?;
    Ok(Value::Number(first_number(&args).ceil()))
}

fn floor<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args("FLOOR", &args, 1)?;
    Ok(Value::Number(first_number(&args).floor()))
}

fn round<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("ROUND", &args, 1, 2)?;
    let value = first_number(&args);
    let places = match args.get(1) {
        None | Some(Value::Undefined) => 0.0,
        Some(v) => v.to_number(),
    };
    let factor = 10f64.powf(places);
    Ok(Value::Number((value * factor).round() / factor))
}

fn rand_fn<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args("RAND", &args, 0)?;
    Ok(Value::Number(rand::thread_rng().gen::<f64>()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOGICAL
// ═══════════════════════════════════════════════════════════════════════════════

fn and<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    Ok(Value::Boolean(args.iter().all(Value::is_truthy)))
}

fn or<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    Ok(Value::Boolean(args.iter().any(Value::is_truthy)))
}

fn not<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args("NOT", &args, 1)?;
    Ok(Value::Boolean(!args[0].is_truthy()))
}

/// Both branches are already evaluated; the chosen one is returned as is.
fn if_fn<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("IF", &args, 2, 3)?;
    let mut args = args.into_iter();
    let condition = args.next().unwrap_or(Value::Undefined);
    let when_true = args.next().unwrap_or(Value::Undefined);
    let when_false = args.next().unwrap_or(Value::Undefined);
    Ok(if condition.is_truthy() {
        when_true
    } else {
        when_false
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATISTICAL
// ═══════════════════════════════════════════════════════════════════════════════

fn sum<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    let total = numbers(&args)
        .into_iter()
        .map(|n| if n.is_nan() { 0.0 } else { n })
        .sum();
    Ok(Value::Number(total))
}

fn average<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    let values = finite_numbers(&args);
    if values.is_empty() {
        return Ok(Value::Number(0.0));
    }
    Ok(Value::Number(values.iter().sum::<f64>() / values.len() as f64))
}

/// Empty input gives -Infinity.
fn max<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    Ok(Value::Number(
        non_nan_numbers(&args).into_iter().fold(f64::NEG_INFINITY, f64::max),
    ))
}

/// Empty input gives Infinity.
fn min<'a>(args: Vec<Value<'a>>, _ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    Ok(Value::Number(
        non_nan_numbers(&args).into_iter().fold(f64::INFINITY, f64::min),
    ))
}
