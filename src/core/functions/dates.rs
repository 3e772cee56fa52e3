//! Date and time functions
//!
//! Every function takes an optional trailing timezone. Dates are parsed with
//! [`parse_date`]; an argument that does not parse is an error.

use super::{require_args_range, FnContext, FunctionCategory, FunctionLibrary};
use crate::core::datetime::{parse_date, DateKind, DateUnit, ParsedInstant, Zone};
use crate::error::{CalcError, CalcResult};
use crate::types::Value;

pub(super) fn register(library: &mut FunctionLibrary) {
    use FunctionCategory::Date;

    library.register("NOW", Date, "NOW(tz?)", "Current timestamp", now);
    library.register("TODAY", Date, "TODAY(tz?)", "Current date", today);
    library.register(
        "DATEADD",
        Date,
        "DATEADD(date, amount, unit, tz?)",
        "Add a signed amount of years, quarters, months, weeks, days, hours, minutes or seconds",
        date_add,
    );
    library.register(
        "DATEDIFF",
        Date,
        "DATEDIFF(start, end, unit, tz?)",
        "Whole units from start to end",
        date_diff,
    );
    library.register("YEAR", Date, "YEAR(date, tz?)", "Calendar year", year);
    library.register("MONTH", Date, "MONTH(date, tz?)", "Month, 1-12", month);
    library.register("DAY", Date, "DAY(date, tz?)", "Day of month", day);
    library.register("HOUR", Date, "HOUR(date, tz?)", "Hour, 0-23", hour);
    library.register("MINUTE", Date, "MINUTE(date, tz?)", "Minute, 0-59", minute);
    library.register("SECOND", Date, "SECOND(date, tz?)", "Second, 0-59", second);
    library.register(
        "WEEKDAY",
        Date,
        "WEEKDAY(date, convention?, tz?)",
        "Day of week: ISO Monday=1 by default, 1 = Sunday-first, 3 = Monday=0",
        weekday,
    );
    library.register(
        "WEEKNUM",
        Date,
        "WEEKNUM(date, type?, tz?)",
        "ISO week number",
        weeknum,
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// ARGUMENT HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Missing, empty or undefined zone arguments fall back to the default.
fn zone_arg(arg: Option<&Value<'_>>, ctx: &FnContext<'_>) -> CalcResult<Zone> {
    match arg {
        None | Some(Value::Undefined) | Some(Value::Null) => Ok(ctx.zone),
        Some(Value::Text(s)) if s.trim().is_empty() => Ok(ctx.zone),
        Some(Value::Text(s)) => Zone::parse(s),
        Some(other) => Err(CalcError::InvalidTimezone(other.as_text())),
    }
}

fn date_arg(func: &str, arg: Option<&Value<'_>>, zone: &Zone) -> CalcResult<ParsedInstant> {
    let value = arg.unwrap_or(&Value::Undefined);
    parse_date(value, zone).ok_or_else(|| {
        CalcError::InvalidDate(format!("{} cannot read '{}' as a date", func, value.as_text()))
    })
}

fn unit_arg(arg: Option<&Value<'_>>) -> CalcResult<DateUnit> {
    match arg {
        Some(Value::Text(s)) => s.parse(),
        Some(other) => Err(CalcError::InvalidUnit(other.as_text())),
        None => Err(CalcError::InvalidUnit("undefined".to_string())),
    }
}

/// Shared body of the single-field extractors.
fn field<'a>(
    func: &str,
    args: &[Value<'a>],
    ctx: &FnContext<'_>,
    extract: fn(&ParsedInstant) -> u32,
) -> CalcResult<Value<'a>> {
    require_args_range(func, args, 1, 2)?;
    let zone = zone_arg(args.get(1), ctx)?;
    let parsed = date_arg(func, args.first(), &zone)?;
    Ok(Value::Number(f64::from(extract(&parsed))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// CURRENT TIME
// ═══════════════════════════════════════════════════════════════════════════════

fn now<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("NOW", &args, 0, 1)?;
    let zone = zone_arg(args.first(), ctx)?;
    let current = ParsedInstant::new(ctx.clock.now(), zone, DateKind::DateTime);
    Ok(Value::Text(current.to_iso()))
}

fn today<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("TODAY", &args, 0, 1)?;
    let zone = zone_arg(args.first(), ctx)?;
    let current = ParsedInstant::new(ctx.clock.now(), zone, DateKind::DateOnly);
    Ok(Value::Text(current.to_iso_date()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// ARITHMETIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Output keeps the kind of the input: a plain date in, a plain date out.
fn date_add<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("DATEADD", &args, 3, 4)?;
    let zone = zone_arg(args.get(3), ctx)?;
    let parsed = date_arg("DATEADD", args.first(), &zone)?;
    let unit = unit_arg(args.get(2))?;

    let amount = args[1].to_number();
    if amount.is_nan() {
        return Err(CalcError::Eval(format!(
            "DATEADD amount must be a number, got '{}'",
            args[1].as_text()
        )));
    }

    Ok(Value::Text(parsed.plus(amount, unit)?.render()))
}

fn date_diff<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("DATEDIFF", &args, 3, 4)?;
    let zone = zone_arg(args.get(3), ctx)?;
    let start = date_arg("DATEDIFF", args.first(), &zone)?;
    let end = date_arg("DATEDIFF", args.get(1), &zone)?;
    let unit = unit_arg(args.get(2))?;

    Ok(Value::Number(start.diff(&end, unit) as f64))
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIELDS
// ═══════════════════════════════════════════════════════════════════════════════

fn year<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("YEAR", &args, 1, 2)?;
    let zone = zone_arg(args.get(1), ctx)?;
    let parsed = date_arg("YEAR", args.first(), &zone)?;
    Ok(Value::Number(f64::from(parsed.year())))
}

fn month<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    field("MONTH", &args, ctx, ParsedInstant::month)
}

fn day<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    field("DAY", &args, ctx, ParsedInstant::day)
}

fn hour<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    field("HOUR", &args, ctx, ParsedInstant::hour)
}

fn minute<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    field("MINUTE", &args, ctx, ParsedInstant::minute)
}

fn second<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    field("SECOND", &args, ctx, ParsedInstant::second)
}

/// 1: Sunday=1 … Saturday=7. 3: Monday=0 … Sunday=6. Otherwise ISO.
fn weekday<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("WEEKDAY", &args, 1, 3)?;
    let zone = zone_arg(args.get(2), ctx)?;
    let parsed = date_arg("WEEKDAY", args.first(), &zone)?;
    let iso = parsed.iso_weekday();

    // Only numeric conventions select a scheme; text such as '3' is ISO
    let result = match args.get(1) {
        Some(Value::Number(c)) if *c == 1.0 => iso % 7 + 1,
        Some(Value::Number(c)) if *c == 3.0 => iso - 1,
        _ => iso,
    };
    Ok(Value::Number(f64::from(result)))
}

/// The `type` argument is accepted but numbering is always ISO.
fn weeknum<'a>(args: Vec<Value<'a>>, ctx: &FnContext<'_>) -> CalcResult<Value<'a>> {
    require_args_range("WEEKNUM", &args, 1, 3)?;
    let zone = zone_arg(args.get(2), ctx)?;
    let parsed = date_arg("WEEKNUM", args.first(), &zone)?;
    Ok(Value::Number(f64::from(parsed.iso_week())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::datetime::FixedClock;
    use chrono::{DateTime, Utc};

    fn clock_at(iso: &str) -> FixedClock {
        FixedClock(iso.parse::<DateTime<Utc>>().unwrap())
    }

    fn call_at(clock: &FixedClock, name: &str, args: Vec<Value<'static>>) -> CalcResult<Value<'static>> {
        let (_, f) = FunctionLibrary::standard().get(name).unwrap();
        let ctx = FnContext {
            clock,
            zone: Zone::Utc,
        };
        f(args, &ctx)
    }

    fn call(name: &str, args: Vec<Value<'static>>) -> CalcResult<Value<'static>> {
        call_at(&clock_at("2025-09-26T12:00:00Z"), name, args)
    }

    fn t(s: &str) -> Value<'static> {
        Value::Text(s.to_string())
    }

    fn n(v: f64) -> Value<'static> {
        Value::Number(v)
    }

    #[test]
    fn test_now_and_today() {
        assert_eq!(call("NOW", vec![]).unwrap(), t("2025-09-26T12:00:00.000Z"));
        assert_eq!(call("TODAY", vec![]).unwrap(), t("2025-09-26"));

        let late = clock_at("2025-09-26T23:00:00Z");
        assert_eq!(
            call_at(&late, "TODAY", vec![t("Europe/Helsinki")]).unwrap(),
            t("2025-09-27")
        );
        assert_eq!(
            call("NOW", vec![t("Asia/Tokyo")]).unwrap(),
            t("2025-09-26T21:00:00.000+09:00")
        );
    }

    #[test]
    fn test_date_add_keeps_kind() {
        assert_eq!(
            call("DATEADD", vec![t("2025-09-26"), n(14.0), t("days")]).unwrap(),
            t("2025-10-10")
        );
        assert_eq!(
            call("DATEADD", vec![t("30.09.2025"), n(5.0), t("DAYS")]).unwrap(),
            t("2025-10-05")
        );
        assert_eq!(
            call("DATEADD", vec![t("2025-09-26T10:30:00+03:00"), n(1.0), t("days")]).unwrap(),
            t("2025-09-27T07:30:00.000Z")
        );
    }

    #[test]
    fn test_date_add_errors() {
        assert!(matches!(
            call("DATEADD", vec![t("2025-09-26"), n(1.0), t("invalid")]),
            Err(CalcError::InvalidUnit(_))
        ));
        assert!(matches!(
            call("DATEADD", vec![t("nope"), n(1.0), t("days")]),
            Err(CalcError::InvalidDate(_))
        ));
        assert!(matches!(
            call("DATEADD", vec![t("2025-09-26"), t("x"), t("days")]),
            Err(CalcError::Eval(_))
        ));
        assert!(matches!(
            call("DATEADD", vec![t("2025-09-26"), n(1.0), t("days"), t("Nowhere/Land")]),
            Err(CalcError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_date_diff_sign() {
        let forward = call("DATEDIFF", vec![t("2025-09-26"), t("2025-10-10"), t("days")]).unwrap();
        let backward = call("DATEDIFF", vec![t("2025-10-10"), t("2025-09-26"), t("days")]).unwrap();
        assert_eq!(forward, n(14.0));
        assert_eq!(backward, n(-14.0));
    }

    #[test]
    fn test_field_extraction_with_zone() {
        assert_eq!(call("HOUR", vec![t("2025-09-26T14:30:45+03:00")]).unwrap(), n(11.0));
        assert_eq!(
            call("HOUR", vec![t("2025-09-26T00:00:00Z"), t("America/New_York")]).unwrap(),
            n(20.0)
        );
        assert_eq!(call("YEAR", vec![t("15.03.2024 09:30:45")]).unwrap(), n(2024.0));
        assert!(matches!(
            call("YEAR", vec![t("invalid")]),
            Err(CalcError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_weekday_conventions() {
        // 2025-09-28 is a Sunday, 2025-09-29 a Monday
        assert_eq!(call("WEEKDAY", vec![t("2025-09-28")]).unwrap(), n(7.0));
        assert_eq!(call("WEEKDAY", vec![t("2025-09-28"), n(1.0)]).unwrap(), n(1.0));
        assert_eq!(call("WEEKDAY", vec![t("2025-09-29"), n(1.0)]).unwrap(), n(2.0));
        assert_eq!(call("WEEKDAY", vec![t("2025-09-29"), n(2.0)]).unwrap(), n(1.0));
        assert_eq!(call("WEEKDAY", vec![t("2025-09-29"), n(3.0)]).unwrap(), n(0.0));
        assert_eq!(call("WEEKDAY", vec![t("2025-09-28"), n(3.0)]).unwrap(), n(6.0));
        assert_eq!(call("WEEKDAY", vec![t("2025-09-28"), t("3")]).unwrap(), n(7.0));
        assert_eq!(call("WEEKDAY", vec![t("2025-09-28"), t("1")]).unwrap(), n(7.0));
    }

    #[test]
    fn test_weeknum_ignores_type() {
        assert_eq!(call("WEEKNUM", vec![t("2025-01-06")]).unwrap(), n(2.0));
        assert_eq!(call("WEEKNUM", vec![t("2025-01-06"), t("ISO")]).unwrap(), n(2.0));
        assert_eq!(call("WEEKNUM", vec![t("2025-01-06"), n(1.0)]).unwrap(), n(2.0));
    }
}
