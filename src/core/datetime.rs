//! Zone-aware date parsing and calendar arithmetic
//!
//! Inputs are parsed into a [`ParsedInstant`]: an absolute instant, the zone
//! it is viewed in, and whether the original text was a plain date. ISO 8601
//! is tried first, then German, European, US and Asian layouts in that order.

use crate::error::{CalcError, CalcResult};
use crate::types::Value;
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, Months, NaiveDate, NaiveDateTime,
    NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

// ═══════════════════════════════════════════════════════════════════════════════
// TIMEZONES
// ═══════════════════════════════════════════════════════════════════════════════

static FIXED_OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:utc|gmt)?\s*([+-])(\d{1,2})(?::?(\d{2}))?$").expect("valid offset regex")
});

/// Zone a date is viewed in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Zone {
    #[default]
    Utc,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    /// Accepts `UTC`/`Z`, IANA names and fixed offsets (`+03:00`, `UTC+3`).
    pub fn parse(name: &str) -> CalcResult<Zone> {
        let trimmed = name.trim();
        let lower = trimmed.to_ascii_lowercase();
        if matches!(lower.as_str(), "utc" | "z" | "gmt" | "etc/utc") {
            return Ok(Zone::Utc);
        }

        if let Some(caps) = FIXED_OFFSET.captures(trimmed) {
            let sign = if &caps[1] == "-" { -1 } else { 1 };
            let hours: i32 = caps[2].parse().unwrap_or(0);
            let minutes: i32 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            if hours > 18 || minutes > 59 {
                return Err(CalcError::InvalidTimezone(name.to_string()));
            }
            let seconds = sign * (hours * 3600 + minutes * 60);
            if seconds == 0 {
                return Ok(Zone::Utc);
            }
            return FixedOffset::east_opt(seconds)
                .map(Zone::Fixed)
                .ok_or_else(|| CalcError::InvalidTimezone(name.to_string()));
        }

        Tz::from_str(trimmed)
            .map(Zone::Named)
            .map_err(|_| CalcError::InvalidTimezone(name.to_string()))
    }

    pub fn is_utc(&self) -> bool {
        matches!(self, Zone::Utc)
    }

    pub fn offset_at(&self, instant: &DateTime<Utc>) -> FixedOffset {
        match self {
            Zone::Utc => Utc.fix(),
            Zone::Fixed(offset) => *offset,
            Zone::Named(tz) => tz.offset_from_utc_datetime(&instant.naive_utc()).fix(),
        }
    }

    /// Wall-clock time of `instant` in this zone.
    pub fn local(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset_at(instant)).naive_local()
    }

    /// Resolve a wall-clock time. Ambiguous times take the earlier instant;
    /// times inside a DST gap move forward by the gap.
    pub fn from_local(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Utc => Some(Utc.from_utc_datetime(naive)),
            Zone::Fixed(offset) => offset
                .from_local_datetime(naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Named(tz) => match tz.from_local_datetime(naive) {
                LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
                LocalResult::None => {
                    let shifted = naive.checked_add_signed(Duration::hours(1))?;
                    tz.from_local_datetime(&shifted)
                        .earliest()
                        .map(|dt| dt.with_timezone(&Utc))
                }
            },
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Utc => write!(f, "UTC"),
            Zone::Fixed(offset) => write!(f, "{}", offset),
            Zone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of the current instant for NOW and TODAY.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// UNITS
// ═══════════════════════════════════════════════════════════════════════════════

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Years,
    Quarters,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl DateUnit {
    /// Length in months for calendar units.
    fn months(self) -> Option<i64> {
        match self {
            DateUnit::Years => Some(12),
            DateUnit::Quarters => Some(3),
            DateUnit::Months => Some(1),
            _ => None,
        }
    }

    /// Length in days for day-based units.
    fn days(self) -> Option<i64> {
        match self {
            DateUnit::Weeks => Some(7),
            DateUnit::Days => Some(1),
            _ => None,
        }
    }

    /// Average length used for fractional amounts.
    fn casual_millis(self) -> f64 {
        let days = match self {
            DateUnit::Years => 365,
            DateUnit::Quarters => 91,
            DateUnit::Months => 30,
            DateUnit::Weeks => 7,
            DateUnit::Days => 1,
            DateUnit::Hours => return MS_PER_HOUR as f64,
            DateUnit::Minutes => return MS_PER_MINUTE as f64,
            DateUnit::Seconds => return MS_PER_SECOND as f64,
        };
        (days * MS_PER_DAY) as f64
    }
}

impl FromStr for DateUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "years" => Ok(DateUnit::Years),
            "quarters" => Ok(DateUnit::Quarters),
            "months" => Ok(DateUnit::Months),
            "weeks" => Ok(DateUnit::Weeks),
            "days" => Ok(DateUnit::Days),
            "hours" => Ok(DateUnit::Hours),
            "minutes" => Ok(DateUnit::Minutes),
            "seconds" => Ok(DateUnit::Seconds),
            _ => Err(CalcError::InvalidUnit(s.to_string())),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSED INSTANT
// ═══════════════════════════════════════════════════════════════════════════════

/// Whether the source text carried a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    DateOnly,
    DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedInstant {
    pub instant: DateTime<Utc>,
    pub zone: Zone,
    pub kind: DateKind,
}

impl ParsedInstant {
    pub fn new(instant: DateTime<Utc>, zone: Zone, kind: DateKind) -> Self {
        Self {
            instant,
            zone,
            kind,
        }
    }

    pub fn local(&self) -> NaiveDateTime {
        self.zone.local(&self.instant)
    }

    pub fn year(&self) -> i32 {
        self.local().year()
    }

    pub fn month(&self) -> u32 {
        self.local().month()
    }

    pub fn day(&self) -> u32 {
        self.local().day()
    }

    pub fn hour(&self) -> u32 {
        self.local().hour()
    }

    pub fn minute(&self) -> u32 {
        self.local().minute()
    }

    pub fn second(&self) -> u32 {
        self.local().second()
    }

    /// Monday = 1 … Sunday = 7
    pub fn iso_weekday(&self) -> u32 {
        self.local().weekday().number_from_monday()
    }

    pub fn iso_week(&self) -> u32 {
        self.local().iso_week().week()
    }

    /// `2025-09-26T12:00:00.000Z`, or with a `+HH:MM` offset outside UTC.
    pub fn to_iso(&self) -> String {
        let zoned = self.instant.with_timezone(&self.zone.offset_at(&self.instant));
        if self.zone.is_utc() {
            zoned.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
        } else {
            zoned.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
        }
    }

    pub fn to_iso_date(&self) -> String {
        self.local().format("%Y-%m-%d").to_string()
    }

    /// Serialise in the same kind as the source text.
    pub fn render(&self) -> String {
        match self.kind {
            DateKind::DateOnly => self.to_iso_date(),
            DateKind::DateTime => self.to_iso(),
        }
    }

    /// Add `amount` units. Whole calendar units move the wall clock (with
    /// month-end clamping); fractions and clock units are exact durations.
    pub fn plus(&self, amount: f64, unit: DateUnit) -> CalcResult<ParsedInstant> {
        if !amount.is_finite() || amount.abs() > 1e12 {
            return Err(CalcError::InvalidDate(format!(
                "cannot add {} {:?}",
                amount, unit
            )));
        }
        let whole = amount.trunc() as i64;
        let fraction = amount - amount.trunc();
        let out_of_range = || CalcError::InvalidDate("date out of range".to_string());

        let mut instant = if let Some(months) = unit.months() {
            let wall = add_months(self.local(), whole * months).ok_or_else(out_of_range)?;
            self.zone.from_local(&wall).ok_or_else(out_of_range)?
        } else if let Some(days) = unit.days() {
            let wall = self
                .local()
                .checked_add_signed(Duration::try_days(whole * days).ok_or_else(out_of_range)?)
                .ok_or_else(out_of_range)?;
            self.zone.from_local(&wall).ok_or_else(out_of_range)?
        } else {
            let millis = (unit.casual_millis() as i64).checked_mul(whole).ok_or_else(out_of_range)?;
            self.instant
                .checked_add_signed(Duration::milliseconds(millis))
                .ok_or_else(out_of_range)?
        };

        if fraction != 0.0 {
            let extra = (fraction * unit.casual_millis()).round() as i64;
            instant = instant
                .checked_add_signed(Duration::milliseconds(extra))
                .ok_or_else(out_of_range)?;
        }

        Ok(ParsedInstant::new(instant, self.zone, self.kind))
    }

    /// Whole `unit`s from `self` to `end`, truncated toward zero.
    pub fn diff(&self, end: &ParsedInstant, unit: DateUnit) -> i64 {
        if end.instant < self.instant {
            -whole_units_between(end.instant, self.instant, &self.zone, unit)
        } else {
            whole_units_between(self.instant, end.instant, &self.zone, unit)
        }
    }
}

fn add_months(wall: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let count = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        wall.checked_add_months(Months::new(count))
    } else {
        wall.checked_sub_months(Months::new(count))
    }
}

/// `start <= end`
fn whole_units_between(start: DateTime<Utc>, end: DateTime<Utc>, zone: &Zone, unit: DateUnit) -> i64 {
    let a = zone.local(&start);
    let b = zone.local(&end);

    if let Some(per) = unit.months() {
        let mut months = i64::from(b.year() - a.year()) * 12 + i64::from(b.month()) - i64::from(a.month());
        while months > 0 && add_months(a, months).map_or(true, |stepped| stepped > b) {
            months -= 1;
        }
        return months.max(0) / per;
    }

    if let Some(per) = unit.days() {
        let mut days = (b.date() - a.date()).num_days();
        while days > 0 && a.checked_add_signed(Duration::days(days)).map_or(true, |stepped| stepped > b) {
            days -= 1;
        }
        return days.max(0) / per;
    }

    (end - start).num_milliseconds() / unit.casual_millis() as i64
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════════

static ISO_8601: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})(?:-(\d{2})(?:T(\d{2})(?::(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?)?(Z|z|[+-]\d{2}(?::?\d{2})?)?)?)?$",
    )
    .expect("valid ISO regex")
});

/// Date-only shapes: ISO, German, slash day/month, Asian.
static DATE_ONLY: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{4}-\d{2}-\d{2}$",
        r"^\d{1,2}\.\d{1,2}\.\d{4}$",
        r"^\d{1,2}/\d{1,2}/\d{4}$",
        r"^\d{4}/\d{1,2}/\d{1,2}$",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// `%Y` alone would accept `25` as the year 25; locale dates need four digits.
static LOCALE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{1,2}[./]\d{1,2}[./]\d{4}|\d{4}/\d{1,2}/\d{1,2})(?:\s|$)")
        .expect("valid locale date regex")
});

/// Fallback layouts in priority order. Ambiguous slash dates therefore read
/// as day/month before month/day.
const LOCALE_FORMATS: &[(&str, &str)] = &[
    ("german", "%d.%m.%Y %H:%M:%S"),
    ("german", "%d.%m.%Y %H:%M"),
    ("german", "%d.%m.%Y"),
    ("european", "%d/%m/%Y %H:%M:%S"),
    ("european", "%d/%m/%Y %H:%M"),
    ("european", "%d/%m/%Y"),
    ("us", "%m/%d/%Y %H:%M:%S"),
    ("us", "%m/%d/%Y %H:%M"),
    ("us", "%m/%d/%Y"),
    ("asian", "%Y/%m/%d %H:%M:%S"),
    ("asian", "%Y/%m/%d %H:%M"),
    ("asian", "%Y/%m/%d"),
];

/// Parse a formula value into an instant viewed in `zone`. Falsy and
/// unparseable values give `None`; callers decide whether that is an error.
pub fn parse_date(value: &Value<'_>, zone: &Zone) -> Option<ParsedInstant> {
    if !value.is_truthy() {
        return None;
    }
    match value {
        Value::Date(instant) => Some(ParsedInstant::new(*instant, *zone, DateKind::DateTime)),
        Value::Number(ms) => {
            DateTime::from_timestamp_millis(*ms as i64).map(|instant| ParsedInstant::new(instant, *zone, DateKind::DateTime))
        }
        Value::Text(s) => parse_date_str(s, zone),
        _ => None,
    }
}

pub fn parse_date_str(s: &str, zone: &Zone) -> Option<ParsedInstant> {
    let trimmed = s.trim();
    let instant = parse_iso(trimmed, zone).or_else(|| parse_locale(trimmed, zone))?;
    let kind = if DATE_ONLY.iter().any(|re| re.is_match(trimmed)) {
        DateKind::DateOnly
    } else {
        DateKind::DateTime
    };
    Some(ParsedInstant::new(instant, *zone, kind))
}

fn parse_iso(s: &str, zone: &Zone) -> Option<DateTime<Utc>> {
    let caps = ISO_8601.captures(s)?;
    let field = |i: usize| -> Option<u32> { caps.get(i).and_then(|m| m.as_str().parse().ok()) };

    let year: i32 = caps[1].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(2)?, field(3).unwrap_or(1))?;
    let nanos = caps
        .get(7)
        .map(|m| format!("{:0<9}", m.as_str()).parse::<u32>().ok())
        .unwrap_or(Some(0))?;
    let time = NaiveTime::from_hms_nano_opt(
        field(4).unwrap_or(0),
        field(5).unwrap_or(0),
        field(6).unwrap_or(0),
        nanos,
    )?;
    let naive = date.and_time(time);

    let instant = match caps.get(8).map(|m| m.as_str()) {
        Some("Z") | Some("z") => Some(Utc.from_utc_datetime(&naive)),
        Some(offset) => {
            let offset = parse_offset(offset)?;
            offset.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc))
        }
        None => zone.from_local(&naive),
    };
    trace!(input = s, ?instant, "ISO date");
    instant
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let sign = if s.starts_with('-') { -1 } else { 1 };
    let digits: String = s[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..).filter(|m| !m.is_empty()).map_or(Some(0), |m| m.parse().ok())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_locale(s: &str, zone: &Zone) -> Option<DateTime<Utc>> {
    if !LOCALE_SHAPE.is_match(s) {
        return None;
    }
    for (name, format) in LOCALE_FORMATS {
        let parsed = if format.contains("%H") {
            NaiveDateTime::parse_from_str(s, format).ok()
        } else {
            NaiveDate::parse_from_str(s, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        };
        if let Some(naive) = parsed {
            trace!(input = s, layout = *name, format = *format, "locale date");
            return zone.from_local(&naive);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utc(s: &str) -> ParsedInstant {
        parse_date_str(s, &Zone::Utc).unwrap()
    }

    #[test]
    fn test_zone_parse() {
        assert_eq!(Zone::parse("utc").unwrap(), Zone::Utc);
        assert_eq!(Zone::parse("Z").unwrap(), Zone::Utc);
        assert_eq!(
            Zone::parse("Europe/Berlin").unwrap(),
            Zone::Named(chrono_tz::Europe::Berlin)
        );
        assert_eq!(
            Zone::parse("+03:00").unwrap(),
            Zone::Fixed(FixedOffset::east_opt(3 * 3600).unwrap())
        );
        assert_eq!(
            Zone::parse("UTC-5").unwrap(),
            Zone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap())
        );
        assert!(matches!(
            Zone::parse("Mars/Olympus"),
            Err(CalcError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_iso_kinds() {
        assert_eq!(utc("2025-09-26").kind, DateKind::DateOnly);
        assert_eq!(utc("2025-09-26T00:00:00Z").kind, DateKind::DateTime);
        assert_eq!(utc("2025-09-26T10:30:45.123Z").to_iso(), "2025-09-26T10:30:45.123Z");
    }

    #[test]
    fn test_iso_offset_is_normalised_to_zone() {
        let parsed = utc("2025-09-26T14:30:45+03:00");
        assert_eq!(parsed.hour(), 11);
        assert_eq!(parsed.to_iso(), "2025-09-26T11:30:45.000Z");
    }

    #[test]
    fn test_locale_layouts() {
        let german = utc("30.09.2025 11:34:56");
        assert_eq!((german.day(), german.month(), german.second()), (30, 9, 56));
        assert_eq!(utc("30.09.2025").kind, DateKind::DateOnly);

        assert_eq!(utc("15/06/2025").month(), 6);
        assert_eq!(utc("05/06/2025").month(), 6);
        assert_eq!(utc("06/15/2025").day(), 15);
        assert_eq!(utc("2025/09/30 15:45").hour(), 15);
        assert_eq!(utc("2025/09/30").kind, DateKind::DateOnly);
    }

    #[test]
    fn test_unparseable_and_falsy() {
        assert!(parse_date_str("invalid", &Zone::Utc).is_none());
        assert!(parse_date_str("2025-13-01", &Zone::Utc).is_none());
        assert!(parse_date(&Value::Null, &Zone::Utc).is_none());
        assert!(parse_date(&Value::Text(String::new()), &Zone::Utc).is_none());
        assert!(parse_date(&Value::Number(0.0), &Zone::Utc).is_none());
    }

    #[test]
    fn test_two_digit_years_are_rejected() {
        for input in ["30.09.25", "30.09.25 11:34", "15/06/25", "06/15/25", "25/09/30"] {
            assert!(parse_date_str(input, &Zone::Utc).is_none(), "{input} should not parse");
        }
        assert!(parse_date_str("30.09.02025", &Zone::Utc).is_none());
    }

    #[test]
    fn test_epoch_millis() {
        let parsed = parse_date(&Value::Number(1_758_888_000_000.0), &Zone::Utc).unwrap();
        assert_eq!(parsed.to_iso(), "2025-09-26T12:00:00.000Z");
    }

    #[test]
    fn test_wall_time_in_named_zone() {
        let zone = Zone::parse("America/New_York").unwrap();
        let parsed = parse_date_str("2025-09-26T00:00:00Z", &zone).unwrap();
        assert_eq!(parsed.hour(), 20);
        assert_eq!(parsed.day(), 25);
        assert_eq!(parsed.to_iso(), "2025-09-25T20:00:00.000-04:00");
    }

    #[test]
    fn test_plus_clamps_month_end() {
        let parsed = utc("2025-01-31");
        assert_eq!(parsed.plus(1.0, DateUnit::Months).unwrap().render(), "2025-02-28");
        assert_eq!(parsed.plus(-1.0, DateUnit::Years).unwrap().render(), "2024-01-31");
        assert_eq!(parsed.plus(1.0, DateUnit::Quarters).unwrap().render(), "2025-04-30");
    }

    #[test]
    fn test_plus_fractional_and_clock_units() {
        let parsed = utc("2025-09-26T10:30:00Z");
        assert_eq!(
            parsed.plus(1.5, DateUnit::Days).unwrap().to_iso(),
            "2025-09-27T22:30:00.000Z"
        );
        assert_eq!(
            parsed.plus(-2.0, DateUnit::Hours).unwrap().to_iso(),
            "2025-09-26T08:30:00.000Z"
        );
        assert!(parsed.plus(f64::NAN, DateUnit::Days).is_err());
    }

    #[test]
    fn test_plus_keeps_wall_time_across_dst() {
        let zone = Zone::parse("Europe/Berlin").unwrap();
        let parsed = parse_date_str("2025-10-25T12:00:00", &zone).unwrap();
        let next = parsed.plus(1.0, DateUnit::Days).unwrap();
        assert_eq!(next.to_iso(), "2025-10-26T12:00:00.000+01:00");
    }

    #[test]
    fn test_diff_whole_units() {
        let a = utc("2025-01-31");
        let b = utc("2025-02-28");
        assert_eq!(a.diff(&b, DateUnit::Months), 1);
        assert_eq!(b.diff(&a, DateUnit::Months), -1);
        assert_eq!(a.diff(&b, DateUnit::Weeks), 4);

        let start = utc("2025-09-26T10:00:00Z");
        let end = utc("2025-09-26T15:30:00Z");
        assert_eq!(start.diff(&end, DateUnit::Hours), 5);
        assert_eq!(end.diff(&start, DateUnit::Hours), -5);
        assert_eq!(start.diff(&end, DateUnit::Days), 0);
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("DAYS".parse::<DateUnit>().unwrap(), DateUnit::Days);
        assert_eq!("Quarters".parse::<DateUnit>().unwrap(), DateUnit::Quarters);
        assert!(matches!("day".parse::<DateUnit>(), Err(CalcError::InvalidUnit(_))));
    }

    #[test]
    fn test_fixed_clock() {
        let now = utc("2025-09-26T12:00:00Z").instant;
        assert_eq!(FixedClock(now).now(), now);
    }
}
