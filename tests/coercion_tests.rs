//! Locale-aware numeric coercion through the public API

use pretty_assertions::assert_eq;
use serde_json::json;
use spreadsheet_calc::core::coercion::{coerce, coerce_str, looks_like_date};
use spreadsheet_calc::{CalcConfig, CalcInput, Calculator, NumberFormat, Scalar, Value};

fn eu(text: &str) -> Option<f64> {
    coerce_str(text, &NumberFormat::EUROPEAN)
}

fn us(text: &str) -> Option<f64> {
    coerce_str(text, &NumberFormat::US)
}

// ═══════════════════════════════════════════════════════════════════════════
// EUROPEAN CONVENTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_european_amounts() {
    assert_eq!(eu("1.234,56"), Some(1234.56));
    assert_eq!(eu("12 345,67"), Some(12345.67));
    assert_eq!(eu("10,99"), Some(10.99));
    assert_eq!(eu("1.234.567,89"), Some(1234567.89));
}

#[test]
fn test_european_accepts_plain_us_text() {
    assert_eq!(eu("1,234.56"), Some(1234.56));
    assert_eq!(eu("42"), Some(42.0));
}

// ═══════════════════════════════════════════════════════════════════════════
// US CONVENTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_us_amounts() {
    assert_eq!(us("1,234.56"), Some(1234.56));
    assert_eq!(us("1,234,567"), Some(1_234_567.0));
    assert_eq!(us("0.5"), Some(0.5));
}

// ═══════════════════════════════════════════════════════════════════════════
// TEXT THAT STAYS TEXT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_dates_are_not_numbers() {
    for text in ["30.09.2025", "15/06/2025", "06/15/2025", "2025/09/30", "2025-09-26"] {
        assert!(looks_like_date(text), "{text} should look like a date");
        assert_eq!(eu(text), None, "{text} should stay text");
    }
}

#[test]
fn test_malformed_numbers_stay_text() {
    assert_eq!(eu("1.23.4"), None);
    assert_eq!(eu("abc"), None);
    assert_eq!(eu(""), None);
    assert_eq!(
        coerce(Value::Text("1.23.4".to_string()), &NumberFormat::EUROPEAN),
        Value::Text("1.23.4".to_string())
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// COERCION ON READ
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_context_values_are_coerced_when_read() {
    let calculator = Calculator::new();
    let local = json!({"net": "1.234,56", "rate": "0,2"});
    let input = CalcInput::new().with_local(&local);
    let result = calculator.evaluate("net * rate", &input).unwrap();
    match result {
        Scalar::Number(n) => assert!((n - 246.912).abs() < 1e-9, "got {n}"),
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn test_us_config_reads_comma_as_grouping() {
    let config = CalcConfig {
        number_format: NumberFormat::US,
        ..CalcConfig::default()
    };
    let calculator = Calculator::with_config(config).unwrap();
    let local = json!({"amount": "1,234.50"});
    let input = CalcInput::new().with_local(&local);
    assert_eq!(
        calculator.evaluate("amount + 0.5", &input).unwrap(),
        Scalar::Number(1235.0)
    );
}

#[test]
fn test_date_text_passes_through_untouched() {
    let calculator = Calculator::new();
    let local = json!({"start": "30.09.2025"});
    let input = CalcInput::new().with_local(&local);
    assert_eq!(
        calculator.evaluate("start", &input).unwrap(),
        Scalar::Text("30.09.2025".to_string())
    );
}
