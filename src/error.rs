use thiserror::Error;

pub type CalcResult<T> = Result<T, CalcError>;

/// Units accepted by DATEADD/DATEDIFF, in the order they are reported.
pub const VALID_DATE_UNITS: &str = "years, quarters, months, weeks, days, hours, minutes, seconds";

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid date unit: {0}. Valid units are: {units}", units = VALID_DATE_UNITS)]
    InvalidUnit(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Formula evaluation error: {0}")]
    Eval(String),
}

impl CalcError {
    /// True for lookups of names that are bound nowhere in the scope.
    pub fn is_undefined_variable(&self) -> bool {
        matches!(self, CalcError::UndefinedVariable(_))
    }
}

/// Error surfaced by [`crate::Calculator::evaluate`] once the fallback rules
/// have declined to absorb it.
#[derive(Error, Debug)]
#[error("calc: {source}")]
pub struct EvaluationError {
    #[from]
    source: CalcError,
}

impl EvaluationError {
    pub fn kind(&self) -> &CalcError {
        &self.source
    }

    pub fn into_inner(self) -> CalcError {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_variable_message() {
        let err = CalcError::UndefinedVariable("missingVar".to_string());
        assert_eq!(err.to_string(), "undefined variable: missingVar");
        assert!(err.is_undefined_variable());
    }

    #[test]
    fn test_invalid_unit_lists_valid_units() {
        let err = CalcError::InvalidUnit("fortnights".to_string());
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid date unit: fortnights."));
        assert!(msg.contains("quarters"));
    }

    #[test]
    fn test_evaluation_error_prefix_and_source() {
        let err = EvaluationError::from(CalcError::Parse("Unexpected token".to_string()));
        assert_eq!(err.to_string(), "calc: Parse error: Unexpected token");
        assert!(matches!(err.kind(), CalcError::Parse(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
