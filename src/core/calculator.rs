//! Public evaluation entry point
//!
//! Builds the scope for one call, evaluates the formula and applies the
//! result fallbacks: a `default` named argument replaces any failure, an
//! undefined name yields the empty string, anything else is surfaced.

use super::datetime::{Clock, SystemClock, Zone};
use super::formula::{self, Expr};
use super::functions::{FnContext, FunctionLibrary};
use super::scope::{Instants, Scope};
use crate::config::CalcConfig;
use crate::error::{CalcResult, EvaluationError};
use crate::types::Scalar;
use serde_json::{Map, Value as Json};
use std::sync::Arc;
use tracing::{debug, trace};

/// Name of the named argument that replaces a failed evaluation.
pub const DEFAULT_KEY: &str = "default";

/// Borrowed data sources for one evaluation, lowest precedence first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalcInput<'a> {
    pub root: Option<&'a Json>,
    pub local: Option<&'a Json>,
    pub hash: Option<&'a Map<String, Json>>,
    /// Native instants; they outrank every JSON source.
    pub instants: Option<&'a Instants>,
}

impl<'a> CalcInput<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: &'a Json) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_local(mut self, local: &'a Json) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_hash(mut self, hash: &'a Map<String, Json>) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn with_instants(mut self, instants: &'a Instants) -> Self {
        self.instants = Some(instants);
        self
    }

    fn default_value(&self) -> Option<&'a Json> {
        self.hash.and_then(|hash| hash.get(DEFAULT_KEY))
    }
}

/// Configured formula evaluator. Holds no per-call state and is cheap to
/// share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Calculator {
    config: CalcConfig,
    zone: Zone,
    clock: Arc<dyn Clock>,
    functions: &'static FunctionLibrary,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// European number format, UTC, system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CalcConfig::default(),
            zone: Zone::Utc,
            clock: Arc::new(SystemClock),
            functions: FunctionLibrary::standard(),
        }
    }

    pub fn with_config(config: CalcConfig) -> CalcResult<Self> {
        config.number_format.validate()?;
        let zone = Zone::parse(&config.timezone)?;
        Ok(Self {
            config,
            zone,
            ..Self::new()
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CalcConfig {
        &self.config
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn functions(&self) -> &'static FunctionLibrary {
        self.functions
    }

    /// Parse only; used to validate formulas ahead of time.
    pub fn compile(&self, expr: &str) -> CalcResult<Expr> {
        formula::compile(expr)
    }

    /// Evaluate `expr` against the input and normalise the result.
    pub fn evaluate(&self, expr: &str, input: &CalcInput<'_>) -> Result<Scalar, EvaluationError> {
        debug!(expression = expr, "Evaluating formula");

        match self.try_evaluate(expr, input) {
            Ok(result) => {
                trace!(expression = expr, %result, "Formula evaluated");
                Ok(result)
            }
            Err(err) => {
                if let Some(default) = input.default_value() {
                    debug!(expression = expr, error = %err, "Falling back to default value");
                    return Ok(Scalar::from_json(default));
                }
                if err.is_undefined_variable() {
                    debug!(expression = expr, error = %err, "Undefined variable, empty result");
                    return Ok(Scalar::Text(String::new()));
                }
                debug!(expression = expr, error = %err, "Formula evaluation failed");
                Err(err.into())
            }
        }
    }

    fn try_evaluate(&self, expr: &str, input: &CalcInput<'_>) -> CalcResult<Scalar> {
        let ast = formula::compile(expr)?;
        let format = &self.config.number_format;
        let scope = Scope::builder(self.functions, format)
            .root(input.root)
            .local(input.local)
            .named(input.hash)
            .instants(input.instants)
            .build();
        let ctx = FnContext {
            clock: self.clock.as_ref(),
            zone: self.zone,
        };
        let value = formula::evaluate(&ast, &scope, &ctx)?;
        Ok(Scalar::from(value))
    }
}

/// One-shot evaluation with the default [`Calculator`].
pub fn calc(
    expr: &str,
    local: Option<&Json>,
    hash: Option<&Map<String, Json>>,
    root: Option<&Json>,
) -> Result<Scalar, EvaluationError> {
    let input = CalcInput {
        root,
        local,
        hash,
        instants: None,
    };
    Calculator::new().evaluate(expr, &input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::datetime::FixedClock;
    use crate::error::CalcError;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn hash(value: Json) -> Map<String, Json> {
        match value {
            Json::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_basic_evaluation() {
        let calc = Calculator::new();
        assert_eq!(
            calc.evaluate("2 + 3", &CalcInput::new()).unwrap(),
            Scalar::Number(5.0)
        );
    }

    #[test]
    fn test_undefined_variable_yields_empty() {
        let calc = Calculator::new();
        assert_eq!(
            calc.evaluate("missingVar * 2", &CalcInput::new()).unwrap(),
            Scalar::Text(String::new())
        );
    }

    #[test]
    fn test_default_absorbs_parse_errors() {
        let calc = Calculator::new();
        let named = hash(json!({"default": "-"}));
        let input = CalcInput::new().with_hash(&named);
        assert_eq!(
            calc.evaluate("invalid expression", &input).unwrap(),
            Scalar::Text("-".to_string())
        );

        let err = calc.evaluate("invalid expression", &CalcInput::new()).unwrap_err();
        assert!(matches!(err.kind(), CalcError::Parse(_)));
        assert!(err.to_string().starts_with("calc: "));
    }

    #[test]
    fn test_null_result_is_empty() {
        let local = json!({"nothing": null});
        let input = CalcInput::new().with_local(&local);
        assert!(Calculator::new().evaluate("nothing", &input).unwrap().is_empty());
    }

    #[test]
    fn test_config_timezone_and_clock() {
        let config = CalcConfig::default().with_timezone("Europe/Helsinki");
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 9, 26, 23, 0, 0).unwrap());
        let calc = Calculator::with_config(config)
            .unwrap()
            .with_clock(Arc::new(clock));
        assert_eq!(
            calc.evaluate("TODAY()", &CalcInput::new()).unwrap(),
            Scalar::Text("2025-09-27".to_string())
        );
    }

    #[test]
    fn test_invalid_config_timezone() {
        let config = CalcConfig::default().with_timezone("Mars/Olympus");
        assert!(matches!(
            Calculator::with_config(config),
            Err(CalcError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_calc_free_function() {
        let local = json!({"x": 1, "y": 2});
        let named = hash(json!({"x": 10}));
        assert_eq!(
            calc("x + y", Some(&local), Some(&named), None).unwrap(),
            Scalar::Number(12.0)
        );
    }
}
