//! Evaluator configuration
//!
//! Holds the numeric locale convention used by coercion and the default
//! timezone for date functions. Loadable from YAML so the CLI and the server
//! can share a single file.

use crate::error::{CalcError, CalcResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decimal/thousands convention applied when coercing numeric text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub decimal: char,
    pub thousands: char,
}

impl NumberFormat {
    /// `1.234,56`
    pub const EUROPEAN: NumberFormat = NumberFormat {
        decimal: ',',
        thousands: '.',
    };

    /// `1,234.56`
    pub const US: NumberFormat = NumberFormat {
        decimal: '.',
        thousands: ',',
    };

    pub fn validate(&self) -> CalcResult<()> {
        let allowed = ['.', ','];
        if !allowed.contains(&self.decimal) || !allowed.contains(&self.thousands) {
            return Err(CalcError::Eval(format!(
                "Invalid number format: separators must be '.' or ',' (got decimal '{}', thousands '{}')",
                self.decimal, self.thousands
            )));
        }
        if self.decimal == self.thousands {
            return Err(CalcError::Eval(format!(
                "Invalid number format: decimal and thousands separators are both '{}'",
                self.decimal
            )));
        }
        Ok(())
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::EUROPEAN
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    pub number_format: NumberFormat,
    /// Zone used by date functions when the formula passes none.
    pub timezone: String,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            number_format: NumberFormat::default(),
            timezone: "UTC".to_string(),
        }
    }
}

impl CalcConfig {
    pub fn from_yaml_str(content: &str) -> CalcResult<Self> {
        let config: CalcConfig = serde_yaml::from_str(content)?;
        config.number_format.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> CalcResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}
