//! Spreadsheet-style formula evaluator
//!
//! Evaluates formula strings such as `SUM(a, b) * 1.2` or
//! `DATEADD(start, 2, 'months')` against JSON context data. Numeric text in
//! the context is coerced on read using a locale convention (`"1.234,56"` is
//! `1234.56` under the default European format), and dates are parsed from
//! ISO 8601 and common regional layouts in any IANA timezone.
//!
//! # Features
//!
//! - Arithmetic, comparison, logical and conditional operators
//! - Spreadsheet functions (SUM, AVERAGE, ROUND, IF, ...)
//! - Date functions (NOW, TODAY, DATEADD, DATEDIFF, WEEKNUM, ...)
//! - Layered scopes: root context < local context < named arguments
//! - Lazy, locale-aware numeric coercion of nested data
//!
//! # Example
//!
//! ```
//! use spreadsheet_calc::{CalcInput, Calculator, Scalar};
//! use serde_json::json;
//!
//! let local = json!({ "price": "1.234,56", "qty": 2 });
//! let result = Calculator::new()
//!     .evaluate("price * qty", &CalcInput::new().with_local(&local))?;
//!
//! assert_eq!(result, Scalar::Number(2469.12));
//! # Ok::<(), spreadsheet_calc::EvaluationError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{CalcConfig, NumberFormat};
pub use core::datetime::{Clock, FixedClock, SystemClock, Zone};
pub use core::functions::FunctionLibrary;
pub use core::scope::Instants;
pub use core::{calc, CalcInput, Calculator};
pub use error::{CalcError, CalcResult, EvaluationError};
pub use types::{Scalar, Value};
