//! Core evaluation engine: coercion, scope, dates, functions and formulas

pub mod calculator;
pub mod coercion;
pub mod datetime;
pub mod formula;
pub mod functions;
pub mod scope;

pub use calculator::{calc, CalcInput, Calculator};
