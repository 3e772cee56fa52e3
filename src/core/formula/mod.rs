//! Formula engine: tokenizer → recursive-descent parser → tree-walking
//! evaluator.

pub mod evaluator;
pub mod parser;
pub mod tokenizer;

pub use evaluator::evaluate;
pub use parser::{Expr, ParseError};
pub use tokenizer::{Token, TokenizeError};

use crate::error::{CalcError, CalcResult};

/// Parse formula text into an AST without evaluating it.
pub fn compile(text: &str) -> CalcResult<Expr> {
    let tokens = tokenizer::tokenize(text).map_err(|e| {
        CalcError::Parse(format!("{} at position {}", e.message, e.position))
    })?;
    parser::parse(tokens)
        .map_err(|e| CalcError::Parse(format!("{} at token {}", e.message, e.position)))
}
