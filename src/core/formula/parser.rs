//! Formula parser
//!
//! Converts a sequence of tokens into an Abstract Syntax Tree (AST).
//! Uses recursive descent parsing with operator precedence.

use super::tokenizer::Token;

/// Abstract Syntax Tree node for formula expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// A top-level name resolved against the scope
    Variable(String),
    /// Property access: object.property
    Member { object: Box<Expr>, property: String },
    /// Bracket access: object[index]
    Index { object: Box<Expr>, index: Box<Expr> },
    /// Function call: NAME(arg1, arg2, ...)
    FunctionCall { name: String, args: Vec<Expr> },
    /// Binary operation: left op right
    BinaryOp {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation: -expr, +expr, not expr
    UnaryOp { op: String, operand: Box<Expr> },
    /// condition ? then_branch : else_branch
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

/// Error during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at token {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Deepest AST the parser will build. Parentheses, unary operators,
/// conditionals and chained operators each add a level; evaluation recurses
/// once per level.
pub const MAX_DEPTH: usize = 128;

/// Parser for formula tokens
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the tokens into an AST
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new("Empty expression", 0));
        }
        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(ParseError::new(
                format!("Unexpected token after expression: {:?}", self.peek()),
                self.position,
            ));
        }

        Ok(expr)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&Token> {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.tokens.get(self.position - 1)
    }

    /// Check if current token matches and consume it
    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: &Token, message: &str) -> Result<(), ParseError> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(ParseError::new(message, self.position))
        }
    }

    /// Check if current token is any of the given operators
    fn match_any_operator(&mut self, ops: &[&str]) -> Option<String> {
        if let Some(Token::Operator(s)) = self.peek() {
            if ops.contains(&s.as_str()) {
                let op = s.clone();
                self.advance();
                return Some(op);
            }
        }
        None
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new("Expression nested too deeply", self.position));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn binary(op: String, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;
        let expr = self.conditional()?;
        self.ascend(1);
        Ok(expr)
    }

    /// Conditional: logical_or ( "?" conditional ":" conditional )?
    fn conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.logical_or()?;

        if self.match_token(&Token::Question) {
            self.descend()?;
            let then_branch = self.conditional()?;
            self.expect_token(&Token::Colon, "Expected ':' in conditional expression")?;
            let else_branch = self.conditional()?;
            self.ascend(1);
            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(condition)
    }

    /// LogicalOr: logical_and ( "or" logical_and )*
    fn logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.logical_and()?;
        let mut chain = 0;
        while let Some(op) = self.match_any_operator(&["or"]) {
            self.descend()?;
            chain += 1;
            let right = self.logical_and()?;
            left = Self::binary(op, left, right);
        }
        self.ascend(chain);
        Ok(left)
    }

    /// LogicalAnd: comparison ( "and" comparison )*
    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.comparison()?;
        let mut chain = 0;
        while let Some(op) = self.match_any_operator(&["and"]) {
            self.descend()?;
            chain += 1;
            let right = self.comparison()?;
            left = Self::binary(op, left, right);
        }
        self.ascend(chain);
        Ok(left)
    }

    /// Comparison: term (( "==" | "=" | "!=" | "<>" | "<" | ">" | "<=" | ">=" ) term)*
    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;
        let mut chain = 0;

        while let Some(op) =
            self.match_any_operator(&["==", "=", "!=", "<>", "<", ">", "<=", ">="])
        {
            self.descend()?;
            chain += 1;
            let right = self.term()?;
            left = Self::binary(op, left, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Term: factor (( "+" | "-" ) factor)*
    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.factor()?;
        let mut chain = 0;

        while let Some(op) = self.match_any_operator(&["+", "-"]) {
            self.descend()?;
            chain += 1;
            let right = self.factor()?;
            left = Self::binary(op, left, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Factor: unary (( "*" | "/" | "%" ) unary)*
    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        let mut chain = 0;

        while let Some(op) = self.match_any_operator(&["*", "/", "%"]) {
            self.descend()?;
            chain += 1;
            let right = self.unary()?;
            left = Self::binary(op, left, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    /// Unary: ( "-" | "+" | "not" ) unary | power
    fn unary(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = self.match_any_operator(&["-", "+", "not"]) {
            self.descend()?;
            let operand = self.unary()?;
            self.ascend(1);
            Ok(Expr::UnaryOp {
                op,
                operand: Box::new(operand),
            })
        } else {
            self.power()
        }
    }

    /// Power: postfix ( "^" unary )?   (right-associative, `-2^2` is `-(2^2)`)
    fn power(&mut self) -> Result<Expr, ParseError> {
        let left = self.postfix()?;

        if let Some(op) = self.match_any_operator(&["^"]) {
            self.descend()?;
            let right = self.unary()?;
            self.ascend(1);
            Ok(Self::binary(op, left, right))
        } else {
            Ok(left)
        }
    }

    /// Postfix: primary ( "(" arguments? ")" | "[" expr "]" | "." IDENT )*
    fn postfix(&mut self) -> Result<Expr, ParseError> {
        // Only a bare name directly followed by '(' is a call
        let mut callable = matches!(self.peek(), Some(Token::Identifier(_)));
        let mut expr = self.primary()?;
        let mut chain = 0;

        loop {
            if matches!(
                self.peek(),
                Some(Token::OpenParen) | Some(Token::OpenBracket) | Some(Token::Dot)
            ) {
                self.descend()?;
                chain += 1;
            }
            if self.match_token(&Token::OpenParen) {
                let args = self.arguments()?;
                self.expect_token(&Token::CloseParen, "Expected ')' after function arguments")?;

                expr = match expr {
                    Expr::Variable(name) if callable => Expr::FunctionCall { name, args },
                    _ => {
                        return Err(ParseError::new(
                            "Only named functions can be called",
                            self.position,
                        ));
                    }
                };
            } else if self.match_token(&Token::OpenBracket) {
                let index = self.expression()?;
                self.expect_token(&Token::CloseBracket, "Expected ']' after index")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
                callable = false;
            } else if self.match_token(&Token::Dot) {
                let property = match self.advance() {
                    Some(Token::Identifier(name)) => name.clone(),
                    // Word operators are valid property names
                    Some(Token::Operator(word)) if word.chars().all(char::is_alphabetic) => {
                        word.clone()
                    }
                    _ => {
                        return Err(ParseError::new(
                            "Expected property name after '.'",
                            self.position,
                        ));
                    }
                };
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
                callable = false;
            } else {
                break;
            }
        }

        self.ascend(chain);
        Ok(expr)
    }

    /// Arguments: ( expr ( "," expr )* )?
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if let Some(Token::CloseParen) = self.peek() {
            return Ok(args);
        }

        args.push(self.expression()?);

        while self.match_token(&Token::Comma) {
            args.push(self.expression()?);
        }

        Ok(args)
    }

    /// Primary: NUMBER | STRING | IDENTIFIER | "(" expr ")"
    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().cloned();

        match token {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Some(Token::Text(s)) => {
                self.advance();
                Ok(Expr::Text(s))
            }
            Some(Token::Identifier(name)) => {
                self.advance();
                Ok(Self::parse_identifier(name))
            }
            Some(Token::OpenParen) => {
                self.advance();
                let expr = self.expression()?;
                self.expect_token(&Token::CloseParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            Some(token) => Err(ParseError::new(
                format!("Unexpected token: {:?}", token),
                self.position,
            )),
            None => Err(ParseError::new(
                "Unexpected end of expression",
                self.position,
            )),
        }
    }

    /// Constants are fixed at parse time and cannot be shadowed by data.
    fn parse_identifier(name: String) -> Expr {
        match name.as_str() {
            "true" | "TRUE" => Expr::Boolean(true),
            "false" | "FALSE" => Expr::Boolean(false),
            "PI" => Expr::Number(std::f64::consts::PI),
            "E" => Expr::Number(std::f64::consts::E),
            _ => Expr::Variable(name),
        }
    }
}

/// Convenience function to parse tokens into an AST
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formula::tokenizer::tokenize;

    /// Helper to parse a formula string directly
    fn parse_formula(formula: &str) -> Result<Expr, ParseError> {
        let tokens = tokenize(formula).map_err(|e| ParseError::new(e.message, e.position))?;
        parse(tokens)
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Variable(name.to_string()))
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("42").unwrap(), Expr::Number(42.0));
    }

    #[test]
    fn test_parse_negative_number() {
        assert_eq!(
            parse_formula("-42").unwrap(),
            Expr::UnaryOp {
                op: "-".to_string(),
                operand: num(42.0),
            }
        );
    }

    #[test]
    fn test_parse_precedence() {
        // 2 + 3 * 4 = 2 + (3 * 4)
        assert_eq!(
            parse_formula("2 + 3 * 4").unwrap(),
            Expr::BinaryOp {
                op: "+".to_string(),
                left: num(2.0),
                right: Box::new(Expr::BinaryOp {
                    op: "*".to_string(),
                    left: num(3.0),
                    right: num(4.0),
                }),
            }
        );
    }

    #[test]
    fn test_parse_power_binds_tighter_than_negation() {
        assert_eq!(
            parse_formula("-2^2").unwrap(),
            Expr::UnaryOp {
                op: "-".to_string(),
                operand: Box::new(Expr::BinaryOp {
                    op: "^".to_string(),
                    left: num(2.0),
                    right: num(2.0),
                }),
            }
        );
    }

    #[test]
    fn test_parse_power_right_associative() {
        assert_eq!(
            parse_formula("2^3^2").unwrap(),
            Expr::BinaryOp {
                op: "^".to_string(),
                left: num(2.0),
                right: Box::new(Expr::BinaryOp {
                    op: "^".to_string(),
                    left: num(3.0),
                    right: num(2.0),
                }),
            }
        );
    }

    #[test]
    fn test_parse_member_and_index() {
        assert_eq!(
            parse_formula("order.items[0].price").unwrap(),
            Expr::Member {
                object: Box::new(Expr::Index {
                    object: Box::new(Expr::Member {
                        object: var("order"),
                        property: "items".to_string(),
                    }),
                    index: num(0.0),
                }),
                property: "price".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_function_call() {
        assert_eq!(
            parse_formula("ROUND(x, 2)").unwrap(),
            Expr::FunctionCall {
                name: "ROUND".to_string(),
                args: vec![Expr::Variable("x".to_string()), Expr::Number(2.0)],
            }
        );
        assert_eq!(
            parse_formula("RAND()").unwrap(),
            Expr::FunctionCall {
                name: "RAND".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_parse_conditional_is_loosest() {
        assert_eq!(
            parse_formula("a > 1 ? 'big' : 'small'").unwrap(),
            Expr::Conditional {
                condition: Box::new(Expr::BinaryOp {
                    op: ">".to_string(),
                    left: var("a"),
                    right: num(1.0),
                }),
                then_branch: Box::new(Expr::Text("big".to_string())),
                else_branch: Box::new(Expr::Text("small".to_string())),
            }
        );
    }

    #[test]
    fn test_parse_logical_precedence() {
        // a or b and c = a or (b and c)
        assert_eq!(
            parse_formula("a or b and c").unwrap(),
            Expr::BinaryOp {
                op: "or".to_string(),
                left: var("a"),
                right: Box::new(Expr::BinaryOp {
                    op: "and".to_string(),
                    left: var("b"),
                    right: var("c"),
                }),
            }
        );
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(parse_formula("TRUE").unwrap(), Expr::Boolean(true));
        assert_eq!(parse_formula("false").unwrap(), Expr::Boolean(false));
        assert_eq!(parse_formula("PI").unwrap(), Expr::Number(std::f64::consts::PI));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("").is_err());
        assert!(parse_formula("invalid expression").is_err());
        assert!(parse_formula("(1 + 2").is_err());
        assert!(parse_formula("1 +").is_err());
        assert!(parse_formula("a ? 1").is_err());
        assert!(parse_formula("(a)(1)").is_err());
        assert!(parse_formula("a.").is_err());
    }

    #[test]
    fn test_parse_rejects_deep_nesting() {
        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = parse_formula(&deep).unwrap_err();
        assert!(err.message.contains("nested too deeply"));

        assert!(parse_formula(&format!("{}1", "-".repeat(10_000))).is_err());
        assert!(parse_formula(&format!("{}1", "not ".repeat(10_000))).is_err());
        assert!(parse_formula(&format!("1{}", " + 1".repeat(10_000))).is_err());
        assert!(parse_formula(&format!("{}1{}", "a ? ".repeat(5_000), " : 0".repeat(5_000))).is_err());
        assert!(parse_formula(&format!("x{}", ".y".repeat(10_000))).is_err());
        assert!(parse_formula(&format!("{}1{}", "ABS(".repeat(10_000), ")".repeat(10_000))).is_err());
    }

    #[test]
    fn test_parse_accepts_reasonable_nesting() {
        let nested = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse_formula(&nested).unwrap(), Expr::Number(1.0));
        assert!(parse_formula(&format!("1{}", " + 1".repeat(100))).is_ok());
        assert!(parse_formula(&format!("{}1{}", "ROUND(".repeat(40), ", 2)".repeat(40))).is_ok());
    }
}
