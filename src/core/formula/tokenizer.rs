//! Formula tokenizer
//!
//! Converts formula strings like "ROUND(price * qty, 2)" into a sequence of
//! tokens that can be parsed into an AST.

use std::iter::Peekable;
use std::str::Chars;

/// A token in a formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal (e.g., 123, 45.67, .5, 1.5e10)
    Number(f64),
    /// A string literal (e.g., "hello" or 'world')
    Text(String),
    /// A variable or function name
    Identifier(String),
    /// Arithmetic, comparison and logical operators. `&&`, `||` and `!` are
    /// normalised to `and`, `or` and `not`.
    Operator(String),
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Comma,
    /// Member access
    Dot,
    Question,
    Colon,
}

/// Error during tokenization
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizeError {
    pub message: String,
    pub position: usize,
}

impl TokenizeError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tokenize error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for TokenizeError {}

/// Tokenizer for formula expressions
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(formula: &'a str) -> Self {
        Self {
            chars: formula.chars().peekable(),
            position: 0,
        }
    }

    /// Tokenize the entire formula into a vector of tokens
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get the next token, or None if at end of input
    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        self.skip_whitespace();

        let c = match self.peek() {
            None => return Ok(None),
            Some(c) => c,
        };

        let token = match c {
            '"' | '\'' => self.read_string()?,

            '(' => self.single(Token::OpenParen),
            ')' => self.single(Token::CloseParen),
            '[' => self.single(Token::OpenBracket),
            ']' => self.single(Token::CloseBracket),
            ',' => self.single(Token::Comma),
            '?' => self.single(Token::Question),
            ':' => self.single(Token::Colon),

            // `.5` is a number, otherwise member access
            '.' => {
                if self.peek_second().is_some_and(|next| next.is_ascii_digit()) {
                    self.read_number()?
                } else {
                    self.single(Token::Dot)
                }
            }

            '+' | '-' | '*' | '/' | '^' | '%' => {
                self.advance();
                Token::Operator(c.to_string())
            }

            '=' => self.read_equals(),
            '!' => self.read_bang(),
            '<' => self.read_less_than_operator(),
            '>' => self.read_greater_than_operator(),
            '&' => self.read_doubled('&', "and")?,
            '|' => self.read_doubled('|', "or")?,

            c if c.is_ascii_digit() => self.read_number()?,

            c if c.is_alphabetic() || c == '_' || c == '$' => self.read_identifier(),

            c => {
                return Err(TokenizeError::new(
                    format!("Unexpected character: '{}'", c),
                    self.position,
                ));
            }
        };
        Ok(Some(token))
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Character after the next one
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read a string literal. Supports backslash escapes and doubled quotes.
    fn read_string(&mut self) -> Result<Token, TokenizeError> {
        let start_pos = self.position;
        let quote = match self.advance() {
            Some(q) => q,
            None => return Err(TokenizeError::new("Expected string literal", start_pos)),
        };
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(TokenizeError::new("Unterminated string literal", start_pos));
                }
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => value.push(other),
                    None => {
                        return Err(TokenizeError::new("Unterminated string literal", start_pos));
                    }
                },
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        value.push(quote);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
            }
        }

        Ok(Token::Text(value))
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                into.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read a number (integer, decimal, or scientific notation)
    fn read_number(&mut self) -> Result<Token, TokenizeError> {
        let start_pos = self.position;
        let mut num_str = String::new();

        self.read_digits(&mut num_str);

        if self.peek() == Some('.') {
            num_str.push('.');
            self.advance();
            self.read_digits(&mut num_str);
        }

        // Exponent only when digits follow (`2e` stays number then identifier)
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut ahead = self.chars.clone();
            ahead.next();
            let next = ahead.next();
            let has_exponent = match next {
                Some(d) if d.is_ascii_digit() => true,
                Some('+') | Some('-') => ahead.next().is_some_and(|d| d.is_ascii_digit()),
                _ => false,
            };
            if has_exponent {
                num_str.push('e');
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    num_str.push(sign);
                    self.advance();
                }
                self.read_digits(&mut num_str);
            }
        }

        num_str
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| TokenizeError::new(format!("Invalid number: {}", num_str), start_pos))
    }

    /// Read an identifier. Word operators become operator tokens.
    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "and" | "or" | "not" => Token::Operator(ident),
            _ => Token::Identifier(ident),
        }
    }

    /// `==` or `=`
    fn read_equals(&mut self) -> Token {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            Token::Operator("==".to_string())
        } else {
            Token::Operator("=".to_string())
        }
    }

    /// `!=` or `!`
    fn read_bang(&mut self) -> Token {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            Token::Operator("!=".to_string())
        } else {
            Token::Operator("not".to_string())
        }
    }

    /// `&&` and `||`
    fn read_doubled(&mut self, c: char, op: &str) -> Result<Token, TokenizeError> {
        let start_pos = self.position;
        self.advance();
        if self.peek() == Some(c) {
            self.advance();
            Ok(Token::Operator(op.to_string()))
        } else {
            Err(TokenizeError::new(
                format!("Unexpected character: '{}', did you mean '{}{}'?", c, c, c),
                start_pos,
            ))
        }
    }

    /// Read operators starting with '<'
    fn read_less_than_operator(&mut self) -> Token {
        self.advance();

        match self.peek() {
            Some('=') => {
                self.advance();
                Token::Operator("<=".to_string())
            }
            Some('>') => {
                self.advance();
                Token::Operator("<>".to_string())
            }
            _ => Token::Operator("<".to_string()),
        }
    }

    /// Read operators starting with '>'
    fn read_greater_than_operator(&mut self) -> Token {
        self.advance();

        match self.peek() {
            Some('=') => {
                self.advance();
                Token::Operator(">=".to_string())
            }
            _ => Token::Operator(">".to_string()),
        }
    }
}

/// Convenience function to tokenize a formula string
pub fn tokenize(formula: &str) -> Result<Vec<Token>, TokenizeError> {
    Tokenizer::new(formula).tokenize()
}
