//! Formula resolution for node values, costs and edge probabilities.
//!
//! Editors store what the user typed (`"$1,200"`, `"25%"`, `"price * units - 300"`). The
//! [`ExpressionResolver`] trait turns such a string into a number given the variables in scope,
//! or `None` when the string is blank, malformed or evaluates to something that is not a finite
//! number. [`FormulaResolver`] is the built-in arithmetic implementation: `+ - * / ^`,
//! parentheses, unary signs, postfix `%` and variable names.

use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::BTreeMap, iter::Peekable, str::Chars};
use thiserror::Error;

/// Deepest nesting of parentheses and signs a formula may use.
pub const MAX_NESTING: usize = 256;

/// Currency symbols and thousands separators carry no arithmetic meaning.
static FORMATTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$€£¥,]").expect("formatting pattern is a valid regex"));

pub trait ExpressionResolver {
    /// Evaluate `expr` against `variables`. `None` means undetermined.
    fn resolve(&self, expr: &str, variables: &BTreeMap<String, f64>) -> Option<f64>;

    fn resolve_or(&self, expr: &str, variables: &BTreeMap<String, f64>, default: f64) -> f64 {
        self.resolve(expr, variables).unwrap_or(default)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("malformed number '{0}'")]
    BadNumber(String),
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("unexpected token {0:?}")]
    UnexpectedToken(Token),
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("formula evaluated to a non-finite number")]
    NotFinite,
    #[error("formula nests deeper than {MAX_NESTING} levels")]
    TooDeep,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    LParen,
    RParen,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FormulaResolver;

impl FormulaResolver {
    /// Strip currency and grouping marks. Returns `None` for a blank formula.
    pub fn normalize(expr: &str) -> Option<String> {
        let stripped = FORMATTING.replace_all(expr, "");
        let trimmed = stripped.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn evaluate(
        &self,
        expr: &str,
        variables: &BTreeMap<String, f64>,
    ) -> Result<f64, FormulaError> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
            variables,
        };
        let value = parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(FormulaError::UnexpectedToken(token.clone()));
        }
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NotFinite)
        }
    }
}

impl ExpressionResolver for FormulaResolver {
    fn resolve(&self, expr: &str, variables: &BTreeMap<String, f64>) -> Option<f64> {
        let normalized = FormulaResolver::normalize(expr)?;
        match self.evaluate(&normalized, variables) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Formula {:?} did not resolve: {}", expr, e);
                None
            }
        }
    }
}

fn tokenize(expr: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => tokens.push(Token::Number(number(&mut chars)?)),
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '^' => Token::Caret,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    other => return Err(FormulaError::UnexpectedChar(other)),
                };
                chars.next();
                tokens.push(token);
            }
        }
    }
    Ok(tokens)
}

fn number(chars: &mut Peekable<Chars<'_>>) -> Result<f64, FormulaError> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    // Exponent, only when a digit (optionally signed) follows the 'e'.
    if matches!(chars.peek(), Some('e') | Some('E')) {
        let mut lookahead = chars.clone();
        lookahead.next();
        let mut exponent = String::from("e");
        if let Some(&sign) = lookahead.peek().filter(|c| **c == '+' || **c == '-') {
            exponent.push(sign);
            lookahead.next();
        }
        if lookahead.peek().is_some_and(|c| c.is_ascii_digit()) {
            while let Some(&c) = lookahead.peek().filter(|c| c.is_ascii_digit()) {
                exponent.push(c);
                lookahead.next();
            }
            text.push_str(&exponent);
            *chars = lookahead;
        }
    }
    text.parse::<f64>().map_err(|_| FormulaError::BadNumber(text))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    variables: &'a BTreeMap<String, f64>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<f64, FormulaError> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    acc += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    acc -= self.term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<f64, FormulaError> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    acc /= self.unary()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    /// Every recursive descent passes through here, so this is where nesting is bounded.
    fn unary(&mut self) -> Result<f64, FormulaError> {
        if self.depth >= MAX_NESTING {
            return Err(FormulaError::TooDeep);
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, FormulaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, FormulaError> {
        let base = self.postfix()?;
        if let Some(Token::Caret) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.primary()?;
        while let Some(Token::Percent) = self.peek() {
            self.pos += 1;
            value /= 100.0;
        }
        Ok(value)
    }

    fn primary(&mut self) -> Result<f64, FormulaError> {
        match self.next().cloned() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Ident(name)) => self
                .variables
                .get(&name)
                .copied()
                .ok_or(FormulaError::UnknownVariable(name)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(FormulaError::UnexpectedToken(other.clone())),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some(other) => Err(FormulaError::UnexpectedToken(other)),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}
