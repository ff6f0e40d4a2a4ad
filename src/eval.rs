use thiserror::Error;
use tracing::trace;

use crate::radix::{self, Base, RadixError};

// 2^53, the largest integer the float intermediates represent exactly.
pub const RESULT_LIMIT: f64 = 9007199254740992.0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is negative or too large to represent exactly")]
    OutOfRange,
    #[error("malformed expression")]
    Syntax,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    #[error(transparent)]
    Radix(#[from] RadixError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Evaluates a base-10 arithmetic expression down to an unsigned integer.
///
/// Grammar, lowest precedence first:
///
/// ```text
/// expression := term (('+'|'-') term)*             left-associative
/// term       := factor (('*'|'/'|'%') factor)*     left-associative
/// factor     := ('+'|'-')? power
/// power      := (number | '(' expression ')') ('^' power)?   right-associative
/// number     := floating-point literal, optional sign and exponent
/// ```
///
/// Intermediates are `f64`; the final value must satisfy `0 <= v < 2^53` and
/// is truncated toward zero.
pub fn evaluate(text: &str) -> Result<u64, EvalError> {
    let mut parser = Parser {
        input: text.as_bytes(),
        pos: 0,
    };
    let value = parser.expression()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(EvalError::Syntax);
    }
    if value < 0.0 || value >= RESULT_LIMIT {
        return Err(EvalError::OutOfRange);
    }
    Ok(value as u64)
}

/// Transliterates `expr` from `base` to base 10, then evaluates it. The
/// interactive Enter path and the file-mode driver both go through here.
pub fn evaluate_in_base(expr: &str, base: Base) -> Result<u64, CalcError> {
    let decimal = radix::transliterate(expr, base, Base::DECIMAL)?;
    trace!(%expr, %decimal, "evaluating");
    Ok(evaluate(&decimal)?)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some(op @ (b'*' | b'/' | b'%')) => op,
                _ => return Ok(value),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            match op {
                b'*' => value *= rhs,
                b'/' | b'%' if rhs == 0.0 => return Err(EvalError::DivisionByZero),
                b'/' => value /= rhs,
                _ => value %= rhs,
            }
        }
    }

    fn factor(&mut self) -> Result<f64, EvalError> {
        self.skip_whitespace();
        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        let value = self.power()?;
        Ok(if negative { -value } else { value })
    }

    fn power(&mut self) -> Result<f64, EvalError> {
        self.skip_whitespace();
        let mut value = if self.peek() == Some(b'(') {
            self.pos += 1;
            let inner = self.expression()?;
            self.skip_whitespace();
            if self.peek() != Some(b')') {
                return Err(EvalError::Syntax);
            }
            self.pos += 1;
            inner
        } else {
            self.number()?
        };
        self.skip_whitespace();
        if self.peek() == Some(b'^') {
            self.pos += 1;
            let exponent = self.power()?;
            value = value.powf(exponent);
        }
        Ok(value)
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        self.skip_whitespace();
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut digits = 0;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            digits += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
                digits += 1;
            }
        }
        if digits == 0 {
            self.pos = start;
            return Err(EvalError::Syntax);
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            // Only an exponent if sign-then-digits actually follow.
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = mark;
            }
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| EvalError::Syntax)?
            .parse::<f64>()
            .map_err(|_| EvalError::Syntax)
    }
}
