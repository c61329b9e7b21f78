//! Conditional compilation predicates and their evaluation.
//!
//! Items carry `#[cfg(..)]` and `#[cfg_attr(.., cfg(..))]` attributes. The host
//! decides which options are active through a [`CfgEvaluator`]; answers are
//! three-valued so that options the host knows nothing about never produce
//! diagnostics.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// A `cfg` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfgExpr {
    /// A bare option such as `unix` or `test`.
    Atom(SmolStr),
    /// A key/value option such as `feature = "std"`.
    KeyValue {
        /// Option key.
        key: SmolStr,
        /// Option value (without quotes).
        value: SmolStr,
    },
    /// `all(..)`: true when every operand is true.
    All(Vec<CfgExpr>),
    /// `any(..)`: true when some operand is true.
    Any(Vec<CfgExpr>),
    /// `not(..)`.
    Not(Box<CfgExpr>),
}

/// A conditional compilation attribute attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfgAttr {
    /// `#[cfg(predicate)]`.
    Cfg(CfgExpr),
    /// `#[cfg_attr(predicate, attrs..)]`; only nested `cfg` attributes matter here.
    CfgAttr {
        /// Condition under which `attrs` apply.
        predicate: CfgExpr,
        /// Attributes applied when `predicate` holds.
        attrs: Vec<CfgAttr>,
    },
}

/// Result of evaluating the attributes of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfgState {
    /// The item is compiled.
    #[default]
    Enabled,
    /// The item is compiled out.
    Disabled,
    /// The evaluator cannot tell.
    Unknown,
}

impl CfgState {
    /// Combines the state of a container with the state of one of its items.
    #[must_use]
    pub fn and(self, other: CfgState) -> CfgState {
        match (self, other) {
            (CfgState::Disabled, _) | (_, CfgState::Disabled) => CfgState::Disabled,
            (CfgState::Unknown, _) | (_, CfgState::Unknown) => CfgState::Unknown,
            (CfgState::Enabled, CfgState::Enabled) => CfgState::Enabled,
        }
    }

    fn from_truth(value: Option<bool>) -> CfgState {
        match value {
            Some(true) => CfgState::Enabled,
            Some(false) => CfgState::Disabled,
            None => CfgState::Unknown,
        }
    }

    /// Returns true for [`CfgState::Enabled`].
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == CfgState::Enabled
    }
}

/// Host oracle answering `cfg` predicates.
pub trait CfgEvaluator {
    /// Evaluates one predicate; `None` means the answer is unknown.
    fn eval(&self, expr: &CfgExpr) -> Option<bool>;

    /// Evaluates every `cfg` attribute of an item.
    fn state(&self, attrs: &[CfgAttr]) -> CfgState {
        CfgState::from_truth(all(attrs.iter().map(|attr| attr_truth(self, attr))))
    }

    /// Returns true when the attributes definitely enable the item.
    fn is_enabled(&self, attrs: &[CfgAttr]) -> bool {
        self.state(attrs).is_enabled()
    }
}

fn attr_truth<E: CfgEvaluator + ?Sized>(evaluator: &E, attr: &CfgAttr) -> Option<bool> {
    match attr {
        CfgAttr::Cfg(expr) => evaluator.eval(expr),
        // `cfg_attr(p, cfg(q))` behaves like `not(p) or q`.
        CfgAttr::CfgAttr { predicate, attrs } => {
            let inner = all(attrs.iter().map(|attr| attr_truth(evaluator, attr)));
            any([evaluator.eval(predicate).map(|value| !value), inner].into_iter())
        }
    }
}

fn all(values: impl Iterator<Item = Option<bool>>) -> Option<bool> {
    let mut result = Some(true);
    for value in values {
        match value {
            Some(false) => return Some(false),
            None => result = None,
            Some(true) => {}
        }
    }
    result
}

fn any(values: impl Iterator<Item = Option<bool>>) -> Option<bool> {
    let mut result = Some(false);
    for value in values {
        match value {
            Some(true) => return Some(true),
            None => result = None,
            Some(false) => {}
        }
    }
    result
}

/// The stock evaluator: a set of enabled options.
///
/// Options not listed are disabled, except keys registered as unknown, whose
/// predicates evaluate to "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgOptions {
    atoms: FxHashSet<SmolStr>,
    key_values: FxHashSet<(SmolStr, SmolStr)>,
    unknown: FxHashSet<SmolStr>,
}

impl CfgOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a bare option.
    #[must_use]
    pub fn with_atom(mut self, atom: impl Into<SmolStr>) -> Self {
        self.atoms.insert(atom.into());
        self
    }

    /// Enables a key/value option.
    #[must_use]
    pub fn with_key_value(mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.key_values.insert((key.into(), value.into()));
        self
    }

    /// Enables `feature = "name"`.
    #[must_use]
    pub fn with_feature(self, feature: impl Into<SmolStr>) -> Self {
        self.with_key_value("feature", feature)
    }

    /// Marks an option key as unknown.
    #[must_use]
    pub fn with_unknown(mut self, key: impl Into<SmolStr>) -> Self {
        self.unknown.insert(key.into());
        self
    }

    /// Enables a bare option in place.
    pub fn insert_atom(&mut self, atom: impl Into<SmolStr>) {
        self.atoms.insert(atom.into());
    }

    /// Enables a key/value option in place.
    pub fn insert_key_value(&mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        self.key_values.insert((key.into(), value.into()));
    }

    /// Marks an option key as unknown in place.
    pub fn insert_unknown(&mut self, key: impl Into<SmolStr>) {
        self.unknown.insert(key.into());
    }
}

impl CfgEvaluator for CfgOptions {
    fn eval(&self, expr: &CfgExpr) -> Option<bool> {
        match expr {
            CfgExpr::Atom(atom) => {
                if self.unknown.contains(atom) {
                    None
                } else {
                    Some(self.atoms.contains(atom))
                }
            }
            CfgExpr::KeyValue { key, value } => {
                if self.unknown.contains(key) {
                    None
                } else {
                    Some(self.key_values.contains(&(key.clone(), value.clone())))
                }
            }
            CfgExpr::All(exprs) => all(exprs.iter().map(|expr| self.eval(expr))),
            CfgExpr::Any(exprs) => any(exprs.iter().map(|expr| self.eval(expr))),
            CfgExpr::Not(expr) => self.eval(expr).map(|value| !value),
        }
    }
}

/// Error produced by [`CfgExpr::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfgParseError {
    /// The input ended in the middle of a predicate.
    #[error("unexpected end of cfg predicate")]
    UnexpectedEnd,
    /// A token did not fit the predicate grammar.
    #[error("unexpected `{token}` at offset {offset} in cfg predicate")]
    UnexpectedToken {
        /// Offending token text.
        token: SmolStr,
        /// Byte offset of the token.
        offset: usize,
    },
    /// A string literal was not closed.
    #[error("unterminated string literal at offset {0}")]
    UnterminatedString(usize),
    /// `not(..)` must have exactly one operand.
    #[error("`not` takes exactly one predicate, got {0}")]
    NotArity(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(SmolStr),
    Str(SmolStr),
    Eq,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn text(&self) -> SmolStr {
        match self {
            Token::Ident(text) => text.clone(),
            Token::Str(text) => SmolStr::new(format!("\"{text}\"")),
            Token::Eq => SmolStr::new_inline("="),
            Token::LParen => SmolStr::new_inline("("),
            Token::RParen => SmolStr::new_inline(")"),
            Token::Comma => SmolStr::new_inline(","),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, CfgParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => {}
            '=' => tokens.push((offset, Token::Eq)),
            '(' => tokens.push((offset, Token::LParen)),
            ')' => tokens.push((offset, Token::RParen)),
            ',' => tokens.push((offset, Token::Comma)),
            '"' => {
                let mut value = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    value.push(c);
                }
                if !closed {
                    return Err(CfgParseError::UnterminatedString(offset));
                }
                tokens.push((offset, Token::Str(SmolStr::new(value))));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = offset + c.len_utf8();
                while let Some(&(next_offset, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        end = next_offset + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((offset, Token::Ident(SmolStr::new(&input[offset..end]))));
            }
            other => {
                return Err(CfgParseError::UnexpectedToken {
                    token: SmolStr::new(other.to_string()),
                    offset,
                })
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, token)| token)
    }

    fn bump(&mut self) -> Result<(usize, Token), CfgParseError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(CfgParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> Result<(), CfgParseError> {
        let (offset, token) = self.bump()?;
        if &token == expected {
            Ok(())
        } else {
            Err(CfgParseError::UnexpectedToken {
                token: token.text(),
                offset,
            })
        }
    }

    fn expr(&mut self) -> Result<CfgExpr, CfgParseError> {
        let (offset, token) = self.bump()?;
        let Token::Ident(name) = token else {
            return Err(CfgParseError::UnexpectedToken {
                token: token.text(),
                offset,
            });
        };
        match self.peek() {
            Some(Token::Eq) => {
                self.pos += 1;
                let (offset, token) = self.bump()?;
                match token {
                    Token::Str(value) => Ok(CfgExpr::KeyValue { key: name, value }),
                    other => Err(CfgParseError::UnexpectedToken {
                        token: other.text(),
                        offset,
                    }),
                }
            }
            Some(Token::LParen) if matches!(name.as_str(), "all" | "any" | "not") => {
                self.pos += 1;
                let operands = self.operands()?;
                match name.as_str() {
                    "all" => Ok(CfgExpr::All(operands)),
                    "any" => Ok(CfgExpr::Any(operands)),
                    _ => {
                        let count = operands.len();
                        let mut operands = operands.into_iter();
                        match (operands.next(), count) {
                            (Some(operand), 1) => Ok(CfgExpr::Not(Box::new(operand))),
                            _ => Err(CfgParseError::NotArity(count)),
                        }
                    }
                }
            }
            _ => Ok(CfgExpr::Atom(name)),
        }
    }

    fn operands(&mut self) -> Result<Vec<CfgExpr>, CfgParseError> {
        let mut operands = Vec::new();
        loop {
            if self.peek() == Some(&Token::RParen) {
                self.pos += 1;
                return Ok(operands);
            }
            operands.push(self.expr()?);
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => {}
                _ => {
                    self.expect(&Token::RParen)?;
                    return Ok(operands);
                }
            }
        }
    }
}

impl CfgExpr {
    /// Parses the text between the parentheses of `#[cfg(..)]`.
    pub fn parse(input: &str) -> Result<CfgExpr, CfgParseError> {
        let mut parser = Parser {
            tokens: tokenize(input)?,
            pos: 0,
        };
        let expr = parser.expr()?;
        match parser.tokens.get(parser.pos) {
            None => Ok(expr),
            Some((offset, token)) => Err(CfgParseError::UnexpectedToken {
                token: token.text(),
                offset: *offset,
            }),
        }
    }

    /// Shorthand for a bare option.
    #[must_use]
    pub fn atom(name: impl Into<SmolStr>) -> CfgExpr {
        CfgExpr::Atom(name.into())
    }
}

impl fmt::Display for CfgExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, name: &str, exprs: &[CfgExpr]) -> fmt::Result {
            write!(f, "{name}(")?;
            for (idx, expr) in exprs.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{expr}")?;
            }
            f.write_str(")")
        }

        match self {
            CfgExpr::Atom(atom) => f.write_str(atom),
            CfgExpr::KeyValue { key, value } => write!(f, "{key} = \"{value}\""),
            CfgExpr::All(exprs) => list(f, "all", exprs),
            CfgExpr::Any(exprs) => list(f, "any", exprs),
            CfgExpr::Not(expr) => write!(f, "not({expr})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(text: &str) -> CfgAttr {
        CfgAttr::Cfg(CfgExpr::parse(text).unwrap())
    }

    #[test]
    fn parses_nested_predicates() {
        let expr = CfgExpr::parse(r#"all(unix, not(feature = "std"), any(test, debug_assertions))"#)
            .unwrap();
        assert_eq!(
            expr.to_string(),
            r#"all(unix, not(feature = "std"), any(test, debug_assertions))"#
        );
    }

    #[test]
    fn rejects_malformed_predicates() {
        assert_eq!(CfgExpr::parse("all(unix"), Err(CfgParseError::UnexpectedEnd));
        assert_eq!(CfgExpr::parse("not(a, b)"), Err(CfgParseError::NotArity(2)));
        assert_eq!(
            CfgExpr::parse(r#"feature = "std"#),
            Err(CfgParseError::UnterminatedString(10))
        );
        assert!(matches!(
            CfgExpr::parse("unix windows"),
            Err(CfgParseError::UnexpectedToken { offset: 5, .. })
        ));
    }

    #[test]
    fn evaluates_with_three_valued_logic() {
        let options = CfgOptions::new()
            .with_atom("unix")
            .with_feature("std")
            .with_unknown("target_os");

        assert_eq!(options.state(&[]), CfgState::Enabled);
        assert_eq!(options.state(&[cfg("unix")]), CfgState::Enabled);
        assert_eq!(options.state(&[cfg("windows")]), CfgState::Disabled);
        assert_eq!(options.state(&[cfg("not(windows)")]), CfgState::Enabled);
        assert_eq!(options.state(&[cfg(r#"feature = "std""#)]), CfgState::Enabled);
        assert_eq!(
            options.state(&[cfg(r#"target_os = "linux""#)]),
            CfgState::Unknown
        );
        assert_eq!(
            options.state(&[cfg(r#"all(windows, target_os = "linux")"#)]),
            CfgState::Disabled
        );
        assert_eq!(
            options.state(&[cfg(r#"any(unix, target_os = "linux")"#)]),
            CfgState::Enabled
        );
        assert_eq!(
            options.state(&[cfg("unix"), cfg("windows")]),
            CfgState::Disabled
        );
    }

    #[test]
    fn cfg_attr_applies_only_when_predicate_holds() {
        let options = CfgOptions::new().with_atom("unix");
        let gated = |predicate: &str, inner: &str| CfgAttr::CfgAttr {
            predicate: CfgExpr::parse(predicate).unwrap(),
            attrs: vec![cfg(inner)],
        };

        assert_eq!(options.state(&[gated("unix", "windows")]), CfgState::Disabled);
        assert_eq!(options.state(&[gated("windows", "windows")]), CfgState::Enabled);
        assert_eq!(options.state(&[gated("unix", "unix")]), CfgState::Enabled);
    }

    #[test]
    fn mutually_exclusive_predicates_never_both_enable() {
        let on = CfgOptions::new().with_atom("windows");
        let off = CfgOptions::new();
        for options in [&on, &off] {
            let a = options.is_enabled(&[cfg("windows")]);
            let b = options.is_enabled(&[cfg("not(windows)")]);
            assert!(a ^ b);
        }
    }

    #[test]
    fn state_combination_prefers_disabled() {
        assert_eq!(CfgState::Unknown.and(CfgState::Disabled), CfgState::Disabled);
        assert_eq!(CfgState::Enabled.and(CfgState::Unknown), CfgState::Unknown);
        assert_eq!(CfgState::Enabled.and(CfgState::Enabled), CfgState::Enabled);
    }
}
