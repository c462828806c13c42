//! Core data model for the sqldrill verification core.
//!
//! Leaf crate: value and result-set types, source spans, sort rules,
//! assertions, and the lesson/puzzle definition document. Everything here is
//! plain data with serde derives; behavior lives in `sqldrill-verify` and
//! `sqldrill-session`.

use std::fmt;

pub mod lesson;
pub mod value;

pub use lesson::{Course, Lesson, Step, VerifyRule};
pub use value::{ResultSet, Row, Value};

// ---------------------------------------------------------------------------
// Source spans and statements
// ---------------------------------------------------------------------------

/// A half-open byte range `[start, end)` into learner-submitted text.
///
/// Computed once per split call and carried forward; used by the editor to
/// mark the failing statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span from byte offsets.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// 1-based (line, column) of the span start within `source`.
    ///
    /// Column counts characters, not bytes, so multi-byte text positions the
    /// caret correctly.
    #[must_use]
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let before = &source[..self.start.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let col = before
            .rsplit('\n')
            .next()
            .map_or(0, |last| last.chars().count())
            + 1;
        (line, col)
    }
}

/// One SQL statement extracted from a learner submission.
///
/// Created by the splitter for a single execution attempt and discarded
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Statement {
    /// Statement text, trimmed of surrounding whitespace, without the
    /// terminating semicolon.
    pub text: String,
    /// Location of the statement in the original submission.
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Comparison operators and sort rules
// ---------------------------------------------------------------------------

/// Comparison operator used by assertions and rowcount verification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum CmpOp {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl CmpOp {
    /// Whether `lhs op rhs` holds. NaN on either side fails every operator,
    /// including `!=`, so an unparseable cell can never satisfy a bound.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        if lhs.is_nan() || rhs.is_nan() {
            return false;
        }
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Ge => lhs >= rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Lt => lhs < rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        })
    }
}

/// One row-ordering rule: sort by `column`, descending if flagged.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SortRule {
    pub column: String,
    pub descending: bool,
}

impl SortRule {
    /// Parse a rule of the form `"col"`, `"col ASC"` or `"col DESC"`
    /// (direction keyword case-insensitive), the format lesson documents use
    /// in their `order_by` arrays.
    #[must_use]
    pub fn parse(rule: &str) -> Self {
        let mut parts = rule.split_whitespace();
        let column = parts.next().unwrap_or("").to_owned();
        let descending = parts
            .next()
            .is_some_and(|dir| dir.eq_ignore_ascii_case("DESC"));
        Self { column, descending }
    }

    /// Parse a list of `order_by` strings into sort rules.
    #[must_use]
    pub fn parse_list(rules: &[String]) -> Vec<Self> {
        rules.iter().map(|r| Self::parse(r)).collect()
    }
}

// ---------------------------------------------------------------------------
// Assertions and expected answers
// ---------------------------------------------------------------------------

/// A declarative constraint on a result set, independent of exact-match
/// hashing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Assertion {
    /// The number of rows satisfies `op value`.
    Rowcount {
        #[serde(default)]
        op: CmpOp,
        value: f64,
    },
    /// Every row's value in `column`, coerced to a number, satisfies
    /// `op value`. A single failing row fails the whole assertion.
    Column {
        #[serde(alias = "name")]
        column: String,
        op: CmpOp,
        value: f64,
    },
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rowcount { op, value } => write!(f, "rowcount {op} {value}"),
            Self::Column { column, op, value } => write!(f, "column {column} {op} {value}"),
        }
    }
}

/// The authored reference answer for one lesson step or puzzle.
///
/// Immutable at runtime; read-only input to verification.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ExpectedAnswer {
    /// Canonical column order for hashing. When present, answer columns are
    /// rewarded for appearing where expected and extras are appended.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    /// Row-ordering rules as `"col [ASC|DESC]"` strings.
    #[serde(default)]
    pub order_by: Option<Vec<String>>,
    /// Reference digest of the canonicalized result set.
    #[serde(default)]
    pub resultset_hash: Option<String>,
    /// Declarative constraints checked alongside the digest.
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

impl ExpectedAnswer {
    /// Parsed sort rules from `order_by` (empty when unspecified, which
    /// means "sort by all columns ascending").
    #[must_use]
    pub fn sort_rules(&self) -> Vec<SortRule> {
        self.order_by
            .as_deref()
            .map(SortRule::parse_list)
            .unwrap_or_default()
    }
}
