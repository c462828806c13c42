//! Declarative assertion evaluation.
//!
//! Assertions constrain a result set independently of exact-match hashing:
//! a rowcount bound, or a per-row bound on one column. The report carries a
//! serializable outcome per assertion for the presentation layer.

use serde::Serialize;
use sqldrill_types::{Assertion, ResultSet};

/// Outcome of one assertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionOutcome {
    /// Human-readable form of the assertion, e.g. `"column price >= 0"`.
    pub description: String,
    pub passed: bool,
    /// The observed value that decided the outcome: the row count for
    /// rowcount assertions, the first violating cell for failed column
    /// assertions.
    pub observed: Option<f64>,
}

/// Report over an ordered assertion list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionReport {
    /// Logical AND of every individual assertion; an empty list passes.
    pub passed: bool,
    pub outcomes: Vec<AssertionOutcome>,
}

/// Evaluate every assertion against a result set.
///
/// A column assertion passes only when **every** row's value in the column,
/// coerced to a number, satisfies the bound; a single failing row fails the
/// assertion. NULL coerces to 0 and unparseable text to NaN, which fails
/// every operator.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate(rs: &ResultSet, assertions: &[Assertion]) -> AssertionReport {
    let outcomes: Vec<AssertionOutcome> = assertions
        .iter()
        .map(|assertion| {
            let (passed, observed) = match assertion {
                Assertion::Rowcount { op, value } => {
                    let count = rs.rows.len() as f64;
                    (op.holds(count, *value), Some(count))
                }
                Assertion::Column { column, op, value } => {
                    let violation = rs
                        .rows
                        .iter()
                        .map(|row| ResultSet::cell(row, column).to_number())
                        .find(|cell| !op.holds(*cell, *value));
                    (violation.is_none(), violation)
                }
            };
            AssertionOutcome {
                description: assertion.to_string(),
                passed,
                observed,
            }
        })
        .collect();

    AssertionReport {
        passed: outcomes.iter().all(|o| o.passed),
        outcomes,
    }
}
