//! Multi-statement execution harness.
//!
//! Splits a learner submission into statements and feeds them to the engine
//! in order, stopping at the first failure and reporting the failing
//! statement's source span for in-editor marking.

use tracing::debug;

use sqldrill_types::{ResultSet, Statement};
use sqldrill_verify::split;

use crate::engine::QueryEngine;

/// Outcome of executing one submission.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum ExecutionOutcome {
    /// Every statement succeeded; `result` is the result set of the **last**
    /// statement (earlier statements are typically DDL/setup). Zero
    /// statements yield an empty result.
    Success { result: ResultSet },
    /// A statement failed. Statements after it were never attempted.
    Failure {
        /// Engine-native error message, verbatim.
        message: String,
        /// The statement that failed, with its source span.
        statement: Statement,
    },
}

impl ExecutionOutcome {
    /// Whether execution ran to completion.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Execute every statement in `source` sequentially.
///
/// Sequential semantics, not best-effort: the first engine-level error stops
/// the run immediately. The harness imposes no timeout and offers no
/// mid-execution cancellation; a long-running statement runs to completion
/// or to the engine's own error.
pub fn run_all<E: QueryEngine + ?Sized>(source: &str, engine: &mut E) -> ExecutionOutcome {
    let statements = split(source);
    debug!(statements = statements.len(), "executing submission");

    let mut last = ResultSet::empty();
    for statement in statements {
        match engine.execute(&statement.text) {
            Ok(result) => last = result,
            Err(err) => {
                let message = err.to_string();
                debug!(
                    start = statement.span.start,
                    end = statement.span.end,
                    %message,
                    "statement failed, aborting run"
                );
                return ExecutionOutcome::Failure { message, statement };
            }
        }
    }
    ExecutionOutcome::Success { result: last }
}

#[cfg(test)]
mod tests {
    use sqldrill_error::DrillError;
    use sqldrill_types::Value;

    use super::*;

    /// Scripted engine: records every statement it sees and fails on any
    /// statement containing the marker `BOOM`.
    #[derive(Default)]
    struct ScriptedEngine {
        executed: Vec<String>,
    }

    impl QueryEngine for ScriptedEngine {
        fn load_dataset(&mut self, _bytes: &[u8]) -> sqldrill_error::Result<()> {
            Ok(())
        }

        fn execute(&mut self, sql: &str) -> sqldrill_error::Result<ResultSet> {
            self.executed.push(sql.to_owned());
            if sql.contains("BOOM") {
                return Err(DrillError::engine("near \"BOOM\": syntax error"));
            }
            Ok(ResultSet::from_rows(
                &["echo"],
                vec![vec![Value::from(sql)]],
            ))
        }

        fn release(&mut self) {}
    }

    #[test]
    fn returns_last_statement_result() {
        let mut engine = ScriptedEngine::default();
        let outcome = run_all("SELECT 1; SELECT 2; SELECT 3;", &mut engine);
        match outcome {
            ExecutionOutcome::Success { result } => {
                assert_eq!(
                    ResultSet::cell(&result.rows[0], "echo"),
                    &Value::from("SELECT 3")
                );
            }
            ExecutionOutcome::Failure { .. } => panic!("expected success"),
        }
        assert_eq!(engine.executed.len(), 3);
    }

    #[test]
    fn short_circuits_on_first_failure() {
        let mut engine = ScriptedEngine::default();
        let src = "SELECT 1; SELECT BOOM; SELECT 3;";
        let outcome = run_all(src, &mut engine);
        match outcome {
            ExecutionOutcome::Failure { message, statement } => {
                assert_eq!(message, "near \"BOOM\": syntax error");
                assert_eq!(statement.text, "SELECT BOOM");
                // The span points at the second statement in the source.
                assert_eq!(&src[statement.span.start..statement.span.end], "SELECT BOOM");
            }
            ExecutionOutcome::Success { .. } => panic!("expected failure"),
        }
        // The third statement was never attempted.
        assert_eq!(engine.executed, vec!["SELECT 1", "SELECT BOOM"]);
    }

    #[test]
    fn zero_statements_succeed_with_empty_result() {
        let mut engine = ScriptedEngine::default();
        let outcome = run_all("   \n  ", &mut engine);
        assert_eq!(
            outcome,
            ExecutionOutcome::Success {
                result: ResultSet::empty()
            }
        );
        assert!(engine.executed.is_empty());
    }
}
