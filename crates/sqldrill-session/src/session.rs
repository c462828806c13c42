//! Session controller: one learner working through one lesson.
//!
//! Holds the current step index and editor content, drives the execution
//! harness, and turns harness/verify output into verdicts. All engine and
//! asset-loading errors are converted to user-facing outcomes at this
//! boundary; nothing escapes a run/check attempt, and every failure leaves
//! the controller in a well-defined state ready for retry.

use serde::Serialize;
use tracing::{debug, info, warn};

use sqldrill_error::{DrillError, Result};
use sqldrill_types::lesson::{Course, Lesson, Step, VerifyRule};
use sqldrill_types::{Assertion, SortRule, Span};
use sqldrill_verify::{AssertionOutcome, digest, evaluate};

use crate::engine::QueryEngine;
use crate::harness::{ExecutionOutcome, run_all};

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

/// Position within the current lesson.
///
/// Owned by the session, mutated only by `advance`, reset whenever a new
/// lesson is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressionState {
    pub current_step: usize,
    pub total_steps: usize,
}

impl ProgressionState {
    const fn new(total_steps: usize) -> Self {
        Self {
            current_step: 0,
            total_steps,
        }
    }

    /// Whether the current step is the last one.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.current_step + 1 >= self.total_steps
    }

    /// Rounded completion percentage. `include_current` counts the step in
    /// progress as done (the progress bar bumps as soon as a step passes).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn percent_complete(&self, include_current: bool) -> u8 {
        if self.total_steps == 0 {
            return 100;
        }
        let done = (self.current_step + usize::from(include_current)).min(self.total_steps);
        ((done as f64 / self.total_steps as f64) * 100.0).round() as u8
    }
}

// ---------------------------------------------------------------------------
// States and reports
// ---------------------------------------------------------------------------

/// Session controller states.
///
/// `Passed`, `Failed`, and `Errored` are terminal for the step but still
/// allow re-running; `advance` moves on from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No lesson loaded.
    Idle,
    /// A step is loaded and awaiting a run/check.
    Ready,
    /// A run or check is in flight.
    Running,
    /// The last check matched the reference answer.
    Passed,
    /// The last check did not match.
    Failed,
    /// The last execution failed with an engine error.
    Errored,
    /// The learner advanced past the final step.
    Complete,
}

/// A failed execution, localized to the failing statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionFailure {
    /// Engine-native error message, verbatim.
    pub message: String,
    /// Source span of the failing statement, for editor highlighting.
    pub span: Span,
}

/// The outcome of a `check`, consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    /// Digest of the learner's canonicalized result, when a hash check ran.
    pub observed_digest: Option<String>,
    /// The step's reference digest, when it has one.
    pub expected_digest: Option<String>,
    /// Per-assertion outcomes, in authored order.
    pub assertions: Vec<AssertionOutcome>,
    /// Set when execution itself failed; the other fields then report a
    /// non-pass without any digest/assertion detail.
    pub failure: Option<ExecutionFailure>,
}

// ---------------------------------------------------------------------------
// Reference-answer resolution
// ---------------------------------------------------------------------------

/// A step's reference answer, merged from its `expected` and `verify`
/// blocks.
struct Reference {
    columns: Option<Vec<String>>,
    sort_rules: Vec<SortRule>,
    digest: Option<String>,
    assertions: Vec<Assertion>,
}

impl Reference {
    fn resolve(step: &Step) -> Self {
        let mut reference = match &step.expected {
            Some(expected) => Self {
                columns: expected.columns.clone(),
                sort_rules: expected.sort_rules(),
                digest: expected.resultset_hash.clone(),
                assertions: expected.assertions.clone(),
            },
            None => Self {
                columns: None,
                sort_rules: Vec::new(),
                digest: None,
                assertions: Vec::new(),
            },
        };
        match &step.verify {
            Some(VerifyRule::Rowcount { op, value }) => {
                reference.assertions.push(Assertion::Rowcount {
                    op: *op,
                    value: *value,
                });
            }
            Some(VerifyRule::ResultsetHash { value, order_by }) => {
                if reference.digest.is_none() {
                    reference.digest = Some(value.clone());
                }
                if reference.sort_rules.is_empty() {
                    if let Some(order_by) = order_by {
                        reference.sort_rules = SortRule::parse_list(order_by);
                    }
                }
            }
            None => {}
        }
        reference
    }

    /// A check needs at least one of: a reference digest, an assertion.
    const fn is_checkable(&self) -> bool {
        self.digest.is_some() || !self.assertions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One learner session over an owned engine handle.
///
/// Single logical thread of control: the engine is not safe for concurrent
/// invocation, and exclusive ownership plus `&mut self` methods make an
/// overlapping run/check unrepresentable rather than merely guarded.
pub struct Session<E: QueryEngine> {
    engine: E,
    lesson: Option<Lesson>,
    progression: ProgressionState,
    state: SessionState,
    editor: String,
    precision: u8,
}

impl<E: QueryEngine> Session<E> {
    /// Create an idle session around an engine handle.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            lesson: None,
            progression: ProgressionState::new(0),
            state: SessionState::Idle,
            editor: String::new(),
            precision: sqldrill_types::lesson::DEFAULT_NUMERIC_PRECISION,
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn progression(&self) -> ProgressionState {
        self.progression
    }

    /// Current editor content.
    pub fn input(&self) -> &str {
        &self.editor
    }

    /// Replace the editor content for the next run/check.
    pub fn set_input(&mut self, sql: impl Into<String>) {
        self.editor = sql.into();
    }

    /// The step the session is positioned on, if a lesson is loaded.
    pub fn current_step(&self) -> Option<&Step> {
        self.lesson
            .as_ref()
            .and_then(|lesson| lesson.steps.get(self.progression.current_step))
    }

    /// Parse a lesson document and load the lesson at `lesson_index`.
    ///
    /// Convenience wrapper over [`Session::load_lesson`]; a malformed
    /// document is a [`DrillError::ResourceLoad`].
    pub fn load_lesson_json(
        &mut self,
        document: &str,
        lesson_index: usize,
        dataset: &[u8],
    ) -> Result<()> {
        let course: Course = serde_json::from_str(document)
            .map_err(|err| DrillError::resource("lesson document", err.to_string()))?;
        self.load_lesson(&course, lesson_index, dataset)
    }

    /// Load one lesson: reset progression, load its dataset into the engine
    /// (replacing any previous dataset), seed the editor with the first
    /// step's starter query, and move to `Ready`.
    ///
    /// Fully resets the pipeline; no state crosses lesson loads.
    pub fn load_lesson(
        &mut self,
        course: &Course,
        lesson_index: usize,
        dataset: &[u8],
    ) -> Result<()> {
        let lesson = course.lessons.get(lesson_index).ok_or_else(|| {
            DrillError::resource("lesson", format!("no lesson at index {lesson_index}"))
        })?;
        self.engine
            .load_dataset(dataset)
            .map_err(|err| DrillError::resource("dataset", err.to_string()))?;

        self.precision = course.numeric_precision;
        self.progression = ProgressionState::new(lesson.steps.len());
        if let Some(first) = lesson.steps.first() {
            self.editor = first.starter_sql.clone();
            self.state = SessionState::Ready;
        } else {
            self.editor.clear();
            self.state = SessionState::Complete;
        }
        info!(
            lesson = %lesson.title,
            steps = lesson.steps.len(),
            dataset = %lesson.dataset,
            "lesson loaded"
        );
        self.lesson = Some(lesson.clone());
        Ok(())
    }

    /// Execute the editor content and surface the raw result.
    ///
    /// Moves through `Running` and settles in `Ready` on success or
    /// `Errored` on an engine failure; the outcome carries the failing
    /// statement's span in the latter case. Never retries automatically.
    pub fn run(&mut self) -> Result<ExecutionOutcome> {
        self.current_step_checked()?;
        self.state = SessionState::Running;
        let outcome = run_all(&self.editor, &mut self.engine);
        self.state = if outcome.is_success() {
            SessionState::Ready
        } else {
            SessionState::Errored
        };
        Ok(outcome)
    }

    /// Execute the editor content and judge it against the current step's
    /// reference answer.
    ///
    /// Passes only when the digest matches (if the step has one) **and**
    /// every assertion holds. A step with neither digest nor assertions is
    /// broken content and yields [`DrillError::MissingReferenceAnswer`],
    /// reported distinctly from a wrong answer.
    pub fn check(&mut self) -> Result<Verdict> {
        let step_index = self.progression.current_step;
        let reference = Reference::resolve(self.current_step_checked()?);
        if !reference.is_checkable() {
            return Err(DrillError::MissingReferenceAnswer { step: step_index });
        }

        self.state = SessionState::Running;
        let result = match run_all(&self.editor, &mut self.engine) {
            ExecutionOutcome::Success { result } => result,
            ExecutionOutcome::Failure { message, statement } => {
                self.state = SessionState::Errored;
                return Ok(Verdict {
                    passed: false,
                    observed_digest: None,
                    expected_digest: reference.digest,
                    assertions: Vec::new(),
                    failure: Some(ExecutionFailure {
                        message,
                        span: statement.span,
                    }),
                });
            }
        };

        let (digest_matches, observed_digest) = match &reference.digest {
            Some(expected) => {
                if reference.columns.is_none() {
                    // Content-authoring hazard: extra learner columns are
                    // hashed verbatim when no expected order is given.
                    warn!(step = step_index, "hash check without an expected column list");
                }
                let observed = digest(
                    &result,
                    reference.columns.as_deref(),
                    &reference.sort_rules,
                    self.precision,
                );
                (observed == *expected, Some(observed))
            }
            None => (true, None),
        };

        let report = evaluate(&result, &reference.assertions);
        let passed = digest_matches && report.passed;
        self.state = if passed {
            SessionState::Passed
        } else {
            SessionState::Failed
        };
        debug!(step = step_index, passed, "check complete");

        Ok(Verdict {
            passed,
            observed_digest,
            expected_digest: reference.digest,
            assertions: report.outcomes,
            failure: None,
        })
    }

    /// Move to the next step, or to `Complete` from the last one.
    ///
    /// Allowed from any state; seeds the editor with the next step's
    /// starter query. A no-op while idle.
    pub fn advance(&mut self) -> SessionState {
        let Some(lesson) = &self.lesson else {
            return self.state;
        };
        if self.progression.is_last() {
            self.state = SessionState::Complete;
            info!("lesson complete");
        } else {
            self.progression.current_step += 1;
            self.editor = lesson.steps[self.progression.current_step]
                .starter_sql
                .clone();
            self.state = SessionState::Ready;
        }
        self.state
    }

    /// Release the engine's dataset memory and return to `Idle`.
    pub fn release(&mut self) {
        self.engine.release();
        self.lesson = None;
        self.progression = ProgressionState::new(0);
        self.editor.clear();
        self.state = SessionState::Idle;
    }

    fn current_step_checked(&self) -> Result<&Step> {
        if self.state == SessionState::Complete {
            return Err(DrillError::invalid_state("lesson already complete"));
        }
        let lesson = self
            .lesson
            .as_ref()
            .ok_or_else(|| DrillError::invalid_state("no lesson loaded"))?;
        lesson
            .steps
            .get(self.progression.current_step)
            .ok_or_else(|| DrillError::invalid_state("step index out of range"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sqldrill_types::{ResultSet, Value};

    use super::*;

    /// Engine stub backed by a fixed SQL -> result table.
    #[derive(Default)]
    struct TableEngine {
        loaded: bool,
        responses: HashMap<String, ResultSet>,
    }

    impl TableEngine {
        fn with_response(mut self, sql: &str, rs: ResultSet) -> Self {
            self.responses.insert(sql.to_owned(), rs);
            self
        }
    }

    impl QueryEngine for TableEngine {
        fn load_dataset(&mut self, bytes: &[u8]) -> Result<()> {
            if bytes.is_empty() {
                return Err(DrillError::resource("dataset", "empty image"));
            }
            self.loaded = true;
            Ok(())
        }

        fn execute(&mut self, sql: &str) -> Result<ResultSet> {
            if !self.loaded {
                return Err(DrillError::DatasetNotLoaded);
            }
            self.responses
                .get(sql)
                .cloned()
                .ok_or_else(|| DrillError::engine(format!("no such table: {sql}")))
        }

        fn release(&mut self) {
            self.loaded = false;
        }
    }

    const DOC: &str = r#"{
        "numeric_precision": 4,
        "lessons": [{
            "title": "Basics",
            "dataset": "retail.sqlite",
            "steps": [
                {
                    "starter_sql": "SELECT 1",
                    "goal": "warm up",
                    "verify": { "type": "rowcount", "op": "=", "value": 1 }
                },
                {
                    "starter_sql": "",
                    "goal": "no reference authored"
                }
            ]
        }]
    }"#;

    fn one_row() -> ResultSet {
        ResultSet::from_rows(&["x"], vec![vec![Value::from(1_i64)]])
    }

    fn loaded_session() -> Session<TableEngine> {
        let engine = TableEngine::default().with_response("SELECT 1", one_row());
        let mut session = Session::new(engine);
        session.load_lesson_json(DOC, 0, b"image").unwrap();
        session
    }

    #[test]
    fn load_moves_to_ready_and_seeds_editor() {
        let session = loaded_session();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.input(), "SELECT 1");
        assert_eq!(session.progression().total_steps, 2);
    }

    #[test]
    fn malformed_document_is_a_resource_error() {
        let mut session = Session::new(TableEngine::default());
        let err = session.load_lesson_json("{not json", 0, b"x").unwrap_err();
        assert!(matches!(err, DrillError::ResourceLoad { .. }));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn dataset_failure_is_a_resource_error() {
        let mut session = Session::new(TableEngine::default());
        let err = session.load_lesson_json(DOC, 0, b"").unwrap_err();
        assert!(matches!(err, DrillError::ResourceLoad { .. }));
    }

    #[test]
    fn run_success_returns_to_ready() {
        let mut session = loaded_session();
        let outcome = session.run().unwrap();
        assert!(outcome.is_success());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn run_failure_moves_to_errored_with_span() {
        let mut session = loaded_session();
        session.set_input("SELECT 1; SELECT nope");
        let outcome = session.run().unwrap();
        match outcome {
            ExecutionOutcome::Failure { statement, .. } => {
                assert_eq!(statement.text, "SELECT nope");
                assert_eq!(statement.span.start, 10);
            }
            ExecutionOutcome::Success { .. } => panic!("expected failure"),
        }
        assert_eq!(session.state(), SessionState::Errored);
        // Still re-runnable after editing.
        session.set_input("SELECT 1");
        assert!(session.run().unwrap().is_success());
    }

    #[test]
    fn check_passes_rowcount_verify() {
        let mut session = loaded_session();
        let verdict = session.check().unwrap();
        assert!(verdict.passed);
        assert!(verdict.failure.is_none());
        assert!(verdict.observed_digest.is_none());
        assert_eq!(verdict.assertions.len(), 1);
        assert_eq!(session.state(), SessionState::Passed);
    }

    #[test]
    fn check_wrong_answer_moves_to_failed() {
        let empty = ResultSet::from_rows(&["x"], Vec::<Vec<Value>>::new());
        let engine = TableEngine::default().with_response("SELECT 1", empty);
        let mut session = Session::new(engine);
        session.load_lesson_json(DOC, 0, b"image").unwrap();
        let verdict = session.check().unwrap();
        assert!(!verdict.passed);
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn check_execution_failure_carries_span_in_verdict() {
        let mut session = loaded_session();
        session.set_input("SELECT nope");
        let verdict = session.check().unwrap();
        assert!(!verdict.passed);
        let failure = verdict.failure.expect("execution failure");
        assert_eq!(failure.message, "no such table: SELECT nope");
        assert_eq!(failure.span, Span::new(0, 11));
        assert_eq!(session.state(), SessionState::Errored);
    }

    #[test]
    fn missing_reference_is_distinct_from_wrong_answer() {
        let mut session = loaded_session();
        session.advance();
        session.set_input("SELECT 1");
        let err = session.check().unwrap_err();
        assert!(matches!(
            err,
            DrillError::MissingReferenceAnswer { step: 1 }
        ));
        // The controller is still in a usable state.
        assert!(session.run().unwrap().is_success());
    }

    #[test]
    fn advance_walks_to_complete() {
        let mut session = loaded_session();
        assert_eq!(session.advance(), SessionState::Ready);
        assert_eq!(session.progression().current_step, 1);
        assert_eq!(session.advance(), SessionState::Complete);
        assert!(session.run().is_err());
        assert!(session.check().is_err());
    }

    #[test]
    fn advance_without_lesson_is_a_noop() {
        let mut session = Session::new(TableEngine::default());
        assert_eq!(session.advance(), SessionState::Idle);
    }

    #[test]
    fn release_returns_to_idle() {
        let mut session = loaded_session();
        session.release();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.current_step().is_none());
    }

    #[test]
    fn percent_complete_rounds() {
        let p = ProgressionState {
            current_step: 1,
            total_steps: 3,
        };
        assert_eq!(p.percent_complete(false), 33);
        assert_eq!(p.percent_complete(true), 67);
        let done = ProgressionState {
            current_step: 2,
            total_steps: 3,
        };
        assert_eq!(done.percent_complete(true), 100);
    }
}
