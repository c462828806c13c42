//! Execution harness and session controller for sqldrill.
//!
//! This crate owns everything stateful: the engine capability trait, the
//! sequential multi-statement harness, and the per-learner session state
//! machine that turns executions into verdicts. The pure verification
//! pieces live in `sqldrill-verify`.

pub mod engine;
pub mod harness;
pub mod session;

pub use engine::QueryEngine;
pub use harness::{ExecutionOutcome, run_all};
pub use session::{
    ExecutionFailure, ProgressionState, Session, SessionState, Verdict,
};
