//! Lesson/puzzle definition document.
//!
//! Consumed, never produced, by this core. The same schema serves both the
//! guided-lesson page (`lessons` of `steps`) and the puzzle page (`weeks` of
//! `puzzles`); serde aliases accept either spelling.

use crate::{CmpOp, ExpectedAnswer};

/// Default numeric precision (decimal places) for canonicalization.
pub const DEFAULT_NUMERIC_PRECISION: u8 = 4;

const fn default_precision() -> u8 {
    DEFAULT_NUMERIC_PRECISION
}

/// Root of a lesson/puzzle document.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Course {
    /// Decimal places kept when normalizing numeric cells.
    #[serde(default = "default_precision")]
    pub numeric_precision: u8,
    /// Ordered lessons (or puzzle weeks).
    #[serde(alias = "weeks", default)]
    pub lessons: Vec<Lesson>,
}

/// One lesson (or puzzle week): a titled sequence of steps over one dataset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Lesson {
    pub title: String,
    /// Dataset filename loaded into the engine for every step.
    pub dataset: String,
    #[serde(alias = "puzzles", default)]
    pub steps: Vec<Step>,
}

/// One lesson step or puzzle.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Step {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Query text seeded into the editor when the step is shown.
    #[serde(default)]
    pub starter_sql: String,
    /// What the learner is asked to produce.
    #[serde(default)]
    pub goal: String,
    /// Simple verification rule (older document style).
    #[serde(default)]
    pub verify: Option<VerifyRule>,
    /// Full reference answer (columns, ordering, digest, assertions).
    #[serde(default)]
    pub expected: Option<ExpectedAnswer>,
}

/// The compact `verify` block: either a rowcount bound or an expected
/// result-set digest with optional ordering.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerifyRule {
    Rowcount {
        #[serde(default)]
        op: CmpOp,
        value: f64,
    },
    ResultsetHash {
        /// The `sha256:`-prefixed reference digest.
        value: String,
        #[serde(default)]
        order_by: Option<Vec<String>>,
    },
}
