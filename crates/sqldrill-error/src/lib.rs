use thiserror::Error;

/// Primary error type for sqldrill operations.
///
/// Structured variants for the failure modes of the verification core.
/// Every variant is scoped to one run/check attempt; nothing here is fatal
/// to the process, and the session controller converts each of these into a
/// user-visible message while staying ready for retry.
#[derive(Error, Debug)]
pub enum DrillError {
    /// The embedded query engine rejected a statement.
    ///
    /// The message is surfaced verbatim from the engine so the learner sees
    /// the engine's own diagnostics (syntax errors, missing tables,
    /// constraint violations).
    #[error("{message}")]
    Engine { message: String },

    /// No dataset has been loaded into the engine handle.
    #[error("no dataset loaded")]
    DatasetNotLoaded,

    /// A dataset or lesson definition could not be obtained or decoded.
    #[error("failed to load {what}: {detail}")]
    ResourceLoad { what: String, detail: String },

    /// A lesson/puzzle step has no reference digest and no assertions, so
    /// "check" cannot produce a verdict.
    ///
    /// Reported distinctly from a wrong answer: the content is broken, not
    /// the learner's query.
    #[error("step {step} has no reference answer to check against")]
    MissingReferenceAnswer { step: usize },

    /// An operation was invoked in a state that does not permit it
    /// (e.g. `run` before any lesson is loaded).
    #[error("invalid session state: {detail}")]
    InvalidState { detail: String },
}

impl DrillError {
    /// Create an engine execution error from an engine-native message.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Create a resource-load error.
    pub fn resource(what: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ResourceLoad {
            what: what.into(),
            detail: detail.into(),
        }
    }

    /// Create an invalid-state error.
    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::InvalidState {
            detail: detail.into(),
        }
    }

    /// Whether the learner can likely fix this by editing and re-running.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(self, Self::Engine { .. } | Self::DatasetNotLoaded)
    }

    /// Whether this error indicates broken lesson content rather than a
    /// learner mistake.
    pub const fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::MissingReferenceAnswer { .. } | Self::ResourceLoad { .. }
        )
    }
}

/// Result type alias using `DrillError`.
pub type Result<T> = std::result::Result<T, DrillError>;
