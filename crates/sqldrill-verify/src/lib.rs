//! Verification core for sqldrill.
//!
//! Pure, synchronous building blocks with no engine dependency:
//!
//! - [`split`] — quote-aware statement splitting with source spans.
//! - [`canonicalize`] — deterministic normalization of a result set
//!   (column order, value rounding, row sort).
//! - [`digest`] — SHA-256 fingerprint of the canonical form; the sole
//!   equality test for "is this the correct answer".
//! - [`evaluate`] — declarative assertion checking with per-assertion
//!   outcomes.
//!
//! Two result sets that represent the same logical answer produce the same
//! digest regardless of the engine's native row order, incidental column
//! order, or floating-point representation noise.

pub mod assertions;
pub mod canon;
pub mod digest;
pub mod split;

pub use assertions::{AssertionOutcome, AssertionReport, evaluate};
pub use canon::canonicalize;
pub use digest::{DIGEST_PREFIX, digest};
pub use split::split;
