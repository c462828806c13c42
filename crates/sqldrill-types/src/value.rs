use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A dynamically-typed cell value from a query result.
///
/// The embedded engine does not enforce column typing, so a single column
/// may carry heterogeneously-typed values across rows. Everything downstream
/// (canonicalization, sorting, assertions) must tolerate that.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL (or an absent cell).
    Null,
    /// A numeric value. Engines report both integers and reals here and the
    /// representation may carry floating-point imprecision.
    Number(f64),
    /// A text value.
    Text(String),
}

impl Value {
    /// Returns true if this is a NULL value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to extract a numeric value without coercion.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to extract a text reference without coercion.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce to a number for assertion bounds.
    ///
    /// - NULL -> 0.0
    /// - Number -> itself
    /// - Text -> parsed, NaN on failure (NaN fails every comparison)
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }

    /// Natural ordering used for row sorting: numeric comparison when both
    /// sides are numbers, lexicographic on the display forms otherwise.
    ///
    /// NaN compares via `f64::total_cmp` so the order is deterministic.
    pub fn compare_natural(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    /// Display form used in canonical CSV serialization: NULL is the empty
    /// string, numbers use Rust's shortest round-trip formatting (`10`, not
    /// `10.0000`), text is verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One result row: a mapping from column name to value.
pub type Row = BTreeMap<String, Value>;

/// An in-memory query result.
///
/// Produced fresh by every execution and never mutated afterwards; the
/// canonicalizer builds a new normalized copy instead of editing in place.
/// A column name absent from a row's mapping reads as [`Value::Null`].
#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ResultSet {
    /// Ordered, unique column names as reported by the engine.
    pub columns: Vec<String>,
    /// Ordered result rows.
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// An empty result (no columns, no rows), the outcome of executing zero
    /// statements.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result set from positional rows, pairing each cell with the
    /// column at the same index. Cells beyond the column list are dropped.
    #[must_use]
    pub fn from_rows<V: Into<Value>>(columns: &[&str], rows: Vec<Vec<V>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| (*c).to_owned()).collect();
        let rows = rows
            .into_iter()
            .map(|cells| {
                columns
                    .iter()
                    .zip(cells)
                    .map(|(c, v)| (c.clone(), v.into()))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Read a cell, treating absent columns as NULL.
    #[must_use]
    pub fn cell<'a>(row: &'a Row, column: &str) -> &'a Value {
        row.get(column).unwrap_or(&Value::Null)
    }
}
