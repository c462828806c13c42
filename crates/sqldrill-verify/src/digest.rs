//! Canonical digest production.
//!
//! Serializes a canonicalized result set as CSV and fingerprints it with
//! SHA-256. Digest equality is the answer-correctness test; there is no
//! structural row/column diff anywhere in the pipeline.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use sqldrill_types::{ResultSet, SortRule};

use crate::canon::canonicalize;

/// Prefix carried by every reference and observed digest.
pub const DIGEST_PREFIX: &str = "sha256:";

/// Canonicalize and fingerprint a result set.
///
/// The serialized form is a header line of comma-joined column names
/// followed by one line per row of comma-joined normalized values, with
/// standard CSV quoting (fields containing a comma, double quote, or
/// newline are wrapped in double quotes, internal quotes doubled) and lines
/// joined by a single `\n`. The digest is the lowercase-hex SHA-256 of the
/// UTF-8 bytes of that text, prefixed with `"sha256:"`.
///
/// Identical canonical content always yields an identical digest.
#[must_use]
pub fn digest(
    rs: &ResultSet,
    expected_columns: Option<&[String]>,
    sort_rules: &[SortRule],
    precision: u8,
) -> String {
    let canon = canonicalize(rs, expected_columns, sort_rules, precision);
    let csv = to_csv(&canon);
    format!("{DIGEST_PREFIX}{}", sha256_hex(csv.as_bytes()))
}

/// Serialize a (canonical) result set as CSV text.
fn to_csv(rs: &ResultSet) -> String {
    let mut lines = Vec::with_capacity(rs.rows.len() + 1);
    lines.push(join_fields(rs.columns.iter().map(String::as_str)));
    for row in &rs.rows {
        let cells: Vec<String> = rs
            .columns
            .iter()
            .map(|col| ResultSet::cell(row, col).to_string())
            .collect();
        lines.push(join_fields(cells.iter().map(String::as_str)));
    }
    lines.join("\n")
}

fn join_fields<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_field(field: &str) -> String {
    if field.contains(['"', ',', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// Compute a lowercase-hex SHA-256 digest.
fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut hex = String::with_capacity(64);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
