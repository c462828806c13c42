//! Result-set canonicalization.
//!
//! Produces one deterministic normalized representation of a result set,
//! independent of the engine's native row order, incidental column order,
//! and floating-point representation noise. Two semantically identical
//! result sets canonicalize to equal values, which is what makes digest
//! comparison a sound equality test.

use std::cmp::Ordering;

use sqldrill_types::{ResultSet, Row, SortRule, Value};

/// Canonicalize a result set into a new normalized copy.
///
/// Steps, in order:
///
/// 1. **Column ordering.** With `expected_columns`, output columns are the
///    expected names that actually occur in `rs.columns` (in expected
///    order), followed by any remaining columns in their original order.
///    This tolerates extra or reordered learner columns while still
///    rewarding answer columns appearing where expected. Without
///    `expected_columns`, the input order is kept.
/// 2. **Value normalization**, per cell: NULL or absent becomes empty text;
///    numbers are rounded to `precision` decimal places; text is trimmed.
///    Rounding multiplies by `10^precision`, rounds half **away from zero**
///    (`f64::round`), and divides back down. The tie-break is observable in
///    digests, so it is fixed here rather than left to the platform.
/// 3. **Row sorting.** Non-empty `sort_rules` compare rule by rule (numeric
///    when both cells are numbers, lexicographic otherwise; `descending`
///    reverses); ties keep their relative order (stable sort). Empty
///    `sort_rules` sort by every output column ascending, which makes row
///    order deterministic even when the assignment prescribes none.
///
/// The input is never mutated, and the operation is idempotent: feeding the
/// output back in at the same precision yields an identical result set.
#[must_use]
pub fn canonicalize(
    rs: &ResultSet,
    expected_columns: Option<&[String]>,
    sort_rules: &[SortRule],
    precision: u8,
) -> ResultSet {
    let columns = order_columns(&rs.columns, expected_columns);

    let mut rows: Vec<Row> = rs
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| {
                    let cell = normalize_value(ResultSet::cell(row, col), precision);
                    (col.clone(), cell)
                })
                .collect()
        })
        .collect();

    if sort_rules.is_empty() {
        rows.sort_by(|a, b| compare_all_columns(a, b, &columns));
    } else {
        rows.sort_by(|a, b| compare_by_rules(a, b, sort_rules));
    }

    ResultSet { columns, rows }
}

/// Expected names that occur in `columns` first, remaining `columns` after,
/// both in stable order.
fn order_columns(columns: &[String], expected: Option<&[String]>) -> Vec<String> {
    let Some(expected) = expected else {
        return columns.to_vec();
    };
    let mut ordered: Vec<String> = expected
        .iter()
        .filter(|name| columns.contains(name))
        .cloned()
        .collect();
    for name in columns {
        if !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }
    ordered
}

fn normalize_value(value: &Value, precision: u8) -> Value {
    match value {
        Value::Null => Value::Text(String::new()),
        Value::Number(n) => Value::Number(round_to(*n, precision)),
        Value::Text(s) => Value::Text(s.trim().to_owned()),
    }
}

fn round_to(n: f64, precision: u8) -> f64 {
    let factor = 10_f64.powi(i32::from(precision));
    let rounded = (n * factor).round() / factor;
    // Fold negative zero into zero; "-0" and "0" must not hash differently.
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn compare_by_rules(a: &Row, b: &Row, rules: &[SortRule]) -> Ordering {
    for rule in rules {
        let av = ResultSet::cell(a, &rule.column);
        let bv = ResultSet::cell(b, &rule.column);
        let ord = av.compare_natural(bv);
        if ord != Ordering::Equal {
            return if rule.descending { ord.reverse() } else { ord };
        }
    }
    Ordering::Equal
}

fn compare_all_columns(a: &Row, b: &Row, columns: &[String]) -> Ordering {
    for col in columns {
        let ord = ResultSet::cell(a, col).compare_natural(ResultSet::cell(b, col));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
