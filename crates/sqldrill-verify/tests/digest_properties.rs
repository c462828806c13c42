//! Property tests for digest determinism.
//!
//! The digest is the sole answer-equality test, so its invariance under
//! incidental differences (row order, column order, float noise) is the
//! load-bearing guarantee of the whole verification core.

use proptest::prelude::*;

use sqldrill_types::{ResultSet, Value};
use sqldrill_verify::digest;

fn result_set(columns: &[&str], rows: &[(i64, f64, String)]) -> ResultSet {
    ResultSet::from_rows(
        columns,
        rows.iter()
            .map(|(id, total, name)| {
                vec![
                    Value::from(*id),
                    Value::Number(*total),
                    Value::from(name.clone()),
                ]
            })
            .collect(),
    )
}

fn row_strategy() -> impl Strategy<Value = (i64, f64, String)> {
    (
        -1000_i64..1000,
        (-10_000_i64..10_000).prop_map(|n| n as f64 / 100.0),
        "[a-z]{0,8}",
    )
}

proptest! {
    #[test]
    fn digest_ignores_row_order(
        (rows, shuffled) in prop::collection::vec(row_strategy(), 0..12)
            .prop_flat_map(|rows| {
                let original = rows.clone();
                (Just(original), Just(rows).prop_shuffle())
            })
    ) {
        let a = result_set(&["id", "total", "name"], &rows);
        let b = result_set(&["id", "total", "name"], &shuffled);
        prop_assert_eq!(
            digest(&a, None, &[], 4),
            digest(&b, None, &[], 4)
        );
    }

    #[test]
    fn digest_ignores_column_order_given_expectation(
        rows in prop::collection::vec(row_strategy(), 0..12)
    ) {
        let expected: Vec<String> =
            ["id", "total", "name"].iter().map(|s| (*s).to_string()).collect();
        let a = result_set(&["id", "total", "name"], &rows);
        let mut b = ResultSet {
            columns: vec!["name".into(), "id".into(), "total".into()],
            rows: a.rows.clone(),
        };
        // Rows are name->value mappings, so only the column list differs.
        b.rows.reverse();
        prop_assert_eq!(
            digest(&a, Some(&expected), &[], 4),
            digest(&b, Some(&expected), &[], 4)
        );
    }

    #[test]
    fn digest_ignores_sub_precision_noise(
        rows in prop::collection::vec(row_strategy(), 1..8),
        noise in -40_i32..40
    ) {
        let a = result_set(&["id", "total", "name"], &rows);
        // Perturb every total by well under half of the precision-4 step.
        let nudged: Vec<(i64, f64, String)> = rows
            .iter()
            .map(|(id, total, name)| {
                (*id, total + f64::from(noise) * 1e-9, name.clone())
            })
            .collect();
        let b = result_set(&["id", "total", "name"], &nudged);
        prop_assert_eq!(
            digest(&a, None, &[], 4),
            digest(&b, None, &[], 4)
        );
    }
}
