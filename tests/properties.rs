use std::collections::BTreeSet;

use panda_explorer::data::export::to_csv_bytes;
use panda_explorer::data::missing::drop_missing;
use panda_explorer::{
    analyze, apply_filters, inspect, load_bytes, AnalysisResult, CellValue, Column,
    ExplorerConfig, FileFormat, FilterSpec, Table,
};
use proptest::prelude::*;

const WORDS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn cell_int() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        1 => Just(CellValue::Null),
        6 => (-50i64..50).prop_map(CellValue::Integer),
    ]
}

fn cell_float() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        1 => Just(CellValue::Null),
        6 => (-1.0e6f64..1.0e6).prop_map(CellValue::Float),
    ]
}

fn cell_text() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        1 => Just(CellValue::Null),
        6 => prop::sample::select(WORDS.to_vec()).prop_map(|w| CellValue::String(w.to_string())),
    ]
}

/// Tables with an integer, a float and a text column, gaps included.
fn table() -> impl Strategy<Value = Table> {
    (0usize..25).prop_flat_map(|n| {
        (
            prop::collection::vec(cell_int(), n),
            prop::collection::vec(cell_float(), n),
            prop::collection::vec(cell_text(), n),
        )
            .prop_map(|(i, f, t)| {
                Table::new(vec![Column::new("n", i), Column::new("f", f), Column::new("t", t)])
                    .unwrap()
            })
    })
}

fn filters() -> impl Strategy<Value = Vec<FilterSpec>> {
    (
        -60.0f64..60.0,
        0.0f64..80.0,
        prop::collection::btree_set(prop::sample::select(WORDS.to_vec()), 0..4),
    )
        .prop_map(|(low, span, words)| {
            let allowed: BTreeSet<CellValue> =
                words.into_iter().map(|w| CellValue::String(w.to_string())).collect();
            vec![
                FilterSpec::Range {
                    column: "n".into(),
                    low,
                    high: low + span,
                },
                FilterSpec::Categorical {
                    column: "t".into(),
                    allowed,
                },
            ]
        })
}

fn all_columns() -> Vec<String> {
    vec!["n".into(), "f".into(), "t".into()]
}

proptest! {
    #[test]
    fn filters_are_a_conjunction(table in table(), filters in filters()) {
        let view = apply_filters(&table, &all_columns(), &filters).unwrap();
        let kept: BTreeSet<usize> = view.rows.iter().copied().collect();
        for r in 0..table.row_count() {
            let passes = filters.iter().all(|f| {
                let col = table.column(f.column()).unwrap();
                f.matches(&col.values()[r])
            });
            prop_assert_eq!(passes, kept.contains(&r));
        }
        prop_assert_eq!(view.table.row_count(), view.rows.len());
        prop_assert!(view.rows.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn dropping_missing_is_idempotent(table in table()) {
        let once = drop_missing(&table);
        let twice = drop_missing(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn schema_is_deterministic(table in table()) {
        prop_assert_eq!(inspect(&table), inspect(&table));
    }

    #[test]
    fn correlation_is_symmetric(table in table()) {
        let cols = vec!["n".to_string(), "f".to_string()];
        let result = analyze(&table, &cols, &ExplorerConfig::default()).unwrap();
        let Some(AnalysisResult::Correlation(m)) = result else {
            return Err(TestCaseError::fail("expected a correlation matrix"));
        };
        for i in 0..2 {
            prop_assert_eq!(m.values[i][i], 1.0);
            for j in 0..2 {
                prop_assert_eq!(m.values[i][j].to_bits(), m.values[j][i].to_bits());
            }
        }
    }

    #[test]
    fn csv_export_reloads_to_the_same_table(table in table()) {
        let reloaded = load_bytes(&to_csv_bytes(&table).unwrap(), FileFormat::Csv).unwrap();
        prop_assert_eq!(reloaded, table);
    }
}
