//! Integration tests for table metadata workflows
//!
//! These tests drive the public API the way a workflow editor would:
//! build a table, transform it step by step and check that every fact
//! stays sound.

#![expect(clippy::unwrap_used)]

use std::sync::Arc;
use tablefacts::column::{ColumnBuilder, ColumnQuery as _, ColumnSnapshot, ColumnType};
use tablefacts::config::{MetadataSettings, Settings, SharedSettings};
use tablefacts::dictionary::DictionaryFact;
use tablefacts::error::MetadataError;
use tablefacts::facts::{CountRelation, EpistemicBool, SetRelation, UncertainCount};
use tablefacts::profiler::{ColumnStatistics, snapshot_from_statistics};
use tablefacts::table::{ColumnReference, ColumnRole, ColumnTag, TableBuilder, TableSnapshot};

fn settings(max_columns: usize, max_nominal_values: usize) -> Settings {
    Arc::new(MetadataSettings {
        max_columns,
        max_nominal_values,
    })
}

fn nominal(values: &[&str], missing: UncertainCount) -> ColumnSnapshot {
    let mut builder = ColumnBuilder::new(ColumnType::Nominal);
    builder
        .set_dictionary_values(values.iter().copied(), SetRelation::Equal)
        .set_missing_values(missing);
    builder.build()
}

#[test]
fn test_dictionary_cap_during_incremental_build() {
    let mut builder = ColumnBuilder::new(ColumnType::Nominal).with_max_nominal_values(5);
    builder.set_dictionary_values(["a", "b", "c"], SetRelation::Superset);
    builder.add_dictionary_values((0..10).map(|i| format!("v{i}")));
    let column = builder.build();

    assert!(column.dictionary().len() <= 4, "dictionary stays below the cap");
    assert!(column.dictionary().was_truncated());
    assert_eq!(column.value_set_relation(), SetRelation::Superset);
}

#[test]
fn test_height_reduction_keeps_missing_bound() {
    let mut builder = TableBuilder::new(UncertainCount::equal(10));
    builder.add("a", nominal(&["x", "y"], UncertainCount::equal(10)));
    builder.update_height(UncertainCount::equal(6));
    let table = builder.build();

    let column = table.column("a").unwrap();
    assert_eq!(column.missing_values().relation(), CountRelation::AtMost);
    assert_eq!(column.missing_values().value(), 10);
    assert_eq!(column.missing_values().to_string(), "\u{2264} 10");
}

#[test]
fn test_height_cascade_soundness() {
    for missing in 0..=10 {
        for new_height in 0..10 {
            let mut builder = TableBuilder::new(UncertainCount::equal(10));
            builder
                .add("pair", nominal(&["x", "y"], UncertainCount::equal(missing)))
                .add("many", nominal(&["p", "q", "r"], UncertainCount::equal(missing)));
            let before = builder.clone().build();
            builder.update_height(UncertainCount::equal(new_height));
            let after = builder.build();

            for label in ["pair", "many"] {
                let old = before.column(label).unwrap();
                let new = after.column(label).unwrap();
                assert_eq!(
                    new.missing_values(),
                    UncertainCount::at_most(missing),
                    "missing count of {label} after shrinking to {new_height}"
                );
                let was = old.is_at_most_bicategorical();
                let is = new.is_at_most_bicategorical();
                assert!(
                    !(was.is_yes() && is.is_no()),
                    "{label} regressed from yes to no"
                );
            }
        }
    }
}

#[test]
fn test_rename_rewrites_references() {
    let mut builder = TableBuilder::new(UncertainCount::equal(3));
    builder
        .add_nominal("a", ["yes", "no"], SetRelation::Equal)
        .add_real("score", None, SetRelation::Unknown);
    builder
        .add_tag(
            "score",
            ColumnTag::Reference(ColumnReference::to_column("a")),
        )
        .unwrap();
    builder.rename("a", "b").unwrap();
    let table = builder.build();

    let reference = table
        .tags("score")
        .iter()
        .find_map(ColumnTag::as_reference)
        .unwrap();
    assert_eq!(reference.column(), Some("b"));
    assert_eq!(table.contains("a"), EpistemicBool::No);
    assert_eq!(table.contains("b"), EpistemicBool::Yes);
}

#[test]
fn test_column_cap_widens_column_set() {
    let mut builder = TableBuilder::new(UncertainCount::equal(1)).with_settings(settings(5, 10));
    for i in 0..5 {
        builder.add_real(format!("c{i}"), None, SetRelation::Equal);
    }
    let before: Vec<String> = builder.labels().map(str::to_owned).collect();
    builder.add_real("c5", None, SetRelation::Equal);
    let table = builder.build();

    assert_eq!(table.column_count(), 5);
    assert_eq!(table.column_set_relation(), SetRelation::Superset);
    assert_eq!(table.labels().collect::<Vec<_>>(), before);
    assert_eq!(table.contains("c5"), EpistemicBool::Unknown);
}

#[test]
fn test_union_with_postfix() {
    fn single(label: &str) -> TableSnapshot {
        let mut builder = TableBuilder::new(UncertainCount::equal(2));
        builder.add_integer(label, None, SetRelation::Equal);
        builder.build()
    }

    let first = single("x").union(&single("x"), Some("_2"));
    assert_eq!(first.labels().collect::<Vec<_>>(), vec!["x", "x_2"]);

    let second = first.union(&single("x_2"), Some("_2"));
    assert_eq!(
        second.labels().collect::<Vec<_>>(),
        vec!["x", "x_2", "x_2_2"]
    );
}

#[test]
fn test_copy_on_write_view_identity() {
    let fact = DictionaryFact::from_values(["a", "b"], 10);

    let first = fact.as_copy_on_write_view();
    let second = fact.as_copy_on_write_view();
    assert!(std::ptr::eq(first.values(), second.values()));
    assert!(fact.from_view(first).shares_values_with(&fact));

    let mut edited = fact.as_copy_on_write_view();
    edited.insert("c");
    assert!(!std::ptr::eq(edited.values(), fact.values()));
    let converted = fact.from_view(edited);
    assert!(!converted.shares_values_with(&fact));
    assert_eq!(converted.len(), 3);
    assert_eq!(fact.len(), 2, "the source dictionary is untouched");
}

#[test]
fn test_snapshot_survives_builder_edits() {
    let mut builder = TableBuilder::new(UncertainCount::equal(4));
    builder.add_nominal("a", ["x"], SetRelation::Equal);
    builder
        .add_tag("a", ColumnTag::Role(ColumnRole::Label))
        .unwrap();
    let snapshot = builder.build();

    let mut edit = snapshot.to_builder();
    edit.rename("a", "b").unwrap();
    edit.clear_tags("b");
    edit.update_height(UncertainCount::at_least(8));
    let edited = edit.build();

    assert_eq!(snapshot.labels().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(snapshot.tags("a").len(), 1);
    assert_eq!(snapshot.height(), UncertainCount::equal(4));
    assert!(edited.tags("b").is_empty());
    assert_eq!(edited.height(), UncertainCount::at_least(8));
}

#[test]
fn test_runtime_settings_affect_only_later_builds() {
    let shared = SharedSettings::new(MetadataSettings {
        max_columns: 10,
        max_nominal_values: 3,
    });
    let statistics = || [("a", ColumnStatistics::nominal(["1", "2", "3", "4"], 0))];

    let narrow = snapshot_from_statistics(5, statistics(), &shared.handle()).unwrap();
    shared.set_max_nominal_values(50);
    let wide = snapshot_from_statistics(5, statistics(), &shared.handle()).unwrap();

    assert!(narrow.column("a").unwrap().dictionary().was_truncated());
    assert!(!wide.column("a").unwrap().dictionary().was_truncated());
    assert_eq!(
        wide.column("a").unwrap().value_set_relation(),
        SetRelation::Equal
    );
}

#[test]
fn test_constraint_violations_surface() {
    let mut builder = TableBuilder::new(UncertainCount::equal(1));
    let err = builder
        .add_boolean("flag", Some("y".to_owned()), Some("y".to_owned()))
        .unwrap_err();
    assert!(matches!(err, MetadataError::InvalidDictionary(_)));
    assert!(
        builder.add_tag("flag", ColumnTag::Role(ColumnRole::Id)).is_err(),
        "the failed column was never added"
    );
}

#[test]
fn test_snapshot_exports_as_json() {
    let mut builder = TableBuilder::new(UncertainCount::at_most(7));
    builder.add_nominal("a", ["x"], SetRelation::Subset);
    let json = serde_json::to_value(builder.build()).unwrap();
    assert_eq!(json["height"]["relation"], "AtMost");
    assert_eq!(json["columns"]["a"]["value_set_relation"], "Subset");
}
