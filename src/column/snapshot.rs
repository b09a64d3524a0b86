use super::builder::ColumnBuilder;
use super::query::ColumnQuery;
use super::types::{ColumnType, NumericRange, ObjectRange};
use crate::dictionary::DictionaryFact;
use crate::facts::{SetRelation, UncertainCount};
use serde::Serialize;

/// Immutable facts about one column.
///
/// Only a [`ColumnBuilder`] creates snapshots, so the category invariants
/// hold for every instance: at most one of dictionary, numeric range and
/// object range is meaningful, and a column without type has none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSnapshot {
    pub(super) column_type: Option<ColumnType>,
    pub(super) value_set_relation: SetRelation,
    pub(super) dictionary: DictionaryFact,
    /// Whether a dictionary was ever provided; an empty one may still be a claim.
    #[serde(skip)]
    pub(super) dictionary_known: bool,
    pub(super) numeric_range: Option<NumericRange>,
    pub(super) object_range: Option<ObjectRange>,
    pub(super) missing: UncertainCount,
}

impl ColumnSnapshot {
    /// A column about which nothing, not even the type, is known.
    pub fn unknown() -> Self {
        ColumnBuilder::unknown().build()
    }

    /// A column of known type with unknown values and missing count.
    pub fn of_type(column_type: ColumnType) -> Self {
        ColumnBuilder::new(column_type).build()
    }

    pub fn numeric_range(&self) -> Option<&NumericRange> {
        self.numeric_range.as_ref()
    }

    pub fn object_range(&self) -> Option<&ObjectRange> {
        self.object_range.as_ref()
    }

    /// Starts an edit; the snapshot itself stays untouched.
    ///
    /// The builder applies the default nominal cap. Chain
    /// [`ColumnBuilder::with_settings`] to use a configured one.
    pub fn to_builder(&self) -> ColumnBuilder {
        ColumnBuilder::from_snapshot(self)
    }
}

impl ColumnQuery for ColumnSnapshot {
    fn column_type(&self) -> Option<ColumnType> {
        self.column_type
    }

    fn value_set_relation(&self) -> SetRelation {
        self.value_set_relation
    }

    fn dictionary(&self) -> &DictionaryFact {
        &self.dictionary
    }

    fn missing_values(&self) -> UncertainCount {
        self.missing
    }
}
