use super::query::ColumnQuery;
use super::snapshot::ColumnSnapshot;
use super::types::{Category, ColumnType, NumericRange, ObjectRange};
use crate::config::{DEFAULT_MAX_NOMINAL_VALUES, SettingsProvider};
use crate::dictionary::DictionaryFact;
use crate::error::{MetadataError, Result};
use crate::facts::{SetRelation, UncertainCount};

/// Mutable accumulator for a [`ColumnSnapshot`].
///
/// The running value-set relation starts neutral (`Equal`) and every setter
/// merges its relation into it, so facts only ever get less certain while a
/// builder is in use. A value-set fact that was never provided is reported as
/// `Unknown` by `build()`.
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    column_type: Option<ColumnType>,
    value_set_relation: SetRelation,
    dictionary: DictionaryFact,
    dictionary_known: bool,
    numeric_range: Option<NumericRange>,
    object_range: Option<ObjectRange>,
    missing: UncertainCount,
    max_nominal_values: usize,
}

impl ColumnBuilder {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type: Some(column_type),
            ..Self::unknown()
        }
    }

    /// Builder for a column whose type is not known.
    pub fn unknown() -> Self {
        Self {
            column_type: None,
            value_set_relation: SetRelation::Equal,
            dictionary: DictionaryFact::unknown(),
            dictionary_known: false,
            numeric_range: None,
            object_range: None,
            missing: UncertainCount::unknown(),
            max_nominal_values: DEFAULT_MAX_NOMINAL_VALUES,
        }
    }

    /// Starts an incremental edit of an existing snapshot.
    pub fn from_snapshot(snapshot: &ColumnSnapshot) -> Self {
        let fact_known = match snapshot.category() {
            Some(Category::Nominal) => snapshot.dictionary_known,
            Some(Category::Numeric) => snapshot.numeric_range.is_some(),
            Some(Category::Object) => snapshot.object_range.is_some(),
            None => false,
        };
        Self {
            column_type: snapshot.column_type,
            value_set_relation: if fact_known {
                snapshot.value_set_relation
            } else {
                SetRelation::Equal
            },
            dictionary: snapshot.dictionary.clone(),
            dictionary_known: snapshot.dictionary_known,
            numeric_range: snapshot.numeric_range,
            object_range: snapshot.object_range.clone(),
            missing: snapshot.missing,
            max_nominal_values: DEFAULT_MAX_NOMINAL_VALUES,
        }
    }

    /// Reads the nominal value cap from `settings` now.
    #[must_use]
    pub fn with_settings(mut self, settings: &dyn SettingsProvider) -> Self {
        self.max_nominal_values = settings.max_nominal_values();
        self
    }

    #[must_use]
    pub fn with_max_nominal_values(mut self, max_nominal_values: usize) -> Self {
        self.max_nominal_values = max_nominal_values;
        self
    }

    pub fn max_nominal_values(&self) -> usize {
        self.max_nominal_values
    }

    /// Changes the declared type.
    ///
    /// # Errors
    ///
    /// Fails if an object range is stored whose kind the new object type does not accept.
    pub fn set_type(&mut self, column_type: Option<ColumnType>) -> Result<&mut Self> {
        if let (Some(range), Some(kind)) = (
            &self.object_range,
            column_type.and_then(ColumnType::element_kind),
        ) && range.kind() != kind
        {
            return Err(MetadataError::TypeMismatch {
                expected: kind.to_string(),
                found: range.kind().to_string(),
            });
        }
        self.column_type = column_type;
        Ok(self)
    }

    /// Overwrites the running value-set relation.
    pub fn set_value_set_relation(&mut self, relation: SetRelation) -> &mut Self {
        self.value_set_relation = relation;
        self
    }

    pub fn merge_value_set_relation(&mut self, relation: SetRelation) -> &mut Self {
        self.value_set_relation = self.value_set_relation.merge(relation);
        self
    }

    /// Replaces the dictionary with `values`, merging `relation` into the running relation.
    ///
    /// Values beyond the nominal cap are dropped and the relation widened to `Superset`.
    pub fn set_dictionary_values<I, S>(&mut self, values: I, relation: SetRelation) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.merge_value_set_relation(relation);
        self.dictionary = DictionaryFact::from_values(values, self.max_nominal_values);
        self.dictionary_known = true;
        if self.dictionary.was_truncated() {
            self.merge_value_set_relation(SetRelation::Superset);
        }
        self
    }

    /// Adds `values` to the dictionary up to the nominal cap.
    ///
    /// Adding to an unknown dictionary only establishes that these values
    /// exist, so the relation becomes at best `Superset`.
    pub fn add_dictionary_values<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.dictionary_known {
            return self.set_dictionary_values(values, SetRelation::Superset);
        }
        let was_truncated = self.dictionary.was_truncated();
        self.dictionary = self.dictionary.union(values, self.max_nominal_values);
        if self.dictionary.was_truncated() && !was_truncated {
            self.merge_value_set_relation(SetRelation::Superset);
        }
        self
    }

    /// Makes the column boolean with known classes; the value set is then exact.
    ///
    /// # Errors
    ///
    /// Fails if both classes are present and equal.
    pub fn set_boolean_dictionary_values(
        &mut self,
        positive: Option<String>,
        negative: Option<String>,
    ) -> Result<&mut Self> {
        self.dictionary = DictionaryFact::boolean(positive, negative)?;
        self.dictionary_known = true;
        self.value_set_relation = SetRelation::Equal;
        Ok(self)
    }

    /// Makes the column boolean without knowing its classes.
    pub fn set_unknown_boolean_dictionary(&mut self) -> &mut Self {
        self.dictionary = DictionaryFact::unknown_boolean();
        self.dictionary_known = true;
        self.value_set_relation = SetRelation::Superset;
        self
    }

    /// Sets the numeric range, merging `relation` into the running relation.
    ///
    /// An inverted range never reaches this point: [`NumericRange::new`]
    /// already turns it into `None`, i.e. an unknown range.
    pub fn set_numeric_range(
        &mut self,
        range: Option<NumericRange>,
        relation: SetRelation,
    ) -> &mut Self {
        self.merge_value_set_relation(relation);
        self.numeric_range = range;
        self
    }

    /// Widens the numeric range to cover `range` as well.
    ///
    /// A union with an unknown range is unknown: the stored range is dropped
    /// and the relation becomes `Unknown`.
    pub fn range_union(&mut self, range: Option<NumericRange>) -> &mut Self {
        match (self.numeric_range, range) {
            (Some(current), Some(other)) => self.numeric_range = Some(current.union(&other)),
            (_, None) => {
                self.numeric_range = None;
                self.value_set_relation = SetRelation::Unknown;
            }
            (None, Some(_)) => {}
        }
        self
    }

    /// Sets the object range, merging `relation` into the running relation.
    ///
    /// # Errors
    ///
    /// Fails if the range's endpoints are not of the column's element type.
    pub fn set_object_range(
        &mut self,
        range: Option<ObjectRange>,
        relation: SetRelation,
    ) -> Result<&mut Self> {
        if let Some(range) = &range {
            self.check_object_kind(range)?;
        }
        self.merge_value_set_relation(relation);
        self.object_range = range;
        Ok(self)
    }

    /// Object counterpart of [`Self::range_union`].
    ///
    /// # Errors
    ///
    /// Fails if the range's endpoints are not of the column's element type.
    pub fn object_range_union(&mut self, range: Option<&ObjectRange>) -> Result<&mut Self> {
        match (&self.object_range, range) {
            (Some(current), Some(other)) => {
                self.check_object_kind(other)?;
                self.object_range = Some(current.union(other)?);
            }
            (_, None) => {
                self.object_range = None;
                self.value_set_relation = SetRelation::Unknown;
            }
            (None, Some(other)) => self.check_object_kind(other)?,
        }
        Ok(self)
    }

    pub fn set_missing_values(&mut self, missing: UncertainCount) -> &mut Self {
        self.missing = missing;
        self
    }

    pub fn increase_missing_by_unknown_amount(&mut self) -> &mut Self {
        self.missing.increase_by_unknown_amount();
        self
    }

    pub fn reduce_missing_by_unknown_amount(&mut self) -> &mut Self {
        self.missing.reduce_by_unknown_amount();
        self
    }

    pub fn numeric_range(&self) -> Option<&NumericRange> {
        self.numeric_range.as_ref()
    }

    pub fn object_range(&self) -> Option<&ObjectRange> {
        self.object_range.as_ref()
    }

    /// Produces the snapshot, discarding facts that do not match the type's category.
    pub fn build(self) -> ColumnSnapshot {
        let value_set_relation = self.value_set_relation();
        let Some(category) = self.category() else {
            return ColumnSnapshot {
                column_type: None,
                value_set_relation: SetRelation::Unknown,
                dictionary: DictionaryFact::unknown(),
                dictionary_known: false,
                numeric_range: None,
                object_range: None,
                missing: self.missing,
            };
        };

        let (dictionary, numeric_range, object_range) = match category {
            Category::Nominal => (self.dictionary, None, None),
            Category::Numeric => (DictionaryFact::unknown(), self.numeric_range, None),
            Category::Object => (DictionaryFact::unknown(), None, self.object_range),
        };
        ColumnSnapshot {
            column_type: self.column_type,
            value_set_relation,
            dictionary,
            dictionary_known: category == Category::Nominal && self.dictionary_known,
            numeric_range,
            object_range,
            missing: self.missing,
        }
    }

    fn check_object_kind(&self, range: &ObjectRange) -> Result<()> {
        match self.column_type.and_then(ColumnType::element_kind) {
            Some(kind) if kind == range.kind() => Ok(()),
            Some(kind) => Err(MetadataError::TypeMismatch {
                expected: kind.to_string(),
                found: range.kind().to_string(),
            }),
            None => Err(MetadataError::TypeMismatch {
                expected: self
                    .column_type
                    .map_or_else(|| "unknown type".to_owned(), |t| t.to_string()),
                found: format!("{} range", range.kind()),
            }),
        }
    }

    /// Whether the fact belonging to the current category was ever provided.
    fn category_fact_known(&self) -> bool {
        match self.category() {
            Some(Category::Nominal) => self.dictionary_known,
            Some(Category::Numeric) => self.numeric_range.is_some(),
            Some(Category::Object) => self.object_range.is_some(),
            None => false,
        }
    }
}

impl Default for ColumnBuilder {
    fn default() -> Self {
        Self::unknown()
    }
}

impl ColumnQuery for ColumnBuilder {
    fn column_type(&self) -> Option<ColumnType> {
        self.column_type
    }

    /// The relation `build()` would report for the current state.
    fn value_set_relation(&self) -> SetRelation {
        if self.category_fact_known() {
            self.value_set_relation
        } else {
            SetRelation::Unknown
        }
    }

    fn dictionary(&self) -> &DictionaryFact {
        &self.dictionary
    }

    fn missing_values(&self) -> UncertainCount {
        self.missing
    }
}
