use super::types::{Category, ColumnType};
use crate::dictionary::DictionaryFact;
use crate::facts::{EpistemicBool, SetRelation, UncertainCount};

/// Questions answered identically by snapshots and builders.
pub trait ColumnQuery {
    fn column_type(&self) -> Option<ColumnType>;

    /// Relation of the category's value-set fact to the actual values.
    fn value_set_relation(&self) -> SetRelation;

    fn dictionary(&self) -> &DictionaryFact;

    fn missing_values(&self) -> UncertainCount;

    fn category(&self) -> Option<Category> {
        self.column_type().map(ColumnType::category)
    }

    fn is_nominal(&self) -> EpistemicBool {
        is_category(self.category(), Category::Nominal)
    }

    fn is_numeric(&self) -> EpistemicBool {
        is_category(self.category(), Category::Numeric)
    }

    fn is_object(&self) -> EpistemicBool {
        is_category(self.category(), Category::Object)
    }

    fn has_missing_values(&self) -> EpistemicBool {
        self.missing_values().is_at_least(1)
    }

    /// Whether the column holds at most two distinct values.
    ///
    /// Boolean dictionaries always qualify. Otherwise the dictionary size
    /// decides, and only under relations that bound the actual set from the
    /// matching side.
    fn is_at_most_bicategorical(&self) -> EpistemicBool {
        match self.is_nominal() {
            EpistemicBool::Yes => {}
            other => return other,
        }
        let dictionary = self.dictionary();
        if dictionary.is_boolean() {
            return EpistemicBool::Yes;
        }
        let small = dictionary.len() <= 2;
        match self.value_set_relation() {
            SetRelation::Equal => EpistemicBool::from_bool(small),
            SetRelation::Subset if small => EpistemicBool::Yes,
            SetRelation::Superset if !small => EpistemicBool::No,
            _ => EpistemicBool::Unknown,
        }
    }
}

fn is_category(actual: Option<Category>, expected: Category) -> EpistemicBool {
    match actual {
        Some(category) => EpistemicBool::from_bool(category == expected),
        None => EpistemicBool::Unknown,
    }
}
