//! Propagation of a changed row-count estimate into the columns.
//!
//! The previous and the new height decide which bulk operation runs:
//!
//! | previous | new below old | new above old |
//! |---|---|---|
//! | `=` | reduce, if new is bounded above | increase, if new is bounded below |
//! | `≥` | reduce, if new is bounded above | nothing |
//! | `≤` | sanity check, or increase if new is only bounded below | increase |
//! | `?` | sanity check, if new is bounded above | sanity check, if new is bounded above |
//!
//! An unknown new height never cascades.

use super::builder::TableBuilder;
use crate::column::{ColumnQuery as _, ColumnSnapshot};
use crate::facts::{CountRelation, SetRelation, UncertainCount};
use std::cmp::Ordering;

/// Bulk operation applied to every column after a height change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cascade {
    /// Rows may have been added.
    Increase,
    /// Rows may have been removed.
    Reduce,
    /// The height got a (tighter) upper bound; clamp facts that exceed it.
    SanityCheck,
}

impl Cascade {
    /// Chooses the operation for a change from `previous` to `next`, if any.
    pub fn plan(previous: UncertainCount, next: UncertainCount) -> Option<Self> {
        use CountRelation::{AtLeast, AtMost, Equal, Unknown};

        let direction = next.value().cmp(&previous.value());
        match (previous.relation(), next.relation()) {
            (_, Unknown) => None,
            (Equal, relation) => match direction {
                Ordering::Less if relation.bounds_above() => Some(Self::Reduce),
                Ordering::Greater if relation.bounds_below() => Some(Self::Increase),
                Ordering::Equal => match relation {
                    AtMost => Some(Self::Reduce),
                    AtLeast => Some(Self::Increase),
                    Equal | Unknown => None,
                },
                Ordering::Less | Ordering::Greater => None,
            },
            (AtLeast, relation) => (direction != Ordering::Greater
                && relation.bounds_above()
                && !(direction == Ordering::Equal && relation == Equal))
                .then_some(Self::Reduce),
            (AtMost, AtLeast) => Some(Self::Increase),
            (AtMost, _) => match direction {
                Ordering::Greater => Some(Self::Increase),
                Ordering::Less | Ordering::Equal => Some(Self::SanityCheck),
            },
            (Unknown, relation) => relation.bounds_above().then_some(Self::SanityCheck),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Reduce => "reduce",
            Self::SanityCheck => "sanity check",
        }
    }
}

impl TableBuilder {
    /// Changes the height and widens every column fact the change invalidates.
    pub fn update_height(&mut self, height: UncertainCount) -> &mut Self {
        let previous = self.height;
        self.height = height;
        let Some(cascade) = Cascade::plan(previous, height) else {
            log::trace!("Height {previous} -> {height}: no cascade");
            return self;
        };
        log::debug!(
            "Height {previous} -> {height}: {} over {} columns",
            cascade.as_str(),
            self.column_count()
        );
        match cascade {
            Cascade::Increase => self.rewrite_columns(increase),
            Cascade::Reduce => self.rewrite_columns(reduce),
            Cascade::SanityCheck => {
                if let Some(bound) = height.upper_bound() {
                    self.rewrite_columns(|column| sanity_check(column, bound));
                }
            }
        }
        self
    }

    /// Replaces every column for which `rewrite` returns a new snapshot.
    ///
    /// The column container is only copied if at least one column changes.
    fn rewrite_columns<F>(&mut self, mut rewrite: F)
    where
        F: FnMut(&ColumnSnapshot) -> Option<ColumnSnapshot>,
    {
        let updates: Vec<(String, ColumnSnapshot)> = self
            .columns
            .get()
            .iter()
            .filter_map(|(label, column)| rewrite(column).map(|new| (label.to_owned(), new)))
            .collect();
        if updates.is_empty() {
            return;
        }
        let columns = self.columns.to_mut();
        for (label, column) in updates {
            columns.insert(label, column);
        }
    }
}

fn increase(column: &ColumnSnapshot) -> Option<ColumnSnapshot> {
    if !column.missing_values().is_known() {
        return None;
    }
    let mut builder = column.to_builder();
    builder.increase_missing_by_unknown_amount();
    Some(builder.build())
}

fn reduce(column: &ColumnSnapshot) -> Option<ColumnSnapshot> {
    let missing_known = column.missing_values().is_known();
    let claims_completeness = column.is_nominal().is_yes()
        && matches!(
            column.value_set_relation(),
            SetRelation::Equal | SetRelation::Superset
        );
    if !missing_known && !claims_completeness {
        return None;
    }
    let mut builder = column.to_builder();
    if missing_known {
        builder.reduce_missing_by_unknown_amount();
    }
    if claims_completeness {
        builder.merge_value_set_relation(SetRelation::Subset);
    }
    Some(builder.build())
}

fn sanity_check(column: &ColumnSnapshot, height_bound: u64) -> Option<ColumnSnapshot> {
    let missing = column.missing_values();
    let missing_too_high = missing.is_known() && missing.value() > height_bound;
    let dictionary_too_large = column.is_nominal().is_yes()
        && u64::try_from(column.dictionary().len()).is_ok_and(|len| len > height_bound)
        && column.value_set_relation() != SetRelation::Subset;
    if !missing_too_high && !dictionary_too_large {
        return None;
    }
    let mut builder = column.to_builder();
    if missing_too_high {
        builder.set_missing_values(UncertainCount::at_most(height_bound));
    }
    if dictionary_too_large {
        builder.merge_value_set_relation(SetRelation::Subset);
    }
    Some(builder.build())
}
