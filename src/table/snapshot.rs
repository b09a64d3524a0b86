use super::builder::TableBuilder;
use super::labels::{Iter, LabelMap};
use super::tags::{ColumnTag, TagKind};
use super::TagMap;
use crate::column::{Category, ColumnQuery as _, ColumnSnapshot, ColumnType};
use crate::facts::{EpistemicBool, SetRelation, UncertainCount};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Immutable facts about a table.
///
/// Columns keep their declaration order. `column_set_relation` states how
/// the tracked columns relate to the actual columns, e.g. `Superset` once the
/// column cap dropped some.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub(super) height: UncertainCount,
    pub(super) columns: Arc<LabelMap<ColumnSnapshot>>,
    pub(super) column_set_relation: SetRelation,
    pub(super) tags: Arc<TagMap>,
}

/// Labels picked by a query, tagged with how they relate to the actual answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    labels: Vec<String>,
    relation: SetRelation,
}

impl Selection {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn relation(&self) -> SetRelation {
        self.relation
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether `label` belongs to the actual answer.
    pub fn contains(&self, label: &str) -> EpistemicBool {
        self.relation
            .contains(self.labels.iter().any(|selected| selected == label))
    }
}

impl<'a> IntoIterator for &'a TableSnapshot {
    type Item = (&'a str, &'a ColumnSnapshot);
    type IntoIter = Iter<'a, ColumnSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Default for TableSnapshot {
    fn default() -> Self {
        Self::unknown()
    }
}

impl TableSnapshot {
    /// A table about which nothing is known: unknown height, any columns.
    pub fn unknown() -> Self {
        Self {
            height: UncertainCount::unknown(),
            columns: Arc::default(),
            column_set_relation: SetRelation::Superset,
            tags: Arc::default(),
        }
    }

    pub fn height(&self) -> UncertainCount {
        self.height
    }

    /// Number of tracked columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Tracked labels in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.labels()
    }

    pub fn column(&self, label: &str) -> Option<&ColumnSnapshot> {
        self.columns.get(label)
    }

    pub fn iter(&self) -> Iter<'_, ColumnSnapshot> {
        self.columns.iter()
    }

    /// Whether the actual table has a column called `label`.
    ///
    /// An untracked label answers `No` under a `Subset` column set, since a
    /// subset claim never adds columns beyond the tracked ones; only
    /// `Superset` and `Unknown` leave it open.
    pub fn contains(&self, label: &str) -> EpistemicBool {
        self.column_set_relation
            .contains(self.columns.contains(label))
    }

    pub fn column_set_relation(&self) -> SetRelation {
        self.column_set_relation
    }

    /// Tags of `label`, empty if the column has none or is not tracked.
    pub fn tags(&self, label: &str) -> &[ColumnTag] {
        self.tags.get(label).map_or(&[], Vec::as_slice)
    }

    pub fn tag_of_kind(&self, label: &str, kind: TagKind) -> Option<&ColumnTag> {
        self.tags(label).iter().find(|tag| tag.kind() == kind)
    }

    /// Labels whose type is `column_type`.
    ///
    /// Columns of unknown type may match as well, which widens the result
    /// towards `Superset`.
    pub fn select_by_type(&self, column_type: ColumnType) -> Selection {
        self.select_by(|column| column.column_type().map(|t| t == column_type))
    }

    pub fn select_by_category(&self, category: Category) -> Selection {
        self.select_by(|column| column.category().map(|c| c == category))
    }

    /// Labels carrying exactly `tag`.
    pub fn select_by_tag(&self, tag: &ColumnTag) -> Selection {
        self.select_by_tags(|tags| tags.contains(tag))
    }

    /// Labels carrying any tag of `kind`.
    pub fn select_by_tag_kind(&self, kind: TagKind) -> Selection {
        self.select_by_tags(|tags| tags.iter().any(|tag| tag.kind() == kind))
    }

    /// Projection onto `labels`, keeping declaration order, tags and height.
    ///
    /// Labels that are not tracked are ignored. An empty projection of a
    /// `Subset` column set is exactly empty and becomes `Equal`.
    pub fn columns<'a, I>(&self, labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: HashSet<&str> = labels.into_iter().collect();
        self.project(|label| wanted.contains(label))
    }

    /// Projection onto every column not in `labels`.
    pub fn without<'a, I>(&self, labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unwanted: HashSet<&str> = labels.into_iter().collect();
        self.project(|label| !unwanted.contains(label))
    }

    /// Starts an edit that shares this snapshot's containers until the first change.
    pub fn to_builder(&self) -> TableBuilder {
        TableBuilder::from_snapshot(self)
    }

    /// Whether `other` holds the very same column container (not merely equal content).
    pub fn shares_columns_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.columns, &other.columns)
    }

    pub fn shares_tags_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tags, &other.tags)
    }

    fn project<F>(&self, keep: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let columns: LabelMap<ColumnSnapshot> = self
            .columns
            .iter()
            .filter(|&(label, _)| keep(label))
            .map(|(label, column)| (label, column.clone()))
            .collect();
        let tags: TagMap = self
            .tags
            .iter()
            .filter(|(label, _)| columns.contains(label))
            .map(|(label, tags)| (label.clone(), tags.clone()))
            .collect();
        let column_set_relation =
            if columns.is_empty() && self.column_set_relation == SetRelation::Subset {
                SetRelation::Equal
            } else {
                self.column_set_relation
            };
        Self {
            height: self.height,
            columns: Arc::new(columns),
            column_set_relation,
            tags: Arc::new(tags),
        }
    }

    fn select_by<F>(&self, matches: F) -> Selection
    where
        F: Fn(&ColumnSnapshot) -> Option<bool>,
    {
        let mut relation = self.column_set_relation;
        let mut labels = Vec::new();
        for (label, column) in &*self.columns {
            match matches(column) {
                Some(true) => labels.push(label.to_owned()),
                Some(false) => {}
                None => relation = relation.merge(SetRelation::Superset),
            }
        }
        Selection { labels, relation }
    }

    fn select_by_tags<F>(&self, matches: F) -> Selection
    where
        F: Fn(&[ColumnTag]) -> bool,
    {
        let labels = self
            .columns
            .labels()
            .filter(|label| matches(self.tags(label)))
            .map(str::to_owned)
            .collect();
        Selection {
            labels,
            relation: self.column_set_relation,
        }
    }
}
