use super::labels::LabelMap;
use super::snapshot::TableSnapshot;
use super::tags::{ColumnTag, insert_tag};
use super::TagMap;
use crate::column::{ColumnBuilder, ColumnSnapshot, ColumnType, NumericRange, ObjectRange};
use crate::config::{Settings, default_settings};
use crate::cow::CopyOnWrite;
use crate::error::{MetadataError, Result};
use crate::facts::{EpistemicBool, SetRelation, UncertainCount};

/// Mutable accumulator for a [`TableSnapshot`].
///
/// A builder made from a snapshot shares the snapshot's column and tag
/// containers. The first change to either container copies it once; the
/// snapshot is never modified.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    pub(super) height: UncertainCount,
    pub(super) columns: CopyOnWrite<LabelMap<ColumnSnapshot>>,
    pub(super) column_set_relation: SetRelation,
    pub(super) tags: CopyOnWrite<TagMap>,
    pub(super) settings: Settings,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new(UncertainCount::unknown())
    }
}

impl TableBuilder {
    /// An empty table with the given height whose column set is exact.
    pub fn new(height: UncertainCount) -> Self {
        Self {
            height,
            columns: CopyOnWrite::default(),
            column_set_relation: SetRelation::Equal,
            tags: CopyOnWrite::default(),
            settings: default_settings(),
        }
    }

    /// Zero-copy start of an edit of `snapshot`.
    pub fn from_snapshot(snapshot: &TableSnapshot) -> Self {
        Self {
            height: snapshot.height,
            columns: CopyOnWrite::shared(snapshot.columns.clone()),
            column_set_relation: snapshot.column_set_relation,
            tags: CopyOnWrite::shared(snapshot.tags.clone()),
            settings: default_settings(),
        }
    }

    /// Caps are read from `settings` whenever they matter, not now.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn height(&self) -> UncertainCount {
        self.height
    }

    pub fn column_set_relation(&self) -> SetRelation {
        self.column_set_relation
    }

    pub fn column_count(&self) -> usize {
        self.columns.get().len()
    }

    pub fn column(&self, label: &str) -> Option<&ColumnSnapshot> {
        self.columns.get().get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.get().labels()
    }

    /// Same answer the built snapshot would give.
    pub fn contains(&self, label: &str) -> EpistemicBool {
        self.column_set_relation
            .contains(self.columns.get().contains(label))
    }

    pub fn tags(&self, label: &str) -> &[ColumnTag] {
        self.tags.get().get(label).map_or(&[], Vec::as_slice)
    }

    /// Whether the tag container was already copied away from the source snapshot.
    pub fn owns_tag_data(&self) -> bool {
        self.tags.is_owned()
    }

    pub fn owns_column_data(&self) -> bool {
        self.columns.is_owned()
    }

    /// Adds or replaces the column `label`.
    ///
    /// A new label beyond the column cap is not tracked; the column set
    /// becomes `Superset` instead. Replacing an existing label always works.
    pub fn add(&mut self, label: impl Into<String>, column: ColumnSnapshot) -> &mut Self {
        let label = label.into();
        if !self.columns.get().contains(&label) {
            let max_columns = self.settings.max_columns();
            if self.columns.get().len() >= max_columns {
                log::warn!(
                    "Column cap of {max_columns} reached; column '{label}' is not tracked"
                );
                self.merge_column_set_relation(SetRelation::Superset);
                return self;
            }
        }
        self.columns.to_mut().insert(label, column);
        self
    }

    /// Adds `column` and attaches `tags` to it, if the column cap admits it.
    pub fn add_with_tags<I>(
        &mut self,
        label: impl Into<String>,
        column: ColumnSnapshot,
        tags: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = ColumnTag>,
    {
        let label = label.into();
        self.add(label.clone(), column);
        if self.columns.get().contains(&label) {
            let mut tags = tags.into_iter().peekable();
            if tags.peek().is_some() {
                let list = self.tags.to_mut().entry(label).or_default();
                for tag in tags {
                    insert_tag(list, tag);
                }
            }
        }
        self
    }

    /// Nominal column with the given dictionary and unknown missing count.
    pub fn add_nominal<I, S>(
        &mut self,
        label: impl Into<String>,
        values: I,
        relation: SetRelation,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut column = self.column_builder(ColumnType::Nominal);
        column.set_dictionary_values(values, relation);
        self.add(label, column.build())
    }

    /// Boolean nominal column with known classes.
    ///
    /// # Errors
    ///
    /// Fails if both classes are given and equal.
    pub fn add_boolean(
        &mut self,
        label: impl Into<String>,
        positive: Option<String>,
        negative: Option<String>,
    ) -> Result<&mut Self> {
        let mut column = self.column_builder(ColumnType::Nominal);
        column.set_boolean_dictionary_values(positive, negative)?;
        Ok(self.add(label, column.build()))
    }

    pub fn add_real(
        &mut self,
        label: impl Into<String>,
        range: Option<NumericRange>,
        relation: SetRelation,
    ) -> &mut Self {
        self.add_numeric(label, ColumnType::Real, range, relation)
    }

    pub fn add_integer(
        &mut self,
        label: impl Into<String>,
        range: Option<NumericRange>,
        relation: SetRelation,
    ) -> &mut Self {
        self.add_numeric(label, ColumnType::Integer, range, relation)
    }

    /// Date, time, date-time or text column with an optional range.
    ///
    /// # Errors
    ///
    /// Fails if the range's endpoints are not of `column_type`'s element type.
    pub fn add_object(
        &mut self,
        label: impl Into<String>,
        column_type: ColumnType,
        range: Option<ObjectRange>,
        relation: SetRelation,
    ) -> Result<&mut Self> {
        let mut column = self.column_builder(column_type);
        column.set_object_range(range, relation)?;
        Ok(self.add(label, column.build()))
    }

    /// Drops the column and its tags; untracked labels are ignored.
    pub fn remove(&mut self, label: &str) -> &mut Self {
        if self.columns.get().contains(label) {
            self.columns.to_mut().remove(label);
        }
        if self.tags.get().contains_key(label) {
            self.tags.to_mut().remove(label);
        }
        self
    }

    pub fn remove_all<'a, I>(&mut self, labels: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for label in labels {
            self.remove(label);
        }
        self
    }

    /// Drops every column not named in `labels`.
    pub fn keep_only<'a, I>(&mut self, labels: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: Vec<&str> = labels.into_iter().collect();
        let doomed: Vec<String> = self
            .labels()
            .filter(|label| !keep.contains(label))
            .map(str::to_owned)
            .collect();
        for label in &doomed {
            self.remove(label);
        }
        self
    }

    /// Renames a column in place, moving its tags along.
    ///
    /// Every reference tag pointing at `old_label` is rewritten to point at
    /// `new_label`.
    ///
    /// # Errors
    ///
    /// Fails if `old_label` is not tracked or `new_label` already is.
    pub fn rename(&mut self, old_label: &str, new_label: &str) -> Result<&mut Self> {
        if !self.columns.get().contains(old_label) {
            return Err(MetadataError::NoSuchColumn(old_label.to_owned()));
        }
        if old_label == new_label {
            return Ok(self);
        }
        if self.columns.get().contains(new_label) {
            return Err(MetadataError::DuplicateLabel(new_label.to_owned()));
        }
        self.columns.to_mut().rename(old_label, new_label);
        self.rename_tags(old_label, new_label);
        Ok(self)
    }

    /// Edits the column `label` through a [`ColumnBuilder`].
    ///
    /// # Errors
    ///
    /// Fails if `label` is not tracked.
    pub fn update_column<F>(&mut self, label: &str, edit: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut ColumnBuilder),
    {
        self.try_update_column(label, |column| {
            edit(column);
            Ok(())
        })
    }

    /// Like [`Self::update_column`] for edits that can fail.
    ///
    /// # Errors
    ///
    /// Fails if `label` is not tracked or `edit` fails; the column is left
    /// unchanged in both cases.
    pub fn try_update_column<F>(&mut self, label: &str, edit: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut ColumnBuilder) -> Result<()>,
    {
        let mut column = self
            .column(label)
            .map(|column| column.to_builder().with_settings(&*self.settings))
            .ok_or_else(|| MetadataError::NoSuchColumn(label.to_owned()))?;
        edit(&mut column)?;
        self.columns.to_mut().insert(label, column.build());
        Ok(self)
    }

    /// Attaches `tag` to the column `label`.
    ///
    /// # Errors
    ///
    /// Fails if `label` is not tracked.
    pub fn add_tag(&mut self, label: &str, tag: ColumnTag) -> Result<&mut Self> {
        if !self.columns.get().contains(label) {
            return Err(MetadataError::NoSuchColumn(label.to_owned()));
        }
        insert_tag(self.tags.to_mut().entry(label.to_owned()).or_default(), tag);
        Ok(self)
    }

    pub fn remove_tag(&mut self, label: &str, tag: &ColumnTag) -> &mut Self {
        if !self.tags(label).contains(tag) {
            return self;
        }
        let tags = self.tags.to_mut();
        if let Some(list) = tags.get_mut(label) {
            list.retain(|existing| existing != tag);
            if list.is_empty() {
                tags.remove(label);
            }
        }
        self
    }

    pub fn clear_tags(&mut self, label: &str) -> &mut Self {
        if self.tags.get().contains_key(label) {
            self.tags.to_mut().remove(label);
        }
        self
    }

    pub fn merge_column_set_relation(&mut self, relation: SetRelation) -> &mut Self {
        self.column_set_relation = self.column_set_relation.merge(relation);
        self
    }

    /// Overwrites the column-set relation.
    pub fn set_column_set_relation(&mut self, relation: SetRelation) -> &mut Self {
        self.column_set_relation = relation;
        self
    }

    /// Sets the height without adjusting any column.
    ///
    /// Only for callers that already made the columns consistent with the
    /// new height themselves.
    pub fn update_height_without_side_effects(&mut self, height: UncertainCount) -> &mut Self {
        self.height = height;
        self
    }

    pub fn build(self) -> TableSnapshot {
        TableSnapshot {
            height: self.height,
            columns: self.columns.into_shared(),
            column_set_relation: self.column_set_relation,
            tags: self.tags.into_shared(),
        }
    }

    fn column_builder(&self, column_type: ColumnType) -> ColumnBuilder {
        ColumnBuilder::new(column_type).with_settings(&*self.settings)
    }

    fn add_numeric(
        &mut self,
        label: impl Into<String>,
        column_type: ColumnType,
        range: Option<NumericRange>,
        relation: SetRelation,
    ) -> &mut Self {
        let mut column = self.column_builder(column_type);
        column.set_numeric_range(range, relation);
        self.add(label, column.build())
    }

    fn rename_tags(&mut self, old_label: &str, new_label: &str) {
        let touches_tags = self.tags.get().iter().any(|(label, tags)| {
            label == old_label
                || tags.iter().any(|tag| {
                    tag.as_reference()
                        .is_some_and(|reference| reference.column() == Some(old_label))
                })
        });
        if !touches_tags {
            return;
        }
        let tags = self.tags.to_mut();
        if let Some(moved) = tags.remove(old_label) {
            tags.insert(new_label.to_owned(), moved);
        }
        for list in tags.values_mut() {
            for tag in list.iter_mut() {
                if let ColumnTag::Reference(reference) = tag
                    && let Some(renamed) = reference.renamed(old_label, new_label)
                {
                    *reference = renamed;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnQuery as _;
    use crate::config::{MetadataSettings, SharedSettings};
    use crate::table::tags::{ColumnReference, ColumnRole};
    use std::sync::Arc;

    fn settings(max_columns: usize) -> Settings {
        Arc::new(MetadataSettings {
            max_columns,
            max_nominal_values: 10,
        })
    }

    #[test]
    fn test_builder_shares_until_first_mutation() {
        let mut builder = TableBuilder::new(UncertainCount::equal(3));
        builder.add_nominal("a", ["x"], SetRelation::Equal);
        let snapshot = builder.build();

        let untouched = snapshot.to_builder();
        assert!(!untouched.owns_column_data());
        assert!(!untouched.owns_tag_data());
        let copy = untouched.build();
        assert!(copy.shares_columns_with(&snapshot));
        assert!(copy.shares_tags_with(&snapshot));

        let mut builder = snapshot.to_builder();
        builder.add_nominal("b", ["y"], SetRelation::Equal);
        assert!(builder.owns_column_data());
        assert!(!builder.owns_tag_data(), "no tag was edited");
        let changed = builder.build();
        assert_eq!(snapshot.column_count(), 1, "source snapshot is unchanged");
        assert_eq!(changed.column_count(), 2);
        assert!(changed.shares_tags_with(&snapshot));
    }

    #[test]
    fn test_tag_edit_copies_tags_once() -> Result<()> {
        let mut builder = TableBuilder::new(UncertainCount::equal(3));
        builder.add_nominal("a", ["x"], SetRelation::Equal);
        builder.add_tag("a", ColumnTag::Role(ColumnRole::Label))?;
        let snapshot = builder.build();

        let mut builder = snapshot.to_builder();
        builder.remove_tag("a", &ColumnTag::Role(ColumnRole::Id));
        assert!(!builder.owns_tag_data(), "removing an absent tag changes nothing");
        builder.add_tag("a", ColumnTag::Annotation("checked".to_owned()))?;
        assert!(builder.owns_tag_data());
        assert!(!builder.owns_column_data());
        let edited = builder.build();

        assert_eq!(snapshot.tags("a").len(), 1);
        assert_eq!(edited.tags("a").len(), 2);
        Ok(())
    }

    #[test]
    fn test_column_cap_rejects_new_labels() {
        crate::logging::init_for_tests();
        let mut builder = TableBuilder::new(UncertainCount::equal(1)).with_settings(settings(2));
        builder
            .add_real("a", None, SetRelation::Equal)
            .add_real("b", None, SetRelation::Equal)
            .add_real("c", None, SetRelation::Equal);
        assert_eq!(builder.column_count(), 2);
        assert_eq!(builder.column_set_relation(), SetRelation::Superset);
        assert_eq!(builder.contains("c"), EpistemicBool::Unknown);

        builder.add_integer("a", NumericRange::new(0.0, 1.0), SetRelation::Equal);
        assert_eq!(
            builder.column("a").and_then(|c| c.column_type()),
            Some(ColumnType::Integer),
            "existing labels may always be replaced"
        );
    }

    #[test]
    fn test_column_cap_is_read_at_insertion() {
        let shared = SharedSettings::new(MetadataSettings {
            max_columns: 1,
            max_nominal_values: 10,
        });
        let mut builder = TableBuilder::new(UncertainCount::equal(1)).with_settings(shared.handle());
        builder.add_real("a", None, SetRelation::Equal);
        shared.set_max_columns(3);
        builder.add_real("b", None, SetRelation::Equal);
        assert_eq!(builder.column_count(), 2);
        assert_eq!(builder.column_set_relation(), SetRelation::Equal);
    }

    #[test]
    fn test_nominal_cap_comes_from_settings() {
        let mut builder = TableBuilder::new(UncertainCount::equal(1)).with_settings(Arc::new(
            MetadataSettings {
                max_columns: 10,
                max_nominal_values: 3,
            },
        ));
        builder.add_nominal("a", ["p", "q", "r", "s"], SetRelation::Equal);
        let table = builder.build();
        let column = table.column("a").expect("tracked");
        assert!(column.dictionary().was_truncated());
        assert_eq!(column.value_set_relation(), SetRelation::Superset);
    }

    #[test]
    fn test_update_column_applies_configured_cap() -> Result<()> {
        let mut builder = TableBuilder::new(UncertainCount::equal(1)).with_settings(Arc::new(
            MetadataSettings {
                max_columns: 10,
                max_nominal_values: 3,
            },
        ));
        builder.add_nominal("a", ["p"], SetRelation::Equal);
        let snapshot = builder.column("a").expect("tracked").clone();
        assert_eq!(
            snapshot.to_builder().max_nominal_values(),
            crate::config::DEFAULT_MAX_NOMINAL_VALUES
        );

        builder.update_column("a", |column| {
            assert_eq!(column.max_nominal_values(), 3);
            column.add_dictionary_values(["q", "r", "s"]);
        })?;
        let column = builder.column("a").expect("tracked");
        assert!(column.dictionary().was_truncated());
        Ok(())
    }

    #[test]
    fn test_remove_keep_only() {
        let mut builder = TableBuilder::new(UncertainCount::equal(1));
        for label in ["a", "b", "c", "d"] {
            builder.add_real(label, None, SetRelation::Equal);
        }
        builder.remove("b").remove_all(["c", "zzz"]);
        assert_eq!(builder.labels().collect::<Vec<_>>(), vec!["a", "d"]);
        builder.keep_only(["d"]);
        assert_eq!(builder.labels().collect::<Vec<_>>(), vec!["d"]);
    }

    #[test]
    fn test_remove_drops_tags() -> Result<()> {
        let mut builder = TableBuilder::new(UncertainCount::equal(1));
        builder.add_real("a", None, SetRelation::Equal);
        builder.add_tag("a", ColumnTag::Role(ColumnRole::Weight))?;
        builder.remove("a");
        builder.add_real("a", None, SetRelation::Equal);
        assert!(builder.tags("a").is_empty());
        Ok(())
    }

    #[test]
    fn test_rename_moves_tags_and_rewrites_references() -> Result<()> {
        let mut builder = TableBuilder::new(UncertainCount::equal(5));
        builder
            .add_nominal("prediction", ["yes", "no"], SetRelation::Equal)
            .add_real("score", NumericRange::new(0.0, 1.0), SetRelation::Equal);
        builder.add_tag("prediction", ColumnTag::Role(ColumnRole::Prediction))?;
        builder.add_tag(
            "score",
            ColumnTag::Reference(ColumnReference::new(
                Some("prediction".to_owned()),
                Some("yes".to_owned()),
            )),
        )?;

        builder.rename("prediction", "predicted")?;
        let table = builder.build();

        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["predicted", "score"]);
        assert_eq!(
            table.tags("predicted"),
            [ColumnTag::Role(ColumnRole::Prediction)]
        );
        let reference = table
            .tags("score")
            .iter()
            .find_map(ColumnTag::as_reference)
            .expect("reference survives");
        assert_eq!(reference.column(), Some("predicted"));
        assert_eq!(reference.value(), Some("yes"));
        Ok(())
    }

    #[test]
    fn test_rename_errors() {
        let mut builder = TableBuilder::new(UncertainCount::equal(1));
        builder
            .add_real("a", None, SetRelation::Equal)
            .add_real("b", None, SetRelation::Equal);
        assert!(matches!(
            builder.rename("missing", "c"),
            Err(MetadataError::NoSuchColumn(_))
        ));
        assert!(matches!(
            builder.rename("a", "b"),
            Err(MetadataError::DuplicateLabel(_))
        ));
        assert!(builder.rename("a", "a").is_ok());
    }

    #[test]
    fn test_update_column() -> Result<()> {
        let mut builder = TableBuilder::new(UncertainCount::equal(8));
        builder.add_nominal("a", ["x"], SetRelation::Equal);
        builder.update_column("a", |column| {
            column
                .add_dictionary_values(["y"])
                .set_missing_values(UncertainCount::equal(2));
        })?;
        let column = builder.column("a").expect("tracked");
        assert_eq!(column.dictionary().len(), 2);
        assert_eq!(column.missing_values(), UncertainCount::equal(2));

        assert!(matches!(
            builder.update_column("zzz", |_| {}),
            Err(MetadataError::NoSuchColumn(_))
        ));

        let failed = builder.try_update_column("a", |column| {
            column.set_boolean_dictionary_values(Some("t".to_owned()), Some("t".to_owned()))?;
            Ok(())
        });
        assert!(failed.is_err());
        assert!(
            !builder.column("a").expect("tracked").dictionary().is_boolean(),
            "failed edits are discarded"
        );
        Ok(())
    }

    #[test]
    fn test_typed_adders() -> Result<()> {
        let mut builder = TableBuilder::new(UncertainCount::equal(1));
        builder.add_boolean("flag", Some("1".to_owned()), Some("0".to_owned()))?;
        builder.add_object("seen", ColumnType::Date, None, SetRelation::Equal)?;
        let table = builder.build();
        assert_eq!(
            table.column("flag").map(|c| c.is_at_most_bicategorical()),
            Some(EpistemicBool::Yes)
        );
        assert_eq!(
            table.column("seen").map(|c| c.is_object()),
            Some(EpistemicBool::Yes)
        );
        Ok(())
    }

    #[test]
    fn test_add_with_tags_respects_cap() {
        let mut builder = TableBuilder::new(UncertainCount::equal(1)).with_settings(settings(1));
        builder.add_with_tags(
            "a",
            ColumnSnapshot::of_type(ColumnType::Real),
            [ColumnTag::Role(ColumnRole::Id)],
        );
        builder.add_with_tags(
            "b",
            ColumnSnapshot::of_type(ColumnType::Real),
            [ColumnTag::Role(ColumnRole::Id)],
        );
        assert_eq!(builder.tags("a").len(), 1);
        assert!(builder.tags("b").is_empty(), "rejected columns get no tags");
    }
}
