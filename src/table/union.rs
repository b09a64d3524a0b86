//! Column-wise union of two tables.

use super::builder::TableBuilder;
use super::snapshot::TableSnapshot;
use super::tags::insert_tag;

impl TableBuilder {
    /// Appends the columns of `other` after the current ones.
    ///
    /// A label that is already taken is skipped when `postfix` is `None`;
    /// otherwise `postfix` is appended until the label is free, so `x`
    /// becomes `x_2`, or `x_2_2` if `x_2` is taken too. Tags move along under
    /// the new label. The height stays; the column-set relations are merged.
    pub fn append(&mut self, other: &TableSnapshot, postfix: Option<&str>) -> &mut Self {
        for (label, column) in other {
            let target = match postfix {
                _ if !self.columns.get().contains(label) => label.to_owned(),
                None => {
                    log::debug!("Union skips column '{label}': label already taken");
                    continue;
                }
                Some("") => {
                    log::warn!("Union cannot rename '{label}' with an empty postfix");
                    continue;
                }
                Some(postfix) => free_label(self, label, postfix),
            };
            let tags = other.tags(label);
            self.add(target.clone(), column.clone());
            if !tags.is_empty() && self.columns.get().contains(&target) {
                let list = self.tags.to_mut().entry(target).or_default();
                for tag in tags {
                    insert_tag(list, tag.clone());
                }
            }
        }
        self.merge_column_set_relation(other.column_set_relation());
        self
    }
}

impl TableSnapshot {
    /// Union of this table's columns with those of `other`.
    ///
    /// See [`TableBuilder::append`] for collision handling.
    #[must_use]
    pub fn union(&self, other: &Self, postfix: Option<&str>) -> Self {
        let mut builder = self.to_builder();
        builder.append(other, postfix);
        builder.build()
    }
}

fn free_label(builder: &TableBuilder, label: &str, postfix: &str) -> String {
    let mut candidate = format!("{label}{postfix}");
    while builder.columns.get().contains(&candidate) {
        candidate.push_str(postfix);
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{SetRelation, UncertainCount};
    use crate::table::tags::{ColumnRole, ColumnTag};

    fn table(labels: &[&str]) -> TableSnapshot {
        let mut builder = TableBuilder::new(UncertainCount::equal(4));
        for label in labels {
            builder.add_real(*label, None, SetRelation::Equal);
        }
        builder.build()
    }

    #[test]
    fn test_union_without_postfix_skips_collisions() {
        let union = table(&["x", "y"]).union(&table(&["y", "z"]), None);
        assert_eq!(union.labels().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_union_postfix_retries_until_free() {
        let union = table(&["x", "x_2"]).union(&table(&["x"]), Some("_2"));
        assert_eq!(
            union.labels().collect::<Vec<_>>(),
            vec!["x", "x_2", "x_2_2"]
        );
    }

    #[test]
    fn test_union_copies_tags_under_new_label() -> crate::error::Result<()> {
        let mut right = TableBuilder::new(UncertainCount::equal(4));
        right.add_real("x", None, SetRelation::Equal);
        right.add_tag("x", ColumnTag::Role(ColumnRole::Weight))?;
        let union = table(&["x"]).union(&right.build(), Some("_r"));
        assert!(union.tags("x").is_empty());
        assert_eq!(union.tags("x_r"), [ColumnTag::Role(ColumnRole::Weight)]);
        Ok(())
    }

    #[test]
    fn test_union_keeps_left_height_and_merges_relations() {
        let left = table(&["a"]);
        let mut right = TableBuilder::new(UncertainCount::equal(99));
        right
            .add_real("b", None, SetRelation::Equal)
            .merge_column_set_relation(SetRelation::Superset);
        let union = left.union(&right.build(), None);
        assert_eq!(union.height(), UncertainCount::equal(4));
        assert_eq!(union.column_set_relation(), SetRelation::Superset);
    }
}
