//! Per-column tags: roles, references to other columns, free annotations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a column plays in downstream processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    Label,
    Id,
    Prediction,
    Score,
    Weight,
    Outlier,
    Cluster,
    Source,
    Metadata,
    Batch,
}

impl ColumnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Id => "id",
            Self::Prediction => "prediction",
            Self::Score => "score",
            Self::Weight => "weight",
            Self::Outlier => "outlier",
            Self::Cluster => "cluster",
            Self::Source => "source",
            Self::Metadata => "metadata",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points from one column to another column by label, optionally to one of its values.
///
/// A score column, for instance, references the prediction column and the
/// class value it scores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnReference {
    column: Option<String>,
    value: Option<String>,
}

impl ColumnReference {
    pub fn new(column: Option<String>, value: Option<String>) -> Self {
        Self { column, value }
    }

    pub fn to_column(column: impl Into<String>) -> Self {
        Self::new(Some(column.into()), None)
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Same reference pointing at `new_label` if it pointed at `old_label`.
    pub(crate) fn renamed(&self, old_label: &str, new_label: &str) -> Option<Self> {
        (self.column.as_deref() == Some(old_label)).then(|| Self {
            column: Some(new_label.to_owned()),
            value: self.value.clone(),
        })
    }
}

/// Discriminant of [`ColumnTag`], used to query tags by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    Role,
    Reference,
    Annotation,
}

/// Opaque metadata attached to a column of a table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnTag {
    Role(ColumnRole),
    Reference(ColumnReference),
    Annotation(String),
}

impl ColumnTag {
    pub fn kind(&self) -> TagKind {
        match self {
            Self::Role(_) => TagKind::Role,
            Self::Reference(_) => TagKind::Reference,
            Self::Annotation(_) => TagKind::Annotation,
        }
    }

    pub fn as_reference(&self) -> Option<&ColumnReference> {
        match self {
            Self::Reference(reference) => Some(reference),
            Self::Role(_) | Self::Annotation(_) => None,
        }
    }
}

impl TagKind {
    /// Kinds a column carries at most once; adding another replaces the old one.
    pub fn is_unique_per_column(self) -> bool {
        match self {
            Self::Role | Self::Reference => true,
            Self::Annotation => false,
        }
    }
}

/// Adds `tag` to `tags`, honouring per-column uniqueness of its kind.
pub(crate) fn insert_tag(tags: &mut Vec<ColumnTag>, tag: ColumnTag) {
    let kind = tag.kind();
    if kind.is_unique_per_column() {
        tags.retain(|existing| existing.kind() != kind);
    } else if tags.contains(&tag) {
        return;
    }
    tags.push(tag);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_kinds_replace() {
        let mut tags = Vec::new();
        insert_tag(&mut tags, ColumnTag::Role(ColumnRole::Label));
        insert_tag(&mut tags, ColumnTag::Role(ColumnRole::Id));
        assert_eq!(tags, vec![ColumnTag::Role(ColumnRole::Id)]);
    }

    #[test]
    fn test_annotations_accumulate_without_duplicates() {
        let mut tags = Vec::new();
        insert_tag(&mut tags, ColumnTag::Annotation("unit: kg".to_owned()));
        insert_tag(&mut tags, ColumnTag::Annotation("source: scale".to_owned()));
        insert_tag(&mut tags, ColumnTag::Annotation("unit: kg".to_owned()));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_reference_rename() {
        let reference = ColumnReference::new(Some("a".to_owned()), Some("yes".to_owned()));
        let renamed = reference.renamed("a", "b").expect("points at a");
        assert_eq!(renamed.column(), Some("b"));
        assert_eq!(renamed.value(), Some("yes"));
        assert!(reference.renamed("x", "y").is_none());
    }
}
