use crate::cow::ValueSetView;
use crate::error::{MetadataError, Result};
use crate::facts::EpistemicBool;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Known values of a nominal column.
///
/// Cloning is cheap: the value set lives behind an `Arc` and clones share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryFact {
    values: Arc<BTreeSet<String>>,
    truncated: bool,
    boolean: Option<BooleanClasses>,
}

/// Class assignment of a boolean dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct BooleanClasses {
    positive: Option<String>,
    negative: Option<String>,
    known: bool,
}

impl Default for DictionaryFact {
    fn default() -> Self {
        Self::unknown()
    }
}

impl DictionaryFact {
    /// A dictionary about which nothing is known.
    pub fn unknown() -> Self {
        Self {
            values: Arc::default(),
            truncated: false,
            boolean: None,
        }
    }

    /// Collects the distinct values of `values`, capped by `max_values`.
    ///
    /// More than `max_values` distinct values keep only the first
    /// `max_values - 1` and mark the fact truncated.
    pub fn from_values<I, S>(values: I, max_values: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (values, truncated) = collect_capped(BTreeSet::new(), values, max_values);
        if truncated {
            log::warn!(
                "Nominal value cap of {max_values} reached; dictionary truncated to {} values",
                values.len()
            );
        }
        Self {
            values: Arc::new(values),
            truncated,
            boolean: None,
        }
    }

    /// A boolean dictionary with explicit classes; either class may be absent.
    ///
    /// # Errors
    ///
    /// Fails if both classes are present and equal.
    pub fn boolean(positive: Option<String>, negative: Option<String>) -> Result<Self> {
        if let (Some(p), Some(n)) = (&positive, &negative)
            && p == n
        {
            return Err(MetadataError::InvalidDictionary(format!(
                "positive and negative class are both '{p}'"
            )));
        }
        let values = positive.iter().chain(negative.iter()).cloned().collect();
        Ok(Self {
            values: Arc::new(values),
            truncated: false,
            boolean: Some(BooleanClasses {
                positive,
                negative,
                known: true,
            }),
        })
    }

    /// A dictionary known to be boolean whose classes are unknown.
    pub fn unknown_boolean() -> Self {
        Self {
            values: Arc::default(),
            truncated: false,
            boolean: Some(BooleanClasses {
                positive: None,
                negative: None,
                known: false,
            }),
        }
    }

    /// Adds `values` to the known ones, applying the same cap as [`Self::from_values`].
    ///
    /// The union is computed element by element in iteration order, so the
    /// kept values are deterministic for a stable source order. A boolean
    /// dictionary stays boolean only if no new value is added.
    #[must_use]
    pub fn union<I, S>(&self, values: I, max_values: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let existing: Vec<String> = self.values.iter().cloned().collect();
        let incoming: Vec<String> = values.into_iter().map(Into::into).collect();
        if self.boolean.is_some() && incoming.iter().all(|v| self.values.contains(v)) {
            return self.clone();
        }

        let (values, truncated) = collect_capped(
            BTreeSet::new(),
            existing.into_iter().chain(incoming),
            max_values,
        );
        if truncated {
            log::warn!(
                "Nominal value cap of {max_values} reached while adding values; dictionary truncated"
            );
        }
        Self {
            values: Arc::new(values),
            truncated: truncated || self.truncated,
            boolean: None,
        }
    }

    /// Rebuilds a dictionary from a copy-on-write view handed out by
    /// [`Self::as_copy_on_write_view`].
    ///
    /// An untouched view of this dictionary yields this very dictionary,
    /// sharing its value set. A modified view yields a plain dictionary over
    /// the modified values.
    #[must_use]
    pub fn from_view(&self, view: ValueSetView) -> Self {
        if let Some(original) = view.original()
            && Arc::ptr_eq(original, &self.values)
        {
            return self.clone();
        }
        Self {
            values: view.into_values(),
            truncated: false,
            boolean: None,
        }
    }

    /// A view over the value set that copies only when it is first mutated.
    pub fn as_copy_on_write_view(&self) -> ValueSetView {
        ValueSetView::new(Arc::clone(&self.values))
    }

    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }

    /// Whether both facts hold the same value-set object, not merely equal sets.
    pub fn shares_values_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn is_boolean(&self) -> bool {
        self.boolean.is_some()
    }

    pub fn positive(&self) -> Option<&str> {
        self.boolean.as_ref()?.positive.as_deref()
    }

    pub fn negative(&self) -> Option<&str> {
        self.boolean.as_ref()?.negative.as_deref()
    }

    /// Whether a positive class exists; `Unknown` for non-boolean or unknown boolean dictionaries.
    pub fn has_positive(&self) -> EpistemicBool {
        match &self.boolean {
            Some(classes) if classes.known => EpistemicBool::from_bool(classes.positive.is_some()),
            _ => EpistemicBool::Unknown,
        }
    }

    /// Whether a negative class exists; `Unknown` for non-boolean or unknown boolean dictionaries.
    pub fn has_negative(&self) -> EpistemicBool {
        match &self.boolean {
            Some(classes) if classes.known => EpistemicBool::from_bool(classes.negative.is_some()),
            _ => EpistemicBool::Unknown,
        }
    }
}

/// Extends `target` with the distinct values of `source` until more than
/// `max_values` would be held; returns the set and whether it was cut short.
fn collect_capped<I, S>(
    mut target: BTreeSet<String>,
    source: I,
    max_values: usize,
) -> (BTreeSet<String>, bool)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keep = max_values.saturating_sub(1);
    let mut kept_in_order: Vec<String> = Vec::new();
    for value in source {
        let value = value.into();
        if target.contains(&value) {
            continue;
        }
        if target.len() == max_values {
            // one distinct value too many: fall back to the first `max - 1`
            for extra in kept_in_order.iter().skip(keep) {
                target.remove(extra);
            }
            return (target, true);
        }
        kept_in_order.push(value.clone());
        target.insert(value);
    }
    (target, false)
}
