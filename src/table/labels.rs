use serde::ser::{Serialize, SerializeMap as _, Serializer};
use std::collections::HashMap;

/// Iterator over `(label, value)` pairs in declaration order.
pub type Iter<'a, V> = std::iter::Map<std::slice::Iter<'a, (String, V)>, EntryRef<V>>;

type EntryRef<V> = fn(&(String, V)) -> (&str, &V);

/// Label-keyed map that iterates in insertion (declaration) order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for LabelMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> LabelMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<&V> {
        let position = *self.index.get(label)?;
        self.entries.get(position).map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut V> {
        let position = *self.index.get(label)?;
        self.entries.get_mut(position).map(|(_, value)| value)
    }

    /// Inserts or replaces; a replaced entry keeps its position.
    pub fn insert(&mut self, label: impl Into<String>, value: V) -> Option<V> {
        let label = label.into();
        if let Some(slot) = self
            .index
            .get(&label)
            .and_then(|&position| self.entries.get_mut(position))
        {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.index.insert(label.clone(), self.entries.len());
        self.entries.push((label, value));
        None
    }

    pub fn remove(&mut self, label: &str) -> Option<V> {
        let position = self.index.remove(label)?;
        if position >= self.entries.len() {
            return None;
        }
        let (_, value) = self.entries.remove(position);
        self.reindex_from(position);
        Some(value)
    }

    /// Moves the entry of `old_label` to `new_label`, keeping its position.
    ///
    /// Returns `false` if `old_label` is absent or `new_label` is taken.
    pub fn rename(&mut self, old_label: &str, new_label: &str) -> bool {
        if self.index.contains_key(new_label) {
            return false;
        }
        let Some(position) = self.index.remove(old_label) else {
            return false;
        };
        if let Some(entry) = self.entries.get_mut(position) {
            entry.0 = new_label.to_owned();
        }
        self.index.insert(new_label.to_owned(), position);
        true
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &V) -> bool,
    {
        self.entries.retain(|(label, value)| keep(label, value));
        self.reindex_from(0);
    }

    pub fn iter(&self) -> Iter<'_, V> {
        self.entries.iter().map(entry_ref as EntryRef<V>)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, value)| value)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    fn reindex_from(&mut self, start: usize) {
        if start == 0 {
            self.index.clear();
        }
        for (position, (label, _)) in self.entries.iter().enumerate().skip(start) {
            self.index.insert(label.clone(), position);
        }
    }
}

fn entry_ref<V>(entry: &(String, V)) -> (&str, &V) {
    (entry.0.as_str(), &entry.1)
}

impl<'a, V> IntoIterator for &'a LabelMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Serialize> Serialize for LabelMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for LabelMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (label, value) in iter {
            map.insert(label, value);
        }
        map
    }
}
