//! Copy-on-write containers shared between snapshots and their editors.
//!
//! Snapshots are immutable and hand their collections out behind an [`Arc`].
//! Whoever wants to edit such a collection wraps it in a [`CopyOnWrite`]:
//! reads go straight to the shared value, the first mutable access makes one
//! deep copy, and from then on the wrapper owns its data and never touches the
//! snapshot again.
//!
//! [`ValueSetView`] is the value-set flavour handed to the legacy converter. It
//! remembers whether it was ever mutated so that converting back can reuse the
//! original dictionary instead of rebuilding it.

use std::collections::BTreeSet;
use std::sync::Arc;

/// A value that is either shared with a snapshot or owned after the first write.
#[derive(Debug, Clone)]
pub struct CopyOnWrite<T> {
    value: Arc<T>,
    owned: bool,
}

impl<T: Clone> CopyOnWrite<T> {
    pub fn shared(value: Arc<T>) -> Self {
        Self {
            value,
            owned: false,
        }
    }

    pub fn owned(value: T) -> Self {
        Self {
            value: Arc::new(value),
            owned: true,
        }
    }

    /// Zero-copy read access.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutable access; deep-copies a shared value exactly once.
    pub fn to_mut(&mut self) -> &mut T {
        if !self.owned {
            log::trace!("copy-on-write: detaching from shared storage");
            self.value = Arc::new(T::clone(&self.value));
            self.owned = true;
        }
        Arc::make_mut(&mut self.value)
    }

    /// Whether the first write already happened.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// The shared value, while no write has happened yet.
    pub fn shared_ref(&self) -> Option<&Arc<T>> {
        (!self.owned).then_some(&self.value)
    }

    /// Freezes the content into an `Arc`, reusing the shared one when untouched.
    pub fn into_shared(self) -> Arc<T> {
        self.value
    }
}

impl<T: Clone + Default> Default for CopyOnWrite<T> {
    fn default() -> Self {
        Self::owned(T::default())
    }
}

/// Copy-on-write view over a dictionary's value set.
///
/// Reads are views over the dictionary's own set. Any mutating call detaches
/// the view permanently, even when the mutation turns out to be a no-op
/// (e.g. removing a value that is not present).
#[derive(Debug, Clone)]
pub struct ValueSetView {
    values: CopyOnWrite<BTreeSet<String>>,
}

impl ValueSetView {
    pub fn new(values: Arc<BTreeSet<String>>) -> Self {
        Self {
            values: CopyOnWrite::shared(values),
        }
    }

    pub fn values(&self) -> &BTreeSet<String> {
        self.values.get()
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().contains(value)
    }

    pub fn iter(&self) -> std::collections::btree_set::Iter<'_, String> {
        self.values().iter()
    }

    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.values.to_mut().insert(value.into())
    }

    pub fn remove(&mut self, value: &str) -> bool {
        self.values.to_mut().remove(value)
    }

    pub fn clear(&mut self) {
        self.values.to_mut().clear();
    }

    /// Removes every value the predicate rejects (the iterator-remove of the view).
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&String) -> bool,
    {
        self.values.to_mut().retain(keep);
    }

    /// Whether any mutating call detached this view from its dictionary.
    pub fn is_modified(&self) -> bool {
        self.values.is_owned()
    }

    /// The dictionary's set, as long as the view was never modified.
    pub fn original(&self) -> Option<&Arc<BTreeSet<String>>> {
        self.values.shared_ref()
    }

    pub fn into_values(self) -> Arc<BTreeSet<String>> {
        self.values.into_shared()
    }
}

impl<'a> IntoIterator for &'a ValueSetView {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
