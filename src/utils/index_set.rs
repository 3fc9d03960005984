use std::{fmt::Debug, marker::PhantomData};

use super::sparse_bitvector::SparseBitVector;

/// Something that can be used as a dense integer key.
pub trait KeyIndex: Copy {
    fn index(&self) -> usize;
    fn from_index(index: usize) -> Self;
}

/// A set of dense keys backed by a bit vector.
pub struct IndexSet<T: KeyIndex> {
    set: SparseBitVector,
    marker: PhantomData<T>,
}

impl<T: KeyIndex> Default for IndexSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: KeyIndex> Clone for IndexSet<T> {
    fn clone(&self) -> Self {
        Self {
            set: self.set.clone(),
            marker: PhantomData,
        }
    }
}

impl<T: KeyIndex> PartialEq for IndexSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.set == other.set
    }
}

impl<T: KeyIndex> Eq for IndexSet<T> {}

impl<T: KeyIndex> IndexSet<T> {
    pub fn new() -> Self {
        Self {
            set: SparseBitVector::new(),
            marker: PhantomData,
        }
    }

    pub fn insert(&mut self, value: T) -> bool {
        !self.set.set(value.index())
    }

    pub fn remove(&mut self, value: &T) -> bool {
        self.set.reset(value.index())
    }

    pub fn contains(&self, value: &T) -> bool {
        self.set.test(value.index())
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn len(&self) -> usize {
        self.set.count()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.set.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.indices().map(T::from_index)
    }
}

impl<T: KeyIndex> FromIterator<T> for IndexSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T: KeyIndex + Debug> Debug for IndexSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
