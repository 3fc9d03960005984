use indexmap::IndexSet;

use crate::kernel::DeclareId;

/// Declarations whose interference edges can't be trusted any more and have to be rebuilt.
#[derive(Clone, Default, Debug)]
pub struct DirtySet {
    dcls: IndexSet<DeclareId>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dcl: DeclareId) -> bool {
        self.dcls.insert(dcl)
    }

    pub fn remove(&mut self, dcl: DeclareId) -> bool {
        self.dcls.shift_remove(&dcl)
    }

    pub fn contains(&self, dcl: DeclareId) -> bool {
        self.dcls.contains(&dcl)
    }

    pub fn len(&self) -> usize {
        self.dcls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dcls.is_empty()
    }

    pub fn clear(&mut self) {
        self.dcls.clear();
    }

    /// Moves everything out, leaving the set empty.
    pub fn take(&mut self) -> DirtySet {
        std::mem::take(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = DeclareId> + '_ {
        self.dcls.iter().copied()
    }
}

impl Extend<DeclareId> for DirtySet {
    fn extend<I: IntoIterator<Item = DeclareId>>(&mut self, iter: I) {
        self.dcls.extend(iter);
    }
}
