use std::collections::HashMap;

use crate::{
    kernel::{DeclareId, RaKernel, VarId},
    live_range::LiveRange,
    reg_file::{liveness_class, RegFile},
    utils::index_set::KeyIndex,
};

/// Owns the live ranges of the current allocation context.
///
/// Live ranges form an append-only arena: the live range of variable `v` sits at position
/// `v.0`, ids are handed out gap-free in registration order and never reused. Declarations
/// removed from the kernel keep their slot, so a removed variable's id stays a valid index.
#[derive(Default)]
pub struct VariableRegistry {
    lrs: Vec<LiveRange>,
    ids: HashMap<DeclareId, VarId>,
    /// Ids observed in earlier iterations, kept across resets.
    prev_ids: HashMap<DeclareId, VarId>,
    max_var_idx: Option<VarId>,
    /// Number of kernel declarations already looked at.
    max_dcl_id: usize,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every live range. Declarations below `seen_declares` count as already looked at.
    pub fn clear(&mut self, seen_declares: usize) {
        self.lrs.clear();
        self.ids.clear();
        self.max_dcl_id = seen_declares;
    }

    /// Creates the live range of `dcl`. Returns the existing id if `dcl` already has one and
    /// `None` if liveness numbering didn't give it an id.
    pub fn create<K: RaKernel>(&mut self, kernel: &K, dcl: DeclareId) -> Option<VarId> {
        if let Some(&id) = self.ids.get(&dcl) {
            return Some(id);
        }

        let id = kernel.var_id(dcl)?;
        debug_assert_eq!(
            id.index(),
            self.lrs.len(),
            "mismatch in lr index and regvar id for {}",
            kernel.name(dcl)
        );

        self.lrs
            .push(LiveRange::new(id, dcl, kernel.is_partial(dcl)));
        self.ids.insert(dcl, id);
        Some(id)
    }

    /// Creates live ranges for every eligible declaration of the kernel, in declaration order.
    pub fn populate<K: RaKernel>(&mut self, kernel: &K, rf: RegFile) {
        for &dcl in kernel.declares() {
            if kernel.alias_of(dcl).is_some() || !liveness_class(kernel.reg_file(dcl), rf) {
                continue;
            }
            self.create(kernel, dcl);
        }
        self.max_dcl_id = kernel.declares().len();
    }

    /// Declarations created since the last time the kernel was looked at.
    pub fn new_declares<'k, K: RaKernel>(&self, kernel: &'k K) -> &'k [DeclareId] {
        kernel.declares().get(self.max_dcl_id..).unwrap_or(&[])
    }

    pub fn mark_declares_seen<K: RaKernel>(&mut self, kernel: &K) {
        self.max_dcl_id = kernel.declares().len();
    }

    pub fn max_dcl_id(&self) -> usize {
        self.max_dcl_id
    }

    pub fn len(&self) -> usize {
        self.lrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lrs.is_empty()
    }

    pub fn get(&self, id: VarId) -> Option<&LiveRange> {
        self.lrs.get(id.index())
    }

    pub fn get_mut(&mut self, id: VarId) -> Option<&mut LiveRange> {
        self.lrs.get_mut(id.index())
    }

    pub fn id_of(&self, dcl: DeclareId) -> Option<VarId> {
        self.ids.get(&dcl).copied()
    }

    pub fn live_ranges(&self) -> &[LiveRange] {
        &self.lrs
    }

    pub fn live_ranges_mut(&mut self) -> &mut [LiveRange] {
        &mut self.lrs
    }

    pub fn record_var_id(&mut self, dcl: DeclareId, id: VarId) {
        self.prev_ids.insert(dcl, id);
        self.max_var_idx = self.max_var_idx.max(Some(id));
    }

    pub fn id_from_prev_iter(&self, dcl: DeclareId) -> Option<VarId> {
        self.prev_ids.get(&dcl).copied()
    }

    pub fn max_var_idx(&self) -> Option<VarId> {
        self.max_var_idx
    }

    /// Remembers the id of every live range for the next iteration.
    pub fn record_current_ids(&mut self) {
        for lr in &self.lrs {
            self.prev_ids.insert(lr.dcl(), lr.id());
            self.max_var_idx = self.max_var_idx.max(Some(lr.id()));
        }
    }
}
