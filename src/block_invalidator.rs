use crate::{
    dirty_set::DirtySet,
    kernel::{BlockId, DeclareId, RaKernel, VarId},
    liveness::{LivenessFamily, LivenessOracle},
    registry::VariableRegistry,
    utils::index_set::{IndexSet, KeyIndex},
};

/// Blocks whose interference contribution has to be recomputed this iteration. Every other
/// block keeps the edges computed earlier.
#[derive(Clone, Default, Debug)]
pub struct PerBlockValidity {
    update_intf_for_bb: IndexSet<BlockId>,
    valid: bool,
}

impl PerBlockValidity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all<K: RaKernel>(kernel: &K) -> Self {
        Self {
            update_intf_for_bb: kernel.block_ids().iter().copied().collect(),
            valid: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn needs_update(&self, bb: BlockId) -> bool {
        self.update_intf_for_bb.contains(&bb)
    }

    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.update_intf_for_bb.iter()
    }

    pub fn len(&self) -> usize {
        self.update_intf_for_bb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.update_intf_for_bb.is_empty()
    }

    pub fn invalidate(&mut self) {
        self.update_intf_for_bb.clear();
        self.valid = false;
    }

    fn insert(&mut self, bb: BlockId) -> bool {
        self.update_intf_for_bb.insert(bb)
    }
}

/// A variable's edges can only change in `bb` if it is live into the block with a reaching
/// definition, live out of it with a reaching definition, or killed inside it.
fn intf_may_change<L: LivenessOracle>(liveness: &L, bb: BlockId, var: VarId) -> bool {
    let test = |family| liveness.set(family, bb).test(var.index());

    (test(LivenessFamily::UseIn) && test(LivenessFamily::DefIn))
        || (test(LivenessFamily::UseOut) && test(LivenessFamily::DefOut))
        || test(LivenessFamily::UseKill)
}

/// Computes the blocks the interference builder has to redo for `dirty`. `excised` holds the
/// variables spilled by the previous iteration.
///
/// An empty dirty set means nothing is known about the previous graph, so every block is
/// returned.
pub fn collect_blocks<K: RaKernel, L: LivenessOracle>(
    kernel: &K,
    registry: &VariableRegistry,
    dirty: &DirtySet,
    excised: &[DeclareId],
    liveness: &L,
) -> PerBlockValidity {
    if dirty.is_empty() {
        return PerBlockValidity::all(kernel);
    }

    let mut scope = PerBlockValidity::new();
    let mut intf_candidates = Vec::new();

    for dcl in dirty.iter() {
        // Spill temps are almost always block local, and locality is known up front.
        if let Some(bb) = kernel.block_local(dcl) {
            scope.insert(bb);
            continue;
        }

        // Removing a spilled or preassigned variable from its neighbors is enough, the blocks
        // it was live in don't need to be redone.
        if kernel.is_spilled(dcl) || excised.contains(&dcl) || kernel.phy_reg(dcl).is_some() {
            continue;
        }

        if let Some(id) = registry.id_of(dcl) {
            debug_assert!(liveness.is_partaker(id), "expecting RA candidate");
            intf_candidates.push(id);
        }
    }

    if !intf_candidates.is_empty() {
        for &bb in kernel.block_ids() {
            if scope.needs_update(bb) {
                continue;
            }

            if intf_candidates
                .iter()
                .any(|&id| intf_may_change(liveness, bb, id))
            {
                scope.insert(bb);
            }
        }
    }

    log::debug!(
        "{} of {} blocks need interference update ({} dirty, {} global)",
        scope.len(),
        kernel.block_ids().len(),
        dirty.len(),
        intf_candidates.len()
    );

    scope.valid = true;
    scope
}
