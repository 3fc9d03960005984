use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{
    kernel::{BlockId, VarId},
    utils::{index_set::KeyIndex, sparse_bitvector::SparseBitVector},
};

/// The six per-block bit-vector families computed by liveness analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum LivenessFamily {
    DefIn,
    DefOut,
    UseIn,
    UseOut,
    UseGen,
    UseKill,
}

impl LivenessFamily {
    const COUNT: usize = 6;

    fn slot(self) -> usize {
        self as usize
    }
}

/// Per basic block liveness, indexed by variable id.
pub trait LivenessOracle {
    fn set(&self, family: LivenessFamily, block: BlockId) -> &SparseBitVector;
    fn num_selected_vars(&self) -> usize;
    fn is_partaker(&self, var: VarId) -> bool;
}

/// A plain store of the six families, one bit-vector per block. Used by callers that compute
/// liveness themselves and as the snapshot kept for verification.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct BlockLiveness {
    families: [Vec<SparseBitVector>; LivenessFamily::COUNT],
    num_selected_vars: usize,
    empty: SparseBitVector,
}

impl BlockLiveness {
    pub fn new(num_blocks: usize, num_selected_vars: usize) -> Self {
        Self {
            families: std::array::from_fn(|_| vec![SparseBitVector::new(); num_blocks]),
            num_selected_vars,
            empty: SparseBitVector::new(),
        }
    }

    /// Deep copies every family of `oracle` for `blocks`.
    pub fn capture<L: LivenessOracle + ?Sized>(oracle: &L, blocks: &[BlockId]) -> Self {
        let num_blocks = blocks.iter().map(|bb| bb.index() + 1).max().unwrap_or(0);
        let mut snapshot = Self::new(num_blocks, oracle.num_selected_vars());

        for family in LivenessFamily::iter() {
            for &bb in blocks {
                *snapshot.set_mut(family, bb) = oracle.set(family, bb).clone();
            }
        }

        snapshot
    }

    pub fn set_mut(&mut self, family: LivenessFamily, block: BlockId) -> &mut SparseBitVector {
        let sets = &mut self.families[family.slot()];
        if block.index() >= sets.len() {
            sets.resize(block.index() + 1, SparseBitVector::new());
        }
        &mut sets[block.index()]
    }

    pub fn set_num_selected_vars(&mut self, num_selected_vars: usize) {
        self.num_selected_vars = num_selected_vars;
    }

    pub fn num_blocks(&self) -> usize {
        self.families[0].len()
    }
}

impl LivenessOracle for BlockLiveness {
    fn set(&self, family: LivenessFamily, block: BlockId) -> &SparseBitVector {
        self.families[family.slot()]
            .get(block.index())
            .unwrap_or(&self.empty)
    }

    fn num_selected_vars(&self) -> usize {
        self.num_selected_vars
    }

    fn is_partaker(&self, var: VarId) -> bool {
        var.index() < self.num_selected_vars
    }
}
