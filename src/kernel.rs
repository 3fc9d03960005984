use std::fmt;

use crate::{reg_file::RegFile, utils::index_set::KeyIndex};

macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl KeyIndex for $name {
            fn index(&self) -> usize {
                self.0 as usize
            }

            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> Self {
                id.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

dense_id!(
    /// Identity of a declaration in the kernel's declaration list. Never reused.
    DeclareId,
    "dcl"
);
dense_id!(
    /// Dense register allocation id of a variable. Indexes live ranges, liveness bit-vectors and
    /// the interference graph.
    VarId,
    "v"
);
dense_id!(BlockId, "BB");
dense_id!(
    /// Stable identity of an instruction. Rewriting an operand in place keeps the id.
    InstId,
    "i"
);
dense_id!(PhyReg, "r");

/// Per-kernel values that are live-out of the whole program by construction.
#[derive(Clone, Copy, Debug)]
pub struct Housekeeping {
    pub builtin_r0: DeclareId,
    pub has_scratch_surface: bool,
    pub spill_surface_offset: Option<DeclareId>,
    pub old_a0_dot2: Option<DeclareId>,
    pub spill_fill_header: DeclareId,
}

impl Housekeeping {
    pub fn iter(&self) -> impl Iterator<Item = DeclareId> {
        [
            Some(self.builtin_r0),
            self.spill_surface_offset.filter(|_| self.has_scratch_surface),
            self.old_a0_dot2,
            Some(self.spill_fill_header),
        ]
        .into_iter()
        .flatten()
    }
}

/// The view of the kernel (declarations, blocks and instructions) that incremental register
/// allocation needs.
///
/// `declares()` is append-only: declarations created while an iteration runs are pushed at the
/// end and existing entries never move. Dropped declarations keep their slot and report
/// `is_removed`.
pub trait RaKernel {
    fn declares(&self) -> &[DeclareId];
    fn block_ids(&self) -> &[BlockId];

    fn name(&self, dcl: DeclareId) -> &str;
    fn alias_of(&self, dcl: DeclareId) -> Option<DeclareId>;
    fn reg_file(&self, dcl: DeclareId) -> RegFile;
    fn is_partial(&self, dcl: DeclareId) -> bool;
    fn is_removed(&self, dcl: DeclareId) -> bool;
    fn is_output(&self, dcl: DeclareId) -> bool;

    /// Id given to the variable by liveness numbering, `None` if it doesn't take part in
    /// register allocation.
    fn var_id(&self, dcl: DeclareId) -> Option<VarId>;

    fn is_spilled(&self, dcl: DeclareId) -> bool;
    fn phy_reg(&self, dcl: DeclareId) -> Option<PhyReg>;

    /// The only block the variable is referenced in, if it never crosses a block boundary.
    fn block_local(&self, dcl: DeclareId) -> Option<BlockId>;

    fn housekeeping(&self) -> Housekeeping;

    /// Visits every instruction with the root declarations it defines and uses.
    fn for_each_inst<F>(&self, func: F)
    where
        F: FnMut(BlockId, InstId, &[DeclareId], &[DeclareId]);

    /// Registers `dcl` with the allocator's per-variable state.
    fn add_ra_candidate(&mut self, dcl: DeclareId);
}
