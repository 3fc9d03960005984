use std::collections::HashMap;

use crate::kernel::{BlockId, DeclareId, InstId, RaKernel};

/// One occurrence of a variable, identified by the instruction it appears in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct VarRef {
    pub inst: InstId,
    pub block: BlockId,
}

/// Def and use occurrences of every declaration, recomputed from the instruction stream.
///
/// Occurrences compare by instruction identity, so two computations agree only if the variable
/// still appears in the very same instructions.
#[derive(Clone, Default, Debug)]
pub struct VarReferences {
    defs: HashMap<DeclareId, Vec<VarRef>>,
    uses: HashMap<DeclareId, Vec<VarRef>>,
}

impl VarReferences {
    pub fn compute<K: RaKernel>(kernel: &K) -> Self {
        let mut refs = Self::default();

        kernel.for_each_inst(|block, inst, defs, uses| {
            let occurrence = VarRef { inst, block };
            for &dcl in defs {
                refs.defs.entry(dcl).or_default().push(occurrence);
            }
            for &dcl in uses {
                refs.uses.entry(dcl).or_default().push(occurrence);
            }
        });

        refs
    }

    pub fn defs(&self, dcl: DeclareId) -> Option<&[VarRef]> {
        self.defs.get(&dcl).map(Vec::as_slice)
    }

    pub fn uses(&self, dcl: DeclareId) -> Option<&[VarRef]> {
        self.uses.get(&dcl).map(Vec::as_slice)
    }
}
