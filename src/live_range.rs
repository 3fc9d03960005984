use crate::kernel::{DeclareId, PhyReg, VarId};

/// Allocation tracking record of one register allocation candidate.
///
/// The id never changes once the live range exists. Everything else is allocation state that the
/// coloring step fills in and that is reset at the start of every iteration reconsidering it.
#[derive(Clone, Debug)]
pub struct LiveRange {
    id: VarId,
    dcl: DeclareId,
    phy_reg: Option<PhyReg>,
    spilled: bool,
    unconstrained: bool,
    degree: u32,
    ref_count: u32,
    spill_cost: f32,
    candidate: bool,
    partial_dcl: bool,
    forbidden: Vec<PhyReg>,
}

impl LiveRange {
    pub fn new(id: VarId, dcl: DeclareId, partial_dcl: bool) -> Self {
        Self {
            id,
            dcl,
            phy_reg: None,
            spilled: false,
            unconstrained: false,
            degree: 0,
            ref_count: 0,
            spill_cost: 0.0,
            candidate: true,
            partial_dcl,
            forbidden: Vec::new(),
        }
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn dcl(&self) -> DeclareId {
        self.dcl
    }

    pub fn phy_reg(&self) -> Option<PhyReg> {
        self.phy_reg
    }

    pub fn set_phy_reg(&mut self, reg: PhyReg) {
        self.phy_reg = Some(reg);
    }

    pub fn is_spilled(&self) -> bool {
        self.spilled
    }

    pub fn set_spilled(&mut self, spilled: bool) {
        self.spilled = spilled;
    }

    pub fn is_unconstrained(&self) -> bool {
        self.unconstrained
    }

    pub fn set_unconstrained(&mut self, unconstrained: bool) {
        self.unconstrained = unconstrained;
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn set_degree(&mut self, degree: u32) {
        self.degree = degree;
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub fn set_ref_count(&mut self, ref_count: u32) {
        self.ref_count = ref_count;
    }

    pub fn spill_cost(&self) -> f32 {
        self.spill_cost
    }

    pub fn set_spill_cost(&mut self, cost: f32) {
        self.spill_cost = cost;
    }

    pub fn is_candidate(&self) -> bool {
        self.candidate
    }

    pub fn set_candidate(&mut self, candidate: bool) {
        self.candidate = candidate;
    }

    pub fn is_partial_dcl(&self) -> bool {
        self.partial_dcl
    }

    pub fn set_partial_dcl(&mut self) {
        self.partial_dcl = true;
    }

    pub fn forbidden(&self) -> &[PhyReg] {
        &self.forbidden
    }

    pub fn forbid(&mut self, reg: PhyReg) {
        if !self.forbidden.contains(&reg) {
            self.forbidden.push(reg);
        }
    }

    /// Clears everything the next coloring pass recomputes. The partial declaration flag
    /// survives.
    pub fn reset_for_iteration(&mut self) {
        *self = Self::new(self.id, self.dcl, self.partial_dcl);
    }
}
