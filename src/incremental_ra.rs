use crate::{
    block_invalidator::{collect_blocks, PerBlockValidity},
    dirty_set::DirtySet,
    interference::{InterferenceRepr, SparseInterferenceGraph},
    kernel::{DeclareId, RaKernel, VarId},
    live_range::LiveRange,
    liveness::LivenessOracle,
    options::Options,
    reg_file::{liveness_class, RegFile},
    registry::VariableRegistry,
    verifier::{DefaultVerification, Verification, VerificationReport, VerifyInput},
};

/// How an allocator iteration treats the state left by the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationMode {
    /// Everything is discarded and the interference graph is built from scratch.
    FullReset,
    /// Live ranges and edges are kept; only edges of dirty variables are recomputed.
    Incremental,
}

/// Interference bookkeeping shared by all allocator iterations of one kernel.
///
/// One instance per kernel, driven strictly in order: `register_next_iter` at the start of
/// every iteration, then the interference builder fills in the edges of `scope()`, then
/// coloring. Transforms that change a variable's liveness between iterations report it
/// through `mark_for_intf_update`.
pub struct IncrementalRa<V: Verification = DefaultVerification> {
    options: Options,
    selected_rf: RegFile,
    registry: VariableRegistry,
    /// Marked between iterations, becomes `dirty` at the next `register_next_iter`.
    pending: DirtySet,
    dirty: DirtySet,
    /// Variables spilled by the previous iteration.
    excised: Vec<DeclareId>,
    graph: SparseInterferenceGraph,
    scope: PerBlockValidity,
    verifier: V,
    force_full_reset: bool,
    last_mode: Option<IterationMode>,
    last_verification: Option<bool>,
}

impl<V: Verification> IncrementalRa<V> {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            selected_rf: RegFile::UNDEFINED,
            registry: VariableRegistry::new(),
            pending: DirtySet::new(),
            dirty: DirtySet::new(),
            excised: Vec::new(),
            graph: SparseInterferenceGraph::new(),
            scope: PerBlockValidity::new(),
            verifier: V::default(),
            force_full_reset: false,
            last_mode: None,
            last_verification: None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn is_enabled(&self) -> bool {
        self.options.is_incremental()
    }

    fn reset<K: RaKernel>(&mut self, kernel: &K) {
        self.selected_rf = RegFile::UNDEFINED;
        self.registry.clear(kernel.declares().len());
        self.pending.clear();
        self.dirty.clear();
        self.excised.clear();
        self.graph.clear();
        self.scope.invalidate();
        self.verifier.reset();
    }

    fn decide(&mut self, rf: RegFile, repr: InterferenceRepr) -> IterationMode {
        let forced = std::mem::take(&mut self.force_full_reset);

        // Address, flag and scalar RA still mark candidates from scratch.
        // TODO: maintain the dense matrix incrementally too.
        if forced
            || !self.is_enabled()
            || !rf.supports_incremental()
            || repr == InterferenceRepr::Dense
        {
            IterationMode::FullReset
        } else {
            IterationMode::Incremental
        }
    }

    /// Prepares interference state for the next allocator iteration on `rf`.
    ///
    /// `liveness` is the liveness computed for this iteration. On return `scope()` names the
    /// blocks the builder has to redo and the graph holds every edge outside of them.
    pub fn register_next_iter<K: RaKernel, L: LivenessOracle>(
        &mut self,
        kernel: &mut K,
        rf: RegFile,
        liveness: &L,
        repr: InterferenceRepr,
    ) -> IterationMode {
        let mode = self.decide(rf, repr);
        log::debug!("{} RA iteration: {:?} ({:?} interference)", rf, mode, repr);

        match mode {
            IterationMode::FullReset => {
                self.reset(kernel);
                self.registry.populate(kernel, rf);
                self.scope = PerBlockValidity::all(kernel);
                self.last_verification = None;
            }
            IterationMode::Incremental => self.next_incremental_iter(kernel, rf, liveness),
        }

        self.last_mode = Some(mode);
        mode
    }

    fn next_incremental_iter<K: RaKernel, L: LivenessOracle>(
        &mut self,
        kernel: &mut K,
        rf: RegFile,
        liveness: &L,
    ) {
        if rf != self.selected_rf {
            self.reset(kernel);
            self.registry.populate(kernel, rf);
            self.selected_rf = rf;
        }

        self.dirty = self.pending.take();
        self.erase_live_outs_from_incremental_update(kernel);

        // Live ranges for variables created by the previous iteration.
        let new_declares = self.registry.new_declares(kernel).to_vec();
        for dcl in new_declares {
            if kernel.alias_of(dcl).is_some() {
                continue;
            }
            if self.register_variable(kernel, dcl) {
                log::trace!("new variable {} needs interference update", kernel.name(dcl));
                self.dirty.insert(dcl);
            }
        }

        // Coloring reports spills on the live range, spill code on the declaration.
        self.excised = self
            .registry
            .live_ranges()
            .iter()
            .filter(|lr| lr.is_spilled() || kernel.is_spilled(lr.dcl()))
            .map(LiveRange::dcl)
            .collect();

        for lr in self.registry.live_ranges_mut() {
            lr.reset_for_iteration();
        }

        self.scope = collect_blocks(
            kernel,
            &self.registry,
            &self.dirty,
            &self.excised,
            liveness,
        );

        let stale: Vec<VarId> = self
            .dirty
            .iter()
            .chain(self.excised.iter().copied())
            .filter_map(|dcl| self.registry.id_of(dcl))
            .collect();
        self.graph.reset_edges(stale);

        self.last_verification = if V::VERIFIES {
            Some(self.verify(kernel, liveness))
        } else {
            None
        };

        self.registry.mark_declares_seen(kernel);
        self.verifier.capture(kernel, liveness);
        self.registry.record_current_ids();
    }

    /// Values that are live-out of the whole program interfere with everything already, their
    /// edges never need recomputation.
    fn erase_live_outs_from_incremental_update<K: RaKernel>(&mut self, kernel: &K) {
        let housekeeping = kernel.housekeeping();

        self.dirty.remove(housekeeping.builtin_r0);
        debug_assert!(kernel.is_output(housekeeping.builtin_r0), "expecting live-out");

        debug_assert!(
            !housekeeping.has_scratch_surface || housekeeping.spill_surface_offset.is_some(),
            "expecting valid SSO"
        );
        if housekeeping.has_scratch_surface {
            if let Some(sso) = housekeeping.spill_surface_offset {
                self.dirty.remove(sso);
                debug_assert!(kernel.is_output(sso), "expecting live-out");
            }
        }

        debug_assert!(
            !housekeeping.has_scratch_surface || housekeeping.old_a0_dot2.is_some(),
            "expecting valid old a0dot2 temp"
        );
        if let Some(old_a0_dot2) = housekeeping.old_a0_dot2 {
            self.dirty.remove(old_a0_dot2);
            debug_assert!(kernel.is_output(old_a0_dot2), "expecting live-out");
        }

        self.dirty.remove(housekeeping.spill_fill_header);
        debug_assert!(
            kernel.is_output(housekeeping.spill_fill_header),
            "expecting live-out"
        );
    }

    /// Returns whether `dcl` has to be marked dirty.
    fn register_variable<K: RaKernel>(&mut self, kernel: &mut K, dcl: DeclareId) -> bool {
        if !self.is_enabled() || kernel.alias_of(dcl).is_some() {
            return false;
        }

        kernel.add_ra_candidate(dcl);

        // Flag RA creates GRF temps for spill/fill.
        if !liveness_class(kernel.reg_file(dcl), self.selected_rf) {
            return false;
        }

        self.registry.create(kernel, dcl);
        true
    }

    /// Adds a variable created outside of the iteration loop. Its edges are recomputed by the
    /// next iteration.
    pub fn add_new_ra_variable<K: RaKernel>(&mut self, kernel: &mut K, dcl: DeclareId) {
        if self.register_variable(kernel, dcl) {
            self.pending.insert(dcl);
        }
    }

    /// Schedules `dcl` for interference recomputation in the next iteration.
    pub fn mark_for_intf_update<K: RaKernel>(&mut self, kernel: &K, dcl: DeclareId) {
        if !self.is_enabled() || kernel.alias_of(dcl).is_some() {
            return;
        }

        log::trace!("{} marked for interference update", kernel.name(dcl));
        self.pending.insert(dcl);
    }

    /// Makes the next iteration start from a clean slate. For rarely run passes and debugging.
    pub fn skip_incremental_ra_next_iter(&mut self) {
        self.force_full_reset = true;
    }

    /// Removes every edge of partial declarations that were dropped from the kernel.
    pub fn reset_partial_dcls<K: RaKernel>(&mut self, kernel: &K) {
        if !self.is_enabled() {
            return;
        }

        let removed: Vec<VarId> = kernel
            .declares()
            .iter()
            .copied()
            .filter(|&dcl| kernel.is_partial(dcl) && kernel.is_removed(dcl))
            .filter_map(|dcl| self.registry.id_of(dcl))
            .collect();

        self.graph.excise(removed);
    }

    /// Checks the current iteration's bookkeeping against `liveness`. Always true unless a
    /// verifying strategy is in use.
    pub fn verify<K: RaKernel, L: LivenessOracle>(&mut self, kernel: &K, liveness: &L) -> bool {
        let input = VerifyInput {
            kernel,
            liveness,
            registry: &self.registry,
            dirty: &self.dirty,
            excised: &self.excised,
            selected_rf: self.selected_rf,
        };
        self.verifier.verify(&input)
    }

    pub fn record_var_id(&mut self, dcl: DeclareId, id: VarId) {
        self.registry.record_var_id(dcl, id);
    }

    pub fn id_from_prev_iter(&self, dcl: DeclareId) -> Option<VarId> {
        self.registry.id_from_prev_iter(dcl)
    }

    pub fn last_mode(&self) -> Option<IterationMode> {
        self.last_mode
    }

    /// Result of the verification run by the last incremental iteration. `None` after a full
    /// reset and for strategies that don't verify.
    pub fn last_verification(&self) -> Option<bool> {
        self.last_verification
    }

    pub fn verification_report(&self) -> Option<&VerificationReport> {
        self.verifier.report()
    }

    pub fn selected_rf(&self) -> RegFile {
        self.selected_rf
    }

    pub fn graph(&self) -> &SparseInterferenceGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SparseInterferenceGraph {
        &mut self.graph
    }

    pub fn scope(&self) -> &PerBlockValidity {
        &self.scope
    }

    /// Variables whose interference is recomputed by the current iteration.
    pub fn dirty_set(&self) -> &DirtySet {
        &self.dirty
    }

    /// Variables already scheduled for the next iteration.
    pub fn pending(&self) -> &DirtySet {
        &self.pending
    }

    pub fn excised(&self) -> &[DeclareId] {
        &self.excised
    }

    pub fn live_ranges(&self) -> &[LiveRange] {
        self.registry.live_ranges()
    }

    pub fn live_range(&self, id: VarId) -> Option<&LiveRange> {
        self.registry.get(id)
    }

    pub fn live_range_mut(&mut self, id: VarId) -> Option<&mut LiveRange> {
        self.registry.get_mut(id)
    }

    pub fn id_of(&self, dcl: DeclareId) -> Option<VarId> {
        self.registry.id_of(dcl)
    }
}

impl<V: Verification> Default for IncrementalRa<V> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}
