//! Shadow checking of the incremental bookkeeping.
//!
//! The engine is generic over a [`Verification`] strategy. [`NoVerification`] compiles to
//! nothing; [`ShadowVerifier`] keeps a copy of the previous iteration's liveness and def/use
//! occurrences and checks that every variable whose facts changed was scheduled for
//! interference recomputation.

use indexmap::IndexMap;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    dirty_set::DirtySet,
    kernel::{DeclareId, RaKernel, VarId},
    liveness::{BlockLiveness, LivenessFamily, LivenessOracle},
    reg_file::{liveness_class, RegFile},
    registry::VariableRegistry,
    utils::index_set::KeyIndex,
    var_refs::{VarRef, VarReferences},
};

/// A way the incremental approximation disagrees with freshly computed facts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    #[error("variable id changed from {previous} to {current} across iterations")]
    UnstableId { previous: VarId, current: VarId },

    #[error("live range {live_range} doesn't match liveness numbering {numbered:?}")]
    Renumbered {
        live_range: VarId,
        numbered: Option<VarId>,
    },

    #[error("didn't find new variable in candidate list")]
    NewVariableNotDirty,

    #[error("variable liveness changed in {family} but not found in candidates set")]
    LivenessChanged { family: LivenessFamily },

    #[error("liveness changed in {family} for a variable without live range")]
    UntrackedLivenessChange { family: LivenessFamily },

    #[error("variable appears in different defs but it isn't in candidate list")]
    DefsChanged,

    #[error("variable appears in different uses but it isn't in candidate list")]
    UsesChanged,
}

/// Discrepancies of one verification run, keyed by variable name. Only the first discrepancy
/// found for a variable is kept.
#[derive(Clone, Default, Debug)]
pub struct VerificationReport {
    errors: IndexMap<String, Discrepancy>,
}

impl VerificationReport {
    fn record(&mut self, name: impl Into<String>, discrepancy: Discrepancy) {
        self.errors.entry(name.into()).or_insert(discrepancy);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, name: &str) -> Option<&Discrepancy> {
        self.errors.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Discrepancy)> {
        self.errors.iter().map(|(name, d)| (name.as_str(), d))
    }
}

/// Everything a verification run looks at.
pub struct VerifyInput<'a, K: RaKernel, L: LivenessOracle> {
    pub kernel: &'a K,
    pub liveness: &'a L,
    pub registry: &'a VariableRegistry,
    pub dirty: &'a DirtySet,
    /// Variables whose edges were removed without recomputation (spilled last iteration).
    pub excised: &'a [DeclareId],
    pub selected_rf: RegFile,
}

impl<'a, K: RaKernel, L: LivenessOracle> VerifyInput<'a, K, L> {
    /// Dirty, spilled or dropped from the kernel: changes to these are expected.
    fn accounted_for(&self, dcl: DeclareId) -> bool {
        self.dirty.contains(dcl) || self.excised.contains(&dcl) || self.kernel.is_removed(dcl)
    }
}

pub trait Verification: Default {
    /// Whether `verify` actually checks anything.
    const VERIFIES: bool = true;

    /// Returns false if any discrepancy was found.
    fn verify<K: RaKernel, L: LivenessOracle>(&mut self, input: &VerifyInput<'_, K, L>) -> bool;

    /// Records the facts the next iteration is compared against.
    fn capture<K: RaKernel, L: LivenessOracle>(&mut self, kernel: &K, liveness: &L);

    fn reset(&mut self);

    fn report(&self) -> Option<&VerificationReport> {
        None
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct NoVerification;

impl Verification for NoVerification {
    const VERIFIES: bool = false;

    #[inline(always)]
    fn verify<K: RaKernel, L: LivenessOracle>(&mut self, _: &VerifyInput<'_, K, L>) -> bool {
        true
    }

    #[inline(always)]
    fn capture<K: RaKernel, L: LivenessOracle>(&mut self, _: &K, _: &L) {}

    #[inline(always)]
    fn reset(&mut self) {}
}

#[derive(Default)]
pub struct ShadowVerifier {
    snapshot: Option<BlockLiveness>,
    prev_refs: Option<VarReferences>,
    report: VerificationReport,
}

impl ShadowVerifier {
    fn check_ids<K: RaKernel, L: LivenessOracle>(&mut self, input: &VerifyInput<'_, K, L>) {
        let kernel = input.kernel;
        for lr in input.registry.live_ranges() {
            let numbered = kernel.var_id(lr.dcl());
            if numbered != Some(lr.id()) {
                self.report.record(
                    kernel.name(lr.dcl()),
                    Discrepancy::Renumbered {
                        live_range: lr.id(),
                        numbered,
                    },
                );
            }

            if let Some(previous) = input.registry.id_from_prev_iter(lr.dcl()) {
                if previous != lr.id() {
                    self.report.record(
                        kernel.name(lr.dcl()),
                        Discrepancy::UnstableId {
                            previous,
                            current: lr.id(),
                        },
                    );
                }
            }
        }
    }

    fn check_new_variables<K: RaKernel, L: LivenessOracle>(
        &mut self,
        input: &VerifyInput<'_, K, L>,
    ) {
        let kernel = input.kernel;
        for &dcl in input.registry.new_declares(kernel) {
            if kernel.alias_of(dcl).is_some()
                || !liveness_class(kernel.reg_file(dcl), input.selected_rf)
            {
                continue;
            }

            if !input.dirty.contains(dcl) {
                self.report
                    .record(kernel.name(dcl), Discrepancy::NewVariableNotDirty);
            }
        }
    }

    fn check_liveness_delta<K: RaKernel, L: LivenessOracle>(
        &mut self,
        input: &VerifyInput<'_, K, L>,
        snapshot: &BlockLiveness,
    ) {
        let kernel = input.kernel;
        for family in LivenessFamily::iter() {
            for &bb in kernel.block_ids() {
                let delta = input.liveness.set(family, bb) ^ snapshot.set(family, bb);

                for id in delta.iter() {
                    match input.registry.get(VarId::from_index(id)) {
                        Some(lr) if input.accounted_for(lr.dcl()) => {}
                        Some(lr) => self.report.record(
                            kernel.name(lr.dcl()),
                            Discrepancy::LivenessChanged { family },
                        ),
                        None => self.report.record(
                            format!("v{}", id),
                            Discrepancy::UntrackedLivenessChange { family },
                        ),
                    }
                }
            }
        }
    }

    fn check_references<K: RaKernel, L: LivenessOracle>(
        &mut self,
        input: &VerifyInput<'_, K, L>,
        prev_refs: &VarReferences,
    ) {
        let kernel = input.kernel;
        let refs = VarReferences::compute(kernel);

        let differs = |old: Option<&[VarRef]>, new: Option<&[VarRef]>| old != new;

        for &dcl in kernel.declares() {
            if !liveness_class(kernel.reg_file(dcl), input.selected_rf)
                || kernel.alias_of(dcl).is_some()
                || input.accounted_for(dcl)
            {
                continue;
            }

            if differs(prev_refs.defs(dcl), refs.defs(dcl)) {
                self.report.record(kernel.name(dcl), Discrepancy::DefsChanged);
            }

            if differs(prev_refs.uses(dcl), refs.uses(dcl)) {
                self.report.record(kernel.name(dcl), Discrepancy::UsesChanged);
            }
        }
    }
}

impl Verification for ShadowVerifier {
    fn verify<K: RaKernel, L: LivenessOracle>(&mut self, input: &VerifyInput<'_, K, L>) -> bool {
        self.report = VerificationReport::default();

        for (position, lr) in input.registry.live_ranges().iter().enumerate() {
            assert_eq!(
                position,
                lr.id().index(),
                "mismatch in lrs index and regvar id"
            );
        }

        // Nothing to compare against: the whole graph is rebuilt this iteration.
        if input.dirty.is_empty() {
            return true;
        }

        self.check_ids(input);
        self.check_new_variables(input);

        if let Some(snapshot) = self.snapshot.take() {
            self.check_liveness_delta(input, &snapshot);
            self.snapshot = Some(snapshot);
        }

        if let Some(prev_refs) = self.prev_refs.take() {
            self.check_references(input, &prev_refs);
            self.prev_refs = Some(prev_refs);
        }

        for (name, discrepancy) in self.report.iter() {
            log::warn!("{} : {}", name, discrepancy);
        }

        self.report.is_empty()
    }

    fn capture<K: RaKernel, L: LivenessOracle>(&mut self, kernel: &K, liveness: &L) {
        self.snapshot = Some(BlockLiveness::capture(liveness, kernel.block_ids()));
        self.prev_refs = Some(VarReferences::compute(kernel));
    }

    fn reset(&mut self) {
        self.snapshot = None;
        self.prev_refs = None;
    }

    fn report(&self) -> Option<&VerificationReport> {
        Some(&self.report)
    }
}

cfg_if::cfg_if! {
    if #[cfg(any(debug_assertions, feature = "verify"))] {
        /// Verification used when none is named: shadow checking in debug builds and with the
        /// `verify` feature.
        pub type DefaultVerification = ShadowVerifier;
    } else {
        pub type DefaultVerification = NoVerification;
    }
}
