//! Incremental interference graph maintenance for iterative graph-coloring register allocation.
//!
//! Between allocator iterations [`IncrementalRa`] decides whether the interference graph can be
//! kept, finds the variables whose edges went stale, removes exactly those edges and hands the
//! interference builder the blocks it has to redo.

pub mod block_invalidator;
pub mod dirty_set;
pub mod incremental_ra;
pub mod interference;
pub mod kernel;
pub mod live_range;
pub mod liveness;
pub mod options;
pub mod reg_file;
pub mod registry;
pub mod utils;
pub mod var_refs;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use block_invalidator::PerBlockValidity;
pub use dirty_set::DirtySet;
pub use incremental_ra::{IncrementalRa, IterationMode};
pub use interference::{InterferenceRepr, SparseInterferenceGraph};
pub use kernel::{BlockId, DeclareId, Housekeeping, InstId, PhyReg, RaKernel, VarId};
pub use live_range::LiveRange;
pub use liveness::{BlockLiveness, LivenessFamily, LivenessOracle};
pub use options::Options;
pub use reg_file::RegFile;
pub use verifier::{
    DefaultVerification, Discrepancy, NoVerification, ShadowVerifier, Verification,
    VerificationReport,
};
