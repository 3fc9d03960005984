
use std::collections::HashMap;

use harness::{build_interference, named_edges, MockKernel};
use test_log::test;

use crate::{
    kernel::{BlockId, DeclareId, Housekeeping, InstId, RaKernel, VarId},
    liveness::BlockLiveness,
    utils::index_set::KeyIndex,
    verifier::{Discrepancy, NoVerification, ShadowVerifier, Verification},
    IncrementalRa, InterferenceRepr, IterationMode, Options, RegFile,
};

/// Numbers variables, recomputes liveness and starts the next iteration, like the allocator
/// does before building interference.
fn prepare<V: Verification>(
    engine: &mut IncrementalRa<V>,
    kernel: &mut MockKernel,
    repr: InterferenceRepr,
) -> (IterationMode, BlockLiveness) {
    kernel.number_vars(RegFile::GRF);
    kernel.mark_block_local_vars();
    let liveness = kernel.compute_liveness();
    let mode = engine.register_next_iter(kernel, RegFile::GRF, &liveness, repr);
    (mode, liveness)
}

fn build<V: Verification>(
    engine: &mut IncrementalRa<V>,
    kernel: &MockKernel,
    liveness: &BlockLiveness,
) {
    let scope = engine.scope().clone();
    build_interference(kernel, liveness, engine.graph_mut(), &scope);
}

fn iteration<V: Verification>(
    engine: &mut IncrementalRa<V>,
    kernel: &mut MockKernel,
) -> IterationMode {
    let (mode, liveness) = prepare(engine, kernel, InterferenceRepr::Sparse);
    build(engine, kernel, &liveness);
    mode
}

/// What coloring does when it gives up on a variable.
fn spill<V: Verification>(engine: &mut IncrementalRa<V>, kernel: &mut MockKernel, name: &str) {
    let dcl = kernel.find(name);
    if let Some(id) = engine.id_of(dcl) {
        engine.live_range_mut(id).unwrap().set_spilled(true);
    }
    kernel.spill(dcl);
}

fn edge(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

fn dirty_names<V: Verification>(engine: &IncrementalRa<V>, kernel: &MockKernel) -> Vec<String> {
    engine
        .dirty_set()
        .iter()
        .map(|dcl| kernel.name(dcl).to_string())
        .collect()
}

fn scope_blocks<V: Verification>(engine: &IncrementalRa<V>) -> Vec<BlockId> {
    let mut blocks: Vec<_> = engine.scope().blocks().collect();
    blocks.sort();
    blocks
}

/// BB0 defines `a`, BB5 defines `b` while `a` is live and `c` while `b` is live. `a` dies before
/// `c` is defined.
fn straight_line_kernel() -> MockKernel {
    let mut kernel = MockKernel::chain(6);
    let a = kernel.grf("a");
    let b = kernel.grf("b");
    let c = kernel.grf("c");

    kernel.inst(BlockId(0), &[a], &[]);
    kernel.inst(BlockId(5), &[b], &[]);
    kernel.inst(BlockId(5), &[], &[a]);
    kernel.inst(BlockId(5), &[c], &[]);
    kernel.inst(BlockId(5), &[], &[b, c]);
    kernel
}

/// BB0 -> BB1 -> BB2 -> BB3 with a back edge BB2 -> BB1. Returns the kernel and the
/// instruction of BB3 that reads `x`, `y` and `z`.
fn loop_kernel() -> (MockKernel, InstId) {
    let mut kernel = MockKernel::with_housekeeping();
    let bbs: Vec<BlockId> = (0..4).map(|_| kernel.add_block()).collect();
    kernel.add_edge(bbs[0], bbs[1]);
    kernel.add_edge(bbs[1], bbs[2]);
    kernel.add_edge(bbs[2], bbs[1]);
    kernel.add_edge(bbs[2], bbs[3]);

    let x = kernel.grf("x");
    let y = kernel.grf("y");
    let z = kernel.grf("z");
    let t = kernel.grf("t");

    kernel.inst(bbs[0], &[x], &[]);
    kernel.inst(bbs[0], &[y], &[]);
    kernel.inst(bbs[0], &[z], &[]);
    kernel.inst(bbs[1], &[t], &[x, y]);
    kernel.inst(bbs[2], &[y], &[t, y]);
    kernel.inst(bbs[2], &[], &[z]);
    let exit = kernel.inst(bbs[3], &[], &[x, y, z]);
    (kernel, exit)
}

#[test]
fn test_level_zero_always_resets() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::default());

    for _ in 0..3 {
        assert_eq!(iteration(&mut engine, &mut kernel), IterationMode::FullReset);
        assert!(engine.dirty_set().is_empty());
        assert_eq!(engine.scope().len(), 6);
        assert_eq!(engine.selected_rf(), RegFile::UNDEFINED);
        assert_eq!(engine.last_verification(), None);

        let a = kernel.find("a");
        engine.mark_for_intf_update(&kernel, a);
        assert!(engine.pending().is_empty());
    }

    assert_eq!(
        named_edges(&kernel, engine.graph()),
        vec![edge("a", "b"), edge("b", "c")]
    );
}

#[test]
fn test_spilled_variable_is_excised() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());

    assert_eq!(iteration(&mut engine, &mut kernel), IterationMode::Incremental);
    assert_eq!(engine.selected_rf(), RegFile::GRF);
    assert_eq!(
        named_edges(&kernel, engine.graph()),
        vec![edge("a", "b"), edge("b", "c")]
    );

    // coloring spills b, spill code replaces it by b' inside BB5
    let b = kernel.find("b");
    if let Some(id) = engine.id_of(b) {
        engine.live_range_mut(id).unwrap().set_spilled(true);
    }
    let b2 = kernel.grf("b'");
    kernel.replace(b, b2);
    kernel.set_spilled(b);

    let (mode, liveness) = prepare(&mut engine, &mut kernel, InterferenceRepr::Sparse);
    assert_eq!(mode, IterationMode::Incremental);
    assert_eq!(dirty_names(&engine, &kernel), vec!["b'"]);
    assert_eq!(engine.excised(), &[b]);
    assert_eq!(scope_blocks(&engine), vec![BlockId(5)]);
    assert!(named_edges(&kernel, engine.graph()).is_empty());
    assert_eq!(engine.last_verification(), Some(true));

    build(&mut engine, &kernel, &liveness);
    assert_eq!(
        named_edges(&kernel, engine.graph()),
        vec![edge("a", "b'"), edge("b'", "c")]
    );
    let (a, c) = (kernel.var("a"), kernel.var("c"));
    assert!(!engine.graph().interferes(a, c));
}

#[test]
fn test_housekeeping_never_dirty() {
    let mut kernel = straight_line_kernel();
    let sso = kernel.grf("sso");
    let old_a0 = kernel.grf("old_a0.2");
    kernel.set_output(sso);
    kernel.set_output(old_a0);
    let housekeeping = Housekeeping {
        spill_surface_offset: Some(sso),
        old_a0_dot2: Some(old_a0),
        has_scratch_surface: true,
        ..kernel.housekeeping()
    };
    kernel.set_housekeeping(housekeeping);

    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    let a = kernel.find("a");
    for dcl in housekeeping.iter().chain(Some(a)) {
        engine.mark_for_intf_update(&kernel, dcl);
    }
    assert_eq!(engine.pending().len(), 5);

    iteration(&mut engine, &mut kernel);
    assert_eq!(dirty_names(&engine, &kernel), vec!["a"]);
    assert_eq!(engine.last_verification(), Some(true));

    // only housekeeping marked: nothing left to update selectively
    for dcl in housekeeping.iter() {
        engine.mark_for_intf_update(&kernel, dcl);
    }
    assert_eq!(iteration(&mut engine, &mut kernel), IterationMode::Incremental);
    assert!(engine.dirty_set().is_empty());
    assert_eq!(engine.scope().len(), 6);
}

#[test]
fn test_incremental_matches_full_rebuild() {
    let (mut full_kernel, exit) = loop_kernel();
    let mut inc_kernel = full_kernel.clone();

    let mut full = IncrementalRa::<NoVerification>::new(Options::default());
    let mut inc = IncrementalRa::<ShadowVerifier>::new(Options::incremental());

    for step in 0..4 {
        assert_eq!(iteration(&mut full, &mut full_kernel), IterationMode::FullReset);
        assert_eq!(iteration(&mut inc, &mut inc_kernel), IterationMode::Incremental);

        assert_eq!(
            named_edges(&full_kernel, full.graph()),
            named_edges(&inc_kernel, inc.graph()),
            "graphs differ after step {}",
            step
        );
        assert_eq!(inc.last_verification(), Some(true), "step {}", step);
        if step == 1 {
            // BB1 keeps its edges from the first iteration
            assert!(!inc.scope().needs_update(BlockId(1)));
        }

        match step {
            0 => {
                spill(&mut full, &mut full_kernel, "z");
                spill(&mut inc, &mut inc_kernel, "z");
            }
            1 => {
                let x = full_kernel.find("x");
                full_kernel.rematerialize(x, exit);
                inc_kernel.rematerialize(x, exit);
                full.mark_for_intf_update(&full_kernel, x);
                inc.mark_for_intf_update(&inc_kernel, x);
            }
            2 => {
                spill(&mut full, &mut full_kernel, "y");
                spill(&mut inc, &mut inc_kernel, "y");
            }
            _ => {}
        }
    }
}

#[test]
fn test_dirty_global_variable_footprint() {
    let (mut kernel, exit) = loop_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    let x = kernel.find("x");
    kernel.rematerialize(x, exit);
    engine.mark_for_intf_update(&kernel, x);

    let (_, liveness) = prepare(&mut engine, &mut kernel, InterferenceRepr::Sparse);
    assert_eq!(dirty_names(&engine, &kernel), vec!["x", "x_remat"]);
    // BB0 defines x, BB1 and BB2 carry it around the loop, BB3 holds the remat temp
    assert_eq!(
        scope_blocks(&engine),
        vec![BlockId(0), BlockId(1), BlockId(2), BlockId(3)]
    );
    let x_id = kernel.var("x");
    assert!((0..kernel.num_vars()).all(|other| !engine
        .graph()
        .interferes(x_id, VarId(other as u32))));

    build(&mut engine, &kernel, &liveness);
    assert!(engine.graph().interferes(x_id, kernel.var("t")));
    assert!(!engine.graph().interferes(x_id, kernel.var("x_remat")));
}

#[test]
fn test_ids_stable_across_iterations() {
    let (mut kernel, _) = loop_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    let first: HashMap<DeclareId, VarId> = kernel
        .declares()
        .iter()
        .filter_map(|&dcl| engine.id_of(dcl).map(|id| (dcl, id)))
        .collect();
    assert_eq!(first.len(), 6);

    for name in ["z", "y"] {
        spill(&mut engine, &mut kernel, name);
        iteration(&mut engine, &mut kernel);

        for (&dcl, &id) in &first {
            assert_eq!(engine.id_of(dcl), Some(id));
            assert_eq!(engine.id_from_prev_iter(dcl), Some(id));
        }
        for (position, lr) in engine.live_ranges().iter().enumerate() {
            assert_eq!(lr.id().index(), position);
            assert_eq!(kernel.var_id(lr.dcl()), Some(lr.id()));
        }
        assert_eq!(engine.last_verification(), Some(true));
    }
}

#[test]
fn test_unreported_liveness_change_fails_verification() {
    let mut kernel = MockKernel::chain(3);
    let a = kernel.grf("a");
    let b = kernel.grf("b");
    kernel.inst(BlockId(0), &[a], &[]);
    kernel.inst(BlockId(0), &[b], &[]);
    kernel.inst(BlockId(1), &[], &[a]);
    let last = kernel.inst(BlockId(2), &[], &[a, b]);

    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    // a dies earlier, only b is reported
    kernel.remove_use(last, a);
    engine.mark_for_intf_update(&kernel, b);
    iteration(&mut engine, &mut kernel);

    assert_eq!(engine.last_verification(), Some(false));
    let report = engine.verification_report().unwrap();
    assert_eq!(report.len(), 1);
    assert!(matches!(
        report.get("a"),
        Some(Discrepancy::LivenessChanged { .. })
    ));
}

#[test]
fn test_moved_use_fails_verification() {
    let mut kernel = MockKernel::chain(3);
    let a = kernel.grf("a");
    let b = kernel.grf("b");
    kernel.inst(BlockId(0), &[a], &[]);
    kernel.inst(BlockId(0), &[b], &[]);
    let first = kernel.inst(BlockId(1), &[], &[a]);
    let second = kernel.inst(BlockId(1), &[], &[b]);
    kernel.inst(BlockId(2), &[], &[a, b]);

    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    // same liveness, different instruction
    kernel.remove_use(first, a);
    kernel.add_use(second, a);
    engine.mark_for_intf_update(&kernel, b);
    iteration(&mut engine, &mut kernel);

    assert_eq!(engine.last_verification(), Some(false));
    let report = engine.verification_report().unwrap();
    assert_eq!(report.get("a"), Some(&Discrepancy::UsesChanged));
    assert!(report.get("b").is_none());

    // reported properly this time
    kernel.remove_use(second, a);
    kernel.add_use(first, a);
    engine.mark_for_intf_update(&kernel, a);
    iteration(&mut engine, &mut kernel);
    assert_eq!(engine.last_verification(), Some(true));
    assert!(engine.verification_report().unwrap().is_empty());
}

#[test]
fn test_unsupported_configurations_reset() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<NoVerification>::new(Options::incremental());
    assert_eq!(iteration(&mut engine, &mut kernel), IterationMode::Incremental);

    let (mode, _) = prepare(&mut engine, &mut kernel, InterferenceRepr::Dense);
    assert_eq!(mode, IterationMode::FullReset);
    assert_eq!(engine.selected_rf(), RegFile::UNDEFINED);

    let liveness = kernel.compute_liveness();
    let mode =
        engine.register_next_iter(&mut kernel, RegFile::FLAG, &liveness, InterferenceRepr::Sparse);
    assert_eq!(mode, IterationMode::FullReset);
    assert_eq!(engine.last_mode(), Some(IterationMode::FullReset));

    // back on GRF the register file changed, so nothing is selective yet
    let a = kernel.find("a");
    engine.mark_for_intf_update(&kernel, a);
    assert_eq!(iteration(&mut engine, &mut kernel), IterationMode::Incremental);
    assert!(engine.dirty_set().is_empty());
    assert_eq!(engine.scope().len(), 6);
    assert_eq!(
        named_edges(&kernel, engine.graph()),
        vec![edge("a", "b"), edge("b", "c")]
    );
}

#[test]
fn test_skip_incremental_next_iter() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    engine.skip_incremental_ra_next_iter();
    assert_eq!(iteration(&mut engine, &mut kernel), IterationMode::FullReset);
    assert!(engine.live_ranges().len() == kernel.num_vars());

    assert_eq!(iteration(&mut engine, &mut kernel), IterationMode::Incremental);
    assert_eq!(engine.scope().len(), 6);
    assert_eq!(
        named_edges(&kernel, engine.graph()),
        vec![edge("a", "b"), edge("b", "c")]
    );
}

#[test]
fn test_reset_partial_dcls() {
    let mut kernel = MockKernel::chain(1);
    let p = kernel.partial("p");
    let q = kernel.grf("q");
    let a = kernel.grf("a");
    kernel.inst(BlockId(0), &[p], &[]);
    kernel.inst(BlockId(0), &[q], &[]);
    kernel.inst(BlockId(0), &[a], &[]);
    kernel.inst(BlockId(0), &[], &[p, q, a]);

    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);
    assert_eq!(
        named_edges(&kernel, engine.graph()),
        vec![edge("a", "p"), edge("a", "q"), edge("p", "q")]
    );

    kernel.remove(p);
    kernel.remove(q);
    engine.reset_partial_dcls(&kernel);

    // q isn't partial and keeps its edges
    assert_eq!(named_edges(&kernel, engine.graph()), vec![edge("a", "q")]);
    let (a, q) = (kernel.var("a"), kernel.var("q"));
    assert_eq!(engine.graph().neighbors(a), &[q.0]);
    assert!(engine.live_range(kernel.var("p")).is_some());
}

#[test]
fn test_variables_added_between_iterations() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);
    let before = engine.live_ranges().len();

    let t = kernel.grf("t");
    let f = kernel.flag("f");
    let a = kernel.find("a");
    let alias = kernel.alias("a_view", a);
    kernel.inst(BlockId(3), &[t], &[]);
    kernel.inst(BlockId(3), &[], &[t]);
    kernel.number_vars(RegFile::GRF);

    engine.add_new_ra_variable(&mut kernel, t);
    engine.add_new_ra_variable(&mut kernel, alias);
    assert_eq!(engine.live_ranges().len(), before + 1);
    assert!(engine.pending().contains(t));
    assert!(!engine.pending().contains(alias));

    iteration(&mut engine, &mut kernel);
    assert_eq!(dirty_names(&engine, &kernel), vec!["t"]);
    assert_eq!(engine.live_ranges().len(), before + 1);
    assert_eq!(engine.id_of(f), None);
    assert_eq!(engine.id_of(alias), None);
    assert!(kernel.candidates.contains(&f));
    assert!(!kernel.candidates.contains(&alias));
    assert_eq!(scope_blocks(&engine), vec![BlockId(3)]);
    assert_eq!(engine.last_verification(), Some(true));
}

#[test]
fn test_mark_for_intf_update_is_deferred() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    let (a, c) = (kernel.find("a"), kernel.find("c"));
    let alias = kernel.alias("c_view", c);
    engine.mark_for_intf_update(&kernel, a);
    engine.mark_for_intf_update(&kernel, a);
    engine.mark_for_intf_update(&kernel, alias);
    assert!(engine.dirty_set().is_empty());
    assert_eq!(engine.pending().len(), 1);

    iteration(&mut engine, &mut kernel);
    assert_eq!(dirty_names(&engine, &kernel), vec!["a"]);
    assert!(engine.pending().is_empty());
    // a is killed in BB0 and live through BB1..BB5
    assert_eq!(engine.scope().len(), 6);
    assert_eq!(
        named_edges(&kernel, engine.graph()),
        vec![edge("a", "b"), edge("b", "c")]
    );
}

#[test]
fn test_spill_reported_by_kernel_only() {
    let mut inc_kernel = straight_line_kernel();
    let mut full_kernel = inc_kernel.clone();
    let mut inc = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    let mut full = IncrementalRa::<NoVerification>::new(Options::default());
    iteration(&mut inc, &mut inc_kernel);
    iteration(&mut full, &mut full_kernel);

    // spill code ran, the live range was never flagged
    let b = inc_kernel.find("b");
    inc_kernel.spill(b);
    full_kernel.spill(b);

    iteration(&mut inc, &mut inc_kernel);
    iteration(&mut full, &mut full_kernel);

    assert_eq!(inc.excised(), &[b]);
    assert_eq!(inc.last_verification(), Some(true));
    assert_eq!(
        named_edges(&inc_kernel, inc.graph()),
        named_edges(&full_kernel, full.graph())
    );
    assert_eq!(
        named_edges(&inc_kernel, inc.graph()),
        vec![edge("a", "b_store0"), edge("b_fill1", "c")]
    );
}

#[test]
fn test_folded_partial_dcl_passes_verification() {
    let mut kernel = MockKernel::chain(2);
    let p = kernel.partial("p");
    let q = kernel.grf("q");
    let a = kernel.grf("a");
    kernel.inst(BlockId(0), &[p], &[]);
    kernel.inst(BlockId(0), &[q], &[]);
    kernel.inst(BlockId(0), &[a], &[]);
    kernel.inst(BlockId(1), &[], &[p, q, a]);

    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);
    assert_eq!(
        named_edges(&kernel, engine.graph()),
        vec![edge("a", "p"), edge("a", "q"), edge("p", "q")]
    );

    // p is folded into its root
    kernel.replace(p, a);
    kernel.remove(p);
    engine.reset_partial_dcls(&kernel);
    engine.mark_for_intf_update(&kernel, a);
    iteration(&mut engine, &mut kernel);

    assert_eq!(engine.last_verification(), Some(true));
    assert!(engine.verification_report().unwrap().is_empty());
    assert_eq!(named_edges(&kernel, engine.graph()), vec![edge("a", "q")]);
}

#[test]
fn test_renumbered_declaration_fails_verification() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    let (b, c) = (kernel.find("b"), kernel.find("c"));
    let old = kernel.var("c");
    let new = kernel.renumber(c);
    engine.mark_for_intf_update(&kernel, b);
    iteration(&mut engine, &mut kernel);

    assert_eq!(engine.last_verification(), Some(false));
    let report = engine.verification_report().unwrap();
    assert_eq!(
        report.get("c"),
        Some(&Discrepancy::Renumbered {
            live_range: old,
            numbered: Some(new),
        })
    );
    assert!(matches!(
        report.get(&new.to_string()),
        Some(Discrepancy::UntrackedLivenessChange { .. })
    ));
}

#[test]
fn test_unstable_id_fails_verification() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    let (a, b) = (kernel.find("a"), kernel.find("b"));
    let current = kernel.var("a");
    engine.record_var_id(a, VarId(40));
    assert_eq!(engine.id_from_prev_iter(a), Some(VarId(40)));

    engine.mark_for_intf_update(&kernel, b);
    iteration(&mut engine, &mut kernel);

    assert_eq!(engine.last_verification(), Some(false));
    assert_eq!(
        engine.verification_report().unwrap().get("a"),
        Some(&Discrepancy::UnstableId {
            previous: VarId(40),
            current,
        })
    );
    assert_eq!(engine.id_from_prev_iter(a), Some(current));
}

#[test]
#[should_panic(expected = "mismatch in lr")]
fn test_out_of_order_id_is_fatal() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);

    let t = kernel.grf("t");
    kernel.set_var_id(t, VarId(kernel.num_vars() as u32 + 3));
    engine.add_new_ra_variable(&mut kernel, t);
    iteration(&mut engine, &mut kernel);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "expecting live-out")]
fn test_housekeeping_must_be_live_out() {
    let mut kernel = straight_line_kernel();
    let r0 = kernel.grf("not_live_out");
    let housekeeping = Housekeeping {
        builtin_r0: r0,
        ..kernel.housekeeping()
    };
    kernel.set_housekeeping(housekeeping);

    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "expecting valid SSO")]
fn test_scratch_surface_needs_offset() {
    let mut kernel = straight_line_kernel();
    let housekeeping = Housekeeping {
        has_scratch_surface: true,
        ..kernel.housekeeping()
    };
    kernel.set_housekeeping(housekeeping);

    let mut engine = IncrementalRa::<ShadowVerifier>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);
}

#[test]
fn test_no_verification_reports_nothing() {
    let mut kernel = straight_line_kernel();
    let mut engine = IncrementalRa::<NoVerification>::new(Options::incremental());
    iteration(&mut engine, &mut kernel);
    assert_eq!(engine.last_verification(), None);

    let a = kernel.find("a");
    engine.mark_for_intf_update(&kernel, a);
    assert_eq!(iteration(&mut engine, &mut kernel), IterationMode::Incremental);
    assert_eq!(engine.last_verification(), None);
    assert!(engine.verification_report().is_none());
}
