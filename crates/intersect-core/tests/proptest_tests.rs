//! Property-based tests for the consolidation-core invariants using the
//! `proptest` crate.

use proptest::prelude::*;

use geom_core::Point3d;
use intersect_core::{
    build_chains, consolidate, params_coincident, ArcId, ArcRef, BlockStore, CurveRef, DomainId,
    FaceRef, IntersectionRecord, PaveBlock, PaveBlockId, RestrictionLine, TolerantScalar,
};

const TOL: f64 = 1e-3;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_owner(boundary: u32) -> impl Strategy<Value = Option<ArcRef>> {
    prop_oneof![
        2 => Just(Option::<ArcRef>::None),
        3 => (0u32..3, -5.0f64..5.0).prop_map(move |(arc, at)| {
            Some(ArcRef::new(DomainId(boundary), ArcId(arc), at))
        }),
    ]
}

fn arb_record() -> impl Strategy<Value = IntersectionRecord> {
    (-10.0f64..10.0, arb_owner(0), arb_owner(1)).prop_map(|(t, owner_first, owner_second)| {
        let mut record = IntersectionRecord::new(t, Point3d::new(t, 0.0, 0.0), TOL);
        record.owner_first = owner_first;
        record.owner_second = owner_second;
        record
    })
}

fn arb_line() -> impl Strategy<Value = RestrictionLine> {
    proptest::collection::vec(arb_record(), 0..24).prop_map(|records| {
        let mut line = RestrictionLine::new(DomainId(0), DomainId(1));
        line.records = records;
        line
    })
}

fn arb_adjacency() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..12).prop_flat_map(|n| {
        proptest::collection::vec(proptest::bool::weighted(0.2), n * n).prop_map(move |bits| {
            let mut adjacency = vec![Vec::new(); n];
            for i in 0..n {
                for j in (i + 1)..n {
                    if bits[i * n + j] {
                        adjacency[i].push(j);
                        adjacency[j].push(i);
                    }
                }
            }
            adjacency
        })
    })
}

// ---------------------------------------------------------------------------
// 1. Consolidation is idempotent
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn consolidation_is_idempotent(mut line in arb_line()) {
        consolidate(&mut line).unwrap();
        let once = line.clone();
        consolidate(&mut line).unwrap();
        prop_assert_eq!(&once.records, &line.records);
    }
}

// ---------------------------------------------------------------------------
// 2. Consolidated lines are sorted by parameter
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn consolidated_lines_are_ordered(mut line in arb_line()) {
        consolidate(&mut line).unwrap();
        prop_assert!(line.is_sorted());
    }
}

// ---------------------------------------------------------------------------
// 3. No same-boundary duplicate crossings survive
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn no_single_boundary_duplicates_survive(mut line in arb_line()) {
        consolidate(&mut line).unwrap();
        let records = &line.records;
        for i in 0..records.len() {
            for j in (i + 1)..records.len() {
                let (a, b) = (&records[i], &records[j]);
                if !a.coincident_with(b) {
                    continue;
                }
                let single_first = (a.owner_first, b.owner_first);
                if let (Some(oa), Some(ob)) = single_first {
                    if a.owner_second.is_none() && b.owner_second.is_none() {
                        prop_assert!(!oa.same_crossing(&ob, a.tolerance, b.tolerance));
                    }
                }
                let single_second = (a.owner_second, b.owner_second);
                if let (Some(oa), Some(ob)) = single_second {
                    if a.owner_first.is_none() && b.owner_first.is_none() {
                        prop_assert!(!oa.same_crossing(&ob, a.tolerance, b.tolerance));
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Consolidation only removes, and marks the surviving extremes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn consolidation_never_invents_records(mut line in arb_line()) {
        let before = line.records.len();
        consolidate(&mut line).unwrap();
        prop_assert!(line.records.len() <= before);
        if let (Some(first), Some(last)) = (line.records.first(), line.records.last()) {
            prop_assert!(first.endpoint);
            prop_assert!(last.endpoint);
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Chains partition the records and match reachability exactly
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn chains_partition_records(adjacency in arb_adjacency()) {
        let chains = build_chains(&adjacency).unwrap();
        let n = adjacency.len();

        let mut owner = vec![usize::MAX; n];
        for (chain_index, chain) in chains.iter().enumerate() {
            for &member in &chain.members {
                prop_assert_eq!(owner[member], usize::MAX, "record in two chains");
                owner[member] = chain_index;
            }
        }
        prop_assert!(owner.iter().all(|&o| o != usize::MAX), "record in no chain");

        // Same chain iff connected in the touch relation (transitive closure).
        let mut reach = vec![vec![false; n]; n];
        for i in 0..n {
            reach[i][i] = true;
        }
        for (i, neighbors) in adjacency.iter().enumerate() {
            for &j in neighbors {
                reach[i][j] = true;
            }
        }
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if reach[i][k] && reach[k][j] {
                        reach[i][j] = true;
                    }
                }
            }
        }
        for i in 0..n {
            for j in 0..n {
                prop_assert_eq!(owner[i] == owner[j], reach[i][j]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 6. Common blocks contain every contributor within their tolerance
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn common_block_contains_all_members(
        members in proptest::collection::vec(
            (-0.05f64..0.05, -0.05f64..0.05, 1e-4f64..0.02),
            1..6,
        )
    ) {
        let mut store = BlockStore::new();
        let ids: Vec<PaveBlockId> = members
            .iter()
            .enumerate()
            .map(|(i, &(dx, dy, tol))| {
                let a = IntersectionRecord::new(0.0, Point3d::new(dx, dy, 0.0), tol);
                let b = IntersectionRecord::new(1.0, Point3d::new(1.0 + dx, dy, 0.0), tol);
                store.insert_block(
                    PaveBlock::new(CurveRef(i as u32), a, b, tol, FaceRef(i as u32)).unwrap(),
                )
            })
            .collect();

        let cb = store.merge_chain(&ids).unwrap();
        let common = &store.common[cb];

        let max_member_tol = members.iter().map(|m| m.2).fold(0.0f64, f64::max);
        prop_assert!(common.tolerance() >= max_member_tol);

        let rep_mid = store.blocks[common.representative()].midpoint();
        for &(member, _) in common.contributors() {
            let deviation = rep_mid.distance_to(&store.blocks[member].midpoint());
            prop_assert!(deviation <= common.tolerance() + 1e-12);
        }
        prop_assert_eq!(common.contributors().len(), members.len());
    }
}

// ---------------------------------------------------------------------------
// 7. Tolerant comparison behaves as max-of-tolerances, symmetrically
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn tolerant_compare_uses_larger_tolerance(
        a in -100.0f64..100.0,
        b in -100.0f64..100.0,
        tol_a in 1e-9f64..1.0,
        tol_b in 1e-9f64..1.0,
    ) {
        let x = TolerantScalar::new(a, tol_a);
        let y = TolerantScalar::new(b, tol_b);
        prop_assert_eq!(x.coincident(&y), (a - b).abs() <= tol_a.max(tol_b));
        prop_assert_eq!(x.coincident(&y), y.coincident(&x));
        prop_assert_eq!(params_coincident(a, tol_a, b, tol_b), x.coincident(&y));
    }
}
