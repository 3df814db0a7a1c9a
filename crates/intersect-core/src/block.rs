//! Pave blocks and common blocks.
//!
//! Pave blocks live in a slotmap arena and are referenced by handle; a
//! common block holds a non-owning list of contributing handles plus the
//! producing face of each, so there is no ownership cycle and both
//! directions of the block/common-block relation are O(1).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use tracing::{info, instrument};

use crate::compare::points_coincident;
use crate::error::ContractViolation;
use crate::pave::IntersectionRecord;
use crate::range::ParamRange;
use geom_core::Point3d;

new_key_type! {
    pub struct PaveBlockId;
    pub struct CommonBlockId;
}

/// External identifier of the face (or solid region) that produced a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceRef(pub u32);

impl fmt::Display for FaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// External identifier of the original curve a block is a fragment of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveRef(pub u32);

/// A tolerance-bounded fragment of one original curve, bounded by two
/// intersection records and produced by exactly one face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaveBlock {
    pub curve: CurveRef,
    pub range: ParamRange,
    pub pave1: IntersectionRecord,
    pub pave2: IntersectionRecord,
    pub tolerance: f64,
    pub face: FaceRef,
}

impl PaveBlock {
    pub fn new(
        curve: CurveRef,
        pave1: IntersectionRecord,
        pave2: IntersectionRecord,
        tolerance: f64,
        face: FaceRef,
    ) -> Result<Self, ContractViolation> {
        if pave1.parameter > pave2.parameter {
            return Err(ContractViolation::InvertedRange {
                start: pave1.parameter,
                end: pave2.parameter,
            });
        }
        let range = ParamRange::new(pave1.parameter, pave2.parameter);
        Ok(Self {
            curve,
            range,
            pave1,
            pave2,
            tolerance,
            face,
        })
    }

    /// Representative point of the fragment (midpoint of the bounding paves).
    pub fn midpoint(&self) -> Point3d {
        self.pave1.point.midpoint(&self.pave2.point)
    }

    /// Geometric adjacency: two blocks touch when a bounding record of one
    /// coincides with a bounding record of the other within their combined
    /// tolerances. Symmetric by construction.
    pub fn touches(&self, other: &Self) -> bool {
        let ends_a = [&self.pave1, &self.pave2];
        let ends_b = [&other.pave1, &other.pave2];
        ends_a.iter().any(|a| {
            ends_b
                .iter()
                .any(|b| points_coincident(&a.point, self.tolerance, &b.point, other.tolerance))
        })
    }
}

/// Canonical merged representation of a chain of pave blocks.
///
/// Immutable after creation: the representative, the provenance list and the
/// consolidated tolerance are fixed at merge time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonBlock {
    representative: PaveBlockId,
    contributors: Vec<(PaveBlockId, FaceRef)>,
    tolerance: f64,
}

impl CommonBlock {
    pub fn representative(&self) -> PaveBlockId {
        self.representative
    }

    /// Full provenance: every contributing block with its producing face.
    pub fn contributors(&self) -> &[(PaveBlockId, FaceRef)] {
        &self.contributors
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// Arena for pave blocks and the common blocks merged over them.
#[derive(Debug, Default)]
pub struct BlockStore {
    pub blocks: SlotMap<PaveBlockId, PaveBlock>,
    pub common: SlotMap<CommonBlockId, CommonBlock>,
    block_to_common: SecondaryMap<PaveBlockId, CommonBlockId>,
    face_tolerances: HashMap<FaceRef, f64>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_block(&mut self, block: PaveBlock) -> PaveBlockId {
        self.blocks.insert(block)
    }

    /// The common block a pave block was merged into, if any.
    pub fn common_of(&self, block: PaveBlockId) -> Option<CommonBlockId> {
        self.block_to_common.get(block).copied()
    }

    /// The consolidated tolerance propagated to a face by merges so far.
    pub fn face_tolerance(&self, face: FaceRef) -> Option<f64> {
        self.face_tolerances.get(&face).copied()
    }

    /// Merge one chain of pave blocks into a common block.
    ///
    /// The representative is the chain's first member (chains carry their
    /// deterministic discovery order). The consolidated tolerance is the
    /// maximum over members of (member tolerance + representative-point
    /// deviation), so every member's uncertainty region is contained in the
    /// representative's.
    #[instrument(skip(self, chain), fields(members = chain.len()))]
    pub fn merge_chain(
        &mut self,
        chain: &[PaveBlockId],
    ) -> Result<CommonBlockId, ContractViolation> {
        let representative = *chain.first().ok_or(ContractViolation::EmptyChain)?;
        for &member in chain {
            if self.block_to_common.contains_key(member) {
                return Err(ContractViolation::AlreadyMerged);
            }
        }

        let rep_mid = self.blocks[representative].midpoint();
        let mut tolerance = 0.0f64;
        let mut contributors = Vec::with_capacity(chain.len());
        for &member in chain {
            let block = &self.blocks[member];
            let deviation = rep_mid.distance_to(&block.midpoint());
            tolerance = tolerance.max(block.tolerance + deviation);
            contributors.push((member, block.face));
        }

        let id = self.common.insert(CommonBlock {
            representative,
            contributors,
            tolerance,
        });
        for &member in chain {
            self.block_to_common.insert(member, id);
        }
        // Propagate the consolidated tolerance to every contributing face.
        for &(_, face) in self.common[id].contributors() {
            let entry = self.face_tolerances.entry(face).or_insert(0.0);
            *entry = entry.max(tolerance);
        }

        info!(
            members = chain.len(),
            tolerance,
            "chain merged into common block"
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::build_chains_by;
    use approx::assert_relative_eq;
    use geom_core::Point3d;

    fn record(t: f64, p: Point3d, tol: f64) -> IntersectionRecord {
        IntersectionRecord::new(t, p, tol)
    }

    fn block_between(
        curve: u32,
        a: Point3d,
        b: Point3d,
        tol: f64,
        face: u32,
    ) -> PaveBlock {
        PaveBlock::new(
            CurveRef(curve),
            record(0.0, a, tol),
            record(1.0, b, tol),
            tol,
            FaceRef(face),
        )
        .unwrap()
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = PaveBlock::new(
            CurveRef(0),
            record(2.0, Point3d::ORIGIN, 1e-6),
            record(1.0, Point3d::new(1.0, 0.0, 0.0), 1e-6),
            1e-6,
            FaceRef(0),
        )
        .unwrap_err();
        assert!(matches!(err, ContractViolation::InvertedRange { .. }));
    }

    #[test]
    fn test_touches_shared_end() {
        let shared = Point3d::new(1.0, 0.0, 0.0);
        let a = block_between(0, Point3d::ORIGIN, shared, 1e-6, 0);
        let b = block_between(1, shared, Point3d::new(2.0, 0.0, 0.0), 1e-6, 1);
        assert!(a.touches(&b));
        assert!(b.touches(&a));
        let c = block_between(2, Point3d::new(5.0, 5.0, 5.0), Point3d::new(6.0, 5.0, 5.0), 1e-6, 2);
        assert!(!a.touches(&c));
    }

    #[test]
    fn test_touches_within_combined_tolerance() {
        let a = block_between(0, Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), 0.01, 0);
        let b = block_between(
            1,
            Point3d::new(1.015, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
            0.01,
            1,
        );
        // Gap of 0.015 is inside the combined tolerance 0.02.
        assert!(a.touches(&b));
    }

    #[test]
    fn test_single_member_chain_is_thin_wrapper() {
        let mut store = BlockStore::new();
        let id = store.insert_block(block_between(
            0,
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            0.005,
            3,
        ));
        let cb = store.merge_chain(&[id]).unwrap();
        let common = &store.common[cb];
        assert_eq!(common.representative(), id);
        assert_eq!(common.contributors(), &[(id, FaceRef(3))]);
        // Sole member: no deviation, tolerance is the member's own.
        assert_relative_eq!(common.tolerance(), 0.005, epsilon = 1e-12);
        assert_eq!(store.common_of(id), Some(cb));
    }

    #[test]
    fn test_merge_keeps_provenance_and_contains_members() {
        // Three blocks from three faces along nearly the same fragment.
        let mut store = BlockStore::new();
        let ids: Vec<PaveBlockId> = [(0.01, 0u32), (0.02, 1u32), (0.015, 2u32)]
            .iter()
            .enumerate()
            .map(|(i, &(tol, face))| {
                let shift = i as f64 * 0.001;
                store.insert_block(block_between(
                    i as u32,
                    Point3d::new(0.0, shift, 0.0),
                    Point3d::new(1.0, shift, 0.0),
                    tol,
                    face,
                ))
            })
            .collect();

        let cb = store.merge_chain(&ids).unwrap();
        let common = &store.common[cb];

        // Consolidated tolerance is at least the largest contributor's.
        assert!(common.tolerance() >= 0.02);
        // Containment: every member's representative point lies within the
        // consolidated tolerance of the representative's.
        let rep_mid = store.blocks[common.representative()].midpoint();
        for &(member, _) in common.contributors() {
            let d = rep_mid.distance_to(&store.blocks[member].midpoint());
            assert!(d <= common.tolerance());
        }
        // Provenance names all three producing faces.
        let faces: Vec<u32> = common.contributors().iter().map(|&(_, f)| f.0).collect();
        assert_eq!(faces, vec![0, 1, 2]);
    }

    #[test]
    fn test_face_tolerance_propagation() {
        let mut store = BlockStore::new();
        let a = store.insert_block(block_between(
            0,
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            0.01,
            7,
        ));
        let b = store.insert_block(block_between(
            1,
            Point3d::new(0.0, 0.002, 0.0),
            Point3d::new(1.0, 0.002, 0.0),
            0.02,
            8,
        ));
        let cb = store.merge_chain(&[a, b]).unwrap();
        let tol = store.common[cb].tolerance();
        assert_eq!(store.face_tolerance(FaceRef(7)), Some(tol));
        assert_eq!(store.face_tolerance(FaceRef(8)), Some(tol));
        assert_eq!(store.face_tolerance(FaceRef(9)), None);
    }

    #[test]
    fn test_empty_chain_rejected() {
        let mut store = BlockStore::new();
        assert_eq!(
            store.merge_chain(&[]).unwrap_err(),
            ContractViolation::EmptyChain
        );
    }

    #[test]
    fn test_double_merge_rejected() {
        let mut store = BlockStore::new();
        let id = store.insert_block(block_between(
            0,
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            1e-6,
            0,
        ));
        store.merge_chain(&[id]).unwrap();
        assert_eq!(
            store.merge_chain(&[id]).unwrap_err(),
            ContractViolation::AlreadyMerged
        );
    }

    #[test]
    fn test_chains_to_common_blocks_pipeline() {
        // Blocks 0-1 share an end, block 2 is isolated: two chains, two
        // common blocks, every block in exactly one.
        let mut store = BlockStore::new();
        let shared = Point3d::new(1.0, 0.0, 0.0);
        let blocks = vec![
            block_between(0, Point3d::ORIGIN, shared, 1e-6, 0),
            block_between(1, shared, Point3d::new(2.0, 0.0, 0.0), 1e-6, 1),
            block_between(2, Point3d::new(9.0, 9.0, 9.0), Point3d::new(9.0, 9.0, 10.0), 1e-6, 2),
        ];
        let chains = build_chains_by(&blocks, |a, b| a.touches(b));
        assert_eq!(chains.len(), 2);

        let ids: Vec<PaveBlockId> = blocks.into_iter().map(|b| store.insert_block(b)).collect();
        for chain in &chains {
            let members: Vec<PaveBlockId> = chain.members.iter().map(|&i| ids[i]).collect();
            store.merge_chain(&members).unwrap();
        }
        assert_eq!(store.common.len(), 2);
        for &id in &ids {
            assert!(store.common_of(id).is_some());
        }
    }
}
