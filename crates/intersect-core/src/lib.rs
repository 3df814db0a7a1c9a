//! Intersection-consolidation core for Boolean operations on B-Rep solids.
//!
//! Pairwise intersection solvers produce redundant, near-duplicate,
//! tolerance-laden candidate records. This crate turns them into a minimal,
//! deterministically ordered topological skeleton:
//!
//! - [`compare`]: tolerant scalar/point coincidence (never a hard-zero compare)
//! - [`consolidate`]: per-restriction-line deduplication and ordering
//! - [`range`]: curve-on-bounded-surface parameter sub-ranges
//! - [`chain`]: connected components of the pave-block "touches" relation
//! - [`block`]: pave-block arena and common-block merging with provenance
//!
//! The core never invents tolerances: every entity arrives with its own, and
//! the core only combines them (max, or max plus geometric deviation).

pub mod block;
pub mod chain;
pub mod compare;
pub mod consolidate;
pub mod error;
pub mod pave;
pub mod range;

pub use block::{BlockStore, CommonBlock, CommonBlockId, CurveRef, FaceRef, PaveBlock, PaveBlockId};
pub use chain::{build_chains, build_chains_by, Chain};
pub use compare::{params_coincident, points_coincident, TolerantScalar};
pub use consolidate::consolidate;
pub use error::ContractViolation;
pub use pave::{ArcId, ArcRef, DomainId, IntersectionRecord, RestrictionLine};
pub use range::{
    CancelToken, ParamRange, RangeIntersector, RangeResult, RangeStatus, RefineOptions,
};
