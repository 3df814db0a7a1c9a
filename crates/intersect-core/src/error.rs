use thiserror::Error;

use crate::pave::DomainId;

/// Caller contract violations.
///
/// These indicate inconsistent input, not geometric difficulty: they are
/// returned immediately instead of being papered over, because a silent
/// tolerance-blind merge produces invalid solids with no visible symptom.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error(
        "record {index} references domain {found}, but the line is bounded by {first} and {second}"
    )]
    ForeignDomain {
        index: usize,
        found: DomainId,
        first: DomainId,
        second: DomainId,
    },

    #[error("touch relation is not symmetric: {from} lists {to}, but {to} does not list {from}")]
    AsymmetricTouch { from: usize, to: usize },

    #[error("touch relation references record {index}, but the collection has {len} records")]
    UnknownRecord { index: usize, len: usize },

    #[error("pave block range is inverted: [{start}, {end}]")]
    InvertedRange { start: f64, end: f64 },

    #[error("cannot merge an empty chain")]
    EmptyChain,

    #[error("chain member already belongs to a common block")]
    AlreadyMerged,
}
