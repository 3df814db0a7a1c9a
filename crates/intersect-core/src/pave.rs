use std::fmt;

use geom_core::Point3d;
use serde::{Deserialize, Serialize};

use crate::compare::params_coincident;
use crate::error::ContractViolation;

/// Identifier of a bounding domain (the restricted region of one of the two
/// surfaces whose intersection produced a line). Assigned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainId(pub u32);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Identifier of a bounding arc (one boundary edge of a domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArcId(pub u32);

impl fmt::Display for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Ownership of an intersection record by one bounding arc: which domain the
/// arc belongs to, which arc, and where on that arc the crossing sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcRef {
    pub domain: DomainId,
    pub arc: ArcId,
    pub arc_parameter: f64,
}

impl ArcRef {
    pub fn new(domain: DomainId, arc: ArcId, arc_parameter: f64) -> Self {
        Self {
            domain,
            arc,
            arc_parameter,
        }
    }

    /// Same arc crossed at the same place, within the given tolerances.
    pub fn same_crossing(&self, other: &Self, tol_a: f64, tol_b: f64) -> bool {
        self.arc == other.arc
            && params_coincident(self.arc_parameter, tol_a, other.arc_parameter, tol_b)
    }
}

/// One candidate coincidence event on a restriction line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionRecord {
    /// Parameter on the restriction line's curve.
    pub parameter: f64,
    /// The geometric point the parameter maps to.
    pub point: Point3d,
    /// Tolerance of the entity that produced the record.
    pub tolerance: f64,
    /// Ownership on the first bounding domain, when the record lies on one
    /// of its arcs.
    pub owner_first: Option<ArcRef>,
    /// Ownership on the second bounding domain.
    pub owner_second: Option<ArcRef>,
    /// Set by consolidation on the first and last surviving record.
    pub endpoint: bool,
}

impl IntersectionRecord {
    /// An in-range-only record, owned by neither boundary.
    pub fn new(parameter: f64, point: Point3d, tolerance: f64) -> Self {
        Self {
            parameter,
            point,
            tolerance,
            owner_first: None,
            owner_second: None,
            endpoint: false,
        }
    }

    pub fn owned_first(mut self, owner: ArcRef) -> Self {
        self.owner_first = Some(owner);
        self
    }

    pub fn owned_second(mut self, owner: ArcRef) -> Self {
        self.owner_second = Some(owner);
        self
    }

    pub fn is_unowned(&self) -> bool {
        self.owner_first.is_none() && self.owner_second.is_none()
    }

    pub fn is_double_owned(&self) -> bool {
        self.owner_first.is_some() && self.owner_second.is_some()
    }

    pub fn coincident_with(&self, other: &Self) -> bool {
        params_coincident(self.parameter, self.tolerance, other.parameter, other.tolerance)
    }
}

/// The intersection records on one curve, restricted by two bounding domains.
///
/// Created unsorted by the pairwise solvers; `consolidate` sorts, deduplicates
/// and marks endpoints in place; read-only for downstream reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictionLine {
    pub records: Vec<IntersectionRecord>,
    pub first_domain: DomainId,
    pub second_domain: DomainId,
}

impl RestrictionLine {
    pub fn new(first_domain: DomainId, second_domain: DomainId) -> Self {
        Self {
            records: Vec::new(),
            first_domain,
            second_domain,
        }
    }

    pub fn push(&mut self, record: IntersectionRecord) {
        self.records.push(record);
    }

    /// Every owning arc must belong to the boundary it is attached on.
    /// A mismatch is a solver bug upstream, reported immediately.
    pub fn validate_domains(&self) -> Result<(), ContractViolation> {
        for (index, record) in self.records.iter().enumerate() {
            if let Some(owner) = &record.owner_first {
                if owner.domain != self.first_domain {
                    return Err(self.foreign_domain(index, owner.domain));
                }
            }
            if let Some(owner) = &record.owner_second {
                if owner.domain != self.second_domain {
                    return Err(self.foreign_domain(index, owner.domain));
                }
            }
        }
        Ok(())
    }

    fn foreign_domain(&self, index: usize, found: DomainId) -> ContractViolation {
        ContractViolation::ForeignDomain {
            index,
            found,
            first: self.first_domain,
            second: self.second_domain,
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| w[0].parameter <= w[1].parameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(t: f64) -> IntersectionRecord {
        IntersectionRecord::new(t, Point3d::new(t, 0.0, 0.0), 1e-6)
    }

    #[test]
    fn test_ownership_predicates() {
        let r = rec(1.0);
        assert!(r.is_unowned());
        let r = rec(1.0).owned_first(ArcRef::new(DomainId(0), ArcId(3), 0.5));
        assert!(!r.is_unowned());
        assert!(!r.is_double_owned());
        let r = r.owned_second(ArcRef::new(DomainId(1), ArcId(7), 0.1));
        assert!(r.is_double_owned());
    }

    #[test]
    fn test_same_crossing() {
        let a = ArcRef::new(DomainId(0), ArcId(3), 0.5);
        let b = ArcRef::new(DomainId(0), ArcId(3), 0.5000004);
        assert!(a.same_crossing(&b, 1e-6, 1e-6));
        let c = ArcRef::new(DomainId(0), ArcId(4), 0.5);
        assert!(!a.same_crossing(&c, 1e-6, 1e-6));
    }

    #[test]
    fn test_validate_domains_rejects_foreign_arc() {
        let mut line = RestrictionLine::new(DomainId(0), DomainId(1));
        line.push(rec(0.0).owned_first(ArcRef::new(DomainId(2), ArcId(0), 0.0)));
        let err = line.validate_domains().unwrap_err();
        assert!(matches!(err, ContractViolation::ForeignDomain { index: 0, .. }));
    }

    #[test]
    fn test_validate_domains_accepts_consistent_line() {
        let mut line = RestrictionLine::new(DomainId(0), DomainId(1));
        line.push(rec(0.0).owned_first(ArcRef::new(DomainId(0), ArcId(0), 0.0)));
        line.push(
            rec(1.0)
                .owned_first(ArcRef::new(DomainId(0), ArcId(1), 0.0))
                .owned_second(ArcRef::new(DomainId(1), ArcId(9), 2.0)),
        );
        assert!(line.validate_domains().is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut line = RestrictionLine::new(DomainId(4), DomainId(9));
        line.push(rec(0.25).owned_second(ArcRef::new(DomainId(9), ArcId(1), 3.0)));
        let json = serde_json::to_string(&line).unwrap();
        let back: RestrictionLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back.records.len(), 1);
        assert_eq!(back.second_domain, DomainId(9));
        assert_eq!(back.records[0], line.records[0]);
    }
}
