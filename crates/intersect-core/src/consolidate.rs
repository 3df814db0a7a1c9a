//! Parameter consolidation for restriction lines.
//!
//! Pairwise solvers record the same physical crossing more than once: the
//! same arc crossed twice within tolerance, the same location reported from
//! both bounding domains, and in-range-only points duplicating owned ones.
//! Consolidation removes the redundancy and leaves a strictly ordered record
//! sequence with the surviving extremes marked as line endpoints.

use tracing::{debug, info, instrument};

use crate::error::ContractViolation;
use crate::pave::{ArcRef, IntersectionRecord, RestrictionLine};

#[derive(Clone, Copy)]
enum Boundary {
    First,
    Second,
}

/// Consolidate a restriction line in place.
///
/// Runs the tolerance-aware passes to a fixed point: each iteration sorts by
/// ascending parameter, filters same-boundary duplicate crossings, resolves
/// cross-boundary precedence, and drops coincident in-range-only records.
/// Terminates because every iteration either removes a record or is the last.
#[instrument(skip(line), fields(records_in = line.records.len()))]
pub fn consolidate(line: &mut RestrictionLine) -> Result<(), ContractViolation> {
    line.validate_domains()?;

    let records_in = line.records.len();
    let mut passes = 0usize;
    loop {
        passes += 1;
        sort_by_parameter(&mut line.records);
        let mut removed = filter_same_boundary(line);
        removed += merge_cross_boundary(line);
        removed += drop_unowned_duplicates(line);
        debug!(pass = passes, removed, "consolidation pass");
        if removed == 0 {
            break;
        }
    }
    sort_by_parameter(&mut line.records);
    mark_endpoints(line);

    info!(
        records_in,
        records_out = line.records.len(),
        passes,
        "restriction line consolidated"
    );
    Ok(())
}

/// Stable insertion sort by ascending parameter. Record lists are short and
/// nearly sorted after the first pass, which is the insertion-sort sweet spot.
fn sort_by_parameter(records: &mut [IntersectionRecord]) {
    for i in 1..records.len() {
        let mut j = i;
        while j > 0 && records[j - 1].parameter > records[j].parameter {
            records.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn owner_on(record: &IntersectionRecord, boundary: Boundary) -> Option<ArcRef> {
    match boundary {
        Boundary::First => record.owner_first,
        Boundary::Second => record.owner_second,
    }
}

fn owned_only_on(record: &IntersectionRecord, boundary: Boundary) -> bool {
    match boundary {
        Boundary::First => record.owner_first.is_some() && record.owner_second.is_none(),
        Boundary::Second => record.owner_second.is_some() && record.owner_first.is_none(),
    }
}

/// Pass 1: per boundary, drop the later of two records that cross the same
/// arc at the same arc parameter with coincident line parameters, i.e. the
/// same physical crossing recorded twice.
fn filter_same_boundary(line: &mut RestrictionLine) -> usize {
    let n = line.records.len();
    let mut keep = vec![true; n];
    for boundary in [Boundary::First, Boundary::Second] {
        for i in 0..n {
            if !keep[i] || !owned_only_on(&line.records[i], boundary) {
                continue;
            }
            for j in (i + 1)..n {
                if !keep[j] || !owned_only_on(&line.records[j], boundary) {
                    continue;
                }
                let a = line.records[i];
                let b = line.records[j];
                if !a.coincident_with(&b) {
                    continue;
                }
                let oa = owner_on(&a, boundary).unwrap();
                let ob = owner_on(&b, boundary).unwrap();
                if oa.same_crossing(&ob, a.tolerance, b.tolerance) {
                    keep[j] = false;
                }
            }
        }
    }
    retain(line, &keep)
}

/// Pass 2: precedence between records sharing a line parameter with
/// different ownership patterns. A record owned by both boundaries dominates
/// a single-owned one; two single-owned records on opposite boundaries merge
/// when their underlying arcs coincide, and otherwise both survive (a true
/// non-manifold crossing).
fn merge_cross_boundary(line: &mut RestrictionLine) -> usize {
    let n = line.records.len();
    let mut keep = vec![true; n];
    for i in 0..n {
        if !keep[i] {
            continue;
        }
        for j in (i + 1)..n {
            if !keep[j] {
                continue;
            }
            let a = line.records[i];
            let b = line.records[j];
            // In-range-only records are pass 3's concern.
            if a.is_unowned() || b.is_unowned() {
                continue;
            }
            if !a.coincident_with(&b) {
                continue;
            }
            match (a.is_double_owned(), b.is_double_owned()) {
                (true, true) => {
                    let first = a.owner_first.unwrap().same_crossing(
                        &b.owner_first.unwrap(),
                        a.tolerance,
                        b.tolerance,
                    );
                    let second = a.owner_second.unwrap().same_crossing(
                        &b.owner_second.unwrap(),
                        a.tolerance,
                        b.tolerance,
                    );
                    if first && second {
                        keep[j] = false;
                    }
                }
                (true, false) => keep[j] = false,
                (false, true) => keep[i] = false,
                (false, false) => {
                    if let (Some(oa), Some(ob)) = (a.owner_first, b.owner_second) {
                        if oa.same_crossing(&ob, a.tolerance, b.tolerance) {
                            line.records[i].owner_second = Some(ob);
                            keep[j] = false;
                        }
                    } else if let (Some(oa), Some(ob)) = (a.owner_second, b.owner_first) {
                        if oa.same_crossing(&ob, a.tolerance, b.tolerance) {
                            line.records[i].owner_first = Some(ob);
                            keep[j] = false;
                        }
                    }
                    // Single owners on the same boundary but different arcs:
                    // two distinct edges crossing here, keep both.
                }
            }
            if !keep[i] {
                break;
            }
        }
    }
    retain(line, &keep)
}

/// Pass 3: an in-range-only record (no ownership on either boundary) whose
/// parameter coincides with any other record carries no information and is
/// removed entirely.
fn drop_unowned_duplicates(line: &mut RestrictionLine) -> usize {
    let n = line.records.len();
    let mut keep = vec![true; n];
    for i in 0..n {
        if !line.records[i].is_unowned() {
            continue;
        }
        let duplicated = (0..n)
            .any(|j| j != i && line.records[i].coincident_with(&line.records[j]));
        if duplicated {
            keep[i] = false;
        }
    }
    retain(line, &keep)
}

fn mark_endpoints(line: &mut RestrictionLine) {
    for record in &mut line.records {
        record.endpoint = false;
    }
    if let Some(first) = line.records.first_mut() {
        first.endpoint = true;
    }
    if let Some(last) = line.records.last_mut() {
        last.endpoint = true;
    }
}

fn retain(line: &mut RestrictionLine, keep: &[bool]) -> usize {
    let before = line.records.len();
    let mut index = 0;
    line.records.retain(|_| {
        let kept = keep[index];
        index += 1;
        kept
    });
    before - line.records.len()
}
