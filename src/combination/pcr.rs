//! Proportional conflict redistribution rules.
//!
//! Where Dempster's rule rescales conflict away and Yager's declares it
//! ignorance, the PCR family returns each conflicting product to the focal
//! sets that caused it, in proportion to their masses:
//!
//! ```text
//! PCR5, pair (A, B) with A ∩ B = ∅:
//!   A gains m₁(A)·m₂(B) · m₁(A) / (m₁(A) + m₂(B))
//!   B gains m₁(A)·m₂(B) · m₂(B) / (m₁(A) + m₂(B))
//! ```
//!
//! PCR6 generalizes this to N sources by enumerating every choice of one
//! focal element per source — O(∏ᵢ |focalsᵢ|) tuples, a combinatorial cost
//! that bounds practical use to sources with few focal elements each.
//! Neither rule is associative; folding them over more than two sources is
//! order-sensitive by contract.
//!
//! # References
//!
//! - Smarandache, F., & Dezert, J. (2005). Information Fusion Based on New
//!   Proportional Conflict Redistribution Rules. Information Fusion 8(3).
//! - Martin, A., & Osswald, C. (2006). A new generalization of the
//!   proportional conflict redistribution rule stable in terms of decision.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::EvidenceError;
use crate::frame::Subset;
use crate::mass::MassFunction;

use super::basic::cross_product;
use super::unify_frames;

/// Combine two sources with pairwise proportional conflict redistribution.
pub fn combine_pcr5(
    m1: &MassFunction,
    m2: &MassFunction,
) -> Result<MassFunction, EvidenceError> {
    let unified = unify_frames(&[m1, m2])?;
    let left = &unified.masses[0];
    let right = &unified.masses[1];

    let mut accumulated = cross_product(left, right, Subset::intersection);
    let conflict = accumulated.remove(&Subset::EMPTY).unwrap_or(0.0);
    trace!(conflict, rule = "PCR5", "redistributing conflict pairwise");

    if conflict > 0.0 {
        for (a, va) in left {
            for (b, vb) in right {
                if a.intersects(*b) {
                    continue;
                }
                // Stored masses are strictly positive, so the denominator is
                // never zero.
                let product = va * vb;
                let total = va + vb;
                *accumulated.entry(*a).or_insert(0.0) += product * va / total;
                *accumulated.entry(*b).or_insert(0.0) += product * vb / total;
            }
        }
    }

    Ok(MassFunction::from_parts(
        unified.frame,
        unified.origin,
        accumulated.into_iter().collect(),
    ))
}

/// Combine N ≥ 1 sources with proportional conflict redistribution.
///
/// Enumerates the full cross product of focal choices, one per source. A
/// tuple whose intersection is non-empty contributes conjunctively; a
/// conflicting tuple's product mass flows back to each contributing focal
/// element in proportion to its mass, so no mass is lost. Over exactly two
/// sources this coincides with [`combine_pcr5`].
pub fn combine_pcr6(sources: &[MassFunction]) -> Result<MassFunction, EvidenceError> {
    let (first, rest) = sources.split_first().ok_or_else(|| {
        EvidenceError::Validation("combine_pcr6 needs at least one source".into())
    })?;
    if rest.is_empty() {
        return Ok(first.clone());
    }

    let refs: Vec<&MassFunction> = sources.iter().collect();
    let unified = unify_frames(&refs)?;
    let focals: Vec<Vec<(Subset, f64)>> = unified
        .masses
        .iter()
        .map(|m| m.iter().map(|(s, v)| (*s, *v)).collect())
        .collect();
    let tuple_count: usize = focals.iter().map(Vec::len).product();
    trace!(
        sources = focals.len(),
        tuples = tuple_count,
        rule = "PCR6",
        "enumerating focal cross product"
    );

    let full = unified.frame.full_set();
    let mut accumulated: FxHashMap<Subset, f64> = FxHashMap::default();
    let mut indices = vec![0usize; focals.len()];
    'tuples: loop {
        let mut meet = full;
        let mut product = 1.0;
        let mut denominator = 0.0;
        for (source, &index) in focals.iter().zip(&indices) {
            let (subset, mass) = source[index];
            meet = meet.intersection(subset);
            product *= mass;
            denominator += mass;
        }

        if !meet.is_empty() {
            *accumulated.entry(meet).or_insert(0.0) += product;
        } else {
            for (source, &index) in focals.iter().zip(&indices) {
                let (subset, mass) = source[index];
                *accumulated.entry(subset).or_insert(0.0) += product * mass / denominator;
            }
        }

        // Odometer advance over the focal choices.
        let mut position = focals.len();
        loop {
            if position == 0 {
                break 'tuples;
            }
            position -= 1;
            indices[position] += 1;
            if indices[position] < focals[position].len() {
                break;
            }
            indices[position] = 0;
        }
    }

    Ok(MassFunction::from_parts(
        unified.frame,
        unified.origin,
        accumulated.into_iter().collect(),
    ))
}
