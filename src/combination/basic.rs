//! Conjunctive and disjunctive combination.
//!
//! Both rules iterate the cross product of the operands' focal elements and
//! accumulate the mass product onto a combined subset:
//!
//! ```text
//! conjunctive:  m₁₂(C) = Σ_{A ∩ B = C} m₁(A)·m₂(B)   (C may be ∅)
//! disjunctive:  m₁₂(C) = Σ_{A ∪ B = C} m₁(A)·m₂(B)
//! ```
//!
//! The unnormalized conjunctive sum is a first-class mode, not an internal
//! detail: every advanced rule starts from it and applies its own conflict
//! policy.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::EvidenceError;
use crate::frame::Subset;
use crate::mass::MassFunction;

use super::unify_frames;

/// Whether the conjunctive sum strips and renormalizes the conflict mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Dempster's rule: remove m(∅), rescale the rest.
    Normalized,
    /// Smets' conjunctive sum: leave the conflict mass on ∅.
    Unnormalized,
}

/// Combine two mass functions conjunctively.
///
/// In [`Normalization::Normalized`] mode this is Dempster's rule; it signals
/// [`EvidenceError::TotalConflict`] when the sources are fully contradictory
/// (all product mass falls on ∅).
pub fn combine_conjunctive(
    m1: &MassFunction,
    m2: &MassFunction,
    normalization: Normalization,
) -> Result<MassFunction, EvidenceError> {
    let unified = unify_frames(&[m1, m2])?;
    let product = cross_product(&unified.masses[0], &unified.masses[1], Subset::intersection);

    let conflict = product.get(&Subset::EMPTY).copied().unwrap_or(0.0);
    trace!(conflict, rule = "conjunctive", "combined two sources");

    match normalization {
        Normalization::Unnormalized => Ok(MassFunction::from_parts(
            unified.frame,
            unified.origin,
            product.into_iter().collect(),
        )),
        Normalization::Normalized => {
            let mut masses: BTreeMap<Subset, f64> = product
                .into_iter()
                .filter(|(subset, _)| !subset.is_empty())
                .collect();
            let total: f64 = masses.values().sum();
            if total <= 0.0 {
                return Err(EvidenceError::TotalConflict);
            }
            for mass in masses.values_mut() {
                *mass /= total;
            }
            Ok(MassFunction::from_parts(
                unified.frame,
                unified.origin,
                masses,
            ))
        }
    }
}

/// Combine two mass functions disjunctively.
///
/// Appropriate when at least one source is reliable but it is unknown which.
/// The union of two non-empty sets is never empty, so no conflict mass can
/// arise and the result is already normalized.
pub fn combine_disjunctive(
    m1: &MassFunction,
    m2: &MassFunction,
) -> Result<MassFunction, EvidenceError> {
    let unified = unify_frames(&[m1, m2])?;
    let product = cross_product(&unified.masses[0], &unified.masses[1], Subset::union);
    Ok(MassFunction::from_parts(
        unified.frame,
        unified.origin,
        product.into_iter().collect(),
    ))
}

/// The degree of conflict between two sources: Σ m₁(A)·m₂(B) over all pairs
/// with A ∩ B = ∅.
///
/// Equals the ∅ mass of the unnormalized conjunctive sum.
pub fn conflict(m1: &MassFunction, m2: &MassFunction) -> Result<f64, EvidenceError> {
    let unified = unify_frames(&[m1, m2])?;
    let mut total = 0.0;
    for (a, va) in &unified.masses[0] {
        for (b, vb) in &unified.masses[1] {
            if !a.intersects(*b) {
                total += va * vb;
            }
        }
    }
    Ok(total)
}

/// Accumulate the pairwise mass products of two focal maps under a set
/// operation.
pub(crate) fn cross_product(
    left: &BTreeMap<Subset, f64>,
    right: &BTreeMap<Subset, f64>,
    op: fn(&Subset, Subset) -> Subset,
) -> FxHashMap<Subset, f64> {
    let mut accumulated = FxHashMap::default();
    for (a, va) in left {
        for (b, vb) in right {
            *accumulated.entry(op(a, *b)).or_insert(0.0) += va * vb;
        }
    }
    accumulated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn two_hypotheses() -> (MassFunction, MassFunction) {
        let frame = Frame::new(["a", "b"]).unwrap();
        let m1 = MassFunction::new(
            frame.clone(),
            [(vec!["a"], 0.4), (vec!["b"], 0.2), (vec!["a", "b"], 0.4)],
        )
        .unwrap();
        let m2 = MassFunction::new(
            frame,
            [(vec!["a"], 0.2), (vec!["b"], 0.6), (vec!["a", "b"], 0.2)],
        )
        .unwrap();
        (m1, m2)
    }

    #[test]
    fn test_dempster_book_example() {
        let (m1, m2) = two_hypotheses();
        let combined = combine_conjunctive(&m1, &m2, Normalization::Normalized).unwrap();
        // Products: {a} 0.24, {b} 0.40, {a,b} 0.08, ∅ 0.28; rescale by 0.72.
        assert!((combined.mass_of(["a"]).unwrap() - 0.24 / 0.72).abs() < 1e-10);
        assert!((combined.mass_of(["b"]).unwrap() - 0.40 / 0.72).abs() < 1e-10);
        assert!((combined.mass_of(["a", "b"]).unwrap() - 0.08 / 0.72).abs() < 1e-10);
        assert!((combined.total_mass() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_unnormalized_keeps_conflict_on_empty_set() {
        let (m1, m2) = two_hypotheses();
        let combined = combine_conjunctive(&m1, &m2, Normalization::Unnormalized).unwrap();
        // K = 0.4·0.6 + 0.2·0.2 = 0.28.
        assert!((combined.conflict_mass() - 0.28).abs() < 1e-10);
        assert!((combined.total_mass() - 1.0).abs() < 1e-10);
        assert!((combined.mass_of(["a"]).unwrap() - 0.24).abs() < 1e-10);
    }

    #[test]
    fn test_conjunctive_is_commutative() {
        let (m1, m2) = two_hypotheses();
        let forward = combine_conjunctive(&m1, &m2, Normalization::Normalized).unwrap();
        let backward = combine_conjunctive(&m2, &m1, Normalization::Normalized).unwrap();
        assert!(forward.approx_eq(&backward, 1e-12));
    }

    #[test]
    fn test_vacuous_is_conjunctive_identity() {
        let (m1, _) = two_hypotheses();
        let vacuous = MassFunction::vacuous(m1.frame().clone());
        let combined = combine_conjunctive(&m1, &vacuous, Normalization::Normalized).unwrap();
        assert!(combined.approx_eq(&m1, 1e-12));
    }

    #[test]
    fn test_total_conflict_is_signalled() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let m1 = MassFunction::new(frame.clone(), [(vec!["a"], 1.0)]).unwrap();
        let m2 = MassFunction::new(frame, [(vec!["b"], 1.0)]).unwrap();
        assert_eq!(
            combine_conjunctive(&m1, &m2, Normalization::Normalized).unwrap_err(),
            EvidenceError::TotalConflict
        );
        // The unnormalized sum still exists and is all conflict.
        let unnormalized = combine_conjunctive(&m1, &m2, Normalization::Unnormalized).unwrap();
        assert!((unnormalized.conflict_mass() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjunctive_accumulates_unions() {
        let (m1, m2) = two_hypotheses();
        let combined = combine_disjunctive(&m1, &m2).unwrap();
        // {a}∪{a} is the only way to reach {a}: 0.4·0.2.
        assert!((combined.mass_of(["a"]).unwrap() - 0.08).abs() < 1e-10);
        assert!((combined.mass_of(["b"]).unwrap() - 0.12).abs() < 1e-10);
        assert!((combined.mass_of(["a", "b"]).unwrap() - 0.80).abs() < 1e-10);
        assert!((combined.total_mass() - 1.0).abs() < 1e-10);
        assert_eq!(combined.conflict_mass(), 0.0);
    }

    #[test]
    fn test_vacuous_absorbs_disjunctively() {
        let (m1, _) = two_hypotheses();
        let vacuous = MassFunction::vacuous(m1.frame().clone());
        let combined = combine_disjunctive(&m1, &vacuous).unwrap();
        assert!(combined.approx_eq(&vacuous, 1e-12));
    }

    #[test]
    fn test_conflict_measure_matches_empty_set_mass() {
        let (m1, m2) = two_hypotheses();
        let k = conflict(&m1, &m2).unwrap();
        let unnormalized = combine_conjunctive(&m1, &m2, Normalization::Unnormalized).unwrap();
        assert!((k - unnormalized.conflict_mass()).abs() < 1e-12);
    }
}
