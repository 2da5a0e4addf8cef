//! Canonical conjunctive decomposition and the cautious/bold rules.
//!
//! A non-dogmatic mass function factors uniquely into a conjunctive
//! combination of (generalized) simple support functions, one weight per
//! proper subset of Ω. The factorization runs through the commonality
//! transform, a Möbius inversion over the Boolean lattice:
//!
//! ```text
//! q(A) = Σ_{B ⊇ A} m(B)                          commonality
//! w(A) = ∏_{B ⊇ A} q(B)^(±1)                     sign by |B|−|A| parity
//! q(B) = ∏_{A ⊊ Ω, B ⊄ A} w(A)                   reconstruction
//! m(A) = Σ_{B ⊇ A} (−1)^{|B|−|A|} q(B)           inversion back to mass
//! ```
//!
//! Sources that share evidence violate the independence assumption behind
//! Dempster's rule; the cautious rule combines their weight functions with a
//! pointwise minimum instead (the bold variant takes the maximum). Because
//! decomposition and reconstruction are exact inverses, both rules are
//! idempotent: combining a mass function with itself returns it unchanged.
//! That is the defining property of the pair and the first thing the tests
//! pin down.
//!
//! Every step enumerates the powerset — O(2^|Ω|) subsets, O(3^|Ω|)
//! subset/superset pairs. That cost is the mathematics, not an
//! implementation accident; these rules are for small frames.
//!
//! # References
//!
//! - Denœux, T. (2008). Conjunctive and Disjunctive Combination of Belief
//!   Functions Induced by Non-Distinct Bodies of Evidence. Artificial
//!   Intelligence 172(2-3).

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::EvidenceError;
use crate::frame::{Frame, Subset};
use crate::mass::{FrameOrigin, MassFunction};

use super::unify_frames;

/// Masses this close below zero are floating-point noise and clamp to zero;
/// anything more negative means the weight merge left the valid cone.
const NEGATIVE_MASS_TOLERANCE: f64 = 1e-9;

/// Compute the canonical decomposition weights of a non-dogmatic mass
/// function.
///
/// Returns one weight per proper subset of Ω (∅ and singletons included;
/// only Ω itself carries none). Requires `m(∅) = 0` and `m(Ω) > 0` — the
/// latter keeps every commonality strictly positive, so no quotient in the
/// inversion can divide by zero.
pub fn weight_function(
    m: &MassFunction,
) -> Result<BTreeMap<Subset, f64>, EvidenceError> {
    check_non_dogmatic(m)?;
    let size = 1usize << m.frame().len();
    let weights = decompose(m);
    Ok((0..size - 1)
        .map(|bits| (Subset::from_bits(bits as u64), weights[bits]))
        .collect())
}

/// Cautious conjunctive combination: pointwise minimum of the operands'
/// weight functions.
///
/// Built for sources whose bodies of evidence overlap; unlike Dempster's
/// rule it never counts shared evidence twice. The result lives in the
/// unnormalized conjunctive algebra and may carry conflict mass on ∅ when
/// the operands contradict each other.
pub fn combine_cautious(
    m1: &MassFunction,
    m2: &MassFunction,
) -> Result<MassFunction, EvidenceError> {
    combine_by_weights(m1, m2, f64::min, "cautious")
}

/// Bold combination: pointwise maximum of the operands' weight functions,
/// the dual of [`combine_cautious`] — it retains only the evidence both
/// sources commit to.
pub fn combine_bold(
    m1: &MassFunction,
    m2: &MassFunction,
) -> Result<MassFunction, EvidenceError> {
    combine_by_weights(m1, m2, f64::max, "bold")
}

fn combine_by_weights(
    m1: &MassFunction,
    m2: &MassFunction,
    merge: fn(f64, f64) -> f64,
    rule: &'static str,
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
    check_non_dogmatic(&left)?;
    check_non_dogmatic(&right)?;

    let w1 = decompose(&left);
    let w2 = decompose(&right);
    let merged: Vec<f64> = w1.iter().zip(&w2).map(|(a, b)| merge(*a, *b)).collect();
    trace!(
        rule,
        subsets = merged.len(),
        "merged canonical weights; reconstructing"
    );
    reconstruct(unified.frame, unified.origin, &merged, rule)
}

/// Both preconditions of the decomposition, reported separately.
fn check_non_dogmatic(m: &MassFunction) -> Result<(), EvidenceError> {
    if m.conflict_mass() > 0.0 {
        return Err(EvidenceError::DogmaticInput(
            "the empty set carries positive mass".into(),
        ));
    }
    if m.mass(m.frame().full_set()) <= 0.0 {
        return Err(EvidenceError::DogmaticInput(
            "the full frame carries no mass".into(),
        ));
    }
    Ok(())
}

/// Weight per subset bitmask, indexed `0 .. 2^n`; the Ω slot is unused and
/// holds 1.
///
/// ```text
/// w(A) = ∏_{B ⊇ A} q(B)^e,  e = +1 if |B|−|A| is odd, −1 if even
/// ```
fn decompose(m: &MassFunction) -> Vec<f64> {
    let n = m.frame().len();
    let size = 1usize << n;
    let full = (size - 1) as u64;

    let commonalities: Vec<f64> = (0..size)
        .map(|bits| m.commonality(Subset::from_bits(bits as u64)))
        .collect();

    let mut weights = vec![1.0; size];
    for (bits, weight) in weights.iter_mut().enumerate().take(size - 1) {
        let complement = full & !(bits as u64);
        let mut value = 1.0;
        // Enumerate supersets of A as A ∪ S for S ⊆ complement(A).
        let mut s = complement;
        loop {
            let q = commonalities[(bits as u64 | s) as usize];
            if s.count_ones() % 2 == 1 {
                value *= q;
            } else {
                value /= q;
            }
            if s == 0 {
                break;
            }
            s = (s - 1) & complement;
        }
        *weight = value;
    }
    weights
}

/// Rebuild a mass function from merged weights.
///
/// Commonalities come back as `q(B) = ∏_{A: B ⊄ A} w(A)`, evaluated as the
/// total weight product divided by the product over supersets of B; the
/// final Möbius inversion turns commonalities into masses. Negative results
/// within [`NEGATIVE_MASS_TOLERANCE`] are float noise and clamp to zero;
/// anything worse is rejected.
fn reconstruct(
    frame: Frame,
    origin: FrameOrigin,
    weights: &[f64],
    rule: &'static str,
) -> Result<MassFunction, EvidenceError> {
    let size = weights.len();
    let full = (size - 1) as u64;

    let total_weight: f64 = weights[..size - 1].iter().product();
    let mut commonalities = vec![0.0; size];
    for (bits, q) in commonalities.iter_mut().enumerate() {
        let complement = full & !(bits as u64);
        let mut superset_product = 1.0;
        let mut s = complement;
        loop {
            let a = bits as u64 | s;
            if a != full {
                superset_product *= weights[a as usize];
            }
            if s == 0 {
                break;
            }
            s = (s - 1) & complement;
        }
        *q = total_weight / superset_product;
    }

    let mut masses = BTreeMap::new();
    for bits in 0..size as u64 {
        let complement = full & !bits;
        let mut mass = 0.0;
        let mut s = complement;
        loop {
            let q = commonalities[(bits | s) as usize];
            if s.count_ones() % 2 == 0 {
                mass += q;
            } else {
                mass -= q;
            }
            if s == 0 {
                break;
            }
            s = (s - 1) & complement;
        }
        if mass < -NEGATIVE_MASS_TOLERANCE {
            return Err(EvidenceError::Validation(format!(
                "{rule} combination produced mass {mass} on a subset; the \
                 merged weights do not describe a belief function"
            )));
        }
        if mass > NEGATIVE_MASS_TOLERANCE {
            masses.insert(Subset::from_bits(bits), mass);
        }
    }

    Ok(MassFunction::from_parts(frame, origin, masses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn simple_support() -> MassFunction {
        // A simple support function on {a}: weight 0.1.
        MassFunction::new(
            Frame::new(["a", "b"]).unwrap(),
            [(vec!["a"], 0.9), (vec!["a", "b"], 0.1)],
        )
        .unwrap()
    }

    #[test]
    fn test_weight_function_of_simple_support() {
        let weights = weight_function(&simple_support()).unwrap();
        let frame = Frame::new(["a", "b"]).unwrap();
        let a = frame.subset_of(["a"]).unwrap();
        let b = frame.subset_of(["b"]).unwrap();
        assert!((weights[&Subset::EMPTY] - 1.0).abs() < 1e-12);
        assert!((weights[&a] - 0.1).abs() < 1e-12);
        assert!((weights[&b] - 1.0).abs() < 1e-12);
        // Ω carries no weight.
        assert_eq!(weights.len(), 3);
    }

    #[test]
    fn test_dogmatic_inputs_are_rejected() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let no_ignorance =
            MassFunction::new(frame.clone(), [(vec!["a"], 0.6), (vec!["b"], 0.4)]).unwrap();
        assert!(matches!(
            weight_function(&no_ignorance),
            Err(EvidenceError::DogmaticInput(_))
        ));

        let with_conflict = MassFunction::new(
            frame,
            [
                (Vec::<&str>::new(), 0.2),
                (vec!["a"], 0.3),
                (vec!["a", "b"], 0.5),
            ],
        )
        .unwrap();
        assert!(matches!(
            weight_function(&with_conflict),
            Err(EvidenceError::DogmaticInput(_))
        ));
    }

    #[test]
    fn test_cautious_is_idempotent() {
        let m = MassFunction::new(
            Frame::new(["a", "b", "c"]).unwrap(),
            [
                (vec!["a"], 0.35),
                (vec!["a", "b"], 0.25),
                (vec!["b", "c"], 0.15),
                (vec!["a", "b", "c"], 0.25),
            ],
        )
        .unwrap();
        let combined = combine_cautious(&m, &m).unwrap();
        assert!(combined.approx_eq(&m, 1e-9));
    }

    #[test]
    fn test_bold_is_idempotent() {
        let m = MassFunction::new(
            Frame::new(["a", "b", "c"]).unwrap(),
            [
                (vec!["b"], 0.3),
                (vec!["a", "c"], 0.3),
                (vec!["a", "b", "c"], 0.4),
            ],
        )
        .unwrap();
        let combined = combine_bold(&m, &m).unwrap();
        assert!(combined.approx_eq(&m, 1e-9));
    }

    #[test]
    fn test_cautious_keeps_the_stronger_simple_support() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let strong = MassFunction::new(
            frame.clone(),
            [(vec!["a"], 0.5), (vec!["a", "b"], 0.5)],
        )
        .unwrap();
        let weak = MassFunction::new(
            frame,
            [(vec!["a"], 0.3), (vec!["a", "b"], 0.7)],
        )
        .unwrap();
        // Two simple supports on the same focal set: min weight wins, so the
        // cautious combination is the stronger source, not a reinforcement.
        let cautious = combine_cautious(&strong, &weak).unwrap();
        assert!(cautious.approx_eq(&strong, 1e-9));
        // Bold retains only what both commit to.
        let bold = combine_bold(&strong, &weak).unwrap();
        assert!(bold.approx_eq(&weak, 1e-9));
    }

    #[test]
    fn test_cautious_concentrates_conflict_on_empty_set() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let m1 = MassFunction::new(
            frame.clone(),
            [(vec!["a"], 0.9), (vec!["a", "b"], 0.1)],
        )
        .unwrap();
        let m2 = MassFunction::new(
            frame.clone(),
            [(vec!["b"], 0.9), (vec!["a", "b"], 0.1)],
        )
        .unwrap();
        let combined = combine_cautious(&m1, &m2).unwrap();
        // Weight merge: w({a}) = w({b}) = 0.1, so q({a}) = q({b}) = 0.1 and
        // q(Ω) = 0.01; inversion puts 0.81 on ∅.
        assert!((combined.conflict_mass() - 0.81).abs() < 1e-9);
        assert!((combined.mass_of(["a"]).unwrap() - 0.09).abs() < 1e-9);
        assert!((combined.mass_of(["b"]).unwrap() - 0.09).abs() < 1e-9);
        assert!((combined.mass_of(["a", "b"]).unwrap() - 0.01).abs() < 1e-9);
        assert!((combined.total_mass() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_decomposition_round_trips_through_reconstruction() {
        let m = MassFunction::new(
            Frame::new(["x", "y", "z"]).unwrap(),
            [
                (vec!["x"], 0.2),
                (vec!["y"], 0.1),
                (vec!["x", "z"], 0.3),
                (vec!["x", "y", "z"], 0.4),
            ],
        )
        .unwrap();
        let weights = decompose(&m);
        let rebuilt =
            reconstruct(m.frame().clone(), m.origin(), &weights, "cautious").unwrap();
        assert!(rebuilt.approx_eq(&m, 1e-9));
    }
}
