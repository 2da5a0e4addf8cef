//! Evidence-combination rules.
//!
//! Every rule is a pure function from mass functions to a new mass function.
//! The conjunctive sum is the primitive: all advanced rules run it
//! unnormalized, isolate the conflict mass K = m(∅), and differ only in
//! where K goes.
//!
//! | Rule | Conflict policy | Source |
//! |------|-----------------|--------|
//! | Conjunctive (Dempster) | removed, rest rescaled | Shafer (1976) |
//! | Conjunctive, unnormalized | kept on ∅ | Smets (1990) |
//! | Disjunctive | cannot arise | Dubois & Prade (1988) |
//! | Yager | moved to Ω | Yager (1987) |
//! | Dubois-Prade | moved to A ∪ B per conflicting pair | Dubois & Prade (1988) |
//! | Zhang | copied to plausible focal sets | Zhang (1994) |
//! | PCR5 / PCR6 | returned to the conflicting focal sets pro rata | Smarandache & Dezert (2005), Martin & Osswald (2006) |
//! | Cautious / Bold | weight-space min / max | Denœux (2008) |
//!
//! # Frame compatibility
//!
//! Before any binary rule runs, operand frames are unified: two declared
//! frames must be element-equal, a declared frame absorbs an inferred one,
//! and two inferred frames widen to their union. Focal elements are remapped
//! into the unified frame's bit ordering, so subsets from both operands
//! compare correctly.

use std::collections::BTreeMap;

use crate::error::EvidenceError;
use crate::frame::{Frame, Subset};
use crate::mass::{FrameOrigin, MassFunction};

pub mod advanced;
pub mod basic;
pub mod canonical;
pub mod pcr;

pub use advanced::{combine_dubois_prade, combine_yager, combine_zhang};
pub use basic::{combine_conjunctive, combine_disjunctive, conflict, Normalization};
pub use canonical::{combine_bold, combine_cautious, weight_function};
pub use pcr::{combine_pcr5, combine_pcr6};

/// A binary combination rule, selectable at runtime.
///
/// PCR6 is inherently n-ary and lives outside this enum; over exactly two
/// sources it coincides with [`Pcr5`](CombinationRule::Pcr5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationRule {
    /// Dempster's rule: conjunctive sum, conflict removed and renormalized.
    Conjunctive,
    /// Conjunctive sum with the conflict mass left on ∅.
    ConjunctiveUnnormalized,
    /// Disjunctive sum; for when one source is reliable but not which.
    Disjunctive,
    /// Conflict becomes ignorance (moved to Ω).
    Yager,
    /// Conflict moves to the union of each conflicting pair.
    DuboisPrade,
    /// Conflict copied onto plausible focal sets (see [`combine_zhang`]).
    Zhang,
    /// Proportional conflict redistribution, pairwise.
    Pcr5,
    /// Weight-space minimum; for non-distinct bodies of evidence.
    Cautious,
    /// Weight-space maximum, the dual of cautious.
    Bold,
}

impl CombinationRule {
    /// Human-readable rule name.
    pub fn name(&self) -> &'static str {
        match self {
            CombinationRule::Conjunctive => "conjunctive",
            CombinationRule::ConjunctiveUnnormalized => "conjunctive (unnormalized)",
            CombinationRule::Disjunctive => "disjunctive",
            CombinationRule::Yager => "Yager",
            CombinationRule::DuboisPrade => "Dubois-Prade",
            CombinationRule::Zhang => "Zhang",
            CombinationRule::Pcr5 => "PCR5",
            CombinationRule::Cautious => "cautious",
            CombinationRule::Bold => "bold",
        }
    }

    /// Combine two mass functions under this rule.
    pub fn combine(
        &self,
        m1: &MassFunction,
        m2: &MassFunction,
    ) -> Result<MassFunction, EvidenceError> {
        match self {
            CombinationRule::Conjunctive => {
                combine_conjunctive(m1, m2, Normalization::Normalized)
            }
            CombinationRule::ConjunctiveUnnormalized => {
                combine_conjunctive(m1, m2, Normalization::Unnormalized)
            }
            CombinationRule::Disjunctive => combine_disjunctive(m1, m2),
            CombinationRule::Yager => combine_yager(m1, m2),
            CombinationRule::DuboisPrade => combine_dubois_prade(m1, m2),
            CombinationRule::Zhang => combine_zhang(m1, m2),
            CombinationRule::Pcr5 => combine_pcr5(m1, m2),
            CombinationRule::Cautious => combine_cautious(m1, m2),
            CombinationRule::Bold => combine_bold(m1, m2),
        }
    }
}

/// Fold a rule over a sequence of sources, left to right.
///
/// The fold order is the ordinal order the sources are given in. That order
/// is part of the contract: PCR5, cautious, and bold are not associative, so
/// a different order is a different (equally valid) answer.
///
/// At least one source is required; a single source returns a clone.
pub fn combine_multiple(
    sources: &[MassFunction],
    rule: CombinationRule,
) -> Result<MassFunction, EvidenceError> {
    let (first, rest) = sources.split_first().ok_or_else(|| {
        EvidenceError::Validation("combine_multiple needs at least one source".into())
    })?;
    let mut accumulated = first.clone();
    for source in rest {
        accumulated = rule.combine(&accumulated, source)?;
    }
    Ok(accumulated)
}

/// Operand mass maps remapped into one shared frame.
pub(crate) struct Unified {
    pub frame: Frame,
    pub origin: FrameOrigin,
    pub masses: Vec<BTreeMap<Subset, f64>>,
}

/// Unify the frames of a set of operands and remap their focal elements.
///
/// Declared frames must all be element-equal; inferred frames are absorbed
/// by a declared one or widened to their union when no declared frame is
/// present.
pub(crate) fn unify_frames(sources: &[&MassFunction]) -> Result<Unified, EvidenceError> {
    debug_assert!(!sources.is_empty());

    let mut declared: Option<&Frame> = None;
    for source in sources {
        if source.origin() == FrameOrigin::Declared {
            match declared {
                None => declared = Some(source.frame()),
                Some(frame) if frame == source.frame() => {}
                Some(frame) => {
                    return Err(EvidenceError::FrameMismatch {
                        left: frame.to_string(),
                        right: source.frame().to_string(),
                    });
                }
            }
        }
    }

    let (frame, origin) = match declared {
        Some(frame) => (frame.clone(), FrameOrigin::Declared),
        None => {
            let union = Frame::new(
                sources
                    .iter()
                    .flat_map(|m| m.frame().elements().iter().cloned()),
            )?;
            (union, FrameOrigin::Inferred)
        }
    };

    let masses = sources
        .iter()
        .map(|source| remap(source, &frame))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Unified {
        frame,
        origin,
        masses,
    })
}

/// Rewrite a mass function's focal bitmasks relative to `target`'s element
/// ordering.
fn remap(
    source: &MassFunction,
    target: &Frame,
) -> Result<BTreeMap<Subset, f64>, EvidenceError> {
    if source.frame() == target {
        return Ok(source.focal_elements().collect());
    }
    let mut index_map = Vec::with_capacity(source.frame().len());
    for label in source.frame().iter() {
        let index = target.index_of(label).ok_or_else(|| {
            EvidenceError::FrameMismatch {
                left: source.frame().to_string(),
                right: target.to_string(),
            }
        })?;
        index_map.push(index);
    }
    let mut remapped = BTreeMap::new();
    for (subset, mass) in source.focal_elements() {
        let mut bits = 0u64;
        for (old_index, new_index) in index_map.iter().enumerate() {
            if subset.contains_index(old_index) {
                bits |= 1 << new_index;
            }
        }
        *remapped.entry(Subset::from_bits(bits)).or_insert(0.0) += mass;
    }
    Ok(remapped)
}
