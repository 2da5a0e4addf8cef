//! Mass functions (basic belief assignments) and their derived measures.
//!
//! A mass function distributes one unit of belief over subsets of a frame of
//! discernment. The subsets carrying strictly positive mass are its focal
//! elements; the empty set is a legitimate focal element and represents
//! internal conflict. Three read-only projections are derived from the
//! stored focal elements alone, never from the powerset:
//!
//! ```text
//! Bel(H) = Σ_{A ⊆ H} m(A)        belief, a lower probability bound
//! Pl(H)  = Σ_{A ∩ H ≠ ∅} m(A)    plausibility, an upper probability bound
//! Q(H)   = Σ_{A ⊇ H} m(A)        commonality, the Möbius-transform domain
//! ```
//!
//! Construction is explicit about where the frame came from: `new` binds a
//! caller-declared frame, `infer` derives one from the union of the focal
//! labels. The distinction matters when two mass functions meet in a
//! combination rule (see `combination`).
//!
//! # References
//!
//! - Shafer, G. (1976). A Mathematical Theory of Evidence.
//! - Smets, P. (1990). The Combination of Evidence in the Transferable
//!   Belief Model. IEEE TPAMI 12(5).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EvidenceError;
use crate::frame::{Frame, Subset};

/// Tolerance under which a mass function counts as normalized.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-10;

/// How a mass function came by its frame.
///
/// A `Declared` frame was committed to by the caller; an `Inferred` one was
/// derived from the union of the focal elements and is open to widening when
/// the function meets an operand with more context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOrigin {
    /// The caller supplied the frame explicitly.
    Declared,
    /// The frame was inferred from the focal elements.
    Inferred,
}

/// A basic belief assignment over a frame of discernment.
///
/// Invariants once constructed:
/// - every stored mass is finite and strictly positive;
/// - every focal element is a subset of the frame;
/// - the masses sum to 1 within [`NORMALIZATION_TOLERANCE`] (the empty set
///   may carry part of that sum — subnormal assignments are representable,
///   [`MassFunction::normalized`] strips them).
///
/// All operations are read-only; combination and discounting return new
/// instances.
#[derive(Debug, Clone, PartialEq)]
pub struct MassFunction {
    frame: Frame,
    origin: FrameOrigin,
    masses: BTreeMap<Subset, f64>,
}

impl MassFunction {
    /// Build a validated mass function over a declared frame.
    ///
    /// Each assignment maps a collection of hypothesis labels to a mass.
    /// Negative, NaN, or infinite masses are rejected; zero masses are
    /// dropped; duplicate-equivalent subsets merge by summation. If the
    /// total differs from 1 beyond tolerance the result is normalized.
    pub fn new<I, L, S>(frame: Frame, assignments: I) -> Result<Self, EvidenceError>
    where
        I: IntoIterator<Item = (L, f64)>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut masses = BTreeMap::new();
        for (labels, mass) in assignments {
            let subset = frame.subset_of(labels)?;
            accumulate_checked(&mut masses, subset, mass)?;
        }
        Self::from_validated(frame, FrameOrigin::Declared, masses)
    }

    /// Build a validated mass function from canonical subsets of a declared
    /// frame.
    pub fn from_subsets<I>(frame: Frame, assignments: I) -> Result<Self, EvidenceError>
    where
        I: IntoIterator<Item = (Subset, f64)>,
    {
        let full = frame.full_set();
        let mut masses = BTreeMap::new();
        for (subset, mass) in assignments {
            if !subset.is_subset_of(full) {
                return Err(EvidenceError::Validation(
                    "focal element is not a subset of the frame".into(),
                ));
            }
            accumulate_checked(&mut masses, subset, mass)?;
        }
        Self::from_validated(frame, FrameOrigin::Declared, masses)
    }

    /// Build a mass function whose frame is inferred as the union of the
    /// focal labels.
    pub fn infer<I, L, S>(assignments: I) -> Result<Self, EvidenceError>
    where
        I: IntoIterator<Item = (L, f64)>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let staged: Vec<(Vec<String>, f64)> = assignments
            .into_iter()
            .map(|(labels, mass)| {
                (
                    labels
                        .into_iter()
                        .map(|s| s.as_ref().to_string())
                        .collect(),
                    mass,
                )
            })
            .collect();
        let frame = Frame::new(staged.iter().flat_map(|(labels, _)| labels.iter().cloned()))?;
        let mut masses = BTreeMap::new();
        for (labels, mass) in staged {
            let subset = frame.subset_of(labels)?;
            accumulate_checked(&mut masses, subset, mass)?;
        }
        Self::from_validated(frame, FrameOrigin::Inferred, masses)
    }

    /// The vacuous belief assignment: all mass on Ω, total ignorance.
    pub fn vacuous(frame: Frame) -> Self {
        let full = frame.full_set();
        let mut masses = BTreeMap::new();
        masses.insert(full, 1.0);
        Self {
            frame,
            origin: FrameOrigin::Declared,
            masses,
        }
    }

    /// Finish construction: reject empty assignments, normalize when the
    /// total strays beyond tolerance.
    fn from_validated(
        frame: Frame,
        origin: FrameOrigin,
        masses: BTreeMap<Subset, f64>,
    ) -> Result<Self, EvidenceError> {
        if masses.is_empty() {
            return Err(EvidenceError::Validation(
                "a mass function needs at least one focal element with positive mass".into(),
            ));
        }
        let candidate = Self {
            frame,
            origin,
            masses,
        };
        if candidate.is_normalized() {
            Ok(candidate)
        } else {
            debug!(
                total = candidate.total_mass(),
                "input masses do not sum to 1; normalizing"
            );
            candidate.normalized()
        }
    }

    /// Assemble a mass function from parts a rule already validated.
    ///
    /// Callers guarantee positivity and frame containment; sums may be
    /// transiently off 1 only where the rule's contract says so (Zhang).
    pub(crate) fn from_parts(
        frame: Frame,
        origin: FrameOrigin,
        masses: BTreeMap<Subset, f64>,
    ) -> Self {
        debug_assert!(masses.values().all(|m| m.is_finite() && *m > 0.0));
        Self {
            frame,
            origin,
            masses,
        }
    }

    /// The frame of discernment.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Whether the frame was declared or inferred.
    pub fn origin(&self) -> FrameOrigin {
        self.origin
    }

    /// The focal elements and their masses, in canonical subset order.
    pub fn focal_elements(&self) -> impl Iterator<Item = (Subset, f64)> + '_ {
        self.masses.iter().map(|(s, m)| (*s, *m))
    }

    /// Number of focal elements.
    pub fn focal_count(&self) -> usize {
        self.masses.len()
    }

    /// Mass of a canonical subset; 0 for non-focal subsets.
    pub fn mass(&self, subset: Subset) -> f64 {
        self.masses.get(&subset).copied().unwrap_or(0.0)
    }

    /// Mass of the subset named by `labels`.
    pub fn mass_of<I, S>(&self, labels: I) -> Result<f64, EvidenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.mass(self.frame.subset_of(labels)?))
    }

    /// Mass currently assigned to the empty set (internal conflict).
    pub fn conflict_mass(&self) -> f64 {
        self.mass(Subset::EMPTY)
    }

    /// Sum of all stored masses.
    pub fn total_mass(&self) -> f64 {
        self.masses.values().sum()
    }

    /// Whether the stored masses sum to 1 within tolerance.
    pub fn is_normalized(&self) -> bool {
        (self.total_mass() - 1.0).abs() < NORMALIZATION_TOLERANCE
    }

    /// Belief in a hypothesis: total mass of its subsets.
    pub fn belief(&self, hypothesis: Subset) -> f64 {
        self.masses
            .iter()
            .filter(|(a, _)| !a.is_empty() && a.is_subset_of(hypothesis))
            .map(|(_, m)| m)
            .sum()
    }

    /// Plausibility of a hypothesis: total mass of everything intersecting
    /// it.
    pub fn plausibility(&self, hypothesis: Subset) -> f64 {
        self.masses
            .iter()
            .filter(|(a, _)| a.intersects(hypothesis))
            .map(|(_, m)| m)
            .sum()
    }

    /// Commonality of a hypothesis: total mass of its supersets.
    pub fn commonality(&self, hypothesis: Subset) -> f64 {
        self.masses
            .iter()
            .filter(|(a, _)| a.is_superset_of(hypothesis))
            .map(|(_, m)| m)
            .sum()
    }

    /// [`belief`](Self::belief) for a hypothesis named by labels.
    pub fn belief_of<I, S>(&self, labels: I) -> Result<f64, EvidenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.belief(self.frame.subset_of(labels)?))
    }

    /// [`plausibility`](Self::plausibility) for a hypothesis named by labels.
    pub fn plausibility_of<I, S>(&self, labels: I) -> Result<f64, EvidenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.plausibility(self.frame.subset_of(labels)?))
    }

    /// [`commonality`](Self::commonality) for a hypothesis named by labels.
    pub fn commonality_of<I, S>(&self, labels: I) -> Result<f64, EvidenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.commonality(self.frame.subset_of(labels)?))
    }

    /// Strip the empty-set mass without redistributing it, then rescale the
    /// rest to sum to 1.
    ///
    /// Signals [`EvidenceError::TotalConflict`] when the empty set held
    /// everything — fully contradictory sources, a legitimate outcome that
    /// must stay distinguishable from arithmetic failure.
    pub fn normalized(&self) -> Result<Self, EvidenceError> {
        let mut masses = self.masses.clone();
        masses.remove(&Subset::EMPTY);
        let total: f64 = masses.values().sum();
        if total <= 0.0 {
            return Err(EvidenceError::TotalConflict);
        }
        for mass in masses.values_mut() {
            *mass /= total;
        }
        Ok(Self {
            frame: self.frame.clone(),
            origin: self.origin,
            masses,
        })
    }

    /// Compare two mass functions within a per-focal-element tolerance.
    ///
    /// Frames must be element-equal; every subset focal in either operand
    /// must carry masses within `tolerance` of each other.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if self.frame != other.frame {
            return false;
        }
        self.masses
            .keys()
            .chain(other.masses.keys())
            .all(|subset| (self.mass(*subset) - other.mass(*subset)).abs() <= tolerance)
    }

    /// Convert to the textual interchange record.
    pub fn to_record(&self) -> MassFunctionRecord {
        MassFunctionRecord {
            frame: self.frame.elements().to_vec(),
            masses: self
                .masses
                .iter()
                .map(|(subset, mass)| (self.frame.format_subset(*subset), *mass))
                .collect(),
        }
    }

    /// Rebuild a mass function from an interchange record.
    ///
    /// The record's frame is treated as declared; subset strings use the
    /// `"{a,b}"` codec.
    pub fn from_record(record: &MassFunctionRecord) -> Result<Self, EvidenceError> {
        let frame = Frame::new(record.frame.iter().cloned())?;
        let mut masses = BTreeMap::new();
        for (text, mass) in &record.masses {
            let subset = frame.parse_subset(text)?;
            accumulate_checked(&mut masses, subset, *mass)?;
        }
        Self::from_validated(frame, FrameOrigin::Declared, masses)
    }
}

impl fmt::Display for MassFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(Subset, f64)> = self.focal_elements().collect();
        entries.sort_by_key(|(subset, _)| (subset.len(), *subset));
        let rendered: Vec<String> = entries
            .iter()
            .map(|(subset, mass)| format!("{}: {:.4}", self.frame.format_subset(*subset), mass))
            .collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}

/// Interchange record for a mass function.
///
/// `frame` lists the hypothesis labels; `masses` maps subset strings in the
/// `"{a,b}"` form (sorted labels, comma-joined, `"{}"` for ∅) to masses.
/// The string codec matches the external fixture format byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassFunctionRecord {
    /// Frame of discernment labels.
    pub frame: Vec<String>,
    /// Focal element strings to masses.
    pub masses: BTreeMap<String, f64>,
}

/// Validate one raw mass and fold it into the accumulator.
fn accumulate_checked(
    masses: &mut BTreeMap<Subset, f64>,
    subset: Subset,
    mass: f64,
) -> Result<(), EvidenceError> {
    if !mass.is_finite() {
        return Err(EvidenceError::Validation(format!(
            "mass {mass} is not finite"
        )));
    }
    if mass < 0.0 {
        return Err(EvidenceError::Validation(format!("mass {mass} is negative")));
    }
    if mass > 0.0 {
        *masses.entry(subset).or_insert(0.0) += mass;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Frame {
        Frame::new(["rain", "snow", "sun"]).unwrap()
    }

    #[test]
    fn test_construction_merges_and_normalizes() {
        let m = MassFunction::new(
            weather(),
            [
                (vec!["rain"], 0.2),
                (vec!["rain"], 0.2),
                (vec!["rain", "sun"], 0.8),
            ],
        )
        .unwrap();
        // 0.4 + 0.8 rescales to 1/3 + 2/3.
        assert!((m.mass_of(["rain"]).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((m.total_mass() - 1.0).abs() < NORMALIZATION_TOLERANCE);
        assert_eq!(m.origin(), FrameOrigin::Declared);
    }

    #[test]
    fn test_invalid_masses_rejected() {
        assert!(matches!(
            MassFunction::new(weather(), [(vec!["rain"], -0.1)]),
            Err(EvidenceError::Validation(_))
        ));
        assert!(matches!(
            MassFunction::new(weather(), [(vec!["rain"], f64::NAN)]),
            Err(EvidenceError::Validation(_))
        ));
        assert!(matches!(
            MassFunction::new(weather(), [(vec!["fog"], 1.0)]),
            Err(EvidenceError::Validation(_))
        ));
        // Zero masses are dropped, and dropping everything is an error.
        assert!(MassFunction::new(weather(), [(vec!["rain"], 0.0)]).is_err());
    }

    #[test]
    fn test_inferred_frame_is_focal_union() {
        let m = MassFunction::infer([(vec!["b"], 0.3), (vec!["a", "c"], 0.7)]).unwrap();
        assert_eq!(m.frame().elements(), ["a", "b", "c"]);
        assert_eq!(m.origin(), FrameOrigin::Inferred);
    }

    #[test]
    fn test_measures_on_book_example() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let m = MassFunction::new(
            frame.clone(),
            [(vec!["a"], 0.4), (vec!["b"], 0.2), (vec!["a", "b"], 0.4)],
        )
        .unwrap();
        let a = frame.subset_of(["a"]).unwrap();
        let omega = frame.full_set();

        assert!((m.belief(a) - 0.4).abs() < 1e-12);
        assert!((m.plausibility(a) - 0.8).abs() < 1e-12);
        assert!((m.commonality(a) - 0.8).abs() < 1e-12);
        assert!((m.commonality(omega) - 0.4).abs() < 1e-12);
        assert!((m.belief(omega) - 1.0).abs() < 1e-12);
        assert!((m.plausibility(omega) - 1.0).abs() < 1e-12);
        assert_eq!(m.belief(Subset::EMPTY), 0.0);
    }

    #[test]
    fn test_belief_never_exceeds_plausibility() {
        let m = MassFunction::new(
            weather(),
            [
                (vec!["rain"], 0.3),
                (vec!["rain", "snow"], 0.3),
                (vec!["rain", "snow", "sun"], 0.4),
            ],
        )
        .unwrap();
        for hypothesis in m.frame().powerset() {
            assert!(m.belief(hypothesis) <= m.plausibility(hypothesis) + 1e-12);
        }
    }

    #[test]
    fn test_vacuous_is_total_ignorance() {
        let m = MassFunction::vacuous(weather());
        assert_eq!(m.focal_count(), 1);
        assert!((m.mass(m.frame().full_set()) - 1.0).abs() < 1e-12);
        let rain = m.frame().subset_of(["rain"]).unwrap();
        assert_eq!(m.belief(rain), 0.0);
        assert!((m.plausibility(rain) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_strips_conflict_without_redistributing() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let subnormal = MassFunction::new(
            frame.clone(),
            [(Vec::<&str>::new(), 0.5), (vec!["a"], 0.3), (vec!["b"], 0.2)],
        )
        .unwrap();
        // Summed to 1 at construction, so the conflict mass was retained.
        assert!((subnormal.conflict_mass() - 0.5).abs() < 1e-12);

        let normal = subnormal.normalized().unwrap();
        assert_eq!(normal.conflict_mass(), 0.0);
        assert!((normal.mass_of(["a"]).unwrap() - 0.6).abs() < 1e-12);
        assert!((normal.mass_of(["b"]).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_total_conflict_is_distinguished() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let all_conflict =
            MassFunction::new(frame, [(Vec::<&str>::new(), 1.0)]).unwrap();
        assert_eq!(
            all_conflict.normalized().unwrap_err(),
            EvidenceError::TotalConflict
        );
    }

    #[test]
    fn test_record_round_trip() {
        let m = MassFunction::new(
            weather(),
            [(vec!["rain"], 0.25), (vec!["rain", "sun"], 0.75)],
        )
        .unwrap();
        let record = m.to_record();
        assert_eq!(record.frame, ["rain", "snow", "sun"]);
        assert!(record.masses.contains_key("{rain,sun}"));
        let back = MassFunction::from_record(&record).unwrap();
        assert!(back.approx_eq(&m, 1e-12));
    }

    #[test]
    fn test_display_orders_by_cardinality() {
        let frame = Frame::new(["a", "b"]).unwrap();
        let m = MassFunction::new(
            frame,
            [(vec!["a", "b"], 0.4), (vec!["a"], 0.6)],
        )
        .unwrap();
        assert_eq!(m.to_string(), "{{a}: 0.6000, {a,b}: 0.4000}");
    }
}
