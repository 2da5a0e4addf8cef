//! Dempster-Shafer evidence theory: belief over sets of hypotheses rather
//! than single outcomes.
//!
//! A source of evidence is a [`MassFunction`] distributing one unit of
//! belief over subsets of a [`Frame`] of discernment; mass on a non-singleton
//! subset is honest ignorance, mass on Ω is total ignorance. From the mass
//! function three measures derive: belief (provable support), plausibility
//! (what the evidence fails to refute), and commonality (the transform the
//! canonical decomposition runs on).
//!
//! # What lives where
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`frame`] | Frame of discernment, bitmask subsets, powerset, `"{a,b}"` codec |
//! | [`mass`] | Mass functions, Bel/Pl/Q, normalization, interchange records |
//! | [`combination`] | Conjunctive/disjunctive sums, Yager, Dubois-Prade, Zhang, PCR5/PCR6, cautious/bold |
//! | [`discounting`] | Classical, contextual, and Θ-contextual reliability discounting |
//! | [`error`] | The [`EvidenceError`] taxonomy |
//!
//! # Example
//!
//! ```
//! use evidential::{combine_conjunctive, Frame, MassFunction, Normalization};
//!
//! let frame = Frame::new(["red", "green", "blue"])?;
//! let sensor = MassFunction::new(
//!     frame.clone(),
//!     [(vec!["red"], 0.6), (vec!["red", "green"], 0.4)],
//! )?;
//! let witness = MassFunction::new(
//!     frame.clone(),
//!     [(vec!["red"], 0.3), (vec!["red", "green", "blue"], 0.7)],
//! )?;
//!
//! let fused = combine_conjunctive(&sensor, &witness, Normalization::Normalized)?;
//! let red = frame.subset_of(["red"])?;
//! assert!(fused.belief(red) > sensor.belief(red));
//! # Ok::<(), evidential::EvidenceError>(())
//! ```
//!
//! # Design notes
//!
//! Everything is a pure function over immutable values: rules take mass
//! functions by reference and return new ones, so values are freely
//! shareable across threads. The powerset-wide algorithms (canonical
//! decomposition, contextual discounting) are O(2^|Ω|)–O(3^|Ω|) by nature —
//! that is the mathematics of Möbius inversion on the subset lattice, and
//! the crate keeps it explicit instead of approximating.
//!
//! # References
//!
//! - Shafer, G. (1976). A Mathematical Theory of Evidence. Princeton
//!   University Press.
//! - Smets, P. (1990). The Combination of Evidence in the Transferable
//!   Belief Model. IEEE TPAMI 12(5).
//! - Denœux, T. (2008). Conjunctive and Disjunctive Combination of Belief
//!   Functions Induced by Non-Distinct Bodies of Evidence. Artificial
//!   Intelligence 172(2-3).

pub mod combination;
pub mod discounting;
pub mod error;
pub mod frame;
pub mod mass;

pub use combination::{
    combine_bold, combine_cautious, combine_conjunctive, combine_disjunctive,
    combine_dubois_prade, combine_multiple, combine_pcr5, combine_pcr6, combine_yager,
    combine_zhang, conflict, weight_function, CombinationRule, Normalization,
};
pub use discounting::{discount_classical, discount_contextual, discount_theta_contextual};
pub use error::EvidenceError;
pub use frame::{Frame, Powerset, Subset, MAX_FRAME_SIZE};
pub use mass::{FrameOrigin, MassFunction, MassFunctionRecord, NORMALIZATION_TOLERANCE};
