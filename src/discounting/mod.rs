//! Source-reliability discounting.
//!
//! Discounting attenuates a source toward total ignorance in proportion to
//! how unreliable it is judged to be. Three granularities:
//!
//! - [`discount_classical`]: one reliability factor for the whole source.
//! - [`discount_contextual`]: one discount rate per hypothesis — the source
//!   may be trusted about `a` but not about `b`.
//! - [`discount_theta_contextual`]: one discount rate per block of a
//!   partition of Ω, between the two in granularity.
//!
//! The contextual variants run through a generalization matrix G(A, B) over
//! all pairs B ⊆ A ⊆ Ω — O(3^|Ω|) coefficients, which bounds them to small
//! frames just like the canonical decomposition.
//!
//! # References
//!
//! - Shafer, G. (1976). A Mathematical Theory of Evidence (classical
//!   discounting).
//! - Mercier, D., Quost, B., & Denœux, T. (2005). Contextual Discounting of
//!   Belief Functions. ECSQARU 2005, LNAI 3571.

pub mod classical;
pub mod contextual;

pub use classical::discount_classical;
pub use contextual::{discount_contextual, discount_theta_contextual};
