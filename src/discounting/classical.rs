//! Classical (uniform) discounting.

use std::collections::BTreeMap;

use crate::error::EvidenceError;
use crate::mass::MassFunction;

/// Discount a source by a uniform reliability factor α ∈ [0, 1].
///
/// ```text
/// m^α(A) = α·m(A)            for A ≠ Ω
/// m^α(Ω) = α·m(Ω) + (1 − α)
/// ```
///
/// α = 1 trusts the source fully and returns it unchanged; α = 0 discards
/// it, collapsing to the vacuous assignment.
pub fn discount_classical(
    m: &MassFunction,
    reliability: f64,
) -> Result<MassFunction, EvidenceError> {
    if !(0.0..=1.0).contains(&reliability) {
        return Err(EvidenceError::InvalidReliability(reliability));
    }
    if reliability == 1.0 {
        return Ok(m.clone());
    }

    let full = m.frame().full_set();
    let mut masses = BTreeMap::new();
    if reliability > 0.0 {
        for (subset, mass) in m.focal_elements() {
            masses.insert(subset, reliability * mass);
        }
    }
    *masses.entry(full).or_insert(0.0) += 1.0 - reliability;

    Ok(MassFunction::from_parts(
        m.frame().clone(),
        m.origin(),
        masses,
    ))
}
