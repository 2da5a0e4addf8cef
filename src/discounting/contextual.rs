//! Contextual and Θ-contextual discounting.
//!
//! Classical discounting applies one reliability judgment to the whole
//! source. Contextual discounting refines that: the source may be reliable
//! about some hypotheses and not others, expressed as a discount rate per
//! hypothesis (or per block of a partition of Ω for the Θ variant).
//!
//! Both variants build the generalization matrix
//!
//! ```text
//! G(A, B) = ∏_{ω ∈ B} (1 − α_ω) · ∏_{ω ∈ A∖B} α_ω      for B ⊆ A ⊆ Ω
//! ```
//!
//! (block-wise for the Θ variant) and push the mass through it:
//! `m_α(A) = Σ_{B ⊆ A} G(A, B)·m(B)`, followed by pruning and
//! renormalization.
//!
//! Rates are the dual of classical reliability: a rate of 0 keeps the
//! source's opinion about that context, a rate of 1 erases it.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::EvidenceError;
use crate::frame::Subset;
use crate::mass::MassFunction;

/// Discount a source with one rate per hypothesis.
///
/// `rates` maps hypothesis labels to discount rates in [0, 1]; labels absent
/// from the map default to 0 (no discount). All-zero rates return the
/// source unchanged; all-one rates collapse it to the vacuous assignment.
pub fn discount_contextual(
    m: &MassFunction,
    rates: &BTreeMap<String, f64>,
) -> Result<MassFunction, EvidenceError> {
    let frame = m.frame();
    let mut per_element = vec![0.0; frame.len()];
    for (label, rate) in rates {
        let index = frame.index_of(label).ok_or_else(|| {
            EvidenceError::Validation(format!(
                "discount context {label:?} is not in the frame of discernment"
            ))
        })?;
        if !(0.0..=1.0).contains(rate) {
            return Err(EvidenceError::InvalidReliability(*rate));
        }
        per_element[index] = *rate;
    }

    if per_element.iter().all(|rate| *rate == 0.0) {
        return Ok(m.clone());
    }
    if per_element.iter().all(|rate| *rate == 1.0) {
        return Ok(vacuous_like(m));
    }

    let matrix = element_matrix(m, &per_element);
    apply_matrix(m, &matrix)
}

/// Discount a source with one rate per block of a partition of Ω.
///
/// `partition` and `rates` run in parallel: `rates[i]` is the discount rate
/// for `partition[i]`. The blocks must be non-empty, pairwise disjoint, and
/// jointly cover the frame.
pub fn discount_theta_contextual(
    m: &MassFunction,
    partition: &[Vec<String>],
    rates: &[f64],
) -> Result<MassFunction, EvidenceError> {
    if partition.len() != rates.len() {
        return Err(EvidenceError::InvalidPartition(format!(
            "{} blocks but {} discount rates",
            partition.len(),
            rates.len()
        )));
    }

    let frame = m.frame();
    let mut blocks = Vec::with_capacity(partition.len());
    let mut covered = Subset::EMPTY;
    for labels in partition {
        let block = frame.subset_of(labels).map_err(|_| {
            EvidenceError::InvalidPartition(format!(
                "block {labels:?} contains elements outside the frame"
            ))
        })?;
        if block.is_empty() {
            return Err(EvidenceError::InvalidPartition(
                "partition blocks must be non-empty".into(),
            ));
        }
        if block.intersects(covered) {
            return Err(EvidenceError::InvalidPartition(
                "partition blocks overlap".into(),
            ));
        }
        covered = covered.union(block);
        blocks.push(block);
    }
    if covered != frame.full_set() {
        return Err(EvidenceError::InvalidPartition(
            "partition does not cover the frame of discernment".into(),
        ));
    }
    for rate in rates {
        if !(0.0..=1.0).contains(rate) {
            return Err(EvidenceError::InvalidReliability(*rate));
        }
    }

    if rates.iter().all(|rate| *rate == 0.0) {
        return Ok(m.clone());
    }
    if rates.iter().all(|rate| *rate == 1.0) {
        return Ok(vacuous_like(m));
    }

    let matrix = block_matrix(m, &blocks, rates);
    apply_matrix(m, &matrix)
}

/// The vacuous assignment on the same frame, preserving the frame origin.
fn vacuous_like(m: &MassFunction) -> MassFunction {
    let mut masses = BTreeMap::new();
    masses.insert(m.frame().full_set(), 1.0);
    MassFunction::from_parts(m.frame().clone(), m.origin(), masses)
}

/// G(A, B) over all non-empty B ⊆ A, with per-element rates.
fn element_matrix(
    m: &MassFunction,
    per_element: &[f64],
) -> FxHashMap<(Subset, Subset), f64> {
    build_matrix(m, |a, b| {
        let mut value = 1.0;
        for (index, rate) in per_element.iter().enumerate() {
            if b.contains_index(index) {
                value *= 1.0 - rate;
            } else if a.contains_index(index) {
                value *= rate;
            }
        }
        value
    })
}

/// G(A, B) with contexts given by partition blocks: a block touching B
/// contributes 1 − α, a block touching only A contributes α.
fn block_matrix(
    m: &MassFunction,
    blocks: &[Subset],
    rates: &[f64],
) -> FxHashMap<(Subset, Subset), f64> {
    build_matrix(m, |a, b| {
        let mut value = 1.0;
        for (block, rate) in blocks.iter().zip(rates) {
            if block.intersects(b) {
                value *= 1.0 - rate;
            } else if block.intersects(a) {
                value *= rate;
            }
        }
        value
    })
}

fn build_matrix(
    m: &MassFunction,
    coefficient: impl Fn(Subset, Subset) -> f64,
) -> FxHashMap<(Subset, Subset), f64> {
    let mut matrix = FxHashMap::default();
    for a in m.frame().powerset() {
        if a.is_empty() {
            continue;
        }
        // Enumerate non-empty B ⊆ A by walking submasks.
        let mut bits = a.bits();
        while bits != 0 {
            let b = Subset::from_bits(bits);
            matrix.insert((a, b), coefficient(a, b));
            bits = (bits - 1) & a.bits();
        }
    }
    trace!(entries = matrix.len(), "built generalization matrix");
    matrix
}

/// Push the mass through the matrix, prune zeros, renormalize.
fn apply_matrix(
    m: &MassFunction,
    matrix: &FxHashMap<(Subset, Subset), f64>,
) -> Result<MassFunction, EvidenceError> {
    let mut masses = BTreeMap::new();
    for a in m.frame().powerset() {
        if a.is_empty() {
            continue;
        }
        let mut value = 0.0;
        for (b, mass) in m.focal_elements() {
            if b.is_empty() || !b.is_subset_of(a) {
                continue;
            }
            value += matrix.get(&(a, b)).copied().unwrap_or(0.0) * mass;
        }
        if value > 0.0 {
            masses.insert(a, value);
        }
    }

    let total: f64 = masses.values().sum();
    if total <= 0.0 {
        return Err(EvidenceError::TotalConflict);
    }
    for mass in masses.values_mut() {
        *mass /= total;
    }
    Ok(MassFunction::from_parts(
        m.frame().clone(),
        m.origin(),
        masses,
    ))
}
