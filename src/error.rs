//! Error taxonomy for the evidence engine.
//!
//! Every failure a caller can observe is a variant here. Internal numeric
//! cleanup (pruning zero masses, clamping sub-epsilon negative float error)
//! is handled locally and never surfaces as an error; everything structural
//! does.

/// Errors surfaced by construction, combination, and discounting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvidenceError {
    /// Two operands carry incompatible frames of discernment.
    #[error("incompatible frames of discernment: {left} vs {right}")]
    FrameMismatch { left: String, right: String },

    /// Normalization was requested but the entire mass sits on the empty
    /// set. The sources are fully contradictory; this is an evidential
    /// outcome, not an arithmetic failure.
    #[error("total conflict: all mass is assigned to the empty set")]
    TotalConflict,

    /// Canonical decomposition was requested on a dogmatic mass function.
    #[error("canonical decomposition requires a non-dogmatic mass function: {0}")]
    DogmaticInput(String),

    /// A discount factor outside [0, 1].
    #[error("reliability factor {0} is outside [0, 1]")]
    InvalidReliability(f64),

    /// A Θ-partition that does not disjointly cover the frame.
    #[error("invalid partition: {0}")]
    InvalidPartition(String),

    /// Malformed input: negative/NaN/infinite masses, labels outside the
    /// declared frame, unparseable subset strings, oversized frames.
    #[error("invalid mass assignment: {0}")]
    Validation(String),
}
