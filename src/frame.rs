//! Frame of discernment and canonical subset representation.
//!
//! A frame Ω is the finite set of mutually exclusive, exhaustive atomic
//! hypotheses a problem can resolve to. Subsets of Ω are represented as
//! bitmasks over the frame's sorted element ordering, so the set algebra
//! every combination rule leans on (intersection, union, subset tests)
//! compiles down to word operations.
//!
//! The textual form of a subset is `"{a,b}"` — labels sorted and
//! comma-joined, `"{}"` for the empty set. This is the interchange format
//! shared with external fixtures and must stay byte-stable.

use std::fmt;

use crate::error::EvidenceError;

/// Widest frame the bitmask representation supports.
pub const MAX_FRAME_SIZE: usize = 64;

/// An immutable frame of discernment: deduplicated, sorted hypothesis labels.
///
/// Equality and hashing are by element set; since labels are stored sorted,
/// set equality coincides with representation equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    elements: Vec<String>,
}

impl Frame {
    /// Build a frame from hypothesis labels. Duplicates are merged; an empty
    /// collection yields the (valid, trivial) empty frame.
    ///
    /// Labels must be non-empty and free of `,`, `{` and `}` so the textual
    /// subset codec stays unambiguous.
    pub fn new<I, S>(labels: I) -> Result<Self, EvidenceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut elements: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if label.is_empty() {
                return Err(EvidenceError::Validation(
                    "frame labels must be non-empty".into(),
                ));
            }
            if label.contains([',', '{', '}']) {
                return Err(EvidenceError::Validation(format!(
                    "frame label {label:?} contains a reserved character"
                )));
            }
            elements.push(label);
        }
        elements.sort();
        elements.dedup();
        if elements.len() > MAX_FRAME_SIZE {
            return Err(EvidenceError::Validation(format!(
                "frame has {} elements; at most {MAX_FRAME_SIZE} are supported",
                elements.len()
            )));
        }
        Ok(Self { elements })
    }

    /// Number of atomic hypotheses.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True for the trivial empty frame.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Membership test for a label.
    pub fn contains(&self, label: &str) -> bool {
        self.index_of(label).is_some()
    }

    /// Position of a label in the sorted element ordering.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.elements.binary_search_by(|e| e.as_str().cmp(label)).ok()
    }

    /// The sorted hypothesis labels.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Iterate over the hypothesis labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    /// The empty subset ∅.
    pub fn empty_set(&self) -> Subset {
        Subset::EMPTY
    }

    /// The full subset Ω.
    pub fn full_set(&self) -> Subset {
        if self.elements.is_empty() {
            Subset::EMPTY
        } else {
            Subset::from_bits(u64::MAX >> (64 - self.elements.len()))
        }
    }

    /// Build the canonical subset for a collection of labels.
    ///
    /// Labels outside the frame are a validation error; duplicates collapse.
    pub fn subset_of<I, S>(&self, labels: I) -> Result<Subset, EvidenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bits = 0u64;
        for label in labels {
            let label = label.as_ref();
            let index = self.index_of(label).ok_or_else(|| {
                EvidenceError::Validation(format!(
                    "element {label:?} is not in the frame of discernment"
                ))
            })?;
            bits |= 1 << index;
        }
        Ok(Subset::from_bits(bits))
    }

    /// Parse the textual subset form `"{a,b}"` (or `"{}"` for ∅).
    pub fn parse_subset(&self, text: &str) -> Result<Subset, EvidenceError> {
        let inner = text
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .ok_or_else(|| {
                EvidenceError::Validation(format!("subset string {text:?} is not brace-delimited"))
            })?;
        if inner.is_empty() {
            return Ok(Subset::EMPTY);
        }
        self.subset_of(inner.split(','))
    }

    /// Render a subset in the textual interchange form: sorted labels,
    /// comma-joined, brace-delimited; `"{}"` for the empty set.
    pub fn format_subset(&self, subset: Subset) -> String {
        let labels: Vec<&str> = self.subset_labels(subset).collect();
        format!("{{{}}}", labels.join(","))
    }

    /// The labels a subset selects, in frame order.
    pub fn subset_labels(&self, subset: Subset) -> impl Iterator<Item = &str> {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(i, _)| subset.contains_index(*i))
            .map(|(_, e)| e.as_str())
    }

    /// Enumerate all 2^|Ω| subsets, ∅ first and Ω last.
    ///
    /// The iterator is a plain counter over bitmasks: cloning it or calling
    /// `powerset` again restarts the enumeration, so independent consumers
    /// never interfere.
    pub fn powerset(&self) -> Powerset {
        Powerset {
            next: 0,
            count: 1u128 << self.elements.len(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.elements.join(","))
    }
}

/// A subset of a frame, encoded as a bitmask over the frame's sorted element
/// ordering.
///
/// A `Subset` is only meaningful relative to the frame it was built from;
/// all binary rules align operand frames before comparing subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subset {
    bits: u64,
}

impl Subset {
    /// The empty set ∅.
    pub const EMPTY: Subset = Subset { bits: 0 };

    /// Wrap a raw bitmask.
    pub(crate) fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// The raw bitmask.
    pub(crate) fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of elements selected.
    pub fn len(&self) -> u32 {
        self.bits.count_ones()
    }

    /// True for ∅.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Whether the element at `index` in the frame ordering is selected.
    pub fn contains_index(&self, index: usize) -> bool {
        self.bits & (1 << index) != 0
    }

    /// Set intersection.
    pub fn intersection(&self, other: Subset) -> Subset {
        Subset::from_bits(self.bits & other.bits)
    }

    /// Set union.
    pub fn union(&self, other: Subset) -> Subset {
        Subset::from_bits(self.bits | other.bits)
    }

    /// Elements of `self` not in `other`.
    pub fn difference(&self, other: Subset) -> Subset {
        Subset::from_bits(self.bits & !other.bits)
    }

    /// A ⊆ B test.
    pub fn is_subset_of(&self, other: Subset) -> bool {
        self.bits & !other.bits == 0
    }

    /// A ⊇ B test.
    pub fn is_superset_of(&self, other: Subset) -> bool {
        other.is_subset_of(*self)
    }

    /// Non-empty intersection test.
    pub fn intersects(&self, other: Subset) -> bool {
        self.bits & other.bits != 0
    }
}

/// Restartable enumeration of a frame's powerset.
#[derive(Debug, Clone)]
pub struct Powerset {
    next: u128,
    count: u128,
}

impl Iterator for Powerset {
    type Item = Subset;

    fn next(&mut self) -> Option<Subset> {
        if self.next >= self.count {
            return None;
        }
        let subset = Subset::from_bits(self.next as u64);
        self.next += 1;
        Some(subset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.count - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Powerset {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_dedups_and_sorts() {
        let frame = Frame::new(["b", "a", "b", "c"]).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.elements(), ["a", "b", "c"]);
        assert!(frame.contains("b"));
        assert!(!frame.contains("d"));
    }

    #[test]
    fn test_empty_frame_is_valid() {
        let frame = Frame::new(Vec::<String>::new()).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.full_set(), Subset::EMPTY);
        assert_eq!(frame.powerset().count(), 1);
    }

    #[test]
    fn test_frame_equality_by_content() {
        let a = Frame::new(["x", "y"]).unwrap();
        let b = Frame::new(["y", "x"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reserved_characters_rejected() {
        assert!(Frame::new(["a,b"]).is_err());
        assert!(Frame::new([""]).is_err());
        assert!(Frame::new(["{a}"]).is_err());
    }

    #[test]
    fn test_subset_algebra() {
        let frame = Frame::new(["a", "b", "c"]).unwrap();
        let ab = frame.subset_of(["a", "b"]).unwrap();
        let bc = frame.subset_of(["b", "c"]).unwrap();
        assert_eq!(frame.format_subset(ab.intersection(bc)), "{b}");
        assert_eq!(frame.format_subset(ab.union(bc)), "{a,b,c}");
        assert!(ab.intersects(bc));
        assert!(ab.is_subset_of(frame.full_set()));
        assert!(!ab.is_subset_of(bc));
        assert_eq!(ab.difference(bc).len(), 1);
    }

    #[test]
    fn test_subset_codec_round_trip() {
        let frame = Frame::new(["rain", "snow", "sun"]).unwrap();
        let parsed = frame.parse_subset("{rain,sun}").unwrap();
        assert_eq!(frame.format_subset(parsed), "{rain,sun}");
        assert_eq!(frame.parse_subset("{}").unwrap(), Subset::EMPTY);
        assert!(frame.parse_subset("rain").is_err());
        assert!(frame.parse_subset("{fog}").is_err());
    }

    #[test]
    fn test_powerset_is_restartable() {
        let frame = Frame::new(["a", "b", "c"]).unwrap();
        let first: Vec<Subset> = frame.powerset().collect();
        let second: Vec<Subset> = frame.powerset().collect();
        assert_eq!(first.len(), 8);
        assert_eq!(first, second);
        assert_eq!(first[0], Subset::EMPTY);
        assert_eq!(first[7], frame.full_set());
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let labels: Vec<String> = (0..65).map(|i| format!("h{i:02}")).collect();
        assert!(matches!(
            Frame::new(labels),
            Err(EvidenceError::Validation(_))
        ));
    }
}
