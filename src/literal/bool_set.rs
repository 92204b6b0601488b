//! Boolean subset literal.
//!
//! A `BoolSet` is the set of boolean values an expression may still take:
//! one of `{}`, `{false}`, `{true}` or `{true, false}`. Logical operators
//! lift element-wise over the cartesian product, so combining an uncertain
//! value with anything stays correctly uncertain.

/// Subset of `{true, false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolSet {
    contains_true: bool,
    contains_false: bool,
}

impl BoolSet {
    /// The empty set (no boolean value possible).
    pub const EMPTY: BoolSet = BoolSet {
        contains_true: false,
        contains_false: false,
    };
    /// Exactly `{true}`.
    pub const TRUE: BoolSet = BoolSet {
        contains_true: true,
        contains_false: false,
    };
    /// Exactly `{false}`.
    pub const FALSE: BoolSet = BoolSet {
        contains_true: false,
        contains_false: true,
    };
    /// Both values possible (undecided).
    pub const BOTH: BoolSet = BoolSet {
        contains_true: true,
        contains_false: true,
    };

    #[inline]
    pub fn contains(self, value: bool) -> bool {
        if value {
            self.contains_true
        } else {
            self.contains_false
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        !self.contains_true && !self.contains_false
    }

    #[inline]
    pub fn is_single_element(self) -> bool {
        self.contains_true != self.contains_false
    }

    /// Extract the value if this set is a singleton.
    #[inline]
    pub fn as_bool(self) -> Option<bool> {
        match (self.contains_true, self.contains_false) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }

    /// Element-wise logical negation.
    #[must_use]
    pub fn op_not(self) -> BoolSet {
        BoolSet {
            contains_true: self.contains_false,
            contains_false: self.contains_true,
        }
    }

    /// Element-wise disjunction: `{a | b : a ∈ self, b ∈ other}`.
    #[must_use]
    pub fn op_or(self, other: BoolSet) -> BoolSet {
        self.lift(other, |a, b| a | b)
    }

    /// Element-wise conjunction: `{a & b : a ∈ self, b ∈ other}`.
    #[must_use]
    pub fn op_and(self, other: BoolSet) -> BoolSet {
        self.lift(other, |a, b| a & b)
    }

    #[must_use]
    pub fn union(self, other: BoolSet) -> BoolSet {
        BoolSet {
            contains_true: self.contains_true || other.contains_true,
            contains_false: self.contains_false || other.contains_false,
        }
    }

    #[must_use]
    pub fn intersection(self, other: BoolSet) -> BoolSet {
        BoolSet {
            contains_true: self.contains_true && other.contains_true,
            contains_false: self.contains_false && other.contains_false,
        }
    }

    #[must_use]
    pub fn symmetric_difference(self, other: BoolSet) -> BoolSet {
        BoolSet {
            contains_true: self.contains_true != other.contains_true,
            contains_false: self.contains_false != other.contains_false,
        }
    }

    pub fn is_subset_of(self, other: BoolSet) -> bool {
        (!self.contains_true || other.contains_true)
            && (!self.contains_false || other.contains_false)
    }

    fn lift(self, other: BoolSet, op: impl Fn(bool, bool) -> bool) -> BoolSet {
        let mut out = BoolSet::EMPTY;
        for a in [false, true] {
            if !self.contains(a) {
                continue;
            }
            for b in [false, true] {
                if !other.contains(b) {
                    continue;
                }
                if op(a, b) {
                    out.contains_true = true;
                } else {
                    out.contains_false = true;
                }
            }
        }
        out
    }
}

impl From<bool> for BoolSet {
    fn from(value: bool) -> Self {
        if value {
            BoolSet::TRUE
        } else {
            BoolSet::FALSE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        assert_eq!(BoolSet::TRUE.as_bool(), Some(true));
        assert_eq!(BoolSet::FALSE.as_bool(), Some(false));
        assert_eq!(BoolSet::BOTH.as_bool(), None);
        assert_eq!(BoolSet::EMPTY.as_bool(), None);
        assert!(BoolSet::TRUE.is_single_element());
        assert!(!BoolSet::BOTH.is_single_element());
        assert!(BoolSet::EMPTY.is_empty());
    }

    #[test]
    fn test_or_short_circuits_through_uncertainty() {
        // True | anything non-empty is True
        assert_eq!(BoolSet::TRUE.op_or(BoolSet::BOTH), BoolSet::TRUE);
        assert_eq!(BoolSet::FALSE.op_or(BoolSet::BOTH), BoolSet::BOTH);
        assert_eq!(BoolSet::TRUE.op_or(BoolSet::EMPTY), BoolSet::EMPTY);
    }

    #[test]
    fn test_not_involution() {
        for s in [BoolSet::EMPTY, BoolSet::TRUE, BoolSet::FALSE, BoolSet::BOTH] {
            assert_eq!(s.op_not().op_not(), s);
        }
    }

    #[test]
    fn test_subset() {
        assert!(BoolSet::TRUE.is_subset_of(BoolSet::BOTH));
        assert!(BoolSet::EMPTY.is_subset_of(BoolSet::FALSE));
        assert!(!BoolSet::BOTH.is_subset_of(BoolSet::TRUE));
    }
}
