//! Literal containers: fully-known constant values.
//!
//! A literal is either a numeric interval set or a boolean subset. Literals
//! are value types: every operation returns a new literal, nothing is mutated
//! in place. Operations that only apply to one kind follow the `try_` naming
//! convention and return `Option` instead of panicking, so folding rules can
//! decline to fold rather than crash on a kind mismatch.

mod bool_set;
mod number_set;

pub use bool_set::BoolSet;
pub use number_set::{Interval, NumberSet};

/// A fully-known constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(NumberSet),
    Bool(BoolSet),
}

impl Literal {
    pub fn number(x: f64) -> Literal {
        Literal::Number(NumberSet::singleton(x))
    }

    pub fn interval(lo: f64, hi: f64) -> Literal {
        Literal::Number(NumberSet::from_bounds(lo, hi))
    }

    // Accessors ------------------------------------------------------------

    pub fn as_number(&self) -> Option<&NumberSet> {
        match self {
            Literal::Number(n) => Some(n),
            Literal::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<BoolSet> {
        match self {
            Literal::Bool(b) => Some(*b),
            Literal::Number(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Literal::Number(n) => n.is_empty(),
            Literal::Bool(b) => b.is_empty(),
        }
    }

    pub fn is_single_element(&self) -> bool {
        match self {
            Literal::Number(n) => n.is_single_element(),
            Literal::Bool(b) => b.is_single_element(),
        }
    }

    /// Exactly the singleton `{true}`.
    pub fn is_true(&self) -> bool {
        self.as_bool() == Some(BoolSet::TRUE)
    }

    /// Exactly the singleton `{false}`.
    pub fn is_false(&self) -> bool {
        self.as_bool() == Some(BoolSet::FALSE)
    }

    /// The numeric singleton `{0}`.
    pub fn is_zero(&self) -> bool {
        self.as_number().and_then(NumberSet::as_scalar) == Some(0.0)
    }

    /// The numeric singleton `{1}`.
    pub fn is_one(&self) -> bool {
        self.as_number().and_then(NumberSet::as_scalar) == Some(1.0)
    }

    // Arithmetic -----------------------------------------------------------

    pub fn try_add(&self, other: &Literal) -> Option<Literal> {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => Some(Literal::Number(a.add(b))),
            _ => None,
        }
    }

    pub fn try_mul(&self, other: &Literal) -> Option<Literal> {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => Some(Literal::Number(a.mul(b))),
            _ => None,
        }
    }

    pub fn try_pow(&self, other: &Literal) -> Option<Literal> {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => a.try_pow(b).map(Literal::Number),
            _ => None,
        }
    }

    // Set operations -------------------------------------------------------

    pub fn try_union(&self, other: &Literal) -> Option<Literal> {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => Some(Literal::Number(a.union(b))),
            (Literal::Bool(a), Literal::Bool(b)) => Some(Literal::Bool(a.union(*b))),
            _ => None,
        }
    }

    pub fn try_intersection(&self, other: &Literal) -> Option<Literal> {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => Some(Literal::Number(a.intersection(b))),
            (Literal::Bool(a), Literal::Bool(b)) => Some(Literal::Bool(a.intersection(*b))),
            _ => None,
        }
    }

    pub fn try_difference(&self, other: &Literal) -> Option<Literal> {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => Some(Literal::Number(a.difference(b))),
            _ => None,
        }
    }

    pub fn try_symmetric_difference(&self, other: &Literal) -> Option<Literal> {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => {
                Some(Literal::Number(a.symmetric_difference(b)))
            }
            (Literal::Bool(a), Literal::Bool(b)) => {
                Some(Literal::Bool(a.symmetric_difference(*b)))
            }
            _ => None,
        }
    }

    /// Subset test; `None` on kind mismatch.
    pub fn is_subset_of(&self, other: &Literal) -> Option<bool> {
        match (self, other) {
            (Literal::Number(a), Literal::Number(b)) => Some(a.is_subset_of(b)),
            (Literal::Bool(a), Literal::Bool(b)) => Some(a.is_subset_of(*b)),
            _ => None,
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(BoolSet::from(value))
    }
}

impl From<BoolSet> for Literal {
    fn from(value: BoolSet) -> Self {
        Literal::Bool(value)
    }
}

impl From<NumberSet> for Literal {
    fn from(value: NumberSet) -> Self {
        Literal::Number(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mismatch_is_not_an_error() {
        let n = Literal::number(1.0);
        let b = Literal::from(true);
        assert!(n.try_add(&b).is_none());
        assert!(n.try_union(&b).is_none());
        assert!(n.is_subset_of(&b).is_none());
        assert_ne!(n, b);
    }

    #[test]
    fn test_identity_predicates() {
        assert!(Literal::number(0.0).is_zero());
        assert!(Literal::number(1.0).is_one());
        assert!(!Literal::interval(0.0, 1.0).is_zero());
        assert!(Literal::from(true).is_true());
        assert!(!Literal::Bool(BoolSet::BOTH).is_true());
    }
}
