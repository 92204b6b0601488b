use std::fmt;

use crate::graph::NodeKey;
use crate::literal::Literal;

/// A detected impossibility in the constraint system: no satisfying
/// assignment exists.
///
/// This is an expected, handled outcome for the solver, not a defect. It
/// carries the involved nodes (and, for literal conflicts, the clashing
/// literals) for diagnostics, and must propagate up to the solver uncaught
/// by any folding rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Contradiction {
    msg: String,
    involved: Vec<NodeKey>,
    literals: Vec<Literal>,
}

impl Contradiction {
    pub fn new(msg: impl Into<String>, involved: Vec<NodeKey>) -> Contradiction {
        Contradiction {
            msg: msg.into(),
            involved,
            literals: Vec::new(),
        }
    }

    /// A contradiction caused by two incompatible literals.
    pub fn by_literal(
        msg: impl Into<String>,
        involved: Vec<NodeKey>,
        literals: Vec<Literal>,
    ) -> Contradiction {
        Contradiction {
            msg: msg.into(),
            involved,
            literals,
        }
    }

    pub fn involved(&self) -> &[NodeKey] {
        &self.involved
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contradiction: {}", self.msg)?;
        if !self.involved.is_empty() {
            write!(f, "; involved: {:?}", self.involved)?;
        }
        if !self.literals.is_empty() {
            write!(f, "; literals: [")?;
            for (i, lit) in self.literals.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{lit}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl std::error::Error for Contradiction {}
