//! Human-readable rendering for diagnostics and contradiction messages.

use std::fmt;

use crate::graph::{Graph, Node, NodeKey, Op, Operand};
use crate::literal::{BoolSet, Interval, Literal, NumberSet};

impl fmt::Display for BoolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.contains(true), self.contains(false)) {
            (true, true) => write!(f, "{{True, False}}"),
            (true, false) => write!(f, "{{True}}"),
            (false, true) => write!(f, "{{False}}"),
            (false, false) => write!(f, "{{}}"),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo() == self.hi() {
            write!(f, "{}", self.lo())
        } else {
            write!(f, "[{}, {}]", self.lo(), self.hi())
        }
    }
}

impl fmt::Display for NumberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let intervals = self.intervals();
        if intervals.is_empty() {
            return write!(f, "{{}}");
        }
        if let [only] = intervals {
            return write!(f, "{only}");
        }
        write!(f, "{{")?;
        for (i, iv) in intervals.iter().enumerate() {
            if i > 0 {
                write!(f, " u ")?;
            }
            write!(f, "{iv}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Graph {
    /// Render a node as a nested term, chasing redirects.
    pub fn render(&self, key: NodeKey) -> String {
        self.render_operand(&Operand::Node(key))
    }

    pub fn render_operand(&self, operand: &Operand) -> String {
        match self.resolve(operand) {
            Operand::Literal(lit) => lit.to_string(),
            Operand::Node(key) => match self.node(key) {
                Some(Node::Parameter { name }) => name.clone(),
                Some(Node::Expression(expr)) => {
                    let operands: Vec<String> = expr
                        .operands
                        .iter()
                        .map(|operand| self.render_operand(operand))
                        .collect();
                    let bang = if expr.constrained { "!" } else { "" };
                    format!("{}{}({})", expr.op, bang, operands.join(", "))
                }
                Some(Node::Redirected(_)) | None => "<dangling>".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Literal::number(5.0).to_string(), "5");
        assert_eq!(Literal::interval(1.0, 2.5).to_string(), "[1, 2.5]");
        assert_eq!(Literal::from(true).to_string(), "{True}");
        assert_eq!(Literal::Bool(BoolSet::BOTH).to_string(), "{True, False}");
    }

    #[test]
    fn test_expression_rendering() {
        let mut g = Graph::new();
        let p = g.add_parameter("A");
        let e = g.add_expression(
            Op::Add,
            vec![p.into(), Literal::number(5.0).into()],
            false,
        );
        assert_eq!(g.render(e), "Add(A, 5)");
    }
}
