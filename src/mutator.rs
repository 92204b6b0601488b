//! The sole effect channel of the folding rules.
//!
//! Folding rules never touch the [`Graph`] directly: every expression they
//! create, every operand list they rewrite, every alias they assert goes
//! through a `Mutator` supplied by the solver for one pass. That discipline
//! is what keeps the rules unit-testable in isolation and lets the solver
//! serialize all graph mutation.
//!
//! A `Mutator` also tracks which nodes were mutated during its pass; the
//! classifier uses this to demote freshly rewritten operands to the
//! non-replaceable bucket so one pass never recombines its own output.

use rustc_hash::FxHashSet;

use crate::error::Contradiction;
use crate::graph::{Graph, Node, NodeKey, Op, Operand};
use crate::literal::{BoolSet, Literal};

pub struct Mutator<'g> {
    graph: &'g mut Graph,
    mutated: FxHashSet<NodeKey>,
    created: Vec<NodeKey>,
    changed: bool,
}

impl<'g> Mutator<'g> {
    pub fn new(graph: &'g mut Graph) -> Mutator<'g> {
        Mutator {
            graph,
            mutated: FxHashSet::default(),
            created: Vec::new(),
            changed: false,
        }
    }

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    /// Whether this pass performed any mutation at all (fixpoint check).
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Expressions created during this pass, in creation order.
    pub fn created(&self) -> &[NodeKey] {
        &self.created
    }

    pub fn has_been_mutated(&self, key: NodeKey) -> bool {
        self.mutated.contains(&key)
    }

    pub fn is_removed(&self, key: NodeKey) -> bool {
        self.graph.is_removed(key)
            || matches!(self.graph.node(key), Some(Node::Redirected(_)) | None)
    }

    // Expression creation / replacement ------------------------------------

    /// Build a new expression node over the given operands.
    ///
    /// Newly created expressions are not re-folded within the current call;
    /// the engine schedules a later pass over them.
    pub fn create_expression(&mut self, op: Op, operands: Vec<Operand>, constrain: bool) -> NodeKey {
        let key = self.graph.add_expression(op, operands, constrain);
        self.created.push(key);
        self.changed = true;
        key
    }

    /// Replace an expression's operand list in place. The node key, and with
    /// it every external reference, is preserved.
    pub fn mutate_expression(&mut self, key: NodeKey, operands: Vec<Operand>) {
        debug_assert!(self.graph.expression(key).is_some());
        self.graph.set_operands(key, operands);
        self.mutated.insert(key);
        self.changed = true;
    }

    /// Swap an expression's operator kind, keeping its operands and flags
    /// (`A ss {x} -> A is {x}`).
    pub fn mutate_expression_op(&mut self, key: NodeKey, op: Op) {
        debug_assert!(self.graph.expression(key).is_some());
        self.graph.set_op(key, op);
        self.mutated.insert(key);
        self.changed = true;
    }

    /// Replace a single-operand expression by (a copy of) its sole operand.
    /// A `constrained` flag carries over onto a constrainable replacement
    /// (`Or!(P) -> P!`).
    pub fn unpack_expression(&mut self, key: NodeKey) {
        let expr = self
            .graph
            .expression(key)
            .expect("unpack target must be a live expression");
        assert_eq!(expr.operands.len(), 1, "unpack of non-unary operand list");
        let target = expr.operands[0].clone();
        let constrained = expr.constrained;
        self.replace_with(key, target, constrained);
    }

    /// Replace an expression by an arbitrary surviving operand (double
    /// negation: the outer `Not` resolves to the innermost operand).
    pub fn neutralize_expression(&mut self, key: NodeKey, replacement: Operand) {
        let constrained = self.graph.is_constrained(key);
        self.replace_with(key, replacement, constrained);
    }

    fn replace_with(&mut self, key: NodeKey, target: Operand, propagate_constraint: bool) {
        let target = self.get_copy(&target);
        self.graph.redirect(key, target.clone());
        self.mutated.insert(key);
        self.changed = true;
        if propagate_constraint {
            if let Operand::Node(node) = target {
                self.constrain(node);
            }
        }
    }

    /// Resolve an old-graph operand reference to its current equivalent.
    pub fn get_copy(&self, operand: &Operand) -> Operand {
        self.graph.resolve(operand)
    }

    // Constraint management ------------------------------------------------

    /// Assert a constrainable expression holds. No-op on parameters,
    /// literals-by-redirect and already-constrained expressions.
    pub fn constrain(&mut self, key: NodeKey) {
        let Operand::Node(key) = self.graph.resolve(&Operand::Node(key)) else {
            return;
        };
        let Some(expr) = self.graph.expression(key) else {
            return;
        };
        if !expr.op.is_constrainable() || expr.constrained {
            return;
        }
        self.graph.set_constrained(key);
        self.changed = true;
    }

    /// Mark a constrained predicate as fully handled by the solver.
    pub fn predicate_terminate(&mut self, key: NodeKey) {
        if self.graph.mark_terminated(key) {
            self.changed = true;
        }
    }

    /// Discard a predicate that is provably redundant (e.g. a subset
    /// constraint already implied by an equality constraint).
    pub fn remove_predicate(&mut self, key: NodeKey) {
        if self.graph.mark_removed(key) {
            self.changed = true;
        }
    }

    // Literal extraction and aliasing --------------------------------------

    /// The literal an operand is known to equal: literal operands resolve to
    /// themselves, node operands through the alias table. With
    /// `allow_subset`, a subset bound counts as a (weaker) answer.
    pub fn try_extract_literal(&self, operand: &Operand, allow_subset: bool) -> Option<Literal> {
        match self.graph.resolve(operand) {
            Operand::Literal(lit) => Some(lit),
            Operand::Node(key) => {
                if let Some(lit) = self.graph.alias_literal(key) {
                    return Some(lit.clone());
                }
                if allow_subset {
                    return self.graph.subset_bound(key).cloned();
                }
                None
            }
        }
    }

    /// Assert `key` is definitionally equal to `literal`.
    ///
    /// Re-asserting an equal alias is a no-op (with `terminate`, existing
    /// matching `Is` predicates get terminated). An unequal existing alias
    /// is a [`Contradiction`]. Otherwise the backing constrained `Is`
    /// expression is created and the alias recorded.
    pub fn alias_is_literal(
        &mut self,
        key: NodeKey,
        literal: Literal,
        terminate: bool,
    ) -> Result<Option<NodeKey>, Contradiction> {
        if let Some(existing) = self.graph.alias_literal(key).cloned() {
            if existing == literal {
                if terminate {
                    for is_op in self.graph.operations_on(key, Op::Is, true) {
                        let has_lit = self
                            .graph
                            .expression(is_op)
                            .is_some_and(|expr| {
                                expr.operands
                                    .iter()
                                    .any(|operand| operand.as_literal() == Some(&existing))
                            });
                        if has_lit {
                            self.predicate_terminate(is_op);
                        }
                    }
                }
                return Ok(None);
            }
            return Err(Contradiction::by_literal(
                "tried to alias to a different literal",
                vec![key],
                vec![existing, literal],
            ));
        }

        // prevent (A is X) is X
        if let Some(expr) = self.graph.expression(key) {
            if expr.op == Op::Is
                && expr
                    .operands
                    .iter()
                    .any(|operand| operand.as_literal() == Some(&literal))
            {
                return Ok(None);
            }
        }

        let is_key = self.create_expression(
            Op::Is,
            vec![Operand::Node(key), Operand::Literal(literal.clone())],
            true,
        );
        self.graph.record_alias(key, literal);
        if terminate {
            self.predicate_terminate(is_key);
        }
        Ok(Some(is_key))
    }

    /// Alias plus predicate check: call this when the value of an expression
    /// is fully deduced. A constrained predicate deduced to anything but
    /// exactly `{true}` is a [`Contradiction`].
    pub fn alias_is_literal_and_check_predicate_eval(
        &mut self,
        key: NodeKey,
        value: Literal,
    ) -> Result<(), Contradiction> {
        self.alias_is_literal(key, value.clone(), true)?;
        let Some(expr) = self.graph.expression(key) else {
            return Ok(());
        };
        if !expr.op.is_constrainable() || !expr.constrained {
            return Ok(());
        }
        if value != Literal::Bool(BoolSet::TRUE) {
            return Err(Contradiction::new(
                "constrained predicate deduced to false",
                vec![key],
            ));
        }
        self.predicate_terminate(key);
        Ok(())
    }

    /// Assert `key`'s value lies within `literal`. An empty bound, or an
    /// existing exact alias outside the bound, is a [`Contradiction`].
    pub fn subset_literal(&mut self, key: NodeKey, literal: Literal) -> Result<(), Contradiction> {
        if literal.is_empty() {
            return Err(Contradiction::by_literal(
                "tried to subset to the empty set",
                vec![key],
                vec![literal],
            ));
        }
        if let Some(existing) = self.graph.alias_literal(key).cloned() {
            if existing.is_subset_of(&literal) != Some(true) {
                return Err(Contradiction::by_literal(
                    "tried to subset outside the aliased literal",
                    vec![key],
                    vec![existing, literal],
                ));
            }
            return Ok(());
        }
        if let Some(existing) = self.graph.subset_bound(key).cloned() {
            // already narrower, no point
            if existing.is_subset_of(&literal) == Some(true) && existing != literal {
                return Ok(());
            }
        }
        self.create_expression(
            Op::IsSubset,
            vec![Operand::Node(key), Operand::Literal(literal.clone())],
            true,
        );
        self.graph.record_subset_bound(key, literal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_is_idempotent_and_checked() {
        let mut g = Graph::new();
        let p = g.add_parameter("A");
        let e = g.add_expression(Op::Add, vec![p.into()], false);
        let mut m = Mutator::new(&mut g);

        let created = m.alias_is_literal(e, Literal::number(5.0), false).unwrap();
        assert!(created.is_some());
        // same literal again: no-op
        assert_eq!(
            m.alias_is_literal(e, Literal::number(5.0), false).unwrap(),
            None
        );
        // different literal: contradiction, not silent overwrite
        let err = m.alias_is_literal(e, Literal::number(6.0), false).unwrap_err();
        assert_eq!(err.literals().len(), 2);
    }

    #[test]
    fn test_extract_through_redirect() {
        let mut g = Graph::new();
        let p = g.add_parameter("A");
        let e = g.add_expression(Op::Add, vec![p.into()], false);
        let outer = g.add_expression(Op::Add, vec![e.into()], false);
        let mut m = Mutator::new(&mut g);
        m.alias_is_literal(e, Literal::number(3.0), false).unwrap();
        m.unpack_expression(outer);
        assert_eq!(
            m.try_extract_literal(&Operand::Node(outer), false),
            Some(Literal::number(3.0))
        );
    }

    #[test]
    fn test_unpack_propagates_constraint() {
        let mut g = Graph::new();
        let p = g.add_parameter("P");
        let inner = g.add_expression(Op::Not, vec![p.into()], false);
        let or = g.add_expression(Op::Or, vec![inner.into()], true);
        let mut m = Mutator::new(&mut g);
        m.unpack_expression(or);
        assert!(g.is_constrained(inner));
    }

    #[test]
    fn test_constrained_predicate_deduced_false_raises() {
        let mut g = Graph::new();
        let p = g.add_parameter("P");
        let q = g.add_parameter("Q");
        let is = g.add_expression(Op::Is, vec![p.into(), q.into()], true);
        let mut m = Mutator::new(&mut g);
        assert!(m
            .alias_is_literal_and_check_predicate_eval(is, Literal::from(false))
            .is_err());
    }

    #[test]
    fn test_subset_bound_conflicts_with_alias() {
        let mut g = Graph::new();
        let p = g.add_parameter("A");
        let e = g.add_expression(Op::Add, vec![p.into()], false);
        let mut m = Mutator::new(&mut g);
        m.alias_is_literal(e, Literal::number(10.0), false).unwrap();
        assert!(m.subset_literal(e, Literal::interval(0.0, 1.0)).is_err());
        assert!(m.subset_literal(e, Literal::interval(0.0, 20.0)).is_ok());
    }
}
