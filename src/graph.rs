//! Expression graph substrate.
//!
//! Nodes live in a slotmap arena so keys stay valid across in-place mutation:
//! when a folding rule rewrites an expression's operand list, or replaces the
//! expression entirely, every external reference still resolves through the
//! same `NodeKey`. Full replacement is implemented by redirecting the node's
//! slot at its replacement operand; `resolve` chases redirects transitively.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::literal::Literal;

new_key_type! {
    /// Stable identity of a parameter or expression node.
    pub struct NodeKey;
}

/// Operator kind. A closed set: folding rules dispatch by exhaustive match,
/// not by open-ended virtual dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Arithmetic
    Add,
    Multiply,
    Power,
    Round,
    Abs,
    Sin,
    Log,
    Integrate,
    Differentiate,
    // Logic
    Or,
    Not,
    // Equality / inequality predicates
    Is,
    GreaterOrEqual,
    GreaterThan,
    IsSubset,
    // Sets
    Intersection,
    Union,
    SymmetricDifference,
    Difference,
}

impl Op {
    /// Every operator kind, in dispatch order.
    pub const ALL: [Op; 19] = [
        Op::Add,
        Op::Multiply,
        Op::Power,
        Op::Round,
        Op::Abs,
        Op::Sin,
        Op::Log,
        Op::Integrate,
        Op::Differentiate,
        Op::Or,
        Op::Not,
        Op::Is,
        Op::GreaterOrEqual,
        Op::GreaterThan,
        Op::IsSubset,
        Op::Intersection,
        Op::Union,
        Op::SymmetricDifference,
        Op::Difference,
    ];

    /// Whether an expression of this kind is a predicate that can carry the
    /// `constrained` flag (asserted to evaluate to `true`).
    pub fn is_constrainable(self) -> bool {
        matches!(
            self,
            Op::Or | Op::Not | Op::Is | Op::GreaterOrEqual | Op::GreaterThan | Op::IsSubset
        )
    }

    /// Whether operand order is irrelevant in this operator's algebra.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Op::Add
                | Op::Multiply
                | Op::Or
                | Op::Is
                | Op::Intersection
                | Op::Union
                | Op::SymmetricDifference
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "Add",
            Op::Multiply => "Multiply",
            Op::Power => "Power",
            Op::Round => "Round",
            Op::Abs => "Abs",
            Op::Sin => "Sin",
            Op::Log => "Log",
            Op::Integrate => "Integrate",
            Op::Differentiate => "Differentiate",
            Op::Or => "Or",
            Op::Not => "Not",
            Op::Is => "Is",
            Op::GreaterOrEqual => "GreaterOrEqual",
            Op::GreaterThan => "GreaterThan",
            Op::IsSubset => "IsSubset",
            Op::Intersection => "Intersection",
            Op::Union => "Union",
            Op::SymmetricDifference => "SymmetricDifference",
            Op::Difference => "Difference",
        }
    }
}

/// Anything usable as an expression argument: a literal constant or a
/// reference to a parameter/expression node. Identity of a `Node` operand is
/// its key; duplicate references to the same node are how `A + A` is
/// represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Node(NodeKey),
}

impl Operand {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Operand::Literal(lit) => Some(lit),
            Operand::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeKey> {
        match self {
            Operand::Node(key) => Some(*key),
            Operand::Literal(_) => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Operand::Literal(_))
    }
}

impl From<Literal> for Operand {
    fn from(lit: Literal) -> Self {
        Operand::Literal(lit)
    }
}

impl From<NodeKey> for Operand {
    fn from(key: NodeKey) -> Self {
        Operand::Node(key)
    }
}

/// A compound term: one operator applied to an ordered operand list.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub op: Op,
    pub operands: Vec<Operand>,
    /// Asserted to evaluate to `true` (predicate under active enforcement).
    pub constrained: bool,
}

#[derive(Debug, Clone)]
pub enum Node {
    /// A named unknown.
    Parameter { name: String },
    Expression(Expression),
    /// A folded-away node; all lookups resolve to the replacement.
    Redirected(Operand),
}

/// The shared expression graph. Owned by the solver; all mutation during a
/// folding pass goes through [`crate::Mutator`].
#[derive(Debug, Default)]
pub struct Graph {
    nodes: SlotMap<NodeKey, Node>,
    /// Reverse index: node -> expressions referencing it as an operand.
    users: SecondaryMap<NodeKey, Vec<NodeKey>>,
    /// Exact literal aliases (`X is! lit`), keyed by node.
    aliases: FxHashMap<NodeKey, Literal>,
    /// Subset bounds (`X ss! lit`), keyed by node.
    subset_bounds: FxHashMap<NodeKey, Literal>,
    /// Predicates discarded as redundant.
    removed: FxHashSet<NodeKey>,
    /// Predicates the solver is done with (proven, no re-visit needed).
    terminated: FxHashSet<NodeKey>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    pub fn add_parameter(&mut self, name: impl Into<String>) -> NodeKey {
        let key = self.nodes.insert(Node::Parameter { name: name.into() });
        self.users.insert(key, Vec::new());
        key
    }

    pub fn add_expression(
        &mut self,
        op: Op,
        operands: Vec<Operand>,
        constrained: bool,
    ) -> NodeKey {
        debug_assert!(!constrained || op.is_constrainable());
        let key = self.nodes.insert(Node::Expression(Expression {
            op,
            operands,
            constrained,
        }));
        self.users.insert(key, Vec::new());
        self.index_operands(key);
        key
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// The expression stored at `key`, if the node is a live expression.
    pub fn expression(&self, key: NodeKey) -> Option<&Expression> {
        match self.nodes.get(key) {
            Some(Node::Expression(expr)) => Some(expr),
            _ => None,
        }
    }

    pub fn parameter_name(&self, key: NodeKey) -> Option<&str> {
        match self.nodes.get(key) {
            Some(Node::Parameter { name }) => Some(name),
            _ => None,
        }
    }

    /// Chase redirects until the operand refers to a live node or a literal.
    pub fn resolve(&self, operand: &Operand) -> Operand {
        let mut current = operand.clone();
        while let Operand::Node(key) = current {
            match self.nodes.get(key) {
                Some(Node::Redirected(target)) => current = target.clone(),
                _ => return Operand::Node(key),
            }
        }
        current
    }

    /// Live expressions of one operator kind, shallowest first, so one pass
    /// folds bottom-up through the graph.
    pub fn nodes_of_op(&self, op: Op) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter_map(|(key, node)| match node {
                Node::Expression(expr) if expr.op == op && !self.removed.contains(&key) => {
                    Some(key)
                }
                _ => None,
            })
            .collect();
        let mut memo = FxHashMap::default();
        keys.sort_by_key(|&key| self.depth_memo(key, &mut memo));
        keys
    }

    /// Nesting depth: parameters and literals are 0, an expression is one
    /// more than its deepest operand.
    pub fn depth(&self, key: NodeKey) -> usize {
        let mut memo = FxHashMap::default();
        self.depth_memo(key, &mut memo)
    }

    fn depth_memo(&self, key: NodeKey, memo: &mut FxHashMap<NodeKey, usize>) -> usize {
        if let Some(&d) = memo.get(&key) {
            return d;
        }
        let d = match self.nodes.get(key) {
            Some(Node::Expression(expr)) => {
                1 + expr
                    .operands
                    .iter()
                    .map(|operand| match self.resolve(operand) {
                        Operand::Node(child) => self.depth_memo(child, memo),
                        Operand::Literal(_) => 0,
                    })
                    .max()
                    .unwrap_or(0)
            }
            Some(Node::Redirected(target)) => match self.resolve(target) {
                Operand::Node(child) => self.depth_memo(child, memo),
                Operand::Literal(_) => 0,
            },
            _ => 0,
        };
        memo.insert(key, d);
        d
    }

    /// Live expressions of kind `op` that reference `key` as an operand.
    pub fn operations_on(&self, key: NodeKey, op: Op, constrained_only: bool) -> Vec<NodeKey> {
        let Some(users) = self.users.get(key) else {
            return Vec::new();
        };
        users
            .iter()
            .copied()
            .filter(|&user| {
                !self.removed.contains(&user)
                    && self.expression(user).is_some_and(|expr| {
                        expr.op == op && (!constrained_only || expr.constrained)
                    })
            })
            .collect()
    }

    pub fn is_constrained(&self, key: NodeKey) -> bool {
        self.expression(key).is_some_and(|expr| expr.constrained)
    }

    pub fn alias_literal(&self, key: NodeKey) -> Option<&Literal> {
        self.aliases.get(&key)
    }

    pub fn subset_bound(&self, key: NodeKey) -> Option<&Literal> {
        self.subset_bounds.get(&key)
    }

    pub fn is_removed(&self, key: NodeKey) -> bool {
        self.removed.contains(&key)
    }

    pub fn is_terminated(&self, key: NodeKey) -> bool {
        self.terminated.contains(&key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // Mutation primitives, only reachable through the Mutator ---------------

    pub(crate) fn set_operands(&mut self, key: NodeKey, operands: Vec<Operand>) {
        self.unindex_operands(key);
        if let Some(Node::Expression(expr)) = self.nodes.get_mut(key) {
            expr.operands = operands;
        }
        self.index_operands(key);
    }

    pub(crate) fn set_op(&mut self, key: NodeKey, op: Op) {
        if let Some(Node::Expression(expr)) = self.nodes.get_mut(key) {
            expr.op = op;
        }
    }

    pub(crate) fn set_constrained(&mut self, key: NodeKey) {
        if let Some(Node::Expression(expr)) = self.nodes.get_mut(key) {
            debug_assert!(expr.op.is_constrainable());
            expr.constrained = true;
        }
    }

    pub(crate) fn redirect(&mut self, key: NodeKey, target: Operand) {
        self.unindex_operands(key);
        if let Some(node) = self.nodes.get_mut(key) {
            *node = Node::Redirected(target);
        }
    }

    pub(crate) fn record_alias(&mut self, key: NodeKey, literal: Literal) {
        self.aliases.insert(key, literal);
    }

    pub(crate) fn record_subset_bound(&mut self, key: NodeKey, literal: Literal) {
        self.subset_bounds.insert(key, literal);
    }

    pub(crate) fn mark_removed(&mut self, key: NodeKey) -> bool {
        self.removed.insert(key)
    }

    pub(crate) fn mark_terminated(&mut self, key: NodeKey) -> bool {
        self.terminated.insert(key)
    }

    fn index_operands(&mut self, key: NodeKey) {
        let operand_nodes: Vec<NodeKey> = match self.nodes.get(key) {
            Some(Node::Expression(expr)) => {
                expr.operands.iter().filter_map(Operand::as_node).collect()
            }
            _ => return,
        };
        for node in operand_nodes {
            if let Some(users) = self.users.get_mut(node) {
                if !users.contains(&key) {
                    users.push(key);
                }
            }
        }
    }

    fn unindex_operands(&mut self, key: NodeKey) {
        let operand_nodes: Vec<NodeKey> = match self.nodes.get(key) {
            Some(Node::Expression(expr)) => {
                expr.operands.iter().filter_map(Operand::as_node).collect()
            }
            _ => return,
        };
        for node in operand_nodes {
            if let Some(users) = self.users.get_mut(node) {
                users.retain(|&user| user != key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_chases_redirects() {
        let mut g = Graph::new();
        let p = g.add_parameter("A");
        let e = g.add_expression(Op::Add, vec![p.into()], false);
        let outer = g.add_expression(Op::Add, vec![e.into()], false);
        g.redirect(outer, Operand::Node(e));
        g.redirect(e, Operand::Node(p));
        assert_eq!(g.resolve(&Operand::Node(outer)), Operand::Node(p));
    }

    #[test]
    fn test_depth_and_ordering() {
        let mut g = Graph::new();
        let p = g.add_parameter("A");
        let inner = g.add_expression(Op::Add, vec![p.into(), Literal::number(1.0).into()], false);
        let outer = g.add_expression(Op::Add, vec![inner.into(), p.into()], false);
        assert_eq!(g.depth(p), 0);
        assert_eq!(g.depth(inner), 1);
        assert_eq!(g.depth(outer), 2);
        assert_eq!(g.nodes_of_op(Op::Add), vec![inner, outer]);
    }

    #[test]
    fn test_users_index_follows_mutation() {
        let mut g = Graph::new();
        let p = g.add_parameter("A");
        let q = g.add_parameter("B");
        let e = g.add_expression(Op::Add, vec![p.into(), q.into()], false);
        assert_eq!(g.operations_on(p, Op::Add, false), vec![e]);
        g.set_operands(e, vec![q.into()]);
        assert!(g.operations_on(p, Op::Add, false).is_empty());
        assert_eq!(g.operations_on(q, Op::Add, false), vec![e]);
    }
}
