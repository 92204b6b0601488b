//! Literal folding rules.
//!
//! Each rule rewrites one expression node at a time: it either leaves the
//! graph unchanged, rewrites the expression's operand list, replaces the
//! expression by one of its operands, asserts a literal alias, or raises a
//! [`Contradiction`]. Rules are stateless between calls; all mutable state
//! lives in the caller-supplied [`Mutator`].
//!
//! Soundness rule of thumb for every rewrite here: the literal absorbed must
//! be mathematically equivalent to leaving it as an explicit operand. A fold
//! may keep an expression as-is, never shrink its solution set.

use rustc_hash::FxHashMap;

use crate::error::Contradiction;
use crate::graph::{NodeKey, Op, Operand};
use crate::literal::Literal;
use crate::mutator::Mutator;

mod arith;
mod logic;
mod sets;

pub use arith::{fold_add, fold_multiply, fold_pow};
pub use logic::{fold_ge, fold_is, fold_not, fold_or, fold_subset};
pub use sets::{fold_intersect, fold_union};

/// Insertion-ordered multiset of node operands.
///
/// `A + A` is represented as two references to the same node; the counter
/// collapses that to `(A, 2)`. Iteration follows first-insertion order so
/// rebuilt operand lists are reproducible, never hash order.
#[derive(Debug, Default, Clone)]
pub struct OperandCounter {
    entries: Vec<(NodeKey, usize)>,
    index: FxHashMap<NodeKey, usize>,
}

impl OperandCounter {
    pub fn new() -> OperandCounter {
        OperandCounter::default()
    }

    pub fn insert(&mut self, key: NodeKey) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn count(&self, key: NodeKey) -> usize {
        self.index.get(&key).map_or(0, |&pos| self.entries[pos].1)
    }

    /// Distinct operands, in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of distinct operands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total multiplicity over all operands.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|&(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split an expression's operand list into the three folding buckets:
/// literal operands (original order), replaceable non-literal operands
/// (multiset, safe to recombine algebraically), and non-replaceable
/// non-literal operands (original order, preserved verbatim).
///
/// Operands already rewritten during the current pass are non-replaceable:
/// recombining them again in the same pass could fold an operand list that
/// no longer matches what the rule saw.
pub fn classify_operands(
    mutator: &Mutator<'_>,
    expr: NodeKey,
) -> (Vec<Literal>, OperandCounter, Vec<NodeKey>) {
    let mut literal_operands = Vec::new();
    let mut replaceable = OperandCounter::new();
    let mut non_replaceable = Vec::new();

    let operands = mutator
        .graph()
        .expression(expr)
        .map(|e| e.operands.clone())
        .unwrap_or_default();
    for operand in operands {
        match operand {
            Operand::Literal(lit) => literal_operands.push(lit),
            Operand::Node(key) => {
                if mutator.has_been_mutated(key) {
                    non_replaceable.push(key);
                } else {
                    replaceable.insert(key);
                }
            }
        }
    }
    (literal_operands, replaceable, non_replaceable)
}

/// Dispatch one expression to its folding rule.
///
/// `literal_operands` must be the expression's actual literal operands, not
/// literals its operands are aliased to; rules that want aliases extract
/// them through the mutator.
pub fn fold(
    expr: NodeKey,
    literal_operands: &[Literal],
    replaceable: &OperandCounter,
    non_replaceable: &[NodeKey],
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    let op = mutator
        .graph()
        .expression(expr)
        .expect("fold target must be a live expression")
        .op;
    match op {
        // Arithmetic
        Op::Add => fold_add(expr, literal_operands, replaceable, non_replaceable, mutator),
        Op::Multiply => fold_multiply(expr, literal_operands, replaceable, non_replaceable, mutator),
        Op::Power => fold_pow(expr, mutator),
        // TODO implement
        Op::Round | Op::Abs | Op::Sin | Op::Log | Op::Integrate | Op::Differentiate => Ok(()),
        // Logic
        Op::Or => fold_or(expr, mutator),
        Op::Not => fold_not(expr, replaceable, mutator),
        // Equality / inequality
        Op::Is => fold_is(expr, literal_operands, mutator),
        Op::GreaterOrEqual => fold_ge(expr, literal_operands, mutator),
        // TODO implement
        Op::GreaterThan => Ok(()),
        Op::IsSubset => fold_subset(expr, literal_operands, mutator),
        // Sets
        Op::Intersection => fold_intersect(expr, literal_operands, mutator),
        Op::Union => fold_union(expr, literal_operands, mutator),
        // TODO implement
        Op::SymmetricDifference | Op::Difference => Ok(()),
    }
}
