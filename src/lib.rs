//! Literal Folding Engine
//!
//! A term-rewriting library for a parameter constraint solver: expressions
//! over named unknowns are simplified by absorbing fully-known literal
//! values, collapsing redundant structure and propagating asserted
//! predicates, until either a fixpoint or a [`Contradiction`] is reached.
//!
//! # Features
//! - Exact literal arithmetic over interval sets and boolean subsets
//! - Coefficient collection (`A + 3*A -> 4*A`), identity and absorption laws
//! - Predicate propagation: constrained `Is`/`IsSubset`/`Not`/`Or`
//!   expressions push truth values onto their operands
//! - Contradiction detection with the involved nodes attached
//! - Replacement-preserving node references: folding an expression never
//!   invalidates handles held by other expressions
//!
//! # Usage Example
//! ```
//! use symfold::{FoldEngine, Graph, Literal, Op};
//!
//! let mut graph = Graph::new();
//! let p = graph.add_parameter("P");
//! let sum = graph.add_expression(
//!     Op::Add,
//!     vec![
//!         p.into(),
//!         p.into(),
//!         Literal::number(5.0).into(),
//!         Literal::number(-5.0).into(),
//!     ],
//!     false,
//! );
//! FoldEngine::default().run(&mut graph).unwrap();
//! assert_eq!(graph.render(sum), "Multiply(P, 2)");
//! ```

mod display;
mod engine;
mod error;
mod fold;
mod graph;
mod literal;
mod mutator;

#[cfg(test)]
mod tests;

pub use engine::{
    eval_pure, fold_literals, fold_pure_literal_expressions, FoldEngine, FoldReport,
    DEFAULT_MAX_ITERATIONS,
};
pub use error::Contradiction;
pub use fold::{
    classify_operands, fold, fold_add, fold_ge, fold_intersect, fold_is, fold_multiply, fold_not,
    fold_or, fold_pow, fold_subset, fold_union, OperandCounter,
};
pub use graph::{Expression, Graph, Node, NodeKey, Op, Operand};
pub use literal::{BoolSet, Interval, Literal, NumberSet};
pub use mutator::Mutator;
