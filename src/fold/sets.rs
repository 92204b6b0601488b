//! Set-operation folding: `Intersection`, `Union`.
//!
//! Pure-literal set expressions are handled wholesale by the engine's
//! literal pass; the rules here only clean up degenerate shapes.

use crate::error::Contradiction;
use crate::graph::NodeKey;
use crate::literal::Literal;
use crate::mutator::Mutator;

/// `Intersection(A) -> A`
pub fn fold_intersect(
    expr: NodeKey,
    literal_operands: &[Literal],
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    unwrap_unary(expr, literal_operands, mutator);
    Ok(())
}

/// `Union(A) -> A`
pub fn fold_union(
    expr: NodeKey,
    literal_operands: &[Literal],
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    unwrap_unary(expr, literal_operands, mutator);
    Ok(())
}

fn unwrap_unary(expr: NodeKey, literal_operands: &[Literal], mutator: &mut Mutator<'_>) {
    if !literal_operands.is_empty() {
        return;
    }
    let unary = mutator
        .graph()
        .expression(expr)
        .is_some_and(|e| e.operands.len() == 1);
    if unary {
        mutator.unpack_expression(expr);
    }
}
