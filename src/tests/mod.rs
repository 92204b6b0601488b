//! Integration-level tests exercising the folding rules through a real
//! graph and mutator, plus property tests over the literal layer.

mod engine_tests;
mod property_tests;

use crate::{classify_operands, fold, Contradiction, Graph, Literal, Mutator, NodeKey, Operand};

/// Classify and fold one expression with a fresh mutator, reporting whether
/// anything changed.
pub(crate) fn run_rule(graph: &mut Graph, key: NodeKey) -> Result<bool, Contradiction> {
    let mut m = Mutator::new(graph);
    let (literals, replaceable, non_replaceable) = classify_operands(&m, key);
    fold(key, &literals, &replaceable, &non_replaceable, &mut m)?;
    Ok(m.has_changed())
}

pub(crate) fn num(x: f64) -> Operand {
    Literal::number(x).into()
}
