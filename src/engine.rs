//! Fixpoint driver over the folding rules.
//!
//! One iteration runs a pure-literal evaluation pass followed by one folding
//! pass per operator kind, shallow expressions first so operand results are
//! available when their users fold. Iterations repeat until a full sweep
//! changes nothing or the iteration cap trips.

use log::{trace, warn};

use crate::error::Contradiction;
use crate::fold::{classify_operands, fold};
use crate::graph::{Graph, Op, Operand};
use crate::literal::{BoolSet, Literal};
use crate::mutator::Mutator;

/// Evaluate one operator over fully-known operand literals. `None` when the
/// operator has no pure evaluation or the literal layer cannot express the
/// result exactly.
pub fn eval_pure(op: Op, operands: &[Literal]) -> Option<Literal> {
    let binary = || -> Option<(&Literal, &Literal)> {
        match operands {
            [a, b] => Some((a, b)),
            _ => None,
        }
    };
    let unary_number = || match operands {
        [lit] => lit.as_number(),
        _ => None,
    };

    match op {
        Op::Add => {
            let mut sum = Literal::number(0.0);
            for lit in operands {
                sum = sum.try_add(lit)?;
            }
            Some(sum)
        }
        Op::Multiply => {
            let mut product = Literal::number(1.0);
            for lit in operands {
                product = product.try_mul(lit)?;
            }
            Some(product)
        }
        Op::Power => {
            let (base, exponent) = binary()?;
            base.try_pow(exponent)
        }
        Op::Round => unary_number()?.try_round().map(Literal::Number),
        Op::Abs => Some(Literal::Number(unary_number()?.op_abs())),
        Op::Sin => unary_number()?.try_sin().map(Literal::Number),
        Op::Log => unary_number()?.try_log().map(Literal::Number),
        Op::Integrate | Op::Differentiate => None,
        Op::Or => {
            let mut result = BoolSet::FALSE;
            for lit in operands {
                result = result.op_or(lit.as_bool()?);
            }
            Some(Literal::Bool(result))
        }
        Op::Not => match operands {
            [lit] => Some(Literal::Bool(lit.as_bool()?.op_not())),
            _ => None,
        },
        Op::Is => {
            let (a, b) = binary()?;
            Some(Literal::from(a == b))
        }
        Op::GreaterOrEqual => {
            let (a, b) = binary()?;
            Some(Literal::Bool(a.as_number()?.op_ge(b.as_number()?)))
        }
        Op::GreaterThan => {
            let (a, b) = binary()?;
            Some(Literal::Bool(a.as_number()?.op_gt(b.as_number()?)))
        }
        Op::IsSubset => {
            let (a, b) = binary()?;
            a.is_subset_of(b).map(Literal::from)
        }
        Op::Intersection => {
            let (first, rest) = operands.split_first()?;
            let mut result = first.clone();
            for lit in rest {
                result = result.try_intersection(lit)?;
            }
            Some(result)
        }
        Op::Union => {
            let (first, rest) = operands.split_first()?;
            let mut result = first.clone();
            for lit in rest {
                result = result.try_union(lit)?;
            }
            Some(result)
        }
        Op::SymmetricDifference => {
            let (a, b) = binary()?;
            a.try_symmetric_difference(b)
        }
        Op::Difference => {
            let (a, b) = binary()?;
            a.try_difference(b)
        }
    }
}

/// Alias every expression whose operands are all syntactic literals to its
/// evaluated value.
pub fn fold_pure_literal_expressions(mutator: &mut Mutator<'_>) -> Result<(), Contradiction> {
    let mut candidates = Vec::new();
    for op in Op::ALL {
        for key in mutator.graph().nodes_of_op(op) {
            if mutator.has_been_mutated(key) || mutator.is_removed(key) {
                continue;
            }
            let Some(expr) = mutator.graph().expression(key) else {
                continue;
            };
            let literals: Option<Vec<Literal>> = expr
                .operands
                .iter()
                .map(|operand| operand.as_literal().cloned())
                .collect();
            let Some(literals) = literals else { continue };
            if let Some(value) = eval_pure(op, &literals) {
                candidates.push((key, value));
            }
        }
    }
    for (key, value) in candidates {
        mutator.alias_is_literal_and_check_predicate_eval(key, value)?;
    }
    Ok(())
}

/// Run the folding rule for one operator kind over every live expression of
/// that kind, shallowest first.
pub fn fold_literals(mutator: &mut Mutator<'_>, op: Op) -> Result<(), Contradiction> {
    for key in mutator.graph().nodes_of_op(op) {
        if mutator.has_been_mutated(key) || mutator.is_removed(key) {
            continue;
        }
        let all_literal = mutator
            .graph()
            .expression(key)
            .is_some_and(|expr| expr.operands.iter().all(Operand::is_literal));
        if all_literal {
            // Already covered by the pure-literal pass.
            continue;
        }
        let (literal_operands, replaceable, non_replaceable) = classify_operands(mutator, key);
        fold(key, &literal_operands, &replaceable, &non_replaceable, mutator)?;
    }
    Ok(())
}

pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Outcome of a [`FoldEngine`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldReport {
    /// Full sweeps executed, including the final unchanged one.
    pub passes: usize,
    /// Whether the run reached a fixpoint (as opposed to the iteration cap).
    pub converged: bool,
}

/// Repeatedly sweeps a graph with the folding rules until nothing changes.
#[derive(Debug, Clone, Copy)]
pub struct FoldEngine {
    max_iterations: usize,
}

impl Default for FoldEngine {
    fn default() -> FoldEngine {
        FoldEngine::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl FoldEngine {
    pub fn new(max_iterations: usize) -> FoldEngine {
        FoldEngine { max_iterations }
    }

    pub fn run(&self, graph: &mut Graph) -> Result<FoldReport, Contradiction> {
        let mut passes = 0;
        while passes < self.max_iterations {
            passes += 1;
            let mut mutator = Mutator::new(graph);
            fold_pure_literal_expressions(&mut mutator)?;
            for op in Op::ALL {
                fold_literals(&mut mutator, op)?;
            }
            let changed = mutator.has_changed();
            trace!(
                "fold pass {passes}: changed={changed} created={}",
                mutator.created().len()
            );
            if !changed {
                return Ok(FoldReport {
                    passes,
                    converged: true,
                });
            }
        }
        warn!(
            "folding did not converge within {} passes",
            self.max_iterations
        );
        Ok(FoldReport {
            passes,
            converged: false,
        })
    }
}
