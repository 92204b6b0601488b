//! Logical and predicate folding: `Or`, `Not`, `Is`, `IsSubset`,
//! `GreaterOrEqual`.
//!
//! Predicates carry the `constrained` flag; a constrained predicate deduced
//! to anything but `{true}` is a [`Contradiction`]. The rules here both
//! simplify (short-circuit, double negation) and propagate assertions
//! downward (constraining operands of constrained predicates).

use crate::error::Contradiction;
use crate::graph::{NodeKey, Op, Operand};
use crate::literal::{Literal, NumberSet};
use crate::mutator::Mutator;

use super::OperandCounter;

/// `P op P -> True` for reflexive predicates. Returns whether it fired.
fn operands_same_make_true(
    expr: NodeKey,
    a: &Operand,
    b: &Operand,
    mutator: &mut Mutator<'_>,
) -> Result<bool, Contradiction> {
    match (a, b) {
        (Operand::Node(x), Operand::Node(y)) if x == y => {
            mutator.alias_is_literal_and_check_predicate_eval(expr, Literal::from(true))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Find `Not` expressions over `key` and constrain them; build a fresh
/// constrained one if none exist.
fn constrain_negation_of(key: NodeKey, mutator: &mut Mutator<'_>) {
    let existing = mutator.graph().operations_on(key, Op::Not, false);
    if existing.is_empty() {
        mutator.create_expression(Op::Not, vec![Operand::Node(key)], true);
    } else {
        for not_key in existing {
            mutator.constrain(not_key);
        }
    }
}

/// ```text
/// Or(A, True)  -> True
/// Or()         -> False
/// Or(A, False) -> Or(A)
/// Or(A, A)     -> Or(A) -> A
/// Or!(P)       -> P!
/// ```
pub fn fold_or(expr: NodeKey, mutator: &mut Mutator<'_>) -> Result<(), Contradiction> {
    let operands = mutator
        .graph()
        .expression(expr)
        .expect("fold target must be a live expression")
        .operands
        .clone();

    for operand in &operands {
        let known_true = mutator
            .try_extract_literal(operand, false)
            .is_some_and(|lit| lit.is_true());
        if known_true {
            return mutator.alias_is_literal_and_check_predicate_eval(expr, Literal::from(true));
        }
    }

    if operands.is_empty() {
        return mutator.alias_is_literal_and_check_predicate_eval(expr, Literal::from(false));
    }

    // Drop known-false disjuncts and syntactic duplicates.
    let mut kept: Vec<Operand> = Vec::new();
    for operand in &operands {
        let known_false = mutator
            .try_extract_literal(operand, false)
            .is_some_and(|lit| lit.is_false());
        if known_false || kept.contains(operand) {
            continue;
        }
        kept.push(operand.clone());
    }
    let unpack = kept.len() == 1;
    if kept.len() < operands.len() {
        mutator.mutate_expression(expr, kept);
    }
    // A unary disjunction is its sole operand, whether or not anything was
    // dropped; unpacking carries the constrained flag over (Or!(P) -> P!).
    if unpack {
        mutator.unpack_expression(expr);
    }
    Ok(())
}

/// ```text
/// Not(True)    -> False
/// Not(Not(A))  -> A
/// Not!(P!)     -> Contradiction
/// Not(P!)      -> False
/// Not!(Or(...)) distributes negative information over the disjuncts
/// Not!(P)      -> P aliased to False
/// ```
pub fn fold_not(
    expr: NodeKey,
    replaceable: &OperandCounter,
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    let e = mutator
        .graph()
        .expression(expr)
        .expect("fold target must be a live expression");
    assert_eq!(e.operands.len(), 1, "Not must be unary");
    let operand = e.operands[0].clone();
    let constrained = e.constrained;

    if let Some(Literal::Bool(known)) = mutator.try_extract_literal(&operand, false) {
        return mutator
            .alias_is_literal_and_check_predicate_eval(expr, Literal::Bool(known.op_not()));
    }

    let Operand::Node(inner) = operand else {
        return Ok(());
    };

    let inner_expr = mutator
        .graph()
        .expression(inner)
        .map(|ie| (ie.op, ie.constrained, ie.operands.clone()));

    if let Some((inner_op, inner_constrained, _)) = &inner_expr {
        if inner_op.is_constrainable() && *inner_constrained {
            if constrained {
                return Err(Contradiction::new(
                    "negation of an asserted predicate",
                    vec![expr, inner],
                ));
            }
            mutator.alias_is_literal(expr, Literal::from(false), true)?;
            return Ok(());
        }
    }

    if !replaceable.is_empty() {
        if let Some((Op::Not, _, inner_operands)) = &inner_expr {
            // Not(Not(x)) -> x
            let innermost = inner_operands
                .first()
                .expect("Not must be unary")
                .clone();
            match innermost {
                Operand::Literal(lit) => {
                    return mutator.alias_is_literal_and_check_predicate_eval(expr, lit);
                }
                Operand::Node(_) => {
                    mutator.neutralize_expression(expr, innermost);
                    return Ok(());
                }
            }
        }

        if constrained {
            if let Some((Op::Or, _, disjuncts)) = &inner_expr {
                // Not!(Or(..)) : every disjunct is false. Push that inward
                // without expanding the formula.
                if disjuncts.is_empty() {
                    return mutator
                        .alias_is_literal_and_check_predicate_eval(expr, Literal::from(true));
                }
                for disjunct in disjuncts {
                    let Operand::Node(key) = mutator.get_copy(disjunct) else {
                        continue;
                    };
                    let shape = mutator
                        .graph()
                        .expression(key)
                        .map(|de| (de.op, de.operands.clone()));
                    match shape {
                        // Not(x) is false, so x holds.
                        Some((Op::Not, negated)) => {
                            for operand in &negated {
                                if let Operand::Node(x) = mutator.get_copy(operand) {
                                    mutator.constrain(x);
                                }
                            }
                        }
                        Some((op, _)) if op.is_constrainable() => {
                            constrain_negation_of(key, mutator);
                        }
                        _ => {}
                    }
                }
                // Fall through: the disjunction as a whole is also false.
            }
        }
    }

    if constrained {
        // Not! P with P otherwise opaque: P itself must be false.
        return mutator.alias_is_literal_and_check_predicate_eval(inner, Literal::from(false));
    }
    Ok(())
}

/// ```text
/// A is A        -> True
/// 5 is 5        -> True,  5 is 6 -> False
/// P1 is! True   -> P1!
/// P1 is! P2!    -> P1!
/// P  is! False  -> Not!(P)
/// ```
pub fn fold_is(
    expr: NodeKey,
    literal_operands: &[Literal],
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    let e = mutator
        .graph()
        .expression(expr)
        .expect("fold target must be a live expression");
    assert_eq!(e.operands.len(), 2, "Is must be binary");
    let a = e.operands[0].clone();
    let b = e.operands[1].clone();
    let constrained = e.constrained;

    if operands_same_make_true(expr, &a, &b, mutator)? {
        return Ok(());
    }

    let lit_a = mutator.try_extract_literal(&a, false);
    let lit_b = mutator.try_extract_literal(&b, false);
    if let (Some(la), Some(lb)) = (&lit_a, &lit_b) {
        return mutator
            .alias_is_literal_and_check_predicate_eval(expr, Literal::from(la == lb));
    }

    if !constrained {
        return Ok(());
    }

    let node_operands: Vec<NodeKey> = [&a, &b]
        .into_iter()
        .filter_map(Operand::as_node)
        .collect();

    let truth_trigger = literal_operands.iter().any(Literal::is_true)
        || node_operands.iter().any(|&key| {
            mutator
                .graph()
                .expression(key)
                .is_some_and(|ne| ne.op.is_constrainable() && ne.constrained)
        });
    if truth_trigger {
        // P1 is! P2, one side known to hold: both must hold.
        for &key in &node_operands {
            mutator.constrain(key);
        }
        return Ok(());
    }

    if literal_operands.iter().any(Literal::is_false) {
        for &key in &node_operands {
            let constrainable = mutator
                .graph()
                .expression(key)
                .is_some_and(|ne| ne.op.is_constrainable());
            if constrainable {
                constrain_negation_of(key, mutator);
            }
        }
    }
    Ok(())
}

/// `A ss B`, several independent rewrites tried in priority order.
pub fn fold_subset(
    expr: NodeKey,
    literal_operands: &[Literal],
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    let e = mutator
        .graph()
        .expression(expr)
        .expect("fold target must be a live expression");
    assert_eq!(e.operands.len(), 2, "IsSubset must be binary");
    let a = e.operands[0].clone();
    let b = e.operands[1].clone();
    let constrained = e.constrained;

    // A ss {x} is just A is {x}.
    if let Operand::Literal(lit) = &b {
        if lit.is_single_element() || lit.is_empty() {
            mutator.mutate_expression_op(expr, Op::Is);
            return Ok(());
        }
    }

    // A ss B with A is! B already asserted: the subset predicate is
    // redundant.
    if literal_operands.is_empty() {
        if let (Some(ka), Some(kb)) = (a.as_node(), b.as_node()) {
            let implied = mutator
                .graph()
                .operations_on(ka, Op::Is, true)
                .into_iter()
                .any(|is_key| {
                    mutator.graph().expression(is_key).is_some_and(|ie| {
                        ie.operands.iter().any(|operand| operand.as_node() == Some(kb))
                    })
                });
            if implied {
                mutator.remove_predicate(expr);
                return Ok(());
            }
        }
    }

    if operands_same_make_true(expr, &a, &b, mutator)? {
        return Ok(());
    }

    let a_exact = mutator.try_extract_literal(&a, false);
    let b_loose = mutator.try_extract_literal(&b, true);
    if let (Some(la), Some(lb)) = (&a_exact, b_loose.as_ref()) {
        if let Some(result) = la.is_subset_of(lb) {
            return mutator
                .alias_is_literal_and_check_predicate_eval(expr, Literal::from(result));
        }
    }

    // A's bound already inside B's bound, with B exactly known: transitively
    // true even though A is not exactly known.
    let a_loose = mutator.try_extract_literal(&a, true);
    let b_exact = mutator.try_extract_literal(&b, false);
    if let (Some(la), Some(lb)) = (&a_loose, b_loose.as_ref()) {
        if la.is_subset_of(lb) == Some(true) && b_exact.is_some() {
            return mutator.alias_is_literal_and_check_predicate_eval(expr, Literal::from(true));
        }
    }

    if !constrained {
        return Ok(());
    }

    let b_asserted = b_loose.as_ref().is_some_and(|lit| lit.is_true())
        || b.as_node().is_some_and(|key| {
            mutator
                .graph()
                .expression(key)
                .is_some_and(|ne| ne.op.is_constrainable() && ne.constrained)
        });
    if b_asserted {
        if let Some(ka) = a.as_node() {
            mutator.constrain(ka);
        }
        return Ok(());
    }
    if b_loose.as_ref().is_some_and(|lit| lit.is_false()) {
        if let Some(ka) = a.as_node() {
            let constrainable = mutator
                .graph()
                .expression(ka)
                .is_some_and(|ne| ne.op.is_constrainable());
            if constrainable {
                constrain_negation_of(ka, mutator);
            }
        }
    }
    Ok(())
}

/// ```text
/// A >= A           -> True
/// [2,3] >= [0,1]   -> True,  overlapping intervals -> {True, False}
/// A >=! [1,5]      -> A >=! 5     (right literal narrows to its max)
/// [1,5] >=! A      -> 1 >=! A     (left literal narrows to its min)
/// ```
pub fn fold_ge(
    expr: NodeKey,
    literal_operands: &[Literal],
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    let e = mutator
        .graph()
        .expression(expr)
        .expect("fold target must be a live expression");
    assert_eq!(e.operands.len(), 2, "GreaterOrEqual must be binary");
    let a = e.operands[0].clone();
    let b = e.operands[1].clone();
    let constrained = e.constrained;

    if operands_same_make_true(expr, &a, &b, mutator)? {
        return Ok(());
    }

    let num_a: Option<NumberSet> = mutator
        .try_extract_literal(&a, false)
        .and_then(|lit| lit.as_number().cloned());
    let num_b: Option<NumberSet> = mutator
        .try_extract_literal(&b, false)
        .and_then(|lit| lit.as_number().cloned());
    if let (Some(na), Some(nb)) = (&num_a, &num_b) {
        let result = na.op_ge(nb);
        if result.is_single_element() {
            return mutator
                .alias_is_literal_and_check_predicate_eval(expr, Literal::Bool(result));
        }
        // Undecidable with the current bounds; record what is known without
        // terminating the predicate.
        mutator.alias_is_literal(expr, Literal::Bool(result), false)?;
        return Ok(());
    }

    if constrained && literal_operands.len() == 1 {
        let lit = &literal_operands[0];
        if !lit.is_single_element() && !lit.is_empty() {
            if let Some(ns) = lit.as_number() {
                if a.as_literal() == Some(lit) {
                    if let Some(min) = ns.min_elem() {
                        mutator.mutate_expression(
                            expr,
                            vec![Operand::Literal(Literal::number(min)), b],
                        );
                    }
                } else if let Some(max) = ns.max_elem() {
                    mutator.mutate_expression(
                        expr,
                        vec![a, Operand::Literal(Literal::number(max))],
                    );
                }
                return Ok(());
            }
        }
    }

    // Bound propagation between two correlated non-literal operands is
    // disabled: it slowed solving measurably without narrowing much.
    Ok(())
}
