//! Arithmetic folding: `Add`, `Multiply`, `Power`.

use crate::error::Contradiction;
use crate::graph::{NodeKey, Op, Operand};
use crate::literal::Literal;
use crate::mutator::Mutator;

use super::OperandCounter;

/// Combine a literal operand list left-to-right with a fixed binary
/// operator. Returns the surviving literals: empty if the running result is
/// the operator's identity (no point keeping an explicit `+ 0` / `* 1`),
/// one element otherwise. `None` means the literals refused to combine
/// (kind mismatch); the caller then declines to fold.
fn fold_literal_chain(
    operands: &[Literal],
    combine: impl Fn(&Literal, &Literal) -> Option<Literal>,
    identity: &Literal,
) -> Option<Vec<Literal>> {
    let (first, rest) = match operands.split_first() {
        Some(split) => split,
        None => return Some(Vec::new()),
    };
    let mut sum = first.clone();
    for lit in rest {
        sum = combine(&sum, lit)?;
    }
    if &sum == identity {
        return Some(Vec::new());
    }
    Some(vec![sum])
}

/// Extracted coefficient terms: `base -> combined literal` plus the leftover
/// operands kept verbatim.
struct CollectedFactors {
    /// Bases whose wrapped coefficients and bare multiplicities combined
    /// into a single literal factor.
    combined: Vec<(NodeKey, Literal)>,
    /// Operands with nothing to combine, in stable order.
    leftover: Vec<Operand>,
    /// Whether any group actually combined. A group whose net coefficient is
    /// `0` or `1` leaves no entry in `combined` yet still changed the
    /// operand list.
    changed: bool,
}

/// Scan the replaceable multiset for 2-operand `collect_op` sub-expressions
/// of the shape `(base, literal)` and group them by base, so repeated
/// occurrences of one base collapse into a single coefficient/exponent.
///
/// For a commutative `collect_op` (`Multiply`) the literal may sit in either
/// position; for `Power` it must be the exponent (`operands[1]`).
fn collect_factors(
    counter: &OperandCounter,
    mutator: &Mutator<'_>,
    collect_op: Op,
) -> CollectedFactors {
    struct Wrapped {
        op_key: NodeKey,
        coefficient: Literal,
        multiplicity: usize,
    }

    // Bare multiplicity per base, in first-seen order. Bases that only occur
    // wrapped get appended with multiplicity 0.
    let mut bases: Vec<(NodeKey, usize)> = Vec::new();
    let mut wrapped: Vec<(NodeKey, Vec<Wrapped>)> = Vec::new();

    let position =
        |list: &[(NodeKey, Vec<Wrapped>)], key: NodeKey| list.iter().position(|&(k, _)| k == key);

    for (key, multiplicity) in counter.iter() {
        let matched = mutator.graph().expression(key).and_then(|expr| {
            if expr.op != collect_op || expr.operands.len() != 2 {
                return None;
            }
            let (a, b) = (&expr.operands[0], &expr.operands[1]);
            if collect_op.is_commutative() {
                match (a, b) {
                    (Operand::Node(base), Operand::Literal(lit))
                    | (Operand::Literal(lit), Operand::Node(base)) => Some((*base, lit.clone())),
                    _ => None,
                }
            } else {
                match (a, b) {
                    (Operand::Node(base), Operand::Literal(lit)) => Some((*base, lit.clone())),
                    _ => None,
                }
            }
        });

        match matched {
            Some((base, coefficient)) => {
                let entry = Wrapped {
                    op_key: key,
                    coefficient,
                    multiplicity,
                };
                match position(&wrapped, base) {
                    Some(pos) => wrapped[pos].1.push(entry),
                    None => {
                        wrapped.push((base, vec![entry]));
                        if !bases.iter().any(|&(k, _)| k == base) {
                            bases.push((base, 0));
                        }
                    }
                }
            }
            None => match bases.iter_mut().find(|(k, _)| *k == key) {
                Some((_, n)) => *n += multiplicity,
                None => bases.push((key, multiplicity)),
            },
        }
    }

    let mut combined = Vec::new();
    let mut leftover = Vec::new();
    let mut changed = false;

    for (base, bare_count) in bases {
        let group = position(&wrapped, base)
            .map(|pos| std::mem::take(&mut wrapped[pos].1))
            .unwrap_or_default();

        // Lone wrapped factor with no bare occurrences: keep it as-is.
        if bare_count == 0 && group.len() <= 1 {
            for entry in &group {
                for _ in 0..entry.multiplicity {
                    leftover.push(Operand::Node(entry.op_key));
                }
            }
            continue;
        }
        // A single bare occurrence and nothing wrapped: plain operand,
        // avoid introducing `1 * A` noise.
        if bare_count == 1 && group.is_empty() {
            leftover.push(Operand::Node(base));
            continue;
        }

        // Sum every wrapped coefficient (times how often the wrapper
        // occurred) plus the bare multiplicity.
        let mut total = Literal::number(bare_count as f64);
        let mut failed = false;
        for entry in &group {
            let scaled = entry
                .coefficient
                .try_mul(&Literal::number(entry.multiplicity as f64));
            match scaled.and_then(|s| total.try_add(&s)) {
                Some(sum) => total = sum,
                None => {
                    failed = true;
                    break;
                }
            }
        }
        if failed {
            // Non-numeric coefficient; keep everything untouched.
            for _ in 0..bare_count {
                leftover.push(Operand::Node(base));
            }
            for entry in &group {
                for _ in 0..entry.multiplicity {
                    leftover.push(Operand::Node(entry.op_key));
                }
            }
            continue;
        }
        changed = true;
        if total.is_zero() {
            // Net coefficient zero: the term vanishes.
            continue;
        }
        if total.is_one() {
            leftover.push(Operand::Node(base));
            continue;
        }
        combined.push((base, total));
    }

    CollectedFactors {
        combined,
        leftover,
        changed,
    }
}

/// ```text
/// A + A + 5 + 10   -> 2*A + 15
/// A + 5 + (-5)     -> A
/// A + (3 * A) + 5  -> (4 * A) + 5
/// A + (A * B * 2)  -> A + (A * B * 2)
/// A + (B * 2)      -> A + (B * 2)
/// A + (A * 2) + (A * 3) -> 6 * A
/// ```
pub fn fold_add(
    expr: NodeKey,
    literal_operands: &[Literal],
    replaceable: &OperandCounter,
    non_replaceable: &[NodeKey],
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    if unwrap_sole_node_operand(expr, mutator) {
        return Ok(());
    }

    let zero = Literal::number(0.0);
    let Some(literal_sum) = fold_literal_chain(literal_operands, Literal::try_add, &zero) else {
        return Ok(());
    };

    let factors = collect_factors(replaceable, mutator, Op::Multiply);

    // Nothing combined and no literal folding: avoid churn.
    if !factors.changed && literal_sum.len() == literal_operands.len() {
        return Ok(());
    }

    // Careful: creating sub-expressions before knowing whether the rewrite
    // sticks mirrors the classification contract; the engine re-visits them.
    let factored: Vec<Operand> = factors
        .combined
        .iter()
        .map(|(base, coefficient)| {
            Operand::Node(mutator.create_expression(
                Op::Multiply,
                vec![Operand::Node(*base), Operand::Literal(coefficient.clone())],
                false,
            ))
        })
        .collect();

    let new_operands: Vec<Operand> = factored
        .into_iter()
        .chain(factors.leftover)
        .chain(literal_sum.iter().cloned().map(Operand::Literal))
        .chain(non_replaceable.iter().map(|&key| Operand::Node(key)))
        .collect();

    finish_nary_fold(expr, new_operands, mutator)
}

/// Symmetric to [`fold_add`] with identity `1` and `Power` collection, plus
/// the absorption law: any literal-zero operand collapses the whole product
/// to `0`, symbolic co-operands included.
pub fn fold_multiply(
    expr: NodeKey,
    literal_operands: &[Literal],
    replaceable: &OperandCounter,
    non_replaceable: &[NodeKey],
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    if unwrap_sole_node_operand(expr, mutator) {
        return Ok(());
    }

    let one = Literal::number(1.0);
    let Some(literal_prod) = fold_literal_chain(literal_operands, Literal::try_mul, &one) else {
        return Ok(());
    };

    let powers = collect_factors(replaceable, mutator, Op::Power);

    let symbolic_count = replaceable.total() + non_replaceable.len();
    let zero_absorbs =
        literal_prod.first().is_some_and(Literal::is_zero) && symbolic_count > 0;
    if !powers.changed && literal_prod.len() == literal_operands.len() && !zero_absorbs {
        return Ok(());
    }

    let powered: Vec<Operand> = powers
        .combined
        .iter()
        .map(|(base, exponent)| {
            Operand::Node(mutator.create_expression(
                Op::Power,
                vec![Operand::Node(*base), Operand::Literal(exponent.clone())],
                false,
            ))
        })
        .collect();

    let mut new_operands: Vec<Operand> = powered
        .into_iter()
        .chain(powers.leftover)
        .chain(literal_prod.iter().cloned().map(Operand::Literal))
        .chain(non_replaceable.iter().map(|&key| Operand::Node(key)))
        .collect();

    // 0 * A -> 0
    if new_operands
        .iter()
        .any(|operand| operand.as_literal().is_some_and(Literal::is_zero))
    {
        new_operands = vec![Operand::Literal(Literal::number(0.0))];
    }

    finish_nary_fold(expr, new_operands, mutator)
}

/// `Add(A) -> A`, `Multiply(A) -> A`. Returns whether it fired.
fn unwrap_sole_node_operand(expr: NodeKey, mutator: &mut Mutator<'_>) -> bool {
    let sole_node = mutator
        .graph()
        .expression(expr)
        .is_some_and(|e| e.operands.len() == 1 && !e.operands[0].is_literal());
    if sole_node {
        mutator.unpack_expression(expr);
    }
    sole_node
}

/// Shared tail of the n-ary arithmetic folds: unpack a lone operatable
/// operand, otherwise rewrite in place and alias a lone literal.
fn finish_nary_fold(
    expr: NodeKey,
    new_operands: Vec<Operand>,
    mutator: &mut Mutator<'_>,
) -> Result<(), Contradiction> {
    let unchanged = mutator
        .graph()
        .expression(expr)
        .is_some_and(|e| e.operands == new_operands);
    if unchanged {
        return Ok(());
    }

    if new_operands.len() == 1 {
        if let Operand::Node(_) = new_operands[0] {
            mutator.mutate_expression(expr, new_operands);
            mutator.unpack_expression(expr);
            return Ok(());
        }
    }

    let lone_literal = match new_operands.as_slice() {
        [Operand::Literal(lit)] => Some(lit.clone()),
        _ => None,
    };
    mutator.mutate_expression(expr, new_operands);
    if let Some(lit) = lone_literal {
        // Predicates elsewhere may still reference this node; the alias
        // keeps them resolving to the folded value.
        mutator.alias_is_literal(expr, lit, true)?;
    }
    Ok(())
}

/// ```text
/// A^1 -> A
/// A^0 -> 1     (including 0^0 = 1, a deliberate convention)
/// 0^A -> 0
/// 1^A -> 1
/// 5^3 -> 125
/// ```
pub fn fold_pow(expr: NodeKey, mutator: &mut Mutator<'_>) -> Result<(), Contradiction> {
    let e = mutator
        .graph()
        .expression(expr)
        .expect("fold target must be a live expression");
    assert_eq!(e.operands.len(), 2, "Power must be binary");
    let base = e.operands[0].clone();
    let exponent = e.operands[1].clone();

    let base_num = base
        .as_literal()
        .filter(|lit| lit.as_number().is_some())
        .cloned();
    let exp_num = exponent
        .as_literal()
        .filter(|lit| lit.as_number().is_some())
        .cloned();

    if let (Some(b), Some(x)) = (&base_num, &exp_num) {
        match b.try_pow(x) {
            Some(result) => {
                mutator.alias_is_literal(expr, result, true)?;
            }
            // Interval exponentiation the literal layer cannot express
            // exactly; leave the expression symbolic.
            None => {}
        }
        return Ok(());
    }

    if let Some(x) = &exp_num {
        if x.is_one() {
            mutator.mutate_expression(expr, vec![base.clone()]);
            mutator.unpack_expression(expr);
            return Ok(());
        }
        if x.is_zero() {
            mutator.alias_is_literal(expr, Literal::number(1.0), true)?;
            return Ok(());
        }
    }

    if let Some(b) = &base_num {
        if b.is_zero() {
            mutator.alias_is_literal(expr, Literal::number(0.0), true)?;
            // TODO: emit the side constraint `exponent >= 0` once the
            // folding layer can create constraints from here.
            return Ok(());
        }
        if b.is_one() {
            mutator.alias_is_literal(expr, Literal::number(1.0), true)?;
            return Ok(());
        }
    }

    Ok(())
}
