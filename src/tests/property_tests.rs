//! Property-based tests.
//!
//! Uses quickcheck for:
//! - Soundness of literal interval arithmetic
//! - Folding invariants (literal combination, idempotence, absorption)

use quickcheck::{QuickCheck, TestResult};

use super::{num, run_rule};
use crate::{BoolSet, Graph, Literal, NumberSet, Op, Operand};

fn finite(xs: &[f64]) -> bool {
    xs.iter().all(|x| x.is_finite() && x.abs() < 1e12)
}

fn sorted(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[test]
fn test_add_literal_sum_matches_reference() {
    fn prop(xs: Vec<f64>) -> TestResult {
        if xs.len() < 2 || !finite(&xs) {
            return TestResult::discard();
        }
        let mut reference = xs[0];
        for x in &xs[1..] {
            reference += x;
        }

        let mut g = Graph::new();
        let p = g.add_parameter("P");
        let mut operands: Vec<Operand> = vec![p.into()];
        operands.extend(xs.iter().map(|&x| num(x)));
        let sum = g.add_expression(Op::Add, operands, false);
        run_rule(&mut g, sum).unwrap();

        let ok = if reference == 0.0 {
            g.resolve(&Operand::Node(sum)) == Operand::Node(p)
        } else {
            g.expression(sum).unwrap().operands == vec![Operand::Node(p), num(reference)]
        };
        TestResult::from_bool(ok)
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(Vec<f64>) -> TestResult);
}

#[test]
fn test_fold_add_is_idempotent() {
    fn prop(x: f64, y: f64) -> TestResult {
        if !finite(&[x, y]) {
            return TestResult::discard();
        }
        let mut g = Graph::new();
        let p = g.add_parameter("P");
        let sum = g.add_expression(
            Op::Add,
            vec![p.into(), p.into(), num(x), num(y)],
            false,
        );
        if run_rule(&mut g, sum).is_err() {
            return TestResult::failed();
        }
        // A second sweep over the still-live expression must change nothing.
        if g.expression(sum).is_some() {
            match run_rule(&mut g, sum) {
                Ok(changed) => return TestResult::from_bool(!changed),
                Err(_) => return TestResult::failed(),
            }
        }
        TestResult::passed()
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(f64, f64) -> TestResult);
}

#[test]
fn test_multiply_zero_always_absorbs() {
    fn prop(xs: Vec<f64>) -> TestResult {
        if !finite(&xs) {
            return TestResult::discard();
        }
        let mut g = Graph::new();
        let p = g.add_parameter("P");
        let mut operands: Vec<Operand> = vec![p.into(), num(0.0)];
        operands.extend(xs.iter().map(|&x| num(x)));
        let product = g.add_expression(Op::Multiply, operands, false);
        run_rule(&mut g, product).unwrap();
        TestResult::from_bool(g.alias_literal(product) == Some(&Literal::number(0.0)))
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(Vec<f64>) -> TestResult);
}

#[test]
fn test_bool_set_ops_match_bool_algebra() {
    fn prop(a: bool, b: bool) -> bool {
        let sa = BoolSet::from(a);
        let sb = BoolSet::from(b);
        sa.op_or(sb) == BoolSet::from(a || b)
            && sa.op_and(sb) == BoolSet::from(a && b)
            && sa.op_not() == BoolSet::from(!a)
            && sa.is_subset_of(BoolSet::BOTH)
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(bool, bool) -> bool);
}

#[test]
fn test_interval_addition_is_sound() {
    fn prop(a: f64, b: f64, c: f64, d: f64) -> TestResult {
        if !finite(&[a, b, c, d]) {
            return TestResult::discard();
        }
        let (lo1, hi1) = sorted(a, b);
        let (lo2, hi2) = sorted(c, d);
        let x = NumberSet::from_bounds(lo1, hi1);
        let y = NumberSet::from_bounds(lo2, hi2);
        let sum = x.add(&y);
        TestResult::from_bool(sum.contains(lo1 + lo2) && sum.contains(hi1 + hi2))
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(f64, f64, f64, f64) -> TestResult);
}

#[test]
fn test_interval_comparison_is_consistent() {
    fn prop(a: f64, b: f64, c: f64, d: f64) -> TestResult {
        if !finite(&[a, b, c, d]) {
            return TestResult::discard();
        }
        let (lo1, hi1) = sorted(a, b);
        let (lo2, hi2) = sorted(c, d);
        let x = NumberSet::from_bounds(lo1, hi1);
        let y = NumberSet::from_bounds(lo2, hi2);
        let result = x.op_ge(&y);
        // true is possible iff some element of x reaches y's minimum;
        // false is possible iff some element of x falls below y's maximum.
        let ok = result.contains(true) == (hi1 >= lo2) && result.contains(false) == (lo1 < hi2);
        TestResult::from_bool(ok)
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(f64, f64, f64, f64) -> TestResult);
}
