use super::num;
use crate::{eval_pure, FoldEngine, Graph, Literal, Mutator, Op};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_end_to_end_add_cancellation() {
    init_logs();
    let mut g = Graph::new();
    let p = g.add_parameter("P");
    let sum = g.add_expression(
        Op::Add,
        vec![p.into(), p.into(), num(5.0), num(-5.0)],
        false,
    );
    let report = FoldEngine::default().run(&mut g).unwrap();
    assert!(report.converged);
    assert_eq!(g.render(sum), "Multiply(P, 2)");
}

#[test]
fn test_end_to_end_literal_power() {
    init_logs();
    let mut g = Graph::new();
    let pow = g.add_expression(Op::Power, vec![num(2.0), num(10.0)], false);
    let report = FoldEngine::default().run(&mut g).unwrap();
    assert!(report.converged);
    assert_eq!(g.alias_literal(pow), Some(&Literal::number(1024.0)));
}

#[test]
fn test_end_to_end_or_of_false_literal() {
    init_logs();
    let mut g = Graph::new();
    let or = g.add_expression(Op::Or, vec![Literal::from(false).into()], false);
    let report = FoldEngine::default().run(&mut g).unwrap();
    assert!(report.converged);
    assert_eq!(g.alias_literal(or), Some(&Literal::from(false)));
}

#[test]
fn test_end_to_end_unary_or_constrains_disjunct() {
    init_logs();
    let mut g = Graph::new();
    let a = g.add_parameter("A");
    let b = g.add_parameter("B");
    let pred = g.add_expression(Op::GreaterOrEqual, vec![a.into(), b.into()], false);
    let or = g.add_expression(Op::Or, vec![pred.into()], true);
    let report = FoldEngine::default().run(&mut g).unwrap();
    assert!(report.converged);
    assert_eq!(g.resolve(&crate::Operand::Node(or)), crate::Operand::Node(pred));
    assert!(g.is_constrained(pred));
}

#[test]
fn test_engine_surfaces_contradiction() {
    init_logs();
    let mut g = Graph::new();
    let a = g.add_parameter("A");
    let b = g.add_parameter("B");
    let add = g.add_expression(Op::Add, vec![a.into(), b.into()], false);
    {
        let mut m = Mutator::new(&mut g);
        m.alias_is_literal(add, Literal::number(5.0), false).unwrap();
    }
    let is = g.add_expression(Op::Is, vec![add.into(), num(6.0)], true);
    let err = FoldEngine::default().run(&mut g).unwrap_err();
    assert!(err.involved().contains(&is));
}

#[test]
fn test_iteration_cap_reports_non_convergence() {
    init_logs();
    let mut g = Graph::new();
    let p = g.add_parameter("P");
    let _sum = g.add_expression(
        Op::Add,
        vec![p.into(), p.into(), num(5.0), num(-5.0)],
        false,
    );
    let report = FoldEngine::new(1).run(&mut g).unwrap();
    assert_eq!(report.passes, 1);
    assert!(!report.converged);
}

#[test]
fn test_empty_graph_converges_immediately() {
    let mut g = Graph::new();
    let report = FoldEngine::default().run(&mut g).unwrap();
    assert_eq!(report.passes, 1);
    assert!(report.converged);
}

#[test]
fn test_eval_pure_table() {
    let five = Literal::number(5.0);
    let three = Literal::number(3.0);
    assert_eq!(
        eval_pure(Op::Add, &[five.clone(), three.clone()]),
        Some(Literal::number(8.0))
    );
    assert_eq!(
        eval_pure(Op::Multiply, &[five.clone(), three.clone()]),
        Some(Literal::number(15.0))
    );
    assert_eq!(
        eval_pure(Op::Power, &[five.clone(), three.clone()]),
        Some(Literal::number(125.0))
    );
    assert_eq!(
        eval_pure(Op::Abs, &[Literal::number(-2.0)]),
        Some(Literal::number(2.0))
    );
    assert_eq!(
        eval_pure(Op::Or, &[Literal::from(false), Literal::from(true)]),
        Some(Literal::from(true))
    );
    assert_eq!(
        eval_pure(Op::Not, &[Literal::from(true)]),
        Some(Literal::from(false))
    );
    assert_eq!(
        eval_pure(Op::Is, &[five.clone(), five.clone()]),
        Some(Literal::from(true))
    );
    assert_eq!(
        eval_pure(Op::GreaterThan, &[five.clone(), three.clone()]),
        Some(Literal::from(true))
    );
    assert_eq!(
        eval_pure(
            Op::IsSubset,
            &[Literal::interval(1.0, 2.0), Literal::interval(0.0, 5.0)]
        ),
        Some(Literal::from(true))
    );
    assert_eq!(
        eval_pure(
            Op::Intersection,
            &[Literal::interval(0.0, 3.0), Literal::interval(2.0, 5.0)]
        ),
        Some(Literal::interval(2.0, 3.0))
    );
    // Mixed kinds refuse to combine instead of coercing.
    assert_eq!(eval_pure(Op::Add, &[five.clone(), Literal::from(true)]), None);
    // No pure evaluation for calculus operators.
    assert_eq!(eval_pure(Op::Integrate, &[five.clone()]), None);
    assert_eq!(eval_pure(Op::Differentiate, &[five]), None);
}
