//! Evaluates an expression tree at a point.  Evaluation never touches
//! anything but its arguments, so one tree may be evaluated from as
//! many threads as like at once.

use ast::{Ast, BinaryOp, Builtin, UnaryOp};
use complex::{self, ComplexNumber};
use errors::EvalError;
use num::Complex;

/// The bindings in effect during an evaluation.  There is only one
/// free variable; the constants come from a fixed table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EvalContext {
    /// The value bound to `z`.
    pub z: ComplexNumber,
}

impl EvalContext {
    /// Binds `z`.
    pub fn new(z: ComplexNumber) -> EvalContext {
        EvalContext { z }
    }
}

fn call(function: Builtin, arg: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    match function {
        Builtin::Sqrt => complex::sqrt(arg),
        Builtin::Exp => complex::exp(arg),
        Builtin::Log => complex::log(arg),
        Builtin::Sin => complex::sin(arg),
        Builtin::Cos => complex::cos(arg),
        Builtin::Tan => complex::tan(arg),
    }
}

fn apply(op: BinaryOp, a: ComplexNumber, b: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    match op {
        BinaryOp::Add => complex::add(a, b),
        BinaryOp::Sub => complex::sub(a, b),
        BinaryOp::Mul => complex::mul(a, b),
        BinaryOp::Div => complex::div(a, b),
        BinaryOp::Pow => complex::pow(a, b),
    }
}

impl Ast {
    /// Evaluates the tree under the given bindings.
    pub fn eval(&self, ctx: &EvalContext) -> Result<ComplexNumber, EvalError> {
        match *self {
            Ast::Number(n) => complex::finite(Complex::new(n, 0.0)),
            Ast::Variable => complex::finite(ctx.z),
            Ast::Constant(c) => Ok(c.value()),
            Ast::UnaryOp(UnaryOp::Neg, ref a) => complex::neg(a.eval(ctx)?),
            Ast::UnaryOp(UnaryOp::Plus, ref a) => a.eval(ctx),
            Ast::BinaryOp(op, ref l, ref r) => {
                let l = l.eval(ctx)?;
                let r = r.eval(ctx)?;
                apply(op, l, r)
            }
            Ast::Call(function, ref a) => call(function, a.eval(ctx)?),
        }
    }
}

/// Evaluates `ast` with `z` bound to the given point.
pub fn evaluate(ast: &Ast, z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    ast.eval(&EvalContext::new(z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::{parse, MAX_DEPTH};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{E, PI};
    use std::sync::Arc;
    use std::thread;

    fn eval_str(source: &str, z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
        evaluate(&parse(source).unwrap(), z)
    }

    fn close(a: ComplexNumber, b: ComplexNumber) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn literals_and_constants() {
        let z = Complex::new(0.0, 0.0);
        assert_eq!(eval_str("2.5", z), Ok(Complex::new(2.5, 0.0)));
        assert_eq!(eval_str("i", z), Ok(Complex::new(0.0, 1.0)));
        assert_eq!(eval_str("pi", z), Ok(Complex::new(PI, 0.0)));
        assert_eq!(eval_str("e", z), Ok(Complex::new(E, 0.0)));
        assert_eq!(eval_str("z", Complex::new(3.0, -4.0)), Ok(Complex::new(3.0, -4.0)));
    }

    #[test]
    fn arithmetic() {
        let z = Complex::new(1.0, 2.0);
        assert_eq!(eval_str("z + 1", z), Ok(Complex::new(2.0, 2.0)));
        assert_eq!(eval_str("z - i", z), Ok(Complex::new(1.0, 1.0)));
        assert_eq!(eval_str("z * z", z), Ok(Complex::new(-3.0, 4.0)));
        assert_eq!(eval_str("-z", z), Ok(Complex::new(-1.0, -2.0)));
        assert_eq!(eval_str("+z", z), Ok(z));
        let q = eval_str("z / (1 + i)", z).unwrap();
        assert!(close(q, Complex::new(1.5, 0.5)));
    }

    #[test]
    fn reciprocal_of_zero_is_division_by_zero() {
        assert_eq!(
            eval_str("1/z", Complex::new(0.0, 0.0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn power_of_zero_is_a_domain_error() {
        assert_eq!(
            eval_str("z^2", Complex::new(0.0, 0.0)),
            Err(EvalError::DomainError)
        );
        assert_eq!(
            eval_str("log(z)", Complex::new(0.0, 0.0)),
            Err(EvalError::DomainError)
        );
    }

    #[test]
    fn non_finite_results_are_errors() {
        assert_eq!(
            eval_str("exp(z)", Complex::new(800.0, 0.0)),
            Err(EvalError::NonFinite)
        );
        assert_eq!(
            eval_str("z*z*z", Complex::new(1e200, 0.0)),
            Err(EvalError::NonFinite)
        );
        assert_eq!(
            eval_str("1/(z - z)", Complex::new(1.0, 1.0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn non_finite_inputs_are_errors() {
        assert_eq!(
            eval_str("z", Complex::new(::std::f64::NAN, 0.0)),
            Err(EvalError::NonFinite)
        );
    }

    #[test]
    fn functions() {
        let z = Complex::new(0.5, -0.25);
        assert!(close(eval_str("exp(z)", z).unwrap(), z.exp()));
        assert!(close(eval_str("sin(z)", z).unwrap(), z.sin()));
        assert!(close(eval_str("cos(z)", z).unwrap(), z.cos()));
        assert!(close(eval_str("tan(z)", z).unwrap(), z.tan()));
        assert!(close(eval_str("log(z)", z).unwrap(), z.ln()));
        assert!(close(eval_str("sqrt(z)", z).unwrap(), z.sqrt()));
        assert!(close(eval_str("sqrt(z)^2", z).unwrap(), z));
        assert!(close(eval_str("exp(log(z))", z).unwrap(), z));
    }

    #[test]
    fn eulers_identity() {
        let r = eval_str("e^(i*pi) + 1", Complex::new(0.0, 0.0)).unwrap();
        assert!(close(r, Complex::new(0.0, 0.0)));
    }

    #[test]
    fn implicit_multiplication_matches_explicit() {
        let implicit = parse("2(z)").unwrap();
        let explicit = parse("2*z").unwrap();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..1000 {
            let z = Complex::new(rng.gen_range(-10.0, 10.0), rng.gen_range(-10.0, 10.0));
            assert_eq!(evaluate(&implicit, z), evaluate(&explicit, z));
        }
    }

    #[test]
    fn shared_between_threads() {
        let ast = Arc::new(parse("(z - 1)/(z + 1)").unwrap());
        let handles: Vec<_> = (0..4)
            .map(|k| {
                let ast = ast.clone();
                thread::spawn(move || {
                    let z = Complex::new(f64::from(k), 1.0);
                    (z, evaluate(&ast, z))
                })
            })
            .collect();
        for h in handles {
            let (z, w) = h.join().unwrap();
            assert!(close(w.unwrap(), (z - 1.0) / (z + 1.0)));
        }
    }

    #[test]
    fn the_deepest_accepted_tree_evaluates_on_a_worker_thread() {
        let ast = Arc::new(parse(&vec!["z"; MAX_DEPTH].join("+")).unwrap());
        let h = thread::spawn(move || evaluate(&ast, Complex::new(1.0, 0.0)));
        assert_eq!(h.join().unwrap(), Ok(Complex::new(MAX_DEPTH as f64, 0.0)));
    }
}
