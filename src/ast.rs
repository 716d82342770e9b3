//! The expression tree.  It is built once per function string, never
//! changes afterward, and is evaluated once per pixel, possibly from
//! several threads at the same time.  Nothing in here is mutable.

use std::f64::consts;
use std::fmt;

use complex::{ComplexNumber, I};
use num::Complex;

/// The named constants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Constant {
    /// 3.14159...
    Pi,
    /// 2.71828...
    E,
    /// The imaginary unit.
    I,
}

impl Constant {
    /// Looks a constant up by the name used in function strings.
    pub fn from_name(name: &str) -> Option<Constant> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            "i" => Some(Constant::I),
            _ => None,
        }
    }

    /// The constant's name as written in a function string.
    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
            Constant::I => "i",
        }
    }

    /// The constant's value.
    pub fn value(self) -> ComplexNumber {
        match self {
            Constant::Pi => Complex::new(consts::PI, 0.0),
            Constant::E => Complex::new(consts::E, 0.0),
            Constant::I => I,
        }
    }
}

/// The single-argument functions a function string may call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// Principal square root.
    Sqrt,
    /// Exponential.
    Exp,
    /// Principal natural logarithm.
    Log,
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
}

impl Builtin {
    /// Looks a function up by name.
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "sqrt" => Some(Builtin::Sqrt),
            "exp" => Some(Builtin::Exp),
            "log" => Some(Builtin::Log),
            "sin" => Some(Builtin::Sin),
            "cos" => Some(Builtin::Cos),
            "tan" => Some(Builtin::Tan),
            _ => None,
        }
    }

    /// The function's name as written in a function string.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Sqrt => "sqrt",
            Builtin::Exp => "exp",
            Builtin::Log => "log",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
        }
    }
}

/// Prefix operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-a`
    Neg,
    /// `+a`, which does nothing.
    Plus,
}

/// Infix operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`, written or implied.
    Mul,
    /// `a / b`
    Div,
    /// `a ^ b`
    Pow,
}

impl BinaryOp {
    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Pow => '^',
        }
    }
}

/// A node of the expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    /// A real literal.
    Number(f64),
    /// The free variable, `z`.  It's the only one there is.
    Variable,
    /// `pi`, `e`, or `i`.
    Constant(Constant),
    /// A prefix operator and its operand.
    UnaryOp(UnaryOp, Box<Ast>),
    /// An infix operator and its operands.
    BinaryOp(BinaryOp, Box<Ast>, Box<Ast>),
    /// A call to one of the builtins.
    Call(Builtin, Box<Ast>),
}

impl Ast {
    /// Convenience constructor for infix nodes.
    pub fn binary(op: BinaryOp, left: Ast, right: Ast) -> Ast {
        Ast::BinaryOp(op, Box::new(left), Box::new(right))
    }

    /// Convenience constructor for prefix nodes.
    pub fn unary(op: UnaryOp, operand: Ast) -> Ast {
        Ast::UnaryOp(op, Box::new(operand))
    }

    /// Convenience constructor for calls.
    pub fn call(function: Builtin, argument: Ast) -> Ast {
        Ast::Call(function, Box::new(argument))
    }
}

/// Prints the tree fully parenthesized, so that the grouping the
/// parser chose is visible in the logs.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Ast::Number(n) => write!(f, "{}", n),
            Ast::Variable => write!(f, "z"),
            Ast::Constant(c) => write!(f, "{}", c.name()),
            Ast::UnaryOp(UnaryOp::Neg, ref a) => write!(f, "(-{})", a),
            Ast::UnaryOp(UnaryOp::Plus, ref a) => write!(f, "(+{})", a),
            Ast::BinaryOp(op, ref l, ref r) => write!(f, "({} {} {})", l, op.symbol(), r),
            Ast::Call(func, ref a) => write!(f, "{}({})", func.name(), a),
        }
    }
}
