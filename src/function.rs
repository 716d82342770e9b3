//! A function the user has submitted and we've accepted.  Parsing
//! happens once, here; the tree is then reused for every render until
//! the user submits something else, however often the scale changes.

use std::str::FromStr;

use ast::Ast;
use complex::ComplexNumber;
use errors::{EvalError, Error};
use eval::evaluate;
use num::Complex;
use parser::parse;

/// Where a new function is tried out before it is accepted.
pub const PROBE: ComplexNumber = Complex { re: 1.0, im: 0.0 };

/// A parsed function that evaluates cleanly at the probe point.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    source: String,
    ast: Ast,
}

impl Function {
    /// Parses and validates a function string.  Surrounding whitespace
    /// is ignored.  A function that fails to parse, or that can't be
    /// evaluated at `PROBE`, is rejected.
    pub fn new(source: &str) -> Result<Function, Error> {
        let source = source.trim();
        if source.is_empty() {
            return Err(Error::EmptyFunction);
        }
        let ast = parse(source)?;
        if let Err(error) = evaluate(&ast, PROBE) {
            return Err(Error::Validation {
                point: PROBE,
                error,
            });
        }
        debug!("accepted w = {}", source);
        Ok(Function {
            source: source.to_string(),
            ast,
        })
    }

    /// The function as the user wrote it, trimmed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed expression.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Evaluates the function at `z`.
    pub fn eval(&self, z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
        evaluate(&self.ast, z)
    }
}

impl FromStr for Function {
    type Err = Error;

    fn from_str(s: &str) -> Result<Function, Error> {
        Function::new(s)
    }
}
