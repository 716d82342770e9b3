// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The three ways things go wrong: the function text doesn't parse,
//! the function can't be evaluated at some point, or the caller
//! handed us something unusable (a bad scale, a short pixel buffer).

use std::fmt;

use complex::ComplexNumber;

/// What, specifically, the parser didn't like.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseErrorKind {
    /// Nothing but whitespace.
    EmptyInput,
    /// A numeric literal that isn't one, such as `1.2.3`, `1e` or a lone `.`
    MalformedNumber(String),
    /// A `(` without its `)`, or the other way around.
    UnbalancedParenthesis,
    /// A name that is neither the variable nor a known constant.
    UnknownIdentifier(String),
    /// A name used as a function that isn't one of ours.
    UnknownFunction(String),
    /// A token that doesn't belong where it was found.
    UnexpectedToken {
        /// What we got.
        found: String,
        /// What would have been acceptable.
        expected: &'static str,
    },
    /// The input stopped in the middle of an expression.
    UnexpectedEnd {
        /// What would have been acceptable.
        expected: &'static str,
    },
    /// A character that cannot start any token.
    UnexpectedCharacter(char),
    /// Nested deeper than `parser::MAX_DEPTH` allows.
    TooDeep,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseErrorKind::EmptyInput => write!(f, "the function is empty"),
            ParseErrorKind::MalformedNumber(ref s) => write!(f, "malformed number '{}'", s),
            ParseErrorKind::UnbalancedParenthesis => write!(f, "unbalanced parenthesis"),
            ParseErrorKind::UnknownIdentifier(ref s) => write!(f, "unknown identifier '{}'", s),
            ParseErrorKind::UnknownFunction(ref s) => write!(f, "unknown function '{}'", s),
            ParseErrorKind::UnexpectedToken {
                ref found,
                expected,
            } => write!(f, "expected {}, found '{}'", expected, found),
            ParseErrorKind::UnexpectedEnd { expected } => {
                write!(f, "expected {}, found end of input", expected)
            }
            ParseErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character '{}'", c),
            ParseErrorKind::TooDeep => write!(f, "the function is nested too deeply"),
        }
    }
}

/// A function string that could not be turned into an expression
/// tree.  The position is a byte offset into the source string.
#[derive(Clone, Debug, PartialEq, Fail)]
#[fail(display = "{} at position {}", kind, position)]
pub struct ParseError {
    /// The reason.
    pub kind: ParseErrorKind,
    /// Byte offset of the offending input.
    pub position: usize,
}

impl ParseError {
    /// Constructor.
    pub fn new(kind: ParseErrorKind, position: usize) -> ParseError {
        ParseError { kind, position }
    }
}

/// Why a function could not be evaluated at a particular point.  During
/// a render these are swallowed and the pixel is painted black.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Fail)]
pub enum EvalError {
    /// Division by a complex number of zero magnitude.
    #[fail(display = "division by zero")]
    DivisionByZero,
    /// A function evaluated outside of its domain, such as `log(0)`.
    #[fail(display = "argument outside the function's domain")]
    DomainError,
    /// Some step produced a NaN or an infinity.
    #[fail(display = "result is not a finite number")]
    NonFinite,
}

/// Everything the library can refuse to do.
#[derive(Debug, PartialEq, Fail)]
pub enum Error {
    /// The function string was blank.
    #[fail(display = "no function was given")]
    EmptyFunction,
    /// The function string did not parse.
    #[fail(display = "invalid function: {}", _0)]
    Parse(#[cause] ParseError),
    /// The function parsed but could not be evaluated at the probe point.
    #[fail(display = "invalid function: cannot evaluate at z = {}: {}", point, error)]
    Validation {
        /// Where we tried.
        point: ComplexNumber,
        /// What went wrong.
        #[cause]
        error: EvalError,
    },
    /// The scale must be a finite number greater than zero.
    #[fail(display = "scale must be a positive number, got {}", _0)]
    InvalidScale(f64),
    /// Rendering needs at least one thread to do the work.
    #[fail(display = "at least one render thread is required")]
    NoThreads,
    /// A raw pixel buffer didn't match its stated dimensions.
    #[fail(
        display = "a {}x{} RGBA image needs {} bytes, got {}",
        width, height, expected, actual
    )]
    BufferSize {
        /// Stated width.
        width: u32,
        /// Stated height.
        height: u32,
        /// Bytes required.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Error {
        Error::Parse(e)
    }
}
