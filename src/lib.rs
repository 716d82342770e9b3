#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Conformal map renderer
//!
//! Takes a function of one complex variable, w = f(z), and shows what
//! it does to the plane by pushing a picture through it.  The output
//! image and the source image are both laid over the complex plane,
//! centred on the origin.  Each output pixel is a point z; its colour is
//! whatever the source image has at the point f(z).  Where f is
//! undefined, or f(z) falls outside the source, the output is black.
//!
//! Functions are written as ordinary arithmetic over `z`, the constants
//! `pi`, `e` and `i`, and the functions `sqrt`, `exp`, `log`, `sin`,
//! `cos` and `tan`: `1/z`, `z^2`, `exp(z)`, `(z - i)/(z + i)`.
//!
//! ```
//! use conformal::{generate_test_pattern, render, Function, RenderConfig};
//!
//! let source = generate_test_pattern(64, 64);
//! let f = Function::new("1/z").unwrap();
//! let config = RenderConfig::new(1.0).unwrap();
//! let out = render(&source, f.ast(), &config);
//! assert_eq!(out.width(), 64);
//! ```

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

#[cfg(test)]
extern crate rand;

pub mod ast;
pub mod complex;
pub mod errors;
pub mod eval;
pub mod function;
pub mod parser;
pub mod pattern;
pub mod pixels;
pub mod planes;
pub mod presets;
pub mod render;

pub use ast::Ast;
pub use complex::ComplexNumber;
pub use errors::{Error, EvalError, ParseError, ParseErrorKind};
pub use eval::{evaluate, EvalContext};
pub use function::Function;
pub use pixels::{PixelImage, BLACK};
pub use planes::{Pixel, PlaneMapper};
pub use render::{render, render_cancellable, render_optional, RenderConfig, RenderStats};

/// Parses a function string into an expression tree.  Keep the tree for
/// as long as the function string stays the same.
pub fn parse_function(source: &str) -> Result<Ast, ParseError> {
    parser::parse(source)
}

/// A deterministic source image of the given size.
pub fn generate_test_pattern(width: u32, height: u32) -> PixelImage {
    pattern::generate(width, height)
}
