//! Checked complex arithmetic.  The operators on `num::Complex` are
//! happy to hand back NaN and infinity; these aren't.  Every function
//! here either returns a finite complex number or says why it couldn't.

use std::f64::consts::PI;

use errors::EvalError;
use num::Complex;

/// A point on the complex plane.
pub type ComplexNumber = Complex<f64>;

/// The imaginary unit.
pub const I: ComplexNumber = Complex { re: 0.0, im: 1.0 };

#[inline]
fn is_zero(z: &ComplexNumber) -> bool {
    z.re == 0.0 && z.im == 0.0
}

/// Passes a number through if both parts are finite.
#[inline]
pub fn finite(z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    if z.re.is_finite() && z.im.is_finite() {
        Ok(z)
    } else {
        Err(EvalError::NonFinite)
    }
}

/// a + b
pub fn add(a: ComplexNumber, b: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    finite(a + b)
}

/// a - b
pub fn sub(a: ComplexNumber, b: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    finite(a - b)
}

/// a * b
pub fn mul(a: ComplexNumber, b: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    finite(a * b)
}

/// a / b.  A divisor of zero magnitude is an error, not an infinity.
///
/// Uses Smith's scaling rather than dividing by `|b|^2`, so divisors
/// past 1e154 or below 1e-154 in magnitude don't overflow or underflow
/// on the way to a representable quotient.
pub fn div(a: ComplexNumber, b: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    if is_zero(&b) {
        return Err(EvalError::DivisionByZero);
    }
    let q = if b.re.abs() >= b.im.abs() {
        let r = b.im / b.re;
        let d = b.re + b.im * r;
        Complex::new((a.re + a.im * r) / d, (a.im - a.re * r) / d)
    } else {
        let r = b.re / b.im;
        let d = b.re * r + b.im;
        Complex::new((a.re * r + a.im) / d, (a.im * r - a.re) / d)
    };
    finite(q)
}

/// -a
pub fn neg(a: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    finite(-a)
}

/// a^b, by way of exp(b * log(a)).  That makes 0^b a domain error for
/// every b.
pub fn pow(a: ComplexNumber, b: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    let l = log(a)?;
    exp(mul(b, l)?)
}

/// The principal square root, with the imaginary part of the result
/// non-negative when the argument lies on the negative real axis.
pub fn sqrt(z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    if is_zero(&z) {
        return Ok(Complex::new(0.0, 0.0));
    }
    let t = ((z.norm() + z.re.abs()) / 2.0).sqrt();
    let root = if z.re >= 0.0 {
        Complex::new(t, z.im / (2.0 * t))
    } else {
        Complex::new(z.im.abs() / (2.0 * t), if z.im < 0.0 { -t } else { t })
    };
    finite(root)
}

/// e^z
pub fn exp(z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    finite(z.exp())
}

/// The principal natural logarithm.  The imaginary part lies in
/// (-pi, pi]; log(0) is a domain error.
pub fn log(z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    if is_zero(&z) {
        return Err(EvalError::DomainError);
    }
    let mut arg = z.im.atan2(z.re);
    // atan2 reports -pi for a negative zero imaginary part.
    if arg == -PI {
        arg = PI;
    }
    finite(Complex::new(z.norm().ln(), arg))
}

/// sin(z)
pub fn sin(z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    finite(z.sin())
}

/// cos(z)
pub fn cos(z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    finite(z.cos())
}

/// sin(z) / cos(z).  Where the cosine is exactly zero tan is undefined.
pub fn tan(z: ComplexNumber) -> Result<ComplexNumber, EvalError> {
    let c = cos(z)?;
    if is_zero(&c) {
        return Err(EvalError::DomainError);
    }
    div(sin(z)?, c)
}
