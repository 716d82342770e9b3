//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane, origin at the top left
//! and y growing downward, and the complex plane, origin at the centre
//! of that rectangle and the imaginary axis growing upward.  A scale
//! of 1.0 puts 80 pixels in one unit of the complex plane.
use complex::ComplexNumber;
use errors::Error;
use num::Complex;

/// How many pixels make one plane unit at a scale of 1.0.
pub const PIXELS_PER_UNIT: f64 = 80.0;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0.  All coordinates on it are non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub u32, pub u32);

/// Describes the x, y of a point in a region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub u32, pub u32);

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a complex, real cartesian plane.  Maps points from one to the
/// other.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    // Half the width and half the height of the integral plane, in
    // pixels; this is where the complex origin lands.
    center: (f64, f64),
    // Pixels per unit of the complex plane.
    grid_factor: f64,
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane and the
    /// scale, which must be a positive, finite number.
    pub fn new(width: u32, height: u32, scale: f64) -> Result<PlaneMapper, Error> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::InvalidScale(scale));
        }

        Ok(PlaneMapper::scaled(width, height, scale))
    }

    // For callers that have already checked the scale.
    pub(crate) fn scaled(width: u32, height: u32, scale: f64) -> PlaneMapper {
        PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            center: (f64::from(width) / 2.0, f64::from(height) / 2.0),
            grid_factor: scale * PIXELS_PER_UNIT,
        }
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        (self.integral_plane.0 as usize) * (self.integral_plane.1 as usize)
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a pixel on the integral cartesian plane, return the
    /// complex number at the same place on the complex plane.
    pub fn pixel_to_plane(&self, pixel: &Pixel) -> ComplexNumber {
        Complex::new(
            (f64::from(pixel.0) - self.center.0) / self.grid_factor,
            (self.center.1 - f64::from(pixel.1)) / self.grid_factor,
        )
    }

    /// The exact inverse of `pixel_to_plane`.  The result may be
    /// fractional, negative, or beyond the edges of the plane.
    pub fn plane_to_pixel(&self, point: &ComplexNumber) -> (f64, f64) {
        (
            point.re * self.grid_factor + self.center.0,
            self.center.1 - point.im * self.grid_factor,
        )
    }

    /// Given a complex number, find the nearest pixel on the integral
    /// plane, or None if that lies off the plane.  Halves round up.
    pub fn sample_pixel(&self, point: &ComplexNumber) -> Option<Pixel> {
        let (x, y) = self.plane_to_pixel(point);
        let (x, y) = ((x + 0.5).floor(), (y + 0.5).floor());
        if x < 0.0
            || y < 0.0
            || x >= f64::from(self.integral_plane.0)
            || y >= f64::from(self.integral_plane.1)
        {
            return None;
        }
        Some(Pixel(x as u32, y as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planemapper_fails_on_bad_scale() {
        assert!(PlaneMapper::new(4, 4, 0.0).is_err());
        assert!(PlaneMapper::new(4, 4, -1.0).is_err());
        assert!(PlaneMapper::new(4, 4, ::std::f64::NAN).is_err());
        assert!(PlaneMapper::new(4, 4, ::std::f64::INFINITY).is_err());
    }

    #[test]
    fn planemapper_passes_on_good_scale() {
        let pm = PlaneMapper::new(4, 4, 0.5);
        assert!(pm.is_ok());
    }

    #[test]
    fn center_pixel_is_the_origin() {
        let pm = PlaneMapper::new(400, 400, 1.0).unwrap();
        assert_eq!(pm.pixel_to_plane(&Pixel(200, 200)), Complex::new(0.0, 0.0));
    }

    #[test]
    fn pixel_to_plane_flips_the_vertical_axis() {
        let pm = PlaneMapper::new(400, 400, 1.0).unwrap();
        assert_eq!(pm.pixel_to_plane(&Pixel(280, 200)), Complex::new(1.0, 0.0));
        assert_eq!(pm.pixel_to_plane(&Pixel(200, 120)), Complex::new(0.0, 1.0));
        assert_eq!(pm.pixel_to_plane(&Pixel(0, 400)), Complex::new(-2.5, -2.5));
    }

    #[test]
    fn scale_widens_the_unit() {
        let pm = PlaneMapper::new(400, 400, 2.0).unwrap();
        assert_eq!(pm.pixel_to_plane(&Pixel(360, 200)), Complex::new(1.0, 0.0));
        assert_eq!(pm.plane_to_pixel(&Complex::new(1.0, 1.0)), (360.0, 40.0));
    }

    #[test]
    fn plane_to_pixel_inverts_pixel_to_plane() {
        let pm = PlaneMapper::new(640, 480, 1.3).unwrap();
        for &(x, y) in &[(0, 0), (17, 401), (639, 479), (320, 240)] {
            let (px, py) = pm.plane_to_pixel(&pm.pixel_to_plane(&Pixel(x, y)));
            assert!((px - f64::from(x)).abs() < 1e-9);
            assert!((py - f64::from(y)).abs() < 1e-9);
            assert_eq!(pm.sample_pixel(&pm.pixel_to_plane(&Pixel(x, y))), Some(Pixel(x, y)));
        }
    }

    #[test]
    fn sample_pixel_rounds_to_nearest() {
        let pm = PlaneMapper::new(400, 400, 1.0).unwrap();
        // (1.4, 0.6) pixels right and up of centre
        let p = Complex::new(1.4 / 80.0, 0.6 / 80.0);
        assert_eq!(pm.sample_pixel(&p), Some(Pixel(201, 199)));
    }

    #[test]
    fn sample_pixel_rejects_points_off_the_plane() {
        let pm = PlaneMapper::new(400, 400, 1.0).unwrap();
        assert_eq!(pm.sample_pixel(&Complex::new(2.5, 0.0)), None);
        assert_eq!(pm.sample_pixel(&Complex::new(0.0, 2.6)), None);
        assert_eq!(pm.sample_pixel(&Complex::new(-2.6, 0.0)), None);
        assert_eq!(pm.sample_pixel(&Complex::new(0.0, -2.5)), None);
        assert_eq!(pm.sample_pixel(&Complex::new(-2.5, 2.5)), Some(Pixel(0, 0)));
    }

    #[test]
    fn len_and_is_empty() {
        assert_eq!(PlaneMapper::new(4, 3, 1.0).unwrap().len(), 12);
        assert!(PlaneMapper::new(0, 3, 1.0).unwrap().is_empty());
    }
}
