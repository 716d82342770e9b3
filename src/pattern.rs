//! A synthetic source image, for when there's no picture to hand.
//! Red rises and falls in rings around the centre, green in eight
//! spokes, and blue in diagonal bands, which makes it easy to see what
//! a function did to the plane.  The same size always gives the same
//! bytes.

use itertools::iproduct;

use pixels::{PixelImage, CHANNELS};

fn wave(t: f64) -> u8 {
    ((t.sin() * 0.5 + 0.5) * 255.0).round() as u8
}

/// Generates the test pattern at the given size.
pub fn generate(width: u32, height: u32) -> PixelImage {
    let (cx, cy) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * CHANNELS);
    for (y, x) in iproduct!(0..height, 0..width) {
        let (dx, dy) = (f64::from(x) - cx, f64::from(y) - cy);
        let dist = (dx * dx + dy * dy).sqrt();
        let angle = dy.atan2(dx);
        pixels.extend_from_slice(&[
            wave(dist * 0.05),
            wave(angle * 4.0),
            wave(f64::from(x + y) * 0.01),
            255,
        ]);
    }
    PixelImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_is_deterministic() {
        assert_eq!(generate(64, 32).as_raw(), generate(64, 32).as_raw());
    }

    #[test]
    fn pattern_has_the_requested_size() {
        let p = generate(7, 5);
        assert_eq!((p.width(), p.height()), (7, 5));
        assert_eq!(p.as_raw().len(), 7 * 5 * 4);
    }

    #[test]
    fn pattern_is_opaque() {
        let p = generate(16, 16);
        assert!(p.as_raw().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn pattern_centre() {
        // dist 0, angle 0, and x + y = 8: red and green sit at the
        // midpoint of their waves.
        let p = generate(8, 8);
        let c = p.get(4, 4).unwrap();
        assert_eq!(c[0], 128);
        assert_eq!(c[1], 128);
        assert_eq!(c[2], wave(0.08));
    }
}
