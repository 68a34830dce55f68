//! 2D affine transform in canvas order

use blossom_core::Vec2;

/// `[a, b, c, d, e, f]` maps (x, y) to (a·x + c·y + e, b·x + d·y + f)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine(pub [f32; 6]);

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub fn scale(s: f32) -> Self {
        Self([s, 0.0, 0.0, s, 0.0, 0.0])
    }

    /// Post-multiply by a translation (applied before the existing transform)
    pub fn translate(self, offset: Vec2) -> Self {
        let [a, b, c, d, e, f] = self.0;
        Self([
            a,
            b,
            c,
            d,
            a * offset.x + c * offset.y + e,
            b * offset.x + d * offset.y + f,
        ])
    }

    /// Post-multiply by a rotation of `angle` radians
    pub fn rotate(self, angle: f32) -> Self {
        let [a, b, c, d, e, f] = self.0;
        let (sin, cos) = angle.sin_cos();
        Self([
            a * cos + c * sin,
            b * cos + d * sin,
            c * cos - a * sin,
            d * cos - b * sin,
            e,
            f,
        ])
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        let [a, b, c, d, e, f] = self.0;
        Vec2::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    pub fn determinant(&self) -> f32 {
        let [a, b, c, d, ..] = self.0;
        a * d - b * c
    }

    /// `None` for a degenerate (zero-area) transform
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f32::EPSILON {
            return None;
        }
        let [a, b, c, d, e, f] = self.0;
        Some(Self([
            d / det,
            -b / det,
            -c / det,
            a / det,
            (c * f - d * e) / det,
            (b * e - a * f) / det,
        ]))
    }

    /// Device-space half extents of a local axis-aligned box with half
    /// extents `half`
    pub fn extent(&self, half: Vec2) -> Vec2 {
        let [a, b, c, d, ..] = self.0;
        Vec2::new(
            ((a * half.x).powi(2) + (c * half.y).powi(2)).sqrt(),
            ((b * half.x).powi(2) + (d * half.y).powi(2)).sqrt(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn translate_then_rotate_matches_canvas_order() {
        let t = Affine::IDENTITY
            .translate(Vec2::new(10.0, 20.0))
            .rotate(FRAC_PI_2);
        // Local +x points down after a quarter turn
        assert!(close(t.apply(Vec2::new(1.0, 0.0)), Vec2::new(10.0, 21.0)));
        assert!(close(t.apply(Vec2::ZERO), Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn scale_is_the_outermost_transform() {
        let t = Affine::scale(2.0).translate(Vec2::new(5.0, 5.0));
        assert_eq!(t.apply(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 12.0));
    }

    #[test]
    fn inverse_round_trips() {
        let t = Affine::scale(1.5)
            .translate(Vec2::new(-3.0, 7.0))
            .rotate(0.7);
        let inv = t.inverse().unwrap();
        let p = Vec2::new(4.0, -2.5);
        assert!(close(inv.apply(t.apply(p)), p));
        assert!(Affine::scale(0.0).inverse().is_none());
    }

    #[test]
    fn extent_of_rotated_box() {
        let t = Affine::IDENTITY.rotate(FRAC_PI_2);
        let e = t.extent(Vec2::new(6.0, 3.0));
        assert!(close(e, Vec2::new(3.0, 6.0)));
    }
}
