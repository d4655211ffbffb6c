// Vector helpers used by the shading code
//
// glam covers the arithmetic; these add the two operations the renderer
// leans on everywhere and whose edge cases need a fixed answer.

use glam::Vec3;

/// Extension trait for Vec3.
pub trait Vec3Ext {
    /// Unit-length copy of the vector.
    ///
    /// A zero-length (or non-finite) vector has no direction, so this returns
    /// `Vec3::ZERO` instead of a NaN-filled vector. Downstream dot products then
    /// evaluate to zero, which the shading code treats as "facing away".
    fn unit(self) -> Vec3;

    /// Mirror the vector about `normal`: `d - 2(d·n)n`.
    ///
    /// `normal` must be unit length for the result to keep the input's length.
    fn reflected(self, normal: Vec3) -> Vec3;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn unit(self) -> Vec3 {
        self.normalize_or_zero()
    }

    #[inline]
    fn reflected(self, normal: Vec3) -> Vec3 {
        self - 2.0 * self.dot(normal) * normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_has_length_one() {
        let samples = [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-0.001, 0.002, 0.0005),
            Vec3::new(1e4, -2e4, 5e3),
        ];

        for v in samples {
            let u = v.unit();
            assert!((u.length() - 1.0).abs() < 1e-5, "{:?} -> {:?}", v, u);
        }
    }

    #[test]
    fn test_unit_of_zero_is_zero_not_nan() {
        let u = Vec3::ZERO.unit();
        assert_eq!(u, Vec3::ZERO);
        assert!(!u.is_nan());
    }

    #[test]
    fn test_reflect_straight_back() {
        let d = Vec3::new(0.0, 0.0, -1.0);
        let n = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(d.reflected(n), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_reflect_at_45_degrees() {
        let d = Vec3::new(1.0, -1.0, 0.0).unit();
        let r = d.reflected(Vec3::Y);

        assert!((r - Vec3::new(1.0, 1.0, 0.0).unit()).length() < 1e-6);
    }
}
