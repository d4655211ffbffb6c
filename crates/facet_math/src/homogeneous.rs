// Homogeneous coordinate helpers for Vec4
//
// Positions are lifted with w=1 and directions/normals with w=0, so a
// Mat4 with a translation column moves points but leaves directions alone.

use glam::{Vec3, Vec4};

/// Extension trait for Vec4 used as a homogeneous coordinate.
pub trait HomogeneousExt {
    /// Lift a position into homogeneous space (w=1).
    fn from_point(point: Vec3) -> Vec4;

    /// Lift a direction or normal into homogeneous space (w=0).
    fn from_vector(vector: Vec3) -> Vec4;

    /// Project back to a Cartesian point.
    ///
    /// Divides by w, except when w is zero (a direction), in which case
    /// the xyz part is returned unchanged.
    fn point(&self) -> Vec3;

    /// Drop w and return the xyz part as a direction.
    fn vector(&self) -> Vec3;
}

impl HomogeneousExt for Vec4 {
    #[inline]
    fn from_point(point: Vec3) -> Vec4 {
        point.extend(1.0)
    }

    #[inline]
    fn from_vector(vector: Vec3) -> Vec4 {
        vector.extend(0.0)
    }

    #[inline]
    fn point(&self) -> Vec3 {
        if self.w == 0.0 {
            self.truncate()
        } else {
            self.truncate() / self.w
        }
    }

    #[inline]
    fn vector(&self) -> Vec3 {
        self.truncate()
    }
}
