#![warn(missing_docs)]

//! Math types for the skindose geometry core.
//!
//! Thin wrappers around nalgebra providing the types used to place the
//! X-ray beam and detector in the treatment room: points, vectors,
//! 3x3 rotation matrices, and tolerance constants. All lengths are in
//! centimeters and all internal angles in radians.

use nalgebra::{Matrix3, Vector3};

/// A point in 3D space (cm).
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A 3x3 matrix, used for rotations and linear point transforms.
pub type Mat3 = Matrix3<f64>;

/// Apply a linear transform to every point in a slice.
///
/// The transform is applied about the world origin (the isocenter); there is
/// no translation component.
pub fn transform_points(m: &Mat3, points: &[Point3]) -> Vec<Point3> {
    points.iter().map(|p| Point3::from(m * p.coords)).collect()
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in cm.
    pub linear: f64,
    /// Tolerance for unitless quantities (matrix entries, sines of angles).
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-9 cm linear, 1e-12 unitless).
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular: 1e-12,
    };

    /// Check if a vector has effectively zero length.
    pub fn is_zero_vec(&self, v: &Vec3) -> bool {
        v.norm() < self.linear
    }

    /// Check if `m * mᵀ` is the identity within `tol` per entry.
    ///
    /// Rotations built from `sin`/`cos` drift by a few ULPs, so callers
    /// should pass something looser than [`Tolerance::angular`].
    pub fn is_orthonormal(m: &Mat3, tol: f64) -> bool {
        let product = m * m.transpose();
        (product - Mat3::identity()).iter().all(|e| e.abs() <= tol)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
