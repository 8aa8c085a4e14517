//! Gantry rotation matrices and their composition.
//!
//! Each positioner angle rotates about one principal room axis:
//!
//! - primary angle: about the longitudinal `z` axis
//! - secondary angle: about the lateral `x` axis
//! - detector rotation: about the vertical `y` axis (the beam axis in the
//!   neutral pose)
//!
//! The beam is placed with `(R2 · R1)ᵀ · R3ᵀ` and the detector panel with
//! `(R2 · R1)ᵀ`. The detector rotation intentionally does not turn the panel
//! itself; only the collimated field is rotated.

use skindose_math::Mat3;

use crate::event::EventGeometryParams;

/// Which angles to build the rotations from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pose {
    /// Use the event's positioner angles.
    #[default]
    Event,
    /// Force all angles to zero, for setup and phantom positioning.
    Neutral,
}

/// The three elemental rotations of one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSet {
    /// Rotation by the primary angle.
    pub primary: Mat3,
    /// Rotation by the secondary angle.
    pub secondary: Mat3,
    /// Rotation by the detector rotation angle.
    pub detector: Mat3,
}

impl RotationSet {
    /// Build from angles in degrees.
    pub fn from_degrees(primary: f64, secondary: f64, detector: f64) -> Self {
        Self {
            primary: primary_rotation(primary.to_radians()),
            secondary: secondary_rotation(secondary.to_radians()),
            detector: detector_rotation(detector.to_radians()),
        }
    }

    /// All-identity rotations.
    pub fn neutral() -> Self {
        Self::from_degrees(0.0, 0.0, 0.0)
    }

    /// Build the rotations for an event in the requested pose.
    pub fn for_event(params: &EventGeometryParams, pose: Pose) -> Self {
        match pose {
            Pose::Event => Self::from_degrees(
                params.primary_angle,
                params.secondary_angle,
                params.detector_rotation_angle,
            ),
            Pose::Neutral => Self::neutral(),
        }
    }

    /// Gantry orientation `(R2 · R1)ᵀ`, shared by beam and detector.
    fn gantry(&self) -> Mat3 {
        (self.secondary * self.primary).transpose()
    }

    /// Transform placing beam-local points in the room.
    pub fn beam_transform(&self) -> Mat3 {
        self.gantry() * self.detector.transpose()
    }

    /// Transform placing detector-local points in the room.
    pub fn detector_transform(&self) -> Mat3 {
        self.gantry()
    }
}

/// Rotation about `z` by `a` radians.
pub fn primary_rotation(a: f64) -> Mat3 {
    let (s, c) = a.sin_cos();
    Mat3::new(
        c, s, 0.0, //
        -s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Rotation about `x` by `a` radians.
pub fn secondary_rotation(a: f64) -> Mat3 {
    let (s, c) = a.sin_cos();
    Mat3::new(
        1.0, 0.0, 0.0, //
        0.0, c, s, //
        0.0, -s, c,
    )
}

/// Rotation about `y` by `a` radians.
pub fn detector_rotation(a: f64) -> Mat3 {
    let (s, c) = a.sin_cos();
    Mat3::new(
        c, 0.0, -s, //
        0.0, 1.0, 0.0, //
        s, 0.0, c,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use skindose_math::{Tolerance, Vec3};

    const ORTHO_TOL: f64 = 1e-12;

    const ANGLES: [f64; 9] = [0.0, 90.0, -90.0, 180.0, -180.0, 45.0, -30.0, 270.0, 12.34];

    #[test]
    fn test_elemental_rotations_orthonormal() {
        for &a in &ANGLES {
            let r = a.to_radians();
            assert!(Tolerance::is_orthonormal(&primary_rotation(r), ORTHO_TOL));
            assert!(Tolerance::is_orthonormal(&secondary_rotation(r), ORTHO_TOL));
            assert!(Tolerance::is_orthonormal(&detector_rotation(r), ORTHO_TOL));
        }
    }

    #[test]
    fn test_composed_transforms_orthonormal() {
        for &a in &ANGLES {
            for &b in &ANGLES {
                for &c in &ANGLES {
                    let set = RotationSet::from_degrees(a, b, c);
                    assert!(Tolerance::is_orthonormal(&set.beam_transform(), ORTHO_TOL));
                    assert!(Tolerance::is_orthonormal(&set.detector_transform(), ORTHO_TOL));
                }
            }
        }
    }

    #[test]
    fn test_neutral_is_identity() {
        let set = RotationSet::neutral();
        assert_eq!(set.beam_transform(), Mat3::identity());
        assert_eq!(set.detector_transform(), Mat3::identity());
    }

    #[test]
    fn test_neutral_pose_ignores_event_angles() {
        let params = EventGeometryParams {
            primary_angle: 60.0,
            secondary_angle: 25.0,
            detector_rotation_angle: 10.0,
            collimation_long: 20.0,
            collimation_lat: 10.0,
            source_detector_distance: 100.0,
            source_isocenter_distance: 60.0,
            detector_side_length: 40.0,
        };
        assert_eq!(
            RotationSet::for_event(&params, Pose::Neutral),
            RotationSet::neutral()
        );
        assert_ne!(
            RotationSet::for_event(&params, Pose::Event),
            RotationSet::neutral()
        );
    }

    #[test]
    fn test_primary_90_swings_source_sideways() {
        // Source above the isocenter swings onto the room's x axis.
        let set = RotationSet::from_degrees(90.0, 0.0, 0.0);
        let source = set.beam_transform() * Vec3::new(0.0, 60.0, 0.0);
        assert_relative_eq!(source.x, -60.0, epsilon = 1e-9);
        assert_relative_eq!(source.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(source.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_secondary_90_tilts_source_along_z() {
        let set = RotationSet::from_degrees(0.0, 90.0, 0.0);
        let source = set.beam_transform() * Vec3::new(0.0, 60.0, 0.0);
        assert_relative_eq!(source.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(source.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(source.z, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_detector_rotation_entries() {
        let m = detector_rotation(30f64.to_radians());
        let (s, c) = (0.5, 3f64.sqrt() / 2.0);
        assert_relative_eq!(m[(0, 0)], c, epsilon = 1e-12);
        assert_relative_eq!(m[(0, 2)], -s, epsilon = 1e-12);
        assert_relative_eq!(m[(2, 0)], s, epsilon = 1e-12);
        assert_relative_eq!(m[(2, 2)], c, epsilon = 1e-12);
        assert_eq!(m[(1, 1)], 1.0);
    }

    #[test]
    fn test_detector_90_turns_long_axis_onto_z() {
        let set = RotationSet::from_degrees(0.0, 0.0, 90.0);
        let long = set.beam_transform() * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(long, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        let lat = set.beam_transform() * Vec3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(lat, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_detector_rotation_keeps_axis() {
        // Spinning about the beam axis leaves the source where it is.
        let set = RotationSet::from_degrees(0.0, 0.0, 37.0);
        let source = set.beam_transform() * Vec3::new(0.0, 60.0, 0.0);
        assert_relative_eq!(source.y, 60.0, epsilon = 1e-9);
        assert_eq!(set.detector_transform(), Mat3::identity());
    }
}
