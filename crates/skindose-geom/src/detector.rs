//! Detector panel cuboid.

use skindose_math::{transform_points, Mat3, Point3};

use crate::error::{GeometryError, Result};
use crate::event::EventGeometryParams;
use crate::rotation::RotationSet;

/// Unit cuboid: front face at `y = -1`, back face at `y = -1.2`.
///
/// The back face only gives the panel visible thickness.
const UNIT_CUBOID: [[f64; 3]; 8] = [
    [0.5, -1.0, 0.5],
    [0.5, -1.0, -0.5],
    [-0.5, -1.0, -0.5],
    [-0.5, -1.0, 0.5],
    [0.5, -1.2, 0.5],
    [0.5, -1.2, -0.5],
    [-0.5, -1.2, -0.5],
    [-0.5, -1.2, 0.5],
];

/// Detector panel in room coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorGeometry {
    /// Front face corners (0-3) then back face corners (4-7), same winding
    /// as the beam base.
    pub corners: [Point3; 8],
}

impl DetectorGeometry {
    /// Vertex index triples for rendering the cuboid as a mesh.
    pub const TRIANGLES: [[usize; 3]; 12] = [
        [0, 1, 2],
        [0, 2, 3],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 4],
        [1, 5, 4],
        [0, 3, 4],
        [3, 7, 4],
        [3, 2, 7],
        [7, 2, 6],
        [1, 2, 6],
        [1, 6, 5],
    ];

    /// Build the detector for an event.
    ///
    /// Only the gantry rotation is applied; the detector rotation angle
    /// turns the collimated field, not the panel.
    pub fn build(params: &EventGeometryParams, rotations: &RotationSet) -> Result<Self> {
        params.validate()?;
        Self::place(params, &rotations.detector_transform())
    }

    /// Build from already-validated parameters and a detector transform.
    ///
    /// A zero side length collapses the panel to a segment and fails with
    /// [`GeometryError::NumericDegeneracy`].
    pub(crate) fn place(params: &EventGeometryParams, transform: &Mat3) -> Result<Self> {
        let side = params.detector_side_length;
        if side == 0.0 {
            return Err(GeometryError::NumericDegeneracy(
                "detector_side_length is zero".into(),
            ));
        }
        let local: Vec<Point3> = UNIT_CUBOID
            .iter()
            .map(|c| {
                Point3::new(
                    c[0] * side,
                    c[1] * params.source_detector_distance,
                    c[2] * side,
                )
            })
            .collect();

        let mut corners = [Point3::origin(); 8];
        corners.copy_from_slice(&transform_points(transform, &local));
        Ok(Self { corners })
    }

    /// The four corners of the imaging surface.
    pub fn front(&self) -> &[Point3] {
        &self.corners[..4]
    }

    /// Center of the imaging surface.
    pub fn center(&self) -> Point3 {
        let sum = self.front().iter().fold(Point3::origin(), |acc, p| acc + p.coords);
        sum / 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::BeamGeometry;
    use approx::assert_relative_eq;

    fn params() -> EventGeometryParams {
        EventGeometryParams {
            primary_angle: 0.0,
            secondary_angle: 0.0,
            detector_rotation_angle: 0.0,
            collimation_long: 20.0,
            collimation_lat: 10.0,
            source_detector_distance: 100.0,
            source_isocenter_distance: 60.0,
            detector_side_length: 40.0,
        }
    }

    #[test]
    fn test_neutral_corners() {
        let det = DetectorGeometry::build(&params(), &RotationSet::neutral()).unwrap();
        assert_eq!(det.corners[0], Point3::new(20.0, -100.0, 20.0));
        assert_eq!(det.corners[2], Point3::new(-20.0, -100.0, -20.0));
        assert_relative_eq!(det.corners[4].y, -120.0, epsilon = 1e-9);
        assert_relative_eq!(det.corners[7].y, -120.0, epsilon = 1e-9);
        assert_eq!(det.center(), Point3::new(0.0, -100.0, 0.0));
    }

    #[test]
    fn test_detector_rotation_does_not_turn_panel() {
        let still = DetectorGeometry::build(&params(), &RotationSet::neutral()).unwrap();
        let spun = DetectorGeometry::build(
            &params(),
            &RotationSet::from_degrees(0.0, 0.0, 45.0),
        )
        .unwrap();
        assert_eq!(still, spun);
    }

    #[test]
    fn test_beam_base_lies_on_detector_plane() {
        let rot = RotationSet::from_degrees(30.0, 20.0, 0.0);
        let beam = BeamGeometry::build(&params(), &rot).unwrap();
        let det = DetectorGeometry::build(&params(), &rot).unwrap();

        let f = det.front();
        let normal = (f[1] - f[0]).cross(&(f[3] - f[0]));
        for corner in beam.base() {
            assert_relative_eq!((corner - f[0]).dot(&normal), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_side_length_rejected() {
        let p = EventGeometryParams {
            detector_side_length: 0.0,
            ..params()
        };
        assert!(matches!(
            DetectorGeometry::build(&p, &RotationSet::neutral()),
            Err(GeometryError::NumericDegeneracy(_))
        ));
    }
}
