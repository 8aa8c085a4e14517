//! Per-event positioner and collimation parameters.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};

/// Geometry parameters of one irradiation event.
///
/// Angles are in degrees, lengths in centimeters. Records come from the
/// dose-report normalizer and are validated once with
/// [`EventGeometryParams::validate`] before any transform is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventGeometryParams {
    /// Positioner primary angle (degrees).
    pub primary_angle: f64,
    /// Positioner secondary angle (degrees).
    pub secondary_angle: f64,
    /// Detector rotation angle (degrees).
    pub detector_rotation_angle: f64,
    /// Longitudinal collimated field width at the detector (cm).
    pub collimation_long: f64,
    /// Lateral collimated field width at the detector (cm).
    pub collimation_lat: f64,
    /// Source-to-detector distance (cm). Beam base corners and the detector
    /// face are placed this far from the isocenter on the side opposite
    /// the source.
    pub source_detector_distance: f64,
    /// Distance from the source to the isocenter (cm).
    pub source_isocenter_distance: f64,
    /// Side length of the square detector panel (cm).
    pub detector_side_length: f64,
}

impl EventGeometryParams {
    /// Check every field for finiteness, sign and degeneracy.
    ///
    /// Non-finite values and negative lengths are
    /// [`GeometryError::InvalidInput`]; zero collimation and a zero
    /// source-detector distance are [`GeometryError::NumericDegeneracy`].
    /// The panel size never enters the beam, so a zero detector side is
    /// left to [`DetectorGeometry::build`](crate::DetectorGeometry::build).
    pub fn validate(&self) -> Result<()> {
        let angles = [
            ("primary_angle", self.primary_angle),
            ("secondary_angle", self.secondary_angle),
            ("detector_rotation_angle", self.detector_rotation_angle),
        ];
        for (name, value) in angles {
            if !value.is_finite() {
                return Err(GeometryError::InvalidInput(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        let lengths = [
            ("collimation_long", self.collimation_long),
            ("collimation_lat", self.collimation_lat),
            ("source_detector_distance", self.source_detector_distance),
            ("source_isocenter_distance", self.source_isocenter_distance),
            ("detector_side_length", self.detector_side_length),
        ];
        for (name, value) in lengths {
            if !value.is_finite() {
                return Err(GeometryError::InvalidInput(format!(
                    "{name} must be finite, got {value}"
                )));
            }
            if value < 0.0 {
                return Err(GeometryError::InvalidInput(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        // Source may sit at the isocenter; these span the beam.
        let spans = [
            ("collimation_long", self.collimation_long),
            ("collimation_lat", self.collimation_lat),
            ("source_detector_distance", self.source_detector_distance),
        ];
        for (name, value) in spans {
            if value == 0.0 {
                return Err(GeometryError::NumericDegeneracy(format!(
                    "{name} is zero"
                )));
            }
        }

        Ok(())
    }
}
