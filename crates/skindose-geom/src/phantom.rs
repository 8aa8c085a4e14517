//! Patient phantom skin surface, as handed over by the phantom builder.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skindose_math::{Point3, Vec3};

use crate::error::{GeometryError, Result};

/// Shape family of a patient phantom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhantomKind {
    /// One-sided planar surface. Has no exit side.
    Plane,
    /// Elliptical cylinder.
    Cylinder,
    /// Anthropomorphic mesh.
    Human,
}

impl PhantomKind {
    /// Whether the phantom encloses a volume and so has exit-side cells.
    pub fn is_volumetric(self) -> bool {
        !matches!(self, PhantomKind::Plane)
    }

    /// Lowercase tag used in settings and data files.
    pub fn as_str(self) -> &'static str {
        match self {
            PhantomKind::Plane => "plane",
            PhantomKind::Cylinder => "cylinder",
            PhantomKind::Human => "human",
        }
    }
}

impl fmt::Display for PhantomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhantomKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plane" => Ok(PhantomKind::Plane),
            "cylinder" => Ok(PhantomKind::Cylinder),
            "human" => Ok(PhantomKind::Human),
            other => Err(GeometryError::UnsupportedPhantomKind(other.to_string())),
        }
    }
}

/// Skin-cell centroids of a phantom, with outward normals for volumetric
/// kinds.
///
/// Construct through [`PhantomSurface::new`] so the lengths and coordinates
/// are checked once.
#[derive(Debug, Clone, PartialEq)]
pub struct PhantomSurface {
    kind: PhantomKind,
    points: Vec<Point3>,
    normals: Option<Vec<Vec3>>,
}

impl PhantomSurface {
    /// Validate and wrap a phantom surface.
    ///
    /// Volumetric kinds need one normal per point. Plane phantoms may carry
    /// normals; they are length-checked and otherwise ignored.
    pub fn new(kind: PhantomKind, points: Vec<Point3>, normals: Option<Vec<Vec3>>) -> Result<Self> {
        match (&normals, kind.is_volumetric()) {
            (None, true) => {
                return Err(GeometryError::InvalidInput(format!(
                    "{kind} phantom requires surface normals"
                )))
            }
            (Some(n), _) if n.len() != points.len() => {
                return Err(GeometryError::InvalidInput(format!(
                    "{} points but {} normals",
                    points.len(),
                    n.len()
                )))
            }
            _ => {}
        }

        if let Some(i) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(GeometryError::InvalidInput(format!(
                "point {i} has a non-finite coordinate"
            )));
        }
        if let Some(n) = &normals {
            if let Some(i) = n.iter().position(|v| !v.iter().all(|c| c.is_finite())) {
                return Err(GeometryError::InvalidInput(format!(
                    "normal {i} has a non-finite component"
                )));
            }
        }

        Ok(Self {
            kind,
            points,
            normals,
        })
    }

    /// Plane phantom from points alone.
    pub fn plane(points: Vec<Point3>) -> Result<Self> {
        Self::new(PhantomKind::Plane, points, None)
    }

    /// Phantom kind.
    pub fn kind(&self) -> PhantomKind {
        self.kind
    }

    /// Skin-cell centroids.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Outward normals, one per point, if present.
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    /// Number of skin cells.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the surface has no cells.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Serialized form of a [`PhantomSurface`], as written by the phantom
/// builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhantomSurfaceData {
    /// Kind tag: `plane`, `cylinder` or `human`.
    pub kind: String,
    /// Skin-cell centroids, `[x, y, z]` in cm.
    pub points: Vec<[f64; 3]>,
    /// Outward normals, one per point.
    #[serde(default)]
    pub normals: Option<Vec<[f64; 3]>>,
}

impl TryFrom<PhantomSurfaceData> for PhantomSurface {
    type Error = GeometryError;

    fn try_from(data: PhantomSurfaceData) -> Result<Self> {
        let kind: PhantomKind = data.kind.parse()?;
        let points = data.points.into_iter().map(Point3::from).collect();
        let normals = data
            .normals
            .map(|ns| ns.into_iter().map(Vec3::from).collect());
        PhantomSurface::new(kind, points, normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!("plane".parse::<PhantomKind>().unwrap(), PhantomKind::Plane);
        assert_eq!("cylinder".parse::<PhantomKind>().unwrap(), PhantomKind::Cylinder);
        assert_eq!("human".parse::<PhantomKind>().unwrap(), PhantomKind::Human);
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = "torso".parse::<PhantomKind>().unwrap_err();
        assert_eq!(err, GeometryError::UnsupportedPhantomKind("torso".into()));
    }

    #[test]
    fn test_volumetric_requires_normals() {
        let err = PhantomSurface::new(PhantomKind::Cylinder, vec![Point3::origin()], None)
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidInput(_)));
    }

    #[test]
    fn test_length_mismatch() {
        let err = PhantomSurface::new(
            PhantomKind::Human,
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            Some(vec![Vec3::y()]),
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_point() {
        let err = PhantomSurface::plane(vec![Point3::new(0.0, f64::NAN, 0.0)]).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidInput(_)));
    }

    #[test]
    fn test_plane_normals_are_optional() {
        let p = PhantomSurface::plane(vec![Point3::origin()]).unwrap();
        assert_eq!(p.kind(), PhantomKind::Plane);
        assert!(p.normals().is_none());
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "kind": "cylinder",
            "points": [[0.0, 1.0, 0.0], [0.0, -1.0, 0.0]],
            "normals": [[0.0, 1.0, 0.0], [0.0, -1.0, 0.0]]
        }"#;
        let data: PhantomSurfaceData = serde_json::from_str(json).unwrap();
        let surface = PhantomSurface::try_from(data).unwrap();
        assert_eq!(surface.kind(), PhantomKind::Cylinder);
        assert_eq!(surface.points()[1], Point3::new(0.0, -1.0, 0.0));
        assert_eq!(surface.normals().unwrap()[0], Vec3::y());
    }

    #[test]
    fn test_from_json_unknown_kind() {
        let data = PhantomSurfaceData {
            kind: "sphere".into(),
            points: vec![],
            normals: None,
        };
        assert!(matches!(
            PhantomSurface::try_from(data),
            Err(GeometryError::UnsupportedPhantomKind(_))
        ));
    }
}
