//! X-ray beam pyramid and its bounding half-spaces.
//!
//! The beam is a pyramid with its apex at the X-ray focus and its base where
//! the collimated field meets the detector. Vertex order is fixed: row 0 is
//! the source, rows 1-4 wind around the base as
//! `(+l, -d, +w)`, `(+l, -d, -w)`, `(-l, -d, -w)`, `(-l, -d, +w)` in
//! beam-local coordinates. The face normals and the render triangles below
//! both depend on this winding.

use skindose_math::{transform_points, Mat3, Point3, Tolerance, Vec3};

use crate::error::{GeometryError, Result};
use crate::event::EventGeometryParams;
use crate::rotation::RotationSet;

/// Base corners of a unit beam, before scaling.
const UNIT_BASE: [[f64; 3]; 4] = [
    [0.5, -1.0, 0.5],
    [0.5, -1.0, -0.5],
    [-0.5, -1.0, -0.5],
    [-0.5, -1.0, 0.5],
];

/// Beam pyramid in room coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamGeometry {
    /// Source apex followed by the four base corners.
    pub vertices: [Point3; 5],
    /// Outward normals of the four side faces. Not unit length.
    pub normals: [Vec3; 4],
}

impl BeamGeometry {
    /// Vertex index triples for rendering the pyramid as a mesh.
    pub const TRIANGLES: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 1, 4],
        [0, 3, 2],
        [0, 3, 4],
        [1, 2, 3],
        [1, 3, 4],
    ];

    /// Build the beam for an event.
    pub fn build(params: &EventGeometryParams, rotations: &RotationSet) -> Result<Self> {
        params.validate()?;
        Self::place(params, &rotations.beam_transform())
    }

    /// Build from already-validated parameters and a beam transform.
    pub(crate) fn place(params: &EventGeometryParams, transform: &Mat3) -> Result<Self> {
        let mut local = [Point3::origin(); 5];
        local[0] = Point3::new(0.0, params.source_isocenter_distance, 0.0);
        for (dst, c) in local[1..].iter_mut().zip(UNIT_BASE.iter()) {
            *dst = Point3::new(
                c[0] * params.collimation_long,
                c[1] * params.source_detector_distance,
                c[2] * params.collimation_lat,
            );
        }

        let placed = transform_points(transform, &local);
        let mut vertices = [Point3::origin(); 5];
        vertices.copy_from_slice(&placed);

        let normals = face_normals(&vertices)?;
        Ok(Self { vertices, normals })
    }

    /// The X-ray focus.
    pub fn source(&self) -> Point3 {
        self.vertices[0]
    }

    /// The four base corners in winding order.
    pub fn base(&self) -> &[Point3] {
        &self.vertices[1..]
    }

    /// Unit vector from the source toward the center of the base.
    pub fn axis(&self) -> Vec3 {
        let center = self
            .base()
            .iter()
            .fold(Vec3::zeros(), |acc, p| acc + p.coords)
            / 4.0;
        (center - self.source().coords).normalize()
    }
}

/// Outward normals of the four side faces of a beam pyramid.
///
/// Face `k` is spanned by the unit edges from the apex to base corners `k`
/// and `k + 1` (cyclic); its normal is `edge_k × edge_(k+1)`. Fails with
/// [`GeometryError::NumericDegeneracy`] if an edge has zero or non-finite
/// length, or two neighbouring edges are parallel.
pub fn face_normals(vertices: &[Point3; 5]) -> Result<[Vec3; 4]> {
    let tol = Tolerance::DEFAULT;
    let apex = vertices[0];

    let mut edges = [Vec3::zeros(); 4];
    for (k, edge) in edges.iter_mut().enumerate() {
        let e = vertices[k + 1] - apex;
        if !e.norm().is_finite() {
            return Err(GeometryError::NumericDegeneracy(format!(
                "beam edge {k} has non-finite length"
            )));
        }
        if tol.is_zero_vec(&e) {
            return Err(GeometryError::NumericDegeneracy(format!(
                "beam edge {k} has zero length"
            )));
        }
        *edge = e.normalize();
    }

    let mut normals = [Vec3::zeros(); 4];
    for k in 0..4 {
        let n = edges[k].cross(&edges[(k + 1) % 4]);
        // |n| is the sine of the angle between two unit edges.
        if !n.iter().all(|c| c.is_finite()) || n.norm() < tol.angular {
            return Err(GeometryError::NumericDegeneracy(format!(
                "beam edges {k} and {} are collinear",
                (k + 1) % 4
            )));
        }
        normals[k] = n;
    }

    Ok(normals)
}
