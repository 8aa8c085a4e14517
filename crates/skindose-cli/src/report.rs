//! JSON output handed to the dose and visualization stages.

use serde::Serialize;
use skindose_geom::{BeamGeometry, DetectorGeometry, EventGeometry, HitResult, Pose};
use skindose_math::{Point3, Vec3};

fn point_row(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn vec_row(v: &Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Beam pyramid as vertex rows and mesh triangles.
#[derive(Debug, Serialize)]
pub struct BeamReport {
    /// Source followed by the four base corners.
    pub vertices: Vec<[f64; 3]>,
    /// Outward face normals.
    pub normals: Vec<[f64; 3]>,
    /// Vertex index triples.
    pub triangles: Vec<[usize; 3]>,
}

impl From<&BeamGeometry> for BeamReport {
    fn from(beam: &BeamGeometry) -> Self {
        Self {
            vertices: beam.vertices.iter().map(point_row).collect(),
            normals: beam.normals.iter().map(vec_row).collect(),
            triangles: BeamGeometry::TRIANGLES.to_vec(),
        }
    }
}

/// Detector cuboid as corner rows and mesh triangles.
#[derive(Debug, Serialize)]
pub struct DetectorReport {
    /// Front face corners then back face corners.
    pub corners: Vec<[f64; 3]>,
    /// Vertex index triples.
    pub triangles: Vec<[usize; 3]>,
}

impl From<&DetectorGeometry> for DetectorReport {
    fn from(det: &DetectorGeometry) -> Self {
        Self {
            corners: det.corners.iter().map(point_row).collect(),
            triangles: DetectorGeometry::TRIANGLES.to_vec(),
        }
    }
}

/// Geometry of one event.
#[derive(Debug, Serialize)]
pub struct GeometryReport {
    /// Event index in the procedure.
    pub event: usize,
    /// Whether the event's angles were used.
    pub neutral_pose: bool,
    /// Beam pyramid.
    pub beam: BeamReport,
    /// Detector panel.
    pub detector: DetectorReport,
}

impl GeometryReport {
    /// Report for an already-built event geometry.
    pub fn new(event: usize, pose: Pose, geometry: &EventGeometry) -> Self {
        Self {
            event,
            neutral_pose: pose == Pose::Neutral,
            beam: BeamReport::from(&geometry.beam),
            detector: DetectorReport::from(&geometry.detector),
        }
    }
}

/// Hit flags of one event.
#[derive(Debug, Serialize)]
pub struct HitReport {
    /// Event index in the procedure.
    pub event: usize,
    /// Number of skin cells tested.
    pub cells: usize,
    /// Number of skin cells hit.
    pub hit_count: usize,
    /// One flag per skin cell.
    pub hits: Vec<bool>,
}

impl HitReport {
    /// Report for one event's hit result.
    pub fn new(event: usize, hits: HitResult) -> Self {
        Self {
            event,
            cells: hits.len(),
            hit_count: hits.count(),
            hits: hits.into_vec(),
        }
    }
}

/// An event left out of the output.
#[derive(Debug, Serialize)]
pub struct SkippedEvent {
    /// Event index in the procedure.
    pub event: usize,
    /// Why it was skipped.
    pub reason: String,
}

/// Everything a run produces.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Mode that produced this report.
    pub mode: String,
    /// Per-event geometry, when the mode emits it.
    pub geometry: Vec<GeometryReport>,
    /// Per-event hits, when the mode computes them.
    pub hits: Vec<HitReport>,
    /// Events that failed validation.
    pub skipped: Vec<SkippedEvent>,
}
