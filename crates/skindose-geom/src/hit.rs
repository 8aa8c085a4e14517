//! Skin-cell hit testing against the beam cone.
//!
//! A cell at `p` is inside the beam when `v = p - source` lies on the inner
//! side of all four face half-spaces, i.e. `v · n_k <= 0` for every `k`.
//! There is no far-plane clip: anything angularly inside the cone counts,
//! including points past the detector. The patient is always nearer the
//! source than the detector, so this does not matter for skin cells.
//!
//! On volumetric phantoms a cell inside the cone is kept only if it faces
//! the source, `v · normal <= 0`. Cells facing away sit on the beam's exit
//! path and receive no entrance dose.

use rayon::prelude::*;
use skindose_math::{Point3, Vec3};

use crate::beam::BeamGeometry;
use crate::phantom::PhantomSurface;

/// Per-cell hit flags, in the same order as the phantom's points.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HitResult {
    hits: Vec<bool>,
}

impl HitResult {
    /// Wrap raw flags.
    pub fn new(hits: Vec<bool>) -> Self {
        Self { hits }
    }

    /// Number of cells tested.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether no cells were tested.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Number of cells hit.
    pub fn count(&self) -> usize {
        self.hits.iter().filter(|&&h| h).count()
    }

    /// Indices of the cells hit.
    pub fn indices(&self) -> Vec<usize> {
        self.hits
            .iter()
            .enumerate()
            .filter_map(|(i, &h)| h.then_some(i))
            .collect()
    }

    /// Flags as a slice.
    pub fn as_slice(&self) -> &[bool] {
        &self.hits
    }

    /// Consume into the raw flags.
    pub fn into_vec(self) -> Vec<bool> {
        self.hits
    }
}

/// Whether `v` (relative to the source) lies inside every face half-space.
///
/// All four products are evaluated and combined without short-circuiting,
/// so a cell exactly on a face plane (`v · n == 0`) counts as inside.
#[inline]
fn inside_cone(v: &Vec3, normals: &[Vec3; 4]) -> bool {
    let d0 = v.dot(&normals[0]) <= 0.0;
    let d1 = v.dot(&normals[1]) <= 0.0;
    let d2 = v.dot(&normals[2]) <= 0.0;
    let d3 = v.dot(&normals[3]) <= 0.0;
    d0 & d1 & d2 & d3
}

#[inline]
fn classify_cell(source: &Point3, normals: &[Vec3; 4], p: &Point3, n: Option<&Vec3>) -> bool {
    let v = p - source;
    if !inside_cone(&v, normals) {
        return false;
    }
    match n {
        Some(n) => v.dot(n) <= 0.0,
        None => true,
    }
}

/// Classify every skin cell of `phantom` as hit or not.
///
/// Returns one flag per point, true for entrance cells inside the beam.
/// Plane phantoms skip the entrance/exit check.
pub fn check_hit(beam: &BeamGeometry, phantom: &PhantomSurface) -> HitResult {
    let source = beam.source();
    let normals = &beam.normals;
    let points = phantom.points();

    let hits: Vec<bool> = match entrance_normals(phantom) {
        Some(ns) => points
            .iter()
            .zip(ns)
            .map(|(p, n)| classify_cell(&source, normals, p, Some(n)))
            .collect(),
        None => points
            .iter()
            .map(|p| classify_cell(&source, normals, p, None))
            .collect(),
    };

    HitResult::new(hits)
}

/// Parallel [`check_hit`]. Produces identical flags.
pub fn check_hit_par(beam: &BeamGeometry, phantom: &PhantomSurface) -> HitResult {
    let source = beam.source();
    let normals = &beam.normals;
    let points = phantom.points();

    let hits: Vec<bool> = match entrance_normals(phantom) {
        Some(ns) => points
            .par_iter()
            .zip(ns.par_iter())
            .map(|(p, n)| classify_cell(&source, normals, p, Some(n)))
            .collect(),
        None => points
            .par_iter()
            .map(|p| classify_cell(&source, normals, p, None))
            .collect(),
    };

    HitResult::new(hits)
}

/// Normals to use for the entrance check, or `None` for one-sided phantoms.
fn entrance_normals(phantom: &PhantomSurface) -> Option<&[Vec3]> {
    if phantom.kind().is_volumetric() {
        phantom.normals()
    } else {
        None
    }
}
