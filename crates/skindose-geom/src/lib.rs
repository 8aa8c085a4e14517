#![warn(missing_docs)]

//! X-ray beam geometry and skin-cell hit testing for fluoroscopic skin dose
//! estimation.
//!
//! For each irradiation event this crate places the beam pyramid and the
//! detector panel in room coordinates from the positioner angles and
//! collimation, and decides which skin cells of a patient phantom the beam
//! enters through. Dose values are computed downstream from the hit flags.
//!
//! Everything here is pure: each call allocates its own buffers and events
//! are independent, so a procedure can be fanned out across threads.
//!
//! # Example
//!
//! ```ignore
//! use skindose_geom::{compute_hits, EventGeometryParams, PhantomSurface, Pose};
//!
//! let event = EventGeometryParams { /* from the dose report */ };
//! let phantom = PhantomSurface::plane(points)?;
//! let hits = compute_hits(&event, &phantom, Pose::Event)?;
//! println!("{} of {} cells hit", hits.count(), hits.len());
//! ```

pub mod beam;
pub mod detector;
pub mod error;
pub mod event;
pub mod hit;
pub mod phantom;
pub mod rotation;

pub use beam::{face_normals, BeamGeometry};
pub use detector::DetectorGeometry;
pub use error::{GeometryError, Result};
pub use event::EventGeometryParams;
pub use hit::{check_hit, check_hit_par, HitResult};
pub use phantom::{PhantomKind, PhantomSurface, PhantomSurfaceData};
pub use rotation::{Pose, RotationSet};

use rayon::prelude::*;

/// Surfaces with fewer cells than this are tested on the calling thread.
const PARALLEL_CELL_THRESHOLD: usize = 16_384;

/// Beam, detector and rotations of one irradiation event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventGeometry {
    /// Elemental rotations the geometry was built from.
    pub rotations: RotationSet,
    /// Beam pyramid and face normals.
    pub beam: BeamGeometry,
    /// Detector panel.
    pub detector: DetectorGeometry,
}

impl EventGeometry {
    /// Validate `params` and build the event's geometry in `pose`.
    pub fn build(params: &EventGeometryParams, pose: Pose) -> Result<Self> {
        params.validate()?;
        let rotations = RotationSet::for_event(params, pose);
        let beam = BeamGeometry::place(params, &rotations.beam_transform())?;
        let detector = DetectorGeometry::place(params, &rotations.detector_transform())?;
        Ok(Self {
            rotations,
            beam,
            detector,
        })
    }

    /// Hit test a phantom against this event's beam.
    pub fn hits(&self, phantom: &PhantomSurface) -> HitResult {
        hit_surface(&self.beam, phantom)
    }
}

fn hit_surface(beam: &BeamGeometry, phantom: &PhantomSurface) -> HitResult {
    if phantom.len() >= PARALLEL_CELL_THRESHOLD {
        check_hit_par(beam, phantom)
    } else {
        check_hit(beam, phantom)
    }
}

/// Validate `params` and build only the beam, skipping the detector panel.
fn event_beam(params: &EventGeometryParams, pose: Pose) -> Result<BeamGeometry> {
    params.validate()?;
    let rotations = RotationSet::for_event(params, pose);
    BeamGeometry::place(params, &rotations.beam_transform())
}

/// Build the beam for one event and hit test `phantom` against it.
///
/// The detector panel is not built, so its size does not affect the result.
/// Safe to call concurrently for distinct events.
pub fn compute_hits(
    event: &EventGeometryParams,
    phantom: &PhantomSurface,
    pose: Pose,
) -> Result<HitResult> {
    Ok(hit_surface(&event_beam(event, pose)?, phantom))
}

/// Hit test every event of a procedure, in parallel across events.
///
/// Returns one result per event in input order. A failing event does not
/// stop the others; the caller decides whether to skip or abort.
pub fn compute_procedure_hits(
    events: &[EventGeometryParams],
    phantom: &PhantomSurface,
) -> Vec<Result<HitResult>> {
    events
        .par_iter()
        .map(|event| Ok(check_hit(&event_beam(event, Pose::Event)?, phantom)))
        .collect()
}
