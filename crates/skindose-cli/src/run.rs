//! Mode dispatch.

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use skindose_geom::{
    compute_procedure_hits, EventGeometry, EventGeometryParams, GeometryError, PhantomSurface,
    Pose,
};

use crate::report::{GeometryReport, HitReport, RunReport, SkippedEvent};
use crate::settings::{Mode, Settings};

/// Inputs of one run, already loaded from disk.
pub struct RunInput<'a> {
    /// What to compute.
    pub mode: Mode,
    /// Event for single-event modes.
    pub event_index: usize,
    /// Skip failing events rather than abort.
    pub skip_invalid_events: bool,
    /// The procedure's events.
    pub events: &'a [EventGeometryParams],
    /// Patient surface; only read by modes that hit test.
    pub phantom: Option<&'a PhantomSurface>,
}

impl<'a> RunInput<'a> {
    /// Take mode flags from `settings`.
    pub fn from_settings(
        settings: &Settings,
        events: &'a [EventGeometryParams],
        phantom: Option<&'a PhantomSurface>,
    ) -> Self {
        Self {
            mode: settings.mode,
            event_index: settings.event_index,
            skip_invalid_events: settings.skip_invalid_events,
            events,
            phantom,
        }
    }
}

/// Whether `mode` needs the phantom surface.
pub fn needs_phantom(mode: Mode) -> bool {
    matches!(mode, Mode::CalculateHits | Mode::PlotEvent)
}

/// Run the selected mode.
pub fn run(input: &RunInput<'_>) -> Result<RunReport> {
    if input.events.is_empty() {
        bail!("no irradiation events to process");
    }

    let mut report = RunReport {
        mode: input.mode.as_str().to_string(),
        ..Default::default()
    };

    match input.mode {
        Mode::CalculateHits => {
            let phantom = require_phantom(input)?;
            info!(
                "hit testing {} events against {} {} cells",
                input.events.len(),
                phantom.len(),
                phantom.kind()
            );
            for (i, result) in compute_procedure_hits(input.events, phantom)
                .into_iter()
                .enumerate()
            {
                match result {
                    Ok(hits) => {
                        debug!("event {i}: {} of {} cells hit", hits.count(), hits.len());
                        report.hits.push(HitReport::new(i, hits));
                    }
                    Err(err) => skip_or_abort(input, &mut report, i, err)?,
                }
            }
        }
        Mode::PlotSetup => {
            let (i, params) = selected_event(input)?;
            let geom = EventGeometry::build(params, Pose::Neutral)
                .with_context(|| format!("event {i}"))?;
            report.geometry.push(GeometryReport::new(i, Pose::Neutral, &geom));
        }
        Mode::PlotEvent => {
            let phantom = require_phantom(input)?;
            let (i, params) = selected_event(input)?;
            let geom =
                EventGeometry::build(params, Pose::Event).with_context(|| format!("event {i}"))?;
            let hits = geom.hits(phantom);
            info!("event {i}: {} of {} cells hit", hits.count(), hits.len());
            report.geometry.push(GeometryReport::new(i, Pose::Event, &geom));
            report.hits.push(HitReport::new(i, hits));
        }
        Mode::PlotProcedure => {
            for (i, params) in input.events.iter().enumerate() {
                match EventGeometry::build(params, Pose::Event) {
                    Ok(geom) => report.geometry.push(GeometryReport::new(i, Pose::Event, &geom)),
                    Err(err) => skip_or_abort(input, &mut report, i, err)?,
                }
            }
        }
    }

    if !report.skipped.is_empty() {
        warn!("{} events skipped", report.skipped.len());
    }
    Ok(report)
}

fn require_phantom<'a>(input: &RunInput<'a>) -> Result<&'a PhantomSurface> {
    match input.phantom {
        Some(p) => Ok(p),
        None => bail!("mode {} requires a phantom", input.mode.as_str()),
    }
}

fn selected_event<'a>(input: &RunInput<'a>) -> Result<(usize, &'a EventGeometryParams)> {
    let i = input.event_index;
    match input.events.get(i) {
        Some(params) => Ok((i, params)),
        None => bail!(
            "event_index {i} out of range ({} events)",
            input.events.len()
        ),
    }
}

fn skip_or_abort(
    input: &RunInput<'_>,
    report: &mut RunReport,
    event: usize,
    err: GeometryError,
) -> Result<()> {
    if !input.skip_invalid_events {
        return Err(err).with_context(|| format!("event {event}"));
    }
    warn!("skipping event {event}: {err}");
    report.skipped.push(SkippedEvent {
        event,
        reason: err.to_string(),
    });
    Ok(())
}
