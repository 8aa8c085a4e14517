//! Run settings, loaded from a TOML file.
//!
//! ```toml
//! mode = "calculate_hits"
//! event_index = 0
//! skip_invalid_events = true
//! events = "events.json"
//! phantom = "phantom.json"
//! threads = 4
//! ```
//!
//! `events` and `phantom` are resolved relative to the settings file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use skindose_geom::{EventGeometryParams, PhantomSurface, PhantomSurfaceData};

/// What to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Hit test every event against the phantom.
    CalculateHits,
    /// Neutral-pose geometry of the selected event, for positioning phantoms.
    PlotSetup,
    /// Geometry and hits of the selected event.
    PlotEvent,
    /// Geometry of every event, without hit testing.
    PlotProcedure,
}

impl Mode {
    /// Settings-file spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::CalculateHits => "calculate_hits",
            Mode::PlotSetup => "plot_setup",
            Mode::PlotEvent => "plot_event",
            Mode::PlotProcedure => "plot_procedure",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Parsed settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// What to compute.
    pub mode: Mode,
    /// Event used by `plot_setup` and `plot_event`.
    #[serde(default)]
    pub event_index: usize,
    /// Log and skip events that fail validation instead of aborting.
    #[serde(default = "default_true")]
    pub skip_invalid_events: bool,
    /// JSON array of event geometry records.
    pub events: PathBuf,
    /// JSON phantom surface.
    pub phantom: PathBuf,
    /// Worker threads; all cores when unset.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Settings {
    /// Parse settings from TOML text. Relative paths are kept as written.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).context("invalid settings file")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from disk, resolving data paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        let mut settings = Self::from_toml(&text)
            .with_context(|| format!("in {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        settings.events = base.join(&settings.events);
        settings.phantom = base.join(&settings.phantom);
        Ok(settings)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            bail!("threads must be at least 1");
        }
        if self.events.as_os_str().is_empty() {
            bail!("events path is empty");
        }
        if self.phantom.as_os_str().is_empty() {
            bail!("phantom path is empty");
        }
        Ok(())
    }

    /// Read the event list.
    pub fn load_events(&self) -> Result<Vec<EventGeometryParams>> {
        let text = fs::read_to_string(&self.events)
            .with_context(|| format!("failed to read events {}", self.events.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid events file {}", self.events.display()))
    }

    /// Read and validate the phantom surface.
    pub fn load_phantom(&self) -> Result<PhantomSurface> {
        let text = fs::read_to_string(&self.phantom)
            .with_context(|| format!("failed to read phantom {}", self.phantom.display()))?;
        let data: PhantomSurfaceData = serde_json::from_str(&text)
            .with_context(|| format!("invalid phantom file {}", self.phantom.display()))?;
        PhantomSurface::try_from(data)
            .with_context(|| format!("invalid phantom in {}", self.phantom.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let s = Settings::from_toml(
            r#"
            mode = "plot_event"
            events = "events.json"
            phantom = "phantom.json"
            "#,
        )
        .unwrap();
        assert_eq!(s.mode, Mode::PlotEvent);
        assert_eq!(s.event_index, 0);
        assert!(s.skip_invalid_events);
        assert_eq!(s.threads, None);
    }

    #[test]
    fn test_parse_full() {
        let s = Settings::from_toml(
            r#"
            mode = "calculate_hits"
            event_index = 3
            skip_invalid_events = false
            events = "data/events.json"
            phantom = "data/phantom.json"
            threads = 2
            "#,
        )
        .unwrap();
        assert_eq!(s.mode, Mode::CalculateHits);
        assert_eq!(s.event_index, 3);
        assert!(!s.skip_invalid_events);
        assert_eq!(s.threads, Some(2));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = Settings::from_toml(
            r#"
            mode = "calculate_dose"
            events = "e.json"
            phantom = "p.json"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Settings::from_toml(
            r#"
            mode = "plot_setup"
            events = "e.json"
            phantom = "p.json"
            dark_mode = true
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = Settings::from_toml(
            r#"
            mode = "plot_setup"
            events = "e.json"
            phantom = "p.json"
            threads = 0
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_mode_round_trips_through_name() {
        for mode in [
            Mode::CalculateHits,
            Mode::PlotSetup,
            Mode::PlotEvent,
            Mode::PlotProcedure,
        ] {
            let text = format!(
                "mode = \"{}\"\nevents = \"e.json\"\nphantom = \"p.json\"\n",
                mode.as_str()
            );
            assert_eq!(Settings::from_toml(&text).unwrap().mode, mode);
        }
    }
}
