//! Session configuration loaded from a JSON file.
//!
//! Every field has a default, so a partial file (or none at all) yields a
//! working session.

use clipline_core::{FrameRate, SurfaceTransform, TimelineConfig};
use clipline_media::{ExportOptions, ExportSelection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timeline: TimelineConfig,
    pub export: ExportDefaults,
}

/// Export knobs that persist across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    pub frame_rate: FrameRate,
    pub transform: SurfaceTransform,
    pub time_limit_secs: f64,
    /// H.264 constant rate factor for file exports.
    pub crf: u32,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::FPS_30,
            transform: SurfaceTransform::default(),
            time_limit_secs: 30.0,
            crf: 18,
        }
    }
}

impl ExportDefaults {
    pub fn to_options(&self, selection: ExportSelection) -> ExportOptions {
        ExportOptions {
            selection,
            transform: self.transform,
            frame_rate: self.frame_rate,
            time_limit: Duration::from_secs_f64(self.time_limit_secs.max(0.0)),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load the config at `path`, or fall back to defaults on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            None => Self::default(),
            Some(path) => match Self::load(path) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "config unreadable, using defaults");
                    Self::default()
                }
            },
        }
    }
}
